//! Smoke suite
//!
//! ```bash
//! cargo run --example smoke -- --serial
//! cargo run --example smoke -- --format summary
//! ```

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use tapkit::cli::{self, HarnessArgs};
use tapkit::{Done, Harness, TestSpec, Title};

fn sasa(_: (), done: Done) {
    assert_eq!(1, 1);
    done.ok();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = HarnessArgs::parse();

    let mut harness = Harness::new();
    harness
        .add("one", |_| assert_eq!(1, 1))
        .add_callback(Title::none(), sasa)
        .skip("four (skip)", |_| assert_eq!(2121, 2121))
        .add("foo", |_| assert_eq!(55, 55))
        .add("bar", |_| assert_eq!(33, 33))
        .add("nine", |_| assert_eq!(2, 2));

    harness.register(
        TestSpec::new()
            .title("ten (sync todo fail)")
            .sync(|_| -> Result<()> { anyhow::bail!("aloha") })
            .todo(),
    )?;

    harness.add_async("eleven (async last)", |_| async {
        assert_eq!(44, 44);
        tokio::fs::metadata("Cargo.toml").await.map(|_| ())
    });

    cli::execute(&mut harness, &args).await
}
