//! CLI argument parsing
//!
//! A test file built on tapkit is an ordinary binary. [`HarnessArgs`] gives
//! it the usual switches and [`execute`] resolves configuration, runs the
//! harness and maps the outcome to a process exit code.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

use crate::config::{ConfigFile, EnvConfig, HarnessConfig, RunOptions};
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::models::RunSummary;
use crate::output::OutputFormat;
use crate::utils::{init_logger, LogLevel};

/// Exit status used when registration was rejected
const EXIT_INVALID: u8 = 2;

/// Command-line switches for a test binary
#[derive(Parser, Debug, Default)]
#[command(about = "Run the tests in this file and report them as TAP")]
#[command(long_about = None)]
pub struct HarnessArgs {
    /// Run tests one at a time in registration order
    #[arg(short, long)]
    pub serial: bool,

    /// Abort the run at the first failing test
    #[arg(short, long)]
    pub bail: bool,

    /// Include backtraces in failure diagnostics
    #[arg(long)]
    pub show_stack: bool,

    /// Leave skipped tests out of the output
    #[arg(long)]
    pub hide_skip: bool,

    /// Maximum number of tests in flight
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (defaults to ./tapkit.yaml and friends)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level for harness diagnostics on stderr
    #[arg(long)]
    pub log_level: Option<String>,
}

impl HarnessArgs {
    /// Overrides for the switches that were given
    pub fn to_run_options(&self) -> RunOptions {
        let mut options = RunOptions::new();
        options.serial = self.serial.then_some(true);
        options.settle = self.bail.then_some(false);
        options.show_stack = self.show_stack.then_some(true);
        options.hide_skip = self.hide_skip.then_some(true);
        options.concurrency = self.concurrency.map(|n| n as usize);
        options.format = self.format;
        options
    }
}

/// Resolve configuration as defaults < file < environment < command line
pub fn resolve(args: &HarnessArgs, env: &EnvConfig) -> Result<HarnessConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let file = match path {
        Some(path) => ConfigFile::load(&path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.harness;
    config.merge(&env.to_run_options().overlay(args.to_run_options()));
    debug!(?config, "resolved harness configuration");
    Ok(config)
}

/// Configure logging, run `harness` and return the exit status.
///
/// Errors are only returned for configuration problems; test failures and
/// aborted runs are reported through the exit code.
pub async fn execute<A>(harness: &mut Harness<A>, args: &HarnessArgs) -> Result<ExitCode>
where
    A: Clone + Send + Sync + 'static,
{
    let env = EnvConfig::load();

    let level = args
        .log_level
        .as_deref()
        .or(env.log_level.as_deref())
        .and_then(LogLevel::parse)
        .unwrap_or(LogLevel::Warn);
    init_logger(level);

    let config = resolve(args, &env)?;
    harness.set_config(config);

    let outcome = harness.run(RunOptions::new()).await;
    Ok(exit_code(&outcome))
}

/// Map a run outcome to a process exit code
pub fn exit_code(outcome: &Result<RunSummary, HarnessError>) -> ExitCode {
    ExitCode::from(exit_status(outcome))
}

fn exit_status(outcome: &Result<RunSummary, HarnessError>) -> u8 {
    match outcome {
        Ok(summary) => summary.exit_code(),
        Err(err @ HarnessError::RunAbort { .. }) => {
            error!("{}", err);
            1
        }
        Err(err @ HarnessError::InvalidArgument(_)) => {
            error!("{}", err);
            EXIT_INVALID
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunStats, TestFailure};
    use chrono::Utc;
    use std::io::Write;

    #[test]
    fn test_parse_switches() {
        let args = HarnessArgs::try_parse_from([
            "suite", "--serial", "--bail", "-j", "3", "--format", "json",
        ])
        .unwrap();

        assert!(args.serial);
        assert!(args.bail);
        assert_eq!(args.concurrency, Some(3));
        assert_eq!(args.format, Some(OutputFormat::Json));

        let options = args.to_run_options();
        assert_eq!(options.serial, Some(true));
        assert_eq!(options.settle, Some(false));
        assert_eq!(options.show_stack, None);
        assert_eq!(options.concurrency, Some(3));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        assert!(HarnessArgs::try_parse_from(["suite", "-j", "0"]).is_err());
        assert!(HarnessArgs::try_parse_from(["suite", "--format", "table"]).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "version: \"1.0\"\nharness:\n  serial: true\n  concurrency: 8\n  format: summary"
        )
        .unwrap();

        let args = HarnessArgs {
            config: Some(file.path().to_path_buf()),
            concurrency: Some(2),
            ..Default::default()
        };
        let env = EnvConfig {
            format: Some("json".to_string()),
            hide_skip: Some(true),
            ..Default::default()
        };

        let config = resolve(&args, &env).unwrap();
        assert!(config.serial);
        assert!(config.settle);
        assert!(config.hide_skip);
        assert_eq!(config.concurrency, Some(2));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_resolve_missing_file() {
        let args = HarnessArgs {
            config: Some(PathBuf::from("/nonexistent/tapkit.yaml")),
            ..Default::default()
        };
        assert!(resolve(&args, &EnvConfig::default()).is_err());
    }

    #[test]
    fn test_exit_status() {
        let passing = RunSummary::new(
            Utc::now(),
            0,
            RunStats {
                count: 1,
                pass: 1,
                ran: 1,
                ..Default::default()
            },
            Vec::new(),
        );
        let failing = RunSummary::new(
            Utc::now(),
            0,
            RunStats {
                count: 1,
                fail: 1,
                ran: 1,
                ..Default::default()
            },
            Vec::new(),
        );
        let aborted = HarnessError::RunAbort {
            index: 1,
            title: "t".to_string(),
            reason: TestFailure::message("x"),
        };

        assert_eq!(exit_status(&Ok(passing)), 0);
        assert_eq!(exit_status(&Ok(failing)), 1);
        assert_eq!(exit_status(&Err(aborted)), 1);
        assert_eq!(
            exit_status(&Err(HarnessError::InvalidArgument("no body".into()))),
            2
        );
    }
}
