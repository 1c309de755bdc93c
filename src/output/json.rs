//! Newline-delimited JSON reporter

use super::format::Sink;
use crate::events::{Event, Listener};

/// Writes every event as one JSON object per line
pub struct JsonReporter {
    sink: Sink,
}

impl JsonReporter {
    pub fn new(sink: Sink) -> Self {
        Self { sink }
    }
}

impl Listener for JsonReporter {
    fn on_event(&self, event: &Event) {
        match serde_json::to_string(event) {
            Ok(line) => self.sink.line(line),
            Err(err) => tracing::warn!(event = %event.kind(), error = %err, "failed to encode event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::harness::Harness;

    #[tokio::test]
    async fn test_one_object_per_event() {
        let (sink, buffer) = Sink::buffer();
        let mut harness = Harness::new();
        harness
            .add("good", |_| {})
            .add("bad", |_| -> anyhow::Result<()> { anyhow::bail!("nope") });

        harness
            .run(RunOptions::new().serial(true).reporter(JsonReporter::new(sink)))
            .await
            .unwrap();

        let events: Vec<serde_json::Value> = buffer
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let names: Vec<&str> = events
            .iter()
            .map(|e| e["event"].as_str().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "header",
                "beforeEach",
                "test",
                "afterEach",
                "pass",
                "beforeEach",
                "test",
                "afterEach",
                "fail",
                "footer",
            ]
        );

        let fail = &events[8]["test"];
        assert_eq!(fail["title"], "bad");
        assert_eq!(fail["ok"], false);
        assert_eq!(fail["reason"]["message"], "nope");
        assert_eq!(events[9]["stats"]["fail"], 1);
        assert_eq!(events[9]["aborted"], false);
    }
}
