//! Span attributes and emitters for analysis runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Attributes describing one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSpanAttributes {
    /// Run identifier.
    pub run_id: Option<String>,
    /// `phenology` or `custom`.
    pub mode: Option<String>,
    /// Crop, for phenology runs.
    pub crop_id: Option<String>,
    /// Number of periods requested.
    pub period_count: Option<usize>,
    /// Number of periods without an NDVI value.
    pub missing_ndvi: Option<usize>,
    /// Final outcome.
    pub status: Option<String>,
}

impl RunSpanAttributes {
    /// Creates empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the run id.
    #[must_use]
    pub fn with_run_id(mut self, id: impl Into<String>) -> Self {
        self.run_id = Some(id.into());
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Sets the crop.
    #[must_use]
    pub fn with_crop_id(mut self, crop_id: impl Into<String>) -> Self {
        self.crop_id = Some(crop_id.into());
        self
    }

    /// Sets the period count.
    #[must_use]
    pub fn with_period_count(mut self, count: usize) -> Self {
        self.period_count = Some(count);
        self
    }

    /// Sets the missing-NDVI count.
    #[must_use]
    pub fn with_missing_ndvi(mut self, count: usize) -> Self {
        self.missing_ndvi = Some(count);
        self
    }

    /// Sets the outcome.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Flattens to `analysis.*` string attributes.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        if let Some(ref v) = self.run_id {
            attrs.insert("analysis.run_id".to_string(), v.clone());
        }
        if let Some(ref v) = self.mode {
            attrs.insert("analysis.mode".to_string(), v.clone());
        }
        if let Some(ref v) = self.crop_id {
            attrs.insert("analysis.crop_id".to_string(), v.clone());
        }
        if let Some(v) = self.period_count {
            attrs.insert("analysis.period_count".to_string(), v.to_string());
        }
        if let Some(v) = self.missing_ndvi {
            attrs.insert("analysis.missing_ndvi".to_string(), v.to_string());
        }
        if let Some(ref v) = self.status {
            attrs.insert("analysis.status".to_string(), v.clone());
        }
        attrs
    }
}

/// Wall-clock timer for a named span.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts timing.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Milliseconds since start.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer and returns the duration in milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

/// Receives span lifecycle events from the analyzer.
pub trait TracingEmitter: Send + Sync {
    /// A span started.
    fn span_start(&self, name: &str, attributes: &HashMap<String, String>);

    /// A span ended normally.
    fn span_end(&self, name: &str, duration_ms: f64, attributes: &HashMap<String, String>);

    /// A span ended with an error.
    fn span_error(&self, name: &str, error: &str, attributes: &HashMap<String, String>);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoOpTracingEmitter;

impl TracingEmitter for NoOpTracingEmitter {
    fn span_start(&self, _name: &str, _attributes: &HashMap<String, String>) {}
    fn span_end(&self, _name: &str, _duration_ms: f64, _attributes: &HashMap<String, String>) {}
    fn span_error(&self, _name: &str, _error: &str, _attributes: &HashMap<String, String>) {}
}

/// Forwards span events to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingTracingEmitter;

impl TracingEmitter for LoggingTracingEmitter {
    fn span_start(&self, name: &str, attributes: &HashMap<String, String>) {
        tracing::debug!(span_name = name, ?attributes, "Span started");
    }

    fn span_end(&self, name: &str, duration_ms: f64, attributes: &HashMap<String, String>) {
        tracing::info!(span_name = name, duration_ms, ?attributes, "Span ended");
    }

    fn span_error(&self, name: &str, error: &str, attributes: &HashMap<String, String>) {
        tracing::error!(span_name = name, error, ?attributes, "Span error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_attributes() {
        let attrs = RunSpanAttributes::new()
            .with_run_id("run-1")
            .with_mode("phenology")
            .with_crop_id("glycine_max")
            .with_period_count(4)
            .to_attributes();

        assert_eq!(attrs.get("analysis.run_id"), Some(&"run-1".to_string()));
        assert_eq!(attrs.get("analysis.crop_id"), Some(&"glycine_max".to_string()));
        assert_eq!(attrs.get("analysis.period_count"), Some(&"4".to_string()));
        assert!(!attrs.contains_key("analysis.status"));
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("analysis.fetch");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(timer.name(), "analysis.fetch");
        assert!(timer.finish() >= 5.0);
    }

    #[test]
    fn test_emitters_do_not_panic() {
        let attrs = RunSpanAttributes::new().with_status("ok").to_attributes();
        for emitter in [&NoOpTracingEmitter as &dyn TracingEmitter, &LoggingTracingEmitter] {
            emitter.span_start("analysis.run", &attrs);
            emitter.span_end("analysis.run", 1.0, &attrs);
            emitter.span_error("analysis.run", "boom", &attrs);
        }
    }
}
