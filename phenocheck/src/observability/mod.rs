//! Observability utilities.

pub mod logging;
mod spans;

pub use logging::LogFormat;
pub use spans::{
    LoggingTracingEmitter, NoOpTracingEmitter, RunSpanAttributes, SpanTimer, TracingEmitter,
};
