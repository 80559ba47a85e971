//! Leveled, non-blocking logging for the relay.
//!
//! Producers hold an `Arc<dyn LogSink>` and log through the `sink_*!` macros.
//! The process-wide [`Logger`](logger::Logger) drains a bounded queue on a
//! background thread and appends to a per-process file.

pub mod capture_log_sink;
pub mod log_level;
pub mod log_macros;
pub mod log_msg;
pub mod log_sink;
pub mod logger;
pub mod logger_handle;
pub mod noop_log_sink;

pub use capture_log_sink::CaptureLogSink;
pub use log_level::LogLevel;
pub use log_sink::LogSink;
pub use noop_log_sink::NoopLogSink;
