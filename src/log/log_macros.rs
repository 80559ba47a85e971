//! Leveled logging macros.
//!
//! `sink_*!` take anything implementing `LogSink` (usually an
//! `Arc<dyn LogSink>`); `logger_info!` talks to the process `Logger` directly
//! and is used while the relay is starting.
//!
//! Each level is switched by a cargo feature (`log-trace` .. `log-error`,
//! each implying the ones above it). A switched-off level expands to `()`,
//! so its arguments are neither formatted nor evaluated.

#[macro_export]
macro_rules! sink_log {
    ($sink:expr, $lvl:expr, $($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $sink.log($lvl, &__line, module_path!());
    }};
}

#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        let _ = $logger.try_log($lvl, format!($($arg)*), module_path!());
    }};
}

/// Per-frame chatter on connections.
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! sink_trace {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_log!($sink, $crate::log::LogLevel::Trace, $($arg)*)
    };
}
#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! sink_trace {
    ($($arg:tt)*) => {
        ()
    };
}

/// Individual relayed messages and no-op lifecycle calls.
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! sink_debug {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_log!($sink, $crate::log::LogLevel::Debug, $($arg)*)
    };
}
#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! sink_debug {
    ($($arg:tt)*) => {
        ()
    };
}

/// Connects, departures, pairing.
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! sink_info {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_log!($sink, $crate::log::LogLevel::Info, $($arg)*)
    };
}
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! logger_info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logger_log!($logger, $crate::log::LogLevel::Info, $($arg)*)
    };
}
#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! sink_info {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! logger_info {
    ($($arg:tt)*) => {
        ()
    };
}

/// Dropped messages and misbehaving participants.
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! sink_warn {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_log!($sink, $crate::log::LogLevel::Warn, $($arg)*)
    };
}
#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! sink_warn {
    ($($arg:tt)*) => {
        ()
    };
}

/// The relay itself can no longer serve.
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! sink_error {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_log!($sink, $crate::log::LogLevel::Error, $($arg)*)
    };
}
#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! sink_error {
    ($($arg:tt)*) => {
        ()
    };
}
