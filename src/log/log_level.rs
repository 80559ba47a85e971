/// Defines the severity levels for log messages.
///
/// Variants are ordered from least to most severe so that `level >= LogLevel::Warn`
/// reads naturally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-frame chatter (keepalives, codec detail).
    Trace,
    /// Per-message routing decisions.
    Debug,
    /// Connection lifecycle: joins, departures, pair teardown.
    Info,
    /// Dropped messages and misbehaving participants.
    Warn,
    /// Failures that cost the relay a connection or its listener.
    Error,
}

impl LogLevel {
    /// Fixed-width label used in the log file.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}
