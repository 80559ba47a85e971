use std::sync::Mutex;

use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// Keeps every line in memory.
///
/// Meant for tests and for hosts that embed the relay and want to surface its
/// log in their own UI.
#[derive(Debug, Default)]
pub struct CaptureLogSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CaptureLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of lines at exactly `level` whose text contains `needle`.
    pub fn count(&self, level: LogLevel, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|(lvl, text)| *lvl == level && text.contains(needle))
            .count()
    }
}

impl LogSink for CaptureLogSink {
    fn log(&self, level: LogLevel, msg: &str, _target: &'static str) {
        let mut guard = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, msg.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_level_and_substring() {
        let sink = CaptureLogSink::new();
        sink.log(LogLevel::Warn, "dropped Offer for 99", "t");
        sink.log(LogLevel::Info, "dropped nothing", "t");
        sink.log(LogLevel::Warn, "pair closed", "t");

        assert_eq!(sink.count(LogLevel::Warn, "dropped"), 1);
        assert_eq!(sink.count(LogLevel::Info, "dropped"), 1);
        assert_eq!(sink.lines().len(), 3);
    }
}
