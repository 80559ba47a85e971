use std::time::SystemTime;

use crate::log::log_level::LogLevel;

/// A single queued log line.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch.
    pub ts_ms: u128,
    pub text: String,
    /// Module path of the call site.
    pub target: &'static str,
}

impl LogMsg {
    /// Builds a message stamped with the current wall-clock time.
    pub fn now(level: LogLevel, text: impl Into<String>, target: &'static str) -> Self {
        Self {
            level,
            ts_ms: now_millis(),
            text: text.into(),
            target,
        }
    }

    /// Formats the line the way the log file stores it.
    pub fn render(&self) -> String {
        format!(
            "[{}] {} {} | {}",
            self.level.label(),
            self.ts_ms,
            self.target,
            self.text
        )
    }
}

pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_level_target_and_text() {
        let msg = LogMsg::now(LogLevel::Warn, "dropped Offer", "rtcrelay::signaling::relay");
        let line = msg.render();
        assert!(line.starts_with("[WARN ]"));
        assert!(line.contains("rtcrelay::signaling::relay"));
        assert!(line.ends_with("| dropped Offer"));
        assert!(msg.ts_ms > 0);
    }
}
