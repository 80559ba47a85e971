use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Default listen address when `[Relay] bind_addr` is not set.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal INI-style configuration.
///
/// ```text
/// # comment
/// [Relay]
/// bind_addr = "127.0.0.1:5000"
///
/// [Logging]
/// relay_log_path = ~/relay-logs
/// ```
///
/// Keys before the first `[section]` land in `globals`.
#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Like [`load`](Self::load), but a missing file yields an empty config.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::empty())
            }
            other => other,
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    /// Section value, then global value, then `default`. Empty strings count as unset.
    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }

    /// Parses a value; unparsable values are treated as unset.
    #[must_use]
    pub fn get_parsed<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.get_non_empty(section, key)
            .and_then(|v| v.parse::<T>().ok())
    }

    /// `[Relay] bind_addr`, falling back to [`DEFAULT_BIND_ADDR`].
    #[must_use]
    pub fn relay_bind_addr(&self) -> &str {
        self.get_non_empty_or_default("Relay", "bind_addr", DEFAULT_BIND_ADDR)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# top-level keys are globals
queue_capacity = 64

[Relay]
bind_addr = "127.0.0.1:7000"

[Logging]
relay_log_path =
relay_log_filename = relay
queue_capacity = not-a-number
"#;

    #[test]
    fn parses_sections_globals_and_quotes() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("Relay", "bind_addr"), Some("127.0.0.1:7000"));
        assert_eq!(cfg.get_global("queue_capacity"), Some("64"));
        assert_eq!(cfg.get("Logging", "relay_log_filename"), Some("relay"));
    }

    #[test]
    fn empty_values_are_unset() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("Logging", "relay_log_path"), Some(""));
        assert_eq!(cfg.get_non_empty("Logging", "relay_log_path"), None);
    }

    #[test]
    fn fallback_order_is_section_global_default() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.relay_bind_addr(), "127.0.0.1:7000");
        assert_eq!(
            cfg.get_non_empty_or_default("Other", "queue_capacity", "1"),
            "64"
        );
        assert_eq!(Config::empty().relay_bind_addr(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn unparsable_numbers_are_ignored() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get_parsed::<usize>("Logging", "queue_capacity"), None);
        let cfg = Config::parse("[Logging]\nqueue_capacity = 32\n");
        assert_eq!(cfg.get_parsed::<usize>("Logging", "queue_capacity"), Some(32));
    }

    #[test]
    fn missing_file_is_empty_with_load_or_empty_but_error_with_load() {
        let path = std::env::temp_dir().join("rtcrelay-definitely-missing.conf");
        assert!(matches!(Config::load(&path), Err(ConfigError::Read { .. })));
        let cfg = Config::load_or_empty(&path).unwrap();
        assert!(cfg.sections.is_empty());
    }
}
