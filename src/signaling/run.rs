use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::log::LogSink;
use crate::log::logger::Logger;
use crate::logger_info;
use crate::signaling::signaling_server::SignalingServer;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("relay I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Run the relay on `addr` using the given log sink. Blocks.
pub fn run_signaling_server_with_log(addr: &str, log_sink: Arc<dyn LogSink>) -> io::Result<()> {
    SignalingServer::bind(addr, log_sink)?.run()
}

/// Load `path` (a missing file means defaults), start the file logger it
/// describes and run the relay on `[Relay] bind_addr`. Blocks.
pub fn run_signaling_server_from_config(path: impl AsRef<Path>) -> Result<(), RunError> {
    let config = Config::load_or_empty(path)?;
    run_with_config(&config, None)
}

/// Like [`run_signaling_server_from_config`] with an already loaded config;
/// `addr_override` wins over `[Relay] bind_addr`.
pub fn run_with_config(config: &Config, addr_override: Option<&str>) -> Result<(), RunError> {
    let logger = Logger::start_relay(config);
    let addr = addr_override.unwrap_or_else(|| config.relay_bind_addr());
    logger_info!(
        logger,
        "starting signaling relay on {} (log file {})",
        addr,
        logger.file_path().display()
    );

    let log_sink: Arc<dyn LogSink> = Arc::new(logger.handle());
    run_signaling_server_with_log(addr, log_sink)?;
    Ok(())
}
