use std::io;

use thiserror::Error;

use crate::signaling::protocol::FrameError;

#[derive(Debug, Error)]
pub enum SignalingClientError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Frame(#[from] FrameError),
    /// The relay closed the connection (or the reader thread exited).
    #[error("signaling client disconnected")]
    Disconnected,
    #[error("timed out waiting for the relay")]
    Timeout,
}
