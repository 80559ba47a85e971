use std::io;

use thiserror::Error;

/// Body parsing/format problems.
#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("unknown message type 0x{0:02x}")]
    UnknownType(u8),
    #[error("unsupported protocol version {0}")]
    BadVersion(u8),
    #[error("message body truncated")]
    Truncated,
    #[error("frame body of {len} bytes exceeds limit of {max}")]
    TooLarge { len: usize, max: usize },
    #[error("payload of {actual} bytes exceeds limit of {max}")]
    PayloadTooLong { max: usize, actual: usize },
    #[error("list of {actual} entries exceeds limit of {max}")]
    TooManyEntries { max: usize, actual: usize },
    #[error("invalid message format: {0}")]
    InvalidFormat(&'static str),
}

/// Frame-level error: transport vs protocol.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
}

impl FrameError {
    /// True when the peer simply went away (EOF / reset), as opposed to
    /// sending garbage.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
            ),
            Self::Proto(_) => false,
        }
    }
}
