use thiserror::Error;

/// Why the relay dropped a message.
///
/// None of these are reported to the sender; the sender only notices the
/// missing reply. They exist so drops show up in the log with a cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DropReason {
    /// No participant with that id was ever connected.
    #[error("unknown receiver")]
    UnknownReceiver,
    /// The receiver was connected once but has since left.
    #[error("receiver already left")]
    StaleSessionReference,
    /// The receiver is registered but its connection is shutting down.
    #[error("receiver channel closed")]
    ChannelClosed,
    /// The sender is not (or no longer) registered.
    #[error("sender not registered")]
    UnregisteredSender,
    /// The message kind carries no receiver.
    #[error("message is not relayable")]
    NotRelayable,
}
