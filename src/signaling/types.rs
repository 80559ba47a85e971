use std::sync::mpsc::Sender;

pub use crate::signaling::protocol::ParticipantId;
use crate::signaling::protocol::SignalingMsg;

/// Channel handle the relay pushes messages through.
///
/// Must not block: the controller calls it from the single event-loop thread.
pub trait Outbox {
    /// Hands `msg` to the participant's channel. Returns the message back if
    /// the channel is gone.
    fn push(&self, msg: SignalingMsg) -> Result<(), SignalingMsg>;
}

impl Outbox for Sender<SignalingMsg> {
    fn push(&self, msg: SignalingMsg) -> Result<(), SignalingMsg> {
        self.send(msg).map_err(|e| e.0)
    }
}
