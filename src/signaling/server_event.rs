use std::sync::mpsc::Sender;

use crate::signaling::protocol::SignalingMsg;
use crate::signaling::types::ParticipantId;

/// Events sent *to* the server loop thread.
pub enum ServerEvent {
    /// A new connection wants an id. The loop registers `to_client` and sends
    /// the assigned id back on `reply`.
    Connect {
        to_client: Sender<SignalingMsg>,
        reply: Sender<ParticipantId>,
    },

    /// A participant sent a message.
    MsgFromClient {
        id: ParticipantId,
        msg: SignalingMsg,
    },

    /// The participant's connection closed or errored.
    Disconnected { id: ParticipantId },
}
