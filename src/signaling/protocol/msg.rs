use bytes::Bytes;

use super::ParticipantId;

/// Every message that crosses a participant connection, in both directions.
///
/// Signaling variants carry both `from` and `to`. Participants fill in `to`;
/// whatever they put in `from` is overwritten by the relay with the id it
/// assigned to the connection, so receivers can trust provenance. `sdp` and
/// `candidate` are opaque to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingMsg {
    // Membership
    /// Ask for the caller's own id.
    Join,
    Joined {
        id: ParticipantId,
    },
    ListIds,
    /// Every live id, the requester's included, ascending. Long lists come
    /// in several messages; `last` marks the final one.
    Ids {
        ids: Vec<ParticipantId>,
        last: bool,
    },
    /// A participant disconnected.
    Left {
        id: ParticipantId,
    },

    // Paired windows
    Pair {
        peer: ParticipantId,
    },
    Paired {
        peer: ParticipantId,
    },
    /// The paired sibling closed; the receiver is being closed too.
    PairClosed {
        sibling: ParticipantId,
    },

    // Signaling
    Offer {
        from: ParticipantId,
        to: ParticipantId,
        sdp: Bytes,
    },
    Answer {
        from: ParticipantId,
        to: ParticipantId,
        sdp: Bytes,
    },
    IceCandidate {
        from: ParticipantId,
        to: ParticipantId,
        candidate: Bytes,
    },
    /// Hang up toward `peer`, or leave the relay entirely when `None`.
    Close {
        peer: Option<ParticipantId>,
    },
    /// `from` hung up its side of the session.
    Closed {
        from: ParticipantId,
    },
    FetchOffers,
    /// Cached offers, batched so no frame exceeds the body limit.
    PendingOffers {
        offers: Vec<(ParticipantId, Bytes)>,
        last: bool,
    },

    // Keepalive
    Ping {
        nonce: u64,
    },
    Pong {
        nonce: u64,
    },
}

impl SignalingMsg {
    /// Short variant name for logging; payloads never end up in the log.
    pub fn kind(&self) -> &'static str {
        use SignalingMsg::*;
        match self {
            Join => "Join",
            Joined { .. } => "Joined",
            ListIds => "ListIds",
            Ids { .. } => "Ids",
            Left { .. } => "Left",
            Pair { .. } => "Pair",
            Paired { .. } => "Paired",
            PairClosed { .. } => "PairClosed",
            Offer { .. } => "Offer",
            Answer { .. } => "Answer",
            IceCandidate { .. } => "IceCandidate",
            Close { .. } => "Close",
            Closed { .. } => "Closed",
            FetchOffers => "FetchOffers",
            PendingOffers { .. } => "PendingOffers",
            Ping { .. } => "Ping",
            Pong { .. } => "Pong",
        }
    }

    /// Variants only the relay may send.
    pub fn is_server_push(&self) -> bool {
        use SignalingMsg::*;
        matches!(
            self,
            Joined { .. }
                | Ids { .. }
                | Left { .. }
                | Paired { .. }
                | PairClosed { .. }
                | Closed { .. }
                | PendingOffers { .. }
                | Pong { .. }
        )
    }

    /// Addressed receiver of a relayable message.
    pub fn receiver(&self) -> Option<ParticipantId> {
        use SignalingMsg::*;
        match self {
            Offer { to, .. } | Answer { to, .. } | IceCandidate { to, .. } => Some(*to),
            _ => None,
        }
    }

    /// Overwrite the sender field of a relayable message.
    pub(crate) fn stamp_sender(&mut self, sender: ParticipantId) {
        use SignalingMsg::*;
        match self {
            Offer { from, .. } | Answer { from, .. } | IceCandidate { from, .. } => *from = sender,
            Closed { from } => *from = sender,
            _ => {}
        }
    }
}
