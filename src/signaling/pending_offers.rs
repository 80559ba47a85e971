use std::collections::HashMap;

use bytes::Bytes;

use crate::signaling::types::ParticipantId;

/// Most recent offer each participant sent, so a participant that shows up
/// after the offer went out can still pick it up.
#[derive(Debug, Default)]
pub struct PendingOffers {
    by_sender: HashMap<ParticipantId, Bytes>,
}

impl PendingOffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `sdp` as `sender`'s current offer, replacing any older one.
    pub fn store(&mut self, sender: ParticipantId, sdp: Bytes) {
        self.by_sender.insert(sender, sdp);
    }

    /// Forget `sender`'s offer. Returns whether there was one.
    pub fn discard(&mut self, sender: ParticipantId) -> bool {
        self.by_sender.remove(&sender).is_some()
    }

    pub fn get(&self, sender: ParticipantId) -> Option<&Bytes> {
        self.by_sender.get(&sender)
    }

    /// All cached offers not sent by `requester`, ascending by sender id.
    pub fn visible_to(&self, requester: ParticipantId) -> Vec<(ParticipantId, Bytes)> {
        let mut offers: Vec<(ParticipantId, Bytes)> = self
            .by_sender
            .iter()
            .filter(|(sender, _)| **sender != requester)
            .map(|(sender, sdp)| (*sender, sdp.clone()))
            .collect();
        offers.sort_unstable_by_key(|(sender, _)| *sender);
        offers
    }

    pub fn len(&self) -> usize {
        self.by_sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sender.is_empty()
    }
}
