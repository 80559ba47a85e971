use std::collections::HashMap;

use crate::signaling::types::ParticipantId;

/// Live participants, keyed by the id the registry assigned them.
///
/// Ids come from a counter that starts at 1 and only moves forward, so an id
/// is never handed out twice in the lifetime of the registry. Participants
/// cannot pick their own id, which rules out duplicate joins.
#[derive(Debug)]
pub struct Registry<C> {
    participants: HashMap<ParticipantId, C>,
    next_id: ParticipantId,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            participants: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a newly connected endpoint and bind it to `channel`.
    pub fn register(&mut self, channel: C) -> ParticipantId {
        let id = self.next_id;
        self.next_id += 1;
        self.participants.insert(id, channel);
        id
    }

    /// Every live id, ascending.
    pub fn ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = self.participants.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// What a participant sees when it asks who is around: every live id,
    /// its own included. A requester that is not live gets an empty list.
    pub fn list_ids(&self, requester: ParticipantId) -> Vec<ParticipantId> {
        if !self.contains(requester) {
            return Vec::new();
        }
        self.ids()
    }

    /// Every live id except `id`, ascending.
    pub fn ids_except(&self, id: ParticipantId) -> Vec<ParticipantId> {
        let mut ids = self.ids();
        ids.retain(|other| *other != id);
        ids
    }

    pub fn lookup(&self, id: ParticipantId) -> Option<&C> {
        self.participants.get(&id)
    }

    /// Remove a participant. Unknown ids and repeated calls return `None`.
    pub fn unregister(&mut self, id: ParticipantId) -> Option<C> {
        self.participants.remove(&id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    /// True if `id` was handed out at some point, live or not.
    pub fn was_issued(&self, id: ParticipantId) -> bool {
        id >= 1 && id < self.next_id
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
