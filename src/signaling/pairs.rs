use std::collections::HashMap;

use crate::signaling::types::ParticipantId;

/// Two participants created together; closing one closes the other.
#[derive(Debug)]
struct PairGroup {
    members: [ParticipantId; 2],
    /// Set once teardown starts; the sibling's own close must not restart it.
    closing: bool,
}

impl PairGroup {
    fn sibling_of(&self, id: ParticipantId) -> ParticipantId {
        if self.members[0] == id {
            self.members[1]
        } else {
            self.members[0]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairError {
    SameParticipant,
    AlreadyPaired(ParticipantId),
}

/// What the controller has to do when a paired participant goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    NotPaired,
    /// First member to leave: the sibling must be closed too.
    CloseSibling(ParticipantId),
    /// Teardown was already started by the sibling; nothing more to do.
    AlreadyClosing,
}

#[derive(Debug, Default)]
pub struct PairGroups {
    next_group: u64,
    groups: HashMap<u64, PairGroup>,
    by_member: HashMap<ParticipantId, u64>,
}

impl PairGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&mut self, a: ParticipantId, b: ParticipantId) -> Result<(), PairError> {
        if a == b {
            return Err(PairError::SameParticipant);
        }
        for id in [a, b] {
            if self.by_member.contains_key(&id) {
                return Err(PairError::AlreadyPaired(id));
            }
        }

        let gid = self.next_group;
        self.next_group += 1;
        self.groups.insert(
            gid,
            PairGroup {
                members: [a, b],
                closing: false,
            },
        );
        self.by_member.insert(a, gid);
        self.by_member.insert(b, gid);
        Ok(())
    }

    pub fn sibling(&self, id: ParticipantId) -> Option<ParticipantId> {
        let gid = self.by_member.get(&id)?;
        self.groups.get(gid).map(|g| g.sibling_of(id))
    }

    /// Record that `id` is leaving and decide whether its sibling must follow.
    ///
    /// The first call for a group flips its one-shot `closing` flag and returns
    /// the sibling; the sibling's later call sees the flag and returns
    /// [`Teardown::AlreadyClosing`], which also drops the group.
    pub fn begin_teardown(&mut self, id: ParticipantId) -> Teardown {
        let Some(gid) = self.by_member.remove(&id) else {
            return Teardown::NotPaired;
        };
        let Some(group) = self.groups.get_mut(&gid) else {
            return Teardown::NotPaired;
        };

        if group.closing {
            self.groups.remove(&gid);
            return Teardown::AlreadyClosing;
        }

        group.closing = true;
        Teardown::CloseSibling(group.sibling_of(id))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_fires_once_per_group() {
        let mut pairs = PairGroups::new();
        pairs.link(1, 2).unwrap_or_else(|e| panic!("link failed: {e:?}"));

        assert_eq!(pairs.begin_teardown(2), Teardown::CloseSibling(1));
        assert_eq!(pairs.begin_teardown(1), Teardown::AlreadyClosing);
        assert_eq!(pairs.begin_teardown(1), Teardown::NotPaired);
        assert!(pairs.is_empty());
    }

    #[test]
    fn link_rejects_self_and_double_pairing() {
        let mut pairs = PairGroups::new();
        assert_eq!(pairs.link(4, 4), Err(PairError::SameParticipant));
        assert_eq!(pairs.link(4, 5), Ok(()));
        assert_eq!(pairs.link(5, 6), Err(PairError::AlreadyPaired(5)));
        assert_eq!(pairs.sibling(5), Some(4));
        assert_eq!(pairs.sibling(6), None);
    }

    #[test]
    fn unpaired_member_has_nothing_to_tear_down() {
        let mut pairs = PairGroups::new();
        assert_eq!(pairs.begin_teardown(9), Teardown::NotPaired);
    }
}
