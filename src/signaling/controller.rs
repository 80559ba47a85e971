use std::sync::Arc;

use crate::log::{LogSink, NoopLogSink};
use crate::signaling::errors::DropReason;
use crate::signaling::pairs::{PairGroups, Teardown};
use crate::signaling::pending_offers::PendingOffers;
use crate::signaling::protocol::{SignalingMsg, batch_ids, batch_pending_offers};
use crate::signaling::registry::Registry;
use crate::signaling::relay::Relay;
use crate::signaling::types::{Outbox, ParticipantId};
use crate::{sink_debug, sink_info, sink_warn};

/// Owns every piece of relay state and drives participants from connect to
/// disconnect.
///
/// A controller is meant to be owned by a single thread (see
/// [`run_server_loop`](crate::signaling::runtime::run_server_loop)); nothing in
/// here locks.
pub struct SessionController<C> {
    registry: Registry<C>,
    relay: Relay,
    offers: PendingOffers,
    pairs: PairGroups,
    log: Arc<dyn LogSink>,
}

impl<C: Outbox> Default for SessionController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Outbox> SessionController<C> {
    pub fn new() -> Self {
        Self::with_log(Arc::new(NoopLogSink))
    }

    pub fn with_log(log: Arc<dyn LogSink>) -> Self {
        Self {
            registry: Registry::new(),
            relay: Relay::with_log(log.clone()),
            offers: PendingOffers::new(),
            pairs: PairGroups::new(),
            log,
        }
    }

    /// Register a freshly connected endpoint.
    pub fn connect(&mut self, channel: C) -> ParticipantId {
        let id = self.registry.register(channel);
        sink_info!(
            self.log,
            "participant {} connected ({} live)",
            id,
            self.registry.len()
        );
        id
    }

    /// Register two endpoints that live and die together, e.g. the two
    /// windows of one local call.
    pub fn open_pair(&mut self, first: C, second: C) -> (ParticipantId, ParticipantId) {
        let a = self.connect(first);
        let b = self.connect(second);
        if let Err(e) = self.pairs.link(a, b) {
            sink_warn!(self.log, "could not pair {} and {}: {:?}", a, b, e);
        }
        (a, b)
    }

    /// Every live id, the requester's included. Empty if `requester` is not live.
    pub fn list_ids(&self, requester: ParticipantId) -> Vec<ParticipantId> {
        self.registry.list_ids(requester)
    }

    /// Dispatch one message received from participant `from`.
    pub fn handle(&mut self, from: ParticipantId, msg: SignalingMsg) {
        if !self.registry.contains(from) {
            sink_warn!(
                self.log,
                "dropped {} from {}: {}",
                msg.kind(),
                from,
                DropReason::UnregisteredSender
            );
            return;
        }
        if msg.is_server_push() {
            sink_warn!(
                self.log,
                "ignoring relay-only {} from participant {}",
                msg.kind(),
                from
            );
            return;
        }

        match msg {
            SignalingMsg::Join => self.push(from, SignalingMsg::Joined { id: from }),

            SignalingMsg::ListIds => {
                for batch in batch_ids(self.list_ids(from)) {
                    self.push(from, batch);
                }
            }

            SignalingMsg::Offer { ref sdp, .. } => {
                self.offers.store(from, sdp.clone());
                self.relay.forward(&self.registry, from, msg);
            }

            SignalingMsg::Answer { .. } | SignalingMsg::IceCandidate { .. } => {
                self.relay.forward(&self.registry, from, msg);
            }

            SignalingMsg::FetchOffers => {
                for batch in batch_pending_offers(self.offers.visible_to(from)) {
                    self.push(from, batch);
                }
            }

            SignalingMsg::Close { peer: Some(peer) } => {
                self.relay.notify_closed(&self.registry, from, peer);
            }

            SignalingMsg::Close { peer: None } => {
                self.disconnect(from);
            }

            SignalingMsg::Pair { peer } => self.handle_pair(from, peer),

            SignalingMsg::Ping { nonce } => self.push(from, SignalingMsg::Pong { nonce }),

            // Filtered by `is_server_push` above.
            SignalingMsg::Joined { .. }
            | SignalingMsg::Ids { .. }
            | SignalingMsg::Left { .. }
            | SignalingMsg::Paired { .. }
            | SignalingMsg::PairClosed { .. }
            | SignalingMsg::Closed { .. }
            | SignalingMsg::PendingOffers { .. }
            | SignalingMsg::Pong { .. } => {}
        }
    }

    /// Remove a participant and tell everyone else.
    ///
    /// Returns `false` if `id` was not live, in which case nothing happens.
    /// Closing one member of a pair closes the other as well, exactly once.
    pub fn disconnect(&mut self, id: ParticipantId) -> bool {
        if self.registry.unregister(id).is_none() {
            sink_debug!(self.log, "disconnect of {} ignored: not live", id);
            return false;
        }
        sink_info!(
            self.log,
            "participant {} left ({} live)",
            id,
            self.registry.len()
        );

        for other in self.registry.ids() {
            self.push(other, SignalingMsg::Left { id });
        }

        if self.offers.discard(id) {
            sink_debug!(self.log, "discarded pending offer of {}", id);
        }

        match self.pairs.begin_teardown(id) {
            Teardown::CloseSibling(sibling) => {
                sink_info!(self.log, "closing {} with its pair sibling {}", sibling, id);
                self.push(sibling, SignalingMsg::PairClosed { sibling: id });
                self.disconnect(sibling);
            }
            Teardown::AlreadyClosing | Teardown::NotPaired => {}
        }

        true
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    pub fn pending_offers(&self) -> &PendingOffers {
        &self.offers
    }

    pub fn pairs(&self) -> &PairGroups {
        &self.pairs
    }

    fn handle_pair(&mut self, from: ParticipantId, peer: ParticipantId) {
        if !self.registry.contains(peer) {
            sink_warn!(self.log, "pair {} -> {} dropped: peer not live", from, peer);
            return;
        }
        match self.pairs.link(from, peer) {
            Ok(()) => {
                sink_info!(self.log, "paired {} and {}", from, peer);
                self.push(from, SignalingMsg::Paired { peer });
                self.push(peer, SignalingMsg::Paired { peer: from });
            }
            Err(e) => sink_warn!(self.log, "pair {} -> {} dropped: {:?}", from, peer, e),
        }
    }

    /// Relay-originated message to one participant. Failures are logged only.
    fn push(&self, to: ParticipantId, msg: SignalingMsg) {
        let Some(outbox) = self.registry.lookup(to) else {
            sink_debug!(self.log, "{} for {} skipped: not live", msg.kind(), to);
            return;
        };
        if let Err(msg) = outbox.push(msg) {
            sink_warn!(
                self.log,
                "dropped {} for {}: {}",
                msg.kind(),
                to,
                DropReason::ChannelClosed
            );
        }
    }
}
