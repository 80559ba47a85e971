use std::sync::Arc;

use crate::log::{LogSink, NoopLogSink};
use crate::signaling::errors::DropReason;
use crate::signaling::protocol::SignalingMsg;
use crate::signaling::registry::Registry;
use crate::signaling::types::{Outbox, ParticipantId};
use crate::{sink_debug, sink_warn};

/// Outcome of a single forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped(DropReason),
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Moves addressed signaling messages from one participant to another.
///
/// Stateless apart from the log: it reads the registry the controller hands it
/// and pushes straight into the receiver's outbox. There is no buffering and
/// no retry, so per-receiver order is the order of `forward` calls.
pub struct Relay {
    log: Arc<dyn LogSink>,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        Self::with_log(Arc::new(NoopLogSink))
    }

    pub fn with_log(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// Forward an `Offer`, `Answer` or `IceCandidate` to the participant named
    /// in its `to` field, with `from` overwritten by `sender`.
    pub fn forward<C: Outbox>(
        &self,
        registry: &Registry<C>,
        sender: ParticipantId,
        mut msg: SignalingMsg,
    ) -> Delivery {
        if !registry.contains(sender) {
            return self.dropped(sender, None, &msg, DropReason::UnregisteredSender);
        }
        let Some(to) = msg.receiver() else {
            return self.dropped(sender, None, &msg, DropReason::NotRelayable);
        };

        msg.stamp_sender(sender);
        self.deliver(registry, sender, to, msg)
    }

    /// Tell `to` that `sender` hung up its side of their session.
    pub fn notify_closed<C: Outbox>(
        &self,
        registry: &Registry<C>,
        sender: ParticipantId,
        to: ParticipantId,
    ) -> Delivery {
        if !registry.contains(sender) {
            let msg = SignalingMsg::Closed { from: sender };
            return self.dropped(sender, Some(to), &msg, DropReason::UnregisteredSender);
        }
        self.deliver(registry, sender, to, SignalingMsg::Closed { from: sender })
    }

    fn deliver<C: Outbox>(
        &self,
        registry: &Registry<C>,
        sender: ParticipantId,
        to: ParticipantId,
        msg: SignalingMsg,
    ) -> Delivery {
        let Some(outbox) = registry.lookup(to) else {
            let reason = if registry.was_issued(to) {
                DropReason::StaleSessionReference
            } else {
                DropReason::UnknownReceiver
            };
            return self.dropped(sender, Some(to), &msg, reason);
        };

        let kind = msg.kind();
        match outbox.push(msg) {
            Ok(()) => {
                sink_debug!(self.log, "relayed {} {} -> {}", kind, sender, to);
                Delivery::Delivered
            }
            Err(msg) => self.dropped(sender, Some(to), &msg, DropReason::ChannelClosed),
        }
    }

    fn dropped(
        &self,
        sender: ParticipantId,
        to: Option<ParticipantId>,
        msg: &SignalingMsg,
        reason: DropReason,
    ) -> Delivery {
        match to {
            Some(to) => sink_warn!(
                self.log,
                "dropped {} {} -> {}: {}",
                msg.kind(),
                sender,
                to,
                reason
            ),
            None => sink_warn!(self.log, "dropped {} from {}: {}", msg.kind(), sender, reason),
        }
        Delivery::Dropped(reason)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use bytes::Bytes;
    use std::sync::mpsc::{self, Receiver, Sender};

    fn offer(to: ParticipantId, sdp: &'static [u8]) -> SignalingMsg {
        SignalingMsg::Offer {
            from: 0,
            to,
            sdp: Bytes::from_static(sdp),
        }
    }

    fn two_participants() -> (
        Registry<Sender<SignalingMsg>>,
        (ParticipantId, Receiver<SignalingMsg>),
        (ParticipantId, Receiver<SignalingMsg>),
    ) {
        let mut reg = Registry::new();
        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        let a = reg.register(tx_a);
        let b = reg.register(tx_b);
        (reg, (a, rx_a), (b, rx_b))
    }

    #[test]
    fn forwarded_offer_carries_sender_id() {
        let (reg, (a, _rx_a), (b, rx_b)) = two_participants();
        let relay = Relay::new();

        let spoofed = SignalingMsg::Offer {
            from: 77,
            to: b,
            sdp: Bytes::from_static(b"x"),
        };
        assert_eq!(relay.forward(&reg, a, spoofed), Delivery::Delivered);

        match rx_b.try_recv().unwrap() {
            SignalingMsg::Offer { from, to, sdp } => {
                assert_eq!(from, a);
                assert_eq!(to, b);
                assert_eq!(&sdp[..], b"x");
            }
            other => panic!("expected Offer, got {other:?}"),
        }
    }

    #[test]
    fn preserves_order_per_receiver() {
        let (reg, (a, _rx_a), (b, rx_b)) = two_participants();
        let relay = Relay::new();

        relay.forward(&reg, a, offer(b, b"m1"));
        relay.forward(
            &reg,
            a,
            SignalingMsg::IceCandidate {
                from: 0,
                to: b,
                candidate: Bytes::from_static(b"m2"),
            },
        );

        let got: Vec<_> = rx_b.try_iter().map(|m| m.kind()).collect();
        assert_eq!(got, vec!["Offer", "IceCandidate"]);
    }

    #[test]
    fn unknown_and_stale_receivers_are_told_apart() {
        let (mut reg, (a, _rx_a), (b, rx_b)) = two_participants();
        let relay = Relay::new();

        assert_eq!(
            relay.forward(&reg, a, offer(99, b"x")),
            Delivery::Dropped(DropReason::UnknownReceiver)
        );

        reg.unregister(b);
        drop(rx_b);
        assert_eq!(
            relay.forward(&reg, a, offer(b, b"x")),
            Delivery::Dropped(DropReason::StaleSessionReference)
        );
    }

    #[cfg(feature = "log-warn")]
    #[test]
    fn drops_are_logged_with_their_cause() {
        use crate::log::{CaptureLogSink, LogLevel};

        let (reg, (a, _rx_a), (_b, _rx_b)) = two_participants();
        let log = Arc::new(CaptureLogSink::new());
        let relay = Relay::with_log(log.clone());

        relay.forward(&reg, a, offer(99, b"x"));
        assert_eq!(log.count(LogLevel::Warn, "unknown receiver"), 1);
        assert_eq!(log.count(LogLevel::Warn, "already left"), 0);
    }

    #[test]
    fn closed_channel_is_a_drop() {
        let (reg, (a, _rx_a), (b, rx_b)) = two_participants();
        drop(rx_b);
        let relay = Relay::new();
        assert_eq!(
            relay.forward(&reg, a, offer(b, b"x")),
            Delivery::Dropped(DropReason::ChannelClosed)
        );
    }

    #[test]
    fn unregistered_sender_and_unaddressed_kinds_are_refused() {
        let (reg, (a, rx_a), (b, rx_b)) = two_participants();
        let relay = Relay::new();

        assert_eq!(
            relay.forward(&reg, 42, offer(b, b"x")),
            Delivery::Dropped(DropReason::UnregisteredSender)
        );
        assert_eq!(
            relay.forward(&reg, a, SignalingMsg::ListIds),
            Delivery::Dropped(DropReason::NotRelayable)
        );
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn notify_closed_reaches_only_the_peer() {
        let (reg, (a, rx_a), (b, rx_b)) = two_participants();
        let relay = Relay::new();

        assert!(relay.notify_closed(&reg, a, b).is_delivered());
        assert_eq!(rx_b.try_recv().unwrap(), SignalingMsg::Closed { from: a });
        assert!(rx_a.try_recv().is_err());
    }
}
