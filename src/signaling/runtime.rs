use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use crate::log::LogSink;
use crate::signaling::controller::SessionController;
use crate::signaling::protocol::SignalingMsg;
use crate::signaling::server_event::ServerEvent;
use crate::{sink_debug, sink_info, sink_warn};

/// Central server loop: the only owner of the controller.
///
/// Events are applied strictly in arrival order. Returns once every
/// `Sender<ServerEvent>` has been dropped.
pub fn run_server_loop(
    mut controller: SessionController<Sender<SignalingMsg>>,
    log: Arc<dyn LogSink>,
    rx: Receiver<ServerEvent>,
) {
    use ServerEvent::*;

    while let Ok(ev) = rx.recv() {
        match ev {
            Connect { to_client, reply } => {
                let id = controller.connect(to_client);
                if reply.send(id).is_err() {
                    // Connection gave up before learning its id.
                    sink_warn!(log, "participant {} vanished during connect", id);
                    controller.disconnect(id);
                }
            }

            MsgFromClient { id, msg } => {
                sink_debug!(log, "{} from participant {}", msg.kind(), id);
                controller.handle(id, msg);
            }

            Disconnected { id } => {
                if controller.disconnect(id) {
                    sink_info!(log, "participant {} disconnected (transport)", id);
                }
            }
        }
    }

    sink_info!(
        log,
        "event channel closed; server loop shutting down ({} participants left)",
        controller.registry().len()
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use bytes::Bytes;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(500);

    fn connect(ev_tx: &Sender<ServerEvent>) -> (u64, mpsc::Receiver<SignalingMsg>) {
        let (to_client, from_server) = mpsc::channel();
        let (reply, id_rx) = mpsc::channel();
        ev_tx.send(ServerEvent::Connect { to_client, reply }).unwrap();
        (id_rx.recv_timeout(WAIT).unwrap(), from_server)
    }

    #[test]
    fn loop_assigns_ids_relays_and_announces_departures() {
        let (ev_tx, ev_rx) = mpsc::channel::<ServerEvent>();
        let server = thread::spawn(move || {
            let log: Arc<dyn LogSink> = Arc::new(NoopLogSink);
            run_server_loop(SessionController::with_log(log.clone()), log, ev_rx);
        });

        let (a, rx_a) = connect(&ev_tx);
        let (b, rx_b) = connect(&ev_tx);
        assert_eq!((a, b), (1, 2));

        ev_tx
            .send(ServerEvent::MsgFromClient {
                id: a,
                msg: SignalingMsg::Answer {
                    from: 0,
                    to: b,
                    sdp: Bytes::from_static(b"v=0"),
                },
            })
            .unwrap();

        match rx_b.recv_timeout(WAIT).expect("answer should arrive") {
            SignalingMsg::Answer { from, .. } => assert_eq!(from, a),
            other => panic!("expected Answer, got {other:?}"),
        }

        ev_tx.send(ServerEvent::Disconnected { id: b }).unwrap();
        assert_eq!(
            rx_a.recv_timeout(WAIT).unwrap(),
            SignalingMsg::Left { id: b }
        );
        // b's outbox sender was dropped by the controller.
        assert!(rx_b.recv_timeout(WAIT).is_err());

        drop(ev_tx);
        server.join().unwrap();
    }

    #[test]
    fn abandoned_connect_is_rolled_back() {
        let (ev_tx, ev_rx) = mpsc::channel::<ServerEvent>();
        let server = thread::spawn(move || {
            run_server_loop(SessionController::new(), Arc::new(NoopLogSink), ev_rx);
        });

        let (to_client, _from_server) = mpsc::channel();
        let (reply, id_rx) = mpsc::channel();
        drop(id_rx);
        ev_tx.send(ServerEvent::Connect { to_client, reply }).unwrap();

        let (a, rx_a) = connect(&ev_tx);
        assert_eq!(a, 2);
        ev_tx
            .send(ServerEvent::MsgFromClient {
                id: a,
                msg: SignalingMsg::ListIds,
            })
            .unwrap();
        assert_eq!(
            rx_a.recv_timeout(WAIT).unwrap(),
            SignalingMsg::Ids {
                ids: vec![2],
                last: true
            }
        );

        drop(ev_tx);
        server.join().unwrap();
    }
}
