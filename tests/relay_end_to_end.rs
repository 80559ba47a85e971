use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use rtcrelay::signaling::SignalingServer;
use rtcrelay::signaling::protocol::SignalingMsg;
use rtcrelay::signaling_client::{SignalingClient, SignalingClientError};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

fn start_relay() -> SocketAddr {
    let server = SignalingServer::bind_no_log("127.0.0.1:0").unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run());
    addr
}

fn joined(addr: SocketAddr) -> (SignalingClient, u64) {
    let mut client = SignalingClient::connect(addr).unwrap();
    let id = client.join().unwrap();
    (client, id)
}

fn next(client: &mut SignalingClient) -> SignalingMsg {
    client
        .recv_timeout(WAIT)
        .unwrap()
        .expect("expected a message from the relay")
}

fn wait_disconnected(client: &mut SignalingClient) {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        match client.recv_timeout(QUIET) {
            Err(SignalingClientError::Disconnected) => return,
            Ok(Some(other)) => panic!("unexpected {other:?} before disconnect"),
            _ => {}
        }
    }
    panic!("relay did not close the connection");
}

#[test]
fn two_peers_negotiate_through_the_relay() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);
    let (mut bob, b) = joined(addr);
    assert_eq!((a, b), (1, 2));
    assert_eq!(alice.list_ids().unwrap(), vec![1, 2]);

    alice.send_offer(b, &b"v=0 offer"[..]).unwrap();
    assert_eq!(
        next(&mut bob),
        SignalingMsg::Offer {
            from: a,
            to: b,
            sdp: Bytes::from_static(b"v=0 offer"),
        }
    );

    bob.send_answer(a, &b"v=0 answer"[..]).unwrap();
    bob.send_ice_candidate(a, &b"candidate:1"[..]).unwrap();
    bob.send_ice_candidate(a, &b"candidate:2"[..]).unwrap();

    assert!(matches!(next(&mut alice), SignalingMsg::Answer { from, .. } if from == b));
    let order: Vec<Bytes> = (0..2)
        .map(|_| match next(&mut alice) {
            SignalingMsg::IceCandidate { candidate, .. } => candidate,
            other => panic!("expected IceCandidate, got {other:?}"),
        })
        .collect();
    assert_eq!(
        order,
        vec![
            Bytes::from_static(b"candidate:1"),
            Bytes::from_static(b"candidate:2"),
        ]
    );
}

#[test]
fn departure_is_announced_to_the_rest() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);
    let (bob, b) = joined(addr);

    bob.disconnect();

    assert_eq!(next(&mut alice), SignalingMsg::Left { id: b });
    assert_eq!(alice.list_ids().unwrap(), vec![a]);
}

#[test]
fn offer_to_unknown_id_is_dropped_silently() {
    let addr = start_relay();
    let (mut alice, _a) = joined(addr);
    let (mut bob, _b) = joined(addr);

    alice.send_offer(99, &b"x"[..]).unwrap();

    // No error comes back, nobody else hears about it and the relay is still
    // serving alice.
    alice.ping(7).unwrap();
    assert!(alice.recv_timeout(QUIET).unwrap().is_none());
    assert!(bob.recv_timeout(QUIET).unwrap().is_none());
}

#[test]
fn leave_closes_the_connection_and_notifies_others() {
    let addr = start_relay();
    let (mut alice, _a) = joined(addr);
    let (mut bob, b) = joined(addr);

    bob.leave().unwrap();

    wait_disconnected(&mut bob);
    assert_eq!(next(&mut alice), SignalingMsg::Left { id: b });
}

#[test]
fn hang_up_reaches_only_the_peer() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);
    let (mut bob, b) = joined(addr);
    let (mut carol, _c) = joined(addr);

    alice.close(b).unwrap();

    assert_eq!(next(&mut bob), SignalingMsg::Closed { from: a });
    assert!(carol.recv_timeout(QUIET).unwrap().is_none());
    assert_eq!(alice.list_ids().unwrap().len(), 3);
}

#[test]
fn paired_participants_close_together() {
    let addr = start_relay();
    let (mut left, l) = joined(addr);
    let (mut right, r) = joined(addr);
    let (mut watcher, _w) = joined(addr);

    left.pair(r).unwrap();
    assert_eq!(next(&mut left), SignalingMsg::Paired { peer: r });
    assert_eq!(next(&mut right), SignalingMsg::Paired { peer: l });

    left.disconnect();

    assert_eq!(next(&mut right), SignalingMsg::Left { id: l });
    assert_eq!(next(&mut right), SignalingMsg::PairClosed { sibling: l });
    wait_disconnected(&mut right);

    assert_eq!(next(&mut watcher), SignalingMsg::Left { id: l });
    assert_eq!(next(&mut watcher), SignalingMsg::Left { id: r });
    assert!(watcher.recv_timeout(QUIET).unwrap().is_none());
}

#[test]
fn late_joiner_picks_up_pending_offers() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);
    let (bob, b) = joined(addr);

    alice.send_offer(b, &b"for anyone"[..]).unwrap();
    bob.disconnect();
    assert_eq!(next(&mut alice), SignalingMsg::Left { id: b });

    let (mut carol, _c) = joined(addr);
    assert_eq!(
        carol.fetch_offers().unwrap(),
        vec![(a, Bytes::from_static(b"for anyone"))]
    );
    assert!(alice.fetch_offers().unwrap().is_empty());
}

#[test]
fn malformed_frame_ends_only_that_connection() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);

    let mut raw = TcpStream::connect(addr).unwrap();
    raw.set_read_timeout(Some(WAIT)).unwrap();
    let mut frame = Vec::new();
    frame.write_u8(9).unwrap(); // unsupported version
    frame.write_u8(0x01).unwrap();
    frame.write_u16::<BigEndian>(0).unwrap();
    frame.write_u32::<BigEndian>(0).unwrap();
    raw.write_all(&frame).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(raw.read(&mut buf).unwrap_or(0), 0, "relay should hang up");

    // The raw connection got id 2 and its departure is announced.
    assert_eq!(next(&mut alice), SignalingMsg::Left { id: a + 1 });
    assert_eq!(alice.list_ids().unwrap(), vec![a]);
}

#[test]
fn large_pending_offers_arrive_in_batches_without_dropping_the_requester() {
    let addr = start_relay();
    let (mut alice, a) = joined(addr);
    let (mut bob, b) = joined(addr);
    let (mut carol, c) = joined(addr);
    carol.set_reply_timeout(Duration::from_secs(10));

    let big = Bytes::from(vec![b'o'; 600 * 1024]);
    alice.send_offer(c, big.clone()).unwrap();
    bob.send_offer(c, big.clone()).unwrap();
    // Both offers reached carol, so both are cached.
    for _ in 0..2 {
        assert!(matches!(next(&mut carol), SignalingMsg::Offer { .. }));
    }

    let offers = carol.fetch_offers().unwrap();
    assert_eq!(offers, vec![(a, big.clone()), (b, big)]);

    // Still connected and served afterwards.
    assert_eq!(carol.list_ids().unwrap(), vec![a, b, c]);
}
