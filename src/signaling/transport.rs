use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use crate::log::LogSink;
use crate::signaling::protocol::{FrameError, SignalingMsg, read_msg, write_msg};
use crate::signaling::server_event::ServerEvent;
use crate::signaling::types::ParticipantId;
use crate::{sink_debug, sink_trace, sink_warn};

/// Thin wrapper over a blocking stream that speaks in `SignalingMsg`.
pub struct Connection<S> {
    pub id: ParticipantId,
    stream: S,
}

impl<S> Connection<S>
where
    S: Read + Write,
{
    pub fn new(id: ParticipantId, stream: S) -> Self {
        Self { id, stream }
    }

    pub fn recv(&mut self) -> Result<SignalingMsg, FrameError> {
        read_msg(&mut self.stream)
    }

    pub fn send(&mut self, msg: &SignalingMsg) -> Result<(), FrameError> {
        write_msg(&mut self.stream, msg)
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn loop_gone() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "server loop is not running")
}

/// Unregister `id` if its connection could not be brought up.
fn evict_on_err<T>(
    res: io::Result<T>,
    server_tx: &Sender<ServerEvent>,
    id: ParticipantId,
) -> io::Result<T> {
    if res.is_err() {
        let _ = server_tx.send(ServerEvent::Disconnected { id });
    }
    res
}

/// Register a TCP connection with the server loop and start its reader and
/// writer threads. Returns the id the registry assigned.
///
/// The outbox sender is handed to the server loop and not kept here, so when
/// the controller evicts the participant the writer's channel closes; the
/// writer then shuts the socket down, which also ends the reader.
pub fn spawn_connection_threads(
    stream: TcpStream,
    server_tx: Sender<ServerEvent>,
    log: Arc<dyn LogSink>,
) -> io::Result<ParticipantId> {
    let read_stream = stream.try_clone()?;
    let write_stream = stream;

    let (to_client_tx, to_client_rx) = mpsc::channel::<SignalingMsg>();
    let (reply_tx, reply_rx) = mpsc::channel::<ParticipantId>();
    server_tx
        .send(ServerEvent::Connect {
            to_client: to_client_tx,
            reply: reply_tx,
        })
        .map_err(|_| loop_gone())?;
    let id = reply_rx.recv().map_err(|_| loop_gone())?;

    // WRITER THREAD: to_client_rx -> socket
    let writer = {
        let server_tx = server_tx.clone();
        let log = log.clone();
        thread::Builder::new()
            .name(format!("conn-{id}-wr"))
            .spawn(move || {
                let mut conn = Connection::new(id, write_stream);
                while let Ok(msg) = to_client_rx.recv() {
                    if let Err(e) = conn.send(&msg) {
                        sink_warn!(log, "[conn {}] error sending {}: {}", id, msg.kind(), e);
                        let _ = server_tx.send(ServerEvent::Disconnected { id });
                        break;
                    }
                    sink_trace!(log, "[conn {}] wrote {}", id, msg.kind());
                }
                // Evicted or write failed: make sure the reader wakes up too.
                let _ = conn.into_inner().shutdown(Shutdown::Both);
            })
    };
    // Without a writer, dropping `read_stream` on return closes the socket.
    let _writer = evict_on_err(writer, &server_tx, id)?;

    // READER THREAD: socket -> ServerEvent::MsgFromClient
    let reader = {
        let server_tx = server_tx.clone();
        thread::Builder::new()
            .name(format!("conn-{id}-rd"))
            .spawn(move || {
                let mut conn = Connection::new(id, read_stream);
                loop {
                    match conn.recv() {
                        Ok(msg) => {
                            if server_tx
                                .send(ServerEvent::MsgFromClient { id, msg })
                                .is_err()
                            {
                                break;
                            }
                        }
                        Err(e) => {
                            if e.is_disconnect() {
                                sink_debug!(log, "[conn {}] closed by peer", id);
                            } else {
                                sink_warn!(log, "[conn {}] reader error: {}", id, e);
                            }
                            let _ = server_tx.send(ServerEvent::Disconnected { id });
                            break;
                        }
                    }
                }
            })
    };
    // The eviction drops the outbox, so the running writer shuts the socket.
    let _reader = evict_on_err(reader, &server_tx, id)?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::io::Cursor;

    #[test]
    fn connection_reads_what_it_writes() {
        let mut out = Connection::new(1, Cursor::new(Vec::new()));
        out.send(&SignalingMsg::Ping { nonce: 3 }).unwrap();
        out.send(&SignalingMsg::ListIds).unwrap();

        let wire = out.into_inner().into_inner();
        let mut back = Connection::new(1, Cursor::new(wire));
        assert_eq!(back.recv().unwrap(), SignalingMsg::Ping { nonce: 3 });
        assert_eq!(back.recv().unwrap(), SignalingMsg::ListIds);
        assert!(back.recv().unwrap_err().is_disconnect());
    }

    #[test]
    fn failed_thread_setup_unregisters_the_participant() {
        let (server_tx, server_rx) = mpsc::channel();

        let failed: io::Result<()> = Err(io::Error::other("thread limit"));
        assert!(evict_on_err(failed, &server_tx, 4).is_err());
        assert!(matches!(
            server_rx.try_recv(),
            Ok(ServerEvent::Disconnected { id: 4 })
        ));

        assert!(evict_on_err(Ok(()), &server_tx, 5).is_ok());
        assert!(server_rx.try_recv().is_err());
    }
}
