use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{Arc, mpsc};
use std::thread;

use crate::log::{LogSink, NoopLogSink};
use crate::signaling::controller::SessionController;
use crate::signaling::runtime::run_server_loop;
use crate::signaling::server_event::ServerEvent;
use crate::signaling::transport::spawn_connection_threads;
use crate::{sink_error, sink_info, sink_warn};

/// Top-level runtime object for the relay.
///
/// Binding is separate from [`run`](Self::run) so callers (tests in
/// particular) can bind port 0 and read the real address first.
pub struct SignalingServer {
    listener: TcpListener,
    log: Arc<dyn LogSink>,
}

impl SignalingServer {
    pub fn bind<A: ToSocketAddrs>(addr: A, log: Arc<dyn LogSink>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, log })
    }

    pub fn bind_no_log<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Self::bind(addr, Arc::new(NoopLogSink))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Blocking main loop: spawn the server loop thread, then accept
    /// connections forever.
    pub fn run(self) -> io::Result<()> {
        let Self { listener, log } = self;

        // Events from all connections → server loop
        let (server_tx, server_rx) = mpsc::channel::<ServerEvent>();

        {
            let log_for_loop = log.clone();
            let controller = SessionController::with_log(log.clone());
            thread::Builder::new()
                .name("relay-loop".into())
                .spawn(move || {
                    sink_info!(log_for_loop, "server loop started");
                    run_server_loop(controller, log_for_loop, server_rx);
                })?;
        }

        sink_info!(log, "signaling relay listening on {}", listener.local_addr()?);

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    sink_warn!(log, "accept failed: {} (continuing to accept)", e);
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".into());

            match spawn_connection_threads(stream, server_tx.clone(), log.clone()) {
                Ok(id) => sink_info!(log, "accepted {} as participant {}", peer, id),
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    sink_error!(log, "server loop is gone, stopping accept loop: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    sink_warn!(log, "could not set up connection from {}: {}", peer, e);
                }
            }
        }

        Ok(())
    }
}
