use std::collections::VecDeque;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::signaling::protocol::{SignalingMsg, read_msg, write_msg};
use crate::signaling::types::ParticipantId;
use crate::signaling_client::SignalingClientError;

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

type Result<T> = std::result::Result<T, SignalingClientError>;

/// One participant's connection to the relay.
///
/// A background thread decodes incoming frames into a queue. Request helpers
/// such as [`list_ids`](Self::list_ids) wait for their reply and park anything
/// else that arrives meanwhile, so no pushed message is lost; it comes out of
/// [`recv_timeout`](Self::recv_timeout) later, in arrival order.
pub struct SignalingClient {
    stream: TcpStream,
    inbox: Receiver<SignalingMsg>,
    backlog: VecDeque<SignalingMsg>,
    id: Option<ParticipantId>,
    reply_timeout: Duration,
}

impl SignalingClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let mut read_stream = stream.try_clone()?;

        let (tx, inbox) = mpsc::channel();
        thread::Builder::new()
            .name("signaling-client-rd".into())
            .spawn(move || {
                while let Ok(msg) = read_msg(&mut read_stream) {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            stream,
            inbox,
            backlog: VecDeque::new(),
            id: None,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        })
    }

    pub fn set_reply_timeout(&mut self, timeout: Duration) {
        self.reply_timeout = timeout;
    }

    /// Id learned from the last successful [`join`](Self::join).
    pub fn id(&self) -> Option<ParticipantId> {
        self.id
    }

    pub fn send(&mut self, msg: &SignalingMsg) -> Result<()> {
        write_msg(&mut self.stream, msg)?;
        Ok(())
    }

    /// Next message from the relay, or `None` if nothing arrived in `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<SignalingMsg>> {
        if let Some(msg) = self.backlog.pop_front() {
            return Ok(Some(msg));
        }
        match self.inbox.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SignalingClientError::Disconnected),
        }
    }

    /// Ask the relay for this connection's id.
    pub fn join(&mut self) -> Result<ParticipantId> {
        self.send(&SignalingMsg::Join)?;
        let id = match self.wait_for(|m| matches!(m, SignalingMsg::Joined { .. }))? {
            SignalingMsg::Joined { id } => id,
            _ => return Err(SignalingClientError::Disconnected),
        };
        self.id = Some(id);
        Ok(id)
    }

    /// Every live id. Collects all batches of the reply.
    pub fn list_ids(&mut self) -> Result<Vec<ParticipantId>> {
        self.send(&SignalingMsg::ListIds)?;
        let mut all = Vec::new();
        loop {
            match self.wait_for(|m| matches!(m, SignalingMsg::Ids { .. }))? {
                SignalingMsg::Ids { ids, last } => {
                    all.extend(ids);
                    if last {
                        return Ok(all);
                    }
                }
                _ => return Err(SignalingClientError::Disconnected),
            }
        }
    }

    /// Offers cached by other participants. Collects all batches of the reply.
    pub fn fetch_offers(&mut self) -> Result<Vec<(ParticipantId, Bytes)>> {
        self.send(&SignalingMsg::FetchOffers)?;
        let mut all = Vec::new();
        loop {
            match self.wait_for(|m| matches!(m, SignalingMsg::PendingOffers { .. }))? {
                SignalingMsg::PendingOffers { offers, last } => {
                    all.extend(offers);
                    if last {
                        return Ok(all);
                    }
                }
                _ => return Err(SignalingClientError::Disconnected),
            }
        }
    }

    /// Round-trip a keepalive.
    pub fn ping(&mut self, nonce: u64) -> Result<()> {
        self.send(&SignalingMsg::Ping { nonce })?;
        self.wait_for(|m| matches!(m, SignalingMsg::Pong { nonce: n } if *n == nonce))?;
        Ok(())
    }

    pub fn send_offer(&mut self, to: ParticipantId, sdp: impl Into<Bytes>) -> Result<()> {
        self.send(&SignalingMsg::Offer {
            from: self.id.unwrap_or_default(),
            to,
            sdp: sdp.into(),
        })
    }

    pub fn send_answer(&mut self, to: ParticipantId, sdp: impl Into<Bytes>) -> Result<()> {
        self.send(&SignalingMsg::Answer {
            from: self.id.unwrap_or_default(),
            to,
            sdp: sdp.into(),
        })
    }

    pub fn send_ice_candidate(
        &mut self,
        to: ParticipantId,
        candidate: impl Into<Bytes>,
    ) -> Result<()> {
        self.send(&SignalingMsg::IceCandidate {
            from: self.id.unwrap_or_default(),
            to,
            candidate: candidate.into(),
        })
    }

    /// Hang up toward `peer`; the connection stays open.
    pub fn close(&mut self, peer: ParticipantId) -> Result<()> {
        self.send(&SignalingMsg::Close { peer: Some(peer) })
    }

    /// Ask the relay to drop this participant. The relay closes the socket.
    pub fn leave(&mut self) -> Result<()> {
        self.send(&SignalingMsg::Close { peer: None })
    }

    /// Request a pair link with `peer`. Success shows up as `Paired`; a
    /// refused request gets no reply.
    pub fn pair(&mut self, peer: ParticipantId) -> Result<()> {
        self.send(&SignalingMsg::Pair { peer })
    }

    /// Close the socket without saying goodbye.
    pub fn disconnect(self) {
        drop(self);
    }

    fn wait_for(&mut self, want: impl Fn(&SignalingMsg) -> bool) -> Result<SignalingMsg> {
        if let Some(pos) = self.backlog.iter().position(&want) {
            if let Some(msg) = self.backlog.remove(pos) {
                return Ok(msg);
            }
        }

        let deadline = Instant::now() + self.reply_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SignalingClientError::Timeout);
            }
            match self.inbox.recv_timeout(remaining) {
                Ok(msg) if want(&msg) => return Ok(msg),
                Ok(msg) => self.backlog.push_back(msg),
                Err(RecvTimeoutError::Timeout) => return Err(SignalingClientError::Timeout),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SignalingClientError::Disconnected);
                }
            }
        }
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
