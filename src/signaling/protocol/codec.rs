use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;

use super::{MAX_BODY_LEN, MAX_LIST_ENTRIES, MsgType, ParticipantId, ProtoError, SignalingMsg};

/// `last` flag plus the `u16` entry count in front of every list body.
const LIST_PREFIX_LEN: usize = 3;

/// Sender id plus the `u32` length in front of each pending offer.
const OFFER_ENTRY_OVERHEAD: usize = 12;

// ---- Encode to body bytes -------------------------------------------------

pub fn encode_msg(msg: &SignalingMsg) -> Result<(MsgType, Vec<u8>), ProtoError> {
    use SignalingMsg::*;
    let mut body = Vec::new();

    let msg_type = match msg {
        Join => MsgType::Join,
        Joined { id } => {
            put_u64(&mut body, *id);
            MsgType::Joined
        }
        ListIds => MsgType::ListIds,
        Ids { ids, last } => {
            body.push(u8::from(*last));
            put_count(&mut body, ids.len())?;
            for id in ids {
                put_u64(&mut body, *id);
            }
            MsgType::Ids
        }
        Left { id } => {
            put_u64(&mut body, *id);
            MsgType::Left
        }

        Pair { peer } => {
            put_u64(&mut body, *peer);
            MsgType::Pair
        }
        Paired { peer } => {
            put_u64(&mut body, *peer);
            MsgType::Paired
        }
        PairClosed { sibling } => {
            put_u64(&mut body, *sibling);
            MsgType::PairClosed
        }

        Offer { from, to, sdp } => {
            put_addressed(&mut body, *from, *to, sdp)?;
            MsgType::Offer
        }
        Answer { from, to, sdp } => {
            put_addressed(&mut body, *from, *to, sdp)?;
            MsgType::Answer
        }
        IceCandidate {
            from,
            to,
            candidate,
        } => {
            put_addressed(&mut body, *from, *to, candidate)?;
            MsgType::IceCandidate
        }
        Close { peer } => {
            match peer {
                Some(p) => {
                    body.push(1);
                    put_u64(&mut body, *p);
                }
                None => body.push(0),
            }
            MsgType::Close
        }
        Closed { from } => {
            put_u64(&mut body, *from);
            MsgType::Closed
        }
        FetchOffers => MsgType::FetchOffers,
        PendingOffers { offers, last } => {
            body.push(u8::from(*last));
            put_count(&mut body, offers.len())?;
            for (id, sdp) in offers {
                put_u64(&mut body, *id);
                put_payload(&mut body, sdp)?;
            }
            MsgType::PendingOffers
        }

        Ping { nonce } => {
            put_u64(&mut body, *nonce);
            MsgType::Ping
        }
        Pong { nonce } => {
            put_u64(&mut body, *nonce);
            MsgType::Pong
        }
    };

    if body.len() > MAX_BODY_LEN {
        return Err(ProtoError::TooLarge {
            len: body.len(),
            max: MAX_BODY_LEN,
        });
    }
    Ok((msg_type, body))
}

// ---- Batching of list replies ---------------------------------------------

/// Split an id list into `Ids` messages that each fit the `u16` entry count.
/// Always yields at least one message; only the final one has `last` set.
pub fn batch_ids(ids: Vec<ParticipantId>) -> Vec<SignalingMsg> {
    if ids.is_empty() {
        return vec![SignalingMsg::Ids { ids, last: true }];
    }
    let batches: Vec<Vec<ParticipantId>> =
        ids.chunks(MAX_LIST_ENTRIES).map(<[_]>::to_vec).collect();
    let n = batches.len();
    batches
        .into_iter()
        .enumerate()
        .map(|(i, ids)| SignalingMsg::Ids {
            ids,
            last: i + 1 == n,
        })
        .collect()
}

/// Split cached offers into `PendingOffers` messages whose bodies stay within
/// [`MAX_BODY_LEN`]. Any offer that arrived in a valid `Offer` frame fits in a
/// batch of its own, since that frame carried 20 bytes of addressing against
/// 12 here.
pub fn batch_pending_offers(offers: Vec<(ParticipantId, Bytes)>) -> Vec<SignalingMsg> {
    let budget = MAX_BODY_LEN - LIST_PREFIX_LEN;
    let mut batches: Vec<Vec<(ParticipantId, Bytes)>> = vec![Vec::new()];
    let mut used = 0;

    for (id, sdp) in offers {
        let cost = OFFER_ENTRY_OVERHEAD + sdp.len();
        let full = batches.last().is_some_and(|b| {
            !b.is_empty() && (used + cost > budget || b.len() >= MAX_LIST_ENTRIES)
        });
        if full {
            batches.push(Vec::new());
            used = 0;
        }
        used += cost;
        if let Some(batch) = batches.last_mut() {
            batch.push((id, sdp));
        }
    }

    let n = batches.len();
    batches
        .into_iter()
        .enumerate()
        .map(|(i, offers)| SignalingMsg::PendingOffers {
            offers,
            last: i + 1 == n,
        })
        .collect()
}

// ---- Decode from body bytes ----------------------------------------------

/// Decode a frame body. Payload fields are zero-copy slices of `body`.
pub fn decode_msg(msg_type: MsgType, body: Bytes) -> Result<SignalingMsg, ProtoError> {
    use SignalingMsg::*;
    let mut r = BodyReader::new(body);

    let msg = match msg_type {
        MsgType::Join => Join,
        MsgType::Joined => Joined { id: r.get_u64()? },
        MsgType::ListIds => ListIds,
        MsgType::Ids => {
            let last = r.get_flag("bad Ids last flag")?;
            let n = r.get_u16()? as usize;
            let mut ids = Vec::with_capacity(n);
            for _ in 0..n {
                ids.push(r.get_u64()?);
            }
            Ids { ids, last }
        }
        MsgType::Left => Left { id: r.get_u64()? },

        MsgType::Pair => Pair { peer: r.get_u64()? },
        MsgType::Paired => Paired { peer: r.get_u64()? },
        MsgType::PairClosed => PairClosed {
            sibling: r.get_u64()?,
        },

        MsgType::Offer => {
            let (from, to, sdp) = r.get_addressed()?;
            Offer { from, to, sdp }
        }
        MsgType::Answer => {
            let (from, to, sdp) = r.get_addressed()?;
            Answer { from, to, sdp }
        }
        MsgType::IceCandidate => {
            let (from, to, candidate) = r.get_addressed()?;
            IceCandidate {
                from,
                to,
                candidate,
            }
        }
        MsgType::Close => {
            let peer = if r.get_flag("bad Close peer flag")? {
                Some(r.get_u64()?)
            } else {
                None
            };
            Close { peer }
        }
        MsgType::Closed => Closed { from: r.get_u64()? },
        MsgType::FetchOffers => FetchOffers,
        MsgType::PendingOffers => {
            let last = r.get_flag("bad PendingOffers last flag")?;
            let n = r.get_u16()? as usize;
            let mut offers = Vec::with_capacity(n);
            for _ in 0..n {
                let id = r.get_u64()?;
                let sdp = r.get_payload()?;
                offers.push((id, sdp));
            }
            PendingOffers { offers, last }
        }

        MsgType::Ping => Ping {
            nonce: r.get_u64()?,
        },
        MsgType::Pong => Pong {
            nonce: r.get_u64()?,
        },
    };

    r.finish()?;
    Ok(msg)
}

// ---- Primitive write helpers ---------------------------------------------

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn put_count(buf: &mut Vec<u8>, n: usize) -> Result<(), ProtoError> {
    let n16 = u16::try_from(n).map_err(|_| ProtoError::TooManyEntries {
        max: MAX_LIST_ENTRIES,
        actual: n,
    })?;
    buf.extend_from_slice(&n16.to_be_bytes());
    Ok(())
}

/// payload = u32 length + raw bytes
fn put_payload(buf: &mut Vec<u8>, payload: &[u8]) -> Result<(), ProtoError> {
    let len = u32::try_from(payload.len()).map_err(|_| ProtoError::PayloadTooLong {
        max: u32::MAX as usize,
        actual: payload.len(),
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(())
}

fn put_addressed(
    buf: &mut Vec<u8>,
    from: ParticipantId,
    to: ParticipantId,
    payload: &[u8],
) -> Result<(), ProtoError> {
    put_u64(buf, from);
    put_u64(buf, to);
    put_payload(buf, payload)
}

// ---- Reader for decoding --------------------------------------------------

#[derive(Debug)]
struct BodyReader {
    buf: Bytes,
    pos: usize,
}

impl BodyReader {
    fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    fn rest(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Runs a fixed-width `byteorder` read over the unread tail.
    fn fixed<T>(
        &mut self,
        width: usize,
        read: impl FnOnce(&mut &[u8]) -> io::Result<T>,
    ) -> Result<T, ProtoError> {
        let mut tail = self.rest();
        let v = read(&mut tail).map_err(|_| ProtoError::Truncated)?;
        self.pos += width;
        Ok(v)
    }

    fn get_u8(&mut self) -> Result<u8, ProtoError> {
        self.fixed(1, |r| r.read_u8())
    }

    /// A `u8` that must be 0 or 1.
    fn get_flag(&mut self, what: &'static str) -> Result<bool, ProtoError> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ProtoError::InvalidFormat(what)),
        }
    }

    fn get_u16(&mut self) -> Result<u16, ProtoError> {
        self.fixed(2, |r| r.read_u16::<BigEndian>())
    }

    fn get_u32(&mut self) -> Result<u32, ProtoError> {
        self.fixed(4, |r| r.read_u32::<BigEndian>())
    }

    fn get_u64(&mut self) -> Result<u64, ProtoError> {
        self.fixed(8, |r| r.read_u64::<BigEndian>())
    }

    fn get_payload(&mut self) -> Result<Bytes, ProtoError> {
        let len = self.get_u32()? as usize;
        if self.rest().len() < len {
            return Err(ProtoError::Truncated);
        }
        let payload = self.buf.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(payload)
    }

    fn get_addressed(&mut self) -> Result<(ParticipantId, ParticipantId, Bytes), ProtoError> {
        let from = self.get_u64()?;
        let to = self.get_u64()?;
        let payload = self.get_payload()?;
        Ok((from, to, payload))
    }

    /// Enforce that the whole body was consumed.
    fn finish(self) -> Result<(), ProtoError> {
        if self.pos != self.buf.len() {
            Err(ProtoError::InvalidFormat("trailing bytes in message body"))
        } else {
            Ok(())
        }
    }
}
