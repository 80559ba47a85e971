//! Binary wire protocol spoken between participants and the relay.
//!
//! ```text
//! ----------- Header (8 bytes) ----------------
//! Version (1B) | Msg Type (1B) | Flags (2B) | Body Length (4B, BE)
//! ----------- Body ----------------------------
//! Fields of the message, big-endian, at most MAX_BODY_LEN bytes
//! ```

mod codec;
mod constants;
mod errors;
mod framing;
mod msg;
mod msg_type;

use std::io::{Read, Write};

pub use codec::{batch_ids, batch_pending_offers, decode_msg, encode_msg};
pub use constants::{HEADER_LEN, MAX_BODY_LEN, MAX_LIST_ENTRIES, PROTO_VERSION};
pub use errors::{FrameError, ProtoError};
pub use framing::{read_frame, write_frame};
pub use msg::SignalingMsg;
pub use msg_type::MsgType;

/// Identifier the relay assigns to a connected participant.
pub type ParticipantId = u64;

/// Read one frame and decode it.
pub fn read_msg<R: Read>(r: &mut R) -> Result<SignalingMsg, FrameError> {
    let (msg_type, body) = read_frame(r, MAX_BODY_LEN)?;
    Ok(decode_msg(msg_type, body.into())?)
}

/// Encode one message and write it as a single frame.
pub fn write_msg<W: Write>(w: &mut W, msg: &SignalingMsg) -> Result<(), FrameError> {
    let (msg_type, body) = encode_msg(msg)?;
    write_frame(w, msg_type, &body)?;
    Ok(())
}
