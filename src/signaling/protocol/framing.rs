use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{FrameError, HEADER_LEN, MsgType, PROTO_VERSION, ProtoError};

/// Write a single frame: `[ver][type][flags u16 = 0][len u32][body...]`.
///
/// Header and body go out in one `write_all` so concurrent writers on a cloned
/// socket can never interleave half frames.
pub fn write_frame<W: Write>(w: &mut W, msg_type: MsgType, body: &[u8]) -> io::Result<()> {
    let len = u32::try_from(body.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "body too large"))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.write_u8(PROTO_VERSION)?;
    frame.write_u8(msg_type.as_u8())?;
    frame.write_u16::<BigEndian>(0)?;
    frame.write_u32::<BigEndian>(len)?;
    frame.extend_from_slice(body);

    w.write_all(&frame)?;
    w.flush()
}

/// Read a single frame, enforcing `max_body`.
pub fn read_frame<R: Read>(r: &mut R, max_body: usize) -> Result<(MsgType, Vec<u8>), FrameError> {
    let ver = r.read_u8()?;
    if ver != PROTO_VERSION {
        return Err(ProtoError::BadVersion(ver).into());
    }
    let msg_type = MsgType::from_u8(r.read_u8()?)?;
    let _flags = r.read_u16::<BigEndian>()?;
    let len = r.read_u32::<BigEndian>()? as usize;
    if len > max_body {
        return Err(ProtoError::TooLarge { len, max: max_body }.into());
    }

    let mut body = vec![0u8; len];
    r.read_exact(&mut body)?;
    Ok((msg_type, body))
}
