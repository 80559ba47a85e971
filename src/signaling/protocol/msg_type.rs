use super::ProtoError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum MsgType {
    // Membership
    Join = 0x01,
    Joined = 0x02,
    ListIds = 0x03,
    Ids = 0x04,
    Left = 0x05,

    // Paired windows
    Pair = 0x10,
    Paired = 0x11,
    PairClosed = 0x12,

    // Signaling
    Offer = 0x20,
    Answer = 0x21,
    IceCandidate = 0x22,
    Close = 0x23,
    Closed = 0x24,
    FetchOffers = 0x25,
    PendingOffers = 0x26,

    // Keepalive
    Ping = 0x30,
    Pong = 0x31,
}

impl MsgType {
    pub fn from_u8(v: u8) -> Result<MsgType, ProtoError> {
        use MsgType::*;
        match v {
            0x01 => Ok(Join),
            0x02 => Ok(Joined),
            0x03 => Ok(ListIds),
            0x04 => Ok(Ids),
            0x05 => Ok(Left),
            0x10 => Ok(Pair),
            0x11 => Ok(Paired),
            0x12 => Ok(PairClosed),
            0x20 => Ok(Offer),
            0x21 => Ok(Answer),
            0x22 => Ok(IceCandidate),
            0x23 => Ok(Close),
            0x24 => Ok(Closed),
            0x25 => Ok(FetchOffers),
            0x26 => Ok(PendingOffers),
            0x30 => Ok(Ping),
            0x31 => Ok(Pong),
            other => Err(ProtoError::UnknownType(other)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
