/// Protocol version carried in the first header byte.
pub const PROTO_VERSION: u8 = 1;

/// `[ver: u8][msg_type: u8][flags: u16][body_len: u32]`
pub const HEADER_LEN: usize = 8;

/// Maximum allowed body size for a frame (to avoid OOM).
pub const MAX_BODY_LEN: usize = 1_048_576; // 1 MiB

/// Upper bound on `Ids` / `PendingOffers` entries (u16 count on the wire).
pub const MAX_LIST_ENTRIES: usize = u16::MAX as usize;
