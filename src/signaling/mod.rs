//! The relay itself: who is connected, how messages move between them, and
//! the TCP runtime around that.

pub mod controller;
pub mod errors;
pub mod pairs;
pub mod pending_offers;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod run;
pub mod runtime;
pub mod server_event;
pub mod signaling_server;
pub mod transport;
pub mod types;

pub use controller::SessionController;
pub use errors::DropReason;
pub use registry::Registry;
pub use relay::{Delivery, Relay};
pub use signaling_server::SignalingServer;
pub use types::{Outbox, ParticipantId};
