//! Blocking participant-side client for the relay.

pub mod blocking_client;
pub mod signaling_client_error;

pub use blocking_client::SignalingClient;
pub use signaling_client_error::SignalingClientError;
