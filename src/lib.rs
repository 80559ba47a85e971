//! rtcrelay is a signaling relay for WebRTC peers on a local network.
//!
//! Participants connect over TCP, get an id from the relay and exchange SDP
//! offers/answers and ICE candidates through it. The relay never looks inside
//! those payloads; it only tracks who is connected and moves messages between
//! them.
//!
//! It provides one binary:
//! - `signaling_relay`: runs the relay, configured by file or command line.

/// Handles configuration loading and management.
pub mod config;
/// Logging utilities for the relay.
pub mod log;
/// Participant registry, message relay, session lifecycle and TCP runtime.
pub mod signaling;
/// Blocking client for participants talking to the relay.
pub mod signaling_client;
