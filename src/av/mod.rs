//! # Core Packet Types
//!
//! This module provides the packet type shared between the replay engine
//! and downstream consumers. Payloads are reference-counted [`bytes::Bytes`]
//! so forwarding a packet never copies it again.

/// Packet handling and construction
pub mod packet;
pub use packet::Packet;
