//! # Media Format Implementations
//!
//! This module provides the transport stream format support used by the
//! replay engine, and the seam through which replayed packets leave the
//! crate:
//!
//! - **TS**: MPEG Transport Stream and M2TS (BDAV) cell formats, the
//!   byte-format probe, and PCR arithmetic
//! - **PacketSink**: the downstream consumer trait
//!
//! ## Example
//!
//! ```rust
//! use tsplay::av::Packet;
//! use tsplay::format::PacketSink;
//! use async_trait::async_trait;
//!
//! struct CountingSink(usize);
//!
//! #[async_trait]
//! impl PacketSink for CountingSink {
//!     async fn write_packet(&mut self, _packet: Packet) -> tsplay::Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//! ```

use crate::av::Packet;
use crate::Result;

/// MPEG Transport Stream (TS/M2TS) format support
pub mod ts;

/// Downstream consumer of replayed packets.
///
/// The replay bridge forwards exactly one packet per wakeup; sinks see
/// packets in stream order.
#[async_trait::async_trait]
pub trait PacketSink: Send {
    /// Write one packet to the sink
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot accept the packet; the bridge
    /// stops on the first sink error.
    async fn write_packet(&mut self, packet: Packet) -> Result<()>;
}

/// Test utilities for sink implementations
pub mod tests {
    use super::*;

    /// A test sink that collects packets for verification
    #[derive(Debug, Default)]
    pub struct TestSink {
        /// Collected packets for testing
        pub packets: Vec<Packet>,
    }

    impl TestSink {
        /// Creates a new test sink
        pub fn new() -> Self {
            Self {
                packets: Vec::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl PacketSink for TestSink {
        async fn write_packet(&mut self, packet: Packet) -> Result<()> {
            self.packets.push(packet);
            Ok(())
        }
    }
}
