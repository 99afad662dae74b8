//! # MPEG Transport Stream (TS) Support
//!
//! This module provides the transport stream pieces the replay engine is
//! built on:
//!
//! - TS (188-byte) and M2TS/BDAV (192-byte) packet layouts
//! - The byte-format probe that classifies a file and locates its first
//!   PCR-bearing packet
//! - PCR extraction and delta arithmetic
//!
//! ## Example
//!
//! ```rust
//! use tsplay::format::ts::{has_pcr, parse_pcr, pcr_delta_ms};
//!
//! fn block_time(first: &[u8], second: &[u8]) -> Option<f64> {
//!     if has_pcr(first) && has_pcr(second) {
//!         Some(pcr_delta_ms(parse_pcr(second) as i64 - parse_pcr(first) as i64))
//!     } else {
//!         None
//!     }
//! }
//! ```

/// Byte-format probe for TS/M2TS files
pub mod probe;

/// Core TS types, constants and PCR arithmetic
pub mod types;

// Re-export commonly used types and constants
pub use probe::{probe_window, ProbeResult};
pub use types::{
    has_pcr, m2ts_timestamp, m2ts_timestamp_ms, parse_pcr, pcr_delta_ms, pcr_to_time,
    M2TS_PACKET_SIZE, TS_PACKET_SIZE, TS_SYNC_BYTE,
};
