#![doc(html_root_url = "https://docs.rs/tsplay/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # tsplay - Transport Stream Replay Engine
//!
//! `tsplay` replays MPEG transport stream files at their original multiplex
//! rate. It reads TS (188-byte packets) or M2TS/BDAV (192-byte cells) files
//! from local storage and emits fixed-size TS packets downstream at the
//! wall-clock rate reconstructed from the stream's embedded Program Clock
//! References (PCR).
//!
//! ## Features
//!
//! ### Format Support
//! - TS and M2TS byte-format probing
//! - 42-bit PCR extraction and delta arithmetic
//! - M2TS arrival-timestamp bounds (stream start and length)
//!
//! ### Replay Engine
//! - Real-time pacing thread with two-level drift correction
//! - Lock-free SPSC ring with a byte-oriented wakeup channel
//! - Pause, seek, loop and clock-jump recovery
//! - Read-offset persistence across restarts
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tsplay = "0.1.0"
//! ```
//!
//! ### Replaying a File
//!
//! ```rust,no_run
//! use tsplay::input::{FileInput, FileInputConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FileInputConfig::new("movie.ts")
//!         .with_loop(true)
//!         .with_eof_callback(|| println!("stream finished"));
//!
//!     let mut input = FileInput::new(config)?;
//!
//!     // Process replayed packets
//!     while let Some(packet) = input.read_packet().await? {
//!         println!("packet: {} bytes, pcr: {:?}", packet.data.len(), packet.pcr);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Forwarding to a Sink
//!
//! ```rust,no_run
//! use tsplay::av::Packet;
//! use tsplay::format::PacketSink;
//! use tsplay::input::{FileInput, FileInputConfig};
//! use async_trait::async_trait;
//!
//! struct UdpSink; // e.g. wraps a socket
//!
//! #[async_trait]
//! impl PacketSink for UdpSink {
//!     async fn write_packet(&mut self, _packet: Packet) -> tsplay::Result<()> {
//!         // send the payload somewhere
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut input = FileInput::new(FileInputConfig::new("movie.m2ts"))?;
//!     let control = input.control();
//!     println!("stream length: {} ms", control.length());
//!
//!     let mut sink = UdpSink;
//!     input.run(&mut sink).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: The packet type delivered to consumers
//!
//! - `format`: Transport stream format support
//!   - TS/M2TS probing and PCR arithmetic
//!   - The `PacketSink` downstream seam
//!
//! - `input`: The file replay engine
//!   - Configuration, pacing, pause/seek/loop control
//!   - Offset persistence for resume across restarts
//!
//! - `error`: Error handling types and utilities
//!
//! - `utils`: Lock-file helpers

/// Core packet types
pub mod av;

/// Error types and utilities
pub mod error;

/// Media format implementations (TS, M2TS) and the packet sink seam
pub mod format;

/// The PCR-paced file replay engine
pub mod input;

/// Common utilities and helper functions
pub mod utils;

pub use error::{Result, TsplayError};
