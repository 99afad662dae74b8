//! # File Input Engine
//!
//! PCR-paced replay of transport stream files. A producer thread reads the
//! file through a refillable window, locates consecutive PCR-bearing
//! packets, and spreads each block's nominal duration over its packets with
//! closed-loop drift correction. Packets cross to the async side through a
//! single-producer/single-consumer ring paired with a byte-oriented wakeup
//! channel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tsplay::format::tests::TestSink;
//! use tsplay::input::{FileInput, FileInputConfig};
//!
//! # async fn example() -> tsplay::Result<()> {
//! let config = FileInputConfig::new("movie.m2ts")
//!     .with_lock("movie.lock")
//!     .with_loop(true);
//! let mut input = FileInput::new(config)?;
//!
//! let mut sink = TestSink::new();
//! input.run(&mut sink).await?;
//! # Ok(())
//! # }
//! ```

/// Replay configuration
pub mod config;

/// The public replay handle and its control surface
pub mod file;

mod control;
mod pacing;
mod reader;
mod ring;

pub use config::{EofCallback, FileInputConfig};
pub use file::{FileInput, InputControl};
