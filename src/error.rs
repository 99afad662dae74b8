//! # Error Types
//!
//! This module provides the error types used throughout the tsplay library.
//! It defines a central error type `TsplayError` that encapsulates all
//! possible errors that can occur while probing and replaying transport
//! stream files.
//!
//! ## Example Usage
//!
//! ```rust
//! use tsplay::error::{Result, TsplayError};
//!
//! fn check_sync_byte(packet: &[u8]) -> Result<()> {
//!     if packet.first() != Some(&0x47) {
//!         return Err(TsplayError::InvalidData("missing sync byte".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::num::ParseIntError;
use thiserror::Error;

/// Primary error type for the tsplay library
#[derive(Error, Debug)]
pub enum TsplayError {
    /// I/O errors that occur during file operations
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised when a file cannot be classified as TS or M2TS
    #[error("format error: {0}")]
    Format(String),

    /// Errors for invalid or malformed input data
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Configuration errors raised before the engine starts
    #[error("config error: {0}")]
    Config(String),

    /// Errors that occur during integer parsing (lock file contents)
    #[error("parse int error: {0}")]
    ParseInt(#[from] ParseIntError),
}

/// A specialized Result type for tsplay operations.
///
/// This type is used throughout the tsplay library to handle operations
/// that can produce a `TsplayError`.
pub type Result<T> = std::result::Result<T, TsplayError>;
