//! # Utility Functions
//!
//! This module provides small helpers used throughout the tsplay library.
//!
//! ## Lock Files
//!
//! The lockfile module persists the current read offset as decimal ASCII so
//! replay resumes where it left off:
//!
//! ```rust,no_run
//! use tsplay::utils::lockfile;
//!
//! # fn main() -> tsplay::Result<()> {
//! lockfile::write_offset("movie.lock", 376)?;
//! assert_eq!(lockfile::read_offset("movie.lock")?, 376);
//! # Ok(())
//! # }
//! ```

/// Read-offset persistence helpers
pub mod lockfile;
