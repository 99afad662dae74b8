use crate::error::{Result, TsplayError};
use std::path::PathBuf;

/// Callback invoked once when a non-looping replay reaches end of file.
pub type EofCallback = Box<dyn FnOnce() + Send + 'static>;

/// Default input window size in MiB.
pub const DEFAULT_BUFFER_MIB: usize = 2;
/// Default sync ring capacity in packets.
pub const DEFAULT_RING_PACKETS: usize = 1024;

/// Configuration for a [`FileInput`](super::FileInput).
///
/// Built with consuming `with_*` setters:
///
/// ```rust
/// use tsplay::input::FileInputConfig;
///
/// let config = FileInputConfig::new("movie.ts")
///     .with_loop(true)
///     .with_buffer_size(4);
/// ```
pub struct FileInputConfig {
    pub(crate) filename: PathBuf,
    pub(crate) lock: Option<PathBuf>,
    pub(crate) loop_playback: bool,
    pub(crate) pause: bool,
    /// Input window size in bytes
    pub(crate) buffer_size: usize,
    /// Sync ring capacity in packets
    pub(crate) ring_capacity: usize,
    pub(crate) check_length: bool,
    pub(crate) eof_callback: Option<EofCallback>,
}

impl FileInputConfig {
    /// Creates a configuration for the given TS or M2TS file.
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            lock: None,
            loop_playback: false,
            pause: false,
            buffer_size: DEFAULT_BUFFER_MIB * 1024 * 1024,
            ring_capacity: DEFAULT_RING_PACKETS,
            check_length: false,
            eof_callback: None,
        }
    }

    /// Persists the current read offset to `path` so replay resumes across
    /// restarts.
    pub fn with_lock(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock = Some(path.into());
        self
    }

    /// Rewinds to the start of the file on EOF instead of finishing.
    pub fn with_loop(mut self, loop_playback: bool) -> Self {
        self.loop_playback = loop_playback;
        self
    }

    /// Starts replay in the paused state.
    pub fn with_pause(mut self, pause: bool) -> Self {
        self.pause = pause;
        self
    }

    /// Sets the input window size in MiB (default 2).
    pub fn with_buffer_size(mut self, mib: usize) -> Self {
        self.buffer_size = mib * 1024 * 1024;
        self
    }

    /// Sets the sync ring capacity in packets (default 1024).
    pub fn with_ring_capacity(mut self, packets: usize) -> Self {
        self.ring_capacity = packets;
        self
    }

    /// Probes the file to populate its length and never starts pacing.
    pub fn with_check_length(mut self, check_length: bool) -> Self {
        self.check_length = check_length;
        self
    }

    /// Invoked once when a non-looping replay reaches end of file.
    pub fn with_eof_callback(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.eof_callback = Some(Box::new(callback));
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.filename.as_os_str().is_empty() {
            return Err(TsplayError::Config("filename is required".into()));
        }
        if self.buffer_size == 0 {
            return Err(TsplayError::Config("buffer size must be non-zero".into()));
        }
        if self.ring_capacity == 0 {
            return Err(TsplayError::Config("ring capacity must be non-zero".into()));
        }
        Ok(())
    }
}
