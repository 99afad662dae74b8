use crate::format::ts::types::M2TS_PACKET_SIZE;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Shared control state between the producer thread and the consumer side.
///
/// Flags are plain atomics polled by the producer; eventual visibility is
/// enough, so everything uses relaxed ordering. Stream facts (file size,
/// packet size, M2TS bounds) are published by the producer after each
/// successful open.
pub(crate) struct Control {
    pause: AtomicBool,
    reposition: AtomicBool,
    exit: AtomicBool,
    /// Byte offset of the start of the input window within the file
    file_skip: AtomicU64,
    file_size: AtomicU64,
    packet_size: AtomicU32,
    /// First M2TS arrival timestamp in ms (0 for TS)
    start_time: AtomicU64,
    /// Stream length in ms derived from M2TS bounds (0 for TS/unknown)
    length: AtomicU64,
    /// Arrival timestamp in ms of the most recently emitted M2TS cell
    last_time: AtomicU64,
}

impl Control {
    pub fn new(paused: bool) -> Self {
        Self {
            pause: AtomicBool::new(paused),
            reposition: AtomicBool::new(false),
            exit: AtomicBool::new(false),
            file_skip: AtomicU64::new(0),
            file_size: AtomicU64::new(0),
            packet_size: AtomicU32::new(0),
            start_time: AtomicU64::new(0),
            length: AtomicU64::new(0),
            last_time: AtomicU64::new(0),
        }
    }

    pub fn paused(&self) -> bool {
        self.pause.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.pause.store(paused, Ordering::Relaxed);
    }

    pub fn reposition_requested(&self) -> bool {
        self.reposition.load(Ordering::Relaxed)
    }

    pub fn request_reposition(&self) {
        self.reposition.store(true, Ordering::Relaxed);
    }

    /// Consumes a pending reposition request.
    pub fn take_reposition(&self) -> bool {
        self.reposition.swap(false, Ordering::Relaxed)
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Relaxed)
    }

    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::Relaxed);
    }

    pub fn file_skip(&self) -> u64 {
        self.file_skip.load(Ordering::Relaxed)
    }

    pub fn set_file_skip(&self, skip: u64) {
        self.file_skip.store(skip, Ordering::Relaxed);
    }

    pub fn file_size(&self) -> u64 {
        self.file_size.load(Ordering::Relaxed)
    }

    pub fn packet_size(&self) -> u32 {
        self.packet_size.load(Ordering::Relaxed)
    }

    pub fn start_time(&self) -> u64 {
        self.start_time.load(Ordering::Relaxed)
    }

    pub fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    pub fn set_last_time(&self, ms: u64) {
        self.last_time.store(ms, Ordering::Relaxed);
    }

    /// Publishes the facts derived from a (re)opened file.
    pub fn publish_stream(&self, file_size: u64, packet_size: u32, start_time: u64, length: u64) {
        self.file_size.store(file_size, Ordering::Relaxed);
        self.packet_size.store(packet_size, Ordering::Relaxed);
        self.start_time.store(start_time, Ordering::Relaxed);
        self.length.store(length, Ordering::Relaxed);
    }

    /// Current playback position in ms relative to the stream start.
    pub fn position(&self) -> u64 {
        self.last_time
            .load(Ordering::Relaxed)
            .saturating_sub(self.start_time.load(Ordering::Relaxed))
    }

    /// Requests a seek to `ms`. M2TS only, and only within the known length.
    ///
    /// The target byte offset is interpolated from the cell count, aligned to
    /// whole cells. Returns the current position.
    pub fn set_position(&self, ms: u64) -> u64 {
        let length = self.length();
        if self.packet_size() == M2TS_PACKET_SIZE as u32 && length > 0 && ms < length {
            let ts_count = self.file_size() / M2TS_PACKET_SIZE as u64;
            let ts_skip = ms * ts_count / length;
            self.set_file_skip(ts_skip * M2TS_PACKET_SIZE as u64);
            self.request_reposition();
        }
        self.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_round_trip() {
        let control = Control::new(false);
        assert!(!control.paused());
        control.set_paused(true);
        assert!(control.paused());

        control.request_reposition();
        assert!(control.reposition_requested());
        assert!(control.take_reposition());
        assert!(!control.reposition_requested());
    }

    #[test]
    fn test_set_position_requires_m2ts() {
        let control = Control::new(false);
        control.publish_stream(188 * 100, 188, 0, 0);
        control.set_position(1_000);
        assert!(!control.reposition_requested());
    }

    #[test]
    fn test_set_position_interpolates_cells() {
        let control = Control::new(false);
        control.publish_stream(192 * 100, 192, 1_000, 10_000);
        control.set_position(5_000);
        assert!(control.reposition_requested());
        assert_eq!(control.file_skip(), 192 * 50);
    }

    #[test]
    fn test_set_position_rejects_past_end() {
        let control = Control::new(false);
        control.publish_stream(192 * 100, 192, 1_000, 10_000);
        control.set_position(10_000);
        assert!(!control.reposition_requested());
    }

    #[test]
    fn test_position_is_relative_to_start() {
        let control = Control::new(false);
        control.publish_stream(192 * 100, 192, 1_000, 10_000);
        control.set_last_time(4_500);
        assert_eq!(control.position(), 3_500);
    }
}
