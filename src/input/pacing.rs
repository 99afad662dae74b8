use super::control::Control;
use super::reader::FileReader;
use super::ring::RingProducer;
use crate::error::TsplayError;
use crate::format::ts::types::*;
use crate::utils::lockfile;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on the nominal duration of one PCR block.
const BLOCK_TIME_MAX_MS: f64 = 250.0;
/// Accumulated drift beyond this resets the stream-level sync.
const SYNC_DRIFT_LIMIT_MS: f64 = 100.0;
/// Forced catch-up applied after a clock regression.
const CATCH_UP_MS: f64 = 1_000.0;
/// Poll interval while paused.
const PAUSE_POLL: Duration = Duration::from_nanos(500);

/// Stream-level sync accumulators.
///
/// `total_diff` is the signed residual (ms) between the nominal stream time
/// emitted so far and the wall time spent emitting it, fed into the next
/// block's per-packet sleep. Reset on pause, seek, clock regression, or
/// drift beyond [`SYNC_DRIFT_LIMIT_MS`].
struct SyncState {
    total_diff: f64,
    block_total_ms: f64,
    pause_total_ms: f64,
    started: Instant,
}

impl SyncState {
    fn new() -> Self {
        Self {
            total_diff: 0.0,
            block_total_ms: 0.0,
            pause_total_ms: 0.0,
            started: Instant::now(),
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// The producer thread: reads the file and paces packets into the ring at
/// the rate embedded in the PCR timestamps.
pub(crate) struct PacingLoop {
    pub filename: PathBuf,
    pub lock_path: Option<PathBuf>,
    pub loop_playback: bool,
    pub buffer_size: usize,
    pub control: Arc<Control>,
    pub ring: RingProducer,
}

impl PacingLoop {
    /// Thread entry point.
    pub fn run(mut self) {
        let initial_skip = self
            .lock_path
            .as_ref()
            .and_then(|path| lockfile::read_offset(path).ok())
            .unwrap_or(0);

        let mut reader = match self.open_reader(initial_skip) {
            Some(reader) => reader,
            None => return,
        };
        let mut pcr_last = parse_pcr(reader.ts_at(reader.cursor));
        let mut sync = SyncState::new();

        loop {
            if self.control.exit_requested() {
                return;
            }

            if self.control.paused() {
                if !self.wait_while_paused() {
                    return;
                }
                sync.reset();
            }

            if self.control.take_reposition() {
                reader = match self.open_reader(self.control.file_skip()) {
                    Some(reader) => reader,
                    None => return,
                };
                pcr_last = parse_pcr(reader.ts_at(reader.cursor));
                sync.reset();
                continue;
            }

            // Locate the end of the current block
            let block_end = match reader.seek_pcr() {
                Some(end) => end,
                None => {
                    if reader.cursor == 0 && reader.is_full_window() {
                        // A refill from here cannot make progress
                        log::error!("next PCR is not found");
                        return;
                    }
                    let full = match reader.refill() {
                        Ok(full) => full,
                        Err(e) => {
                            log::error!("read failed: {}", e);
                            return;
                        }
                    };
                    // A pending seek owns file_skip until it is handled
                    if !self.control.reposition_requested() {
                        self.control.set_file_skip(reader.file_skip);
                    }
                    if full {
                        continue;
                    }
                    if self.loop_playback {
                        self.control.set_file_skip(0);
                        self.control.request_reposition();
                        continue;
                    }
                    self.flush_tail(&mut reader);
                    self.ring.push_eof();
                    return;
                }
            };

            let pcr_now = parse_pcr(reader.ts_at(block_end));
            let block_size = ((block_end - reader.cursor) / reader.packet_size) as u64;
            let block_time_ms = pcr_delta_ms(pcr_now as i64 - pcr_last as i64);
            pcr_last = pcr_now;

            if !(0.0..=BLOCK_TIME_MAX_MS).contains(&block_time_ms) {
                log::error!(
                    "block time out of range: {:.2}ms block_size:{}",
                    block_time_ms,
                    block_size
                );
                reader.cursor = block_end;
                sync.reset();
                continue;
            }

            // Spread the block duration over its packets, absorbing the
            // residual drift from previous blocks
            let nominal_ns =
                ((block_time_ms + sync.total_diff).max(0.0) * 1_000_000.0 / block_size as f64)
                    as u64;

            let block_started = Instant::now();
            let mut calc_block_ns: u64 = 0;
            let mut pause_block_ns: u64 = 0;
            let mut behind = false;
            let mut timetravel = false;

            while reader.cursor < block_end {
                if self.control.exit_requested() {
                    return;
                }
                if self.control.paused() {
                    let pause_started = Instant::now();
                    if !self.wait_while_paused() {
                        return;
                    }
                    pause_block_ns += pause_started.elapsed().as_nanos() as u64;
                }
                if self.control.reposition_requested() {
                    break;
                }

                self.push_packet(&reader);
                reader.cursor += reader.packet_size;

                if !behind && nominal_ns > 0 {
                    thread::sleep(Duration::from_nanos(nominal_ns));
                }
                calc_block_ns += nominal_ns;
                match Instant::now().checked_duration_since(block_started) {
                    Some(elapsed) => {
                        let real_ns = (elapsed.as_nanos() as u64).saturating_sub(pause_block_ns);
                        behind = real_ns > calc_block_ns;
                    }
                    None => {
                        timetravel = true;
                        break;
                    }
                }
            }

            sync.block_total_ms += block_time_ms;
            sync.pause_total_ms += pause_block_ns as f64 / 1e6;

            if timetravel {
                log::warn!("timetravel detected");
                sync.reset();
                sync.total_diff = -CATCH_UP_MS;
                continue;
            }

            // Stream-level sync: compare nominal time emitted against wall
            // time spent, excluding pauses
            match Instant::now().checked_duration_since(sync.started) {
                Some(elapsed) => {
                    let wall_ms = elapsed.as_nanos() as f64 / 1e6;
                    sync.total_diff = sync.block_total_ms - (wall_ms - sync.pause_total_ms);
                    if sync.total_diff.abs() > SYNC_DRIFT_LIMIT_MS {
                        log::warn!("wrong syncing time: {:+.2}ms", sync.total_diff);
                        sync.reset();
                    }
                }
                None => {
                    log::warn!("timetravel detected");
                    sync.reset();
                    sync.total_diff = -CATCH_UP_MS;
                }
            }
        }
    }

    /// Opens the file and probes it, publishing the stream facts.
    ///
    /// A missing or unreadable file ends the producer silently; an
    /// unrecognized format is logged.
    fn open_reader(&self, skip: u64) -> Option<FileReader> {
        match FileReader::open(&self.filename, self.buffer_size, skip) {
            Ok(reader) => {
                self.control.publish_stream(
                    reader.file_size,
                    reader.packet_size as u32,
                    reader.start_time,
                    reader.length,
                );
                self.control.set_file_skip(reader.file_skip);
                Some(reader)
            }
            Err(TsplayError::Io(_)) => None,
            Err(e) => {
                log::error!("{}", e);
                None
            }
        }
    }

    fn push_packet(&mut self, reader: &FileReader) {
        if reader.packet_size == M2TS_PACKET_SIZE {
            self.control
                .set_last_time(m2ts_timestamp_ms(reader.cell_at(reader.cursor)));
        }
        self.ring.push(reader.ts_at(reader.cursor));
    }

    /// Emits the unpaced remainder of the window before EOF.
    fn flush_tail(&mut self, reader: &mut FileReader) {
        while reader.has_packet_at(reader.cursor) {
            if self.control.exit_requested() {
                return;
            }
            self.push_packet(reader);
            reader.cursor += reader.packet_size;
        }
    }

    /// Returns false when exit was requested while paused.
    fn wait_while_paused(&self) -> bool {
        while self.control.paused() {
            if self.control.exit_requested() {
                return false;
            }
            thread::sleep(PAUSE_POLL);
        }
        true
    }
}
