use super::config::{EofCallback, FileInputConfig};
use super::control::Control;
use super::pacing::PacingLoop;
use super::reader::FileReader;
use super::ring::{sync_ring, RingConsumer, RingPop};
use crate::av::Packet;
use crate::error::Result;
use crate::format::ts::types::{has_pcr, parse_pcr};
use crate::format::PacketSink;
use crate::utils::lockfile;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// How often the current read offset is persisted to the lock file.
const LOCK_WRITE_INTERVAL: Duration = Duration::from_secs(2);

/// PCR-paced replay of a TS or M2TS file.
///
/// A producer thread paces packets from the file into a sync ring at the
/// rate reconstructed from the stream's PCR timestamps; the async side pops
/// them one wakeup at a time. Dropping the input stops and joins the
/// producer.
///
/// ```rust,no_run
/// use tsplay::input::{FileInput, FileInputConfig};
///
/// # async fn example() -> tsplay::Result<()> {
/// let mut input = FileInput::new(FileInputConfig::new("movie.ts"))?;
/// while let Some(packet) = input.read_packet().await? {
///     println!("packet of {} bytes", packet.data.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileInput {
    control: Arc<Control>,
    consumer: RingConsumer,
    producer: Option<JoinHandle<()>>,
    lock_path: Option<PathBuf>,
    eof_callback: Option<EofCallback>,
}

/// Cloneable control surface for a running [`FileInput`].
///
/// Lets another task pause or seek the replay while the input itself is
/// busy in [`FileInput::run`].
#[derive(Clone)]
pub struct InputControl {
    control: Arc<Control>,
}

impl InputControl {
    /// Suspends or resumes pacing.
    pub fn pause(&self, paused: bool) {
        self.control.set_paused(paused);
    }

    /// Stream length in ms (0 for TS or unknown).
    pub fn length(&self) -> u64 {
        self.control.length()
    }

    /// Current position in ms relative to the stream start.
    pub fn position(&self) -> u64 {
        self.control.position()
    }

    /// Requests a seek to `ms` (M2TS only, `ms` below the stream length).
    /// Returns the current position.
    pub fn set_position(&self, ms: u64) -> u64 {
        self.control.set_position(ms)
    }
}

impl FileInput {
    /// Validates the configuration and starts the producer thread.
    ///
    /// With `check_length` set the file is probed synchronously instead and
    /// no producer is started; only [`length`](Self::length) is meaningful.
    pub fn new(config: FileInputConfig) -> Result<Self> {
        config.validate()?;
        let control = Arc::new(Control::new(config.pause));
        let (producer_half, consumer) = sync_ring(config.ring_capacity);

        if config.check_length {
            let reader = FileReader::open(&config.filename, config.buffer_size, 0)?;
            control.publish_stream(
                reader.file_size,
                reader.packet_size as u32,
                reader.start_time,
                reader.length,
            );
            // producer_half drops here, closing the wakeup channel
            return Ok(Self {
                control,
                consumer,
                producer: None,
                lock_path: None,
                eof_callback: None,
            });
        }

        let pacing = PacingLoop {
            filename: config.filename,
            lock_path: config.lock.clone(),
            loop_playback: config.loop_playback,
            buffer_size: config.buffer_size,
            control: control.clone(),
            ring: producer_half,
        };
        let producer = std::thread::Builder::new()
            .name("file-input".into())
            .spawn(move || pacing.run())
            .map_err(crate::error::TsplayError::Io)?;

        Ok(Self {
            control,
            consumer,
            producer: Some(producer),
            lock_path: config.lock,
            eof_callback: config.eof_callback,
        })
    }

    /// Pops the next packet, waiting for the producer's wakeup.
    ///
    /// Returns `None` at end of stream: either the EOF sentinel (which
    /// invokes the configured callback once) or a closed wakeup channel.
    pub async fn read_packet(&mut self) -> Result<Option<Packet>> {
        match self.consumer.pop().await {
            RingPop::Packet(payload) => {
                let mut packet = Packet::new(Bytes::copy_from_slice(&payload));
                if has_pcr(&payload) {
                    packet = packet.with_pcr(parse_pcr(&payload));
                }
                Ok(Some(packet))
            }
            RingPop::Eof => {
                if let Some(callback) = self.eof_callback.take() {
                    callback();
                }
                Ok(None)
            }
            RingPop::Closed => Ok(None),
        }
    }

    /// Drives the replay to completion, forwarding every packet to `sink`.
    ///
    /// Also runs the 2-second lock-file timer that persists the current
    /// read offset. Returns when the stream ends.
    pub async fn run<S: PacketSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let lock_path = self.lock_path.clone();
        let control = self.control.clone();
        let mut timer = tokio::time::interval(LOCK_WRITE_INTERVAL);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if let Some(path) = &lock_path {
                        if let Err(e) = lockfile::write_offset(path, control.file_skip()) {
                            log::warn!("lock write failed: {}", e);
                        }
                    }
                }
                packet = self.read_packet() => match packet? {
                    Some(packet) => sink.write_packet(packet).await?,
                    None => return Ok(()),
                }
            }
        }
    }

    /// Hands out a cloneable control surface.
    pub fn control(&self) -> InputControl {
        InputControl {
            control: self.control.clone(),
        }
    }

    /// Suspends or resumes pacing.
    pub fn pause(&self, paused: bool) {
        self.control.set_paused(paused);
    }

    /// Stream length in ms (0 for TS or unknown).
    pub fn length(&self) -> u64 {
        self.control.length()
    }

    /// Current position in ms relative to the stream start.
    pub fn position(&self) -> u64 {
        self.control.position()
    }

    /// Requests a seek to `ms` (M2TS only, `ms` below the stream length).
    /// Returns the current position.
    pub fn set_position(&self, ms: u64) -> u64 {
        self.control.set_position(ms)
    }
}

impl Drop for FileInput {
    fn drop(&mut self) {
        self.control.request_exit();
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}
