use crate::error::Result;
use crate::format::ts::probe;
use crate::format::ts::types::*;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// File-backed input window for the pacing loop.
///
/// Holds one contiguous byte window over the file, refilled with positioned
/// reads. The cursor always sits on a packet boundary; `file_skip` is the
/// file offset of the first byte of the window.
pub(crate) struct FileReader {
    file: File,
    pub file_size: u64,
    /// Cell stride: 188 (TS) or 192 (M2TS)
    pub packet_size: usize,
    buf: Vec<u8>,
    /// Offset into the window of the next packet to emit
    pub cursor: usize,
    /// Valid length of the window
    end: usize,
    /// File offset of the start of the window
    pub file_skip: u64,
    /// First M2TS arrival timestamp in ms (0 for TS)
    pub start_time: u64,
    /// M2TS length in ms (0 for TS/unknown)
    pub length: u64,
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

impl FileReader {
    /// Opens the file, fills the first window at `file_skip` and probes it.
    ///
    /// On success the cursor points at the first PCR-bearing packet of the
    /// window. A skip at or past the end of the file falls back to 0.
    pub fn open(path: &Path, buffer_size: usize, file_skip: u64) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        let mut skip = file_skip;
        if skip > 0 && skip >= file_size {
            log::warn!("skip value is greater than the file size");
            skip = 0;
        }

        let mut buf = vec![0u8; buffer_size];
        file.seek(SeekFrom::Start(skip))?;
        let end = read_up_to(&mut file, &mut buf)?;
        if end < buf.len() {
            log::warn!("file is too small");
        }

        let probe = probe::probe_window(&buf[..end])?;
        let (start_time, length) = if probe.packet_size == M2TS_PACKET_SIZE {
            probe::m2ts_bounds(&mut file, file_size)?
        } else {
            (0, 0)
        };

        Ok(Self {
            file,
            file_size,
            packet_size: probe.packet_size,
            buf,
            cursor: probe.first_pcr,
            end,
            file_skip: skip,
            start_time,
            length,
        })
    }

    /// Slides the window forward to the cursor and refills it.
    ///
    /// Returns true for a full window; false means the file tail has been
    /// reached.
    pub fn refill(&mut self) -> Result<bool> {
        self.file_skip += self.cursor as u64;
        self.file.seek(SeekFrom::Start(self.file_skip))?;
        self.end = read_up_to(&mut self.file, &mut self.buf)?;
        self.cursor = 0;
        Ok(self.end == self.buf.len())
    }

    /// Whether the current window was filled completely.
    pub fn is_full_window(&self) -> bool {
        self.end == self.buf.len()
    }

    /// Finds the next PCR-bearing packet strictly after the cursor.
    pub fn seek_pcr(&self) -> Option<usize> {
        let sync = sync_offset(self.packet_size);
        let mut offset = self.cursor + self.packet_size;
        while offset + self.packet_size <= self.end {
            if has_pcr(&self.buf[offset + sync..offset + self.packet_size]) {
                return Some(offset);
            }
            offset += self.packet_size;
        }
        None
    }

    /// The 188-byte TS packet at `offset` (skipping the M2TS prefix).
    pub fn ts_at(&self, offset: usize) -> &[u8] {
        &self.buf[offset + sync_offset(self.packet_size)..offset + self.packet_size]
    }

    /// The whole cell at `offset`, including the M2TS prefix when present.
    pub fn cell_at(&self, offset: usize) -> &[u8] {
        &self.buf[offset..offset + self.packet_size]
    }

    /// Whether a whole packet exists at `offset`.
    pub fn has_packet_at(&self, offset: usize) -> bool {
        offset + self.packet_size <= self.end
    }
}
