use super::types::*;
use crate::error::{Result, TsplayError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Result of probing the head of a transport stream file.
#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    /// Detected cell size: 188 (TS) or 192 (M2TS)
    pub packet_size: usize,
    /// Offset into the probe window of the first PCR-bearing packet
    pub first_pcr: usize,
    /// PCR value of that packet
    pub pcr: u64,
}

/// Classifies a probe window as TS or M2TS by its sync-byte pattern.
///
/// TS files have `0x47` at offsets 0 and 188; M2TS files have it at
/// offsets 4 and 196 (after the 4-byte arrival timestamps). Anything else
/// is rejected, including windows too short for either check.
pub fn classify(window: &[u8]) -> Result<usize> {
    if window.len() > TS_PACKET_SIZE
        && window[0] == TS_SYNC_BYTE
        && window[TS_PACKET_SIZE] == TS_SYNC_BYTE
    {
        return Ok(TS_PACKET_SIZE);
    }
    if window.len() > M2TS_PACKET_SIZE + M2TS_HEADER_SIZE
        && window[M2TS_HEADER_SIZE] == TS_SYNC_BYTE
        && window[M2TS_HEADER_SIZE + M2TS_PACKET_SIZE] == TS_SYNC_BYTE
    {
        return Ok(M2TS_PACKET_SIZE);
    }
    Err(TsplayError::Format("wrong file format".into()))
}

/// Scans a window in packet strides for the first PCR-bearing packet.
pub fn find_first_pcr(window: &[u8], packet_size: usize) -> Option<(usize, u64)> {
    let sync = sync_offset(packet_size);
    let mut offset = 0;
    while offset + packet_size <= window.len() {
        let ts = &window[offset + sync..offset + packet_size];
        if has_pcr(ts) {
            return Some((offset, parse_pcr(ts)));
        }
        offset += packet_size;
    }
    None
}

/// Probes a window: classify the format and locate the first PCR.
pub fn probe_window(window: &[u8]) -> Result<ProbeResult> {
    let packet_size = classify(window)?;
    let (first_pcr, pcr) = find_first_pcr(window, packet_size)
        .ok_or_else(|| TsplayError::Format("first PCR is not found".into()))?;
    Ok(ProbeResult {
        packet_size,
        first_pcr,
        pcr,
    })
}

/// Reads the arrival-timestamp bounds of an M2TS file.
///
/// Returns `(start_time, length)` in milliseconds, taken from the first and
/// last 192-byte cells of the file. Positioned reads keep the result correct
/// when the replay window itself opens mid-file. A missing sync byte in the
/// tail cell leaves the length at 0.
pub fn m2ts_bounds(file: &mut File, file_size: u64) -> Result<(u64, u64)> {
    let mut head = [0u8; M2TS_HEADER_SIZE];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut head)?;
    let start_time = m2ts_timestamp_ms(&head);

    let cells = file_size / M2TS_PACKET_SIZE as u64;
    if cells < 2 {
        return Ok((start_time, 0));
    }

    let mut tail = [0u8; M2TS_PACKET_SIZE];
    file.seek(SeekFrom::Start((cells - 1) * M2TS_PACKET_SIZE as u64))?;
    file.read_exact(&mut tail)?;
    if tail[M2TS_HEADER_SIZE] != TS_SYNC_BYTE {
        return Ok((start_time, 0));
    }

    let last_time = m2ts_timestamp_ms(&tail);
    Ok((start_time, last_time.saturating_sub(start_time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ts_packet(pid: u16, pcr: Option<u64>) -> [u8; TS_PACKET_SIZE] {
        let mut ts = [0xFFu8; TS_PACKET_SIZE];
        ts[0] = TS_SYNC_BYTE;
        ts[1] = (pid >> 8) as u8 & 0x1F;
        ts[2] = pid as u8;
        match pcr {
            Some(pcr) => {
                ts[3] = 0x20;
                ts[4] = 183;
                ts[5] = 0x10;
                let base = pcr / 300;
                let ext = pcr % 300;
                ts[6] = (base >> 25) as u8;
                ts[7] = (base >> 17) as u8;
                ts[8] = (base >> 9) as u8;
                ts[9] = (base >> 1) as u8;
                ts[10] = (((base & 1) as u8) << 7) | 0x7E | ((ext >> 8) as u8 & 0x01);
                ts[11] = ext as u8;
            }
            None => {
                ts[3] = 0x10;
            }
        }
        ts
    }

    fn m2ts_cell(arrival: u32, pcr: Option<u64>) -> [u8; M2TS_PACKET_SIZE] {
        let mut cell = [0u8; M2TS_PACKET_SIZE];
        cell[..4].copy_from_slice(&arrival.to_be_bytes());
        cell[4..].copy_from_slice(&ts_packet(0x100, pcr));
        cell
    }

    #[test]
    fn test_probe_ts_two_packets() {
        let mut window = Vec::new();
        window.extend_from_slice(&ts_packet(0x100, None));
        window.extend_from_slice(&ts_packet(0x100, Some(27_000_000)));

        let probe = probe_window(&window).unwrap();
        assert_eq!(probe.packet_size, TS_PACKET_SIZE);
        assert_eq!(probe.first_pcr, TS_PACKET_SIZE);
        assert_eq!(probe.pcr, 27_000_000);
    }

    #[test]
    fn test_probe_m2ts() {
        let mut window = Vec::new();
        window.extend_from_slice(&m2ts_cell(1_000_000, Some(1_000)));
        window.extend_from_slice(&m2ts_cell(2_000_000, None));

        let probe = probe_window(&window).unwrap();
        assert_eq!(probe.packet_size, M2TS_PACKET_SIZE);
        assert_eq!(probe.first_pcr, 0);
        assert_eq!(probe.pcr, 1_000);
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let window = vec![0xAAu8; 1024];
        match probe_window(&window) {
            Err(TsplayError::Format(msg)) => assert_eq!(msg, "wrong file format"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_probe_rejects_missing_pcr() {
        let mut window = Vec::new();
        for _ in 0..4 {
            window.extend_from_slice(&ts_packet(0x100, None));
        }
        match probe_window(&window) {
            Err(TsplayError::Format(msg)) => assert_eq!(msg, "first PCR is not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_probe_rejects_short_window() {
        let window = vec![TS_SYNC_BYTE; 64];
        assert!(probe_window(&window).is_err());
    }

    #[test]
    fn test_m2ts_bounds() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&m2ts_cell(1_000_000, Some(0))).unwrap();
        tmp.write_all(&m2ts_cell(2_000_000, None)).unwrap();
        tmp.write_all(&m2ts_cell(11_000_000, None)).unwrap();
        tmp.flush().unwrap();

        let mut file = tmp.reopen().unwrap();
        let size = file.metadata().unwrap().len();
        let (start, length) = m2ts_bounds(&mut file, size).unwrap();
        assert_eq!(start, 1_000);
        assert_eq!(length, 10_000);
    }

    #[test]
    fn test_m2ts_bounds_broken_tail() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&m2ts_cell(1_000_000, Some(0))).unwrap();
        let mut broken = m2ts_cell(9_000_000, None);
        broken[4] = 0x00;
        tmp.write_all(&broken).unwrap();
        tmp.flush().unwrap();

        let mut file = tmp.reopen().unwrap();
        let size = file.metadata().unwrap().len();
        let (start, length) = m2ts_bounds(&mut file, size).unwrap();
        assert_eq!(start, 1_000);
        assert_eq!(length, 0);
    }
}
