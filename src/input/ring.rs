use crate::format::ts::types::TS_PACKET_SIZE;
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Wakeup byte announcing one packet in the ring.
pub(crate) const SIGNAL_PACKET: u8 = 0x00;
/// Wakeup byte announcing end of stream; carries no ring payload.
pub(crate) const SIGNAL_EOF: u8 = 0xFF;

/// Producer half: owned by the pacing thread.
///
/// Payloads move through a lock-free byte ring; a whole packet is pushed or
/// the packet is dropped, so the ring never holds a partial payload.
pub(crate) struct RingProducer {
    buffer: HeapProd<u8>,
    overflow_count: u64,
    signal: mpsc::Sender<u8>,
}

/// Consumer half: owned by the event-loop side.
pub(crate) struct RingConsumer {
    buffer: HeapCons<u8>,
    signal: mpsc::Receiver<u8>,
}

/// Outcome of one consumer pop.
pub(crate) enum RingPop {
    /// One TS packet, copied out of the ring
    Packet([u8; TS_PACKET_SIZE]),
    /// EOF sentinel observed; no payload
    Eof,
    /// Producer gone and channel drained
    Closed,
}

/// Creates a ring of `packets` TS payloads plus its wakeup channel.
///
/// The channel holds one byte per ring slot plus one for the EOF sentinel,
/// so a send can only fail when the consumer is gone.
pub(crate) fn sync_ring(packets: usize) -> (RingProducer, RingConsumer) {
    assert!(packets > 0);
    let rb = HeapRb::<u8>::new(packets * TS_PACKET_SIZE);
    let (producer, consumer) = rb.split();
    let (tx, rx) = mpsc::channel(packets + 1);
    (
        RingProducer {
            buffer: producer,
            overflow_count: 0,
            signal: tx,
        },
        RingConsumer {
            buffer: consumer,
            signal: rx,
        },
    )
}

impl RingProducer {
    /// Pushes one TS payload, dropping it when the ring is full.
    ///
    /// The first successful push after a burst of drops reports how many
    /// packets were lost.
    pub fn push(&mut self, payload: &[u8]) {
        debug_assert_eq!(payload.len(), TS_PACKET_SIZE);
        if self.buffer.vacant_len() < TS_PACKET_SIZE {
            self.overflow_count += 1;
            return;
        }
        self.buffer.push_slice(payload);

        if self.overflow_count > 0 {
            log::error!(
                "sync buffer overflow. dropped {} packets",
                self.overflow_count
            );
            self.overflow_count = 0;
        }

        match self.signal.try_send(SIGNAL_PACKET) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::error!("wakeup channel send failed"),
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Announces end of stream. No payload accompanies the sentinel.
    pub fn push_eof(&mut self) {
        match self.signal.try_send(SIGNAL_EOF) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::error!("wakeup channel send failed"),
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Packets dropped since the last successful push.
    #[cfg(test)]
    pub fn dropped(&self) -> u64 {
        self.overflow_count
    }
}

impl RingConsumer {
    /// Waits for one wakeup byte and resolves it.
    ///
    /// Exactly one payload is copied out per non-sentinel byte, keeping pops
    /// in lockstep with pushes.
    pub async fn pop(&mut self) -> RingPop {
        match self.signal.recv().await {
            None => RingPop::Closed,
            Some(SIGNAL_EOF) => RingPop::Eof,
            Some(_) => {
                let mut out = [0u8; TS_PACKET_SIZE];
                // A packet signal is sent only after its whole payload is in
                // the ring, so a full packet is always available here
                let read = self.buffer.pop_slice(&mut out);
                debug_assert_eq!(read, TS_PACKET_SIZE);
                RingPop::Packet(out)
            }
        }
    }

    /// Bytes currently held in the ring.
    pub fn fill(&self) -> usize {
        self.buffer.occupied_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Runtime;

    fn payload(tag: u8) -> [u8; TS_PACKET_SIZE] {
        let mut ts = [0u8; TS_PACKET_SIZE];
        ts[0] = 0x47;
        ts[1] = tag;
        ts
    }

    #[test]
    fn test_fifo_order() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (mut tx, mut rx) = sync_ring(8);
            for tag in 0..5u8 {
                tx.push(&payload(tag));
            }
            assert_eq!(rx.fill(), 5 * TS_PACKET_SIZE);
            for tag in 0..5u8 {
                match rx.pop().await {
                    RingPop::Packet(p) => {
                        assert_eq!(p[0], 0x47);
                        assert_eq!(p[1], tag);
                    }
                    _ => panic!("expected packet"),
                }
            }
            assert_eq!(rx.fill(), 0);
        });
    }

    #[test]
    fn test_overflow_drops_and_recovers() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (mut tx, mut rx) = sync_ring(4);
            for tag in 0..10u8 {
                tx.push(&payload(tag));
            }
            // First 4 accepted, 6 dropped
            assert_eq!(rx.fill(), 4 * TS_PACKET_SIZE);
            assert_eq!(tx.dropped(), 6);

            for tag in 0..4u8 {
                match rx.pop().await {
                    RingPop::Packet(p) => assert_eq!(p[1], tag),
                    _ => panic!("expected packet"),
                }
            }
            assert_eq!(rx.fill(), 0);

            // Space again: the next push is accepted and resets the tally
            tx.push(&payload(42));
            assert_eq!(tx.dropped(), 0);
            match rx.pop().await {
                RingPop::Packet(p) => assert_eq!(p[1], 42),
                _ => panic!("expected packet"),
            }
        });
    }

    #[test]
    fn test_eof_sentinel_after_packets() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (mut tx, mut rx) = sync_ring(4);
            tx.push(&payload(1));
            tx.push_eof();
            assert!(matches!(rx.pop().await, RingPop::Packet(_)));
            assert!(matches!(rx.pop().await, RingPop::Eof));
        });
    }

    #[test]
    fn test_closed_when_producer_dropped() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (tx, mut rx) = sync_ring(4);
            drop(tx);
            assert!(matches!(rx.pop().await, RingPop::Closed));
        });
    }

    #[test]
    fn test_wraparound_preserves_payloads() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (mut tx, mut rx) = sync_ring(3);
            let mut next = 0u8;
            let mut expect = 0u8;
            // Push/pop enough to wrap the ring several times
            for _ in 0..4 {
                for _ in 0..3 {
                    tx.push(&payload(next));
                    next = next.wrapping_add(1);
                }
                for _ in 0..3 {
                    match rx.pop().await {
                        RingPop::Packet(p) => {
                            assert_eq!(p[1], expect);
                            expect = expect.wrapping_add(1);
                        }
                        _ => panic!("expected packet"),
                    }
                }
            }
        });
    }
}
