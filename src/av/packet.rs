use bytes::Bytes;

/// A single delivered transport stream packet.
#[derive(Debug, Clone)]
pub struct Packet {
    /// The 188-byte TS payload, starting with the 0x47 sync byte
    pub data: Bytes,
    /// The packet's own PCR, when its adaptation field carries one
    pub pcr: Option<u64>,
}

impl Packet {
    /// Creates a packet from a payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pcr: None,
        }
    }

    /// Attaches the PCR carried by this packet.
    pub fn with_pcr(mut self, pcr: u64) -> Self {
        self.pcr = Some(pcr);
        self
    }
}
