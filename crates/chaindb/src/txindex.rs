//! Transaction index record: where a transaction lives on disk and which
//! of its outputs have been spent.

use nucleon_primitives::encoding::{Decodable, DecodeError, Decoder, Encodable, Encoder};

/// Position of a serialized transaction inside the block files.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DiskTxPos {
    pub file: u32,
    pub block_pos: u32,
    pub tx_pos: u32,
}

impl DiskTxPos {
    pub fn new(file: u32, block_pos: u32, tx_pos: u32) -> Self {
        Self {
            file,
            block_pos,
            tx_pos,
        }
    }

    /// The all-ones sentinel marks an unspent slot on disk.
    pub fn null() -> Self {
        Self {
            file: u32::MAX,
            block_pos: u32::MAX,
            tx_pos: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }
}

impl Encodable for DiskTxPos {
    fn encode_to(&self, encoder: &mut Encoder) {
        encoder.write_u32_le(self.file);
        encoder.write_u32_le(self.block_pos);
        encoder.write_u32_le(self.tx_pos);
    }
}

impl Decodable for DiskTxPos {
    fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let file = decoder.read_u32_le()?;
        let block_pos = decoder.read_u32_le()?;
        let tx_pos = decoder.read_u32_le()?;
        Ok(Self {
            file,
            block_pos,
            tx_pos,
        })
    }
}

/// One entry per indexed transaction: its disk position plus a spent
/// marker per output. `None` means unspent; `Some(pos)` names the disk
/// position of the spending transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxIndexEntry {
    pub pos: DiskTxPos,
    pub spent: Vec<Option<DiskTxPos>>,
}

impl TxIndexEntry {
    /// Fresh entry for a transaction with `n_outputs` outputs, all unspent.
    pub fn new(pos: DiskTxPos, n_outputs: usize) -> Self {
        Self {
            pos,
            spent: vec![None; n_outputs],
        }
    }
}

impl Encodable for TxIndexEntry {
    fn encode_to(&self, encoder: &mut Encoder) {
        self.pos.encode_to(encoder);
        encoder.write_compact_size(self.spent.len() as u64);
        for marker in &self.spent {
            marker.unwrap_or_else(DiskTxPos::null).encode_to(encoder);
        }
    }
}

impl Decodable for TxIndexEntry {
    fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let pos = DiskTxPos::decode_from(decoder)?;
        let count = decoder.read_compact_size()?;
        let mut spent = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            let marker = DiskTxPos::decode_from(decoder)?;
            spent.push(if marker.is_null() { None } else { Some(marker) });
        }
        Ok(Self { pos, spent })
    }
}
