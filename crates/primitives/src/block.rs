//! Block header and block types.

use nucleon_consensus::Hash256;

use crate::encoding::{Decodable, DecodeError, Decoder, Encodable, Encoder};
use crate::hash::sha256d;
use crate::transaction::Transaction;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockHeader {
    pub version: i32,
    pub hash_prev_block: Hash256,
    pub hash_merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Block identity: double-SHA256 of the 80-byte header.
    pub fn hash(&self) -> Hash256 {
        let mut encoder = Encoder::with_capacity(80);
        self.encode_to(&mut encoder);
        sha256d(&encoder.into_inner())
    }
}

impl Encodable for BlockHeader {
    fn encode_to(&self, encoder: &mut Encoder) {
        encoder.write_i32_le(self.version);
        encoder.write_hash(&self.hash_prev_block);
        encoder.write_hash(&self.hash_merkle_root);
        encoder.write_u32_le(self.time);
        encoder.write_u32_le(self.bits);
        encoder.write_u32_le(self.nonce);
    }
}

impl Decodable for BlockHeader {
    fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let version = decoder.read_i32_le()?;
        let hash_prev_block = decoder.read_hash()?;
        let hash_merkle_root = decoder.read_hash()?;
        let time = decoder.read_u32_le()?;
        let bits = decoder.read_u32_le()?;
        let nonce = decoder.read_u32_le()?;
        Ok(Self {
            version,
            hash_prev_block,
            hash_merkle_root,
            time,
            bits,
            nonce,
        })
    }
}

/// A full block: header, transactions, and the proof-of-stake block
/// signature (empty for proof-of-work blocks).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub signature: Vec<u8>,
}

impl Block {
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    pub fn is_proof_of_stake(&self) -> bool {
        self.transactions.len() > 1 && self.transactions[1].is_coinstake()
    }
}

impl Encodable for Block {
    fn encode_to(&self, encoder: &mut Encoder) {
        self.header.encode_to(encoder);
        encoder.write_compact_size(self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode_to(encoder);
        }
        encoder.write_var_bytes(&self.signature);
    }
}

impl Decodable for Block {
    fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let header = BlockHeader::decode_from(decoder)?;
        let count = decoder.read_compact_size()?;
        let mut transactions = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            transactions.push(Transaction::decode_from(decoder)?);
        }
        let signature = decoder.read_var_bytes()?;
        Ok(Self {
            header,
            transactions,
            signature,
        })
    }
}
