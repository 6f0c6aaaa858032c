//! On-disk block index record.

use nucleon_consensus::Hash256;
use nucleon_primitives::block::BlockHeader;
use nucleon_primitives::encoding::{Decodable, DecodeError, Decoder, Encodable, Encoder};
use nucleon_primitives::outpoint::OutPoint;

pub const BLOCK_PROOF_OF_STAKE: u32 = 1 << 0;
pub const BLOCK_STAKE_ENTROPY: u32 = 1 << 1;
pub const BLOCK_STAKE_MODIFIER: u32 = 1 << 2;

/// Fixed-layout record describing one block: its place in the chain, its
/// payload location in the block files, proof-of-stake bookkeeping, and
/// the header fields the block hash is derived from. The record does not
/// store the block's own hash; [`DiskBlockIndex::block_hash`] recomputes
/// it from the header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskBlockIndex {
    pub hash_prev: Hash256,
    pub hash_next: Hash256,
    pub file: u32,
    pub block_pos: u32,
    pub height: i32,
    pub mint: i64,
    pub money_supply: i64,
    pub flags: u32,
    pub stake_modifier: u64,
    pub prevout_stake: OutPoint,
    pub stake_time: u32,
    pub hash_proof: Hash256,
    pub version: i32,
    pub hash_merkle_root: Hash256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl DiskBlockIndex {
    pub fn is_proof_of_stake(&self) -> bool {
        (self.flags & BLOCK_PROOF_OF_STAKE) != 0
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            version: self.version,
            hash_prev_block: self.hash_prev,
            hash_merkle_root: self.hash_merkle_root,
            time: self.time,
            bits: self.bits,
            nonce: self.nonce,
        }
    }

    pub fn block_hash(&self) -> Hash256 {
        self.header().hash()
    }
}

impl Encodable for DiskBlockIndex {
    fn encode_to(&self, encoder: &mut Encoder) {
        encoder.write_hash(&self.hash_prev);
        encoder.write_hash(&self.hash_next);
        encoder.write_u32_le(self.file);
        encoder.write_u32_le(self.block_pos);
        encoder.write_i32_le(self.height);
        encoder.write_i64_le(self.mint);
        encoder.write_i64_le(self.money_supply);
        encoder.write_u32_le(self.flags);
        encoder.write_u64_le(self.stake_modifier);
        self.prevout_stake.encode_to(encoder);
        encoder.write_u32_le(self.stake_time);
        encoder.write_hash(&self.hash_proof);
        encoder.write_i32_le(self.version);
        encoder.write_hash(&self.hash_merkle_root);
        encoder.write_u32_le(self.time);
        encoder.write_u32_le(self.bits);
        encoder.write_u32_le(self.nonce);
    }
}

impl Decodable for DiskBlockIndex {
    fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let hash_prev = decoder.read_hash()?;
        let hash_next = decoder.read_hash()?;
        let file = decoder.read_u32_le()?;
        let block_pos = decoder.read_u32_le()?;
        let height = decoder.read_i32_le()?;
        let mint = decoder.read_i64_le()?;
        let money_supply = decoder.read_i64_le()?;
        let flags = decoder.read_u32_le()?;
        let stake_modifier = decoder.read_u64_le()?;
        let prevout_stake = OutPoint::decode_from(decoder)?;
        let stake_time = decoder.read_u32_le()?;
        let hash_proof = decoder.read_hash()?;
        let version = decoder.read_i32_le()?;
        let hash_merkle_root = decoder.read_hash()?;
        let time = decoder.read_u32_le()?;
        let bits = decoder.read_u32_le()?;
        let nonce = decoder.read_u32_le()?;
        Ok(Self {
            hash_prev,
            hash_next,
            file,
            block_pos,
            height,
            mint,
            money_supply,
            flags,
            stake_modifier,
            prevout_stake,
            stake_time,
            hash_proof,
            version,
            hash_merkle_root,
            time,
            bits,
            nonce,
        })
    }
}
