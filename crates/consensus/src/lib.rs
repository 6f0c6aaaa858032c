//! Consensus constants and per-network chain parameters.

pub mod params;

pub use params::{chain_params, ChainParams, Network};

pub type Hash256 = [u8; 32];

pub const ZERO_HASH: Hash256 = [0u8; 32];

pub fn is_zero_hash(hash: &Hash256) -> bool {
    hash.iter().all(|byte| *byte == 0)
}
