//! In-memory chain-index graph.
//!
//! The graph is an arena: `ChainIndex` owns every node, `prev`/`next` are
//! plain indices into it. Each node stores its own hash inline, so node
//! identity survives map growth without back-pointers into map storage.

use std::collections::HashMap;

use nucleon_consensus::{is_zero_hash, Hash256};
use nucleon_primitives::outpoint::OutPoint;
use primitive_types::U256;

use crate::diskindex::{DiskBlockIndex, BLOCK_PROOF_OF_STAKE};

pub type NodeId = usize;

#[derive(Clone, Debug)]
pub struct BlockNode {
    pub hash: Hash256,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
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
    pub chain_trust: U256,
    pub stake_modifier_checksum: u32,
}

impl BlockNode {
    fn blank(hash: Hash256) -> Self {
        Self {
            hash,
            prev: None,
            next: None,
            file: 0,
            block_pos: 0,
            height: 0,
            mint: 0,
            money_supply: 0,
            flags: 0,
            stake_modifier: 0,
            prevout_stake: OutPoint::null(),
            stake_time: 0,
            hash_proof: [0u8; 32],
            version: 0,
            hash_merkle_root: [0u8; 32],
            time: 0,
            bits: 0,
            nonce: 0,
            chain_trust: U256::zero(),
            stake_modifier_checksum: 0,
        }
    }

    pub fn is_proof_of_stake(&self) -> bool {
        (self.flags & BLOCK_PROOF_OF_STAKE) != 0
    }

    pub fn block_time(&self) -> u32 {
        self.time
    }
}

/// Owning map of the block-index graph. Node ids are allocation order and
/// stay valid for the life of the index.
#[derive(Default)]
pub struct ChainIndex {
    nodes: Vec<BlockNode>,
    by_hash: HashMap<Hash256, NodeId>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &BlockNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut BlockNode {
        &mut self.nodes[id]
    }

    pub fn lookup(&self, hash: &Hash256) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BlockNode)> {
        self.nodes.iter().enumerate()
    }

    /// Look up `hash`, inserting a blank node on first sight. The zero
    /// hash stands for "no block" and maps to `None`.
    pub fn insert_or_create(&mut self, hash: &Hash256) -> Option<NodeId> {
        if is_zero_hash(hash) {
            return None;
        }
        if let Some(id) = self.by_hash.get(hash) {
            return Some(*id);
        }
        let id = self.nodes.len();
        self.nodes.push(BlockNode::blank(*hash));
        self.by_hash.insert(*hash, id);
        Some(id)
    }

    /// Wire a decoded disk record into the graph: create or reuse nodes
    /// for the block and its neighbours, then copy the record's fields
    /// onto the block's node. Returns `None` only if the record hashes to
    /// the zero sentinel, which no valid header does.
    pub fn adopt(&mut self, disk: &DiskBlockIndex) -> Option<NodeId> {
        let block_hash = disk.block_hash();
        let id = self.insert_or_create(&block_hash)?;
        let prev = self.insert_or_create(&disk.hash_prev);
        let next = self.insert_or_create(&disk.hash_next);
        let node = self.get_mut(id);
        node.prev = prev;
        node.next = next;
        node.file = disk.file;
        node.block_pos = disk.block_pos;
        node.height = disk.height;
        node.mint = disk.mint;
        node.money_supply = disk.money_supply;
        node.flags = disk.flags;
        node.stake_modifier = disk.stake_modifier;
        node.prevout_stake = disk.prevout_stake.clone();
        node.stake_time = disk.stake_time;
        node.hash_proof = disk.hash_proof;
        node.version = disk.version;
        node.hash_merkle_root = disk.hash_merkle_root;
        node.time = disk.time;
        node.bits = disk.bits;
        node.nonce = disk.nonce;
        Some(id)
    }
}
