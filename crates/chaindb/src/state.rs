//! In-memory chain state threaded through the loader, verifier, and the
//! block-acceptance layer above.

use std::collections::HashSet;

use nucleon_consensus::Hash256;
use nucleon_primitives::outpoint::OutPoint;
use nucleon_storage::KeyValueStore;
use primitive_types::U256;

use crate::db::ChainDb;
use crate::error::ChainDbError;
use crate::index::{ChainIndex, NodeId};

pub struct ChainState {
    pub index: ChainIndex,
    pub best: Option<NodeId>,
    pub best_height: i32,
    pub best_chain_trust: U256,
    pub best_invalid_trust: U256,
    pub sync_checkpoint: Hash256,
    /// `(stake prevout, stake time)` pairs seen in loaded proof-of-stake
    /// blocks, used by the acceptance layer to reject duplicate stakes.
    pub stake_seen: HashSet<(OutPoint, u32)>,
}

impl ChainState {
    pub fn new() -> Self {
        Self {
            index: ChainIndex::new(),
            best: None,
            best_height: 0,
            best_chain_trust: U256::zero(),
            best_invalid_trust: U256::zero(),
            sync_checkpoint: [0u8; 32],
            stake_seen: HashSet::new(),
        }
    }

    pub fn best_hash(&self) -> Option<Hash256> {
        self.best.map(|id| self.index.get(id).hash)
    }

    /// Point the best-chain fields at `id`.
    pub fn set_best(&mut self, id: NodeId) {
        let node = self.index.get(id);
        self.best_height = node.height;
        self.best_chain_trust = node.chain_trust;
        self.best = Some(id);
    }

    /// Look up a block by hash, falling back to the store for entries the
    /// bulk load has not seen. A lazily loaded node carries its disk
    /// fields but no derived chain trust.
    pub fn find_or_load<S: KeyValueStore>(
        &mut self,
        db: &ChainDb<S>,
        hash: &Hash256,
    ) -> Result<Option<NodeId>, ChainDbError> {
        if let Some(id) = self.index.lookup(hash) {
            return Ok(Some(id));
        }
        let Some(disk) = db.read_block_index(hash)? else {
            return Ok(None);
        };
        Ok(self.index.adopt(&disk))
    }

    /// Whether a block index entry exists in memory or on disk.
    pub fn contains<S: KeyValueStore>(
        &self,
        db: &ChainDb<S>,
        hash: &Hash256,
    ) -> Result<bool, ChainDbError> {
        if self.index.contains(hash) {
            return Ok(true);
        }
        db.contains_block_index(hash)
    }
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}
