//! Seams to the validation layer.
//!
//! The store reconstructs and verifies chain structure; what a valid
//! block, transaction, or stake modifier looks like is the validation
//! layer's business and arrives through these traits.

use nucleon_primitives::block::Block;
use nucleon_primitives::transaction::Transaction;
use nucleon_storage::KeyValueStore;
use primitive_types::U256;

use crate::db::ChainDb;
use crate::error::ChainDbError;
use crate::index::{BlockNode, ChainIndex, NodeId};
use crate::state::ChainState;
use crate::txindex::DiskTxPos;

pub trait ChainHooks<S: KeyValueStore> {
    /// Sanity-check a reconstructed index entry.
    fn check_index(&self, node: &BlockNode) -> bool;

    /// Difficulty-derived weight this block contributes to chain trust.
    fn block_trust(&self, node: &BlockNode) -> U256;

    /// Rolling stake-modifier checksum for `id`; ancestors have their
    /// checksums populated before descendants are asked for.
    fn stake_modifier_checksum(&self, index: &ChainIndex, id: NodeId) -> u32;

    /// Gate a computed checksum against the hard-coded checkpoints.
    fn check_stake_modifier_checkpoint(&self, height: i32, checksum: u32) -> bool;

    fn check_block(
        &self,
        block: &Block,
        check_pow: bool,
        check_merkle_root: bool,
        check_signature: bool,
    ) -> bool;

    fn check_transaction(&self, tx: &Transaction) -> bool;

    /// Roll the best chain back to `fork`. Implementations funnel every
    /// write through a batch on `db` and update `state` to match.
    fn set_best_chain(
        &self,
        db: &mut ChainDb<S>,
        state: &mut ChainState,
        fork: NodeId,
    ) -> Result<(), ChainDbError>;
}

/// Access to the block payload files.
pub trait BlockReader {
    fn read_block(&self, file: u32, block_pos: u32) -> Option<Block>;
    fn read_tx(&self, pos: DiskTxPos) -> Option<Transaction>;
}
