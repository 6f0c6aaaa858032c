//! Index loader: rebuilds the in-memory chain-index graph from the store.

use nucleon_consensus::ChainParams;
use nucleon_log::log_info;
use nucleon_primitives::encoding::decode;
use nucleon_primitives::hash::hash_to_hex;
use nucleon_storage::{Column, KeyValueStore};
use primitive_types::U256;

use crate::db::ChainDb;
use crate::diskindex::DiskBlockIndex;
use crate::error::ChainDbError;
use crate::hooks::ChainHooks;
use crate::index::NodeId;
use crate::shutdown::ShutdownToken;
use crate::state::ChainState;

/// Rebuild `state` from the store's block-index entries.
///
/// Scans every index record, wires parent/child links, recomputes chain
/// trust and stake-modifier checksums in height order, then resolves the
/// best-chain pointer and singletons. Idempotent: a non-empty index means
/// a previous load already ran and the call is a no-op. A shutdown request
/// mid-scan stops cleanly and reports success so the node can exit.
pub fn load_block_index<S: KeyValueStore>(
    db: &ChainDb<S>,
    state: &mut ChainState,
    params: &ChainParams,
    hooks: &impl ChainHooks<S>,
    shutdown: &ShutdownToken,
) -> Result<(), ChainDbError> {
    if !state.index.is_empty() {
        return Ok(());
    }

    let mut scan_error: Option<ChainDbError> = None;
    db.store()
        .for_each_prefix(Column::BlockIndex, &[], &mut |_key, value| {
            if shutdown.is_requested() {
                return Ok(false);
            }
            let disk = match decode::<DiskBlockIndex>(value) {
                Ok(disk) => disk,
                Err(err) => {
                    scan_error = Some(ChainDbError::Decode(err));
                    return Ok(false);
                }
            };
            let Some(id) = state.index.adopt(&disk) else {
                scan_error = Some(ChainDbError::Corrupt(
                    "load_block_index: zero block hash in index record".to_string(),
                ));
                return Ok(false);
            };
            let node = state.index.get(id);
            if !hooks.check_index(node) {
                scan_error = Some(ChainDbError::Corrupt(format!(
                    "load_block_index: check_index failed at {}",
                    node.height
                )));
                return Ok(false);
            }
            if node.is_proof_of_stake() {
                state
                    .stake_seen
                    .insert((node.prevout_stake.clone(), node.stake_time));
            }
            Ok(true)
        })?;
    if let Some(err) = scan_error {
        return Err(err);
    }
    if shutdown.is_requested() {
        return Ok(());
    }

    // Derived fields accumulate parent-first: ascending height, insertion
    // order as the tie-break so repeated loads are deterministic.
    let mut by_height: Vec<NodeId> = (0..state.index.len()).collect();
    by_height.sort_by_key(|id| (state.index.get(*id).height, *id));
    for id in by_height {
        let (prev_trust, block_trust) = {
            let node = state.index.get(id);
            let prev_trust = node
                .prev
                .map(|prev| state.index.get(prev).chain_trust)
                .unwrap_or_else(U256::zero);
            (prev_trust, hooks.block_trust(node))
        };
        let checksum = hooks.stake_modifier_checksum(&state.index, id);
        let node = state.index.get_mut(id);
        node.chain_trust = prev_trust.saturating_add(block_trust);
        node.stake_modifier_checksum = checksum;
        if !hooks.check_stake_modifier_checkpoint(node.height, checksum) {
            return Err(ChainDbError::Corrupt(format!(
                "load_block_index: failed stake modifier checkpoint height={} modifier={:#018x}",
                node.height, node.stake_modifier
            )));
        }
    }

    let best_hash = match db.read_best_chain()? {
        None => {
            if !state.index.contains(&params.genesis_hash) {
                // Fresh node: nothing persisted yet.
                return Ok(());
            }
            return Err(ChainDbError::Corrupt(
                "load_block_index: best chain pointer not loaded".to_string(),
            ));
        }
        Some(hash) => hash,
    };
    let Some(best_id) = state.index.lookup(&best_hash) else {
        return Err(ChainDbError::Corrupt(
            "load_block_index: best chain hash not found in the block index".to_string(),
        ));
    };
    state.set_best(best_id);
    log_info!(
        "load_block_index: best chain hash={} height={} trust={}",
        &hash_to_hex(&best_hash)[..20],
        state.best_height,
        state.best_chain_trust,
    );

    let Some(checkpoint) = db.read_sync_checkpoint()? else {
        return Err(ChainDbError::Corrupt(
            "load_block_index: sync checkpoint not loaded".to_string(),
        ));
    };
    state.sync_checkpoint = checkpoint;
    log_info!(
        "load_block_index: synchronized checkpoint {}",
        hash_to_hex(&checkpoint),
    );

    state.best_invalid_trust = db.read_best_invalid_trust()?.unwrap_or_else(U256::zero);

    Ok(())
}
