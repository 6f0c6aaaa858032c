//! Startup integrity scan over a tail of the best chain.

use std::collections::HashMap;

use nucleon_log::{log_info, log_warn};
use nucleon_primitives::hash::hash_to_hex;
use nucleon_storage::KeyValueStore;

use crate::db::ChainDb;
use crate::error::ChainDbError;
use crate::hooks::{BlockReader, ChainHooks};
use crate::index::NodeId;
use crate::shutdown::ShutdownToken;
use crate::state::ChainState;

/// Walk the best chain tip-down for `check_blocks` blocks (0 = the whole
/// chain), running the checks selected by `check_level` at every block.
///
/// Check levels are cumulative:
///   1 - re-read each block and validate it (level 7 also checks the
///       block signature)
///   2 - cross-check transaction index positions against the block,
///       re-reading mislocated transactions
///   3 - re-read every transaction and compare its hash
///   4 - require spent markers to point into the scanned tail
///   5 - require every input's prevout to carry a spent marker
///   6 - re-read each spender, validate it, and require it to actually
///       spend the output it is recorded against
///
/// Any failed check records the failing block's parent as the fork point;
/// the walk keeps descending so every corrupt block gets logged, and the
/// deepest fork wins. Afterwards the best chain is rolled back to the
/// fork via the validation layer. A corruption-free scan leaves the best
/// pointer untouched.
pub fn verify_chain<S: KeyValueStore>(
    db: &mut ChainDb<S>,
    state: &mut ChainState,
    reader: &impl BlockReader,
    hooks: &impl ChainHooks<S>,
    check_level: u32,
    check_blocks: u32,
    shutdown: &ShutdownToken,
) -> Result<(), ChainDbError> {
    let Some(best) = state.best else {
        return Ok(());
    };

    let mut check_depth = if check_blocks == 0 {
        1_000_000_000
    } else {
        check_blocks as i32
    };
    if check_depth > state.best_height {
        check_depth = state.best_height;
    }
    log_info!(
        "verify_chain: verifying last {} blocks at level {}",
        check_depth,
        check_level,
    );

    let mut fork: Option<NodeId> = None;
    let mut block_positions: HashMap<(u32, u32), NodeId> = HashMap::new();
    let mut cursor = best;
    loop {
        let node = state.index.get(cursor);
        let Some(prev) = node.prev else {
            break;
        };
        if shutdown.is_requested() || node.height < state.best_height - check_depth {
            break;
        }

        let Some(block) = reader.read_block(node.file, node.block_pos) else {
            return Err(ChainDbError::Corrupt(
                "verify_chain: block read failed".to_string(),
            ));
        };

        if check_level > 0 && !hooks.check_block(&block, true, true, check_level > 6) {
            log_warn!(
                "verify_chain: [WARNING] found bad block at {}, hash={}",
                node.height,
                hash_to_hex(&node.hash),
            );
            fork = Some(prev);
        }

        if check_level > 1 {
            block_positions.insert((node.file, node.block_pos), cursor);

            for tx in &block.transactions {
                let tx_hash = tx.txid();

                if let Some(txindex) = db.read_tx_index(&tx_hash)? {
                    // Either the index points somewhere else (an error or
                    // a duplicate transaction) or the level asks for a
                    // full re-read; both paths re-read and compare hashes.
                    if check_level > 2
                        || node.file != txindex.pos.file
                        || node.block_pos != txindex.pos.block_pos
                    {
                        match reader.read_tx(txindex.pos) {
                            None => {
                                log_warn!(
                                    "verify_chain: [WARNING] cannot read mislocated transaction {}",
                                    hash_to_hex(&tx_hash),
                                );
                                fork = Some(prev);
                            }
                            Some(found) => {
                                if found.txid() != tx_hash {
                                    log_warn!(
                                        "verify_chain: [WARNING] invalid tx position for {}",
                                        hash_to_hex(&tx_hash),
                                    );
                                    fork = Some(prev);
                                }
                            }
                        }
                    }

                    if check_level > 3 {
                        for (output_index, marker) in txindex.spent.iter().enumerate() {
                            let Some(spent_pos) = marker else {
                                continue;
                            };
                            if !block_positions
                                .contains_key(&(spent_pos.file, spent_pos.block_pos))
                            {
                                log_warn!(
                                    "verify_chain: [WARNING] found bad spend at {}, hash_block={}, hash_tx={}",
                                    node.height,
                                    hash_to_hex(&node.hash),
                                    hash_to_hex(&tx_hash),
                                );
                                fork = Some(prev);
                            }
                            if check_level > 5 {
                                match reader.read_tx(*spent_pos) {
                                    None => {
                                        log_warn!(
                                            "verify_chain: [WARNING] cannot read spending transaction of {}:{} from disk",
                                            hash_to_hex(&tx_hash),
                                            output_index,
                                        );
                                        fork = Some(prev);
                                    }
                                    Some(spender) => {
                                        if !hooks.check_transaction(&spender) {
                                            log_warn!(
                                                "verify_chain: [WARNING] spending transaction of {}:{} is invalid",
                                                hash_to_hex(&tx_hash),
                                                output_index,
                                            );
                                            fork = Some(prev);
                                        } else {
                                            let spends = spender.vin.iter().any(|input| {
                                                input.prevout.hash == tx_hash
                                                    && input.prevout.index == output_index as u32
                                            });
                                            if !spends {
                                                log_warn!(
                                                    "verify_chain: [WARNING] spending transaction of {}:{} does not spend it",
                                                    hash_to_hex(&tx_hash),
                                                    output_index,
                                                );
                                                fork = Some(prev);
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                if check_level > 4 {
                    for input in &tx.vin {
                        if let Some(prev_entry) = db.read_tx_index(&input.prevout.hash)? {
                            let spent_index = input.prevout.index as usize;
                            if prev_entry.spent.len() <= spent_index
                                || prev_entry.spent[spent_index].is_none()
                            {
                                log_warn!(
                                    "verify_chain: [WARNING] found unspent prevout {}:{} in {}",
                                    hash_to_hex(&input.prevout.hash),
                                    input.prevout.index,
                                    hash_to_hex(&tx_hash),
                                );
                                fork = Some(prev);
                            }
                        }
                    }
                }
            }
        }

        cursor = prev;
    }

    if let Some(fork_id) = fork {
        if !shutdown.is_requested() {
            let (fork_height, fork_file, fork_pos) = {
                let fork_node = state.index.get(fork_id);
                (fork_node.height, fork_node.file, fork_node.block_pos)
            };
            log_warn!(
                "verify_chain: [WARNING] moving best chain pointer back to block {}",
                fork_height,
            );
            if reader.read_block(fork_file, fork_pos).is_none() {
                return Err(ChainDbError::Corrupt(
                    "verify_chain: block read failed".to_string(),
                ));
            }
            hooks.set_best_chain(db, state, fork_id)?;
        }
    }

    Ok(())
}
