//! Startup control flow: open, load, verify, recover.

use std::path::Path;

use nucleon_consensus::ChainParams;
use nucleon_storage::fjall::FjallStore;

use crate::config::DbOptions;
use crate::db::ChainDb;
use crate::error::ChainDbError;
use crate::hooks::{BlockReader, ChainHooks};
use crate::loader::load_block_index;
use crate::open::{open_chain_db, OpenMode};
use crate::shutdown::ShutdownToken;
use crate::state::ChainState;
use crate::verify::verify_chain;

/// Bring the chain-index store up: open the engine (wiping an outdated
/// store), rebuild the in-memory index, then run the startup integrity
/// scan, rolling the best chain back if it found corruption. A shutdown
/// request during any phase ends the pipeline cleanly with whatever state
/// has been built so far.
pub fn bootstrap<H, R>(
    data_dir: &Path,
    mode: OpenMode,
    options: &DbOptions,
    params: &ChainParams,
    hooks: &H,
    reader: &R,
    shutdown: &ShutdownToken,
) -> Result<(ChainDb<FjallStore>, ChainState), ChainDbError>
where
    H: ChainHooks<FjallStore>,
    R: BlockReader,
{
    let mut db = open_chain_db(data_dir, mode, options)?;
    let mut state = ChainState::new();
    load_block_index(&db, &mut state, params, hooks, shutdown)?;
    if shutdown.is_requested() {
        return Ok((db, state));
    }
    verify_chain(
        &mut db,
        &mut state,
        reader,
        hooks,
        options.check_level,
        options.check_blocks,
        shutdown,
    )?;
    Ok((db, state))
}
