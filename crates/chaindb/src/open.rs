//! Opening the store, version gating, and wipe-and-rebuild.

use std::path::Path;
use std::sync::Arc;

use nucleon_log::log_info;
use nucleon_storage::fjall::{FjallOptions, FjallStore};

use crate::config::DbOptions;
use crate::db::ChainDb;
use crate::error::ChainDbError;

/// Schema version of the persisted index. Older stores are wiped and
/// rebuilt; there is no forward-migration path.
pub const DATABASE_VERSION: i32 = 70510;

/// Directory under the data dir that holds the key-value store.
pub const STORE_DIR_NAME: &str = "chaindb";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpenMode {
    pub create: bool,
    pub writable: bool,
}

impl OpenMode {
    /// Create the store if missing; read-write.
    pub fn create() -> Self {
        Self {
            create: true,
            writable: true,
        }
    }

    pub fn read_write() -> Self {
        Self {
            create: false,
            writable: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            create: false,
            writable: false,
        }
    }
}

/// Open (or create) the chain-index store under `data_dir`.
///
/// Reads the stored schema version: a fresh store gets the current
/// version written when `mode.create` is set; a store older than
/// [`DATABASE_VERSION`] is wiped together with the `blk*.dat` payload
/// files and re-created. Open failure is fatal to startup.
pub fn open_chain_db(
    data_dir: &Path,
    mode: OpenMode,
    options: &DbOptions,
) -> Result<ChainDb<FjallStore>, ChainDbError> {
    let store_dir = data_dir.join(STORE_DIR_NAME);
    if !mode.create && !store_dir.exists() {
        return Err(ChainDbError::Open(format!(
            "open_chain_db: store directory {} does not exist",
            store_dir.display()
        )));
    }

    let fjall_options = FjallOptions {
        cache_bytes: options.db_cache_mib * 1024 * 1024,
    };
    log_info!("open_chain_db: opening store in {}", store_dir.display());
    let store = FjallStore::open_with_options(&store_dir, fjall_options)
        .map_err(|err| ChainDbError::Open(format!("open_chain_db: {err}")))?;
    // Version bookkeeping needs a writable handle regardless of the
    // requested mode; the caller's writability is applied at the end.
    let mut db = ChainDb::new(Arc::new(store), true);

    match db.read_version()? {
        Some(version) if version < DATABASE_VERSION => {
            log_info!(
                "open_chain_db: transaction index version {} is older than required {}, removing old database",
                version,
                DATABASE_VERSION,
            );
            drop(db);
            std::fs::remove_dir_all(&store_dir).map_err(|err| {
                ChainDbError::Open(format!("open_chain_db: remove {}: {err}", store_dir.display()))
            })?;
            remove_block_files(data_dir)?;
            let store = FjallStore::open_with_options(&store_dir, fjall_options)
                .map_err(|err| ChainDbError::Open(format!("open_chain_db: {err}")))?;
            db = ChainDb::new(Arc::new(store), true);
            db.write_version(DATABASE_VERSION)?;
        }
        Some(version) => {
            log_info!("open_chain_db: transaction index version is {version}");
        }
        None => {
            if mode.create {
                db.write_version(DATABASE_VERSION)?;
            }
        }
    }

    db.set_writable(mode.writable);
    Ok(db)
}

/// Sweep the block payload files that accompany a wiped store: starting
/// at `blk0001.dat`, remove sequentially until a gap.
fn remove_block_files(data_dir: &Path) -> Result<(), ChainDbError> {
    let mut file_number = 1u32;
    loop {
        let path = data_dir.join(format!("blk{file_number:04}.dat"));
        if !path.exists() {
            break;
        }
        std::fs::remove_file(&path).map_err(|err| {
            ChainDbError::Open(format!("open_chain_db: remove {}: {err}", path.display()))
        })?;
        file_number += 1;
    }
    Ok(())
}
