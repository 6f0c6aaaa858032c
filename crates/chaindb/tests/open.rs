//! Open pipeline: fresh create, reopen, and the version-bump wipe.

mod common;

use std::sync::Arc;

use common::{test_params, TestHooks};
use nucleon_chaindb::db::ChainDb;
use nucleon_chaindb::error::ChainDbError;
use nucleon_chaindb::loader::load_block_index;
use nucleon_chaindb::open::{open_chain_db, OpenMode, DATABASE_VERSION, STORE_DIR_NAME};
use nucleon_chaindb::shutdown::ShutdownToken;
use nucleon_chaindb::state::ChainState;
use nucleon_chaindb::DbOptions;
use nucleon_storage::fjall::FjallStore;

#[test]
fn fresh_create_writes_the_version() {
    let data_dir = common::temp_data_dir("nucleon-chaindb-create");
    std::fs::create_dir_all(&data_dir).expect("create data dir");

    let db = open_chain_db(&data_dir, OpenMode::create(), &DbOptions::default())
        .expect("open");
    assert_eq!(db.read_version().expect("version"), Some(DATABASE_VERSION));
    assert_eq!(db.read_best_chain().expect("best"), None);

    let mut state = ChainState::new();
    let hooks = TestHooks::default();
    let params = test_params([0x13; 32]);
    load_block_index(&db, &mut state, &params, &hooks, &ShutdownToken::new())
        .expect("load");
    assert!(state.index.is_empty());
    assert_eq!(state.best, None);
}

#[test]
fn read_only_open_requires_an_existing_store() {
    let data_dir = common::temp_data_dir("nucleon-chaindb-missing");
    std::fs::create_dir_all(&data_dir).expect("create data dir");

    let err = open_chain_db(&data_dir, OpenMode::read_only(), &DbOptions::default())
        .unwrap_err();
    assert!(matches!(err, ChainDbError::Open(_)));
}

#[test]
fn reopen_preserves_contents() {
    let data_dir = common::temp_data_dir("nucleon-chaindb-reopen");
    std::fs::create_dir_all(&data_dir).expect("create data dir");

    {
        let mut db = open_chain_db(&data_dir, OpenMode::create(), &DbOptions::default())
            .expect("open");
        db.write_best_chain(&[0x21; 32]).expect("write best");
        db.store().persist().expect("persist");
    }

    let db = open_chain_db(&data_dir, OpenMode::read_only(), &DbOptions::default())
        .expect("reopen");
    assert_eq!(db.read_version().expect("version"), Some(DATABASE_VERSION));
    assert_eq!(db.read_best_chain().expect("best"), Some([0x21; 32]));
}

#[test]
fn outdated_version_wipes_store_and_block_files() {
    let data_dir = common::temp_data_dir("nucleon-chaindb-wipe");
    std::fs::create_dir_all(&data_dir).expect("create data dir");

    // Seed a store one schema version behind, with a best-chain pointer
    // that must not survive the wipe.
    {
        let store = FjallStore::open(data_dir.join(STORE_DIR_NAME)).expect("seed open");
        let mut db = ChainDb::new(Arc::new(store), true);
        db.write_version(DATABASE_VERSION - 1).expect("seed version");
        db.write_best_chain(&[0x66; 32]).expect("seed best");
        db.store().persist().expect("persist");
    }
    for name in ["blk0001.dat", "blk0002.dat", "blk0004.dat"] {
        std::fs::write(data_dir.join(name), b"payload").expect("write blk file");
    }

    let db = open_chain_db(&data_dir, OpenMode::create(), &DbOptions::default())
        .expect("reopen");
    assert_eq!(db.read_version().expect("version"), Some(DATABASE_VERSION));
    assert_eq!(db.read_best_chain().expect("best"), None);

    assert!(!data_dir.join("blk0001.dat").exists());
    assert!(!data_dir.join("blk0002.dat").exists());
    // The sweep stops at the first gap, exactly like the historical
    // four-digit sequence scan.
    assert!(data_dir.join("blk0004.dat").exists());
}
