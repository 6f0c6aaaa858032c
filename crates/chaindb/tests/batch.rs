//! Batch layer semantics: atomic commit, discard on drop, and
//! read-your-writes through the pending batch.

use std::sync::Arc;

use nucleon_chaindb::db::ChainDb;
use nucleon_chaindb::error::ChainDbError;
use nucleon_chaindb::txindex::{DiskTxPos, TxIndexEntry};
use nucleon_primitives::outpoint::OutPoint;
use nucleon_primitives::transaction::{Transaction, TxIn, TxOut};
use nucleon_storage::memory::MemoryStore;

fn sample_tx(outputs: usize) -> Transaction {
    Transaction {
        version: 1,
        time: 1_500_000_000,
        vin: vec![TxIn {
            prevout: OutPoint::null(),
            script_sig: vec![0x51],
            sequence: u32::MAX,
        }],
        vout: (0..outputs)
            .map(|index| TxOut {
                value: 1_000_000 * (index as i64 + 1),
                script_pubkey: vec![0x51, index as u8],
            })
            .collect(),
        lock_time: 0,
    }
}

#[test]
fn committed_writes_are_visible() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(Arc::clone(&store), true);

    let tx = sample_tx(1);
    let entry = TxIndexEntry::new(DiskTxPos::new(1, 1000, 4), tx.vout.len());

    db.batch_begin().expect("begin");
    db.update_tx_index(&tx.txid(), &entry).expect("update");
    db.batch_commit().expect("commit");

    let other = ChainDb::new(store, false);
    let fetched = other
        .read_tx_index(&tx.txid())
        .expect("read")
        .expect("present");
    assert_eq!(fetched, entry);
}

#[test]
fn dropped_batch_leaves_no_trace() {
    let store = Arc::new(MemoryStore::new());
    let tx = sample_tx(2);
    {
        let mut db = ChainDb::new(Arc::clone(&store), true);
        db.batch_begin().expect("begin");
        db.add_tx_index(&tx, DiskTxPos::new(1, 1000, 4), 0)
            .expect("add");
        db.write_best_chain(&[0x42; 32]).expect("write best");
        // Handle dropped with the batch still open.
    }
    let db = ChainDb::new(store, false);
    assert!(!db.contains_tx(&tx.txid()).expect("contains"));
    assert_eq!(db.read_best_chain().expect("read"), None);
}

#[test]
fn batch_abort_discards_pending_writes() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, true);
    let tx = sample_tx(1);

    db.batch_begin().expect("begin");
    db.add_tx_index(&tx, DiskTxPos::new(1, 1000, 4), 0)
        .expect("add");
    db.batch_abort();

    assert!(!db.in_batch());
    assert!(!db.contains_tx(&tx.txid()).expect("contains"));
}

#[test]
fn reads_see_latest_pending_mutation() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, true);
    let tx = sample_tx(1);
    let txid = tx.txid();

    let v1 = TxIndexEntry::new(DiskTxPos::new(1, 100, 4), 1);
    let v2 = TxIndexEntry::new(DiskTxPos::new(1, 200, 4), 1);
    let v3 = TxIndexEntry::new(DiskTxPos::new(1, 300, 4), 1);

    db.batch_begin().expect("begin");
    db.update_tx_index(&txid, &v1).expect("put v1");
    db.update_tx_index(&txid, &v2).expect("put v2");
    assert_eq!(db.read_tx_index(&txid).expect("read"), Some(v2));

    db.erase_tx_index(&tx).expect("erase");
    assert_eq!(db.read_tx_index(&txid).expect("read"), None);
    assert!(!db.contains_tx(&txid).expect("contains"));

    db.update_tx_index(&txid, &v3).expect("put v3");
    assert_eq!(db.read_tx_index(&txid).expect("read"), Some(v3.clone()));

    db.batch_commit().expect("commit");
    assert_eq!(db.read_tx_index(&txid).expect("read"), Some(v3));
}

#[test]
fn one_batch_per_handle() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, true);
    db.batch_begin().expect("begin");
    assert!(matches!(db.batch_begin(), Err(ChainDbError::BatchActive)));
}

#[test]
fn commit_without_batch_is_an_error() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, true);
    assert!(matches!(db.batch_commit(), Err(ChainDbError::NoActiveBatch)));
}

#[test]
fn read_only_handles_reject_mutation() {
    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, false);
    assert!(matches!(db.batch_begin(), Err(ChainDbError::ReadOnly)));
    assert!(matches!(
        db.write_best_chain(&[0x01; 32]),
        Err(ChainDbError::ReadOnly)
    ));
}

#[test]
fn singleton_roundtrips() {
    use primitive_types::U256;

    let store = Arc::new(MemoryStore::new());
    let mut db = ChainDb::new(store, true);

    assert_eq!(db.read_best_invalid_trust().expect("read"), None);
    db.write_best_invalid_trust(&U256::from(0x1234_5678u64))
        .expect("write trust");
    assert_eq!(
        db.read_best_invalid_trust().expect("read"),
        Some(U256::from(0x1234_5678u64))
    );

    db.write_sync_checkpoint(&[0x0c; 32]).expect("write checkpoint");
    assert_eq!(
        db.read_sync_checkpoint().expect("read"),
        Some([0x0c; 32])
    );

    assert_eq!(db.read_checkpoint_pubkey().expect("read"), None);
    db.write_checkpoint_pubkey("04deadbeef").expect("write pubkey");
    assert_eq!(
        db.read_checkpoint_pubkey().expect("read").as_deref(),
        Some("04deadbeef")
    );

    db.write_version(42).expect("write version");
    assert_eq!(db.read_version().expect("read"), Some(42));
}
