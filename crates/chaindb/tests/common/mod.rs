//! Shared fixtures: a deterministic test chain, stub validation hooks,
//! and an in-memory block-file reader.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use nucleon_chaindb::db::ChainDb;
use nucleon_chaindb::diskindex::DiskBlockIndex;
use nucleon_chaindb::error::ChainDbError;
use nucleon_chaindb::hooks::{BlockReader, ChainHooks};
use nucleon_chaindb::index::{BlockNode, ChainIndex, NodeId};
use nucleon_chaindb::shutdown::ShutdownToken;
use nucleon_chaindb::state::ChainState;
use nucleon_chaindb::txindex::DiskTxPos;
use nucleon_consensus::{ChainParams, Hash256, Network};
use nucleon_primitives::block::{Block, BlockHeader};
use nucleon_primitives::outpoint::OutPoint;
use nucleon_primitives::transaction::{Transaction, TxIn, TxOut};
use nucleon_storage::KeyValueStore;
use primitive_types::U256;

pub fn temp_data_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()))
}

/// Params pointing at an arbitrary genesis, with no checkpoint pins.
pub fn test_params(genesis_hash: Hash256) -> ChainParams {
    ChainParams {
        network: Network::Regtest,
        genesis_hash,
        stake_modifier_checkpoints: &[],
    }
}

#[derive(Default)]
pub struct TestHooks {
    /// Checkpoint pins consulted by `check_stake_modifier_checkpoint`.
    pub checkpoints: Vec<(i32, u32)>,
    /// Request shutdown from inside the first `check_index` call.
    pub shutdown_after_first_index: Option<ShutdownToken>,
    pub check_index_calls: Cell<usize>,
    /// Heights passed to `set_best_chain`, in call order.
    pub set_best_calls: RefCell<Vec<i32>>,
}

impl TestHooks {
    pub fn checksum_for(index: &ChainIndex, id: NodeId) -> u32 {
        let node = index.get(id);
        let prev_checksum = node
            .prev
            .map(|prev| index.get(prev).stake_modifier_checksum)
            .unwrap_or(0);
        prev_checksum
            .wrapping_add(node.stake_modifier as u32)
            .wrapping_add(node.height as u32)
    }
}

impl<S: KeyValueStore> ChainHooks<S> for TestHooks {
    fn check_index(&self, _node: &BlockNode) -> bool {
        let calls = self.check_index_calls.get() + 1;
        self.check_index_calls.set(calls);
        if calls == 1 {
            if let Some(token) = &self.shutdown_after_first_index {
                token.request();
            }
        }
        true
    }

    fn block_trust(&self, node: &BlockNode) -> U256 {
        U256::from(u64::from(node.bits) + 1)
    }

    fn stake_modifier_checksum(&self, index: &ChainIndex, id: NodeId) -> u32 {
        Self::checksum_for(index, id)
    }

    fn check_stake_modifier_checkpoint(&self, height: i32, checksum: u32) -> bool {
        match self
            .checkpoints
            .iter()
            .find(|(pinned_height, _)| *pinned_height == height)
        {
            Some((_, pinned)) => *pinned == checksum,
            None => true,
        }
    }

    fn check_block(
        &self,
        _block: &Block,
        _check_pow: bool,
        _check_merkle_root: bool,
        _check_signature: bool,
    ) -> bool {
        true
    }

    fn check_transaction(&self, _tx: &Transaction) -> bool {
        true
    }

    fn set_best_chain(
        &self,
        db: &mut ChainDb<S>,
        state: &mut ChainState,
        fork: NodeId,
    ) -> Result<(), ChainDbError> {
        let (hash, height) = {
            let node = state.index.get(fork);
            (node.hash, node.height)
        };
        db.batch_begin()?;
        db.write_best_chain(&hash)?;
        db.batch_commit()?;
        state.set_best(fork);
        self.set_best_calls.borrow_mut().push(height);
        Ok(())
    }
}

#[derive(Default)]
pub struct TestReader {
    pub blocks: HashMap<(u32, u32), Block>,
    pub txs: HashMap<(u32, u32, u32), Transaction>,
}

impl BlockReader for TestReader {
    fn read_block(&self, file: u32, block_pos: u32) -> Option<Block> {
        self.blocks.get(&(file, block_pos)).cloned()
    }

    fn read_tx(&self, pos: DiskTxPos) -> Option<Transaction> {
        self.txs.get(&(pos.file, pos.block_pos, pos.tx_pos)).cloned()
    }
}

pub const TEST_BLOCK_FILE: u32 = 1;
pub const TEST_TX_OFFSET: u32 = 4;

pub struct TestChain {
    pub entries: Vec<DiskBlockIndex>,
    pub blocks: Vec<Block>,
    pub hashes: Vec<Hash256>,
}

impl TestChain {
    pub fn block_pos(height: usize) -> u32 {
        (height as u32 + 1) * 1000
    }

    pub fn tx_pos(height: usize) -> DiskTxPos {
        DiskTxPos::new(TEST_BLOCK_FILE, Self::block_pos(height), TEST_TX_OFFSET)
    }

    /// Write every index entry, its transaction index, the best-chain
    /// pointer (tip), and the sync checkpoint (genesis).
    pub fn persist<S: KeyValueStore>(&self, db: &mut ChainDb<S>) {
        for (height, entry) in self.entries.iter().enumerate() {
            db.write_block_index(entry).expect("write block index");
            let tx = &self.blocks[height].transactions[0];
            db.add_tx_index(tx, Self::tx_pos(height), height as i32)
                .expect("add tx index");
        }
        let tip = self.hashes.last().expect("non-empty chain");
        db.write_best_chain(tip).expect("write best chain");
        db.write_sync_checkpoint(&self.hashes[0])
            .expect("write sync checkpoint");
    }

    pub fn reader(&self) -> TestReader {
        let mut reader = TestReader::default();
        for (height, block) in self.blocks.iter().enumerate() {
            let pos = Self::block_pos(height);
            reader
                .blocks
                .insert((TEST_BLOCK_FILE, pos), block.clone());
            reader.txs.insert(
                (TEST_BLOCK_FILE, pos, TEST_TX_OFFSET),
                block.transactions[0].clone(),
            );
        }
        reader
    }
}

/// Build `length` linked blocks starting from a zero previous hash. Each
/// block carries one transaction; header fields are chosen so every block
/// hash is distinct and `bits` varies per height (trust sums are
/// therefore height-dependent).
pub fn build_chain(length: usize) -> TestChain {
    let mut entries = Vec::with_capacity(length);
    let mut blocks = Vec::with_capacity(length);
    let mut hashes = Vec::with_capacity(length);
    let mut prev_hash = [0u8; 32];

    for height in 0..length {
        let tx = Transaction {
            version: 1,
            time: 1_500_000_000 + height as u32,
            vin: vec![TxIn {
                prevout: OutPoint::null(),
                script_sig: vec![height as u8, 0x51],
                sequence: u32::MAX,
            }],
            vout: vec![TxOut {
                value: 50_000_000,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        };
        let header = BlockHeader {
            version: 6,
            hash_prev_block: prev_hash,
            hash_merkle_root: tx.txid(),
            time: 1_500_000_000 + height as u32 * 60,
            bits: 1000 + height as u32,
            nonce: height as u32,
        };
        let hash = header.hash();
        entries.push(DiskBlockIndex {
            hash_prev: prev_hash,
            hash_next: [0u8; 32],
            file: TEST_BLOCK_FILE,
            block_pos: TestChain::block_pos(height),
            height: height as i32,
            mint: 0,
            money_supply: 50_000_000 * (height as i64 + 1),
            flags: 0,
            stake_modifier: 0x1111_0000 + height as u64,
            prevout_stake: OutPoint::null(),
            stake_time: 0,
            hash_proof: [0u8; 32],
            version: header.version,
            hash_merkle_root: header.hash_merkle_root,
            time: header.time,
            bits: header.bits,
            nonce: header.nonce,
        });
        blocks.push(Block {
            header,
            transactions: vec![tx],
            signature: Vec::new(),
        });
        hashes.push(hash);
        prev_hash = hash;
    }

    for height in 0..length.saturating_sub(1) {
        entries[height].hash_next = hashes[height + 1];
    }

    TestChain {
        entries,
        blocks,
        hashes,
    }
}
