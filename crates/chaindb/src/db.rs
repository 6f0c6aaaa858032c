//! Typed store handle with an optional write batch.
//!
//! A handle may hold at most one active batch. While a batch is active,
//! mutations buffer into it and reads consult it before the underlying
//! store, so a handle always sees its own pending writes. Commit applies
//! the batch atomically; dropping the handle (or `batch_abort`) discards
//! pending mutations.

use std::sync::Arc;

use nucleon_consensus::Hash256;
use nucleon_primitives::encoding::{decode, encode, Decoder, Encoder};
use nucleon_primitives::outpoint::OutPoint;
use nucleon_primitives::transaction::Transaction;
use nucleon_storage::{Column, KeyValueStore, WriteBatch, WriteOp};
use primitive_types::U256;

use crate::diskindex::DiskBlockIndex;
use crate::error::ChainDbError;
use crate::hooks::BlockReader;
use crate::txindex::{DiskTxPos, TxIndexEntry};

const META_BEST_CHAIN_KEY: &[u8] = b"hashBestChain";
const META_BEST_INVALID_TRUST_KEY: &[u8] = b"bnBestInvalidTrust";
const META_SYNC_CHECKPOINT_KEY: &[u8] = b"hashSyncCheckpoint";
const META_CHECKPOINT_PUBKEY_KEY: &[u8] = b"strCheckpointPubKey";
const META_VERSION_KEY: &[u8] = b"version";

#[derive(Debug)]
pub struct ChainDb<S> {
    store: Arc<S>,
    batch: Option<WriteBatch>,
    writable: bool,
}

impl<S: KeyValueStore> ChainDb<S> {
    pub fn new(store: Arc<S>, writable: bool) -> Self {
        Self {
            store,
            batch: None,
            writable,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    pub fn batch_begin(&mut self) -> Result<(), ChainDbError> {
        if !self.writable {
            return Err(ChainDbError::ReadOnly);
        }
        if self.batch.is_some() {
            return Err(ChainDbError::BatchActive);
        }
        self.batch = Some(WriteBatch::new());
        Ok(())
    }

    /// Apply the active batch atomically. The batch is consumed even when
    /// the commit fails; the caller must not assume any partial effect.
    pub fn batch_commit(&mut self) -> Result<(), ChainDbError> {
        let batch = self.batch.take().ok_or(ChainDbError::NoActiveBatch)?;
        self.store.write_batch(&batch)?;
        Ok(())
    }

    /// Discard the active batch, if any.
    pub fn batch_abort(&mut self) {
        self.batch = None;
    }

    /// Read through the active batch: the most recent pending mutation to
    /// the key wins, otherwise fall through to the store. The scan is
    /// linear in batch size, which stays small in practice.
    fn read_raw(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, ChainDbError> {
        if let Some(batch) = &self.batch {
            for op in batch.iter().rev() {
                match op {
                    WriteOp::Put {
                        column: op_column,
                        key: op_key,
                        value,
                    } => {
                        if *op_column == column && op_key.as_slice() == key {
                            return Ok(Some(value.as_slice().to_vec()));
                        }
                    }
                    WriteOp::Delete {
                        column: op_column,
                        key: op_key,
                    } => {
                        if *op_column == column && op_key.as_slice() == key {
                            return Ok(None);
                        }
                    }
                }
            }
        }
        Ok(self.store.get(column, key)?)
    }

    fn exists_raw(&self, column: Column, key: &[u8]) -> Result<bool, ChainDbError> {
        if self.batch.is_some() {
            return Ok(self.read_raw(column, key)?.is_some());
        }
        Ok(self.store.exists(column, key)?)
    }

    fn write_raw(&mut self, column: Column, key: &[u8], value: Vec<u8>) -> Result<(), ChainDbError> {
        if !self.writable {
            return Err(ChainDbError::ReadOnly);
        }
        match &mut self.batch {
            Some(batch) => {
                batch.put(column, key, value);
                Ok(())
            }
            None => Ok(self.store.put(column, key, &value)?),
        }
    }

    fn erase_raw(&mut self, column: Column, key: &[u8]) -> Result<(), ChainDbError> {
        if !self.writable {
            return Err(ChainDbError::ReadOnly);
        }
        match &mut self.batch {
            Some(batch) => {
                batch.delete(column, key);
                Ok(())
            }
            None => Ok(self.store.delete(column, key)?),
        }
    }

    // Transaction index.

    pub fn read_tx_index(&self, txid: &Hash256) -> Result<Option<TxIndexEntry>, ChainDbError> {
        match self.read_raw(Column::TxIndex, txid)? {
            None => Ok(None),
            Some(bytes) => Ok(Some(decode::<TxIndexEntry>(&bytes)?)),
        }
    }

    pub fn update_tx_index(
        &mut self,
        txid: &Hash256,
        entry: &TxIndexEntry,
    ) -> Result<(), ChainDbError> {
        self.write_raw(Column::TxIndex, txid, encode(entry))
    }

    /// Index a freshly connected transaction with every output unspent.
    /// `height` is accepted for interface compatibility and currently
    /// unused; the entry derives everything from `tx` and `pos`.
    pub fn add_tx_index(
        &mut self,
        tx: &Transaction,
        pos: DiskTxPos,
        _height: i32,
    ) -> Result<(), ChainDbError> {
        let entry = TxIndexEntry::new(pos, tx.vout.len());
        self.write_raw(Column::TxIndex, &tx.txid(), encode(&entry))
    }

    pub fn erase_tx_index(&mut self, tx: &Transaction) -> Result<(), ChainDbError> {
        self.erase_raw(Column::TxIndex, &tx.txid())
    }

    pub fn contains_tx(&self, txid: &Hash256) -> Result<bool, ChainDbError> {
        self.exists_raw(Column::TxIndex, txid)
    }

    /// Fetch a transaction and its index entry, reading the payload back
    /// from the block files.
    pub fn read_disk_tx(
        &self,
        txid: &Hash256,
        reader: &impl BlockReader,
    ) -> Result<Option<(Transaction, TxIndexEntry)>, ChainDbError> {
        let Some(entry) = self.read_tx_index(txid)? else {
            return Ok(None);
        };
        let Some(tx) = reader.read_tx(entry.pos) else {
            return Ok(None);
        };
        Ok(Some((tx, entry)))
    }

    pub fn read_disk_tx_outpoint(
        &self,
        outpoint: &OutPoint,
        reader: &impl BlockReader,
    ) -> Result<Option<(Transaction, TxIndexEntry)>, ChainDbError> {
        self.read_disk_tx(&outpoint.hash, reader)
    }

    // Block index.

    pub fn read_block_index(
        &self,
        hash: &Hash256,
    ) -> Result<Option<DiskBlockIndex>, ChainDbError> {
        match self.read_raw(Column::BlockIndex, hash)? {
            None => Ok(None),
            Some(bytes) => Ok(Some(decode::<DiskBlockIndex>(&bytes)?)),
        }
    }

    pub fn write_block_index(&mut self, entry: &DiskBlockIndex) -> Result<(), ChainDbError> {
        self.write_raw(Column::BlockIndex, &entry.block_hash(), encode(entry))
    }

    pub fn contains_block_index(&self, hash: &Hash256) -> Result<bool, ChainDbError> {
        self.exists_raw(Column::BlockIndex, hash)
    }

    // Singletons.

    pub fn read_best_chain(&self) -> Result<Option<Hash256>, ChainDbError> {
        self.read_meta_hash(META_BEST_CHAIN_KEY)
    }

    pub fn write_best_chain(&mut self, hash: &Hash256) -> Result<(), ChainDbError> {
        self.write_raw(Column::Meta, META_BEST_CHAIN_KEY, hash.to_vec())
    }

    pub fn read_best_invalid_trust(&self) -> Result<Option<U256>, ChainDbError> {
        match self.read_raw(Column::Meta, META_BEST_INVALID_TRUST_KEY)? {
            None => Ok(None),
            Some(bytes) => {
                let raw: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    ChainDbError::Corrupt("invalid bnBestInvalidTrust encoding".to_string())
                })?;
                Ok(Some(U256::from_big_endian(&raw)))
            }
        }
    }

    pub fn write_best_invalid_trust(&mut self, trust: &U256) -> Result<(), ChainDbError> {
        let mut raw = [0u8; 32];
        trust.to_big_endian(&mut raw);
        self.write_raw(Column::Meta, META_BEST_INVALID_TRUST_KEY, raw.to_vec())
    }

    pub fn read_sync_checkpoint(&self) -> Result<Option<Hash256>, ChainDbError> {
        self.read_meta_hash(META_SYNC_CHECKPOINT_KEY)
    }

    pub fn write_sync_checkpoint(&mut self, hash: &Hash256) -> Result<(), ChainDbError> {
        self.write_raw(Column::Meta, META_SYNC_CHECKPOINT_KEY, hash.to_vec())
    }

    pub fn read_checkpoint_pubkey(&self) -> Result<Option<String>, ChainDbError> {
        match self.read_raw(Column::Meta, META_CHECKPOINT_PUBKEY_KEY)? {
            None => Ok(None),
            Some(bytes) => {
                let mut decoder = Decoder::new(&bytes);
                let value = decoder.read_var_str()?;
                if !decoder.is_empty() {
                    return Err(ChainDbError::Corrupt(
                        "invalid strCheckpointPubKey encoding".to_string(),
                    ));
                }
                Ok(Some(value))
            }
        }
    }

    pub fn write_checkpoint_pubkey(&mut self, pubkey: &str) -> Result<(), ChainDbError> {
        let mut encoder = Encoder::new();
        encoder.write_var_str(pubkey);
        self.write_raw(Column::Meta, META_CHECKPOINT_PUBKEY_KEY, encoder.into_inner())
    }

    pub fn read_version(&self) -> Result<Option<i32>, ChainDbError> {
        match self.read_raw(Column::Meta, META_VERSION_KEY)? {
            None => Ok(None),
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    ChainDbError::Corrupt("invalid version encoding".to_string())
                })?;
                Ok(Some(i32::from_le_bytes(raw)))
            }
        }
    }

    pub fn write_version(&mut self, version: i32) -> Result<(), ChainDbError> {
        self.write_raw(Column::Meta, META_VERSION_KEY, version.to_le_bytes().to_vec())
    }

    fn read_meta_hash(&self, key: &[u8]) -> Result<Option<Hash256>, ChainDbError> {
        match self.read_raw(Column::Meta, key)? {
            None => Ok(None),
            Some(bytes) => {
                let hash: Hash256 = bytes.as_slice().try_into().map_err(|_| {
                    ChainDbError::Corrupt("invalid hash encoding in meta entry".to_string())
                })?;
                Ok(Some(hash))
            }
        }
    }
}
