use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{Column, KeyValueStore, PrefixVisitor, StoreError, WriteBatch, WriteOp};

type ColumnMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory store used by tests: one ordered map per column.
#[derive(Default)]
pub struct MemoryStore {
    columns: [RwLock<ColumnMap>; Column::ALL.len()],
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn column(&self, column: Column) -> &RwLock<ColumnMap> {
        &self.columns[column.index()]
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self.column(column).read().expect("memory store lock");
        Ok(guard.get(key).cloned())
    }

    fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.column(column).write().expect("memory store lock");
        guard.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, column: Column, key: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.column(column).write().expect("memory store lock");
        guard.remove(key);
        Ok(())
    }

    fn for_each_prefix<'a>(
        &self,
        column: Column,
        prefix: &[u8],
        visitor: &mut PrefixVisitor<'a>,
    ) -> Result<(), StoreError> {
        let guard = self.column(column).read().expect("memory store lock");
        for (key, value) in guard.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if !visitor(key.as_slice(), value.as_slice())? {
                break;
            }
        }
        Ok(())
    }

    fn write_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        // Hold every column lock for the whole batch so readers never see
        // a partially applied commit.
        let mut guards: Vec<_> = self
            .columns
            .iter()
            .map(|column| column.write().expect("memory store lock"))
            .collect();
        for op in batch.iter() {
            match op {
                WriteOp::Put { column, key, value } => {
                    guards[column.index()]
                        .insert(key.as_slice().to_vec(), value.as_slice().to_vec());
                }
                WriteOp::Delete { column, key } => {
                    guards[column.index()].remove(key.as_slice());
                }
            }
        }
        Ok(())
    }
}
