//! InMemoryEntryStore - 揮発性のエントリストア
//!
//! # 実装詳細
//! - `BTreeMap<EntryId, Versioned<Entry>>` が本体（id 昇順で列挙できる）
//! - `BTreeMap<String, BTreeSet<EntryId>>` が name の索引（キーは小文字化した name）
//! - tokio の `RwLock` で排他制御（読み取りは並行、書き込みは 1 本）
//! - 書き込みは write ロックを取った時点でキャンセルを確認し、その後は await しない

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;

use crate::domain::{Entry, EntryFields, EntryId, name_key};
use crate::ports::{EntryStore, StoreError, Versioned};

#[derive(Default)]
struct Tables {
    rows: BTreeMap<EntryId, Versioned<Entry>>,
    by_name: BTreeMap<String, BTreeSet<EntryId>>,
    last_id: i64,
}

impl Tables {
    fn index(&mut self, name: &str, id: EntryId) {
        self.by_name.entry(name_key(name)).or_default().insert(id);
    }

    fn unindex(&mut self, name: &str, id: EntryId) {
        let key = name_key(name);
        if let Some(ids) = self.by_name.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_name.remove(&key);
            }
        }
    }

    /// id と version が一致する行を返す。一致しなければ Conflict
    fn checked_row(
        &mut self,
        id: EntryId,
        expected_version: u64,
    ) -> Result<&mut Versioned<Entry>, StoreError> {
        match self.rows.get_mut(&id) {
            Some(row) if row.version == expected_version => Ok(row),
            _ => Err(StoreError::Conflict { id }),
        }
    }
}

/// InMemoryEntryStore は開発・テスト用のストア
///
/// id は 1 から採番し、削除された id は再利用しません。
#[derive(Default)]
pub struct InMemoryEntryStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// write ロックを待つ。待っている間、または取れた時点でキャンセル済みなら Cancelled
    async fn write_unless_cancelled(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        let tables = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            tables = self.tables.write() => tables,
        };
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(tables)
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn insert(
        &self,
        fields: EntryFields,
        cancel: &CancellationToken,
    ) -> Result<Entry, StoreError> {
        let mut tables = self.write_unless_cancelled(cancel).await?;
        tables.last_id += 1;
        let id = EntryId::new(tables.last_id);
        let entry = Entry::from_fields(id, fields);
        tables.index(&entry.name, id);
        tables.rows.insert(id, Versioned::new(entry.clone(), 0));
        Ok(entry)
    }

    async fn get(&self, id: EntryId) -> Result<Option<Versioned<Entry>>, StoreError> {
        Ok(self.tables.read().await.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Entry>, StoreError> {
        let tables = self.tables.read().await;
        let found = tables
            .by_name
            .get(&name_key(name))
            .and_then(|ids| ids.first())
            .and_then(|id| tables.rows.get(id))
            .map(|row| row.value.clone());
        Ok(found)
    }

    async fn list(&self) -> Result<Vec<Entry>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.rows.values().map(|row| row.value.clone()).collect())
    }

    async fn update(
        &self,
        id: EntryId,
        fields: &EntryFields,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let mut tables = self.write_unless_cancelled(cancel).await?;
        let row = tables.checked_row(id, expected_version)?;
        let old_name = std::mem::replace(&mut row.value.name, fields.name.clone());
        row.value.phone_number = fields.phone_number.clone();
        row.version += 1;

        tables.unindex(&old_name, id);
        tables.index(&fields.name, id);
        Ok(())
    }

    async fn remove(
        &self,
        id: EntryId,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let mut tables = self.write_unless_cancelled(cancel).await?;
        tables.checked_row(id, expected_version)?;
        if let Some(row) = tables.rows.remove(&id) {
            tables.unindex(&row.value.name, id);
        }
        Ok(())
    }
}
