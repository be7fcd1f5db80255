//! Handlers - メッセージごとの handler と、その対応表
//!
//! 各 handler はストレージを 1 回だけ呼びます（update / delete の競合時の
//! 再確認を除く）。`Handlers` は 6 種類の handler を 1 つずつ持つ構造体で、
//! `Handler<M>` を各メッセージについて実装します。対応が欠けていれば
//! `Mediator::send` の呼び出し側がコンパイルエラーになります。
//!
//! 読み取りはキャンセルと競わせて即座に打ち切ります。書き込みはトークンを
//! ストアに渡し、中断するかどうかをストアに任せます（`Cancelled` を返したら
//! 書き込まれていない）。

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{Entry, EntryFields, EntryId, PhonebookError};
use crate::ports::{EntryStore, StoreError};
use crate::typed::{
    CreateEntry, DeleteEntry, GetAllEntries, GetEntryById, GetEntryByName, Handler, UpdateEntry,
};

/// 読み取りとキャンセルを競わせる（副作用のない呼び出し専用）
async fn cancellable<T, F>(cancel: &CancellationToken, op: F) -> Result<T, PhonebookError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PhonebookError::Cancelled),
        result = op => Ok(result?),
    }
}

enum Mutation<'a> {
    Update(&'a EntryFields),
    Remove,
}

impl Mutation<'_> {
    async fn apply(
        &self,
        store: &dyn EntryStore,
        id: EntryId,
        version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        match self {
            Self::Update(fields) => store.update(id, fields, version, cancel).await,
            Self::Remove => store.remove(id, version, cancel).await,
        }
    }
}

/// 存在確認してから version 付きで書き込む
///
/// # 競合時
/// 1. もう一度 `get` で存在確認
/// 2. 消えていれば `false`
/// 3. 残っていれば新しい version で 1 回だけ再試行（再度の Conflict はそのまま返す）
async fn mutate_existing(
    store: &dyn EntryStore,
    id: EntryId,
    mutation: Mutation<'_>,
    cancel: &CancellationToken,
) -> Result<bool, PhonebookError> {
    let Some(current) = cancellable(cancel, store.get(id)).await? else {
        return Ok(false);
    };

    match mutation.apply(store, id, current.version, cancel).await {
        Err(StoreError::Conflict { .. }) => {}
        other => return other.map(|()| true).map_err(PhonebookError::from),
    }

    warn!(%id, "write conflicted, re-checking entry");
    let Some(fresh) = cancellable(cancel, store.get(id)).await? else {
        return Ok(false);
    };
    mutation.apply(store, id, fresh.version, cancel).await?;
    Ok(true)
}

pub struct CreateEntryHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<CreateEntry> for CreateEntryHandler {
    async fn handle(
        &self,
        message: CreateEntry,
        cancel: &CancellationToken,
    ) -> Result<Entry, PhonebookError> {
        let entry = self.store.insert(message.entry, cancel).await?;
        info!(id = %entry.id, "entry created");
        Ok(entry)
    }
}

pub struct UpdateEntryHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<UpdateEntry> for UpdateEntryHandler {
    async fn handle(
        &self,
        message: UpdateEntry,
        cancel: &CancellationToken,
    ) -> Result<bool, PhonebookError> {
        let UpdateEntry { id, entry } = message;
        let updated =
            mutate_existing(self.store.as_ref(), id, Mutation::Update(&entry), cancel).await?;
        if updated {
            info!(%id, "entry updated");
        }
        Ok(updated)
    }
}

pub struct DeleteEntryHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<DeleteEntry> for DeleteEntryHandler {
    async fn handle(
        &self,
        message: DeleteEntry,
        cancel: &CancellationToken,
    ) -> Result<bool, PhonebookError> {
        let id = message.id;
        let deleted = mutate_existing(self.store.as_ref(), id, Mutation::Remove, cancel).await?;
        if deleted {
            info!(%id, "entry deleted");
        }
        Ok(deleted)
    }
}

pub struct GetAllEntriesHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<GetAllEntries> for GetAllEntriesHandler {
    async fn handle(
        &self,
        _message: GetAllEntries,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>, PhonebookError> {
        cancellable(cancel, self.store.list()).await
    }
}

pub struct GetEntryByIdHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<GetEntryById> for GetEntryByIdHandler {
    async fn handle(
        &self,
        message: GetEntryById,
        cancel: &CancellationToken,
    ) -> Result<Option<Entry>, PhonebookError> {
        let row = cancellable(cancel, self.store.get(message.id)).await?;
        Ok(row.map(|r| r.value))
    }
}

pub struct GetEntryByNameHandler {
    store: Arc<dyn EntryStore>,
}

#[async_trait]
impl Handler<GetEntryByName> for GetEntryByNameHandler {
    async fn handle(
        &self,
        message: GetEntryByName,
        cancel: &CancellationToken,
    ) -> Result<Option<Entry>, PhonebookError> {
        cancellable(cancel, self.store.find_by_name(&message.name)).await
    }
}

/// Handlers はメッセージ種別ごとに handler を 1 つずつ持つ対応表
///
/// 起動時に 1 回だけ組み立て、`Mediator` が `Arc` で共有します。
pub struct Handlers {
    create_entry: CreateEntryHandler,
    update_entry: UpdateEntryHandler,
    delete_entry: DeleteEntryHandler,
    get_all_entries: GetAllEntriesHandler,
    get_entry_by_id: GetEntryByIdHandler,
    get_entry_by_name: GetEntryByNameHandler,
}

impl Handlers {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            create_entry: CreateEntryHandler { store: store.clone() },
            update_entry: UpdateEntryHandler { store: store.clone() },
            delete_entry: DeleteEntryHandler { store: store.clone() },
            get_all_entries: GetAllEntriesHandler { store: store.clone() },
            get_entry_by_id: GetEntryByIdHandler { store: store.clone() },
            get_entry_by_name: GetEntryByNameHandler { store },
        }
    }
}

#[async_trait]
impl Handler<CreateEntry> for Handlers {
    async fn handle(
        &self,
        message: CreateEntry,
        cancel: &CancellationToken,
    ) -> Result<Entry, PhonebookError> {
        self.create_entry.handle(message, cancel).await
    }
}

#[async_trait]
impl Handler<UpdateEntry> for Handlers {
    async fn handle(
        &self,
        message: UpdateEntry,
        cancel: &CancellationToken,
    ) -> Result<bool, PhonebookError> {
        self.update_entry.handle(message, cancel).await
    }
}

#[async_trait]
impl Handler<DeleteEntry> for Handlers {
    async fn handle(
        &self,
        message: DeleteEntry,
        cancel: &CancellationToken,
    ) -> Result<bool, PhonebookError> {
        self.delete_entry.handle(message, cancel).await
    }
}

#[async_trait]
impl Handler<GetAllEntries> for Handlers {
    async fn handle(
        &self,
        message: GetAllEntries,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>, PhonebookError> {
        self.get_all_entries.handle(message, cancel).await
    }
}

#[async_trait]
impl Handler<GetEntryById> for Handlers {
    async fn handle(
        &self,
        message: GetEntryById,
        cancel: &CancellationToken,
    ) -> Result<Option<Entry>, PhonebookError> {
        self.get_entry_by_id.handle(message, cancel).await
    }
}

#[async_trait]
impl Handler<GetEntryByName> for Handlers {
    async fn handle(
        &self,
        message: GetEntryByName,
        cancel: &CancellationToken,
    ) -> Result<Option<Entry>, PhonebookError> {
        self.get_entry_by_name.handle(message, cancel).await
    }
}
