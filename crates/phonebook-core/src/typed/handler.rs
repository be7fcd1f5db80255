//! Handler trait - Message を実行する Handler の定義

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::message::Message;
use crate::domain::PhonebookError;

/// Handler は Message を実行して結果を返す
///
/// # 使用例
/// ```ignore
/// struct GetAllEntriesHandler { store: Arc<dyn EntryStore> }
///
/// #[async_trait]
/// impl Handler<GetAllEntries> for GetAllEntriesHandler {
///     async fn handle(&self, _msg: GetAllEntries, cancel: &CancellationToken)
///         -> Result<Vec<Entry>, PhonebookError>
///     {
///         Ok(self.store.list().await?)
///     }
/// }
/// ```
///
/// # ジェネリクスによる型安全性
/// - `Handler<GetEntryById>` は `GetEntryById` しか受け取れない
/// - 戻り値は `M::Response` に固定される
/// - `cancel` が発火したら `PhonebookError::Cancelled` を返す。書き込みの場合、
///   `Cancelled` は何も保存されていないことを意味する
#[async_trait]
pub trait Handler<M: Message>: Send + Sync {
    async fn handle(
        &self,
        message: M,
        cancel: &CancellationToken,
    ) -> Result<M::Response, PhonebookError>;
}
