//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! ストア → Handlers → Mediator の順に 1 回だけ組み立てます。
//! DI コンテナは使わず、できあがった `App` を呼び出し側が明示的に持ち回ります。

use std::sync::Arc;

use tracing::info;

use super::config::StorageConfig;
use super::handlers::Handlers;
use super::mediator::Mediator;
use crate::impls::{InMemoryEntryStore, SqliteEntryStore};
use crate::ports::{EntryStore, StoreError};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .storage(StorageConfig::sqlite("phonebook.db"))
///     .build()?;
/// let entry = app.mediator.send(CreateEntry { entry }, &cancel).await?;
/// ```
///
/// # Fail-fast 設計
/// - SQLite を開けない・スキーマを作れない場合は build() が失敗する
/// - handler の登録漏れはコンパイル時に検出されるので、ここでは検査しない
pub struct AppBuilder {
    storage: StorageConfig,
    store: Option<Arc<dyn EntryStore>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to open entry store: {0}")]
    Storage(#[from] StoreError),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            storage: StorageConfig::default(),
            store: None,
        }
    }

    /// 設定からストアを選ぶ
    pub fn storage(mut self, config: StorageConfig) -> Self {
        self.storage = config;
        self
    }

    /// 組み立て済みのストアを直接渡す（設定より優先）
    pub fn store(mut self, store: Arc<dyn EntryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let store: Arc<dyn EntryStore> = match self.store {
            Some(store) => {
                info!("using caller-supplied entry store");
                store
            }
            None if self.storage.use_in_memory_database => {
                info!("using in-memory entry store");
                Arc::new(InMemoryEntryStore::new())
            }
            None => {
                let store = SqliteEntryStore::open(&self.storage.connection_string)?;
                info!(path = %self.storage.connection_string, "using sqlite entry store");
                Arc::new(store)
            }
        };

        Ok(App {
            mediator: Mediator::new(Handlers::new(store)),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App はアプリケーションのランタイム
#[derive(Clone)]
pub struct App {
    pub mediator: Mediator,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryFields;
    use crate::typed::{CreateEntry, GetAllEntries};
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn build_default_is_in_memory() {
        let app = AppBuilder::new().build().unwrap();
        let all = app
            .mediator
            .send(GetAllEntries, &CancellationToken::new())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn build_sqlite_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.db");
        let config = StorageConfig::sqlite(path.to_str().unwrap());
        let cancel = CancellationToken::new();

        let app = AppBuilder::new().storage(config.clone()).build().unwrap();
        app.mediator
            .send(CreateEntry { entry: EntryFields::new("A", "1") }, &cancel)
            .await
            .unwrap();

        let reopened = AppBuilder::new().storage(config).build().unwrap();
        let all = reopened.mediator.send(GetAllEntries, &cancel).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn build_fails_when_database_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing-dir").join("book.db");
        let result = AppBuilder::new()
            .storage(StorageConfig::sqlite(bad.to_str().unwrap()))
            .build();
        assert!(matches!(result, Err(BuildError::Storage(_))));
    }

    #[tokio::test]
    async fn explicit_store_wins_over_config() {
        let store: Arc<dyn EntryStore> = Arc::new(InMemoryEntryStore::new());
        store
            .insert(EntryFields::new("Seeded", "1"), &CancellationToken::new())
            .await
            .unwrap();

        let app = AppBuilder::new()
            .storage(StorageConfig::sqlite("/nonexistent/dir/book.db"))
            .store(store)
            .build()
            .unwrap();
        let all = app
            .mediator
            .send(GetAllEntries, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(all[0].name, "Seeded");
    }
}
