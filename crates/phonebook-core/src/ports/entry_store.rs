//! EntryStore port - エントリの永続化
//!
//! EntryStore は Entry テーブル（id が主キー、name に大文字小文字を無視する索引）を
//! 抽象化します。
//!
//! # 実装
//! - **InMemoryEntryStore**: 揮発性（開発・テスト用）
//! - **SqliteEntryStore**: 永続（connection string = SQLite のパス）

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Entry, EntryFields, EntryId};

/// 楽観ロック用の version 付きの値
///
/// version は更新のたびに増えます。`update` / `remove` に読み取り時の
/// version を渡し、一致しなければ `StoreError::Conflict` になります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }
}

/// StoreError はストレージ操作のエラー
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 読み取り後に行が変更・削除された（影響行数 0）
    #[error("entry {id} was modified or removed concurrently")]
    Conflict { id: EntryId },

    /// 書き込みを始める前（または実行中の文を中断して）キャンセルされた。何も書かれていない
    #[error("write cancelled before it was applied")]
    Cancelled,

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("blocking task failed: {0}")]
    Join(String),
}

/// EntryStore は Entry の正本
///
/// # 設計原則
/// - 各メソッドは 1 文（または 1 回のロック区間）で完結し、部分的な書き込みを残さない
/// - 「存在しない」は `Ok(None)` で表す（エラーにしない）
/// - 書き込み系は `cancel` を受け取り、`StoreError::Cancelled` を返したときは何も書いていない
///   （書き終えた後のキャンセルは無視して成功を返す）
/// - `Send + Sync` なので `Arc<dyn EntryStore>` として複数タスクから共有できる
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// 新しい id を採番して保存
    async fn insert(
        &self,
        fields: EntryFields,
        cancel: &CancellationToken,
    ) -> Result<Entry, StoreError>;

    async fn get(&self, id: EntryId) -> Result<Option<Versioned<Entry>>, StoreError>;

    /// 大文字小文字を無視して name で検索し、最小の id を返す
    async fn find_by_name(&self, name: &str) -> Result<Option<Entry>, StoreError>;

    /// 全件（id 昇順）
    async fn list(&self) -> Result<Vec<Entry>, StoreError>;

    /// name / phoneNumber を上書き（id は不変）
    async fn update(
        &self,
        id: EntryId,
        fields: &EntryFields,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;

    async fn remove(
        &self,
        id: EntryId,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;
}
