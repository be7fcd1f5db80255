//! SqliteEntryStore - 永続エントリストア
//!
//! # 実装詳細
//! - 1 本の `rusqlite::Connection` を `Arc<Mutex<_>>` で共有
//! - rusqlite は同期 API なので、各呼び出しを `spawn_blocking` で実行
//! - version 列で楽観ロック（`WHERE id = ? AND version = ?` が 0 行なら Conflict）
//! - name 検索は `name_key` 列（Rust 側で小文字化した name）で行う。
//!   SQLite の NOCASE は ASCII しか畳まないため
//! - 書き込みは実行中の文を progress handler で中断できる。中断された文はロールバックされる

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tokio_util::sync::CancellationToken;

use crate::domain::{Entry, EntryFields, EntryId, name_key};
use crate::ports::{EntryStore, StoreError, Versioned};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_entries_name_key ON entries (name_key);
";

// progress handler を呼ぶ間隔（VM 命令数）
const PROGRESS_OPS: i32 = 16;

/// SqliteEntryStore は SQLite ファイル（または `:memory:`）に保存するストア
pub struct SqliteEntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntryStore {
    /// Opens (or creates) the database at `connection_string` and ensures the schema.
    pub fn open(connection_string: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(connection_string)
            .map_err(|e| backend("failed to open entry store", e))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| backend("failed to open in-memory entry store", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| backend("failed to init entry schema", e))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 接続をロックして `op` をブロッキングプールで実行
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Backend(format!("connection lock poisoned: {e}")))?;
            op(&conn)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// 書き込み用の `run`
    ///
    /// 接続を取った時点でキャンセル済みなら何もしない。文の実行中にキャンセルされたら
    /// progress handler が中断させ、`StoreError::Cancelled` になる。文が最後まで
    /// 走った場合は、その後でキャンセルされていても結果をそのまま返す。
    async fn write<T, F>(&self, cancel: &CancellationToken, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let token = AssertUnwindSafe(cancel.clone());
        self.run(move |conn| {
            if token.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            conn.progress_handler(PROGRESS_OPS, Some(move || token.is_cancelled()));
            let result = op(conn);
            conn.progress_handler(0, None::<fn() -> bool>);
            result
        })
        .await
    }
}

fn backend(context: &str, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::OperationInterrupted => {
            StoreError::Cancelled
        }
        err => StoreError::Backend(format!("{context}: {err}")),
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<Versioned<Entry>> {
    let version: i64 = row.get(3)?;
    Ok(Versioned::new(
        Entry {
            id: EntryId::new(row.get(0)?),
            name: row.get(1)?,
            phone_number: row.get(2)?,
        },
        version as u64,
    ))
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn insert(
        &self,
        fields: EntryFields,
        cancel: &CancellationToken,
    ) -> Result<Entry, StoreError> {
        self.write(cancel, move |conn| {
            conn.execute(
                "INSERT INTO entries (name, name_key, phone_number) VALUES (?1, ?2, ?3)",
                params![fields.name, name_key(&fields.name), fields.phone_number],
            )
            .map_err(|e| backend("failed to insert entry", e))?;
            let id = EntryId::new(conn.last_insert_rowid());
            Ok(Entry::from_fields(id, fields))
        })
        .await
    }

    async fn get(&self, id: EntryId) -> Result<Option<Versioned<Entry>>, StoreError> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, name, phone_number, version FROM entries WHERE id = ?1",
                params![id.get()],
                read_row,
            )
            .optional()
            .map_err(|e| backend("failed to load entry", e))
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Entry>, StoreError> {
        let key = name_key(name);
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, name, phone_number, version FROM entries
                 WHERE name_key = ?1 ORDER BY id LIMIT 1",
                params![key],
                read_row,
            )
            .optional()
            .map(|row| row.map(|r| r.value))
            .map_err(|e| backend("failed to find entry by name", e))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Entry>, StoreError> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, phone_number, version FROM entries ORDER BY id")
                .map_err(|e| backend("failed to prepare entry listing", e))?;
            let rows = stmt
                .query_map([], read_row)
                .map_err(|e| backend("failed to list entries", e))?;
            rows.map(|row| row.map(|r| r.value))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| backend("failed to read entry row", e))
        })
        .await
    }

    async fn update(
        &self,
        id: EntryId,
        fields: &EntryFields,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let fields = fields.clone();
        self.write(cancel, move |conn| {
            let affected = conn
                .execute(
                    "UPDATE entries
                     SET name = ?1, name_key = ?2, phone_number = ?3, version = version + 1
                     WHERE id = ?4 AND version = ?5",
                    params![
                        fields.name,
                        name_key(&fields.name),
                        fields.phone_number,
                        id.get(),
                        expected_version as i64
                    ],
                )
                .map_err(|e| backend("failed to update entry", e))?;
            if affected == 0 {
                return Err(StoreError::Conflict { id });
            }
            Ok(())
        })
        .await
    }

    async fn remove(
        &self,
        id: EntryId,
        expected_version: u64,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.write(cancel, move |conn| {
            let affected = conn
                .execute(
                    "DELETE FROM entries WHERE id = ?1 AND version = ?2",
                    params![id.get(), expected_version as i64],
                )
                .map_err(|e| backend("failed to delete entry", e))?;
            if affected == 0 {
                return Err(StoreError::Conflict { id });
            }
            Ok(())
        })
        .await
    }
}
