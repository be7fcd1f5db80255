//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryEntryStore**: 揮発性ストア（`use_in_memory_database = true`）
//! - **SqliteEntryStore**: 永続ストア（connection string = SQLite のパス）

pub mod inmem_store;
pub mod sqlite_store;

pub use self::inmem_store::InMemoryEntryStore;
pub use self::sqlite_store::SqliteEntryStore;
