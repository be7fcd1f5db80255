//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! handler はこの trait にだけ依存し、SQLite かメモリかは知りません。

pub mod entry_store;

pub use self::entry_store::{EntryStore, StoreError, Versioned};
