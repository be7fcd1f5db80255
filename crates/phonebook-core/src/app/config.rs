//! StorageConfig - ストレージ選択の設定
//!
//! 永続化の設定はこの 2 項目だけです。
//! - `use_in_memory_database`: true ならメモリ（揮発性）
//! - `connection_string`: 永続ストア（SQLite）のパス

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub use_in_memory_database: bool,
    pub connection_string: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            use_in_memory_database: true,
            connection_string: "phonebook.db".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn sqlite(connection_string: impl Into<String>) -> Self {
        Self {
            use_in_memory_database: false,
            connection_string: connection_string.into(),
        }
    }
}
