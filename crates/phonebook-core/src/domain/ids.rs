//! Domain identifiers (strongly-typed IDs).
//!
//! Entry の ID はストレージ側が採番する整数です。
//! 呼び出し側が ID を作ることはなく、`EntryStore::insert` の戻り値か
//! HTTP パスのパース結果としてのみ現れます。
//!
//! `i64` をそのまま使わずに newtype にしているのは、
//! version（楽観ロック用カウンタ）や件数と混同しないためです。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an Entry.
///
/// # 不変条件
/// - ストレージが採番した ID は常に `> 0`
/// - 一度採番された ID は変わらない
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
