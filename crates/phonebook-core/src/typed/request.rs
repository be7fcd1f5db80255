//! Request / Response - 閉じた列挙型によるメッセージの型消去
//!
//! 型付きの `Mediator::send` を使えない呼び出し側（メッセージ種別を
//! 実行時に決める場合）向けの入口です。
//! variant の追加漏れは `Mediator::dispatch` の網羅的な match でコンパイルエラーになります。

use super::message::{
    CreateEntry, DeleteEntry, GetAllEntries, GetEntryById, GetEntryByName, Message, UpdateEntry,
};
use crate::domain::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateEntry(CreateEntry),
    UpdateEntry(UpdateEntry),
    DeleteEntry(DeleteEntry),
    GetAllEntries(GetAllEntries),
    GetEntryById(GetEntryById),
    GetEntryByName(GetEntryByName),
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateEntry(_) => CreateEntry::NAME,
            Self::UpdateEntry(_) => UpdateEntry::NAME,
            Self::DeleteEntry(_) => DeleteEntry::NAME,
            Self::GetAllEntries(_) => GetAllEntries::NAME,
            Self::GetEntryById(_) => GetEntryById::NAME,
            Self::GetEntryByName(_) => GetEntryByName::NAME,
        }
    }
}

impl From<CreateEntry> for Request {
    fn from(m: CreateEntry) -> Self {
        Self::CreateEntry(m)
    }
}

impl From<UpdateEntry> for Request {
    fn from(m: UpdateEntry) -> Self {
        Self::UpdateEntry(m)
    }
}

impl From<DeleteEntry> for Request {
    fn from(m: DeleteEntry) -> Self {
        Self::DeleteEntry(m)
    }
}

impl From<GetAllEntries> for Request {
    fn from(m: GetAllEntries) -> Self {
        Self::GetAllEntries(m)
    }
}

impl From<GetEntryById> for Request {
    fn from(m: GetEntryById) -> Self {
        Self::GetEntryById(m)
    }
}

impl From<GetEntryByName> for Request {
    fn from(m: GetEntryByName) -> Self {
        Self::GetEntryByName(m)
    }
}

/// Result of dispatching a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Created(Entry),
    Updated(bool),
    Deleted(bool),
    Entries(Vec<Entry>),
    /// by id / by name の検索結果
    Found(Option<Entry>),
}
