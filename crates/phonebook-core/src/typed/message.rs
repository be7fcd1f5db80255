//! Message trait - 操作と結果型の対応付け
//!
//! メッセージは「何をしたいか」を表す不変の値で、
//! 結果型を関連型 `Response` として静的に宣言します。

use serde::{Deserialize, Serialize};

use crate::domain::{Entry, EntryFields, EntryId};

/// Message は操作と結果型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Debug, Clone)]
/// struct GetEntryById { id: EntryId }
///
/// impl Message for GetEntryById {
///     type Response = Option<Entry>;
///     const NAME: &'static str = "phonebook.entry.get_by_id";
/// }
/// ```
///
/// # Trait Bounds
/// - `Send + Sync + 'static`: handler を複数タスクから共有するため
pub trait Message: Send + Sync + 'static {
    type Response: Send + 'static;

    /// ログ用の名前（`{namespace}.{entity}.{action}`）
    const NAME: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntry {
    pub entry: EntryFields,
}

impl Message for CreateEntry {
    type Response = Entry;
    const NAME: &'static str = "phonebook.entry.create";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub id: EntryId,
    pub entry: EntryFields,
}

impl Message for UpdateEntry {
    /// `false` は対象が存在しなかったことを表す
    type Response = bool;
    const NAME: &'static str = "phonebook.entry.update";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEntry {
    pub id: EntryId,
}

impl Message for DeleteEntry {
    type Response = bool;
    const NAME: &'static str = "phonebook.entry.delete";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllEntries;

impl Message for GetAllEntries {
    type Response = Vec<Entry>;
    const NAME: &'static str = "phonebook.entry.get_all";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEntryById {
    pub id: EntryId,
}

impl Message for GetEntryById {
    type Response = Option<Entry>;
    const NAME: &'static str = "phonebook.entry.get_by_id";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEntryByName {
    pub name: String,
}

impl Message for GetEntryByName {
    type Response = Option<Entry>;
    const NAME: &'static str = "phonebook.entry.get_by_name";
}
