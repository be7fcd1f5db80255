//! Entry - 電話帳の 1 レコード
//!
//! # 構成
//! - **Entry**: 永続化済みのレコード（id 付き）
//! - **EntryFields**: 作成・更新時に呼び出し側が渡す値（id なし）
//!
//! id はストレージが採番するので、呼び出し側が触れるのは
//! name と phoneNumber だけです。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{FieldError, ValidationErrors};
use super::ids::EntryId;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_NUMBER_LEN: usize = 20;

// 先頭の "+"、数字グループ（区切りは空白 / "-" / "." を 1 文字まで、括弧グループ可）、
// 末尾の内線（"x123" / "ext 123" / "ext.123"）
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\+?\s?(?:\(\d+(?:[\s\-.]?\d+)*\)|\d+)(?:[\s\-.]?(?:\(\d+(?:[\s\-.]?\d+)*\)|\d+))*(?:\s?(?i:x|ext\.?)\s?\d+)?$",
    )
    .expect("phone pattern is a valid regex")
});

/// name 検索用のキー。Unicode の小文字化で、どのストアでも同じ規則を使う
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// A persisted phonebook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub phone_number: String,
}

impl Entry {
    pub fn from_fields(id: EntryId, fields: EntryFields) -> Self {
        Self {
            id,
            name: fields.name,
            phone_number: fields.phone_number,
        }
    }
}

/// The caller-supplied part of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub name: String,
    pub phone_number: String,
}

impl EntryFields {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// フィールド単位で検証し、失敗はすべてまとめて返す
    ///
    /// # ルール
    /// - name: 必須（空白のみは不可）、最大 100 文字
    /// - phoneNumber: 必須、最大 20 文字、電話番号形式
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "name is required"));
        } else if self.name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("name must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        if self.phone_number.trim().is_empty() {
            errors.push(FieldError::new("phoneNumber", "phoneNumber is required"));
        } else {
            if self.phone_number.chars().count() > MAX_PHONE_NUMBER_LEN {
                errors.push(FieldError::new(
                    "phoneNumber",
                    format!("phoneNumber must be at most {MAX_PHONE_NUMBER_LEN} characters"),
                ));
            }
            if !is_phone_number(&self.phone_number) {
                errors.push(FieldError::new(
                    "phoneNumber",
                    "phoneNumber is not a valid phone number",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(errors))
        }
    }
}

pub fn is_phone_number(value: &str) -> bool {
    PHONE_PATTERN.is_match(value.trim())
}
