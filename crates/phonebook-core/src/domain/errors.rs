//! Errors - エラー型と分類
//!
//! # 分類
//! - **ValidationErrors**: 入力不正。dispatch 前に transport が検出する
//! - **PhonebookError**: handler 実行中の失敗（ストレージ障害・解消しない競合・キャンセル）
//!
//! 「見つからない」はエラーではなく、`None` / `false` として返します。

use serde::Serialize;

use crate::ports::StoreError;

/// One failed field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field failure found while validating one input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// PhonebookError は handler の実行エラー
///
/// どれも 1 リクエストに閉じた失敗で、プロセス全体には波及しません。
#[derive(Debug, thiserror::Error)]
pub enum PhonebookError {
    #[error("storage: {0}")]
    Storage(StoreError),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<StoreError> for PhonebookError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Storage(other),
        }
    }
}
