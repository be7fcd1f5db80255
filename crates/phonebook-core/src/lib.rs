//! phonebook-core
//!
//! Core building blocks for the phonebook service.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, entry, errors）
//! - **ports**: 抽象化レイヤー（EntryStore）
//! - **typed**: 型付き Message API（Message trait, Handler trait, Request / Response）
//! - **app**: アプリケーション層（AppBuilder, Handlers, Mediator, StorageConfig）
//! - **impls**: 実装（InMemoryEntryStore, SqliteEntryStore）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use app::{App, AppBuilder, Mediator, StorageConfig};
pub use domain::{Entry, EntryFields, EntryId, PhonebookError};
