//! Typed - 型付き Message API
//!
//! メッセージと handler の対応をコンパイル時に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Message` trait, `Handler<M>` trait - 型安全
//! - **列挙（Closed）**: `Request` / `Response` - 実行時に種別を選ぶ呼び出し側向け

pub mod handler;
pub mod message;
pub mod request;

// 主要な trait/型 を再エクスポート
pub use self::handler::Handler;
pub use self::message::{
    CreateEntry, DeleteEntry, GetAllEntries, GetEntryById, GetEntryByName, Message, UpdateEntry,
};
pub use self::request::{Request, Response};
