//! App - アプリケーション層
//!
//! ports と typed を組み合わせて、メッセージの実行経路を組み立てます。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: ストア選択と Handlers / Mediator のワイヤリング
//! - **Handlers**: メッセージごとの handler の対応表
//! - **Mediator**: メッセージを handler に渡す dispatcher
//! - **StorageConfig**: 揮発 / 永続の切り替え

pub mod builder;
pub mod config;
pub mod handlers;
pub mod mediator;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::StorageConfig;
pub use self::handlers::Handlers;
pub use self::mediator::Mediator;
