//! App - アプリケーション層
//!
//! このモジュールは、entities と ports を組み合わせてサービスを提供します。
//!
//! # 主要コンポーネント
//! - **CirculationBuilder**: サービスの構築とワイヤリング
//! - **CirculationService**: create / borrow / return / transfer などの入口
//! - **KeyedLocks**: record id ごとの書き込み直列化

pub mod builder;
pub mod locks;
pub mod service;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, CirculationBuilder};
pub use self::locks::KeyedLocks;
pub use self::service::CirculationService;
