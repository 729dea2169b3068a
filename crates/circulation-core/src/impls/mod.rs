//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryRecordStore**: 開発用の record store
//!
//! 本番用の store adapter は別クレートに配置します。

pub mod inmem_store;

pub use self::inmem_store::InMemoryRecordStore;
