//! circulation-core
//!
//! Circulation lifecycle for library-style records: items move between
//! `on_shelf`, `on_loan`, `in_transit` and `lost`, and every move is checked
//! against the current status before anything is written.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, state, record, config, errors）
//! - **ports**: 抽象化レイヤー（RecordStore, Clock, IdGenerator）
//! - **transition**: guard / preserve の合成可能な wrapper
//! - **entity**: Item / Location と return policy
//! - **app**: CirculationService と builder
//! - **impls**: 実装（InMemoryRecordStore など開発用）

pub mod app;
pub mod domain;
pub mod entity;
pub mod impls;
pub mod ports;
pub mod transition;

pub use crate::app::{BuildError, CirculationBuilder, CirculationService};
pub use crate::domain::{
    Circulation, CirculationConfig, CirculationError, CirculationStatus, LifecycleAction,
    Record, RecordId, ReturnCheck,
};
pub use crate::entity::{BorrowRequest, Item, Location};
