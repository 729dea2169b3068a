//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。
//! The circulation core talks to storage, time and id assignment only through
//! these traits, so tests can swap in deterministic implementations.

pub mod clock;
pub mod id_generator;
pub mod record_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::record_store::{RecordStore, StoreError};
