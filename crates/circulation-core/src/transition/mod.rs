//! Transition - 状態遷移を守るラッパー
//!
//! Lifecycle steps are values implementing [`Operation`]. The wrappers in this
//! module take an operation and return another one, so they compose:
//!
//! ```ignore
//! let op = guard(CirculationStatus::OnShelf, |item: &mut Item| lend(item));
//! let op = PreserveFields::default().onto_result(op);
//! let lent = op.call(&mut item)?;
//! ```
//!
//! # 二つのラッパー
//! - **guard**: 現在の status が required と一致するときだけ実行
//! - **preserve**: 指定 field を実行前に snapshot し、実行後に書き戻す

pub mod guard;
pub mod preserve;

pub use self::guard::{Guarded, TransitionGuard, guard};
pub use self::preserve::{Destination, OntoResult, OntoTarget, PreserveFields, Preserved};

use crate::domain::{CirculationError, CirculationStatus, Record, RecordId};

/// A step run against a target entity.
///
/// Any `FnOnce(&mut T) -> Result<R, CirculationError>` is an operation, so
/// plain closures can be wrapped directly. Annotate the closure argument
/// (`|item: &mut Item|`) so the compiler picks the right target type.
pub trait Operation<T> {
    type Output;

    fn call(self, target: &mut T) -> Result<Self::Output, CirculationError>;
}

impl<T, R, F> Operation<T> for F
where
    F: FnOnce(&mut T) -> Result<R, CirculationError>,
{
    type Output = R;

    fn call(self, target: &mut T) -> Result<R, CirculationError> {
        self(target)
    }
}

/// Anything backed by a stored record.
pub trait Entity {
    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn entity_id(&self) -> &RecordId {
        self.record().id()
    }

    fn circulation_status(&self) -> Option<CirculationStatus> {
        self.record().status()
    }
}

impl Entity for Record {
    fn record(&self) -> &Record {
        self
    }

    fn record_mut(&mut self) -> &mut Record {
        self
    }
}
