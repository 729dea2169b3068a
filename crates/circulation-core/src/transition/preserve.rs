//! Field preservation: keep chosen fields intact across an operation.
//!
//! # フロー
//! 1. target から field を snapshot（存在しない field は無視）
//! 2. operation を実行（失敗したらそのまま返す。書き戻しはしない）
//! 3. destination（result または target）へ snapshot を無条件に書き戻す
//!
//! The destination is a type parameter so that `onto_result` only compiles
//! for operations whose output is itself an [`Entity`].

use std::marker::PhantomData;

use super::{Entity, Operation};
use crate::domain::{CIRCULATION_FIELD, CirculationError, Record};

/// The set of fields to protect.
///
/// Defaults to `{circulation}`: the status sub-record must survive operations
/// that are not transition-aware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreserveFields {
    fields: Vec<String>,
}

impl Default for PreserveFields {
    fn default() -> Self {
        Self {
            fields: vec![CIRCULATION_FIELD.to_string()],
        }
    }
}

impl PreserveFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Reinject into the operation's returned entity.
    pub fn onto_result<Op>(self, op: Op) -> Preserved<Op, OntoResult> {
        Preserved::new(self, op)
    }

    /// Reinject into the entity the operation ran on.
    pub fn onto_target<Op>(self, op: Op) -> Preserved<Op, OntoTarget> {
        Preserved::new(self, op)
    }
}

/// Picks which record receives the snapshot.
pub trait Destination<T, O> {
    fn select<'a>(target: &'a mut T, output: &'a mut O) -> &'a mut Record;
}

/// Destination marker: the operation's output.
#[derive(Debug)]
pub enum OntoResult {}

/// Destination marker: the operation's target.
#[derive(Debug)]
pub enum OntoTarget {}

impl<T, O: Entity> Destination<T, O> for OntoResult {
    fn select<'a>(_target: &'a mut T, output: &'a mut O) -> &'a mut Record {
        output.record_mut()
    }
}

impl<T: Entity, O> Destination<T, O> for OntoTarget {
    fn select<'a>(target: &'a mut T, _output: &'a mut O) -> &'a mut Record {
        target.record_mut()
    }
}

/// An operation whose protected fields are written back after it succeeds.
#[derive(Debug)]
pub struct Preserved<Op, D> {
    fields: PreserveFields,
    op: Op,
    _destination: PhantomData<D>,
}

impl<Op, D> Preserved<Op, D> {
    fn new(fields: PreserveFields, op: Op) -> Self {
        Self {
            fields,
            op,
            _destination: PhantomData,
        }
    }

    pub fn fields(&self) -> &PreserveFields {
        &self.fields
    }
}

impl<T, Op, D> Operation<T> for Preserved<Op, D>
where
    T: Entity,
    Op: Operation<T>,
    D: Destination<T, Op::Output>,
{
    type Output = Op::Output;

    fn call(self, target: &mut T) -> Result<Self::Output, CirculationError> {
        let snapshot = target
            .record()
            .snapshot(self.fields.fields.iter().map(String::as_str));

        let mut output = self.op.call(target)?;

        D::select(target, &mut output).restore(&snapshot);
        Ok(output)
    }
}
