//! Transition guard: run an operation only from a required status.

use super::{Entity, Operation};
use crate::domain::{CirculationError, CirculationStatus};

/// Precondition on an entity's current circulation status.
///
/// The guard itself never writes; it reads the status and either rejects or
/// hands the target to the wrapped operation.
///
/// `Default` requires `OnShelf`. That is a placeholder, every call site in
/// this crate names the status it needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionGuard {
    required: CirculationStatus,
}

impl TransitionGuard {
    pub fn requiring(required: CirculationStatus) -> Self {
        Self { required }
    }

    pub fn required(&self) -> CirculationStatus {
        self.required
    }

    /// Check `target` without running anything.
    pub fn check<T: Entity>(&self, target: &T) -> Result<(), CirculationError> {
        let Some(current) = target.circulation_status() else {
            return Err(CirculationError::MissingStatus {
                entity: target.entity_id().clone(),
            });
        };

        if current != self.required {
            return Err(CirculationError::InvalidTransition {
                entity: target.entity_id().clone(),
                current,
                required: self.required,
            });
        }
        Ok(())
    }

    pub fn wrap<Op>(self, op: Op) -> Guarded<Op> {
        Guarded { guard: self, op }
    }
}

/// Shorthand for `TransitionGuard::requiring(required).wrap(op)`.
pub fn guard<Op>(required: CirculationStatus, op: Op) -> Guarded<Op> {
    TransitionGuard::requiring(required).wrap(op)
}

/// An operation behind a [`TransitionGuard`].
#[derive(Debug, Clone)]
pub struct Guarded<Op> {
    guard: TransitionGuard,
    op: Op,
}

impl<Op> Guarded<Op> {
    pub fn guard(&self) -> TransitionGuard {
        self.guard
    }
}

impl<T, Op> Operation<T> for Guarded<Op>
where
    T: Entity,
    Op: Operation<T>,
{
    type Output = Op::Output;

    fn call(self, target: &mut T) -> Result<Self::Output, CirculationError> {
        self.guard.check(target)?;
        self.op.call(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, RecordId};
    use rstest::rstest;
    use serde_json::json;
    use std::cell::Cell;

    fn record_with(status: CirculationStatus) -> Record {
        let data = json!({ "title": "Dune", "circulation": { "status": status } });
        let serde_json::Value::Object(data) = data else {
            unreachable!()
        };
        Record::from_data(RecordId::from("item-1"), data).unwrap()
    }

    #[rstest]
    #[case::on_loan(CirculationStatus::OnLoan)]
    #[case::in_transit(CirculationStatus::InTransit)]
    #[case::lost(CirculationStatus::Lost)]
    fn rejects_other_statuses_without_running(#[case] current: CirculationStatus) {
        let mut record = record_with(current);
        let before = record.clone();
        let calls = Cell::new(0);

        let op = guard(CirculationStatus::OnShelf, |r: &mut Record| -> Result<(), CirculationError> {
            calls.set(calls.get() + 1);
            r.set_circulation(None);
            Ok(())
        });
        let err = op.call(&mut record).unwrap_err();

        assert_eq!(calls.get(), 0);
        assert_eq!(record, before);
        assert!(matches!(
            err,
            CirculationError::InvalidTransition { entity, current: c, required: CirculationStatus::OnShelf }
                if entity.as_str() == "item-1" && c == current
        ));
    }

    #[rstest]
    #[case::on_shelf(CirculationStatus::OnShelf)]
    #[case::on_loan(CirculationStatus::OnLoan)]
    #[case::lost(CirculationStatus::Lost)]
    fn runs_exactly_once_and_passes_result_through(#[case] status: CirculationStatus) {
        let mut record = record_with(status);
        let calls = Cell::new(0);

        let op = guard(status, |r: &mut Record| -> Result<String, CirculationError> {
            calls.set(calls.get() + 1);
            Ok(r.id().to_string())
        });
        let out = op.call(&mut record).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(out, "item-1");
    }

    #[test]
    fn missing_circulation_is_reported() {
        let mut record = Record::new(RecordId::from("item-2"));

        let op = guard(CirculationStatus::OnShelf, |_: &mut Record| -> Result<(), CirculationError> {
            Ok(())
        });
        let err = op.call(&mut record).unwrap_err();

        assert!(matches!(err, CirculationError::MissingStatus { entity } if entity.as_str() == "item-2"));
    }

    #[test]
    fn wrapped_errors_propagate_unchanged() {
        let mut record = record_with(CirculationStatus::OnShelf);

        let err = guard(CirculationStatus::OnShelf, |_: &mut Record| -> Result<(), _> {
            Err(CirculationError::InvalidRecord("boom".into()))
        })
        .call(&mut record)
        .unwrap_err();

        assert!(matches!(err, CirculationError::InvalidRecord(msg) if msg == "boom"));
    }

    #[test]
    fn default_guard_is_a_placeholder_for_on_shelf() {
        assert_eq!(TransitionGuard::default().required(), CirculationStatus::OnShelf);
        assert_eq!(
            TransitionGuard::requiring(CirculationStatus::Lost).required(),
            CirculationStatus::Lost
        );
    }
}
