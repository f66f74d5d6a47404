// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Operation lifecycle tracking.
//!
//! One operation at a time moves through a fixed state machine:
//!
//! - `Idle` → `Submitting` (via submit)
//! - `Submitting` → `AwaitingConfirmation` (ledger accepted, reference held)
//! - `Submitting` → `Failed` (ledger call errored)
//! - `AwaitingConfirmation` → `Succeeded` or `Failed` (watcher finalized)
//! - `Succeeded` | `Failed` → `Idle` (via clear)
//!
//! No transition skips a state; in particular `Submitting` never jumps
//! straight to `Succeeded`. Terminal records stay inspectable until
//! cleared.

use crate::base::{Address, OperationKind, OperationRef};
use crate::error::OperationError;
use crate::validate::ValidatedAmount;
use serde::Serialize;
use std::fmt;

/// Externally observable lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Submitting,
    AwaitingConfirmation,
    Succeeded,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// A single in-flight or completed operation.
///
/// Created when a submit passes validation; destroyed when the record is
/// cleared or a new operation begins.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    kind: OperationKind,
    target: Address,
    amount: ValidatedAmount,
    state: LifecycleState,
    reference: Option<OperationRef>,
    error: Option<OperationError>,
}

impl OperationRecord {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn amount(&self) -> ValidatedAmount {
        self.amount
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The ledger's handle for this operation, once it was accepted.
    pub fn reference(&self) -> Option<&OperationRef> {
        self.reference.as_ref()
    }

    /// What went wrong, for a `Failed` record.
    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }
}

/// Drives one operation record through its states.
#[derive(Debug, Default)]
pub struct Lifecycle {
    record: Option<OperationRecord>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { record: None }
    }

    /// Current stage; `Idle` when no record exists.
    pub fn state(&self) -> LifecycleState {
        self.record
            .as_ref()
            .map_or(LifecycleState::Idle, |record| record.state)
    }

    /// True exactly while `Submitting` or `AwaitingConfirmation`.
    ///
    /// While busy the input fields and the submit action are locked, and
    /// the in-flight operation cannot be cancelled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state(),
            LifecycleState::Submitting | LifecycleState::AwaitingConfirmation
        )
    }

    pub fn record(&self) -> Option<&OperationRecord> {
        self.record.as_ref()
    }

    /// Starts a new record in `Submitting`.
    ///
    /// A terminal record is discarded here, since starting a new
    /// operation dismisses the previous outcome. A busy lifecycle rejects the
    /// submit with no side effects.
    pub(crate) fn begin(
        &mut self,
        kind: OperationKind,
        target: Address,
        amount: ValidatedAmount,
    ) -> Result<(), OperationError> {
        if self.is_busy() {
            return Err(OperationError::InFlight);
        }
        self.record = Some(OperationRecord {
            kind,
            target,
            amount,
            state: LifecycleState::Submitting,
            reference: None,
            error: None,
        });
        Ok(())
    }

    /// The ledger accepted the submission: hold the reference and wait.
    pub(crate) fn submitted(&mut self, reference: OperationRef) {
        let Some(record) = self.record.as_mut() else {
            debug_assert!(false, "submitted() without a record");
            return;
        };
        debug_assert_eq!(record.state, LifecycleState::Submitting);
        record.reference = Some(reference);
        record.state = LifecycleState::AwaitingConfirmation;
    }

    /// The watcher reported finalized success.
    pub(crate) fn finalized_ok(&mut self) {
        let Some(record) = self.record.as_mut() else {
            debug_assert!(false, "finalized_ok() without a record");
            return;
        };
        debug_assert_eq!(record.state, LifecycleState::AwaitingConfirmation);
        record.state = LifecycleState::Succeeded;
    }

    /// The submission errored, or the watcher reported finalized failure.
    ///
    /// Always lands in `Failed` with the error captured; the lifecycle
    /// never sticks in `Submitting`.
    pub(crate) fn failed(&mut self, error: OperationError) {
        let Some(record) = self.record.as_mut() else {
            debug_assert!(false, "failed() without a record");
            return;
        };
        debug_assert!(record.state == LifecycleState::Submitting
            || record.state == LifecycleState::AwaitingConfirmation);
        record.error = Some(error);
        record.state = LifecycleState::Failed;
    }

    /// Clears a terminal record, returning to `Idle` with empty fields.
    ///
    /// Idempotent from `Idle`; a no-op returning `false` while busy, since
    /// an in-flight operation cannot be cancelled.
    pub fn clear(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.record = None;
        true
    }

    /// Reference of the record awaiting confirmation, if any.
    pub(crate) fn pending_reference(&self) -> Option<OperationRef> {
        self.record
            .as_ref()
            .filter(|record| record.state == LifecycleState::AwaitingConfirmation)
            .and_then(|record| record.reference.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfirmationError, SubmissionError};
    use crate::validate::ValidatedAmount;
    use rust_decimal_macros::dec;

    fn target() -> Address {
        Address::parse("0xde709f2102306220921060314715629080e2fb77").unwrap()
    }

    fn amount() -> ValidatedAmount {
        ValidatedAmount::parse("1.5", dec!(10)).unwrap()
    }

    #[test]
    fn starts_idle_and_not_busy() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert!(!lifecycle.is_busy());
        assert!(lifecycle.record().is_none());
    }

    #[test]
    fn begin_moves_to_submitting() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Submitting);
        assert!(lifecycle.is_busy());

        let record = lifecycle.record().unwrap();
        assert_eq!(record.kind(), OperationKind::Transfer);
        assert_eq!(record.target(), &target());
        assert!(record.reference().is_none());
        assert!(record.error().is_none());
    }

    #[test]
    fn begin_while_busy_is_rejected() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();

        let result = lifecycle.begin(OperationKind::Transfer, target(), amount());
        assert_eq!(result, Err(OperationError::InFlight));
        assert_eq!(lifecycle.state(), LifecycleState::Submitting);
    }

    #[test]
    fn submitted_holds_reference_and_awaits() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Reward, target(), amount())
            .unwrap();
        lifecycle.submitted(OperationRef("op-1".into()));

        assert_eq!(lifecycle.state(), LifecycleState::AwaitingConfirmation);
        assert!(lifecycle.is_busy());
        assert_eq!(
            lifecycle.record().unwrap().reference(),
            Some(&OperationRef("op-1".into()))
        );
        assert_eq!(
            lifecycle.pending_reference(),
            Some(OperationRef("op-1".into()))
        );
    }

    #[test]
    fn finalized_ok_succeeds_and_unlocks() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Reward, target(), amount())
            .unwrap();
        lifecycle.submitted(OperationRef("op-1".into()));
        lifecycle.finalized_ok();

        assert_eq!(lifecycle.state(), LifecycleState::Succeeded);
        assert!(!lifecycle.is_busy());
        assert!(lifecycle.pending_reference().is_none());
    }

    #[test]
    fn failed_from_submitting_keeps_the_error() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();
        lifecycle.failed(SubmissionError::UserCancelled.into());

        assert_eq!(lifecycle.state(), LifecycleState::Failed);
        assert!(!lifecycle.is_busy());
        let record = lifecycle.record().unwrap();
        assert_eq!(
            record.error(),
            Some(&OperationError::Submission(SubmissionError::UserCancelled))
        );
        // The ledger never accepted it, so there is no reference.
        assert!(record.reference().is_none());
    }

    #[test]
    fn failed_from_awaiting_keeps_the_reference() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();
        lifecycle.submitted(OperationRef("op-9".into()));
        lifecycle.failed(ConfirmationError::RemoteFinalizedFailure.into());

        let record = lifecycle.record().unwrap();
        assert_eq!(record.state(), LifecycleState::Failed);
        assert_eq!(record.reference(), Some(&OperationRef("op-9".into())));
    }

    #[test]
    fn clear_returns_terminal_states_to_idle() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Reward, target(), amount())
            .unwrap();
        lifecycle.submitted(OperationRef("op-1".into()));
        lifecycle.finalized_ok();

        assert!(lifecycle.clear());
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert!(lifecycle.record().is_none());

        // Idempotent from Idle.
        assert!(lifecycle.clear());
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[test]
    fn clear_is_a_noop_while_busy() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();

        assert!(!lifecycle.clear());
        assert_eq!(lifecycle.state(), LifecycleState::Submitting);

        lifecycle.submitted(OperationRef("op-1".into()));
        assert!(!lifecycle.clear());
        assert_eq!(lifecycle.state(), LifecycleState::AwaitingConfirmation);
    }

    #[test]
    fn begin_replaces_a_terminal_record() {
        let mut lifecycle = Lifecycle::new();
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();
        lifecycle.failed(SubmissionError::NetworkUnavailable.into());

        // Starting a new operation dismisses the failed record.
        lifecycle
            .begin(OperationKind::Transfer, target(), amount())
            .unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Submitting);
        assert!(lifecycle.record().unwrap().error().is_none());
    }

    #[test]
    fn state_names_for_display() {
        assert_eq!(LifecycleState::AwaitingConfirmation.to_string(), "awaiting_confirmation");
        assert_eq!(LifecycleState::Idle.to_string(), "idle");
    }
}
