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

//! Operation controllers and their composition.
//!
//! A [`Controller`] gates one operation kind behind the field validators
//! and an injected authorization policy, drives the lifecycle through the
//! ledger's execute and confirmation calls, and refreshes the shared
//! balance after every confirmed operation. The Reward and Transfer
//! controllers are the same type configured differently: one code path,
//! not two.
//!
//! [`Console`] wires the pair over a single ledger connection.

use crate::balance::SharedBalance;
use crate::base::{Address, OperationKind, OperationRef};
use crate::error::{AuthorizationError, ConfirmationError, OperationError, ValidationError};
use crate::ledger::{Finality, Ledger};
use crate::lifecycle::{Lifecycle, LifecycleState, OperationRecord};
use crate::validate::{self, ValidatedAmount, Verdict};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Submit-precondition injected into a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPolicy {
    /// Any connected identity may submit.
    Open,
    /// Only the privileged owner may submit.
    OwnerOnly,
}

/// A controller for one operation kind.
///
/// Internally serialized: it owns at most one live [`OperationRecord`],
/// and a new submit is rejected while one is in flight.
pub struct Controller {
    kind: OperationKind,
    policy: SubmitPolicy,
    identity: Address,
    owner: Address,
    balance: SharedBalance,
    ledger: Arc<dyn Ledger>,
    lifecycle: Lifecycle,
}

impl Controller {
    /// A controller over an already-established connection.
    ///
    /// `owner` is the privileged identity as fetched at connect time;
    /// [`Console::connect`] is the usual way to build the pair.
    pub fn new(
        kind: OperationKind,
        policy: SubmitPolicy,
        identity: Address,
        owner: Address,
        balance: SharedBalance,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            kind,
            policy,
            identity,
            owner,
            balance,
            ledger,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Live verdict for the target-address field.
    pub fn address_verdict(&self, input: &str) -> Verdict {
        validate::validate_address(input)
    }

    /// Live verdict for the amount field against the confirmed balance.
    pub fn amount_verdict(&self, input: &str) -> Verdict {
        validate::validate_amount(input, self.balance.display())
    }

    /// Whether the submit action is enabled for these inputs: both fields
    /// present and valid, nothing in flight, and the policy precondition
    /// met.
    pub fn can_submit(&self, address_input: &str, amount_input: &str) -> bool {
        self.address_verdict(address_input) == Verdict::Valid
            && self.amount_verdict(amount_input) == Verdict::Valid
            && !self.lifecycle.is_busy()
            && self.authorize().is_ok()
    }

    fn authorize(&self) -> Result<(), AuthorizationError> {
        match self.policy {
            SubmitPolicy::Open => Ok(()),
            SubmitPolicy::OwnerOnly if self.identity == self.owner => Ok(()),
            SubmitPolicy::OwnerOnly => Err(AuthorizationError::NotPrivileged),
        }
    }

    /// Validates the inputs and submits the operation to the ledger.
    ///
    /// Validation and authorization failures reject before any ledger
    /// call, leaving no record behind. Once the ledger accepts, the
    /// returned reference is held and the record awaits confirmation; a
    /// rejected call fails the record immediately. `Submitting` never
    /// jumps to `Succeeded` and never sticks.
    pub fn submit(
        &mut self,
        address_input: &str,
        amount_input: &str,
    ) -> Result<OperationRef, OperationError> {
        if self.lifecycle.is_busy() {
            return Err(OperationError::InFlight);
        }
        let target = match validate::validate_address(address_input) {
            Verdict::Empty => return Err(ValidationError::EmptyField.into()),
            Verdict::Invalid(error) => return Err(error.into()),
            Verdict::Valid => Address::parse(address_input)?,
        };
        let amount = ValidatedAmount::parse(amount_input, self.balance.display())
            .map_err(OperationError::from)?;
        self.authorize()?;

        self.lifecycle.begin(self.kind, target.clone(), amount)?;
        let executed = match self.kind {
            OperationKind::Reward => self.ledger.execute_reward(&target, amount.base_units()),
            OperationKind::Transfer => self.ledger.execute_transfer(&target, amount.base_units()),
        };
        match executed {
            Ok(reference) => {
                self.lifecycle.submitted(reference.clone());
                Ok(reference)
            }
            Err(error) => {
                let error = OperationError::from(error);
                self.lifecycle.failed(error.clone());
                Err(error)
            }
        }
    }

    /// Blocks on the confirmation watcher for the pending operation.
    ///
    /// On finalized success the record completes and the shared balance is
    /// refreshed, exactly once; on finalized failure the record fails and
    /// the balance is left alone. Rejected with `NothingPending` when no
    /// operation is awaiting confirmation.
    pub fn confirm(&mut self) -> Result<(), OperationError> {
        let Some(reference) = self.lifecycle.pending_reference() else {
            return Err(OperationError::NothingPending);
        };
        match self.ledger.await_confirmation(&reference) {
            Finality::Confirmed => {
                self.lifecycle.finalized_ok();
                self.balance.refresh(self.ledger.as_ref(), &self.identity)
            }
            Finality::Rejected => {
                let error = OperationError::from(ConfirmationError::RemoteFinalizedFailure);
                self.lifecycle.failed(error.clone());
                Err(error)
            }
        }
    }

    /// Dismisses a terminal record, presenting a fresh form.
    ///
    /// A no-op returning `false` while an operation is in flight.
    pub fn clear(&mut self) -> bool {
        self.lifecycle.clear()
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// True exactly while `Submitting` or `AwaitingConfirmation`; inputs
    /// and the submit action are treated as locked meanwhile.
    pub fn is_busy(&self) -> bool {
        self.lifecycle.is_busy()
    }

    /// The live or terminal record, if one exists.
    pub fn record(&self) -> Option<&OperationRecord> {
        self.lifecycle.record()
    }

    /// Confirmed balance in display units, as both controllers see it.
    pub fn balance(&self) -> Decimal {
        self.balance.display()
    }
}

/// The two-controller composition: one connected identity, one privileged
/// owner, one shared confirmed balance, one ledger connection.
pub struct Console {
    identity: Address,
    owner: Address,
    balance: SharedBalance,
    ledger: Arc<dyn Ledger>,
    /// Owner-restricted reward controller.
    pub reward: Controller,
    /// Open transfer controller.
    pub transfer: Controller,
}

impl Console {
    /// Connects the console: fetches the privileged owner and the initial
    /// confirmed balance, then wires the Reward (owner-only) and Transfer
    /// (open) controllers over the same ledger handle and balance cell.
    pub fn connect(ledger: Arc<dyn Ledger>, identity: Address) -> Result<Self, OperationError> {
        let owner = ledger.privileged_owner()?;
        let balance = SharedBalance::zero();
        balance.refresh(ledger.as_ref(), &identity)?;

        let reward = Controller::new(
            OperationKind::Reward,
            SubmitPolicy::OwnerOnly,
            identity.clone(),
            owner.clone(),
            balance.clone(),
            Arc::clone(&ledger),
        );
        let transfer = Controller::new(
            OperationKind::Transfer,
            SubmitPolicy::Open,
            identity.clone(),
            owner.clone(),
            balance.clone(),
            Arc::clone(&ledger),
        );

        Ok(Self {
            identity,
            owner,
            balance,
            ledger,
            reward,
            transfer,
        })
    }

    /// Whether the connected identity is the privileged owner.
    pub fn is_owner(&self) -> bool {
        self.identity == self.owner
    }

    pub fn identity(&self) -> &Address {
        &self.identity
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Confirmed balance in display units.
    pub fn balance(&self) -> Decimal {
        self.balance.display()
    }

    /// Re-fetches the confirmed balance on demand.
    pub fn refresh_balance(&self) -> Result<(), OperationError> {
        self.balance.refresh(self.ledger.as_ref(), &self.identity)
    }

    /// Splits into the (reward, transfer) controllers, e.g. to run each on
    /// its own thread. They keep sharing the balance cell and ledger.
    pub fn split(self) -> (Controller, Controller) {
        (self.reward, self.transfer)
    }
}
