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

//! The external ledger seam.
//!
//! The console reaches the remote authority through [`Ledger`]: an opaque
//! call-and-wait interface. Execute calls block until the ledger accepts
//! or rejects the submission; the confirmation watcher blocks until the
//! referenced operation is finalized (its polling cadence and backoff are
//! its own concern).
//!
//! [`MemoryLedger`] is an in-memory stand-in authority for tests, benches,
//! docs, and the demo binary.

use crate::base::{Address, OperationRef};
use crate::error::SubmissionError;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Finalized outcome reported by the confirmation watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    Confirmed,
    Rejected,
}

/// The external ledger authority.
///
/// Balance storage, the ownership rule, and operation execution all live
/// behind this trait; the console treats them as remote and authoritative.
pub trait Ledger: Send + Sync {
    /// Confirmed base-unit balance of `account`.
    ///
    /// Stale the moment it returns; callers re-invoke to refresh.
    fn balance_of(&self, account: &Address) -> Result<u128, SubmissionError>;

    /// The identity authorized to submit reward operations.
    fn privileged_owner(&self) -> Result<Address, SubmissionError>;

    /// Executes an owner-restricted reward of `base_units` to `target`.
    fn execute_reward(
        &self,
        target: &Address,
        base_units: u128,
    ) -> Result<OperationRef, SubmissionError>;

    /// Executes a transfer of `base_units` from the connected identity to
    /// `target`.
    fn execute_transfer(
        &self,
        target: &Address,
        base_units: u128,
    ) -> Result<OperationRef, SubmissionError>;

    /// Blocks until the referenced operation is finalized.
    fn await_confirmation(&self, reference: &OperationRef) -> Finality;
}

#[derive(Debug, Clone)]
struct PendingOp {
    /// Account debited on confirmation; `None` for mint-style rewards.
    debit: Option<Address>,
    credit: Address,
    base_units: u128,
}

/// In-memory stand-in for the remote ledger authority.
///
/// Accepted operations settle when the watcher confirms them, matching
/// the remote model where execution precedes finalization: transfers
/// debit the connected identity, rewards mint to the target. The next
/// execute outcome and the watcher's verdict are scriptable, so tests can
/// drive every failure path.
///
/// This is tooling, not a ledger implementation: amounts are applied
/// saturating and no ownership rule is enforced here; the controllers in
/// front of it already gate submissions.
pub struct MemoryLedger {
    owner: Address,
    connected: Address,
    balances: DashMap<Address, u128>,
    pending: DashMap<OperationRef, PendingOp>,
    confirmation: Mutex<Finality>,
    fail_next: Mutex<Option<SubmissionError>>,
    next_ref: AtomicU64,
    balance_reads: AtomicU64,
}

impl MemoryLedger {
    /// A ledger with the given privileged owner and connected identity.
    pub fn new(owner: Address, connected: Address) -> Self {
        Self {
            owner,
            connected,
            balances: DashMap::new(),
            pending: DashMap::new(),
            confirmation: Mutex::new(Finality::Confirmed),
            fail_next: Mutex::new(None),
            next_ref: AtomicU64::new(1),
            balance_reads: AtomicU64::new(0),
        }
    }

    /// Seeds a confirmed balance.
    pub fn credit(&self, account: &Address, base_units: u128) {
        let mut balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(base_units);
    }

    /// Makes the next execute call fail with `error`.
    pub fn fail_next_execution(&self, error: SubmissionError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Sets the verdict the watcher reports for subsequent confirmations.
    pub fn finalize_as(&self, outcome: Finality) {
        *self.confirmation.lock() = outcome;
    }

    /// Number of execute calls the ledger has accepted so far.
    pub fn accepted(&self) -> u64 {
        self.next_ref.load(Ordering::SeqCst) - 1
    }

    /// Number of balance reads served so far.
    pub fn balance_reads(&self) -> u64 {
        self.balance_reads.load(Ordering::SeqCst)
    }

    fn execute(&self, op: PendingOp) -> Result<OperationRef, SubmissionError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst);
        let reference = OperationRef(format!("op-{n}"));
        self.pending.insert(reference.clone(), op);
        Ok(reference)
    }
}

impl Ledger for MemoryLedger {
    fn balance_of(&self, account: &Address) -> Result<u128, SubmissionError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.get(account).map_or(0, |balance| *balance))
    }

    fn privileged_owner(&self) -> Result<Address, SubmissionError> {
        Ok(self.owner.clone())
    }

    fn execute_reward(
        &self,
        target: &Address,
        base_units: u128,
    ) -> Result<OperationRef, SubmissionError> {
        self.execute(PendingOp {
            debit: None,
            credit: target.clone(),
            base_units,
        })
    }

    fn execute_transfer(
        &self,
        target: &Address,
        base_units: u128,
    ) -> Result<OperationRef, SubmissionError> {
        self.execute(PendingOp {
            debit: Some(self.connected.clone()),
            credit: target.clone(),
            base_units,
        })
    }

    fn await_confirmation(&self, reference: &OperationRef) -> Finality {
        let outcome = *self.confirmation.lock();
        let Some((_, op)) = self.pending.remove(reference) else {
            // Unknown references never finalize as success.
            return Finality::Rejected;
        };
        if outcome == Finality::Confirmed {
            if let Some(debit) = &op.debit {
                if let Some(mut balance) = self.balances.get_mut(debit) {
                    *balance = balance.saturating_sub(op.base_units);
                }
            }
            let mut balance = self.balances.entry(op.credit.clone()).or_insert(0);
            *balance = balance.saturating_add(op.base_units);
        }
        outcome
    }
}
