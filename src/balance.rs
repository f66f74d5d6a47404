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

//! Shared confirmed-balance cell.
//!
//! Both controllers read the same confirmed balance, and it changes only
//! through [`SharedBalance::refresh`]: an explicit fetch from the ledger,
//! issued on connect and again after every confirmed operation. Between
//! refreshes the value may be stale; it is authoritative only immediately
//! after a fetch.

use crate::base::Address;
use crate::error::OperationError;
use crate::ledger::Ledger;
use crate::units;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct BalanceData {
    base_units: u128,
    display: Decimal,
}

/// Confirmed balance as last reported by the ledger.
///
/// Cheap to clone; every clone observes the same cell.
#[derive(Debug, Clone)]
pub struct SharedBalance {
    inner: Arc<Mutex<BalanceData>>,
}

impl SharedBalance {
    /// A zero balance, shown until the first fetch lands.
    pub fn zero() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BalanceData {
                base_units: 0,
                display: Decimal::ZERO,
            })),
        }
    }

    /// The balance in display units.
    pub fn display(&self) -> Decimal {
        self.inner.lock().display
    }

    /// The balance in base units, as the ledger reported it.
    pub fn base_units(&self) -> u128 {
        self.inner.lock().base_units
    }

    /// Fetches the confirmed balance of `account` and replaces the cell.
    pub fn refresh(&self, ledger: &dyn Ledger, account: &Address) -> Result<(), OperationError> {
        let base_units = ledger.balance_of(account)?;
        let display =
            units::to_display(base_units).map_err(|_| OperationError::BalanceOutOfRange)?;
        *self.inner.lock() = BalanceData {
            base_units,
            display,
        };
        Ok(())
    }
}

impl Default for SharedBalance {
    fn default() -> Self {
        Self::zero()
    }
}
