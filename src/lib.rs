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

//! # Token Console
//!
//! Client-side controllers for submitting token operations against an
//! external ledger: an owner-restricted **reward** and a general
//! **transfer**. The crate validates free-text address and amount input,
//! drives each submission through an explicit lifecycle
//! (`Idle → Submitting → AwaitingConfirmation → Succeeded | Failed`), and
//! keeps a shared confirmed-balance view in sync after every confirmed
//! operation.
//!
//! ## Core Components
//!
//! - [`Console`]: the Reward and Transfer controllers wired over one
//!   ledger connection
//! - [`Controller`]: validate → submit → confirm → clear for one
//!   operation kind
//! - [`validate_address`] / [`validate_amount`]: pure field validators
//! - [`Ledger`]: the opaque seam to the remote authority
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use token_console_rs::{Address, Console, LifecycleState, MemoryLedger};
//!
//! let owner = Address::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
//! let ledger = MemoryLedger::new(owner.clone(), owner.clone());
//! ledger.credit(&owner, 100 * 10u128.pow(18)); // 100 tokens
//!
//! let mut console = Console::connect(Arc::new(ledger), owner).unwrap();
//! let target = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
//!
//! console.reward.submit(target, "2.5").unwrap();
//! console.reward.confirm().unwrap();
//! assert_eq!(console.reward.state(), LifecycleState::Succeeded);
//! ```
//!
//! ## Thread Safety
//!
//! Each controller is internally serialized: at most one operation is in
//! flight, and further submits are rejected until it reaches a terminal
//! state. The two controllers may run on separate threads
//! ([`Console::split`]); they share the confirmed balance through an
//! explicit refresh issued after every confirmed operation.

mod balance;
mod base;
mod controller;
pub mod error;
mod ledger;
mod lifecycle;
pub mod units;
mod validate;

pub use balance::SharedBalance;
pub use base::{Address, OperationKind, OperationRef};
pub use controller::{Console, Controller, SubmitPolicy};
pub use error::{
    AmountError, AuthorizationError, ConfirmationError, OperationError, SubmissionError,
    ValidationError,
};
pub use ledger::{Finality, Ledger, MemoryLedger};
pub use lifecycle::{Lifecycle, LifecycleState, OperationRecord};
pub use validate::{ValidatedAmount, Verdict, validate_address, validate_amount};
