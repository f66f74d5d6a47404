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

//! Error types for console operations.
//!
//! Validation and authorization errors resolve locally: they block the
//! submit action and surface as field-level messages. Submission and
//! confirmation errors drive the lifecycle to `Failed` and stay on the
//! record for display. Nothing is retried automatically.

use thiserror::Error;

/// Reasons an amount input is rejected.
///
/// The display strings are the user-facing field messages.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// Input is not a plain decimal number.
    #[error("Invalid amount!")]
    NotNumeric,

    /// Amount is zero or negative.
    #[error("Invalid amount!")]
    Negative,

    /// Amount is positive but finer than one base unit.
    #[error("Amount must be at least 1 base unit!")]
    BelowMinimum,

    /// Amount exceeds the confirmed balance.
    #[error("Amount exceeds your token balance!")]
    ExceedsBalance,
}

/// Field-level validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("Field is required!")]
    EmptyField,

    /// Input does not match the ledger's address syntax.
    #[error("Invalid wallet address!")]
    InvalidAddress,

    /// Amount input rejected for the contained reason.
    #[error("{0}")]
    InvalidAmount(#[from] AmountError),
}

/// Authorization failures checked before submission.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The connected identity is not the privileged owner.
    #[error("only the privileged owner may submit rewards")]
    NotPrivileged,
}

/// Failures raised by a remote ledger call before a reference is returned.
///
/// Read calls share these failure modes: any remote call can lose the
/// network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The remote authority rejected the operation outright.
    #[error("rejected by the ledger: {0}")]
    RemoteRejected(String),

    /// The user cancelled signing.
    #[error("signing cancelled by user")]
    UserCancelled,

    /// The ledger could not be reached.
    #[error("ledger unreachable")]
    NetworkUnavailable,
}

/// Failures reported by the confirmation watcher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationError {
    /// The ledger finalized the operation as failed.
    #[error("operation finalized as failed")]
    RemoteFinalizedFailure,
}

/// Everything a controller can reject or record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    /// A submit arrived while an operation was already in flight.
    #[error("an operation is already in flight")]
    InFlight,

    /// Confirmation was driven with nothing awaiting it.
    #[error("no operation is awaiting confirmation")]
    NothingPending,

    /// The ledger reported a balance outside the displayable range.
    #[error("balance exceeds the displayable range")]
    BalanceOutOfRange,
}
