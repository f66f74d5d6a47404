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

//! Field validation for address and amount inputs.
//!
//! The validators are pure: they judge a free-text string (plus, for
//! amounts, the caller-supplied confirmed balance) and return a per-field
//! [`Verdict`]. Inputs are never corrected, only annotated; the caller is
//! responsible for keeping the supplied balance fresh.

use crate::base::Address;
use crate::error::{AmountError, ValidationError};
use crate::units::{self, UnitsError};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Per-field validation verdict.
///
/// `Empty` is not an error: an empty field blocks submission through the
/// required-field rule, not through an invalid verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Empty,
    Valid,
    Invalid(ValidationError),
}

impl Verdict {
    /// True when the field carries a validation failure.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid(_))
    }

    /// The failure behind an `Invalid` verdict, if any.
    pub fn error(&self) -> Option<ValidationError> {
        match self {
            Verdict::Invalid(error) => Some(*error),
            _ => None,
        }
    }
}

/// Judges a free-text account address.
///
/// Empty input is `Empty`; anything non-empty that fails the ledger's
/// address syntax is `Invalid`. Pure; no network or balance access.
pub fn validate_address(input: &str) -> Verdict {
    if input.is_empty() {
        return Verdict::Empty;
    }
    match Address::parse(input) {
        Ok(_) => Verdict::Valid,
        Err(error) => Verdict::Invalid(error),
    }
}

/// Judges a free-text amount against the confirmed balance.
///
/// First match wins:
/// 1. empty input
/// 2. not a plain decimal number
/// 3. zero or negative
/// 4. positive but finer than one base unit
/// 5. more than the available balance
///
/// Comparisons run on decimal values, so the 10⁻¹⁸ and balance boundaries
/// are exact.
pub fn validate_amount(input: &str, available: Decimal) -> Verdict {
    if input.is_empty() {
        return Verdict::Empty;
    }
    let Ok(value) = Decimal::from_str(input.trim()) else {
        return Verdict::Invalid(AmountError::NotNumeric.into());
    };
    if value <= Decimal::ZERO {
        return Verdict::Invalid(AmountError::Negative.into());
    }
    if value < units::one_base_unit() {
        return Verdict::Invalid(AmountError::BelowMinimum.into());
    }
    if value > available {
        return Verdict::Invalid(AmountError::ExceedsBalance.into());
    }
    Verdict::Valid
}

/// An amount accepted for submission: the display value as validated plus
/// its exact base-unit scaling.
///
/// Derived from the raw input string only at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAmount {
    display: Decimal,
    base_units: u128,
}

impl ValidatedAmount {
    /// Derives a submit-ready amount from raw input, enforcing the full
    /// verdict precedence and then converting exactly to base units.
    ///
    /// A fraction finer than one base unit rejects as below-minimum; an
    /// amount whose base-unit value overflows the ledger's integer range
    /// rejects as exceeding the balance (it necessarily exceeds anything
    /// the ledger can report).
    pub fn parse(input: &str, available: Decimal) -> Result<Self, ValidationError> {
        let display = match validate_amount(input, available) {
            Verdict::Empty => return Err(ValidationError::EmptyField),
            Verdict::Invalid(error) => return Err(error),
            // A Valid verdict means the input already parsed cleanly.
            Verdict::Valid => Decimal::from_str(input.trim())
                .map_err(|_| ValidationError::InvalidAmount(AmountError::NotNumeric))?,
        };
        let base_units = units::to_base_units(display).map_err(|error| match error {
            UnitsError::Negative => AmountError::Negative,
            UnitsError::SubUnitFraction => AmountError::BelowMinimum,
            UnitsError::Overflow => AmountError::ExceedsBalance,
        })?;
        Ok(Self {
            display,
            base_units,
        })
    }

    /// The amount in display units, exactly as typed.
    pub fn display(&self) -> Decimal {
        self.display
    }

    /// The amount scaled to the ledger's smallest unit.
    pub fn base_units(&self) -> u128 {
        self.base_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // === Address Verdicts ===

    #[test]
    fn empty_address_is_empty_not_invalid() {
        assert_eq!(validate_address(""), Verdict::Empty);
    }

    #[test]
    fn whitespace_only_address_is_invalid() {
        // A non-empty field that fails the syntax check is a hard error.
        assert_eq!(
            validate_address("   "),
            Verdict::Invalid(ValidationError::InvalidAddress)
        );
    }

    #[test]
    fn well_formed_address_is_valid() {
        assert_eq!(
            validate_address("0xde709f2102306220921060314715629080e2fb77"),
            Verdict::Valid
        );
    }

    #[test]
    fn malformed_address_message() {
        let verdict = validate_address("0x1234");
        assert_eq!(verdict.error().unwrap().to_string(), "Invalid wallet address!");
    }

    // === Amount Verdicts ===

    #[test]
    fn empty_amount_is_empty() {
        assert_eq!(validate_amount("", dec!(10)), Verdict::Empty);
    }

    #[test]
    fn non_numeric_amount_is_invalid() {
        for input in ["abc", "1,5", "1e5", "0x10", "--1"] {
            let verdict = validate_amount(input, dec!(10));
            assert_eq!(
                verdict,
                Verdict::Invalid(AmountError::NotNumeric.into()),
                "input {input:?}"
            );
            assert_eq!(verdict.error().unwrap().to_string(), "Invalid amount!");
        }
    }

    #[test]
    fn zero_and_negative_amounts_are_invalid() {
        for input in ["0", "0.0", "-1", "-0.5"] {
            assert_eq!(
                validate_amount(input, dec!(10)),
                Verdict::Invalid(AmountError::Negative.into()),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn below_one_base_unit_is_invalid() {
        let verdict = validate_amount("0.0000000000000000005", dec!(10));
        assert_eq!(verdict, Verdict::Invalid(AmountError::BelowMinimum.into()));
        assert_eq!(
            verdict.error().unwrap().to_string(),
            "Amount must be at least 1 base unit!"
        );
    }

    #[test]
    fn exactly_one_base_unit_is_valid() {
        assert_eq!(validate_amount("0.000000000000000001", dec!(10)), Verdict::Valid);
    }

    #[test]
    fn amount_over_balance_is_invalid() {
        let verdict = validate_amount("10.5", dec!(10));
        assert_eq!(verdict, Verdict::Invalid(AmountError::ExceedsBalance.into()));
        assert_eq!(
            verdict.error().unwrap().to_string(),
            "Amount exceeds your token balance!"
        );
    }

    #[test]
    fn balance_boundary_equality_is_valid() {
        // Scenario A: an amount equal to the balance passes.
        assert_eq!(validate_amount("5.0", dec!(5.0)), Verdict::Valid);
    }

    #[test]
    fn one_base_unit_over_balance_is_invalid() {
        // Scenario B: a single base unit over the balance is caught.
        assert_eq!(
            validate_amount("5.000000000000000001", dec!(5.0)),
            Verdict::Invalid(AmountError::ExceedsBalance.into())
        );
    }

    #[test]
    fn negative_takes_precedence_over_balance_rules() {
        // A negative amount with a zero balance reports Negative, not
        // ExceedsBalance.
        assert_eq!(
            validate_amount("-5", Decimal::ZERO),
            Verdict::Invalid(AmountError::Negative.into())
        );
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(validate_amount(" 5 ", dec!(10)), Verdict::Valid);
    }

    // === ValidatedAmount ===

    #[test]
    fn parse_scales_to_base_units() {
        let amount = ValidatedAmount::parse("2.5", dec!(10)).unwrap();
        assert_eq!(amount.display(), dec!(2.5));
        assert_eq!(amount.base_units(), 2_500_000_000_000_000_000);
    }

    #[test]
    fn parse_rejects_empty_as_required() {
        assert_eq!(
            ValidatedAmount::parse("", dec!(10)),
            Err(ValidationError::EmptyField)
        );
    }

    #[test]
    fn parse_rejects_sub_unit_fraction_as_below_minimum() {
        // 19 fractional digits on an otherwise affordable amount.
        assert_eq!(
            ValidatedAmount::parse("1.0000000000000000005", dec!(10)),
            Err(ValidationError::InvalidAmount(AmountError::BelowMinimum))
        );
    }

    #[test]
    fn parse_rejects_base_unit_overflow_as_exceeds_balance() {
        // Affordable against an absurd balance, but past the ledger's
        // integer range once scaled.
        assert_eq!(
            ValidatedAmount::parse("100000000000000000000000", Decimal::MAX),
            Err(ValidationError::InvalidAmount(AmountError::ExceedsBalance))
        );
    }

    #[test]
    fn parse_mirrors_the_verdict_precedence() {
        assert_eq!(
            ValidatedAmount::parse("-1", dec!(10)),
            Err(ValidationError::InvalidAmount(AmountError::Negative))
        );
        assert_eq!(
            ValidatedAmount::parse("11", dec!(10)),
            Err(ValidationError::InvalidAmount(AmountError::ExceedsBalance))
        );
    }
}
