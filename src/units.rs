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

//! Base-unit scale of the ledger's token.
//!
//! The ledger accounts in integer base units; humans type display units.
//! One base unit is 10⁻¹⁸ display units. Conversions here are exact in
//! both directions: a value that cannot be represented fails, it is never
//! rounded.

use rust_decimal::Decimal;
use thiserror::Error;

/// Fractional digits between display units and base units.
pub const DECIMALS: u32 = 18;

/// Exact-conversion failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitsError {
    /// The value is negative.
    #[error("value is negative")]
    Negative,

    /// The value carries a fraction finer than one base unit.
    #[error("value is not a whole number of base units")]
    SubUnitFraction,

    /// The value does not fit the representable range.
    #[error("value does not fit the representable range")]
    Overflow,
}

/// One base unit expressed in display units (10⁻¹⁸).
pub fn one_base_unit() -> Decimal {
    Decimal::new(1, DECIMALS)
}

/// Converts a display-unit amount to base units.
pub fn to_base_units(display: Decimal) -> Result<u128, UnitsError> {
    let mantissa = display.mantissa();
    if mantissa < 0 {
        return Err(UnitsError::Negative);
    }
    let mantissa = mantissa as u128;
    let scale = display.scale();

    if scale <= DECIMALS {
        // Scale up; 10^(18-scale) itself always fits, the product may not.
        let factor = 10u128.pow(DECIMALS - scale);
        mantissa.checked_mul(factor).ok_or(UnitsError::Overflow)
    } else {
        // Finer than one base unit: only exact multiples convert.
        let divisor = 10u128.pow(scale - DECIMALS);
        if mantissa % divisor != 0 {
            return Err(UnitsError::SubUnitFraction);
        }
        Ok(mantissa / divisor)
    }
}

/// Converts a base-unit amount to display units.
pub fn to_display(base_units: u128) -> Result<Decimal, UnitsError> {
    let mantissa = i128::try_from(base_units).map_err(|_| UnitsError::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, DECIMALS).map_err(|_| UnitsError::Overflow)
}
