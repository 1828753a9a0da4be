// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exact decimal amounts with a two-digit presentation scale.
//!
//! Amounts never pass through binary floating point except at the rate
//! source boundary, where [`truncate_f64`] converts and truncates once.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional digits kept by truncation.
pub const SCALE: u32 = 2;

static AMOUNT_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d*(\.\d{1,2}|\d)$").expect("static amount pattern"));

/// Truncates toward zero at [`SCALE`] digits. Never rounds half-up.
pub fn truncate(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero)
}

/// True when the value's shortest string form is "digits, optionally a point and 1-2 digits".
/// Negative values never match.
pub fn is_cents_format(d: &Decimal) -> bool {
    AMOUNT_FORMAT.is_match(&d.normalize().to_string())
}

/// Converts a floating rate from the rate source and truncates it.
pub fn truncate_f64(v: f64) -> Option<Decimal> {
    Decimal::from_f64(v).map(truncate)
}

/// A monetary amount. Arithmetic is exact and checked; only
/// [`Money::truncate`] and [`Money::convert`] drop digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn truncate(self) -> Self {
        Money(truncate(self.0))
    }

    /// Presentation conversion: multiply by `rate` and truncate.
    /// `None` when the product does not fit.
    pub fn convert(self, rate: Decimal) -> Option<Self> {
        self.0.checked_mul(rate).map(|v| Money(v).truncate())
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_cents_format(&self) -> bool {
        is_cents_format(&self.0)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money(d)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Stored as TEXT so SQLite never coerces amounts to REAL.
impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse::<Money>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
