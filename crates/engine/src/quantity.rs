use std::{fmt, str::FromStr};

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_hundredths};

/// Stock quantity in **hundredths of a unit** (`1250` is 12.5 units).
///
/// Shares the parsing rules of [`MoneyCents`]: at most two decimals, `.` or
/// `,` as separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    #[must_use]
    pub const fn new(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Whole units, e.g. `Quantity::units(3)` is 3.00.
    #[must_use]
    pub const fn units(units: i64) -> Self {
        Self(units * 100)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_add(rhs.0).map(Quantity)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    /// Total value of `self` units at `price` per unit, rounded half up to
    /// the cent.
    pub fn total(self, price: MoneyCents) -> ResultEngine<MoneyCents> {
        let raw = i128::from(self.0) * i128::from(price.cents());
        let cents = div_round_half_up(raw, 100);
        i64::try_from(cents)
            .map(MoneyCents::new)
            .map_err(|_| EngineError::InvalidAmount("total too large".to_string()))
    }
}

/// Integer division rounding half away from zero.
pub(crate) fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let q = numerator / denominator;
    let r = numerator % denominator;
    if r.abs() * 2 >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            q + 1
        } else {
            q - 1
        }
    } else {
        q
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "quantity").map(Quantity)
    }
}
