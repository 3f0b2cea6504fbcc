use anyhow::{ensure, Context};
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{Add, Mul},
    str::FromStr,
};

/// Represents an amount of money in USD currency.
///
/// The amount is stored internally as an integer number of cents, but the
/// [`Display`] implementation formats it for display as dollars to 2 decimal
/// places, with no thousands separators (for example, `$1234.50`).
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd)]
pub struct Usd(i64);

impl Usd {
    /// Creates an amount from a whole number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Self)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sums `amounts`, returning `None` if the total overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::default(), Self::checked_add)
    }

    /// Returns the amount in dollars, for writing as a spreadsheet number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        let amount = format!("${sign}{}.{:02}", cents / 100, cents % 100);
        f.pad(&amount)
    }
}

/// Parses a dollar amount such as `5`, `2.5`, `$1,234.50`, `-3.00` or
/// `$-3.00`.
///
/// Digits beyond the second decimal place are rounded half-up to the cent.
impl FromStr for Usd {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let (negative, unsigned) = match unsigned.strip_prefix('-') {
            Some(rest) if !negative => (true, rest),
            _ => (negative, unsigned),
        };
        let digits = unsigned.replace(',', "");
        let (whole, frac) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        ensure!(
            !(whole.is_empty() && frac.is_empty())
                && whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()),
            "invalid amount {input:?}"
        );
        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().with_context(|| format!("amount {input:?} out of range"))?
        };
        let mut places = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = places.next().unwrap_or(0);
        let hundredths = places.next().unwrap_or(0);
        let round_up = places.next().is_some_and(|d| d >= 5);
        let cents = dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .with_context(|| format!("amount {input:?} out of range"))?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Add for Usd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Usd> for Usd {
    fn sum<I: Iterator<Item = &'a Usd>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Mul<i64> for Usd {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
