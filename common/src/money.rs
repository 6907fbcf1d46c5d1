//! [`Money`]-related definitions.

use std::{fmt, ops::Add, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};

use crate::{define_kind, Percent};

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Number of minor units digits kept by [`Money::rounded()`].
    pub const SCALE: u32 = 2;

    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Rounds this [`Money`] to minor units, with midpoints rounded away
    /// from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                Self::SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            ),
            ..self
        }
    }

    /// Returns the provided [`Percent`] of this [`Money`], rounded to minor
    /// units.
    #[must_use]
    pub fn percent(self, percent: Percent) -> Self {
        Self {
            amount: percent.of(self.amount),
            ..self
        }
        .rounded()
    }

    /// Multiplies this [`Money`] by the provided quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            ..self
        }
    }

    /// Indicates whether this [`Money`] is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Sums up amounts in the same [`Currency`].
///
/// # Panics
///
/// If the [`Currency`] of the operands differs.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Self {
            amount: self.amount + rhs.amount,
            ..self
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_ascii() {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Euro."]
        Eur = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,

        #[doc = "Swiss Franc."]
        Chf = 4,
    }
}
