//! Availability calendar read definitions.

use common::DateRange;
use derive_more::{Deref, From, Into};
use rust_decimal::Decimal;

use crate::domain::{availability::Day, property};

/// Selector of the calendar [`Day`]s of a property inside a date range.
#[derive(Clone, Copy, Debug)]
pub struct Range {
    /// ID of the property to select the [`Day`]s of.
    pub property_id: property::Id,

    /// Dates to select the [`Day`]s of.
    pub dates: DateRange,
}

/// Selector of the nights of a stay at a property.
#[derive(Clone, Copy, Debug)]
pub struct Stay {
    /// ID of the stayed property.
    pub property_id: property::Id,

    /// Stayed nights, the check-out date excluded.
    pub stay: DateRange,
}

/// Sum of the nightly prices of a [`Stay`].
///
/// Zero means the [`Stay`] cannot be priced.
#[derive(Clone, Copy, Debug, Deref, Eq, From, Into, PartialEq)]
pub struct Price(pub Decimal);

impl Price {
    /// Sums up the prices of the provided [`Day`]s.
    pub fn of<'d>(days: impl IntoIterator<Item = &'d Day>) -> Self {
        Self(days.into_iter().map(|d| d.price).sum())
    }

    /// Indicates whether a stay of this [`Price`] can be charged.
    #[must_use]
    pub fn is_chargeable(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

/// How the calendar [`Day`]s cover a [`Stay`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Coverage {
    /// Number of [`Day`]s existing for the [`Stay`].
    pub days: u32,

    /// Number of [`Day`]s that can be taken by a new booking.
    pub bookable: u32,

    /// Indicator whether any [`Day`] requires the host's approval.
    pub requires_approval: bool,
}

impl Coverage {
    /// Computes the [`Coverage`] of the provided [`Day`]s.
    pub fn of<'d>(days: impl IntoIterator<Item = &'d Day>) -> Self {
        days.into_iter().fold(Self::default(), |mut c, d| {
            c.days += 1;
            if d.is_bookable() {
                c.bookable += 1;
            }
            c.requires_approval |= d.requires_approval;
            c
        })
    }

    /// Indicates whether every one of the `nights` can be booked.
    #[must_use]
    pub fn is_bookable(&self, nights: u32) -> bool {
        self.bookable == nights
    }
}
