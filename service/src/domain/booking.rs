//! [`Booking`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateRange, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{availability, property, user};

/// Reservation of a property's nights by a guest.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`property::Property`].
    pub property_id: property::Id,

    /// ID of the [`user::User`] staying at the property.
    pub guest_id: user::Id,

    /// ID of the [`user::User`] hosting the property.
    pub host_id: user::Id,

    /// Booked nights: from the check-in date up to, but excluding, the
    /// check-out date.
    pub stay: DateRange,

    /// Number of guests.
    pub guests: u16,

    /// [`Pricing`] of this [`Booking`].
    pub pricing: Pricing,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`PaymentStatus`] of this [`Booking`].
    pub payment_status: PaymentStatus,

    /// [`PaymentMethod`] of this [`Booking`].
    pub payment_method: PaymentMethod,

    /// Guest's [`SpecialRequests`], if any.
    pub special_requests: Option<SpecialRequests>,

    /// [`Reason`] this [`Booking`] was rejected or cancelled with.
    pub reason: Option<Reason>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

impl Booking {
    /// Returns the number of booked nights.
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.stay.nights()
    }

    /// Indicates whether the provided [`user::User`] takes part in this
    /// [`Booking`] either as the guest or the host.
    #[must_use]
    pub fn is_participant(&self, user_id: user::Id) -> bool {
        self.guest_id == user_id || self.host_id == user_id
    }
}

/// Move of a stored [`Booking`] into the [`Status`] of the provided one,
/// made only while the stored [`Booking`] is still in the `from` [`Status`].
#[derive(Clone, Debug)]
pub struct StatusChange {
    /// [`Booking`] in its new [`Status`].
    pub booking: Booking,

    /// [`Status`] the stored [`Booking`] is expected to be in.
    pub from: Status,
}

impl StatusChange {
    /// Indicates whether the provided stored [`Booking`] is changed by this
    /// [`StatusChange`].
    #[must_use]
    pub fn matches(&self, stored: &Booking) -> bool {
        stored.id == self.booking.id && stored.status == self.from
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Amounts charged for a [`Booking`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pricing {
    /// Sum of the nightly prices.
    pub base: Money,

    /// One-off cleaning fee of the property.
    pub cleaning_fee: Money,

    /// Platform's service fee.
    pub service_fee: Money,

    /// Total amount to be paid by the guest.
    pub total: Money,
}

impl Pricing {
    /// Quotes the [`Pricing`] of a stay from its `base` amount, the
    /// `cleaning_fee` of the property and the platform's service `fee`.
    ///
    /// The service fee is rounded to minor units, half away from zero.
    #[must_use]
    pub fn quote(base: Money, cleaning_fee: Money, fee: Percent) -> Self {
        let service_fee = base.percent(fee);
        Self {
            base,
            cleaning_fee,
            service_fee,
            total: base + cleaning_fee + service_fee,
        }
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Awaits the host's approval."]
        Pending = 1,

        #[doc = "Accepted, the nights are booked."]
        Confirmed = 2,

        #[doc = "Cancelled by the guest or the host."]
        Cancelled = 3,

        #[doc = "The stay is over."]
        Completed = 4,

        #[doc = "Declined by the host."]
        Rejected = 5,
    }
}

impl Status {
    /// Indicates whether a [`Booking`] may move from this [`Status`] to the
    /// `next` one.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        use Status as S;

        matches!(
            (self, next),
            (S::Pending, S::Confirmed | S::Rejected | S::Cancelled)
                | (S::Confirmed, S::Cancelled | S::Completed)
        )
    }

    /// Indicates whether a [`Booking`] in this [`Status`] still holds its
    /// nights.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Returns the [`availability::Status`] of the calendar days covered by a
    /// [`Booking`] in this [`Status`].
    #[must_use]
    pub fn calendar_status(self) -> availability::Status {
        use availability::Status as D;

        match self {
            Self::Pending => D::Pending,
            Self::Confirmed | Self::Completed => D::Booked,
            Self::Cancelled | Self::Rejected => D::Available,
        }
    }
}

define_kind! {
    #[doc = "Payment status of a [`Booking`]."]
    enum PaymentStatus {
        #[doc = "Nothing paid yet."]
        Unpaid = 1,

        #[doc = "Fully paid."]
        Paid = 2,

        #[doc = "Paid amount returned to the guest."]
        Refunded = 3,
    }
}

define_kind! {
    #[doc = "Payment method chosen for a [`Booking`]."]
    enum PaymentMethod {
        #[doc = "Credit card."]
        CreditCard = 1,

        #[doc = "PayPal."]
        Paypal = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::CreditCard
    }
}

/// Guest's special requests of a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct SpecialRequests(String);

impl SpecialRequests {
    /// Creates new [`SpecialRequests`] if the given `text` is non-blank and
    /// fits into 1000 characters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.trim().is_empty() && text.chars().count() <= 1000)
            .then_some(Self(text))
    }
}

/// Reason of rejecting or cancelling a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`] if the given `text` is non-blank and fits
    /// into 500 characters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.trim().is_empty() && text.chars().count() <= 500)
            .then_some(Self(text))
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was modified.
pub type ModificationDateTime = DateTimeOf<(Booking, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::availability;

    use super::{Pricing, Status};

    fn eur(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Eur)
    }

    #[test]
    fn quotes_service_fee_and_total() {
        let fee = Percent::new(Decimal::from(5)).unwrap();

        let p = Pricing::quote(eur("540.00"), eur("60.00"), fee);
        assert_eq!(p.service_fee, eur("27.00"));
        assert_eq!(p.total, eur("627.00"));

        let p = Pricing::quote(eur("100.10"), eur("0"), fee);
        assert_eq!(p.service_fee, eur("5.01"));
        assert_eq!(p.total, eur("105.11"));

        let p = Pricing::quote(eur("0.30"), eur("0"), fee);
        assert_eq!(p.service_fee, eur("0.02"));
    }

    #[test]
    fn allows_only_lifecycle_transitions() {
        use Status as S;

        for (from, to) in [
            (S::Pending, S::Confirmed),
            (S::Pending, S::Rejected),
            (S::Pending, S::Cancelled),
            (S::Confirmed, S::Cancelled),
            (S::Confirmed, S::Completed),
        ] {
            assert!(from.can_become(to), "{from} -> {to}");
        }

        for from in [S::Cancelled, S::Rejected, S::Completed] {
            for &to in S::ALL {
                assert!(!from.can_become(to), "{from} -> {to}");
            }
        }
        assert!(!S::Confirmed.can_become(S::Pending));
        assert!(!S::Pending.can_become(S::Completed));
    }

    #[test]
    fn maps_onto_calendar_status() {
        use availability::Status as D;

        assert_eq!(Status::Pending.calendar_status(), D::Pending);
        assert_eq!(Status::Confirmed.calendar_status(), D::Booked);
        assert_eq!(Status::Completed.calendar_status(), D::Booked);
        assert_eq!(Status::Cancelled.calendar_status(), D::Available);
        assert_eq!(Status::Rejected.calendar_status(), D::Available);
    }
}
