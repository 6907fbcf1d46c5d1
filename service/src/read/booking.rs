//! [`Booking`]-related read definitions.

use common::{Date, DateRange};
use derive_more::Deref;

use crate::domain::{availability::Day, booking, property, Booking};

/// Indicator whether an active [`Booking`] overlaps a stay.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasConflict(pub bool);

impl PartialEq<bool> for HasConflict {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Selector of the active [`Booking`]s of a property overlapping a stay.
#[derive(Clone, Copy, Debug)]
pub struct Overlap {
    /// ID of the property.
    pub property_id: property::Id,

    /// Stay to check, the check-out date excluded.
    pub stay: DateRange,

    /// ID of the [`Booking`] to ignore, if any.
    pub exclude: Option<booking::Id>,
}

impl Overlap {
    /// Indicates whether the provided [`Booking`] conflicts with this
    /// [`Overlap`]'s stay.
    ///
    /// Matches if the existing check-in falls into the stay, or its check-out
    /// does, or the existing stay wraps the whole one.
    #[must_use]
    pub fn matches(&self, b: &Booking) -> bool {
        let (s, e) = (self.stay.start(), self.stay.end());
        let (ci, co) = (b.stay.start(), b.stay.end());

        b.property_id == self.property_id
            && b.status.is_active()
            && self.exclude != Some(b.id)
            && ((ci >= s && ci < e)
                || (co > s && co <= e)
                || (ci <= s && co >= e))
    }
}

/// Selector of the active [`Booking`]s of a property overlapping a range of
/// dates.
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// ID of the property.
    pub property_id: property::Id,

    /// Range of dates to select the [`Booking`]s for.
    pub range: DateRange,
}

impl From<Overlapping> for Overlap {
    fn from(o: Overlapping) -> Self {
        Self {
            property_id: o.property_id,
            stay: o.range,
            exclude: None,
        }
    }
}

/// Selector of the confirmed [`Booking`]s whose stay is over.
#[derive(Clone, Copy, Debug)]
pub struct Finished {
    /// Current [`Date`].
    pub today: Date,
}

impl Finished {
    /// Indicates whether the provided [`Booking`] is finished.
    #[must_use]
    pub fn matches(&self, b: &Booking) -> bool {
        b.status == booking::Status::Confirmed && b.stay.end() <= self.today
    }
}

pub mod list {
    //! [`Booking`]s list definitions.

    use common::{define_kind, Date};

    use crate::domain::{booking, property, user, Booking, Property, User};

    /// Party whose [`Booking`]s are listed.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Participant {
        /// [`Booking`]s made by the guest.
        Guest(user::Id),

        /// [`Booking`]s of the host's properties.
        Host(user::Id),
    }

    define_kind! {
        #[doc = "Timeframe of listed [`Booking`]s."]
        enum Timeframe {
            #[doc = "Check-in today or later."]
            Upcoming = 1,

            #[doc = "Check-out before today."]
            Past = 2,
        }
    }

    /// Filter of listed [`Booking`]s.
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// [`Participant`] whose [`Booking`]s are listed.
        pub participant: Participant,

        /// [`booking::Status`] to list only.
        pub status: Option<booking::Status>,

        /// [`Timeframe`] to list only.
        pub timeframe: Option<Timeframe>,

        /// Property to list the [`Booking`]s of only.
        pub property_id: Option<property::Id>,

        /// Current [`Date`] the [`Timeframe`] is relative to.
        pub today: Date,
    }

    impl Filter {
        /// Indicates whether the provided [`Booking`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, b: &Booking) -> bool {
            let participant = match self.participant {
                Participant::Guest(id) => b.guest_id == id,
                Participant::Host(id) => b.host_id == id,
            };
            let timeframe = match self.timeframe {
                None => true,
                Some(Timeframe::Upcoming) => b.stay.start() >= self.today,
                Some(Timeframe::Past) => b.stay.end() < self.today,
            };

            participant
                && timeframe
                && self.status.is_none_or(|s| b.status == s)
                && self.property_id.is_none_or(|id| b.property_id == id)
        }
    }

    /// Listed [`Booking`] along with its [`Property`] and parties.
    ///
    /// Parties are [`None`] if they don't exist anymore.
    #[derive(Clone, Debug)]
    pub struct Entry {
        /// Listed [`Booking`].
        pub booking: Booking,

        /// Booked [`Property`].
        pub property: Option<Property>,

        /// Guest [`User`].
        pub guest: Option<User>,

        /// Host [`User`].
        pub host: Option<User>,
    }
}

/// Host's view of a property's calendar.
#[derive(Clone, Debug)]
pub struct HostCalendar {
    /// Calendar [`Day`]s of the viewed range, ordered by date.
    pub days: Vec<Day>,

    /// Active [`Booking`]s overlapping the viewed range, ordered by check-in.
    pub bookings: Vec<Booking>,
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateRange, DateTime, Money};

    use crate::domain::{
        booking::{self, PaymentMethod, PaymentStatus, Pricing},
        property, user, Booking,
    };

    use super::{
        list::{Filter, Participant, Timeframe},
        Overlap,
    };

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn stay(from: &str, to: &str) -> DateRange {
        DateRange::new(date(from), date(to)).unwrap()
    }

    fn booking(property_id: property::Id, stay: DateRange) -> Booking {
        let now = DateTime::now();
        let zero = Money::zero(Currency::Eur);
        Booking {
            id: booking::Id::new(),
            property_id,
            guest_id: user::Id::new(),
            host_id: user::Id::new(),
            stay,
            guests: 1,
            pricing: Pricing {
                base: zero,
                cleaning_fee: zero,
                service_fee: zero,
                total: zero,
            },
            status: booking::Status::Confirmed,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::CreditCard,
            special_requests: None,
            reason: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[test]
    fn overlaps_half_open_stays() {
        let property_id = property::Id::new();
        let existing = booking(property_id, stay("2026-11-10", "2026-11-13"));
        let overlap = |from, to| Overlap {
            property_id,
            stay: stay(from, to),
            exclude: None,
        };

        for (from, to) in [
            ("2026-11-08", "2026-11-11"),
            ("2026-11-12", "2026-11-15"),
            ("2026-11-11", "2026-11-12"),
            ("2026-11-01", "2026-11-20"),
            ("2026-11-10", "2026-11-13"),
        ] {
            assert!(overlap(from, to).matches(&existing), "{from}..{to}");
        }
        for (from, to) in [
            ("2026-11-07", "2026-11-10"),
            ("2026-11-13", "2026-11-16"),
        ] {
            assert!(!overlap(from, to).matches(&existing), "{from}..{to}");
        }
    }

    #[test]
    fn ignores_inactive_excluded_and_foreign_bookings() {
        let property_id = property::Id::new();
        let mut existing =
            booking(property_id, stay("2026-11-10", "2026-11-13"));
        let mut overlap = Overlap {
            property_id,
            stay: existing.stay,
            exclude: Some(existing.id),
        };
        assert!(!overlap.matches(&existing));

        overlap.exclude = None;
        existing.status = booking::Status::Cancelled;
        assert!(!overlap.matches(&existing));

        existing.status = booking::Status::Pending;
        assert!(overlap.matches(&existing));

        overlap.property_id = property::Id::new();
        assert!(!overlap.matches(&existing));
    }

    #[test]
    fn filters_list_by_participant_and_timeframe() {
        let today = date("2026-11-10");
        let b =
            booking(property::Id::new(), stay("2026-11-01", "2026-11-05"));
        let filter = Filter {
            participant: Participant::Guest(b.guest_id),
            status: None,
            timeframe: None,
            property_id: None,
            today,
        };

        assert!(filter.matches(&b));
        assert!(!Filter {
            participant: Participant::Guest(b.host_id),
            ..filter
        }
        .matches(&b));
        assert!(Filter {
            participant: Participant::Host(b.host_id),
            timeframe: Some(Timeframe::Past),
            ..filter
        }
        .matches(&b));
        assert!(!Filter {
            timeframe: Some(Timeframe::Upcoming),
            ..filter
        }
        .matches(&b));
        assert!(!Filter {
            status: Some(booking::Status::Pending),
            ..filter
        }
        .matches(&b));
    }
}
