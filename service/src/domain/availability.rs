//! Availability calendar definitions.
//!
//! Every [`Property`] has exactly one [`Day`] per calendar date inside its
//! generated horizon. Missing [`Day`]s mean "unknown" and are never bookable.
//!
//! [`Property`]: crate::domain::Property

use std::collections::BTreeMap;

use common::{define_kind, Date, DateRange};
use derive_more::{AsRef, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

use crate::domain::property;

/// Single date of a property's availability calendar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Day {
    /// ID of the property this [`Day`] belongs to.
    pub property_id: property::Id,

    /// Calendar [`Date`] of this [`Day`].
    pub date: Date,

    /// Indicator whether the host offers this [`Day`] at all.
    pub is_available: bool,

    /// Price of the night starting at this [`Day`].
    pub price: Decimal,

    /// Indicator whether a booking covering this [`Day`] must be approved by
    /// the host.
    pub requires_approval: bool,

    /// [`Status`] of this [`Day`].
    pub status: Status,

    /// Host's internal [`Notes`].
    pub notes: Option<Notes>,
}

impl Day {
    /// Indicates whether this [`Day`] can be taken by a new booking.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.is_available && self.status == Status::Available
    }

    /// Applies the provided [`Fields`] to this [`Day`].
    ///
    /// Status and availability of a [`Day`] held by a booking are left
    /// untouched.
    pub fn apply(&mut self, fields: &Fields) {
        let Fields {
            is_available,
            price,
            status,
            requires_approval,
            notes,
        } = fields;

        if !self.status.is_held() {
            if let Some(v) = *is_available {
                self.is_available = v;
            }
            if let Some(v) = *status {
                self.status = v;
            }
        }
        if let Some(v) = *price {
            self.price = v;
        }
        if let Some(v) = *requires_approval {
            self.requires_approval = v;
        }
        if let Some(v) = notes {
            self.notes = Some(v.clone());
        }
    }
}

define_kind! {
    #[doc = "Status of a calendar [`Day`]."]
    enum Status {
        #[doc = "Free to be booked."]
        Available = 1,

        #[doc = "Taken by a confirmed booking."]
        Booked = 2,

        #[doc = "Closed by the host."]
        Blocked = 3,

        #[doc = "Held by a booking awaiting the host's approval."]
        Pending = 4,
    }
}

impl Status {
    /// Indicates whether this [`Status`] means the [`Day`] is held by a
    /// booking.
    #[must_use]
    pub fn is_held(self) -> bool {
        matches!(self, Self::Booked | Self::Pending)
    }

    /// Indicates whether a host may set this [`Status`] manually.
    #[must_use]
    pub fn is_manual(self) -> bool {
        matches!(self, Self::Available | Self::Blocked)
    }
}

/// Host's internal notes on a [`Day`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`] if the given `text` fits into 500 characters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.chars().count() <= 500).then_some(Self(text))
    }
}

/// Freshly generated calendar of a property.
#[derive(Clone, Debug)]
pub struct Calendar {
    /// ID of the property this [`Calendar`] belongs to.
    pub property_id: property::Id,

    /// [`Day`]s of this [`Calendar`], ascending by date.
    pub days: Vec<Day>,
}

impl Calendar {
    /// Generates a [`Calendar`] from `today` through `today` plus
    /// `horizon_months` (both inclusive), with every [`Day`] available at the
    /// provided `price`.
    ///
    /// [`None`] is returned if the horizon overflows the supported dates.
    #[must_use]
    pub fn generate(
        property_id: property::Id,
        today: Date,
        horizon_months: u32,
        price: Decimal,
    ) -> Option<Self> {
        let last = today.checked_add_months(horizon_months)?;
        let days = DateRange::inclusive(today, last)?
            .days()
            .map(|date| Day {
                property_id,
                date,
                is_available: true,
                price,
                requires_approval: false,
                status: Status::Available,
                notes: None,
            })
            .collect();
        Some(Self { property_id, days })
    }
}

/// Partial update of a calendar [`Day`]: [`None`] leaves a field unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fields {
    /// New [`Day::is_available`] value.
    pub is_available: Option<bool>,

    /// New [`Day::price`] value.
    pub price: Option<Decimal>,

    /// New [`Day::status`] value.
    pub status: Option<Status>,

    /// New [`Day::requires_approval`] value.
    pub requires_approval: Option<bool>,

    /// New [`Day::notes`] value.
    pub notes: Option<Notes>,
}

impl Fields {
    /// Indicates whether these [`Fields`] change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks these [`Fields`] may be applied by a host.
    ///
    /// # Errors
    ///
    /// If these [`Fields`] are empty, set a negative price or a status
    /// reserved for bookings.
    pub fn validate(&self) -> Result<(), PatchError> {
        if self.is_empty() {
            return Err(PatchError::NoFields);
        }
        if let Some(status) = self.status.filter(|s| !s.is_manual()) {
            return Err(PatchError::ReservedStatus(status));
        }
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(PatchError::NegativePrice);
        }
        Ok(())
    }
}

/// Host's manual edit of a property's calendar.
#[derive(Clone, Debug)]
pub enum Patch {
    /// Edit of individual, not necessarily contiguous, dates.
    Dates {
        /// [`Date`]s to edit.
        dates: Vec<Date>,

        /// [`Fields`] to apply to every date.
        fields: Fields,
    },

    /// Edit of every date between `first` and `last` (both inclusive).
    Range {
        /// First [`Date`] to edit.
        first: Date,

        /// Last [`Date`] to edit.
        last: Date,

        /// [`Fields`] to apply to every date.
        fields: Fields,
    },
}

impl Patch {
    /// Maximum number of dates a single [`Patch`] may touch.
    pub const MAX_DATES: usize = 732;

    /// Normalizes this [`Patch`] into [`Changes`] of the provided property.
    ///
    /// # Errors
    ///
    /// If this [`Patch`] has no dates, an inverted range, too many dates, or
    /// invalid [`Fields`].
    pub fn normalize(
        self,
        property_id: property::Id,
    ) -> Result<Changes, PatchError> {
        let (dates, fields): (Vec<_>, _) = match self {
            Self::Dates { dates, fields } => (dates, fields),
            Self::Range {
                first,
                last,
                fields,
            } => {
                let range = DateRange::inclusive(first, last)
                    .ok_or(PatchError::InvertedRange { first, last })?;
                if range.nights() as usize > Self::MAX_DATES {
                    return Err(PatchError::TooManyDates);
                }
                (range.days().collect(), fields)
            }
        };
        fields.validate()?;
        if dates.is_empty() {
            return Err(PatchError::NoDates);
        }

        let entries = dates
            .into_iter()
            .map(|d| (d, fields.clone()))
            .collect::<BTreeMap<_, _>>();
        if entries.len() > Self::MAX_DATES {
            return Err(PatchError::TooManyDates);
        }

        Ok(Changes {
            property_id,
            entries: entries.into_iter().collect(),
        })
    }
}

/// Error of normalizing a [`Patch`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum PatchError {
    /// No dates to edit.
    #[display("no dates to edit")]
    NoDates,

    /// No fields to change.
    #[display("no fields to change")]
    NoFields,

    /// Range ends before it starts.
    #[display("range `{first}..={last}` is inverted")]
    InvertedRange {
        /// First [`Date`] of the range.
        first: Date,

        /// Last [`Date`] of the range.
        last: Date,
    },

    /// Too many dates in a single edit.
    #[display("too many dates in a single edit")]
    TooManyDates,

    /// Status is reserved for bookings.
    #[display("status `{_0}` cannot be set manually")]
    ReservedStatus(#[error(not(source))] Status),

    /// Price is negative.
    #[display("price cannot be negative")]
    NegativePrice,
}

/// Normalized [`Patch`]: distinct dates in ascending order with the
/// [`Fields`] to apply.
#[derive(Clone, Debug)]
pub struct Changes {
    /// ID of the property whose calendar is changed.
    pub property_id: property::Id,

    /// Dates and their [`Fields`], ascending by date.
    pub entries: Vec<(Date, Fields)>,
}

impl Changes {
    /// Returns the smallest inclusive bounds covering all the changed dates.
    #[must_use]
    pub fn bounds(&self) -> Option<(Date, Date)> {
        Some((self.entries.first()?.0, self.entries.last()?.0))
    }
}

/// Atomic status change of every [`Day`] of a stay, applied by booking
/// operations.
///
/// Only [`Day`]s currently in one of the `from` statuses are changed, so the
/// number of changed [`Day`]s tells whether the whole stay was still in the
/// expected state.
#[derive(Clone, Debug)]
pub struct Transition {
    /// ID of the property whose calendar is changed.
    pub property_id: property::Id,

    /// Stay whose nights are changed.
    pub stay: DateRange,

    /// Statuses the [`Day`]s are expected to be in.
    pub from: Vec<Status>,

    /// Status to set.
    pub to: Status,

    /// Indicator whether only [`Day`]s offered by the host
    /// ([`Day::is_available`]) may be changed.
    pub offered_only: bool,
}

impl Transition {
    /// Indicates whether the provided [`Day`] is changed by this
    /// [`Transition`].
    #[must_use]
    pub fn matches(&self, day: &Day) -> bool {
        day.property_id == self.property_id
            && self.stay.contains(day.date)
            && self.from.contains(&day.status)
            && (!self.offered_only || day.is_available)
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use rust_decimal::Decimal;

    use crate::domain::property;

    use super::{Calendar, Day, Fields, Patch, PatchError, Status};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn day(status: Status) -> Day {
        Day {
            property_id: property::Id::new(),
            date: date("2026-03-01"),
            is_available: true,
            price: Decimal::from(100),
            requires_approval: false,
            status,
            notes: None,
        }
    }

    fn blocked() -> Fields {
        Fields {
            is_available: Some(false),
            status: Some(Status::Blocked),
            ..Fields::default()
        }
    }

    #[test]
    fn generates_horizon_inclusively() {
        let cal = Calendar::generate(
            property::Id::new(),
            date("2026-10-16"),
            12,
            Decimal::from(180),
        )
        .unwrap();

        assert_eq!(cal.days.len(), 366);
        assert_eq!(cal.days.first().unwrap().date, date("2026-10-16"));
        assert_eq!(cal.days.last().unwrap().date, date("2027-10-16"));
        assert!(cal.days.iter().all(|d| d.is_bookable()
            && !d.requires_approval
            && d.price == Decimal::from(180)));
        assert!(cal.days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn normalizes_discrete_dates() {
        let id = property::Id::new();
        let changes = Patch::Dates {
            dates: vec![
                date("2026-03-05"),
                date("2026-03-01"),
                date("2026-03-05"),
            ],
            fields: blocked(),
        }
        .normalize(id)
        .unwrap();

        assert_eq!(changes.property_id, id);
        assert_eq!(
            changes.entries.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            vec![date("2026-03-01"), date("2026-03-05")],
        );
        assert_eq!(
            changes.bounds(),
            Some((date("2026-03-01"), date("2026-03-05"))),
        );
    }

    #[test]
    fn normalizes_range_inclusively() {
        let changes = Patch::Range {
            first: date("2026-02-27"),
            last: date("2026-03-02"),
            fields: Fields {
                price: Some(Decimal::from(220)),
                ..Fields::default()
            },
        }
        .normalize(property::Id::new())
        .unwrap();

        assert_eq!(changes.entries.len(), 4);
        assert_eq!(changes.entries[3].0, date("2026-03-02"));
    }

    #[test]
    fn rejects_invalid_patches() {
        let id = property::Id::new();

        assert_eq!(
            Patch::Dates {
                dates: vec![],
                fields: blocked(),
            }
            .normalize(id)
            .unwrap_err(),
            PatchError::NoDates,
        );
        assert_eq!(
            Patch::Dates {
                dates: vec![date("2026-03-01")],
                fields: Fields::default(),
            }
            .normalize(id)
            .unwrap_err(),
            PatchError::NoFields,
        );
        assert!(matches!(
            Patch::Range {
                first: date("2026-03-02"),
                last: date("2026-03-01"),
                fields: blocked(),
            }
            .normalize(id),
            Err(PatchError::InvertedRange { .. }),
        ));
        assert_eq!(
            Patch::Dates {
                dates: vec![date("2026-03-01")],
                fields: Fields {
                    status: Some(Status::Booked),
                    ..Fields::default()
                },
            }
            .normalize(id)
            .unwrap_err(),
            PatchError::ReservedStatus(Status::Booked),
        );
        assert_eq!(
            Patch::Dates {
                dates: vec![date("2026-03-01")],
                fields: Fields {
                    price: Some(Decimal::from(-1)),
                    ..Fields::default()
                },
            }
            .normalize(id)
            .unwrap_err(),
            PatchError::NegativePrice,
        );
        assert_eq!(
            Patch::Range {
                first: date("2026-01-01"),
                last: date("2028-12-31"),
                fields: blocked(),
            }
            .normalize(id)
            .unwrap_err(),
            PatchError::TooManyDates,
        );
    }

    #[test]
    fn keeps_held_days_status() {
        let mut booked = day(Status::Booked);
        booked.apply(&Fields {
            price: Some(Decimal::from(150)),
            ..blocked()
        });
        assert_eq!(booked.status, Status::Booked);
        assert!(booked.is_available);
        assert_eq!(booked.price, Decimal::from(150));

        let mut free = day(Status::Available);
        free.apply(&blocked());
        assert_eq!(free.status, Status::Blocked);
        assert!(!free.is_bookable());
    }
}
