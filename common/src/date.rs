//! Calendar [`Date`] and [`DateRange`] definitions.

use std::{fmt, iter, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use time::{macros::format_description, util::days_in_year_month, Month};

/// Calendar date without a time zone.
///
/// Formatted as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month (`1..=12`) of this [`Date`].
    #[must_use]
    pub fn month(self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of the month of this [`Date`].
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Returns the [`Date`] following this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Returns the [`Date`] preceding this one.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.previous_day().map(Self)
    }

    /// Shifts this [`Date`] by the provided number of days.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }

    /// Shifts this [`Date`] by the provided number of calendar months.
    ///
    /// The day of the month is clamped to the length of the resulting month,
    /// so `2026-01-31` plus one month is `2026-02-28`.
    #[must_use]
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        let index = i64::from(self.year()) * 12
            + i64::from(self.month() - 1)
            + i64::from(months);
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        let month = Month::try_from(month).ok()?;
        let day = self.day().min(days_in_year_month(year, month));
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the number of whole days from this [`Date`] to the `other` one.
    ///
    /// Negative if the `other` [`Date`] precedes this one.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(ParseError)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

/// Half-open range of [`Date`]s: the `end` is excluded.
///
/// For a stay it's `[check_in, check_out)`: the night of the check-out day is
/// not occupied.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateRange {
    /// First [`Date`] of this [`DateRange`].
    start: Date,

    /// First [`Date`] after this [`DateRange`].
    end: Date,
}

impl DateRange {
    /// Creates a new [`DateRange`] if the `start` precedes the `end`.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Creates a new [`DateRange`] covering the provided [`Date`]s
    /// inclusively.
    #[must_use]
    pub fn inclusive(first: Date, last: Date) -> Option<Self> {
        Self::new(first, last.next()?)
    }

    /// Returns the first [`Date`] of this [`DateRange`].
    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Returns the first [`Date`] after this [`DateRange`].
    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Returns the last [`Date`] inside this [`DateRange`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn last(&self) -> Date {
        self.end.previous().expect("`end` is after `start`")
    }

    /// Returns the number of nights (days) in this [`DateRange`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from(self.start.days_until(self.end))
            .expect("`end` is after `start` and dates are bounded")
    }

    /// Indicates whether the provided [`Date`] is inside this [`DateRange`].
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }

    /// Indicates whether this [`DateRange`] shares at least one night with the
    /// `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns an iterator over all the [`Date`]s of this [`DateRange`] in
    /// ascending order.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        iter::successors(Some(self.start), |d| d.next())
            .take_while(move |d| *d < end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let raw = <std::borrow::Cow<'de, str>>::deserialize(d)?;
            Self::from_str(&raw).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, DateRange};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[test]
    fn parses_and_formats() {
        let d = date("2026-03-01");
        assert_eq!(d, Date::from_calendar_date(2026, 3, 1).unwrap());
        assert_eq!(d.to_string(), "2026-03-01");

        assert!("2026-13-01".parse::<Date>().is_err());
        assert!("2026-02-30".parse::<Date>().is_err());
        assert!("01.03.2026".parse::<Date>().is_err());
    }

    #[test]
    fn adds_months_with_clamping() {
        assert_eq!(
            date("2026-01-31").checked_add_months(1),
            Some(date("2026-02-28")),
        );
        assert_eq!(
            date("2028-01-31").checked_add_months(1),
            Some(date("2028-02-29")),
        );
        assert_eq!(
            date("2026-10-16").checked_add_months(12),
            Some(date("2027-10-16")),
        );
        assert_eq!(
            date("2026-11-30").checked_add_months(3),
            Some(date("2027-02-28")),
        );
    }

    #[test]
    fn counts_nights_excluding_check_out() {
        let stay = range("2026-03-01", "2026-03-04");
        assert_eq!(stay.nights(), 3);
        assert_eq!(stay.last(), date("2026-03-03"));
        assert_eq!(
            stay.days().collect::<Vec<_>>(),
            vec![date("2026-03-01"), date("2026-03-02"), date("2026-03-03")],
        );
        assert!(stay.contains(date("2026-03-03")));
        assert!(!stay.contains(date("2026-03-04")));

        let over_month = range("2026-02-27", "2026-03-02");
        assert_eq!(over_month.nights(), 3);
        assert_eq!(over_month.days().count(), 3);
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert!(DateRange::new(date("2026-03-01"), date("2026-03-01")).is_none());
        assert!(DateRange::new(date("2026-03-02"), date("2026-03-01")).is_none());
        assert_eq!(
            DateRange::inclusive(date("2026-03-01"), date("2026-03-01"))
                .map(|r| r.nights()),
            Some(1),
        );
    }

    #[test]
    fn overlaps_only_when_sharing_a_night() {
        let stay = range("2026-03-05", "2026-03-10");

        // Back-to-back stays share the turnover day only.
        assert!(!stay.overlaps(&range("2026-03-01", "2026-03-05")));
        assert!(!stay.overlaps(&range("2026-03-10", "2026-03-12")));

        assert!(stay.overlaps(&range("2026-03-01", "2026-03-06")));
        assert!(stay.overlaps(&range("2026-03-09", "2026-03-12")));
        assert!(stay.overlaps(&range("2026-03-06", "2026-03-07")));
        assert!(stay.overlaps(&range("2026-03-01", "2026-03-20")));
    }
}
