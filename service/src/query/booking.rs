//! [`Query`] collection related to [`Booking`]s.

use std::collections::{HashMap, HashSet};

use common::{
    operations::{By, Select},
    DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        availability::Day, booking, property, user, Booking, Property, User,
    },
    infra::{database, Database},
    read::{
        availability::Range,
        booking::{list, HostCalendar, Overlapping},
    },
    Query, Service,
};

/// [`Query`] of a single [`Booking`] viewed by one of its parties.
#[derive(Clone, Copy, Debug)]
pub struct ById {
    /// ID of the [`Booking`].
    pub booking_id: booking::Id,

    /// ID of the [`User`] viewing the [`Booking`].
    pub viewer_id: user::Id,
}

impl<Db, Ml> Query<ById> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<Booking>, booking::Id>>,
        Ok = Option<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ById) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ById {
            booking_id,
            viewer_id,
        } = query;

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if !booking.is_participant(viewer_id) {
            return Err(tracerr::new!(E::NotBookingParticipant {
                user_id: viewer_id,
                booking_id,
            }));
        }

        Ok(booking)
    }
}

/// [`Query`] of the [`Booking`]s listed by a [`list::Filter`], most recent
/// check-in first.
///
/// Properties and parties of all the listed [`Booking`]s are fetched at once.
#[derive(Clone, Copy, Debug)]
pub struct List(pub list::Filter);

impl<Db, Ml> Query<List> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Vec<Booking>, list::Filter>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
            Ok = HashMap<property::Id, Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<list::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(filter): List,
    ) -> Result<Self::Ok, Self::Err> {
        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(filter)))
            .await
            .map_err(tracerr::wrap!())?;
        if bookings.is_empty() {
            return Ok(vec![]);
        }

        let property_ids = bookings
            .iter()
            .map(|b| b.property_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let properties = self
            .database()
            .execute(Select(By::<HashMap<_, Property>, _>::new(property_ids)))
            .await
            .map_err(tracerr::wrap!())?;

        let user_ids = bookings
            .iter()
            .flat_map(|b| [b.guest_id, b.host_id])
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let users = self
            .database()
            .execute(Select(By::<HashMap<_, User>, _>::new(user_ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(bookings
            .into_iter()
            .map(|booking| list::Entry {
                property: properties.get(&booking.property_id).cloned(),
                guest: users.get(&booking.guest_id).cloned(),
                host: users.get(&booking.host_id).cloned(),
                booking,
            })
            .collect())
    }
}

/// [`Query`] of the [`HostCalendar`] of a [`Property`] viewed by its host.
#[derive(Clone, Copy, Debug)]
pub struct HostCalendarOf {
    /// ID of the [`Property`].
    pub property_id: property::Id,

    /// ID of the [`User`] viewing the calendar.
    pub viewer_id: user::Id,

    /// Range of dates to view.
    pub dates: DateRange,
}

impl<Db, Ml> Query<HostCalendarOf> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Day>, Range>>,
            Ok = Vec<Day>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, Overlapping>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = HostCalendar;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: HostCalendarOf,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let HostCalendarOf {
            property_id,
            viewer_id,
            dates,
        } = query;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        if !property.is_hosted_by(viewer_id) {
            return Err(tracerr::new!(E::NotPropertyHost {
                user_id: viewer_id,
                property_id,
            }));
        }

        let days = self
            .database()
            .execute(Select(By::new(Range { property_id, dates })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(Overlapping {
                property_id,
                range: dates,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(HostCalendar { days, bookings })
    }
}

/// Error of [`ById`] and [`HostCalendarOf`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is neither the guest nor the host of the [`Booking`].
    #[display("`User(id: {user_id})` is not part of `Booking(id: {booking_id})`")]
    NotBookingParticipant {
        /// ID of the [`User`].
        user_id: user::Id,

        /// ID of the [`Booking`].
        booking_id: booking::Id,
    },

    /// [`User`] doesn't host the [`Property`].
    #[display("`User(id: {user_id})` doesn't host `Property(id: {property_id})`")]
    NotPropertyHost {
        /// ID of the [`User`].
        user_id: user::Id,

        /// ID of the [`Property`].
        property_id: property::Id,
    },

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use common::DateRange;

    use crate::{
        domain::{booking::Status, user},
        read::booking::list::{Filter, Participant, Timeframe},
        tests::Scenario,
        Query as _,
    };

    use super::{ById, ExecutionError, HostCalendarOf, List};

    #[tokio::test]
    async fn shows_booking_to_parties_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let booking = s.book(&property, 1, 3).await;

        for viewer_id in [s.guest.id, s.host.id] {
            let found = s
                .service
                .execute(ById {
                    booking_id: booking.id,
                    viewer_id,
                })
                .await
                .unwrap();
            assert_eq!(found.id, booking.id);
        }

        let err = s
            .service
            .execute(ById {
                booking_id: booking.id,
                viewer_id: s.other_host.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotBookingParticipant { .. },
        ));
    }

    #[tokio::test]
    async fn lists_enriched_bookings() {
        let s = Scenario::new().await;
        let first = s.published_property().await;
        let second = s.published_property().await;
        let a = s.book(&first, 1, 3).await;
        let b = s.book(&second, 5, 7).await;
        let c = s.book(&first, 10, 12).await;

        let filter = Filter {
            participant: Participant::Guest(s.guest.id),
            status: None,
            timeframe: Some(Timeframe::Upcoming),
            property_id: None,
            today: s.day(0),
        };
        let entries = s.service.execute(List(filter)).await.unwrap();

        assert_eq!(
            entries.iter().map(|e| e.booking.id).collect::<Vec<_>>(),
            vec![c.id, b.id, a.id],
        );
        for e in &entries {
            assert_eq!(e.property.as_ref().unwrap().id, e.booking.property_id);
            assert_eq!(e.guest.as_ref().unwrap().id, s.guest.id);
            assert_eq!(e.host.as_ref().unwrap().id, s.host.id);
        }

        let hosted = s
            .service
            .execute(List(Filter {
                participant: Participant::Host(s.host.id),
                property_id: Some(first.id),
                status: Some(Status::Confirmed),
                ..filter
            }))
            .await
            .unwrap();
        assert_eq!(
            hosted.iter().map(|e| e.booking.id).collect::<Vec<_>>(),
            vec![c.id, a.id],
        );

        let none = s
            .service
            .execute(List(Filter {
                participant: Participant::Guest(user::Id::new()),
                ..filter
            }))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn shows_host_calendar_to_owner_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let _ = s.book(&property, 1, 3).await;
        let overlapping = s.book(&property, 4, 8).await;
        let _ = s.book(&property, 9, 11).await;
        let dates = DateRange::new(s.day(3), s.day(6)).unwrap();

        let calendar = s
            .service
            .execute(HostCalendarOf {
                property_id: property.id,
                viewer_id: s.host.id,
                dates,
            })
            .await
            .unwrap();

        assert_eq!(
            calendar.days.iter().map(|d| d.date).collect::<Vec<_>>(),
            dates.days().collect::<Vec<_>>(),
        );
        assert_eq!(
            calendar.bookings.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![overlapping.id],
        );

        let err = s
            .service
            .execute(HostCalendarOf {
                property_id: property.id,
                viewer_id: s.guest.id,
                dates,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotPropertyHost { .. },
        ));
    }
}
