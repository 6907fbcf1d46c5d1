//! [`Command`] for approving a pending [`Booking`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateRange, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{self, Transition},
        booking, property, user, Booking, Property,
    },
    infra::{database, Database},
    read::booking::{HasConflict, Overlap},
    Service,
};

use super::Command;

/// [`Command`] for the host approving a [`booking::Status::Pending`]
/// [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct ApproveBooking {
    /// ID of the [`Booking`] to approve.
    pub booking_id: booking::Id,

    /// ID of the [`user::User`] approving the [`Booking`].
    pub initiator_id: user::Id,
}

impl<Db, Ml> Command<ApproveBooking> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HasConflict, Overlap>>,
            Ok = HasConflict,
            Err = Traced<database::Error>,
        > + Database<
            Update<Transition>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<
            Update<booking::StatusChange>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApproveBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use booking::Status as S;
        use ExecutionError as E;

        let ApproveBooking {
            booking_id,
            initiator_id,
        } = cmd;

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.host_id != initiator_id {
            return Err(tracerr::new!(E::NotBookingHost {
                user_id: initiator_id,
                booking_id,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Property`.
        tx.execute(Lock(By::new(booking.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if !booking.status.can_become(S::Confirmed) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: S::Confirmed,
            }));
        }

        let conflict = tx
            .execute(Select(By::<HasConflict, _>::new(Overlap {
                property_id: booking.property_id,
                stay: booking.stay,
                exclude: Some(booking_id),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *conflict {
            return Err(tracerr::new!(E::Conflict(booking.stay)));
        }

        let booked = tx
            .execute(Update(Transition {
                property_id: booking.property_id,
                stay: booking.stay,
                from: vec![availability::Status::Pending],
                to: S::Confirmed.calendar_status(),
                offered_only: false,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if booked != u64::from(booking.nights()) {
            return Err(tracerr::new!(E::Conflict(booking.stay)));
        }

        let from = booking.status;
        booking.status = S::Confirmed;
        booking.updated_at = DateTime::now().coerce();

        let changed = tx
            .execute(Update(booking::StatusChange {
                booking: booking.clone(),
                from,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if changed == 0 {
            // Moved on by a writer not taking the `Property` lock.
            return Err(tracerr::new!(E::InvalidTransition {
                from,
                to: booking.status,
            }));
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {booking_id})` approved");

        Ok(booking)
    }
}

/// Error of [`ApproveBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// Nights of the [`Booking`] are not held for it anymore.
    #[display("Stay `{_0}` is taken by another booking")]
    Conflict(#[error(not(source))] DateRange),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] cannot be approved in its current status.
    #[display("`Booking` cannot become `{to}` from `{from}`")]
    InvalidTransition {
        /// Current [`booking::Status`].
        from: booking::Status,

        /// Requested [`booking::Status`].
        to: booking::Status,
    },

    /// [`user::User`] is not the host of the [`Booking`].
    #[display("`User(id: {user_id})` doesn't host `Booking(id: {booking_id})`")]
    NotBookingHost {
        /// ID of the [`user::User`].
        user_id: user::Id,

        /// ID of the [`Booking`].
        booking_id: booking::Id,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{availability::Status as DayStatus, booking::Status},
        tests::Scenario,
        Command as _,
    };

    use super::{ApproveBooking, ExecutionError};

    #[tokio::test]
    async fn books_pending_nights() {
        let s = Scenario::new().await;
        let property = s.approval_property().await;
        let pending = s.book(&property, 1, 4).await;
        assert_eq!(pending.status, Status::Pending);

        let approved = s
            .service
            .execute(ApproveBooking {
                booking_id: pending.id,
                initiator_id: s.host.id,
            })
            .await
            .unwrap();

        assert_eq!(approved.status, Status::Confirmed);
        assert_eq!(s.booking(pending.id).await.status, Status::Confirmed);
        let statuses = s
            .days(&property, 0, 5)
            .await
            .into_iter()
            .map(|d| d.status)
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![
                DayStatus::Available,
                DayStatus::Booked,
                DayStatus::Booked,
                DayStatus::Booked,
                DayStatus::Available,
            ],
        );
    }

    #[tokio::test]
    async fn allows_host_and_pending_only() {
        let s = Scenario::new().await;
        let property = s.approval_property().await;
        let pending = s.book(&property, 1, 4).await;

        for initiator_id in [s.guest.id, s.other_host.id] {
            let err = s
                .service
                .execute(ApproveBooking {
                    booking_id: pending.id,
                    initiator_id,
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_ref(),
                ExecutionError::NotBookingHost { .. },
            ));
        }

        let cmd = ApproveBooking {
            booking_id: pending.id,
            initiator_id: s.host.id,
        };
        let _ = s.service.execute(cmd).await.unwrap();
        let err = s.service.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition {
                from: Status::Confirmed,
                to: Status::Confirmed,
            },
        ));
    }

    #[tokio::test]
    async fn keeps_pending_if_nights_are_released_meanwhile() {
        let s = Scenario::new().await;
        let property = s.approval_property().await;
        let pending = s.book(&property, 1, 4).await;
        let (property_id, released) = (property.id, s.day(2));
        // Releases a held night right before the stay is booked.
        let service = s.interfered(3, move |state| {
            if let Some(day) = state
                .calendar
                .get_mut(&property_id)
                .and_then(|c| c.get_mut(&released))
            {
                day.status = DayStatus::Available;
            }
        });

        let err = service
            .execute(ApproveBooking {
                booking_id: pending.id,
                initiator_id: s.host.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Conflict(r) if *r == pending.stay,
        ));
        assert_eq!(s.booking(pending.id).await.status, Status::Pending);
        let statuses = s
            .days(&property, 1, 4)
            .await
            .into_iter()
            .map(|d| d.status)
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![DayStatus::Pending, DayStatus::Available, DayStatus::Pending],
        );
    }
}
