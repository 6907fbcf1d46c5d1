//! [`Command`] for rejecting a pending [`Booking`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{self, Transition},
        booking::{self, Reason},
        property, user, Booking, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for the host rejecting a [`booking::Status::Pending`]
/// [`Booking`], releasing its nights.
#[derive(Clone, Debug)]
pub struct RejectBooking {
    /// ID of the [`Booking`] to reject.
    pub booking_id: booking::Id,

    /// ID of the [`user::User`] rejecting the [`Booking`].
    pub initiator_id: user::Id,

    /// [`Reason`] of the rejection, if any.
    pub reason: Option<Reason>,
}

impl<Db, Ml> Command<RejectBooking> for Service<Db, Ml>
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
        cmd: RejectBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use booking::Status as S;
        use ExecutionError as E;

        let RejectBooking {
            booking_id,
            initiator_id,
            reason,
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
        if !booking.status.can_become(S::Rejected) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: S::Rejected,
            }));
        }

        let released = tx
            .execute(Update(Transition {
                property_id: booking.property_id,
                stay: booking.stay,
                from: vec![availability::Status::Pending],
                to: S::Rejected.calendar_status(),
                offered_only: false,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let from = booking.status;
        booking.status = S::Rejected;
        booking.reason = reason;
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

        log::info!(
            "`Booking(id: {booking_id})` rejected, {released} nights released",
        );

        Ok(booking)
    }
}

/// Error of [`RejectBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] cannot be rejected in its current status.
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
        domain::{
            availability::Status as DayStatus,
            booking::{Reason, Status},
        },
        tests::Scenario,
        Command as _,
    };

    use super::{ExecutionError, RejectBooking};

    #[tokio::test]
    async fn releases_pending_nights() {
        let s = Scenario::new().await;
        let property = s.approval_property().await;
        let pending = s.book(&property, 1, 4).await;

        let rejected = s
            .service
            .execute(RejectBooking {
                booking_id: pending.id,
                initiator_id: s.host.id,
                reason: Reason::new("Renovation works"),
            })
            .await
            .unwrap();

        assert_eq!(rejected.status, Status::Rejected);
        assert_eq!(
            rejected.reason.as_ref().map(AsRef::<str>::as_ref),
            Some("Renovation works"),
        );
        assert!(s
            .days(&property, 0, 5)
            .await
            .iter()
            .all(|d| d.status == DayStatus::Available));

        let rebooked = s.book(&property, 1, 4).await;
        assert_eq!(rebooked.status, Status::Pending);
    }

    #[tokio::test]
    async fn rejects_pending_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let confirmed = s.book(&property, 1, 4).await;

        let err = s
            .service
            .execute(RejectBooking {
                booking_id: confirmed.id,
                initiator_id: s.host.id,
                reason: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition {
                from: Status::Confirmed,
                to: Status::Rejected,
            },
        ));
        assert!(s
            .days(&property, 1, 4)
            .await
            .iter()
            .all(|d| d.status == DayStatus::Booked));
    }
}
