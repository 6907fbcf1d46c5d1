//! [`Command`] for cancelling a [`Booking`].

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

/// [`Command`] for the guest or the host cancelling an active [`Booking`],
/// releasing its nights.
#[derive(Clone, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,

    /// ID of the [`user::User`] cancelling the [`Booking`].
    pub initiator_id: user::Id,

    /// [`Reason`] of the cancellation, if any.
    pub reason: Option<Reason>,
}

impl<Db, Ml> Command<CancelBooking> for Service<Db, Ml>
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
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use booking::Status as S;
        use ExecutionError as E;

        let CancelBooking {
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
        if !booking.is_participant(initiator_id) {
            return Err(tracerr::new!(E::NotBookingParticipant {
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
        if !booking.status.can_become(S::Cancelled) {
            return Err(tracerr::new!(E::InvalidTransition {
                from: booking.status,
                to: S::Cancelled,
            }));
        }

        // Only the nights held by this `Booking` are released.
        let held: availability::Status = booking.status.calendar_status();
        let released = tx
            .execute(Update(Transition {
                property_id: booking.property_id,
                stay: booking.stay,
                from: vec![held],
                to: S::Cancelled.calendar_status(),
                offered_only: false,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let from = booking.status;
        booking.status = S::Cancelled;
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
            "`Booking(id: {booking_id})` cancelled by `User(id: \
             {initiator_id})`, {released} nights released",
        );

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] cannot be cancelled in its current status.
    #[display("`Booking` cannot become `{to}` from `{from}`")]
    InvalidTransition {
        /// Current [`booking::Status`].
        from: booking::Status,

        /// Requested [`booking::Status`].
        to: booking::Status,
    },

    /// [`user::User`] is neither the guest nor the host of the [`Booking`].
    #[display("`User(id: {user_id})` is not part of `Booking(id: {booking_id})`")]
    NotBookingParticipant {
        /// ID of the [`user::User`].
        user_id: user::Id,

        /// ID of the [`Booking`].
        booking_id: booking::Id,
    },
}
