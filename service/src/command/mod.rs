//! [`Command`] definition.

pub mod approve_booking;
pub mod authorize_user_session;
pub mod cancel_booking;
pub mod create_booking;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod reject_booking;
pub mod update_availability;
pub mod update_property;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    approve_booking::ApproveBooking,
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, create_booking::CreateBooking,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession, reject_booking::RejectBooking,
    update_availability::UpdateAvailability,
    update_property::UpdateProperty,
};
