//! REST API definitions.

pub mod amenity;
pub mod availability;
pub mod booking;
pub mod property;
pub mod user;

use axum::{
    routing::{get, post, put},
    Router,
};
use common::{money::Currency, Date, DateRange};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::define_error;

/// Builds the [`Router`] of the REST API.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/auth/register", post(user::register))
        .route("/auth/login", post(user::login))
        .route("/auth/me", get(user::me))
        .route("/amenities", get(amenity::list))
        .route("/amenities/by-category", get(amenity::by_category))
        .route("/properties", post(property::create))
        .route("/properties/search", get(property::search))
        .route("/properties/host/my-properties", get(property::mine))
        .route(
            "/properties/:id",
            get(property::get)
                .put(property::update)
                .delete(property::archive),
        )
        .route(
            "/properties/:id/availability",
            get(availability::get)
                .post(availability::update)
                .put(availability::update),
        )
        .route("/bookings", post(booking::create))
        .route("/bookings/guest/my-bookings", get(booking::guest_bookings))
        .route("/bookings/host/bookings", get(booking::host_bookings))
        .route(
            "/bookings/host/property/:id/calendar",
            get(booking::host_calendar),
        )
        .route("/bookings/:id", get(booking::get))
        .route("/bookings/:id/approve", put(booking::approve))
        .route("/bookings/:id/reject", put(booking::reject))
        .route("/bookings/:id/cancel", put(booking::cancel))
}

/// Amount of money.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Money {
    /// Amount with minor units.
    pub amount: Decimal,

    /// [`Currency`] of the amount.
    pub currency: Currency,
}

impl From<common::Money> for Money {
    fn from(m: common::Money) -> Self {
        Self {
            amount: m.amount,
            currency: m.currency,
        }
    }
}

/// Inclusive range of dates requested by `start_date` and `end_date` query
/// parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Dates {
    /// First requested [`Date`].
    pub start_date: Date,

    /// Last requested [`Date`].
    pub end_date: Date,
}

impl Dates {
    /// Converts these [`Dates`] into a [`DateRange`].
    ///
    /// # Errors
    ///
    /// If `end_date` precedes `start_date`.
    pub fn range(self) -> Result<DateRange, crate::Error> {
        DateRange::inclusive(self.start_date, self.end_date)
            .ok_or_else(|| ValidationError::InvalidDates.into())
    }
}

define_error! {
    enum ValidationError {
        #[code = "INVALID_DATES"]
        #[status = BAD_REQUEST]
        #[message = "Range of dates is invalid"]
        InvalidDates,

        #[code = "INVALID_PAGINATION"]
        #[status = BAD_REQUEST]
        #[message = "Page must be positive and limit must be within \
                     1..=100"]
        InvalidPagination,
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the provided ID does not exist"]
        NotExists,

        #[code = "NOT_PROPERTY_HOST"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` doesn't host the `Property`"]
        NotHost,
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID does not exist"]
        NotExists,

        #[code = "NOT_BOOKING_PARTICIPANT"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is neither the guest nor the host \
                     of the `Booking`"]
        NotParticipant,

        #[code = "NOT_BOOKING_HOST"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` doesn't host the `Booking`"]
        NotHost,

        #[code = "INVALID_TRANSITION"]
        #[status = BAD_REQUEST]
        #[message = "`Booking` cannot make this transition in its current \
                     status"]
        InvalidTransition,

        #[code = "BOOKING_CONFLICT"]
        #[status = BAD_REQUEST]
        #[message = "Another `Booking` already holds some of the dates"]
        Conflict,

        #[code = "DATES_NOT_AVAILABLE"]
        #[status = BAD_REQUEST]
        #[message = "Some of the dates are not available"]
        NotAvailable,
    }
}
