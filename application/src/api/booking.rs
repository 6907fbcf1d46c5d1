//! [`Booking`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use common::{money::Currency, Date, DateRange, DateTime};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, booking, property, user},
    query,
    read::booking::list,
};

use crate::{
    api::{availability::Day, user::Summary, BookingError, Dates, PropertyError},
    define_error, AsError, Context, Error,
};

/// A reservation of a property.
#[derive(Clone, Debug, Serialize)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: booking::Id,

    /// ID of the booked property.
    pub property_id: property::Id,

    /// ID of the guest.
    pub guest_id: user::Id,

    /// ID of the host.
    pub host_id: user::Id,

    /// First night of the stay.
    pub check_in: Date,

    /// Day of departure.
    pub check_out: Date,

    /// Number of nights.
    pub nights: u32,

    /// Number of guests.
    pub guests: u16,

    /// Sum of the nightly prices.
    pub base_amount: Decimal,

    /// Flat cleaning fee.
    pub cleaning_fee: Decimal,

    /// Platform service fee.
    pub service_fee: Decimal,

    /// Total amount to pay.
    pub total_amount: Decimal,

    /// Currency of the amounts.
    pub currency: Currency,

    /// Status of this [`Booking`].
    pub status: booking::Status,

    /// Payment status of this [`Booking`].
    pub payment_status: booking::PaymentStatus,

    /// Chosen payment method.
    pub payment_method: booking::PaymentMethod,

    /// Wishes of the guest.
    pub special_requests: Option<String>,

    /// Reason of the rejection or cancellation.
    pub reason: Option<String>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: DateTime,

    /// [`DateTime`] when this [`Booking`] was last updated.
    pub updated_at: DateTime,
}

impl From<domain::Booking> for Booking {
    fn from(b: domain::Booking) -> Self {
        let nights = b.nights();
        let booking::Pricing {
            base,
            cleaning_fee,
            service_fee,
            total,
        } = b.pricing;
        Self {
            id: b.id,
            property_id: b.property_id,
            guest_id: b.guest_id,
            host_id: b.host_id,
            check_in: b.stay.start(),
            check_out: b.stay.end(),
            nights,
            guests: b.guests,
            base_amount: base.amount,
            cleaning_fee: cleaning_fee.amount,
            service_fee: service_fee.amount,
            total_amount: total.amount,
            currency: total.currency,
            status: b.status,
            payment_status: b.payment_status,
            payment_method: b.payment_method,
            special_requests: b.special_requests.map(|s| s.to_string()),
            reason: b.reason.map(|r| r.to_string()),
            created_at: b.created_at.coerce(),
            updated_at: b.updated_at.coerce(),
        }
    }
}

/// Public summary of a booked property.
#[derive(Clone, Debug, Serialize)]
pub struct PropertySummary {
    /// ID of the property.
    pub id: property::Id,

    /// Title of the property.
    pub title: String,

    /// City of the property.
    pub city: String,

    /// Street address of the property.
    pub address: String,

    /// Kind of the property.
    pub property_type: property::Kind,
}

impl From<domain::Property> for PropertySummary {
    fn from(p: domain::Property) -> Self {
        Self {
            id: p.id,
            title: p.title.to_string(),
            city: p.city.to_string(),
            address: p.address.to_string(),
            property_type: p.kind,
        }
    }
}

/// [`Booking`] with summaries of the related entities.
#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    /// The [`Booking`].
    #[serde(flatten)]
    pub booking: Booking,

    /// Booked property.
    pub property: Option<PropertySummary>,

    /// Guest of the [`Booking`].
    pub guest: Option<Summary>,

    /// Host of the [`Booking`].
    pub host: Option<Summary>,
}

impl From<list::Entry> for Entry {
    fn from(e: list::Entry) -> Self {
        Self {
            booking: e.booking.into(),
            property: e.property.map(Into::into),
            guest: e.guest.map(Into::into),
            host: e.host.map(Into::into),
        }
    }
}

/// Request body of [`create()`].
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the property to book.
    pub property_id: property::Id,

    /// First night of the stay.
    pub check_in: Date,

    /// Day of departure.
    pub check_out: Date,

    /// Number of guests.
    pub guests: u16,

    /// Wishes of the guest.
    pub special_requests: Option<String>,

    /// Payment method.
    #[serde(default)]
    pub payment_method: booking::PaymentMethod,
}

/// Response of [`create()`].
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    /// Localized outcome message.
    pub message: String,

    /// Created [`Booking`].
    pub booking: Booking,

    /// Whether the host still has to approve the [`Booking`].
    pub requires_approval: bool,
}

/// `POST /bookings`: books a property for the authenticated guest.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the body is invalid.
/// - If the stay cannot be booked.
#[tracing::instrument(skip_all, fields(api.name = "create_booking"))]
pub async fn create(
    ctx: Context,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;

    let stay = DateRange::new(req.check_in, req.check_out)
        .filter(|s| s.nights() > 0)
        .ok_or_else(|| super::ValidationError::InvalidDates.into())
        .map_err(ctx.error())?;
    let special_requests = req
        .special_requests
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            booking::SpecialRequests::new(s)
                .ok_or_else(|| Invalid::SpecialRequests.into())
        })
        .transpose()
        .map_err(ctx.error())?;

    let booking = ctx
        .service()
        .execute(command::CreateBooking {
            guest_id: my_id,
            property_id: req.property_id,
            stay,
            guests: req.guests,
            special_requests,
            payment_method: req.payment_method,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    let requires_approval = booking.status == booking::Status::Pending;
    let key = if requires_approval {
        "booking.requested"
    } else {
        "booking.confirmed"
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            message: message(&ctx, key),
            booking: booking.into(),
            requires_approval,
        }),
    ))
}

/// Response carrying a single [`Booking`].
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Localized outcome message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The [`Booking`].
    pub booking: Booking,
}

/// `GET /bookings/:id`: returns a booking to its guest or host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the booking doesn't exist or the authenticated user takes no part in
///   it.
#[tracing::instrument(skip_all, fields(api.name = "booking"))]
pub async fn get(
    ctx: Context,
    id: Result<Path<booking::Id>, PathRejection>,
) -> Result<Json<BookingResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(booking_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;

    let booking = ctx
        .service()
        .execute(query::booking::ById {
            booking_id,
            viewer_id: my_id,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(BookingResponse {
        message: None,
        booking: booking.into(),
    }))
}

/// Query parameters of the booking listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Status to filter the bookings by.
    pub status: Option<booking::Status>,

    /// Timeframe to filter the bookings by.
    pub timeframe: Option<list::Timeframe>,

    /// Property to filter the bookings by, for hosts only.
    pub property_id: Option<property::Id>,
}

/// Response of the booking listings.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Matching bookings, latest check-in first.
    pub bookings: Vec<Entry>,

    /// Number of the returned bookings.
    pub count: usize,
}

/// `GET /bookings/guest/my-bookings`: lists the bookings of the
/// authenticated guest.
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(api.name = "guest_bookings"))]
pub async fn guest_bookings(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Query(params) =
        params.map_err(AsError::into_error).map_err(ctx.error())?;

    list(&ctx, list::Participant::Guest(my_id), ListParams {
        property_id: None,
        ..params
    })
    .await
}

/// `GET /bookings/host/bookings`: lists the bookings of the properties of the
/// authenticated host.
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(api.name = "host_bookings"))]
pub async fn host_bookings(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Query(params) =
        params.map_err(AsError::into_error).map_err(ctx.error())?;

    list(&ctx, list::Participant::Host(my_id), params).await
}

/// Lists the bookings of the provided [`list::Participant`].
async fn list(
    ctx: &Context,
    participant: list::Participant,
    params: ListParams,
) -> Result<Json<ListResponse>, Error> {
    let ListParams {
        status,
        timeframe,
        property_id,
    } = params;

    let bookings = ctx
        .service()
        .execute(query::booking::List(list::Filter {
            participant,
            status,
            timeframe,
            property_id,
            today: Date::today(),
        }))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?
        .into_iter()
        .map(Entry::from)
        .collect::<Vec<_>>();

    Ok(Json(ListResponse {
        count: bookings.len(),
        bookings,
    }))
}

/// Response of [`host_calendar()`].
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    /// Calendar days of the property.
    pub availability: Vec<Day>,

    /// Pending and confirmed bookings overlapping the range.
    pub bookings: Vec<Booking>,
}

/// `GET /bookings/host/property/:id/calendar`: returns the calendar and the
/// active bookings of a property of the authenticated host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the dates are missing or inverted.
/// - If the property doesn't exist or isn't hosted by the authenticated user.
#[tracing::instrument(skip_all, fields(api.name = "host_calendar"))]
pub async fn host_calendar(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    dates: Result<Query<Dates>, QueryRejection>,
) -> Result<Json<CalendarResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let Query(dates) = dates
        .map_err(|_| super::ValidationError::InvalidDates.into())
        .map_err(ctx.error())?;
    let dates = dates.range().map_err(ctx.error())?;

    let calendar = ctx
        .service()
        .execute(query::booking::HostCalendarOf {
            property_id,
            viewer_id: my_id,
            dates,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(CalendarResponse {
        availability: calendar.days.into_iter().map(Day::from).collect(),
        bookings: calendar.bookings.into_iter().map(Booking::from).collect(),
    }))
}

/// Request body of the booking transitions.
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    /// Reason of the transition.
    pub reason: Option<String>,
}

impl TransitionRequest {
    /// Extracts the [`booking::Reason`] out of an optional request body.
    fn reason(
        body: Result<Json<Self>, JsonRejection>,
    ) -> Result<Option<booking::Reason>, Error> {
        let reason = match body {
            Ok(Json(Self { reason })) => reason,
            Err(JsonRejection::MissingJsonContentType(_)) => None,
            Err(e) => return Err(e.into_error()),
        };
        reason
            .filter(|r| !r.trim().is_empty())
            .map(|r| {
                booking::Reason::new(r).ok_or_else(|| Invalid::Reason.into())
            })
            .transpose()
    }
}

/// `PUT /bookings/:id/approve`: confirms a pending booking of a property of
/// the authenticated host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the booking doesn't exist or isn't hosted by the authenticated user.
/// - If the booking is not pending or its nights are taken.
#[tracing::instrument(skip_all, fields(api.name = "approve_booking"))]
pub async fn approve(
    ctx: Context,
    id: Result<Path<booking::Id>, PathRejection>,
) -> Result<Json<BookingResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(booking_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;

    let booking = ctx
        .service()
        .execute(command::ApproveBooking {
            booking_id,
            initiator_id: my_id,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(BookingResponse {
        message: Some(message(&ctx, "booking.approved")),
        booking: booking.into(),
    }))
}

/// `PUT /bookings/:id/reject`: declines a pending booking of a property of
/// the authenticated host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the booking doesn't exist or isn't hosted by the authenticated user.
/// - If the booking is not pending.
#[tracing::instrument(skip_all, fields(api.name = "reject_booking"))]
pub async fn reject(
    ctx: Context,
    id: Result<Path<booking::Id>, PathRejection>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(booking_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let reason = TransitionRequest::reason(body).map_err(ctx.error())?;

    let booking = ctx
        .service()
        .execute(command::RejectBooking {
            booking_id,
            initiator_id: my_id,
            reason,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(BookingResponse {
        message: Some(message(&ctx, "booking.rejected")),
        booking: booking.into(),
    }))
}

/// `PUT /bookings/:id/cancel`: cancels an active booking of the authenticated
/// guest or host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the booking doesn't exist or the authenticated user takes no part in
///   it.
/// - If the booking is neither pending nor confirmed.
#[tracing::instrument(skip_all, fields(api.name = "cancel_booking"))]
pub async fn cancel(
    ctx: Context,
    id: Result<Path<booking::Id>, PathRejection>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(booking_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let reason = TransitionRequest::reason(body).map_err(ctx.error())?;

    let booking = ctx
        .service()
        .execute(command::CancelBooking {
            booking_id,
            initiator_id: my_id,
            reason,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(BookingResponse {
        message: Some(message(&ctx, "booking.cancelled")),
        booking: booking.into(),
    }))
}

/// Returns the localized message under the provided `key`.
fn message(ctx: &Context, key: &str) -> String {
    ctx.locale()
        .translate(key)
        .map_or_else(|| key.to_owned(), ToOwned::to_owned)
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CapacityExceeded { .. } => Invalid::CapacityExceeded.into(),
            Self::CheckInPassed(_) => Invalid::CheckInPassed.into(),
            Self::Conflict(_) => BookingError::Conflict.into(),
            Self::NoGuests => Invalid::NoGuests.into(),
            Self::NotAvailable(_) => BookingError::NotAvailable.into(),
            Self::OwnProperty(_) => Invalid::OwnProperty.into(),
            Self::PropertyNotBookable(_) => Invalid::NotBookable.into(),
            Self::PropertyNotExists(_) => PropertyError::NotExists.into(),
            Self::Unpriceable(_) => Invalid::Unpriceable.into(),
            Self::UserNotExists(_) => {
                crate::context::AuthError::InvalidToken.into()
            }
        })
    }
}

impl AsError for command::approve_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::Conflict(_) => BookingError::Conflict.into(),
            Self::InvalidTransition { .. } => {
                BookingError::InvalidTransition.into()
            }
            Self::NotBookingHost { .. } => BookingError::NotHost.into(),
        })
    }
}

impl AsError for command::reject_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::InvalidTransition { .. } => {
                BookingError::InvalidTransition.into()
            }
            Self::NotBookingHost { .. } => BookingError::NotHost.into(),
        })
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::InvalidTransition { .. } => {
                BookingError::InvalidTransition.into()
            }
            Self::NotBookingParticipant { .. } => {
                BookingError::NotParticipant.into()
            }
        })
    }
}

impl AsError for query::booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::NotBookingParticipant { .. } => {
                BookingError::NotParticipant.into()
            }
            Self::NotPropertyHost { .. } => PropertyError::NotHost.into(),
            Self::PropertyNotExists(_) => PropertyError::NotExists.into(),
        })
    }
}

define_error! {
    enum Invalid {
        #[code = "CAPACITY_EXCEEDED"]
        #[status = BAD_REQUEST]
        #[message = "Number of guests exceeds the capacity of the property"]
        CapacityExceeded,

        #[code = "CHECK_IN_PASSED"]
        #[status = BAD_REQUEST]
        #[message = "Check-in date has already passed"]
        CheckInPassed,

        #[code = "NO_GUESTS"]
        #[status = BAD_REQUEST]
        #[message = "At least one guest is required"]
        NoGuests,

        #[code = "OWN_PROPERTY"]
        #[status = FORBIDDEN]
        #[message = "Hosts cannot book their own properties"]
        OwnProperty,

        #[code = "PROPERTY_NOT_BOOKABLE"]
        #[status = BAD_REQUEST]
        #[message = "Property is not open for bookings"]
        NotBookable,

        #[code = "UNPRICEABLE"]
        #[status = BAD_REQUEST]
        #[message = "Stay cannot be priced"]
        Unpriceable,

        #[code = "INVALID_SPECIAL_REQUESTS"]
        #[status = BAD_REQUEST]
        #[message = "Special requests must be at most 1000 characters long"]
        SpecialRequests,

        #[code = "INVALID_REASON"]
        #[status = BAD_REQUEST]
        #[message = "Reason must be at most 500 characters long"]
        Reason,
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateRange, DateTime, Money};
    use rust_decimal::Decimal;
    use service::domain::{
        booking::{self, PaymentMethod, PaymentStatus, Pricing},
        property, user,
    };

    use crate::AsError as _;

    use super::{Booking, CreateRequest};

    #[test]
    fn flattens_pricing() {
        let eur = |n: i64| Money::new(Decimal::from(n), Currency::Eur);
        let now = DateTime::now();
        let b = service::domain::Booking {
            id: booking::Id::new(),
            property_id: property::Id::new(),
            guest_id: user::Id::new(),
            host_id: user::Id::new(),
            stay: DateRange::new(
                "2026-03-01".parse().unwrap(),
                "2026-03-04".parse().unwrap(),
            )
            .unwrap(),
            guests: 2,
            pricing: Pricing::quote(
                eur(540),
                eur(40),
                common::Percent::new(Decimal::from(5)).unwrap(),
            ),
            status: booking::Status::Confirmed,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::CreditCard,
            special_requests: None,
            reason: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let dto = Booking::from(b);

        assert_eq!(dto.nights, 3);
        assert_eq!(dto.base_amount, Decimal::from(540));
        assert_eq!(dto.service_fee, Decimal::from(27));
        assert_eq!(dto.total_amount, Decimal::from(607));
        assert_eq!(dto.check_out.to_string(), "2026-03-04");
    }

    #[test]
    fn defaults_payment_method() {
        let req: CreateRequest = serde_json::from_str(&format!(
            r#"{{"property_id": "{}", "check_in": "2026-03-01",
                "check_out": "2026-03-04", "guests": 2}}"#,
            property::Id::new(),
        ))
        .unwrap();

        assert_eq!(req.payment_method, PaymentMethod::CreditCard);
        assert!(req.special_requests.is_none());
    }

    #[test]
    fn maps_conflicts_to_bad_request() {
        let err = service::command::create_booking::ExecutionError::Conflict(
            DateRange::new(
                "2026-03-01".parse().unwrap(),
                "2026-03-02".parse().unwrap(),
            )
            .unwrap(),
        )
        .as_error();

        assert_eq!(err.code, "BOOKING_CONFLICT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
