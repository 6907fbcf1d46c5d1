//! Availability calendar definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use common::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        availability::{self, Notes, Patch, PatchError},
        property,
    },
    query,
    read::availability::Range,
};

use crate::{
    api::{Dates, PropertyError},
    define_error, AsError, Context, Error,
};

/// A single date of a property calendar.
#[derive(Clone, Debug, Serialize)]
pub struct Day {
    /// Date of this [`Day`].
    pub date: Date,

    /// Whether the host opened this [`Day`].
    pub is_available: bool,

    /// Nightly price of this [`Day`].
    pub price: Decimal,

    /// Whether a booking covering this [`Day`] needs the host's approval.
    pub requires_approval: bool,

    /// Status of this [`Day`].
    pub status: availability::Status,

    /// Host notes on this [`Day`].
    pub notes: Option<String>,
}

impl From<availability::Day> for Day {
    fn from(d: availability::Day) -> Self {
        Self {
            date: d.date,
            is_available: d.is_available,
            price: d.price,
            requires_approval: d.requires_approval,
            status: d.status,
            notes: d.notes.map(|n| n.to_string()),
        }
    }
}

/// Response carrying calendar [`Day`]s.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Localized outcome message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// [`Day`]s ordered by date.
    pub availability: Vec<Day>,
}

/// `GET /properties/:id/availability`: returns the calendar of a property
/// between `start_date` and `end_date`, inclusive.
///
/// # Errors
///
/// - If the dates are missing or inverted.
/// - If the property doesn't exist.
#[tracing::instrument(skip_all, fields(api.name = "availability"))]
pub async fn get(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    dates: Result<Query<Dates>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, Error> {
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let Query(dates) = dates
        .map_err(|_| super::ValidationError::InvalidDates.into())
        .map_err(ctx.error())?;
    let dates = dates.range().map_err(ctx.error())?;

    let exists = ctx
        .service()
        .execute(query::property::ById::by(property_id))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?
        .is_some();
    if !exists {
        return Err(ctx.error()(PropertyError::NotExists.into()));
    }

    let days = ctx
        .service()
        .execute(query::availability::ByRange::by(Range {
            property_id,
            dates,
        }))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(AvailabilityResponse {
        message: None,
        availability: days.into_iter().map(Day::from).collect(),
    }))
}

/// Fields of calendar [`Day`]s to change.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldsRequest {
    /// Whether the dates are open.
    pub is_available: Option<bool>,

    /// Nightly price.
    pub price: Option<Decimal>,

    /// Status, either `available` or `blocked`.
    pub status: Option<availability::Status>,

    /// Whether bookings need the host's approval.
    pub requires_approval: Option<bool>,

    /// Host notes.
    pub notes: Option<String>,
}

impl FieldsRequest {
    /// Converts this [`FieldsRequest`] into [`availability::Fields`].
    fn into_fields(self) -> Result<availability::Fields, Error> {
        Ok(availability::Fields {
            is_available: self.is_available,
            price: self.price,
            status: self.status,
            requires_approval: self.requires_approval,
            notes: self
                .notes
                .map(|n| Notes::new(n).ok_or(PatchCode::InvalidNotes))
                .transpose()?,
        })
    }
}

/// Request body of [`update()`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PatchRequest {
    /// The same changes applied to discrete dates.
    Dates {
        /// Dates to change.
        dates: Vec<Date>,

        /// Changes to apply.
        #[serde(flatten)]
        fields: FieldsRequest,
    },

    /// The same changes applied to every date of an inclusive range.
    Range {
        /// First date to change.
        start_date: Date,

        /// Last date to change.
        end_date: Date,

        /// Changes to apply.
        updates: FieldsRequest,
    },
}

impl PatchRequest {
    /// Converts this [`PatchRequest`] into a [`Patch`].
    ///
    /// # Errors
    ///
    /// If the notes are too long.
    pub fn into_patch(self) -> Result<Patch, Error> {
        Ok(match self {
            Self::Dates { dates, fields } => Patch::Dates {
                dates,
                fields: fields.into_fields()?,
            },
            Self::Range {
                start_date,
                end_date,
                updates,
            } => Patch::Range {
                first: start_date,
                last: end_date,
                fields: updates.into_fields()?,
            },
        })
    }
}

/// `POST|PUT /properties/:id/availability`: edits the calendar of a property
/// of the authenticated host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the patch is invalid.
/// - If the property doesn't exist or isn't hosted by the authenticated user.
#[tracing::instrument(skip_all, fields(api.name = "update_availability"))]
pub async fn update(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    body: Result<Json<PatchRequest>, JsonRejection>,
) -> Result<Json<AvailabilityResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;
    let patch = req.into_patch().map_err(ctx.error())?;

    let days = ctx
        .service()
        .execute(command::UpdateAvailability {
            property_id,
            initiator_id: my_id,
            patch,
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(AvailabilityResponse {
        message: ctx
            .locale()
            .translate("availability.updated")
            .map(ToOwned::to_owned),
        availability: days.into_iter().map(Day::from).collect(),
    }))
}

impl AsError for PatchError {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            match self {
                Self::NoDates => PatchCode::NoDates,
                Self::NoFields => PatchCode::NoFields,
                Self::InvertedRange { .. } => PatchCode::InvertedRange,
                Self::TooManyDates => PatchCode::TooManyDates,
                Self::ReservedStatus(_) => PatchCode::ReservedStatus,
                Self::NegativePrice => PatchCode::NegativePrice,
            }
            .into(),
        )
    }
}

impl AsError for command::update_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotPropertyHost { .. } => Some(PropertyError::NotHost.into()),
            Self::Patch(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(PropertyError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum PatchCode {
        #[code = "NO_DATES"]
        #[status = BAD_REQUEST]
        #[message = "No dates to edit"]
        NoDates,

        #[code = "NO_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "No fields to change"]
        NoFields,

        #[code = "INVALID_DATES"]
        #[status = BAD_REQUEST]
        #[message = "Range of dates is invalid"]
        InvertedRange,

        #[code = "TOO_MANY_DATES"]
        #[status = BAD_REQUEST]
        #[message = "Too many dates in a single edit"]
        TooManyDates,

        #[code = "RESERVED_STATUS"]
        #[status = BAD_REQUEST]
        #[message = "Only `available` and `blocked` statuses can be set \
                     manually"]
        ReservedStatus,

        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price cannot be negative"]
        NegativePrice,

        #[code = "INVALID_NOTES"]
        #[status = BAD_REQUEST]
        #[message = "Notes must be at most 500 characters long"]
        InvalidNotes,
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use service::domain::availability::{Patch, Status};

    use crate::AsError as _;

    use super::PatchRequest;

    #[test]
    fn accepts_both_patch_shapes() {
        let dates: PatchRequest = serde_json::from_str(
            r#"{"dates": ["2026-03-01", "2026-03-03"], "price": 150,
                "status": "blocked"}"#,
        )
        .unwrap();
        let Patch::Dates { dates, fields } = dates.into_patch().unwrap()
        else {
            panic!("expected discrete dates");
        };
        assert_eq!(dates.len(), 2);
        assert_eq!(fields.price, Some(Decimal::from(150)));
        assert_eq!(fields.status, Some(Status::Blocked));

        let range: PatchRequest = serde_json::from_str(
            r#"{"start_date": "2026-03-01", "end_date": "2026-03-07",
                "updates": {"requires_approval": true}}"#,
        )
        .unwrap();
        let Patch::Range { first, last, fields } = range.into_patch().unwrap()
        else {
            panic!("expected range");
        };
        assert_eq!(first.to_string(), "2026-03-01");
        assert_eq!(last.to_string(), "2026-03-07");
        assert_eq!(fields.requires_approval, Some(true));
    }

    #[test]
    fn maps_patch_errors_to_codes() {
        let req: PatchRequest = serde_json::from_str(
            r#"{"dates": ["2026-03-01"], "notes": "x"}"#,
        )
        .unwrap();
        assert!(req.into_patch().is_ok());

        let err = service::domain::availability::PatchError::ReservedStatus(
            Status::Booked,
        )
        .as_error();
        assert_eq!(err.code, "RESERVED_STATUS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
