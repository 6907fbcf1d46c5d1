//! [`Property`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use common::{pagination::Arguments, DateRange, DateTime};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, amenity, property},
    query,
    read::property::search,
};

use crate::{
    api::{Money, PropertyError, ValidationError},
    define_error, AsError, Context, Error,
};

/// A listed property.
#[derive(Clone, Debug, Serialize)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: property::Id,

    /// ID of the host of this [`Property`].
    pub host_id: domain::user::Id,

    /// Title of this [`Property`].
    pub title: String,

    /// Description of this [`Property`].
    pub description: String,

    /// Kind of this [`Property`].
    pub property_type: property::Kind,

    /// Street address of this [`Property`].
    pub address: String,

    /// City of this [`Property`].
    pub city: String,

    /// Postal code of this [`Property`].
    pub postal_code: String,

    /// Country of this [`Property`].
    pub country: String,

    /// Latitude of this [`Property`].
    pub latitude: Option<Decimal>,

    /// Longitude of this [`Property`].
    pub longitude: Option<Decimal>,

    /// Maximum number of guests.
    pub guest_capacity: u16,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of beds.
    pub beds: u16,

    /// Number of bathrooms.
    pub bathrooms: Decimal,

    /// Default nightly price.
    pub base_price: Money,

    /// Flat cleaning fee per stay.
    pub cleaning_fee: Money,

    /// Listing status of this [`Property`].
    pub status: property::Status,

    /// IDs of the amenities of this [`Property`].
    pub amenities: Vec<amenity::Id>,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: DateTime,

    /// [`DateTime`] when this [`Property`] was last updated.
    pub updated_at: DateTime,
}

impl From<domain::Property> for Property {
    fn from(p: domain::Property) -> Self {
        Self {
            id: p.id,
            host_id: p.host_id,
            title: p.title.to_string(),
            description: p.description.to_string(),
            property_type: p.kind,
            address: p.address.to_string(),
            city: p.city.to_string(),
            postal_code: p.postal_code.to_string(),
            country: p.country.to_string(),
            latitude: p.location.map(|l| l.latitude()),
            longitude: p.location.map(|l| l.longitude()),
            guest_capacity: p.rooms.guest_capacity(),
            bedrooms: p.rooms.bedrooms(),
            beds: p.rooms.beds(),
            bathrooms: p.rooms.bathrooms(),
            base_price: p.base_price.into(),
            cleaning_fee: p.cleaning_fee.into(),
            status: p.status,
            amenities: p.amenities,
            created_at: p.created_at.coerce(),
            updated_at: p.updated_at.coerce(),
        }
    }
}

/// Response carrying a single [`Property`].
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    /// Localized outcome message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The [`Property`].
    pub property: Property,
}

/// Request body of [`create()`].
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Title of the new property.
    pub title: String,

    /// Description of the new property.
    pub description: String,

    /// Kind of the new property.
    pub property_type: property::Kind,

    /// Street address of the new property.
    pub address: String,

    /// City of the new property.
    pub city: String,

    /// Postal code of the new property.
    pub postal_code: String,

    /// Country of the new property.
    #[serde(default = "default_country")]
    pub country: String,

    /// Latitude of the new property.
    pub latitude: Option<Decimal>,

    /// Longitude of the new property.
    pub longitude: Option<Decimal>,

    /// Maximum number of guests.
    pub guest_capacity: u16,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of beds.
    pub beds: u16,

    /// Number of bathrooms.
    pub bathrooms: Decimal,

    /// Default nightly price.
    pub base_price: Decimal,

    /// Flat cleaning fee per stay.
    #[serde(default)]
    pub cleaning_fee: Decimal,

    /// Initial listing status.
    pub status: Option<property::Status>,

    /// IDs of the amenities.
    #[serde(default)]
    pub amenities: Vec<amenity::Id>,
}

/// Country of a property, if none is provided.
fn default_country() -> String {
    "Germany".into()
}

/// `POST /properties`: lists a new property of the authenticated host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the body is invalid.
/// - If the authenticated user is not a host.
#[tracing::instrument(skip_all, fields(api.name = "create_property"))]
pub async fn create(
    ctx: Context,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PropertyResponse>), Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;

    let cmd = command::CreateProperty {
        host_id: my_id,
        title: parse(property::Title::new(req.title), Invalid::Title)
            .map_err(ctx.error())?,
        description: parse(
            property::Description::new(req.description),
            Invalid::Description,
        )
        .map_err(ctx.error())?,
        kind: req.property_type,
        address: parse(property::Address::new(req.address), Invalid::Address)
            .map_err(ctx.error())?,
        city: parse(property::City::new(req.city), Invalid::Address)
            .map_err(ctx.error())?,
        postal_code: parse(
            property::PostalCode::new(req.postal_code),
            Invalid::Address,
        )
        .map_err(ctx.error())?,
        country: parse(property::Country::new(req.country), Invalid::Address)
            .map_err(ctx.error())?,
        location: location(req.latitude, req.longitude)
            .map_err(ctx.error())?,
        rooms: parse(
            property::Rooms::new(
                req.guest_capacity,
                req.bedrooms,
                req.beds,
                req.bathrooms,
            ),
            Invalid::Rooms,
        )
        .map_err(ctx.error())?,
        base_price: req.base_price,
        cleaning_fee: req.cleaning_fee,
        status: req.status,
        amenities: req.amenities,
    };

    let property = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok((
        StatusCode::CREATED,
        Json(PropertyResponse {
            message: ctx
                .locale()
                .translate("property.created")
                .map(ToOwned::to_owned),
            property: property.into(),
        }),
    ))
}

/// Request body of [`update()`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// New title.
    pub title: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New kind.
    pub property_type: Option<property::Kind>,

    /// New street address.
    pub address: Option<String>,

    /// New city.
    pub city: Option<String>,

    /// New postal code.
    pub postal_code: Option<String>,

    /// New country.
    pub country: Option<String>,

    /// New latitude.
    pub latitude: Option<Decimal>,

    /// New longitude.
    pub longitude: Option<Decimal>,

    /// New maximum number of guests.
    pub guest_capacity: Option<u16>,

    /// New number of bedrooms.
    pub bedrooms: Option<u16>,

    /// New number of beds.
    pub beds: Option<u16>,

    /// New number of bathrooms.
    pub bathrooms: Option<Decimal>,

    /// New default nightly price.
    pub base_price: Option<Decimal>,

    /// New cleaning fee.
    pub cleaning_fee: Option<Decimal>,

    /// New listing status.
    pub status: Option<property::Status>,

    /// New set of amenity IDs.
    pub amenities: Option<Vec<amenity::Id>>,
}

/// `PUT /properties/:id`: partially updates a property of the authenticated
/// host.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the property doesn't exist or isn't hosted by the authenticated user.
/// - If the body is invalid.
#[tracing::instrument(skip_all, fields(api.name = "update_property"))]
pub async fn update(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<PropertyResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;
    let Json(req) = body.map_err(AsError::into_error).map_err(ctx.error())?;

    let current = fetch(&ctx, property_id).await?;
    if !current.is_hosted_by(my_id) {
        return Err(ctx.error()(PropertyError::NotHost.into()));
    }

    let rooms = if req.guest_capacity.is_some()
        || req.bedrooms.is_some()
        || req.beds.is_some()
        || req.bathrooms.is_some()
    {
        let r = current.rooms;
        Some(
            parse(
                property::Rooms::new(
                    req.guest_capacity.unwrap_or(r.guest_capacity()),
                    req.bedrooms.unwrap_or(r.bedrooms()),
                    req.beds.unwrap_or(r.beds()),
                    req.bathrooms.unwrap_or(r.bathrooms()),
                ),
                Invalid::Rooms,
            )
            .map_err(ctx.error())?,
        )
    } else {
        None
    };
    let location = match (req.latitude, req.longitude) {
        (None, None) => None,
        (lat, lon) => location(
            lat.or(current.location.map(|l| l.latitude())),
            lon.or(current.location.map(|l| l.longitude())),
        )
        .map_err(ctx.error())?,
    };

    let cmd = command::UpdateProperty {
        property_id,
        initiator_id: my_id,
        title: req
            .title
            .map(|t| parse(property::Title::new(t), Invalid::Title))
            .transpose()
            .map_err(ctx.error())?,
        description: req
            .description
            .map(|d| parse(property::Description::new(d), Invalid::Description))
            .transpose()
            .map_err(ctx.error())?,
        kind: req.property_type,
        address: req
            .address
            .map(|a| parse(property::Address::new(a), Invalid::Address))
            .transpose()
            .map_err(ctx.error())?,
        city: req
            .city
            .map(|c| parse(property::City::new(c), Invalid::Address))
            .transpose()
            .map_err(ctx.error())?,
        postal_code: req
            .postal_code
            .map(|c| parse(property::PostalCode::new(c), Invalid::Address))
            .transpose()
            .map_err(ctx.error())?,
        country: req
            .country
            .map(|c| parse(property::Country::new(c), Invalid::Address))
            .transpose()
            .map_err(ctx.error())?,
        location,
        rooms,
        base_price: req.base_price,
        cleaning_fee: req.cleaning_fee,
        status: req.status,
        amenities: req.amenities,
    };

    let property = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(PropertyResponse {
        message: ctx
            .locale()
            .translate("property.updated")
            .map(ToOwned::to_owned),
        property: property.into(),
    }))
}

/// `DELETE /properties/:id`: archives a property of the authenticated host.
///
/// Archived properties keep their calendar and bookings, but can't be booked
/// or found anymore.
///
/// # Errors
///
/// - If the request is not authorized.
/// - If the property doesn't exist or isn't hosted by the authenticated user.
#[tracing::instrument(skip_all, fields(api.name = "archive_property"))]
pub async fn archive(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<Json<PropertyResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;

    let property = ctx
        .service()
        .execute(command::UpdateProperty {
            property_id,
            initiator_id: my_id,
            status: Some(property::Status::Archived),
            ..command::UpdateProperty::default()
        })
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(PropertyResponse {
        message: ctx
            .locale()
            .translate("property.archived")
            .map(ToOwned::to_owned),
        property: property.into(),
    }))
}

/// `GET /properties/:id`: returns a single property.
///
/// # Errors
///
/// If the property doesn't exist.
#[tracing::instrument(skip_all, fields(api.name = "property"))]
pub async fn get(
    ctx: Context,
    id: Result<Path<property::Id>, PathRejection>,
) -> Result<Json<PropertyResponse>, Error> {
    let Path(property_id) =
        id.map_err(AsError::into_error).map_err(ctx.error())?;

    Ok(Json(PropertyResponse {
        message: None,
        property: fetch(&ctx, property_id).await?.into(),
    }))
}

/// Query parameters of [`mine()`].
#[derive(Debug, Default, Deserialize)]
pub struct MineParams {
    /// Status to filter the properties by.
    pub status: Option<property::Status>,
}

/// Response of [`mine()`].
#[derive(Debug, Serialize)]
pub struct MineResponse {
    /// Properties of the authenticated host.
    pub properties: Vec<Property>,

    /// Number of the returned properties.
    pub count: usize,
}

/// `GET /properties/host/my-properties`: lists the properties of the
/// authenticated host.
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(api.name = "my_properties"))]
pub async fn mine(
    ctx: Context,
    params: Result<Query<MineParams>, QueryRejection>,
) -> Result<Json<MineResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;
    let Query(MineParams { status }) =
        params.map_err(AsError::into_error).map_err(ctx.error())?;

    let properties = ctx
        .service()
        .execute(query::property::ByHost::by(my_id))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?
        .into_iter()
        .filter(|p| status.is_none_or(|s| p.status == s))
        .map(Property::from)
        .collect::<Vec<_>>();

    Ok(Json(MineResponse {
        count: properties.len(),
        properties,
    }))
}

/// Query parameters of [`search()`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Substring of the city.
    pub city: Option<String>,

    /// First night of the stay.
    pub check_in: Option<common::Date>,

    /// Day of departure.
    pub check_out: Option<common::Date>,

    /// Number of guests to host.
    pub guests: Option<u16>,

    /// Minimum base price.
    pub min_price: Option<Decimal>,

    /// Maximum base price.
    pub max_price: Option<Decimal>,

    /// Kind of the property.
    pub property_type: Option<property::Kind>,

    /// Comma-separated IDs of the required amenities.
    pub amenities: Option<String>,

    /// Whether every night must be bookable without approval.
    #[serde(default)]
    pub instant_book: bool,

    /// Minimum number of bedrooms.
    pub bedrooms: Option<u16>,

    /// Minimum number of bathrooms.
    pub bathrooms: Option<Decimal>,

    /// Northern latitude bound.
    pub north: Option<Decimal>,

    /// Southern latitude bound.
    pub south: Option<Decimal>,

    /// Eastern longitude bound.
    pub east: Option<Decimal>,

    /// Western longitude bound.
    pub west: Option<Decimal>,

    /// Requested page, starting from 1.
    pub page: Option<u32>,

    /// Maximum number of properties on the page.
    pub limit: Option<u32>,
}

impl SearchParams {
    /// Converts these [`SearchParams`] into a [`search::Selector`].
    ///
    /// # Errors
    ///
    /// If some of the parameters are invalid.
    pub fn into_selector(self) -> Result<search::Selector, Error> {
        let arguments = Arguments::new(self.page, self.limit)
            .ok_or(ValidationError::InvalidPagination)?;

        let stay = match (self.check_in, self.check_out) {
            (None, None) => None,
            (Some(check_in), Some(check_out)) => Some(
                DateRange::new(check_in, check_out)
                    .filter(|r| r.nights() > 0)
                    .ok_or(ValidationError::InvalidDates)?,
            ),
            _ => return Err(ValidationError::InvalidDates.into()),
        };

        let bounds = match (self.north, self.south, self.east, self.west) {
            (None, None, None, None) => None,
            (Some(north), Some(south), Some(east), Some(west))
                if south <= north && west <= east =>
            {
                Some(search::Bounds {
                    north,
                    south,
                    east,
                    west,
                })
            }
            _ => return Err(Invalid::Bounds.into()),
        };

        let amenities = self
            .amenities
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<amenity::Id>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|_| crate::error::RequestError::InvalidParameters)?
            .unwrap_or_default();

        Ok(search::Selector {
            arguments,
            filter: search::Filter {
                city: self.city.filter(|c| !c.trim().is_empty()),
                guests: self.guests,
                kind: self.property_type,
                bedrooms: self.bedrooms,
                bathrooms: self.bathrooms,
                min_price: self.min_price,
                max_price: self.max_price,
                bounds,
                amenities,
                stay,
                instant_book: self.instant_book,
            },
        })
    }
}

/// Pagination details of a [`SearchResponse`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Number of the page.
    pub page: u32,

    /// Maximum number of items on the page.
    pub limit: u32,

    /// Total number of the matching items.
    pub total: u64,

    /// Total number of pages.
    pub total_pages: u64,
}

/// Response of [`search()`].
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Properties on the requested page.
    pub properties: Vec<Property>,

    /// [`Pagination`] details.
    pub pagination: Pagination,
}

/// `GET /properties/search`: searches the published properties.
///
/// # Errors
///
/// If the query parameters are invalid.
#[tracing::instrument(skip_all, fields(api.name = "search_properties"))]
pub async fn search(
    ctx: Context,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, Error> {
    let Query(params) =
        params.map_err(AsError::into_error).map_err(ctx.error())?;
    let selector = params.into_selector().map_err(ctx.error())?;

    let page = ctx
        .service()
        .execute(query::property::Search::by(selector))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(SearchResponse {
        pagination: Pagination {
            page: page.arguments.page(),
            limit: page.arguments.limit(),
            total: page.total,
            total_pages: page.total_pages(),
        },
        properties: page.items.into_iter().map(Property::from).collect(),
    }))
}

/// Fetches an existing [`domain::Property`].
async fn fetch(
    ctx: &Context,
    id: property::Id,
) -> Result<domain::Property, Error> {
    ctx.service()
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?
        .ok_or_else(|| PropertyError::NotExists.into())
        .map_err(ctx.error())
}

/// Converts a parsed value into a [`Result`].
fn parse<T>(value: Option<T>, err: Invalid) -> Result<T, Error> {
    value.ok_or_else(|| err.into())
}

/// Builds an optional [`property::Location`] out of its coordinates.
fn location(
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
) -> Result<Option<property::Location>, Error> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            parse(property::Location::new(lat, lon), Invalid::Location)
                .map(Some)
        }
        _ => Err(Invalid::Location.into()),
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AmenityNotExists(_) => Some(Invalid::Amenity.into()),
            Self::CalendarOutOfRange => None,
            Self::InvalidBasePrice(_) => Some(Invalid::BasePrice.into()),
            Self::InvalidCleaningFee(_) => Some(Invalid::CleaningFee.into()),
            Self::UserNotHost(_) => Some(HostError::NotHost.into()),
            Self::UserNotExists(_) => {
                Some(crate::context::AuthError::InvalidToken.into())
            }
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AmenityNotExists(_) => Some(Invalid::Amenity.into()),
            Self::InvalidBasePrice(_) => Some(Invalid::BasePrice.into()),
            Self::InvalidCleaningFee(_) => Some(Invalid::CleaningFee.into()),
            Self::NotPropertyHost { .. } => Some(PropertyError::NotHost.into()),
            Self::PropertyNotExists(_) => {
                Some(PropertyError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum Invalid {
        #[code = "INVALID_TITLE"]
        #[status = BAD_REQUEST]
        #[message = "Title must be 3 to 255 characters long"]
        Title,

        #[code = "INVALID_DESCRIPTION"]
        #[status = BAD_REQUEST]
        #[message = "Description must be 20 to 10000 characters long"]
        Description,

        #[code = "INVALID_ADDRESS"]
        #[status = BAD_REQUEST]
        #[message = "Address, city, postal code and country must be \
                     non-empty"]
        Address,

        #[code = "INVALID_LOCATION"]
        #[status = BAD_REQUEST]
        #[message = "Latitude and longitude must be provided together and \
                     be within bounds"]
        Location,

        #[code = "INVALID_ROOMS"]
        #[status = BAD_REQUEST]
        #[message = "Capacity, bedrooms, beds or bathrooms are out of bounds"]
        Rooms,

        #[code = "INVALID_BASE_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Base price must be within 1..=100000"]
        BasePrice,

        #[code = "INVALID_CLEANING_FEE"]
        #[status = BAD_REQUEST]
        #[message = "Cleaning fee must be within 0..=10000"]
        CleaningFee,

        #[code = "AMENITY_NOT_EXISTS"]
        #[status = BAD_REQUEST]
        #[message = "Some of the amenities do not exist"]
        Amenity,

        #[code = "INVALID_BOUNDS"]
        #[status = BAD_REQUEST]
        #[message = "Bounds require north, south, east and west, with south \
                     not above north and west not beyond east"]
        Bounds,
    }
}

define_error! {
    enum HostError {
        #[code = "USER_NOT_HOST"]
        #[status = FORBIDDEN]
        #[message = "Only hosts may list properties"]
        NotHost,
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use rust_decimal::Decimal;
    use service::domain::{amenity, property};

    use super::SearchParams;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn builds_search_selector() {
        let selector = SearchParams {
            city: Some("berlin".into()),
            check_in: Some(date("2026-03-01")),
            check_out: Some(date("2026-03-04")),
            guests: Some(2),
            property_type: Some(property::Kind::Apartment),
            amenities: Some("1, 3".into()),
            instant_book: true,
            page: Some(2),
            limit: Some(10),
            ..SearchParams::default()
        }
        .into_selector()
        .unwrap();

        assert_eq!(selector.arguments.page(), 2);
        assert_eq!(selector.arguments.limit(), 10);
        assert_eq!(selector.filter.stay.unwrap().nights(), 3);
        assert_eq!(
            selector.filter.amenities,
            [amenity::Id::from(1), amenity::Id::from(3)],
        );
        assert!(selector.filter.instant_book);
        assert!(selector.filter.bounds.is_none());
    }

    #[test]
    fn rejects_invalid_search_params() {
        let cases = [
            (
                SearchParams {
                    check_in: Some(date("2026-03-01")),
                    ..SearchParams::default()
                },
                "INVALID_DATES",
            ),
            (
                SearchParams {
                    check_in: Some(date("2026-03-04")),
                    check_out: Some(date("2026-03-04")),
                    ..SearchParams::default()
                },
                "INVALID_DATES",
            ),
            (
                SearchParams {
                    limit: Some(101),
                    ..SearchParams::default()
                },
                "INVALID_PAGINATION",
            ),
            (
                SearchParams {
                    north: Some(Decimal::from(52)),
                    south: Some(Decimal::from(53)),
                    east: Some(Decimal::from(14)),
                    west: Some(Decimal::from(13)),
                    ..SearchParams::default()
                },
                "INVALID_BOUNDS",
            ),
            (
                SearchParams {
                    amenities: Some("1,wifi".into()),
                    ..SearchParams::default()
                },
                "INVALID_PARAMETERS",
            ),
        ];

        for (params, code) in cases {
            let err = params.into_selector().unwrap_err();
            assert_eq!(err.code, code);
        }
    }
}
