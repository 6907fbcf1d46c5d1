//! [`Amenity`]-related definitions.

use axum::Json;
use serde::Serialize;
use service::{domain, query, Query as _};

use crate::{i18n::Locale, AsError, Context, Error};

/// A feature a property may offer.
#[derive(Clone, Debug, Serialize)]
pub struct Amenity {
    /// ID of this [`Amenity`].
    pub id: domain::amenity::Id,

    /// Translation key of this [`Amenity`].
    pub key: String,

    /// Localized name of this [`Amenity`].
    pub name: String,

    /// Icon of this [`Amenity`].
    pub icon: Option<String>,

    /// Category of this [`Amenity`].
    pub category: domain::amenity::Category,
}

impl Amenity {
    /// Creates a new [`Amenity`] named in the provided [`Locale`].
    #[must_use]
    pub fn new(a: domain::Amenity, locale: Locale) -> Self {
        let name = locale
            .translate(&a.name)
            .map_or_else(|| a.name.clone(), ToOwned::to_owned);
        Self {
            id: a.id,
            key: a.name,
            name,
            icon: a.icon,
            category: a.category,
        }
    }
}

/// Response of [`list()`].
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// All the [`Amenity`]s.
    pub amenities: Vec<Amenity>,
}

/// `GET /amenities`: lists all the [`Amenity`]s.
///
/// # Errors
///
/// If the storage fails.
#[tracing::instrument(skip_all, fields(api.name = "amenities"))]
pub async fn list(ctx: Context) -> Result<Json<ListResponse>, Error> {
    let amenities = ctx
        .service()
        .execute(query::amenity::All::by(()))
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(ListResponse {
        amenities: amenities
            .into_iter()
            .map(|a| Amenity::new(a, ctx.locale()))
            .collect(),
    }))
}

/// Group of [`Amenity`]s sharing the same category.
#[derive(Debug, Serialize)]
pub struct Group {
    /// Category of the [`Amenity`]s.
    pub category: domain::amenity::Category,

    /// [`Amenity`]s of the category.
    pub amenities: Vec<Amenity>,
}

/// Response of [`by_category()`].
#[derive(Debug, Serialize)]
pub struct ByCategoryResponse {
    /// Non-empty [`Group`]s.
    pub categories: Vec<Group>,
}

/// `GET /amenities/by-category`: lists all the [`Amenity`]s grouped by their
/// category.
///
/// # Errors
///
/// If the storage fails.
#[tracing::instrument(skip_all, fields(api.name = "amenities_by_category"))]
pub async fn by_category(
    ctx: Context,
) -> Result<Json<ByCategoryResponse>, Error> {
    let groups = ctx
        .service()
        .execute(query::amenity::Grouped)
        .await
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

    Ok(Json(ByCategoryResponse {
        categories: groups
            .into_iter()
            .map(|(category, amenities)| Group {
                category,
                amenities: amenities
                    .into_iter()
                    .map(|a| Amenity::new(a, ctx.locale()))
                    .collect(),
            })
            .collect(),
    }))
}
