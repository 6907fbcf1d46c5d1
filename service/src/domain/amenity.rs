//! [`Amenity`] definitions.

use common::define_kind;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Feature a property may offer to its guests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Amenity {
    /// ID of this [`Amenity`].
    pub id: Id,

    /// Translation key naming this [`Amenity`] (e.g. `amenity.wifi`).
    pub name: String,

    /// Icon of this [`Amenity`], if any.
    pub icon: Option<String>,

    /// [`Category`] of this [`Amenity`].
    pub category: Category,
}

/// ID of an [`Amenity`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

define_kind! {
    #[doc = "Category grouping [`Amenity`]s."]
    enum Category {
        #[doc = "Basic items every stay needs."]
        Essentials = 1,

        #[doc = "Extra equipment of a property."]
        Features = 2,

        #[doc = "Surroundings of a property."]
        Location = 3,

        #[doc = "Safety equipment."]
        Safety = 4,

        #[doc = "Accessibility features."]
        Accessibility = 5,
    }
}
