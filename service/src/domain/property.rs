//! [`Property`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{amenity, user};

/// Vacation rental listed by a host.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the [`user::User`] hosting this [`Property`].
    pub host_id: user::Id,

    /// [`Title`] of this [`Property`].
    pub title: Title,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// Street [`Address`] of this [`Property`].
    pub address: Address,

    /// [`City`] this [`Property`] is located in.
    pub city: City,

    /// [`PostalCode`] of this [`Property`].
    pub postal_code: PostalCode,

    /// [`Country`] this [`Property`] is located in.
    pub country: Country,

    /// Geographic [`Location`] of this [`Property`], if known.
    pub location: Option<Location>,

    /// [`Rooms`] of this [`Property`].
    pub rooms: Rooms,

    /// Default nightly price of this [`Property`].
    ///
    /// Used for the generated calendar days only, the actual price of a night
    /// is the one of its calendar day.
    pub base_price: Money,

    /// One-off cleaning fee charged per booking.
    pub cleaning_fee: Money,

    /// [`Status`] of this [`Property`].
    pub status: Status,

    /// IDs of the [`amenity::Amenity`]s this [`Property`] offers.
    pub amenities: Vec<amenity::Id>,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

impl Property {
    /// Indicates whether the provided amount is a valid
    /// [`Property::base_price`].
    #[must_use]
    pub fn is_valid_base_price(amount: Decimal) -> bool {
        amount >= Decimal::ONE && amount <= Decimal::from(100_000)
    }

    /// Indicates whether the provided amount is a valid
    /// [`Property::cleaning_fee`].
    #[must_use]
    pub fn is_valid_cleaning_fee(amount: Decimal) -> bool {
        amount >= Decimal::ZERO && amount <= Decimal::from(10_000)
    }

    /// Indicates whether this [`Property`] can be booked by guests.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.status == Status::Published
    }

    /// Indicates whether this [`Property`] is hosted by the provided
    /// [`user::User`].
    #[must_use]
    pub fn is_hosted_by(&self, user_id: user::Id) -> bool {
        self.host_id == user_id
    }
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Defines a text newtype whose character count is bounded.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        $name:ident($min:literal..=$max:literal)
    ) => {
        #[doc = $doc]
        #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!(
                "Creates a new [`", stringify!($name),
                "`] if the given `text` is valid."
            )]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                Self::check(&text).then_some(Self(text))
            }

            /// Checks whether the given `text` is trimmed and its length is
            /// within bounds.
            fn check(text: &str) -> bool {
                let len = text.chars().count();
                text.trim() == text && ($min..=$max).contains(&len)
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_text! {
    #[doc = "Title of a [`Property`]."]
    Title(3..=255)
}

define_text! {
    #[doc = "Description of a [`Property`]."]
    Description(20..=10_000)
}

define_text! {
    #[doc = "Street address of a [`Property`]."]
    Address(1..=255)
}

define_text! {
    #[doc = "City of a [`Property`]."]
    City(1..=100)
}

define_text! {
    #[doc = "Postal code of a [`Property`]."]
    PostalCode(1..=20)
}

define_text! {
    #[doc = "Country of a [`Property`]."]
    Country(1..=100)
}

/// Geographic location of a [`Property`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Location {
    /// Latitude in degrees.
    latitude: Decimal,

    /// Longitude in degrees.
    longitude: Decimal,
}

impl Location {
    /// Creates a new [`Location`] if the coordinates are within the valid
    /// degree ranges.
    #[must_use]
    pub fn new(latitude: Decimal, longitude: Decimal) -> Option<Self> {
        (latitude.abs() <= Decimal::from(90)
            && longitude.abs() <= Decimal::from(180))
        .then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude of this [`Location`].
    #[must_use]
    pub fn latitude(&self) -> Decimal {
        self.latitude
    }

    /// Returns the longitude of this [`Location`].
    #[must_use]
    pub fn longitude(&self) -> Decimal {
        self.longitude
    }
}

/// Capacity and room counts of a [`Property`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rooms {
    /// Maximum number of guests.
    guest_capacity: u16,

    /// Number of bedrooms.
    bedrooms: u16,

    /// Number of beds.
    beds: u16,

    /// Number of bathrooms, halves allowed.
    bathrooms: Decimal,
}

impl Rooms {
    /// Creates new [`Rooms`] if every count is within its bounds:
    /// - `guest_capacity` in `1..=50`;
    /// - `bedrooms` in `0..=50`;
    /// - `beds` in `1..=100`;
    /// - `bathrooms` in `0..=50`.
    #[must_use]
    pub fn new(
        guest_capacity: u16,
        bedrooms: u16,
        beds: u16,
        bathrooms: Decimal,
    ) -> Option<Self> {
        ((1..=50).contains(&guest_capacity)
            && bedrooms <= 50
            && (1..=100).contains(&beds)
            && bathrooms >= Decimal::ZERO
            && bathrooms <= Decimal::from(50))
        .then_some(Self {
            guest_capacity,
            bedrooms,
            beds,
            bathrooms,
        })
    }

    /// Returns the maximum number of guests.
    #[must_use]
    pub fn guest_capacity(&self) -> u16 {
        self.guest_capacity
    }

    /// Returns the number of bedrooms.
    #[must_use]
    pub fn bedrooms(&self) -> u16 {
        self.bedrooms
    }

    /// Returns the number of beds.
    #[must_use]
    pub fn beds(&self) -> u16 {
        self.beds
    }

    /// Returns the number of bathrooms.
    #[must_use]
    pub fn bathrooms(&self) -> Decimal {
        self.bathrooms
    }
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "A detached house."]
        House = 1,

        #[doc = "An apartment in a building."]
        Apartment = 2,

        #[doc = "A small country house."]
        Cottage = 3,

        #[doc = "A villa."]
        Villa = 4,

        #[doc = "A single room."]
        Room = 5,

        #[doc = "Anything else."]
        Other = 6,
    }
}

define_kind! {
    #[doc = "Listing status of a [`Property`]."]
    enum Status {
        #[doc = "Being prepared, not visible to guests."]
        Draft = 1,

        #[doc = "Visible to guests and bookable."]
        Published = 2,

        #[doc = "Temporarily hidden from guests."]
        Unpublished = 3,

        #[doc = "Retired for good."]
        Archived = 4,
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Description, Location, Property, Rooms, Title};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn bounds_texts() {
        assert!(Title::new("Loft").is_some());
        assert!(Title::new("Lo").is_none());
        assert!(Title::new(" Loft").is_none());
        assert!(Title::new("x".repeat(256)).is_none());

        assert!(Description::new("Bright loft next to the river.").is_some());
        assert!(Description::new("Too short.").is_none());
    }

    #[test]
    fn bounds_rooms() {
        assert!(Rooms::new(4, 2, 3, decimal("1.5")).is_some());
        assert!(Rooms::new(1, 0, 1, Decimal::ZERO).is_some());
        assert!(Rooms::new(0, 1, 1, Decimal::ONE).is_none());
        assert!(Rooms::new(51, 1, 1, Decimal::ONE).is_none());
        assert!(Rooms::new(2, 51, 1, Decimal::ONE).is_none());
        assert!(Rooms::new(2, 1, 0, Decimal::ONE).is_none());
        assert!(Rooms::new(2, 1, 101, Decimal::ONE).is_none());
        assert!(Rooms::new(2, 1, 1, decimal("-1")).is_none());
        assert!(Rooms::new(2, 1, 1, decimal("50.5")).is_none());
    }

    #[test]
    fn bounds_prices_and_location() {
        assert!(Property::is_valid_base_price(decimal("1")));
        assert!(Property::is_valid_base_price(decimal("100000")));
        assert!(!Property::is_valid_base_price(decimal("0.99")));
        assert!(!Property::is_valid_base_price(decimal("100000.01")));

        assert!(Property::is_valid_cleaning_fee(Decimal::ZERO));
        assert!(!Property::is_valid_cleaning_fee(decimal("10000.5")));

        assert!(Location::new(decimal("52.52"), decimal("13.405")).is_some());
        assert!(Location::new(decimal("90.1"), Decimal::ZERO).is_none());
        assert!(Location::new(Decimal::ZERO, decimal("-180.5")).is_none());
    }
}
