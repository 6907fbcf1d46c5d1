//! [`Property`]-related read definitions.

#[cfg(doc)]
use crate::domain::Property;

pub mod search {
    //! [`Property`] search definitions.

    use common::{define_pagination, DateRange};
    use rust_decimal::Decimal;

    use crate::domain::{amenity, property, Property};

    define_pagination!(Property, Filter);

    /// Geographic bounding box.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Bounds {
        /// Northern latitude.
        pub north: Decimal,

        /// Southern latitude.
        pub south: Decimal,

        /// Eastern longitude.
        pub east: Decimal,

        /// Western longitude.
        pub west: Decimal,
    }

    /// Filter for [`Selector`].
    ///
    /// Every provided criterion must hold. Only published [`Property`]s are
    /// ever matched.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Part of the [`property::City`] to search for.
        pub city: Option<String>,

        /// Minimal guest capacity.
        pub guests: Option<u16>,

        /// [`property::Kind`] to search for.
        pub kind: Option<property::Kind>,

        /// Minimal number of bedrooms.
        pub bedrooms: Option<u16>,

        /// Minimal number of bathrooms.
        pub bathrooms: Option<Decimal>,

        /// Minimal [`Property::base_price`].
        pub min_price: Option<Decimal>,

        /// Maximal [`Property::base_price`].
        pub max_price: Option<Decimal>,

        /// [`Bounds`] the [`Property`] must be located in.
        pub bounds: Option<Bounds>,

        /// [`amenity::Amenity`]s the [`Property`] must offer all of.
        pub amenities: Vec<amenity::Id>,

        /// Stay every night of which must be bookable.
        pub stay: Option<DateRange>,

        /// Indicator whether no night of the [`Filter::stay`] may require the
        /// host's approval.
        pub instant_book: bool,
    }

    impl Filter {
        /// Indicates whether the provided [`Property`] passes the criteria of
        /// this [`Filter`] that don't depend on its calendar.
        #[must_use]
        pub fn matches(&self, p: &Property) -> bool {
            let rooms = p.rooms;
            let in_bounds = match (self.bounds, p.location) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(b), Some(l)) => {
                    (b.south..=b.north).contains(&l.latitude())
                        && (b.west..=b.east).contains(&l.longitude())
                }
            };

            p.is_bookable()
                && in_bounds
                && self.city.as_ref().is_none_or(|c| {
                    AsRef::<str>::as_ref(&p.city)
                        .to_lowercase()
                        .contains(&c.to_lowercase())
                })
                && self.guests.is_none_or(|g| rooms.guest_capacity() >= g)
                && self.kind.is_none_or(|k| p.kind == k)
                && self.bedrooms.is_none_or(|n| rooms.bedrooms() >= n)
                && self.bathrooms.is_none_or(|n| rooms.bathrooms() >= n)
                && self.min_price.is_none_or(|m| p.base_price.amount >= m)
                && self.max_price.is_none_or(|m| p.base_price.amount <= m)
                && self.amenities.iter().all(|a| p.amenities.contains(a))
        }
    }

    #[cfg(test)]
    mod spec {
        use common::{money::Currency, Money};
        use rust_decimal::Decimal;

        use crate::domain::{amenity, property, user, Property};

        use super::{Bounds, Filter};

        fn property() -> Property {
            Property {
                id: property::Id::new(),
                host_id: user::Id::new(),
                title: property::Title::new("Riverside loft").unwrap(),
                description: property::Description::new(
                    "Bright loft right next to the river.",
                )
                .unwrap(),
                kind: property::Kind::Apartment,
                address: property::Address::new("Uferstr. 1").unwrap(),
                city: property::City::new("Berlin").unwrap(),
                postal_code: property::PostalCode::new("10115").unwrap(),
                country: property::Country::new("Germany").unwrap(),
                location: property::Location::new(
                    "52.52".parse().unwrap(),
                    "13.40".parse().unwrap(),
                ),
                rooms: property::Rooms::new(4, 2, 3, Decimal::ONE).unwrap(),
                base_price: Money::new(Decimal::from(180), Currency::Eur),
                cleaning_fee: Money::new(Decimal::from(40), Currency::Eur),
                status: property::Status::Published,
                amenities: vec![amenity::Id::from(1), amenity::Id::from(3)],
                created_at: property::CreationDateTime::now(),
                updated_at: property::ModificationDateTime::now(),
            }
        }

        #[test]
        fn matches_all_criteria() {
            let p = property();

            assert!(Filter::default().matches(&p));
            assert!(Filter {
                city: Some("berl".into()),
                guests: Some(4),
                kind: Some(property::Kind::Apartment),
                bedrooms: Some(2),
                bathrooms: Some(Decimal::ONE),
                min_price: Some(Decimal::from(100)),
                max_price: Some(Decimal::from(180)),
                amenities: vec![amenity::Id::from(3)],
                ..Filter::default()
            }
            .matches(&p));
        }

        #[test]
        fn rejects_any_failing_criterion() {
            let p = property();

            for f in [
                Filter {
                    city: Some("Hamburg".into()),
                    ..Filter::default()
                },
                Filter {
                    guests: Some(5),
                    ..Filter::default()
                },
                Filter {
                    kind: Some(property::Kind::Villa),
                    ..Filter::default()
                },
                Filter {
                    max_price: Some(Decimal::from(179)),
                    ..Filter::default()
                },
                Filter {
                    amenities: vec![amenity::Id::from(1), amenity::Id::from(2)],
                    ..Filter::default()
                },
            ] {
                assert!(!f.matches(&p), "{f:?}");
            }

            let draft = Property {
                status: property::Status::Draft,
                ..property()
            };
            assert!(!Filter::default().matches(&draft));
        }

        #[test]
        fn bounds_location() {
            let p = property();
            let berlin = Bounds {
                north: Decimal::from(53),
                south: Decimal::from(52),
                east: Decimal::from(14),
                west: Decimal::from(13),
            };
            let munich = Bounds {
                north: Decimal::from(49),
                south: Decimal::from(48),
                east: Decimal::from(12),
                west: Decimal::from(11),
            };

            let within = |bounds| Filter {
                bounds: Some(bounds),
                ..Filter::default()
            };
            assert!(within(berlin).matches(&p));
            assert!(!within(munich).matches(&p));
            assert!(!within(berlin).matches(&Property {
                location: None,
                ..property()
            }));
        }
    }
}
