//! [`Command`] for updating an existing [`Property`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{amenity, property, user, Amenity, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Property`] by its host.
///
/// [`None`] fields are left unchanged. Changing the base price doesn't touch
/// the prices of the already generated calendar days.
#[derive(Clone, Debug, Default)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub property_id: property::Id,

    /// ID of the [`user::User`] performing the update.
    pub initiator_id: user::Id,

    /// New [`property::Title`].
    pub title: Option<property::Title>,

    /// New [`property::Description`].
    pub description: Option<property::Description>,

    /// New [`property::Kind`].
    pub kind: Option<property::Kind>,

    /// New [`property::Address`].
    pub address: Option<property::Address>,

    /// New [`property::City`].
    pub city: Option<property::City>,

    /// New [`property::PostalCode`].
    pub postal_code: Option<property::PostalCode>,

    /// New [`property::Country`].
    pub country: Option<property::Country>,

    /// New [`property::Location`].
    pub location: Option<property::Location>,

    /// New [`property::Rooms`].
    pub rooms: Option<property::Rooms>,

    /// New default nightly price.
    pub base_price: Option<Decimal>,

    /// New cleaning fee.
    pub cleaning_fee: Option<Decimal>,

    /// New [`property::Status`].
    pub status: Option<property::Status>,

    /// New set of [`Amenity`] IDs, replacing the current one.
    pub amenities: Option<Vec<amenity::Id>>,
}

impl<Db, Ml> Command<UpdateProperty> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Vec<Amenity>, ()>>,
            Ok = Vec<Amenity>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            property_id,
            initiator_id,
            title,
            description,
            kind,
            address,
            city,
            postal_code,
            country,
            location,
            rooms,
            base_price,
            cleaning_fee,
            status,
            mut amenities,
        } = cmd;

        if let Some(price) =
            base_price.filter(|p| !Property::is_valid_base_price(*p))
        {
            return Err(tracerr::new!(E::InvalidBasePrice(price)));
        }
        if let Some(fee) =
            cleaning_fee.filter(|f| !Property::is_valid_cleaning_fee(*f))
        {
            return Err(tracerr::new!(E::InvalidCleaningFee(fee)));
        }

        if let Some(ids) = amenities.as_mut().filter(|ids| !ids.is_empty()) {
            ids.sort_unstable();
            ids.dedup();

            let known = self
                .database()
                .execute(Select(By::<Vec<Amenity>, _>::new(())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(id) =
                ids.iter().find(|id| !known.iter().any(|a| a.id == **id))
            {
                return Err(tracerr::new!(E::AmenityNotExists(*id)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent updates of the same `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        if !property.is_hosted_by(initiator_id) {
            return Err(tracerr::new!(E::NotPropertyHost {
                user_id: initiator_id,
                property_id,
            }));
        }

        if let Some(v) = title {
            property.title = v;
        }
        if let Some(v) = description {
            property.description = v;
        }
        if let Some(v) = kind {
            property.kind = v;
        }
        if let Some(v) = address {
            property.address = v;
        }
        if let Some(v) = city {
            property.city = v;
        }
        if let Some(v) = postal_code {
            property.postal_code = v;
        }
        if let Some(v) = country {
            property.country = v;
        }
        if let Some(v) = location {
            property.location = Some(v);
        }
        if let Some(v) = rooms {
            property.rooms = v;
        }
        if let Some(v) = base_price {
            property.base_price = Money::new(v, property.base_price.currency);
        }
        if let Some(v) = cleaning_fee {
            property.cleaning_fee =
                Money::new(v, property.cleaning_fee.currency);
        }
        if let Some(v) = status {
            property.status = v;
        }
        if let Some(v) = amenities {
            property.amenities = v;
        }
        property.updated_at = DateTime::now().coerce();

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Property(id: {property_id})` updated");

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Base price is out of bounds.
    #[display("Base price `{_0}` is out of bounds")]
    InvalidBasePrice(#[error(not(source))] Decimal),

    /// Cleaning fee is out of bounds.
    #[display("Cleaning fee `{_0}` is out of bounds")]
    InvalidCleaningFee(#[error(not(source))] Decimal),

    /// [`user::User`] doesn't host the [`Property`].
    #[display("`User(id: {user_id})` doesn't host `Property(id: {property_id})`")]
    NotPropertyHost {
        /// ID of the [`user::User`].
        user_id: user::Id,

        /// ID of the [`Property`].
        property_id: property::Id,
    },

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::create_booking,
        domain::{amenity, booking, property},
        query::{self, Query as _},
        read::property::search::{Arguments, Filter, Selector},
        tests::Scenario,
        Command as _,
    };

    use super::{ExecutionError, UpdateProperty};

    #[tokio::test]
    async fn updates_given_fields_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let updated = s
            .service
            .execute(UpdateProperty {
                property_id: property.id,
                initiator_id: s.host.id,
                title: Some(property::Title::new("Quiet loft").unwrap()),
                base_price: Some(Decimal::from(250)),
                status: Some(property::Status::Unpublished),
                amenities: Some(vec![amenity::Id::from(2)]),
                ..UpdateProperty::default()
            })
            .await
            .unwrap();

        assert_eq!(AsRef::<str>::as_ref(&updated.title), "Quiet loft");
        assert_eq!(updated.base_price.amount, Decimal::from(250));
        assert_eq!(updated.status, property::Status::Unpublished);
        assert_eq!(updated.amenities, vec![amenity::Id::from(2)]);
        assert_eq!(updated.description, property.description);
        assert_eq!(updated.cleaning_fee, property.cleaning_fee);

        let days = s.days(&property, 0, 3).await;
        assert!(days.iter().all(|d| d.price == property.base_price.amount));
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let err = s
            .service
            .execute(UpdateProperty {
                property_id: property.id,
                initiator_id: s.other_host.id,
                status: Some(property::Status::Archived),
                ..UpdateProperty::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotPropertyHost { .. },
        ));
    }

    #[tokio::test]
    async fn archives_keeping_bookings() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let booking = s.book(&property, 1, 3).await;

        let archived = s
            .service
            .execute(UpdateProperty {
                property_id: property.id,
                initiator_id: s.host.id,
                status: Some(property::Status::Archived),
                ..UpdateProperty::default()
            })
            .await
            .unwrap();

        assert_eq!(archived.status, property::Status::Archived);
        assert_eq!(
            s.booking(booking.id).await.status,
            booking::Status::Confirmed,
        );
        assert_eq!(s.days(&property, 0, 5).await.len(), 5);

        let err = s.try_book(&property, 5, 7).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            create_booking::ExecutionError::PropertyNotBookable(id)
                if *id == property.id,
        ));

        let found = s
            .service
            .execute(query::property::Search::by(Selector {
                arguments: Arguments::default(),
                filter: Filter::default(),
            }))
            .await
            .unwrap();
        assert_eq!(found.total, 0);
    }
}
