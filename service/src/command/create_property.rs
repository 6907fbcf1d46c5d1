//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        amenity, availability::Calendar, property, user, Amenity, Property,
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`] along with its availability
/// [`Calendar`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// ID of the [`User`] hosting the new [`Property`].
    pub host_id: user::Id,

    /// [`property::Title`] of the new [`Property`].
    pub title: property::Title,

    /// [`property::Description`] of the new [`Property`].
    pub description: property::Description,

    /// [`property::Kind`] of the new [`Property`].
    pub kind: property::Kind,

    /// [`property::Address`] of the new [`Property`].
    pub address: property::Address,

    /// [`property::City`] of the new [`Property`].
    pub city: property::City,

    /// [`property::PostalCode`] of the new [`Property`].
    pub postal_code: property::PostalCode,

    /// [`property::Country`] of the new [`Property`].
    pub country: property::Country,

    /// [`property::Location`] of the new [`Property`], if known.
    pub location: Option<property::Location>,

    /// [`property::Rooms`] of the new [`Property`].
    pub rooms: property::Rooms,

    /// Default nightly price of the new [`Property`].
    pub base_price: Decimal,

    /// Cleaning fee of the new [`Property`].
    pub cleaning_fee: Decimal,

    /// [`property::Status`] of the new [`Property`].
    ///
    /// [`property::Status::Draft`] if [`None`].
    pub status: Option<property::Status>,

    /// IDs of the [`Amenity`]s the new [`Property`] offers.
    pub amenities: Vec<amenity::Id>,
}

impl<Db, Ml> Command<CreateProperty> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Amenity>, ()>>,
            Ok = Vec<Amenity>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Insert<Calendar>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            host_id,
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

        if !Property::is_valid_base_price(base_price) {
            return Err(tracerr::new!(E::InvalidBasePrice(base_price)));
        }
        if !Property::is_valid_cleaning_fee(cleaning_fee) {
            return Err(tracerr::new!(E::InvalidCleaningFee(cleaning_fee)));
        }

        let host = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(host_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(host_id))
            .map_err(tracerr::wrap!())?;
        if !host.is_host() {
            return Err(tracerr::new!(E::UserNotHost(host_id)));
        }

        amenities.sort_unstable();
        amenities.dedup();
        if !amenities.is_empty() {
            let known = self
                .database()
                .execute(Select(By::<Vec<Amenity>, _>::new(())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(id) = amenities
                .iter()
                .find(|id| !known.iter().any(|a| a.id == **id))
            {
                return Err(tracerr::new!(E::AmenityNotExists(*id)));
            }
        }

        let currency = self.config().currency;
        let now = DateTime::now();
        let property = Property {
            id: property::Id::new(),
            host_id,
            title,
            description,
            kind,
            address,
            city,
            postal_code,
            country,
            location,
            rooms,
            base_price: Money::new(base_price, currency),
            cleaning_fee: Money::new(cleaning_fee, currency),
            status: status.unwrap_or(property::Status::Draft),
            amenities,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let calendar = Calendar::generate(
            property.id,
            Date::today(),
            self.config().calendar_horizon_months,
            base_price,
        )
        .ok_or(E::CalendarOutOfRange)
        .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(calendar))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Property(id: {})` created by `User(id: {host_id})`",
            property.id,
        );

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// Calendar horizon exceeds the supported dates.
    #[display("Calendar horizon exceeds the supported dates")]
    CalendarOutOfRange,

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

    /// [`User`] is not allowed to host properties.
    #[display("`User(id: {_0})` is not a host")]
    UserNotHost(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
