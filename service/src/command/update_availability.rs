//! [`Command`] for editing the availability calendar of a [`Property`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{Changes, Day, Patch, PatchError},
        property, user, Property,
    },
    infra::{database, Database},
    read::availability::Range,
    Service,
};

use super::Command;

/// [`Command`] for applying a host's [`Patch`] to the availability calendar
/// of a [`Property`].
///
/// Dates outside the generated calendar are skipped. Status and availability
/// of dates held by bookings are never changed.
#[derive(Clone, Debug)]
pub struct UpdateAvailability {
    /// ID of the [`Property`] whose calendar is edited.
    pub property_id: property::Id,

    /// ID of the [`user::User`] editing the calendar.
    pub initiator_id: user::Id,

    /// [`Patch`] to apply.
    pub patch: Patch,
}

impl<Db, Ml> Command<UpdateAvailability> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Changes>, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Day>, Range>>,
            Ok = Vec<Day>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    /// Updated [`Day`]s, ordered by date.
    type Ok = Vec<Day>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAvailability {
            property_id,
            initiator_id,
            patch,
        } = cmd;

        let changes = patch
            .normalize(property_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let Some((first, last)) = changes.bounds() else {
            return Ok(vec![]);
        };
        let dates = DateRange::inclusive(first, last)
            .ok_or(E::Patch(PatchError::InvertedRange { first, last }))
            .map_err(tracerr::wrap!())?;
        let patched =
            changes.entries.iter().map(|(d, _)| *d).collect::<Vec<_>>();

        let property = self
            .database()
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

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize with bookings of the same `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Update(changes))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let days = tx
            .execute(Select(By::new(Range { property_id, dates })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|d| patched.binary_search(&d.date).is_ok())
            .collect::<Vec<_>>();

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "{} calendar days of `Property(id: {property_id})` updated",
            days.len(),
        );

        Ok(days)
    }
}

/// Error of [`UpdateAvailability`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::User`] doesn't host the [`Property`].
    #[display("`User(id: {user_id})` doesn't host `Property(id: {property_id})`")]
    #[from(ignore)]
    NotPropertyHost {
        /// ID of the [`user::User`].
        user_id: user::Id,

        /// ID of the [`Property`].
        property_id: property::Id,
    },

    /// [`Patch`] is invalid.
    #[display("Invalid availability patch: {_0}")]
    Patch(PatchError),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        domain::availability::{Fields, Patch, PatchError, Status},
        tests::Scenario,
        Command as _,
    };

    use super::{ExecutionError, UpdateAvailability};

    #[tokio::test]
    async fn patches_discrete_dates() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let updated = s
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: s.host.id,
                patch: Patch::Dates {
                    dates: vec![s.day(5), s.day(2), s.day(5)],
                    fields: Fields {
                        price: Some(Decimal::from(99)),
                        requires_approval: Some(true),
                        ..Fields::default()
                    },
                },
            })
            .await
            .unwrap();

        assert_eq!(
            updated.iter().map(|d| d.date).collect::<Vec<_>>(),
            vec![s.day(2), s.day(5)],
        );
        let days = s.days(&property, 2, 6).await;
        assert_eq!(days[0].price, Decimal::from(99));
        assert!(days[0].requires_approval);
        assert_eq!(days[1].price, property.base_price.amount);
        assert!(!days[1].requires_approval);
        assert_eq!(days[3].price, Decimal::from(99));
    }

    #[tokio::test]
    async fn blocks_range_keeping_booked_days() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let _ = s.book(&property, 3, 5).await;

        let _ = s
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: s.host.id,
                patch: Patch::Range {
                    first: s.day(1),
                    last: s.day(6),
                    fields: Fields {
                        status: Some(Status::Blocked),
                        ..Fields::default()
                    },
                },
            })
            .await
            .unwrap();

        let statuses = s
            .days(&property, 1, 7)
            .await
            .into_iter()
            .map(|d| d.status)
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![
                Status::Blocked,
                Status::Blocked,
                Status::Booked,
                Status::Booked,
                Status::Blocked,
                Status::Blocked,
            ],
        );
    }

    #[tokio::test]
    async fn rejects_invalid_patches() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let err = s
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: s.host.id,
                patch: Patch::Range {
                    first: s.day(6),
                    last: s.day(1),
                    fields: Fields {
                        is_available: Some(false),
                        ..Fields::default()
                    },
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Patch(PatchError::InvertedRange { .. }),
        ));

        let err = s
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: s.host.id,
                patch: Patch::Dates {
                    dates: vec![s.day(1)],
                    fields: Fields {
                        status: Some(Status::Booked),
                        ..Fields::default()
                    },
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Patch(PatchError::ReservedStatus(Status::Booked)),
        ));

        let err = s
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: s.guest.id,
                patch: Patch::Dates {
                    dates: vec![s.day(1)],
                    fields: Fields {
                        is_available: Some(false),
                        ..Fields::default()
                    },
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotPropertyHost { .. },
        ));
    }
}
