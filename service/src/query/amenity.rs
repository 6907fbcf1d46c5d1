//! [`Query`] collection related to [`Amenity`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity},
    infra::{database, Database},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries all the [`Amenity`]s, ordered by their [`amenity::Category`] and
/// name.
pub type All = DatabaseQuery<By<Vec<Amenity>, ()>>;

/// [`Query`] of all the [`Amenity`]s grouped by their [`amenity::Category`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Grouped;

impl<Db, Ml> Query<Grouped> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Vec<Amenity>, ()>>,
        Ok = Vec<Amenity>,
        Err = Traced<database::Error>,
    >,
{
    /// Non-empty groups in [`amenity::Category`] order.
    type Ok = Vec<(amenity::Category, Vec<Amenity>)>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Grouped) -> Result<Self::Ok, Self::Err> {
        let all = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(amenity::Category::ALL
            .iter()
            .map(|&c| {
                let group = all
                    .iter()
                    .filter(|a| a.category == c)
                    .cloned()
                    .collect::<Vec<_>>();
                (c, group)
            })
            .filter(|(_, group)| !group.is_empty())
            .collect())
    }
}
