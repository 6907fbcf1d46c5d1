//! [`Query`] collection related to availability calendars.

use common::operations::By;

use crate::{domain::availability::Day, read::availability::Range};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries the calendar [`Day`]s of a [`Property`] in a [`Range`], ordered
/// by date.
///
/// Dates without a generated [`Day`] are omitted.
pub type ByRange = DatabaseQuery<By<Vec<Day>, Range>>;
