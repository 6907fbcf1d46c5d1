//! Infrastructure layer.

pub mod database;
pub mod mailer;

pub use self::{database::Database, mailer::Mailer};
#[cfg(any(test, feature = "memory"))]
pub use self::database::{memory, Memory};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
