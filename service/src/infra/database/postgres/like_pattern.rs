//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL `LIKE` pattern matching any text containing the given input.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] matching texts containing the given
    /// `input` literally.
    #[must_use]
    pub fn containing(input: &str) -> Self {
        let escaped = input
            .replace('\\', r"\\")
            .replace('%', r"\%")
            .replace('_', r"\_");
        Self(format!("%{escaped}%"))
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(LikePattern::containing("Ber").to_string(), "%Ber%");
        assert_eq!(
            LikePattern::containing(r"50%_off\").to_string(),
            r"%50\%\_off\\%",
        );
    }
}
