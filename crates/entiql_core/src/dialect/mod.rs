//! SQL dialects and the predicate renderer.
//!
//! A [`Dialect`] owns identifier quoting and the handful of string-matching
//! idioms that differ between database products. Everything else is rendered
//! once, by [`render`], through an exhaustive match on
//! [`PredicateKind`](crate::PredicateKind).
//!
//! Each string hook returns the *positive* fragment with exactly one `?`;
//! negated kinds are wrapped in `NOT(...)` by the renderer. The default hook
//! bodies are plain ANSI SQL; product dialects override only what differs.

mod ansi;
mod fragment;
mod mysql;
mod naming;
mod postgres;
mod render;
mod sqlite;

pub use ansi::AnsiDialect;
pub use fragment::SqlFragment;
pub use mysql::MySqlDialect;
pub use naming::{NamingConvention, QuotingNaming};
pub use postgres::PostgresDialect;
pub use render::render;
pub use sqlite::SqliteDialect;

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Product-specific SQL idioms.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Short product name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Identifier quoting for this product.
    fn naming(&self) -> &dyn NamingConvention;

    /// Case-insensitive equality.
    fn equal_ignore_case(&self, column: &str) -> String {
        format!("(LOWER({column}) = LOWER(?))")
    }

    /// Case-sensitive prefix match.
    fn starts_with(&self, column: &str) -> String {
        format!("({column} LIKE (? || '%'))")
    }

    /// Case-insensitive prefix match.
    fn starts_with_ignore_case(&self, column: &str) -> String {
        format!("(LOWER({column}) LIKE LOWER(? || '%'))")
    }

    /// Case-sensitive suffix match.
    fn ends_with(&self, column: &str) -> String {
        format!("({column} LIKE ('%' || ?))")
    }

    /// Case-insensitive suffix match.
    fn ends_with_ignore_case(&self, column: &str) -> String {
        format!("(LOWER({column}) LIKE LOWER('%' || ?))")
    }

    /// Case-sensitive substring match.
    fn contains(&self, column: &str) -> String {
        format!("({column} LIKE ('%' || ? || '%'))")
    }

    /// Case-insensitive substring match.
    fn contains_ignore_case(&self, column: &str) -> String {
        format!("(LOWER({column}) LIKE LOWER('%' || ? || '%'))")
    }
}

/// Supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbmsType {
    /// Plain ANSI SQL.
    #[default]
    Generic,
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
    /// SQLite.
    Sqlite,
}

impl DbmsType {
    /// Every supported product.
    pub const ALL: [DbmsType; 4] = [Self::Generic, Self::MySql, Self::PostgreSql, Self::Sqlite];

    /// Returns the dialect for this product.
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Generic => Arc::new(AnsiDialect),
            Self::MySql => Arc::new(MySqlDialect),
            Self::PostgreSql => Arc::new(PostgresDialect),
            Self::Sqlite => Arc::new(SqliteDialect),
        }
    }

    /// Lowercase name, as accepted by [`FromStr`] and serde.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DbmsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbmsType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgresql" | "postgres" => Ok(Self::PostgreSql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(CoreError::invalid_config(format!("unknown dbms: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbms_parses_names_and_aliases() {
        for dbms in DbmsType::ALL {
            assert_eq!(dbms.as_str().parse::<DbmsType>().unwrap(), dbms);
        }
        assert_eq!("Postgres".parse::<DbmsType>().unwrap(), DbmsType::PostgreSql);
        assert!("oracle".parse::<DbmsType>().is_err());
    }

    #[test]
    fn dbms_selects_dialect() {
        assert_eq!(DbmsType::MySql.dialect().name(), "mysql");
        assert_eq!(DbmsType::Generic.dialect().name(), "ansi");
        assert_eq!(DbmsType::MySql.dialect().naming().quote_field("a"), "`a`");
        assert_eq!(DbmsType::Sqlite.dialect().naming().quote_field("a"), "\"a\"");
    }

    #[test]
    fn dbms_serde_is_lowercase() {
        let json = serde_json::to_string(&DbmsType::PostgreSql).unwrap();
        assert_eq!(json, "\"postgresql\"");
        let back: DbmsType = serde_json::from_str("\"mysql\"").unwrap();
        assert_eq!(back, DbmsType::MySql);
    }
}
