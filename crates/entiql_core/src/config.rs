//! Manager configuration.

use crate::dialect::DbmsType;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Manager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database product; selects the dialect and naming convention.
    pub dbms: DbmsType,

    /// Whether leading filters are pushed into the SQL `WHERE` clause.
    ///
    /// When disabled every filter runs in memory. Results are identical.
    pub pushdown: bool,

    /// Whether `count()` may be answered with `SELECT COUNT(*)`.
    pub count_fast_path: bool,

    /// Rows per round trip, forwarded to the driver as a hint.
    pub fetch_size: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dbms: DbmsType::Generic,
            pushdown: true,
            count_fast_path: true,
            fetch_size: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database product.
    #[must_use]
    pub const fn dbms(mut self, dbms: DbmsType) -> Self {
        self.dbms = dbms;
        self
    }

    /// Sets whether filters are pushed down.
    #[must_use]
    pub const fn pushdown(mut self, value: bool) -> Self {
        self.pushdown = value;
        self
    }

    /// Sets whether the `COUNT(*)` fast path is used.
    #[must_use]
    pub const fn count_fast_path(mut self, value: bool) -> Self {
        self.count_fast_path = value;
        self
    }

    /// Sets the fetch size hint.
    #[must_use]
    pub const fn fetch_size(mut self, rows: u32) -> Self {
        self.fetch_size = Some(rows);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.dbms, DbmsType::Generic);
        assert!(config.pushdown);
        assert!(config.count_fast_path);
        assert_eq!(config.fetch_size, None);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .dbms(DbmsType::MySql)
            .pushdown(false)
            .fetch_size(500);

        assert_eq!(config.dbms, DbmsType::MySql);
        assert!(!config.pushdown);
        assert!(config.count_fast_path);
        assert_eq!(config.fetch_size, Some(500));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"dbms":"postgresql","pushdown":false}"#).unwrap();
        assert_eq!(config.dbms, DbmsType::PostgreSql);
        assert!(!config.pushdown);
        assert!(config.count_fast_path);
    }
}
