use super::{Dialect, NamingConvention, QuotingNaming};

/// MySQL: backtick identifiers and `CONCAT` patterns.
///
/// The default collation is case-insensitive, so case-sensitive matches
/// compare with `LIKE BINARY` and the ignore-case variants use plain `LIKE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn naming(&self) -> &dyn NamingConvention {
        &QuotingNaming::BACKTICK
    }

    fn starts_with(&self, column: &str) -> String {
        format!("({column} LIKE BINARY CONCAT(?, '%'))")
    }

    fn starts_with_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE CONCAT(?, '%'))")
    }

    fn ends_with(&self, column: &str) -> String {
        format!("({column} LIKE BINARY CONCAT('%', ?))")
    }

    fn ends_with_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE CONCAT('%', ?))")
    }

    fn contains(&self, column: &str) -> String {
        format!("({column} LIKE BINARY CONCAT('%', ?, '%'))")
    }

    fn contains_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE CONCAT('%', ?, '%'))")
    }
}
