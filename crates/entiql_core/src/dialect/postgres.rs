use super::{Dialect, NamingConvention, QuotingNaming};

/// PostgreSQL: `ILIKE` for the case-insensitive matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn naming(&self) -> &dyn NamingConvention {
        &QuotingNaming::ANSI
    }

    fn starts_with_ignore_case(&self, column: &str) -> String {
        format!("({column} ILIKE (? || '%'))")
    }

    fn ends_with_ignore_case(&self, column: &str) -> String {
        format!("({column} ILIKE ('%' || ?))")
    }

    fn contains_ignore_case(&self, column: &str) -> String {
        format!("({column} ILIKE ('%' || ? || '%'))")
    }
}
