use super::{Dialect, NamingConvention, QuotingNaming};

/// SQLite.
///
/// `LIKE` folds ASCII case by default, so the case-sensitive prefix and
/// suffix matches use `GLOB` and substring search uses `instr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn naming(&self) -> &dyn NamingConvention {
        &QuotingNaming::ANSI
    }

    fn equal_ignore_case(&self, column: &str) -> String {
        format!("({column} = ? COLLATE NOCASE)")
    }

    fn starts_with(&self, column: &str) -> String {
        format!("({column} GLOB (? || '*'))")
    }

    fn starts_with_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE (? || '%'))")
    }

    fn ends_with(&self, column: &str) -> String {
        format!("({column} GLOB ('*' || ?))")
    }

    fn ends_with_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE ('%' || ?))")
    }

    fn contains(&self, column: &str) -> String {
        format!("(instr({column}, ?) > 0)")
    }

    fn contains_ignore_case(&self, column: &str) -> String {
        format!("({column} LIKE ('%' || ? || '%'))")
    }
}
