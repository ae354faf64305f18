//! Identifier quoting and table qualification.

use crate::types::TableId;
use std::fmt;

/// Turns logical names into quoted SQL identifiers.
pub trait NamingConvention: Send + Sync + fmt::Debug {
    /// Quotes a single identifier.
    fn quote_field(&self, name: &str) -> String;

    /// Returns the fully qualified, quoted table reference.
    fn full_table_name(&self, table: &TableId) -> String {
        match table.schema() {
            Some(schema) => format!(
                "{}.{}",
                self.quote_field(schema),
                self.quote_field(table.table())
            ),
            None => self.quote_field(table.table()),
        }
    }
}

/// Wraps identifiers in a pair of quote characters, doubling any embedded
/// closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotingNaming {
    open: char,
    close: char,
}

impl QuotingNaming {
    /// Standard SQL double quotes.
    pub const ANSI: Self = Self::new('"', '"');
    /// MySQL backticks.
    pub const BACKTICK: Self = Self::new('`', '`');

    /// Creates a convention with the given quote characters.
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

impl NamingConvention for QuotingNaming {
    fn quote_field(&self, name: &str) -> String {
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(self.open);
        for c in name.chars() {
            if c == self.close {
                quoted.push(c);
            }
            quoted.push(c);
        }
        quoted.push(self.close);
        quoted
    }
}
