use super::{Dialect, NamingConvention, QuotingNaming};

/// Plain ANSI SQL: double-quoted identifiers, `LOWER` for case folding and
/// `||` concatenation around `LIKE` patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn naming(&self) -> &dyn NamingConvention {
        &QuotingNaming::ANSI
    }
}
