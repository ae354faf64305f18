//! Rendered SQL fragments.

use entiql_driver::Value;

/// SQL text with positional `?` placeholders and the values bound to them.
///
/// # Invariants
///
/// - `binds.len()` equals the number of placeholders in `sql`
/// - `binds[i]` belongs to the `i`-th placeholder, left to right
///
/// Every operation here preserves both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFragment {
    sql: String,
    binds: Vec<Value>,
}

impl SqlFragment {
    /// Creates a fragment.
    pub fn new(sql: impl Into<String>, binds: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }

    /// Creates a fragment without binds.
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Returns the SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bind values in placeholder order.
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Splits the fragment into text and binds.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.binds)
    }

    /// Counts `?` placeholders outside single-quoted literals.
    pub fn placeholders(&self) -> usize {
        let mut quoted = false;
        self.sql
            .chars()
            .filter(|&c| {
                if c == '\'' {
                    quoted = !quoted;
                }
                c == '?' && !quoted
            })
            .count()
    }

    /// Wraps the fragment as `(NOT(<sql>))`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self {
            sql: format!("(NOT({}))", self.sql),
            binds: self.binds,
        }
    }

    /// Applies `f` to every bind value, keeping order.
    #[must_use]
    pub fn map_binds(self, f: impl FnMut(Value) -> Value) -> Self {
        Self {
            sql: self.sql,
            binds: self.binds.into_iter().map(f).collect(),
        }
    }

    /// Joins fragments with `AND`, concatenating binds in fragment order.
    ///
    /// Returns `None` if there are no fragments.
    pub fn join_and<I>(fragments: I) -> Option<Self>
    where
        I: IntoIterator<Item = SqlFragment>,
    {
        let mut joined: Option<Self> = None;
        for fragment in fragments {
            joined = Some(match joined {
                None => fragment,
                Some(mut acc) => {
                    acc.sql.push_str(" AND ");
                    acc.sql.push_str(&fragment.sql);
                    acc.binds.extend(fragment.binds);
                    acc
                }
            });
        }
        joined
    }
}
