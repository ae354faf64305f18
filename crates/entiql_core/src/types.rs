//! Core identifier types for EntiQL.

use std::fmt;

/// Identifier of a managed table: optional schema plus table name.
///
/// These are the logical names; quoting and qualification for SQL text is
/// the job of a [`crate::NamingConvention`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    schema: Option<String>,
    table: String,
}

impl TableId {
    /// Creates a schema-qualified table identifier.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    /// Creates a table identifier without a schema.
    pub fn unqualified(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    /// Parses `schema.table` or `table`.
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) => Self::new(schema, table),
            None => Self::unqualified(name),
        }
    }

    /// Returns the schema name, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// Identifier of a column within its table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(String);

impl ColumnId {
    /// Creates a column identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to one column of one table.
///
/// This is what a predicate points at. It is resolved to a quoted column name
/// and a typed accessor only when a pipeline is compiled against a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    table: TableId,
    column: ColumnId,
}

impl FieldRef {
    /// Creates a field reference.
    pub fn new(table: TableId, column: impl Into<ColumnId>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }

    /// Returns the table the field belongs to.
    pub fn table(&self) -> &TableId {
        &self.table
    }

    /// Returns the column identifier.
    pub fn column(&self) -> &ColumnId {
        &self.column
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_id_parse() {
        assert_eq!(TableId::parse("db.users"), TableId::new("db", "users"));
        assert_eq!(TableId::parse("users"), TableId::unqualified("users"));
        assert_eq!(TableId::parse("db.users").schema(), Some("db"));
    }

    #[test]
    fn table_id_display() {
        assert_eq!(TableId::new("db", "users").to_string(), "db.users");
        assert_eq!(TableId::unqualified("users").to_string(), "users");
    }

    #[test]
    fn field_ref_display() {
        let field = FieldRef::new(TableId::new("db", "users"), "age");
        assert_eq!(format!("{field}"), "db.users.age");
        assert_eq!(field.column().as_str(), "age");
    }
}
