//! Column metadata and type mappers.

use crate::types::ColumnId;
use entiql_driver::Value;
use std::fmt;
use std::sync::Arc;

/// Converts between the value an entity holds and the value the database
/// stores.
///
/// Mappers are pure functions. Predicate operands pass through
/// [`TypeMapper::to_database`] before binding; fetched column values pass
/// through [`TypeMapper::to_entity`] before reaching a setter.
pub trait TypeMapper: Send + Sync + fmt::Debug {
    /// Maps an entity-side value to its database representation.
    fn to_database(&self, value: Value) -> Value;

    /// Maps a database value to its entity-side representation.
    fn to_entity(&self, value: Value) -> Value;
}

/// Passes values through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl TypeMapper for IdentityMapper {
    fn to_database(&self, value: Value) -> Value {
        value
    }

    fn to_entity(&self, value: Value) -> Value {
        value
    }
}

/// Stores booleans as `0`/`1` integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerBoolMapper;

impl TypeMapper for IntegerBoolMapper {
    fn to_database(&self, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Integer(i64::from(b)),
            other => other,
        }
    }

    fn to_entity(&self, value: Value) -> Value {
        match value {
            Value::Integer(n) => Value::Bool(n != 0),
            other => other,
        }
    }
}

/// One column of a managed table.
#[derive(Debug, Clone)]
pub struct Column {
    id: ColumnId,
    db_name: String,
    enabled: bool,
    mapper: Arc<dyn TypeMapper>,
}

impl Column {
    /// Creates an enabled column whose database name equals its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            db_name: id.clone(),
            id: ColumnId::new(id),
            enabled: true,
            mapper: Arc::new(IdentityMapper),
        }
    }

    /// Sets the column name used in SQL text.
    #[must_use]
    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }

    /// Excludes the column from the select list and from predicates.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Sets the type mapper.
    #[must_use]
    pub fn mapper(mut self, mapper: impl TypeMapper + 'static) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    /// Returns the column id.
    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    /// Returns the unquoted database name.
    pub fn name(&self) -> &str {
        &self.db_name
    }

    /// Returns whether the column is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the type mapper.
    pub fn type_mapper(&self) -> &dyn TypeMapper {
        self.mapper.as_ref()
    }
}
