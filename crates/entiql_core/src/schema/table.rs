//! Managed table metadata with typed accessors.

use crate::error::{CoreError, CoreResult};
use crate::schema::column::Column;
use crate::types::{ColumnId, FieldRef, TableId};
use entiql_driver::{Row, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reads one column's value out of an entity.
pub type Getter<E> = Arc<dyn Fn(&E) -> Value + Send + Sync>;

/// Writes one column's value into an entity.
pub type Setter<E> = Arc<dyn Fn(&mut E, Value) + Send + Sync>;

/// Typed getter/setter pair for one column.
pub struct Accessor<E> {
    getter: Getter<E>,
    setter: Setter<E>,
}

impl<E> Accessor<E> {
    /// Reads the column value from `entity`.
    pub fn get(&self, entity: &E) -> Value {
        (self.getter)(entity)
    }

    /// Writes `value` into `entity`.
    pub fn set(&self, entity: &mut E, value: Value) {
        (self.setter)(entity, value);
    }

    /// Returns a shared handle to the getter.
    pub fn getter(&self) -> Getter<E> {
        Arc::clone(&self.getter)
    }
}

impl<E> Clone for Accessor<E> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            setter: Arc::clone(&self.setter),
        }
    }
}

/// A managed table: its identity, its columns in select-list order and an
/// accessor per column keyed by column id.
pub struct Table<E> {
    id: TableId,
    columns: Vec<Column>,
    accessors: HashMap<ColumnId, Accessor<E>>,
}

impl<E> fmt::Debug for Table<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<E> Table<E> {
    /// Starts building a table.
    pub fn builder(id: TableId) -> TableBuilder<E> {
        TableBuilder {
            id,
            columns: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Returns the table identifier.
    pub fn id(&self) -> &TableId {
        &self.id
    }

    /// Returns all columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Iterates over enabled columns, which is the select-list order.
    pub fn enabled_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_enabled())
    }

    /// Looks up a column by id.
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// Returns a field reference to a column of this table.
    ///
    /// The column is not checked until the field is used in a query.
    pub fn field(&self, column: &str) -> FieldRef {
        FieldRef::new(self.id.clone(), column)
    }

    /// Resolves a field to its column metadata and accessor.
    ///
    /// # Errors
    ///
    /// Fails if the field belongs to another table, names an unknown column
    /// or names a disabled column.
    pub fn resolve(&self, field: &FieldRef) -> CoreResult<(&Column, &Accessor<E>)> {
        if field.table() != &self.id {
            return Err(CoreError::ColumnMismatch {
                expected_table: self.id.to_string(),
                actual_table: field.table().to_string(),
                column: field.column().to_string(),
            });
        }
        let unknown = || CoreError::UnknownColumn {
            table: self.id.to_string(),
            column: field.column().to_string(),
        };
        let column = self.column(field.column()).ok_or_else(unknown)?;
        if !column.is_enabled() {
            return Err(CoreError::DisabledColumn {
                table: self.id.to_string(),
                column: field.column().to_string(),
            });
        }
        let accessor = self.accessors.get(field.column()).ok_or_else(unknown)?;
        Ok((column, accessor))
    }

    /// Builds an entity from a row laid out in select-list order.
    ///
    /// # Errors
    ///
    /// Fails if the row has fewer columns than the select list.
    pub fn map_row(&self, row: &Row) -> CoreResult<E>
    where
        E: Default,
    {
        let mut entity = E::default();
        for (index, column) in self.enabled_columns().enumerate() {
            let value = row.get(index).cloned().ok_or_else(|| {
                CoreError::row_mapping(format!(
                    "{}: row has {} columns, column {} expected at index {index}",
                    self.id,
                    row.len(),
                    column.id()
                ))
            })?;
            if let Some(accessor) = self.accessors.get(column.id()) {
                accessor.set(&mut entity, column.type_mapper().to_entity(value));
            }
        }
        Ok(entity)
    }

    /// Lays an entity out as a row in select-list order, in database
    /// representation.
    pub fn to_row(&self, entity: &E) -> Row {
        self.enabled_columns()
            .map(|column| {
                let value = self
                    .accessors
                    .get(column.id())
                    .map_or(Value::Null, |a| a.get(entity));
                column.type_mapper().to_database(value)
            })
            .collect()
    }
}

impl Table<Row> {
    /// Creates a table whose entities are plain rows.
    ///
    /// Each enabled column reads and writes the row position it occupies in
    /// the select list. Useful when no entity type exists, e.g. for tooling.
    pub fn dynamic(id: TableId, columns: Vec<Column>) -> CoreResult<Self> {
        let mut builder = Table::builder(id);
        let mut position = 0usize;
        for column in columns {
            if column.is_enabled() {
                let index = position;
                position += 1;
                builder = builder.column(
                    column,
                    move |row: &Row| row.get(index).cloned().unwrap_or(Value::Null),
                    move |row: &mut Row, value| row.set(index, value),
                );
            } else {
                builder = builder.column(column, |_: &Row| Value::Null, |_: &mut Row, _| {});
            }
        }
        builder.build()
    }
}

/// Builder for [`Table`].
pub struct TableBuilder<E> {
    id: TableId,
    columns: Vec<Column>,
    accessors: Vec<(ColumnId, Accessor<E>)>,
}

impl<E> TableBuilder<E> {
    /// Adds a column with its getter and setter.
    #[must_use]
    pub fn column<G, S>(mut self, column: Column, getter: G, setter: S) -> Self
    where
        G: Fn(&E) -> Value + Send + Sync + 'static,
        S: Fn(&mut E, Value) + Send + Sync + 'static,
    {
        self.accessors.push((
            column.id().clone(),
            Accessor {
                getter: Arc::new(getter),
                setter: Arc::new(setter),
            },
        ));
        self.columns.push(column);
        self
    }

    /// Finishes the table.
    ///
    /// # Errors
    ///
    /// Fails if two columns share an id or no column is enabled.
    pub fn build(self) -> CoreResult<Table<E>> {
        let mut accessors = HashMap::with_capacity(self.accessors.len());
        for (id, accessor) in self.accessors {
            if accessors.insert(id.clone(), accessor).is_some() {
                return Err(CoreError::invalid_config(format!(
                    "duplicate column {id} in table {}",
                    self.id
                )));
            }
        }
        if !self.columns.iter().any(Column::is_enabled) {
            return Err(CoreError::invalid_config(format!(
                "table {} has no enabled columns",
                self.id
            )));
        }
        Ok(Table {
            id: self.id,
            columns: self.columns,
            accessors,
        })
    }
}
