//! Fetched result rows.

use crate::value::Value;

/// One row returned by a [`crate::Cursor`].
///
/// Columns are positional and appear in the order of the select list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from column values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the value at a 0-based column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value at a 0-based column index, padding with `NULL`.
    pub fn set(&mut self, index: usize, value: Value) {
        if self.values.len() <= index {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value;
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the column values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Consumes the row, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pads_with_null() {
        let mut row = Row::default();
        row.set(2, Value::Integer(7));
        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0), Some(&Value::Null));
        assert_eq!(row.get(2), Some(&Value::Integer(7)));
    }

    #[test]
    fn collects_from_values() {
        let row: Row = vec![Value::from("a"), Value::Bool(true)].into_iter().collect();
        assert_eq!(row.into_values(), vec![Value::from("a"), Value::Bool(true)]);
    }
}
