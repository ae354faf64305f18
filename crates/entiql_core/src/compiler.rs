//! Per-table SQL text, computed once.

use crate::dialect::{NamingConvention, SqlFragment};
use crate::schema::Table;
use crate::types::ColumnId;
use std::collections::HashMap;

/// The SQL text a managed table compiles to.
///
/// Built eagerly when a table is paired with a dialect and never mutated
/// afterwards. Only enabled columns appear in the select list and the
/// column map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSql {
    table_ref: String,
    column_list: String,
    select: String,
    count: String,
    columns: HashMap<ColumnId, String>,
}

impl TableSql {
    /// Compiles the SQL for `table` using `naming` for every identifier.
    pub fn compile<E>(table: &Table<E>, naming: &dyn NamingConvention) -> Self {
        let table_ref = naming.full_table_name(table.id());
        let columns: Vec<(ColumnId, String)> = table
            .enabled_columns()
            .map(|column| (column.id().clone(), naming.quote_field(column.name())))
            .collect();
        let column_list = columns
            .iter()
            .map(|(_, quoted)| quoted.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let select = format!("SELECT {column_list} FROM {table_ref}");
        let count = format!("SELECT COUNT(*) FROM {table_ref}");
        Self {
            table_ref,
            column_list,
            select,
            count,
            columns: columns.into_iter().collect(),
        }
    }

    /// Fully qualified, quoted table reference.
    pub fn table_ref(&self) -> &str {
        &self.table_ref
    }

    /// Comma-joined quoted column list, in select order.
    pub fn column_list(&self) -> &str {
        &self.column_list
    }

    /// `SELECT <columns> FROM <table>`
    pub fn select(&self) -> &str {
        &self.select
    }

    /// `SELECT COUNT(*) FROM <table>`
    pub fn count(&self) -> &str {
        &self.count
    }

    /// Quoted name of an enabled column.
    pub fn column(&self, id: &ColumnId) -> Option<&str> {
        self.columns.get(id).map(String::as_str)
    }

    /// Appends a `WHERE` clause to a base statement.
    pub fn with_where(base: &str, clause: &SqlFragment) -> String {
        format!("{base} WHERE {}", clause.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::QuotingNaming;
    use crate::schema::Column;
    use crate::types::TableId;
    use entiql_driver::Row;

    fn users() -> Table<Row> {
        Table::dynamic(
            TableId::new("db", "users"),
            vec![
                Column::new("id"),
                Column::new("name").db_name("user_name"),
                Column::new("legacy").disabled(),
                Column::new("age"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn select_lists_enabled_columns_in_order() {
        let sql = TableSql::compile(&users(), &QuotingNaming::BACKTICK);
        assert_eq!(sql.table_ref(), "`db`.`users`");
        assert_eq!(sql.column_list(), "`id`,`user_name`,`age`");
        assert_eq!(sql.select(), "SELECT `id`,`user_name`,`age` FROM `db`.`users`");
        assert_eq!(sql.count(), "SELECT COUNT(*) FROM `db`.`users`");
    }

    #[test]
    fn column_map_uses_db_names_and_skips_disabled() {
        let sql = TableSql::compile(&users(), &QuotingNaming::ANSI);
        assert_eq!(sql.column(&ColumnId::new("name")), Some("\"user_name\""));
        assert_eq!(sql.column(&ColumnId::new("legacy")), None);
    }

    #[test]
    fn where_clause_is_appended() {
        let clause = SqlFragment::text("(a IS NULL)");
        assert_eq!(
            TableSql::with_where("SELECT a FROM t", &clause),
            "SELECT a FROM t WHERE (a IS NULL)"
        );
    }
}
