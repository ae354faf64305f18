//! Render and count command implementation.

use crate::expr;
use entiql_core::{Column, Config, Manager, Table, TableId};
use entiql_driver::{ScriptedSource, Value};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A query to compile.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Table name, optionally schema-qualified.
    pub table: String,
    /// Column definitions in select-list order: `id`, or `id:db_name`.
    pub columns: Vec<String>,
    /// Filter expressions, one filter stage each.
    pub filters: Vec<String>,
    /// Elements to skip after filtering.
    pub skip: Option<usize>,
    /// Maximum number of elements.
    pub limit: Option<usize>,
    /// Explain the count statement instead of the select.
    pub count: bool,
}

/// Explain output.
#[derive(Debug, Serialize)]
pub struct ExplainResult {
    /// Database product.
    pub dbms: String,
    /// `select` or `count`.
    pub statement: &'static str,
    /// Statement text.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Vec<Value>,
    /// Stages applied in memory after fetching.
    pub residual: Vec<&'static str>,
}

/// Compiles `request` without executing anything.
pub fn explain(
    config: Config,
    request: &Request,
) -> Result<ExplainResult, Box<dyn std::error::Error>> {
    let id = TableId::parse(&request.table);
    let columns = request.columns.iter().map(|def| column(def)).collect();
    let table = Table::dynamic(id.clone(), columns)?;
    let dbms = config.dbms;

    // Compilation never touches the source.
    let manager = Manager::new(table, Arc::new(ScriptedSource::new()), config);
    let mut query = manager.stream();
    for filter in &request.filters {
        query = query.filter(expr::parse(&id, filter)?);
    }
    if let Some(n) = request.skip {
        query = query.skip(n);
    }
    if let Some(n) = request.limit {
        query = query.limit(n);
    }

    let (statement, explain) = if request.count {
        ("count", query.explain_count()?)
    } else {
        ("select", query.explain()?)
    };
    debug!(sql = %explain.sql, "explained");
    Ok(ExplainResult {
        dbms: dbms.to_string(),
        statement,
        sql: explain.sql,
        binds: explain.binds,
        residual: explain.residual,
    })
}

/// Runs the render or count command.
pub fn run(
    config: Config,
    request: &Request,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = explain(config, request)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn column(def: &str) -> Column {
    match def.split_once(':') {
        Some((id, db_name)) => Column::new(id.trim()).db_name(db_name.trim()),
        None => Column::new(def.trim()),
    }
}

fn print_text_output(result: &ExplainResult) {
    let binds: Vec<String> = result.binds.iter().map(ToString::to_string).collect();
    println!("DBMS:      {}", result.dbms);
    println!("Statement: {}", result.statement);
    println!("SQL:       {}", result.sql);
    println!("Binds:     [{}]", binds.join(", "));
    if result.residual.is_empty() {
        println!("Residual:  (none)");
    } else {
        println!("Residual:  {}", result.residual.join(" -> "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entiql_core::DbmsType;

    fn users(filters: &[&str]) -> Request {
        Request {
            table: "app.users".into(),
            columns: vec!["id".into(), "name:user_name".into(), "age".into()],
            filters: filters.iter().map(|f| f.to_string()).collect(),
            ..Request::default()
        }
    }

    #[test]
    fn pushes_filters_into_where() {
        let config = Config::new().dbms(DbmsType::MySql);
        let result = explain(config, &users(&["age > 18", "name ^= A"])).unwrap();
        assert_eq!(
            result.sql,
            "SELECT `id`,`user_name`,`age` FROM `app`.`users` \
             WHERE (`age` > ?) AND (`user_name` LIKE BINARY CONCAT(?, '%'))"
        );
        assert_eq!(result.binds, vec![Value::Integer(18), Value::from("A")]);
        assert!(result.residual.is_empty());
        assert_eq!(result.statement, "select");
    }

    #[test]
    fn count_falls_back_behind_limit() {
        let mut request = users(&["age is not null"]);
        request.count = true;
        let result = explain(Config::default(), &request).unwrap();
        assert_eq!(
            result.sql,
            "SELECT COUNT(*) FROM \"app\".\"users\" WHERE (\"age\" IS NOT NULL)"
        );

        request.limit = Some(5);
        let result = explain(Config::default(), &request).unwrap();
        assert!(result.sql.starts_with("SELECT \"id\""));
        assert_eq!(result.residual, vec!["limit"]);
    }

    #[test]
    fn unknown_column_and_bad_filter_fail() {
        assert!(explain(Config::default(), &users(&["height > 2"])).is_err());
        assert!(explain(Config::default(), &users(&["age >"])).is_err());
    }

    #[test]
    fn json_shape() {
        let result = explain(Config::default(), &users(&["id in (1, 2)"])).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["dbms"], "generic");
        assert_eq!(json["binds"], serde_json::json!([1, 2]));
    }
}
