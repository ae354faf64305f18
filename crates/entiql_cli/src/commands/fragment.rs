//! Fragment command implementation.

use crate::expr;
use entiql_core::{render, DbmsType, TableId};
use entiql_driver::Value;
use serde::Serialize;

/// One dialect's rendering of a predicate.
#[derive(Debug, Serialize)]
pub struct Rendered {
    /// Database product.
    pub dbms: DbmsType,
    /// SQL fragment.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Vec<Value>,
}

/// Renders one filter expression for `products`.
///
/// `column` overrides the database column name; by default the expression's
/// column is used as is.
pub fn render_all(
    expression: &str,
    column: Option<&str>,
    products: &[DbmsType],
) -> Result<Vec<Rendered>, Box<dyn std::error::Error>> {
    let predicate = expr::parse(&TableId::unqualified("t"), expression)?;
    let name = column.unwrap_or_else(|| predicate.field().column().as_str());
    Ok(products
        .iter()
        .map(|&dbms| {
            let dialect = dbms.dialect();
            let quoted = dialect.naming().quote_field(name);
            let (sql, binds) = render(dialect.as_ref(), &predicate, &quoted).into_parts();
            Rendered { dbms, sql, binds }
        })
        .collect())
}

/// Runs the fragment command. Without `dbms`, every product is shown.
pub fn run(
    expression: &str,
    column: Option<&str>,
    dbms: Option<DbmsType>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let products = dbms.map_or_else(|| DbmsType::ALL.to_vec(), |d| vec![d]);
    let rendered = render_all(expression, column, &products)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rendered)?),
        _ => {
            for r in &rendered {
                let binds: Vec<String> = r.binds.iter().map(ToString::to_string).collect();
                println!("{:<11} {}  [{}]", r.dbms, r.sql, binds.join(", "));
            }
        }
    }
    Ok(())
}
