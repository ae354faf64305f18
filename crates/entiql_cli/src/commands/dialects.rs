//! Dialects command implementation.

use entiql_core::{DbmsType, TableId};
use serde::Serialize;

/// A supported database product.
#[derive(Debug, Serialize)]
pub struct DialectInfo {
    /// Name accepted by `--dbms`.
    pub dbms: DbmsType,
    /// Dialect name.
    pub dialect: &'static str,
    /// How a qualified table reference is quoted.
    pub example: String,
}

/// Lists every supported product.
pub fn list() -> Vec<DialectInfo> {
    let table = TableId::new("app", "users");
    DbmsType::ALL
        .iter()
        .map(|&dbms| {
            let dialect = dbms.dialect();
            DialectInfo {
                dbms,
                dialect: dialect.name(),
                example: dialect.naming().full_table_name(&table),
            }
        })
        .collect()
}

/// Runs the dialects command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dialects = list();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&dialects)?),
        _ => {
            for d in &dialects {
                println!("{:<11} {:<9} {}", d.dbms, d.dialect, d.example);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_product_once() {
        let dialects = list();
        assert_eq!(dialects.len(), DbmsType::ALL.len());
        assert_eq!(dialects[1].example, "`app`.`users`");
        let json = serde_json::to_value(&dialects).unwrap();
        assert_eq!(json[2]["dbms"], "postgresql");
    }
}
