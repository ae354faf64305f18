//! CLI command implementations.

pub mod dialects;
pub mod explain;
pub mod fragment;

use entiql_core::{Config, DbmsType};
use std::path::Path;
use tracing::debug;

/// Loads the manager configuration from an optional JSON file, then applies
/// a `--dbms` override.
pub fn load_config(
    path: Option<&Path>,
    dbms: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("Invalid config {}: {e}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(dbms) = dbms {
        config.dbms = dbms.parse::<DbmsType>()?;
    }
    debug!(?config, "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_a_file() {
        assert_eq!(load_config(None, None).unwrap(), Config::default());
    }

    #[test]
    fn reads_json_and_applies_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"dbms":"sqlite","count_fast_path":false}}"#).unwrap();

        let config = load_config(Some(file.path()), None).unwrap();
        assert_eq!(config.dbms, DbmsType::Sqlite);
        assert!(!config.count_fast_path);
        assert!(config.pushdown);

        let config = load_config(Some(file.path()), Some("postgres")).unwrap();
        assert_eq!(config.dbms, DbmsType::PostgreSql);
        assert!(!config.count_fast_path);
    }

    #[test]
    fn reports_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load_config(Some(&missing), None).is_err());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let err = load_config(Some(&bad), None).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));

        assert!(load_config(None, Some("oracle")).is_err());
    }
}
