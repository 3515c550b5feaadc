use std::fs;
use std::path::Path;

use crate::domain::{NestedState, Value};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Serialization failed: {0}")]
    Serialization(serde_json::Error),
    #[error("Invalid file format - {0}")]
    Format(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Saves and loads form options as JSON documents.
pub struct OptionsRepository;

impl OptionsRepository {
    pub fn save_options(options: &NestedState, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(options).map_err(PersistenceError::Serialization)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "saved options");
        Ok(())
    }

    pub fn load_options(path: &Path) -> Result<NestedState, PersistenceError> {
        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(options)) => Ok(options),
            Ok(_) => Err(PersistenceError::Format("expected a JSON object".to_string())),
            Err(e) => Err(PersistenceError::Format(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::nested;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_keeps_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        let options = nested(json!({
            "width": 300,
            "dotsOptions": {"type": "rounded", "color": "#000"},
            "data": "x",
        }));

        OptionsRepository::save_options(&options, &path).unwrap();
        let loaded = OptionsRepository::load_options(&path).unwrap();

        assert_eq!(loaded, options);
        let keys: Vec<&str> = loaded.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["width", "dotsOptions", "data"]);
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = OptionsRepository::load_options(&path).unwrap_err();

        assert!(matches!(err, PersistenceError::Format(_)));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            OptionsRepository::load_options(&path),
            Err(PersistenceError::Format(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            OptionsRepository::load_options(&dir.path().join("nope.json")),
            Err(PersistenceError::Io(_))
        ));
    }
}
