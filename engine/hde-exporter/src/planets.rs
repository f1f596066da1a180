//! Static planet name table

use hde_client::PlanetIndex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ExporterError, Result};

pub const PLANETS_FILE: &str = "planets.json";

/// Planet index to display name, loaded from `<json_data_dir>/planets.json`
#[derive(Debug, Clone, Default)]
pub struct PlanetNames {
    names: HashMap<PlanetIndex, String>,
}

impl PlanetNames {
    pub fn new(names: HashMap<PlanetIndex, String>) -> Self {
        Self { names }
    }

    /// Load the table from `json_data_dir`
    pub fn load(json_data_dir: &Path) -> Result<Self> {
        let path = json_data_dir.join(PLANETS_FILE);
        info!(path = %path.display(), "Loading planet names");

        let raw = std::fs::read_to_string(&path)
            .map_err(|source| ExporterError::StaticData { path: path.clone(), source })?;
        let table = Self::parse(&raw, path)?;

        info!(planets = table.len(), "Loaded planet names");
        Ok(table)
    }

    fn parse(raw: &str, path: PathBuf) -> Result<Self> {
        // JSON object keys are strings; serde_json parses them into integers.
        let names: HashMap<PlanetIndex, String> = serde_json::from_str(raw)
            .map_err(|source| ExporterError::StaticDataFormat { path, source })?;
        Ok(Self { names })
    }

    pub fn get(&self, index: PlanetIndex) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_planets_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PLANETS_FILE),
            r#"{"0": "Super Earth", "126": "Malevelon Creek"}"#,
        )
        .unwrap();

        let planets = PlanetNames::load(dir.path()).unwrap();
        assert_eq!(planets.len(), 2);
        assert!(!planets.is_empty());
        assert_eq!(planets.get(0), Some("Super Earth"));
        assert_eq!(planets.get(126), Some("Malevelon Creek"));
        assert_eq!(planets.get(7), None);
    }

    #[test]
    fn test_empty_table_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLANETS_FILE), "{}").unwrap();

        let planets = PlanetNames::load(dir.path()).unwrap();
        assert!(planets.is_empty());
        assert_eq!(planets.get(0), None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlanetNames::load(dir.path()).unwrap_err();
        assert!(matches!(err, ExporterError::StaticData { .. }));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLANETS_FILE), r#"{"zero": "Super Earth"}"#).unwrap();

        let err = PlanetNames::load(dir.path()).unwrap_err();
        assert!(matches!(err, ExporterError::StaticDataFormat { .. }));
    }

    #[test]
    fn test_shipped_sample_parses() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
        let planets = PlanetNames::load(&dir).unwrap();
        assert_eq!(planets.get(0), Some("Super Earth"));
    }
}
