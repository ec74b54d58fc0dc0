//! Workbook configuration
//!
//! Stored in `cruce.yaml` at the workbook root. Every key is optional:
//!
//! ```yaml
//! patient_sheet: Pacientes
//! id_columns: [DNI, Documento]
//! study_sheets: [Mamografia, Laboratorio, Ecografia]
//! malformed: never_match   # or: reject
//! ```

use cruceql::MalformedPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::validation::{validate_field_name, validate_sheet_title};

/// File name of the configuration inside a workbook
pub const CONFIG_FILE: &str = "cruce.yaml";

/// Study sheets scanned for a patient's prior results, in display order
pub const DEFAULT_STUDY_SHEETS: &[&str] = &[
    "Mamografia",
    "Laboratorio",
    "Ecografia",
    "Espirometria",
    "Densitometria",
    "Enfermeria",
    "Eco mamaria",
    "Oftalmologia",
];

/// Settings for a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet holding one row per patient
    pub patient_sheet: String,
    /// Columns tried in order when matching a patient's national ID
    pub id_columns: Vec<String>,
    /// Sheets scanned for prior studies
    pub study_sheets: Vec<String>,
    /// What a group query does with a condition it cannot decode
    pub malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patient_sheet: "Pacientes".to_string(),
            id_columns: vec!["DNI".to_string(), "Documento".to_string()],
            study_sheets: DEFAULT_STUDY_SHEETS.iter().map(|s| s.to_string()).collect(),
            malformed: MalformedPolicy::default(),
        }
    }
}

impl Config {
    /// Load the configuration of the workbook at `root`, falling back to
    /// defaults when the file is absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| Error::FileReadError {
            path: path.clone(),
            source,
        })?;
        let config: Config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;

        Ok(config)
    }

    /// Write the configuration to `root`
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|source| Error::FileWriteError { path, source })?;
        Ok(())
    }

    /// Check every sheet title and column name
    pub fn validate(&self) -> Result<()> {
        validate_sheet_title(&self.patient_sheet)?;
        for title in &self.study_sheets {
            validate_sheet_title(title)?;
        }

        if self.id_columns.is_empty() {
            return Err(Error::ConfigError {
                message: "id_columns must name at least one column".to_string(),
            });
        }
        for column in &self.id_columns {
            validate_field_name(column)?;
        }

        Ok(())
    }
}
