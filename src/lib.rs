//! cruce - group queries over clinic spreadsheets
//!
//! A workbook is a directory of sheets exported from the clinic's
//! spreadsheets. Group queries filter the rows of one sheet by a flat list of
//! field conditions combined with AND or OR, and report how many rows cross
//! the criteria.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Workbook                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │   cruceql    │  │    Clinic    │  │     Config     │  │
//! │  │  conditions  │  │ patient and  │  │  (cruce.yaml)  │  │
//! │  │  wire + text │  │   studies    │  │                │  │
//! │  └──────┬───────┘  └──────┬───────┘  └───────┬────────┘  │
//! │         ▼                 ▼                  ▼           │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │       Query Engine (evaluate_group, distinct)      │  │
//! │  └─────────────────────────┬──────────────────────────┘  │
//! │                            ▼                             │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │        Storage (sheets/<Title>.json records)       │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod clinic;
pub mod config;
pub mod error;
pub mod query;
pub mod storage;
pub mod validation;

pub use clinic::{Patient, Study, StudyResult};
pub use config::Config;
pub use error::{Error, Result};
pub use query::{QueryResult, Summary};
pub use storage::record::{Record, Value};
pub use storage::sheet::Sheet;

use std::path::PathBuf;
use walkdir::WalkDir;

use cruceql::GroupQuery;
use storage::sheet::SheetFile;

/// The main workbook handle
pub struct Workbook {
    /// Root directory of the workbook
    pub root: PathBuf,
    pub config: Config,
}

impl Workbook {
    /// Open an existing workbook directory
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = path.into();
        if !tokio::fs::metadata(&root).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(Error::WorkbookNotFound { path: root }.into());
        }

        let config = Config::load(&root)?;
        tracing::debug!(root = %root.display(), "opened workbook");

        Ok(Self { root, config })
    }

    /// Create the workbook layout at `path` (if needed) and open it
    pub async fn init(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = path.into();
        tokio::fs::create_dir_all(root.join("sheets")).await?;

        if !root.join(config::CONFIG_FILE).exists() {
            Config::default().save(&root)?;
        }

        Self::open(root).await
    }

    fn sheet_file(&self, title: &str) -> Result<SheetFile> {
        validation::validate_sheet_title(title)?;
        Ok(SheetFile::open(title, &self.root))
    }

    /// Load a sheet by title
    pub async fn sheet(&self, title: &str) -> anyhow::Result<Sheet> {
        self.sheet_file(title)?.load().await
    }

    /// Write a sheet, replacing any sheet with the same title
    pub async fn save_sheet(&self, sheet: &Sheet) -> anyhow::Result<()> {
        self.sheet_file(&sheet.title)?.save(sheet).await
    }

    /// Titles of every sheet in the workbook, sorted
    pub fn sheet_titles(&self) -> Vec<String> {
        let dir = self.root.join("sheets");
        if !dir.exists() {
            return Vec::new();
        }

        let mut titles: Vec<String> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .collect();
        titles.sort();
        titles
    }

    /// Run a group query over the rows of a sheet
    pub async fn group_query(
        &self,
        title: &str,
        query: &GroupQuery,
    ) -> anyhow::Result<QueryResult> {
        let sheet = self.sheet(title).await?;
        let result = query::execute(sheet.records(), query, self.config.malformed)?;
        tracing::info!(
            sheet = %title,
            total = result.total_registros,
            matched = result.conteo_cruce,
            "group query complete"
        );
        Ok(result)
    }

    /// Column headers of a sheet, for building conditions
    pub async fn field_catalog(&self, title: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.sheet(title).await?.headers)
    }

    /// Distinct values of one column, for building `equals` and `in` conditions
    pub async fn field_options(&self, title: &str, field: &str) -> anyhow::Result<Vec<String>> {
        validation::validate_field_name(field)?;
        let sheet = self.sheet(title).await?;
        Ok(query::distinct_values(sheet.records(), field))
    }

    /// Look up a patient by national ID in the patient sheet
    pub async fn find_patient(&self, dni: &str) -> anyhow::Result<Option<Patient>> {
        let dni = validation::normalize_dni(dni)?;
        let sheet = self.sheet(&self.config.patient_sheet).await?;
        Ok(clinic::find_patient(sheet.records(), &dni, &self.config.id_columns))
    }

    /// Every prior study of a patient across the study sheets.
    ///
    /// A study sheet that is missing or cannot be read is skipped.
    pub async fn patient_studies(&self, dni: &str) -> anyhow::Result<Vec<Study>> {
        let dni = validation::normalize_dni(dni)?;
        let mut studies = Vec::new();

        for title in &self.config.study_sheets {
            match self.sheet(title).await {
                Ok(sheet) => studies.extend(clinic::collect_studies(title, sheet.records(), &dni)),
                Err(e) => tracing::warn!(sheet = %title, error = %e, "skipping study sheet"),
            }
        }

        Ok(studies)
    }
}
