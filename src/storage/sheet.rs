//! Sheet - one tab of a workbook, stored as a JSON file
//!
//! Sheets mirror spreadsheet tabs: a header row followed by value rows.
//!
//! Directory structure:
//! ```text
//! /sheets/
//!   Pacientes.json
//!   Laboratorio.json
//!   Eco mamaria.json
//! ```
//!
//! File format:
//! ```json
//! { "headers": ["DNI", "Nombre", "Edad"], "rows": [["30111222", "Ana", 45]] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::record::{Record, Value};
use crate::error::{Error, Result};

/// Rows of one sheet with their column order
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub title: String,
    /// Column headers in sheet order
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawSheet {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

impl Sheet {
    pub fn new<I, S>(title: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = Self {
            title: title.into(),
            headers: Vec::new(),
            rows: Vec::new(),
        };
        for header in headers {
            let header = header.into();
            if !header.trim().is_empty() && !sheet.headers.contains(&header) {
                sheet.headers.push(header);
            }
        }
        sheet
    }

    /// Append a row of cells aligned with the headers. Missing trailing
    /// cells read as empty text and surplus cells are dropped.
    pub fn push_row<I>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut cells = cells.into_iter();
        let mut record = Record::new();
        for header in &self.headers {
            let value = cells
                .next()
                .map(Into::into)
                .unwrap_or_else(|| Value::String(String::new()));
            record.fields.insert(header.clone(), value);
        }
        self.rows.push(record);
        self
    }

    /// Parse a sheet from its JSON content
    pub fn parse(title: impl Into<String>, content: &str) -> Result<Self> {
        let title = title.into();
        let raw: RawSheet = serde_json::from_str(content).map_err(|e| Error::SheetParse {
            title: title.clone(),
            message: e.to_string(),
        })?;

        // Blank headers still occupy a column position.
        let columns: Vec<Option<String>> = raw
            .headers
            .iter()
            .map(|h| (!h.trim().is_empty()).then(|| h.clone()))
            .collect();

        let mut sheet = Sheet::new(title, raw.headers);
        for cells in raw.rows {
            let mut cells = cells.into_iter();
            let mut record = Record::new();
            for column in &columns {
                let cell = cells.next();
                let Some(header) = column else { continue };
                if record.fields.contains_key(header) {
                    continue;
                }
                let value = cell
                    .map(Value::from_json)
                    .unwrap_or_else(|| Value::String(String::new()));
                record.fields.insert(header.clone(), value);
            }
            sheet.rows.push(record);
        }

        Ok(sheet)
    }

    /// Render the sheet back to its JSON file form
    pub fn render(&self) -> Result<String> {
        let raw = RawSheet {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .map(|record| {
                    self.headers
                        .iter()
                        .map(|h| {
                            record
                                .get(h)
                                .map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null))
                                .unwrap_or(serde_json::Value::Null)
                        })
                        .collect()
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Field catalog: the headers in sheet order
    pub fn field_catalog(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Location of a sheet file inside a workbook
#[derive(Debug)]
pub struct SheetFile {
    /// Sheet title (file stem)
    pub title: String,
    /// Path to the JSON file
    pub path: PathBuf,
}

impl SheetFile {
    /// Locate a sheet under the workbook root. The title must already be validated.
    pub fn open(title: impl Into<String>, root: &Path) -> Self {
        let title = title.into();
        let path = root.join("sheets").join(format!("{}.json", title));
        Self { title, path }
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.map(|m| m.is_file()).unwrap_or(false)
    }

    /// Read and parse the sheet
    pub async fn load(&self) -> anyhow::Result<Sheet> {
        if !self.exists().await {
            return Err(Error::SheetNotFound {
                title: self.title.clone(),
            }
            .into());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::FileReadError {
                path: self.path.clone(),
                source,
            })?;
        let sheet = Sheet::parse(&self.title, &content)?;
        tracing::debug!(title = %self.title, rows = sheet.len(), "loaded sheet");
        Ok(sheet)
    }

    /// Write a sheet to this location, creating the sheets directory
    pub async fn save(&self, sheet: &Sheet) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, sheet.render()?)
            .await
            .map_err(|source| Error::FileWriteError {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}
