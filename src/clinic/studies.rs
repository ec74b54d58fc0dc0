//! Prior studies of a patient
//!
//! Each study sheet holds one row per study. Rows are matched on the `DNI`
//! column only and reshaped according to the sheet they come from.

use serde::{Deserialize, Serialize};

use crate::storage::record::{Record, Value};

const LABORATORY: &str = "Laboratorio";
const NURSING: &str = "Enfermeria";

/// One study row, reshaped for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    /// Title of the sheet the study came from
    #[serde(rename = "TipoEstudio")]
    pub kind: String,
    #[serde(rename = "Fecha")]
    pub fecha: String,
    #[serde(rename = "LinkPDF")]
    pub link_pdf: String,
    #[serde(flatten)]
    pub result: StudyResult,
}

/// The result part of a study, which depends on the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StudyResult {
    /// Laboratory panels keep the whole row
    #[serde(rename = "ResultadosLaboratorio")]
    Laboratory(Record),
    #[serde(rename = "ResultadosEnfermeria")]
    Nursing(NursingVitals),
    /// Free-text finding of any other study
    #[serde(rename = "Resultado")]
    Finding(String),
}

/// Vitals taken by nursing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NursingVitals {
    #[serde(rename = "Altura")]
    pub altura: Option<Value>,
    #[serde(rename = "Peso")]
    pub peso: Option<Value>,
    #[serde(rename = "Presion_Arterial")]
    pub presion_arterial: Option<Value>,
}

impl Study {
    fn from_record(kind: &str, record: &Record) -> Self {
        let fecha = first_text(record, &["Fecha", "Fecha_cierre_Enf"])
            .unwrap_or_else(|| "N/A".to_string());
        let link_pdf =
            first_text(record, &["LinkPDF", "Espirometria (Enlace a PDF)"]).unwrap_or_default();

        let result = match kind {
            LABORATORY => StudyResult::Laboratory(record.clone()),
            NURSING => StudyResult::Nursing(NursingVitals {
                altura: record.get("Altura (cm)").cloned(),
                peso: record.get("Peso (kg)").cloned(),
                presion_arterial: record.get("Presion Arterial (mmhg)").cloned(),
            }),
            _ => StudyResult::Finding(
                first_text(record, &["Resultado", "Normal/Patologica"])
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        };

        Self {
            kind: kind.to_string(),
            fecha,
            link_pdf,
            result,
        }
    }
}

fn first_text(record: &Record, keys: &[&str]) -> Option<String> {
    record
        .first_present(keys.iter().copied())
        .map(|value| value.text().into_owned())
}

/// Studies of `kind` belonging to `dni`, in sheet order
pub fn collect_studies(kind: &str, rows: &[Record], dni: &str) -> Vec<Study> {
    let dni = dni.trim();
    rows.iter()
        .filter(|record| record.text("DNI").trim() == dni)
        .map(|record| Study::from_record(kind, record))
        .collect()
}
