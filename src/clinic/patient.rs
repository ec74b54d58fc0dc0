//! Patient lookup

use serde::{Deserialize, Serialize};

use crate::storage::record::Record;

/// Demographic header of a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "DNI")]
    pub dni: String,
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Apellido")]
    pub apellido: String,
    #[serde(rename = "Edad")]
    pub edad: String,
    #[serde(rename = "Sexo")]
    pub sexo: String,
}

impl Patient {
    fn from_record(record: &Record, dni: String) -> Self {
        let text = |key: &str| record.text(key).into_owned();
        Self {
            dni,
            nombre: text("Nombre"),
            apellido: text("Apellido"),
            edad: text("Edad"),
            sexo: text("Sexo"),
        }
    }
}

/// First row whose ID matches `dni`.
///
/// A row's ID is its first non-blank column among `id_columns`, trimmed.
/// The returned `dni` keeps the cell as stored.
pub fn find_patient(rows: &[Record], dni: &str, id_columns: &[String]) -> Option<Patient> {
    let dni = dni.trim();

    rows.iter().find_map(|record| {
        let id = record
            .first_present(id_columns.iter().map(String::as_str))?
            .text();
        (id.trim() == dni).then(|| Patient::from_record(record, id.into_owned()))
    })
}
