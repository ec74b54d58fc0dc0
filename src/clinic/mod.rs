//! Patient-facing reads over a workbook: locating a patient by national ID
//! and gathering their prior studies from the study sheets.

pub mod patient;
pub mod studies;

pub use patient::{find_patient, Patient};
pub use studies::{collect_studies, NursingVitals, Study, StudyResult};
