//! Report assembly: pure construction of the persistable record.

use chrono::Utc;

use super::PipelineError;
use crate::models::{LabMeasurement, LabReport};

/// Combine parsed measurements with document metadata into a `LabReport`.
///
/// `report_date` is stamped at assembly time (wall-clock capture instant),
/// not parsed from the document content. An empty `source_file` violates
/// the record contract and is rejected.
pub fn assemble(
    patient_name: &str,
    source_file: &str,
    lab_values: Vec<LabMeasurement>,
) -> Result<LabReport, PipelineError> {
    if source_file.trim().is_empty() {
        return Err(PipelineError::InvalidReport(
            "source_file must not be empty".into(),
        ));
    }

    Ok(LabReport {
        patient_name: patient_name.to_string(),
        report_date: Utc::now(),
        lab_values,
        source_file: source_file.to_string(),
    })
}
