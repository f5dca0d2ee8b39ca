use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One structured lab fact parsed out of OCR text.
///
/// `value` always survives float conversion and `test` is always non-empty
/// after trimming — candidates that fail either check are discarded by the
/// parser, never stored as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabMeasurement {
    pub test: String,
    pub value: f64,
    pub unit: String,
}

/// The persisted unit: one report per successful pipeline run over one
/// document. Never mutated after creation; the store is append-only from
/// the pipeline's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    pub patient_name: String,
    /// Capture instant, stamped at assembly time — not a value read from
    /// the document content.
    pub report_date: DateTime<Utc>,
    /// Ordered by appearance in the concatenated OCR text.
    pub lab_values: Vec<LabMeasurement>,
    pub source_file: String,
}

/// Filter for store lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub patient_name: Option<String>,
}

impl ReportFilter {
    pub fn by_patient(name: &str) -> Self {
        Self {
            patient_name: Some(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_store_field_names() {
        let report = LabReport {
            patient_name: "TestPDF".into(),
            report_date: Utc::now(),
            lab_values: vec![LabMeasurement {
                test: "Hemoglobin".into(),
                value: 13.5,
                unit: "g/dL".into(),
            }],
            source_file: "sample_report.pdf".into(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("patient_name").is_some());
        assert!(json.get("report_date").is_some());
        assert!(json.get("source_file").is_some());

        let values = json.get("lab_values").unwrap().as_array().unwrap();
        assert_eq!(values[0].get("test").unwrap(), "Hemoglobin");
        assert_eq!(values[0].get("value").unwrap(), 13.5);
        assert_eq!(values[0].get("unit").unwrap(), "g/dL");
    }

    #[test]
    fn measurement_round_trips_through_json() {
        let m = LabMeasurement {
            test: "WBC".into(),
            value: 7200.0,
            unit: "/uL".into(),
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: LabMeasurement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
