//! Store gateway for lab reports.
//!
//! The pipeline only depends on the `ReportStore` capability: insert a
//! record, find records by filter. Insertion is fire-and-forget — no
//! read-after-write verification happens inside the pipeline.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{open_database, open_memory_database, DatabaseError};
use crate::models::{LabReport, ReportFilter};

/// Document-store boundary the pipeline persists through.
pub trait ReportStore: Send + Sync {
    fn insert(&self, report: &LabReport) -> Result<(), DatabaseError>;

    /// Matching reports in insertion order.
    fn find(&self, filter: &ReportFilter) -> Result<Vec<LabReport>, DatabaseError>;
}

/// SQLite-backed report store. `lab_values` is stored as a JSON column in
/// the §6 wire shape, `report_date` as RFC 3339 text.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_database(path)?),
        })
    }

    /// In-memory store for tests and demo runs.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning only happens if a panic occurred mid-statement; the
        // connection itself is still usable for subsequent runs.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReportStore for SqliteReportStore {
    fn insert(&self, report: &LabReport) -> Result<(), DatabaseError> {
        let lab_values = serde_json::to_string(&report.lab_values)?;
        self.lock().execute(
            "INSERT INTO lab_reports (patient_name, report_date, lab_values, source_file)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                report.patient_name,
                report.report_date.to_rfc3339(),
                lab_values,
                report.source_file,
            ],
        )?;
        Ok(())
    }

    fn find(&self, filter: &ReportFilter) -> Result<Vec<LabReport>, DatabaseError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT patient_name, report_date, lab_values, source_file
             FROM lab_reports
             WHERE (?1 IS NULL OR patient_name = ?1)
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![filter.patient_name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut reports = Vec::new();
        for row in rows {
            let (patient_name, report_date, lab_values, source_file) = row?;
            reports.push(LabReport {
                patient_name,
                report_date: parse_report_date(&report_date)?,
                lab_values: serde_json::from_str(&lab_values)?,
                source_file,
            });
        }
        Ok(reports)
    }
}

fn parse_report_date(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidField {
            field: "report_date".into(),
            value: raw.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabMeasurement;

    fn sample_report(patient: &str, source: &str) -> LabReport {
        LabReport {
            patient_name: patient.into(),
            report_date: Utc::now(),
            lab_values: vec![
                LabMeasurement {
                    test: "Glucose".into(),
                    value: 90.0,
                    unit: "mg/dL".into(),
                },
                LabMeasurement {
                    test: "Cholesterol".into(),
                    value: 180.0,
                    unit: "mg/dL".into(),
                },
            ],
            source_file: source.into(),
        }
    }

    #[test]
    fn insert_and_find_round_trip() {
        let store = SqliteReportStore::in_memory().unwrap();
        store.insert(&sample_report("TestPDF", "sample_report.pdf")).unwrap();

        let found = store.find(&ReportFilter::by_patient("TestPDF")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_file, "sample_report.pdf");
        assert_eq!(found[0].lab_values.len(), 2);
        assert_eq!(found[0].lab_values[0].test, "Glucose");
        assert_eq!(found[0].lab_values[1].test, "Cholesterol");
    }

    #[test]
    fn find_preserves_insertion_order() {
        let store = SqliteReportStore::in_memory().unwrap();
        store.insert(&sample_report("A", "first.pdf")).unwrap();
        store.insert(&sample_report("A", "second.pdf")).unwrap();
        store.insert(&sample_report("A", "third.pdf")).unwrap();

        let found = store.find(&ReportFilter::by_patient("A")).unwrap();
        let sources: Vec<&str> = found.iter().map(|r| r.source_file.as_str()).collect();
        assert_eq!(sources, vec!["first.pdf", "second.pdf", "third.pdf"]);
    }

    #[test]
    fn find_without_filter_returns_all() {
        let store = SqliteReportStore::in_memory().unwrap();
        store.insert(&sample_report("A", "a.pdf")).unwrap();
        store.insert(&sample_report("B", "b.png")).unwrap();

        let found = store.find(&ReportFilter::default()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn find_unknown_patient_is_empty() {
        let store = SqliteReportStore::in_memory().unwrap();
        store.insert(&sample_report("A", "a.pdf")).unwrap();

        let found = store.find(&ReportFilter::by_patient("Nobody")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn empty_lab_values_round_trip() {
        let store = SqliteReportStore::in_memory().unwrap();
        let mut report = sample_report("Empty", "blank.png");
        report.lab_values.clear();
        store.insert(&report).unwrap();

        let found = store.find(&ReportFilter::by_patient("Empty")).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].lab_values.is_empty());
    }

    #[test]
    fn report_date_survives_round_trip() {
        let store = SqliteReportStore::in_memory().unwrap();
        let report = sample_report("Dated", "d.pdf");
        store.insert(&report).unwrap();

        let found = store.find(&ReportFilter::by_patient("Dated")).unwrap();
        let delta = (found[0].report_date - report.report_date).num_milliseconds().abs();
        assert!(delta < 1000, "Stored date should match stamp, delta {delta}ms");
    }
}
