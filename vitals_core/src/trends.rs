//! Trend extraction from stored report files.
//!
//! Reads a patient's report CSV back into typed samples for display and
//! charting. Older file generations predate the BMI column and carry
//! only Weight/Height; the layout is resolved once from the header and
//! each row is read through that layout.

use crate::{metrics, store::ReportStore, types::DATE_FORMAT, Error, Result, TrendPoint};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;

/// Where a row's BMI value comes from, decided once per file
#[derive(Debug)]
enum BmiSource {
    /// Current schema: a BMI column holds the value directly
    Column(usize),
    /// Legacy schema: recompute from Weight (kg) and Height (cm)
    Recompute { weight: usize, height: usize },
    /// Neither column present; BMI is absent for every row
    Absent,
}

/// Column layout of one report file, resolved from its header
#[derive(Debug)]
struct RowLayout {
    date: usize,
    blood_pressure: usize,
    glucose: usize,
    bmi: BmiSource,
}

impl RowLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| {
                Error::Validation(format!("report file missing '{name}' column"))
            })
        };

        let bmi = match position("BMI") {
            Some(index) => BmiSource::Column(index),
            None => match (position("Weight (kg)"), position("Height (cm)")) {
                (Some(weight), Some(height)) => BmiSource::Recompute { weight, height },
                _ => BmiSource::Absent,
            },
        };

        Ok(RowLayout {
            date: required("Date")?,
            blood_pressure: required("Blood Pressure")?,
            glucose: required("Glucose")?,
            bmi,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<TrendPoint> {
        let field = |index: usize| {
            record
                .get(index)
                .ok_or_else(|| Error::Validation(format!("row too short at column {index}")))
        };

        let date = NaiveDateTime::parse_from_str(field(self.date)?, DATE_FORMAT)
            .map_err(|e| Error::Validation(format!("invalid date: {e}")))?;
        let blood_pressure = parse_number(field(self.blood_pressure)?, "Blood Pressure")?;
        let glucose = parse_number(field(self.glucose)?, "Glucose")?;

        let bmi = match &self.bmi {
            BmiSource::Column(index) => Some(parse_number(field(*index)?, "BMI")?),
            BmiSource::Recompute { weight, height } => {
                let weight: f64 = parse_number(field(*weight)?, "Weight (kg)")?;
                let height: f64 = parse_number(field(*height)?, "Height (cm)")?;
                Some(metrics::bmi(weight, height)?)
            }
            BmiSource::Absent => None,
        };

        Ok(TrendPoint {
            date,
            blood_pressure,
            glucose,
            bmi,
        })
    }
}

fn parse_number<T>(value: &str, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Validation(format!("invalid {field} '{value}': {e}")))
}

/// Extract trend samples for one patient, in file order
///
/// Fails with `NotFound` when the patient has no file. Rows that fail
/// to parse are logged and skipped so one bad row does not hide the
/// rest of the history.
pub fn parse_for_trends(store: &ReportStore, name: &str) -> Result<Vec<TrendPoint>> {
    let path = store.report_path(name);
    if !path.exists() {
        return Err(Error::NotFound { name: name.to_string() });
    }

    let file = File::open(&path)?;
    fs2::FileExt::lock_shared(&file)?;

    let result = (|| -> Result<Vec<TrendPoint>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(&file));

        let layout = RowLayout::from_headers(reader.headers()?)?;

        let mut points = Vec::new();
        for (line, record) in reader.records().enumerate() {
            match layout.parse(&record?) {
                Ok(point) => points.push(point),
                Err(e) => {
                    tracing::warn!("Skipping row {} for {}: {}", line + 1, name, e);
                }
            }
        }
        Ok(points)
    })();

    fs2::FileExt::unlock(&file)?;
    let points = result?;

    tracing::debug!("Parsed {} trend points for {}", points.len(), name);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_report;
    use chrono::NaiveDate;

    fn write_file(root: &std::path::Path, name: &str, content: &str) {
        std::fs::write(root.join(format!("{name}_report.csv")), content).unwrap();
    }

    #[test]
    fn test_current_schema_reads_bmi_column() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let report = build_report("alice", 34, 118, 95, 70.0, 175.0, now).unwrap();
        store.append(&report).unwrap();

        let points = parse_for_trends(&store, "alice").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, now);
        assert_eq!(points[0].blood_pressure, 118);
        assert_eq!(points[0].glucose, 95);
        assert!((points[0].bmi.unwrap() - 22.86).abs() < 0.01);
    }

    #[test]
    fn test_legacy_schema_recomputes_bmi() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        write_file(
            temp_dir.path(),
            "bob",
            "Date,Name,Age,Blood Pressure,Glucose,Weight (kg),Height (cm)\n\
             2023-01-05 09:00:00,bob,40,130,110,80,180\n\
             2023-02-05 09:00:00,bob,40,128,105,79,180\n",
        );

        let points = parse_for_trends(&store, "bob").unwrap();
        assert_eq!(points.len(), 2);
        let expected = metrics::bmi(80.0, 180.0).unwrap();
        assert!((points[0].bmi.unwrap() - expected).abs() < 1e-9);
        assert!(points[1].bmi.is_some());
    }

    #[test]
    fn test_bare_schema_yields_absent_bmi() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        write_file(
            temp_dir.path(),
            "carol",
            "Date,Name,Blood Pressure,Glucose\n2023-01-05 09:00:00,carol,125,100\n",
        );

        let points = parse_for_trends(&store, "carol").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bmi, None);
    }

    #[test]
    fn test_unknown_patient_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        let err = parse_for_trends(&store, "nobody").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_bad_row_skipped_not_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        write_file(
            temp_dir.path(),
            "dave",
            "Date,Name,Blood Pressure,Glucose\n\
             2023-01-05 09:00:00,dave,125,100\n\
             not-a-date,dave,banana,100\n\
             2023-01-06 09:00:00,dave,122,98\n",
        );

        let points = parse_for_trends(&store, "dave").unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_missing_required_column_is_validation_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        write_file(
            temp_dir.path(),
            "erin",
            "Date,Name,Glucose\n2023-01-05 09:00:00,erin,100\n",
        );

        let err = parse_for_trends(&store, "erin").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
