//! Per-patient report persistence.
//!
//! Each patient gets an append-only CSV file named `<Name>_report.csv`
//! under an explicit storage root. The header is written once on first
//! creation and the column order is fixed, so creates and appends keep
//! the schema stable. Updates rewrite the whole file through a temp
//! file and an atomic rename so a crash mid-write cannot truncate it.

use crate::{types::DATE_FORMAT, Error, Report, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// CSV row format for report files
///
/// Fields stay strings on the read side so malformed stored values
/// surface as validation errors instead of opaque deserialize failures.
#[derive(Debug, Serialize, Deserialize)]
struct ReportRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Blood Pressure")]
    blood_pressure: String,
    #[serde(rename = "Glucose")]
    glucose: String,
    #[serde(rename = "Weight (kg)")]
    weight_kg: String,
    #[serde(rename = "Height (cm)")]
    height_cm: String,
    #[serde(rename = "BMI")]
    bmi: String,
    #[serde(rename = "BMI Category")]
    bmi_category: String,
    #[serde(rename = "Condition")]
    condition: String,
    #[serde(rename = "Recommendation")]
    recommendation: String,
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        ReportRow {
            date: report.date.format(DATE_FORMAT).to_string(),
            name: report.name.clone(),
            age: report.age.to_string(),
            blood_pressure: report.blood_pressure.to_string(),
            glucose: report.glucose.to_string(),
            weight_kg: report.weight_kg.to_string(),
            height_cm: report.height_cm.to_string(),
            bmi: format!("{:.2}", report.bmi),
            bmi_category: report.bmi_category.to_string(),
            condition: report.condition.to_string(),
            recommendation: report.recommendation.clone(),
        }
    }
}

impl TryFrom<ReportRow> for Report {
    type Error = Error;

    fn try_from(row: ReportRow) -> Result<Self> {
        let date = NaiveDateTime::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| Error::Validation(format!("invalid date '{}': {}", row.date, e)))?;

        Ok(Report {
            date,
            name: row.name,
            age: parse_field("Age", &row.age)?,
            blood_pressure: parse_field("Blood Pressure", &row.blood_pressure)?,
            glucose: parse_field("Glucose", &row.glucose)?,
            weight_kg: parse_field("Weight (kg)", &row.weight_kg)?,
            height_cm: parse_field("Height (cm)", &row.height_cm)?,
            bmi: parse_field("BMI", &row.bmi)?,
            bmi_category: row.bmi_category.parse()?,
            condition: row.condition.parse()?,
            recommendation: row.recommendation,
        })
    }
}

fn parse_field<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Validation(format!("invalid {field} '{value}': {e}")))
}

/// Per-patient CSV report store rooted at an explicit directory
#[derive(Clone, Debug)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the report file for the given patient
    pub fn report_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}_report.csv"))
    }

    /// Append one report to the patient's log
    ///
    /// Creates the file (header first) on first write. Holds an
    /// exclusive lock for the duration of the write and syncs before
    /// returning.
    pub fn append(&self, report: &Report) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let path = self.report_path(&report.name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        // Called through the trait: std's own File locking (1.89+) would
        // otherwise shadow it
        fs2::FileExt::lock_exclusive(&file)?;

        // Header only when the file is empty; checked after opening to
        // avoid a create/stat race with the lock
        let result = (|| -> Result<()> {
            let needs_headers = file.metadata()?.len() == 0;

            let mut writer = csv::WriterBuilder::new()
                .has_headers(needs_headers)
                .from_writer(&file);
            writer.serialize(ReportRow::from(report))?;
            writer.flush()?;
            drop(writer);

            file.sync_all()?;
            Ok(())
        })();

        fs2::FileExt::unlock(&file)?;
        result?;

        tracing::debug!("Appended report for {} to {:?}", report.name, path);
        Ok(())
    }

    /// Read all reports for a patient, in file order
    ///
    /// Fails with `NotFound` when the patient has no file. Malformed
    /// stored fields are validation errors, not panics.
    pub fn read_all(&self, name: &str) -> Result<Vec<Report>> {
        let path = self.report_path(name);
        if !path.exists() {
            return Err(Error::NotFound { name: name.to_string() });
        }

        let file = File::open(&path)?;
        fs2::FileExt::lock_shared(&file)?;

        let result = (|| -> Result<Vec<Report>> {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .from_reader(BufReader::new(&file));

            let mut reports = Vec::new();
            for row in reader.deserialize::<ReportRow>() {
                reports.push(Report::try_from(row?)?);
            }
            Ok(reports)
        })();

        fs2::FileExt::unlock(&file)?;
        let reports = result?;

        tracing::debug!("Read {} reports for {}", reports.len(), name);
        Ok(reports)
    }

    /// Number of stored reports for a patient
    pub fn count(&self, name: &str) -> Result<usize> {
        Ok(self.read_all(name)?.len())
    }

    /// Replace the report at a 1-based index, preserving its date
    ///
    /// Validates the index before touching anything; an out-of-range
    /// index performs no mutation. The whole file (header plus rows) is
    /// rewritten to a temp file in the same directory, synced, then
    /// renamed over the original. Returns the report as stored.
    pub fn replace(&self, name: &str, index: usize, new_report: &Report) -> Result<Report> {
        let mut reports = self.read_all(name)?;

        if index == 0 || index > reports.len() {
            return Err(Error::InvalidIndex {
                index,
                count: reports.len(),
            });
        }

        let mut replacement = new_report.clone();
        replacement.date = reports[index - 1].date;
        reports[index - 1] = replacement.clone();

        let temp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = csv::Writer::from_writer(temp.as_file());
            for report in &reports {
                writer.serialize(ReportRow::from(report))?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(self.report_path(name))
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Replaced report {} of {} for {}", index, reports.len(), name);
        Ok(replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_report;
    use chrono::NaiveDate;

    fn sample_time(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn sample_report(name: &str, day: u32, weight: f64) -> Report {
        build_report(name, 34, 118, 95, weight, 175.0, sample_time(day)).unwrap()
    }

    #[test]
    fn test_append_then_read_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        let report = sample_report("alice", 1, 70.0);
        store.append(&report).unwrap();

        let reports = store.read_all("alice").unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].date, report.date);
        assert_eq!(reports[0].age, report.age);
        assert_eq!(reports[0].blood_pressure, report.blood_pressure);
        assert_eq!(reports[0].glucose, report.glucose);
        assert_eq!(reports[0].weight_kg, report.weight_kg);
        assert_eq!(reports[0].height_cm, report.height_cm);
        // BMI is stored with two decimals
        assert!((reports[0].bmi - report.bmi).abs() < 0.01);
        assert_eq!(reports[0].bmi_category, report.bmi_category);
        assert_eq!(reports[0].condition, report.condition);
    }

    #[test]
    fn test_header_written_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        store.append(&sample_report("alice", 2, 71.0)).unwrap();

        let content = std::fs::read_to_string(store.report_path("alice")).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("Date,")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
        assert!(content.starts_with(
            "Date,Name,Age,Blood Pressure,Glucose,Weight (kg),Height (cm),\
             BMI,BMI Category,Condition,Recommendation"
        ));
    }

    #[test]
    fn test_read_unknown_patient_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        let err = store.read_all("nobody").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_files_partitioned_by_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        store.append(&sample_report("bob", 1, 85.0)).unwrap();

        assert_eq!(store.count("alice").unwrap(), 1);
        assert_eq!(store.count("bob").unwrap(), 1);
        assert!(temp_dir.path().join("alice_report.csv").exists());
        assert!(temp_dir.path().join("bob_report.csv").exists());
    }

    #[test]
    fn test_replace_preserves_original_date() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        store.append(&sample_report("alice", 2, 70.5)).unwrap();

        let new_report = sample_report("alice", 20, 95.0);
        let stored = store.replace("alice", 1, &new_report).unwrap();

        // Date kept from the replaced row, everything else from the new one
        assert_eq!(stored.date, sample_time(1));
        assert_eq!(stored.weight_kg, 95.0);

        let reports = store.read_all("alice").unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].date, sample_time(1));
        assert_eq!(reports[0].weight_kg, 95.0);
        assert_eq!(reports[1].date, sample_time(2));
        assert_eq!(reports[1].weight_kg, 70.5);
    }

    #[test]
    fn test_replace_out_of_range_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        let before = std::fs::read_to_string(store.report_path("alice")).unwrap();

        for index in [0, 2, 99] {
            let err = store
                .replace("alice", index, &sample_report("alice", 5, 80.0))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidIndex { .. }));
        }

        let after = std::fs::read_to_string(store.report_path("alice")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_replace_leaves_no_stray_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        store
            .replace("alice", 1, &sample_report("alice", 9, 72.0))
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "alice_report.csv")
            .collect();
        assert!(entries.is_empty(), "stray files: {:?}", entries);
    }

    #[test]
    fn test_malformed_numeric_is_validation_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(temp_dir.path());

        store.append(&sample_report("alice", 1, 70.0)).unwrap();
        let path = store.report_path("alice");
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.replace(",95,", ",not-a-number,")).unwrap();

        let err = store.read_all("alice").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
