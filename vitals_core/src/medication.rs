//! Per-patient medication log.
//!
//! Same file conventions as the report store: one CSV per patient
//! (`<Name>_medication.csv`), header written once on first creation,
//! append-only afterwards.

use crate::{Error, Medication, Result};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::PathBuf;

/// Append-only medication log rooted at an explicit directory
#[derive(Clone, Debug)]
pub struct MedicationLog {
    root: PathBuf,
}

impl MedicationLog {
    /// Create a log rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the medication file for the given patient
    pub fn medication_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}_medication.csv"))
    }

    /// Append one medication entry to the patient's log
    pub fn append(&self, name: &str, medication: &Medication) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let path = self.medication_path(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        fs2::FileExt::lock_exclusive(&file)?;

        let result = (|| -> Result<()> {
            let needs_headers = file.metadata()?.len() == 0;

            let mut writer = csv::WriterBuilder::new()
                .has_headers(needs_headers)
                .from_writer(&file);
            writer.serialize(medication)?;
            writer.flush()?;
            drop(writer);

            file.sync_all()?;
            Ok(())
        })();

        fs2::FileExt::unlock(&file)?;
        result?;

        tracing::debug!("Added medication for {} to {:?}", name, path);
        Ok(())
    }

    /// Read all medication entries for a patient, in file order
    ///
    /// Fails with `NotFound` when the patient has no medication file.
    pub fn read_all(&self, name: &str) -> Result<Vec<Medication>> {
        let path = self.medication_path(name);
        if !path.exists() {
            return Err(Error::NotFound { name: name.to_string() });
        }

        let file = File::open(&path)?;
        fs2::FileExt::lock_shared(&file)?;

        let result = (|| -> Result<Vec<Medication>> {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .from_reader(BufReader::new(&file));

            let mut medications = Vec::new();
            for row in reader.deserialize::<Medication>() {
                medications.push(row?);
            }
            Ok(medications)
        })();

        fs2::FileExt::unlock(&file)?;
        result
    }
}
