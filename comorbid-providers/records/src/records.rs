//! Patient-record JSON.
//!
//! The document is an object keyed by patient id whose values are
//! `[status, [disease, ...]]`. Status `1` marks the outcome; disease codes
//! may be strings or numbers.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use comorbid_core::{Cohort, DiseaseId, PatientRecord};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::RecordsProviderError;

const OUTCOME_STATUS: i64 = 1;

#[derive(Deserialize)]
struct RawRecord(i64, Vec<Code>);

#[derive(Deserialize)]
#[serde(untagged)]
enum Code {
    Text(String),
    Number(serde_json::Number),
}

impl From<Code> for DiseaseId {
    fn from(code: Code) -> Self {
        match code {
            Code::Text(text) => Self::from(text),
            Code::Number(number) => Self::from(number.to_string()),
        }
    }
}

/// Parsed patient records, ordered by patient id.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use comorbid_providers_records::PatientRecords;
///
/// let records = PatientRecords::from_json_str(r#"{"1": [1, ["401", 250]], "2": [0, []]}"#)?;
/// assert_eq!(records.len(), 2);
/// let cohort = records.into_cohort(&BTreeSet::new())?;
/// assert_eq!(cohort.outcomes().len(), 1);
/// # Ok::<(), comorbid_providers_records::RecordsProviderError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientRecords {
    records: Vec<PatientRecord>,
}

impl PatientRecords {
    /// Parses a records document held in memory.
    ///
    /// # Errors
    /// Returns [`RecordsProviderError::Json`] when the document does not
    /// match the record layout.
    pub fn from_json_str(json: &str) -> Result<Self, RecordsProviderError> {
        let raw: BTreeMap<String, RawRecord> = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Parses a records document from `reader`.
    ///
    /// # Errors
    /// Returns [`RecordsProviderError::Json`] for malformed documents,
    /// including read failures surfaced by the parser.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordsProviderError> {
        let raw: BTreeMap<String, RawRecord> = serde_json::from_reader(BufReader::new(reader))?;
        Ok(Self::from_raw(raw))
    }

    /// Opens and parses the records file at `path`.
    ///
    /// # Errors
    /// Returns [`RecordsProviderError::Open`] when the file cannot be opened
    /// and [`RecordsProviderError::Json`] when it cannot be parsed.
    #[instrument(name = "records.load", err, skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, RecordsProviderError> {
        let file = File::open(path).map_err(|source| RecordsProviderError::open(path, source))?;
        let records = Self::from_reader(file)?;
        debug!(
            patients = records.len(),
            outcomes = records.outcome_count(),
            "patient records loaded"
        );
        Ok(records)
    }

    fn from_raw(raw: BTreeMap<String, RawRecord>) -> Self {
        let records = raw
            .into_iter()
            .map(|(id, RawRecord(status, codes))| PatientRecord {
                id: id.into(),
                expired: status == OUTCOME_STATUS,
                diseases: codes.into_iter().map(DiseaseId::from).collect(),
            })
            .collect();
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records flagged with the outcome.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.records.iter().filter(|record| record.expired).count()
    }

    /// Builds the disease index and outcome set, leaving `excluded` diseases
    /// unindexed.
    ///
    /// # Errors
    /// Propagates [`comorbid_core::CohortError`] as
    /// [`RecordsProviderError::Cohort`].
    pub fn into_cohort(self, excluded: &BTreeSet<DiseaseId>) -> Result<Cohort, RecordsProviderError> {
        Ok(Cohort::from_records(self.records, excluded)?)
    }
}
