//! Patient cohort: the disease-patient index and the outcome set.
//!
//! Patients are interned into dense `u32` keys. Each disease keeps its
//! patients as a sorted, de-duplicated key vector so that support sets can be
//! intersected with a linear merge.

use std::{
    borrow::Borrow,
    collections::{BTreeSet, HashMap, HashSet},
    fmt,
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::graph::DiseaseId;

/// Opaque identifier of a patient.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PatientId(Arc<str>);

impl PatientId {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatientId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for PatientId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for PatientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while assembling a cohort.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CohortError {
    /// More patients were registered than a `u32` key can address.
    #[error("cohort exceeds the maximum of {max} patients")]
    PopulationOverflow {
        /// Largest supported population.
        max: u64,
    },
}

/// Mapping from disease to the patients exhibiting it, over a fixed
/// population.
///
/// The population includes patients without any indexed disease; they count
/// towards the initial support set of a search.
///
/// # Examples
/// ```
/// use comorbid_core::{DiseaseId, DiseaseIndex};
///
/// let mut builder = DiseaseIndex::builder();
/// builder.add_diagnosis("p1", "a")?;
/// builder.add_diagnosis("p2", "a")?;
/// builder.add_patient("p3")?;
/// let index = builder.build();
/// assert_eq!(index.population_len(), 3);
/// assert_eq!(index.patient_count(&DiseaseId::from("a")), Some(2));
/// # Ok::<(), comorbid_core::CohortError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiseaseIndex {
    patients: Vec<PatientId>,
    keys: HashMap<PatientId, u32>,
    entries: HashMap<DiseaseId, Vec<u32>>,
}

impl DiseaseIndex {
    /// Starts building an index.
    #[must_use]
    pub fn builder() -> DiseaseIndexBuilder {
        DiseaseIndexBuilder::default()
    }

    /// Returns the number of patients in the population.
    #[must_use]
    pub fn population_len(&self) -> usize {
        self.patients.len()
    }

    /// Returns the number of indexed diseases.
    #[must_use]
    pub fn disease_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the indexed diseases in no particular order.
    pub fn diseases(&self) -> impl Iterator<Item = &DiseaseId> {
        self.entries.keys()
    }

    /// Returns whether the patient belongs to the population.
    #[must_use]
    pub fn contains_patient(&self, patient: &PatientId) -> bool {
        self.keys.contains_key(patient)
    }

    /// Returns how many patients exhibit `disease`, or `None` when the
    /// disease is not indexed.
    #[must_use]
    pub fn patient_count(&self, disease: &DiseaseId) -> Option<usize> {
        self.entries.get(disease).map(Vec::len)
    }

    /// Iterates the patients exhibiting `disease`.
    pub fn patients_for(&self, disease: &DiseaseId) -> impl Iterator<Item = &PatientId> {
        self.entries
            .get(disease)
            .into_iter()
            .flatten()
            .filter_map(|&key| self.patient(key))
    }

    pub(crate) fn patient(&self, key: u32) -> Option<&PatientId> {
        self.patients.get(key as usize)
    }

    pub(crate) fn key_of(&self, patient: &PatientId) -> Option<u32> {
        self.keys.get(patient).copied()
    }

    pub(crate) fn keys_for(&self, disease: &DiseaseId) -> Option<&[u32]> {
        self.entries.get(disease).map(Vec::as_slice)
    }

    /// Keys of the full population, ascending.
    pub(crate) fn population_keys(&self) -> Vec<u32> {
        (0..self.patients.len())
            .filter_map(|key| u32::try_from(key).ok())
            .collect()
    }
}

/// Incremental builder for [`DiseaseIndex`].
#[derive(Clone, Debug, Default)]
pub struct DiseaseIndexBuilder {
    index: DiseaseIndex,
}

impl DiseaseIndexBuilder {
    /// Registers a patient in the population.
    ///
    /// # Errors
    /// Returns [`CohortError::PopulationOverflow`] once the population no
    /// longer fits a `u32` key.
    pub fn add_patient(&mut self, patient: impl Into<PatientId>) -> Result<&mut Self, CohortError> {
        self.intern(patient.into())?;
        Ok(self)
    }

    /// Records that `patient` exhibits `disease`, registering the patient if
    /// needed.
    ///
    /// # Errors
    /// Returns [`CohortError::PopulationOverflow`] once the population no
    /// longer fits a `u32` key.
    pub fn add_diagnosis(
        &mut self,
        patient: impl Into<PatientId>,
        disease: impl Into<DiseaseId>,
    ) -> Result<&mut Self, CohortError> {
        let key = self.intern(patient.into())?;
        self.index
            .entries
            .entry(disease.into())
            .or_default()
            .push(key);
        Ok(self)
    }

    /// Registers a disease, which may have no patients.
    pub fn add_disease(&mut self, disease: impl Into<DiseaseId>) -> &mut Self {
        self.index.entries.entry(disease.into()).or_default();
        self
    }

    /// Finalises the index, sorting every patient list.
    #[must_use]
    pub fn build(self) -> DiseaseIndex {
        let mut index = self.index;
        for keys in index.entries.values_mut() {
            keys.sort_unstable();
            keys.dedup();
        }
        index
    }

    fn intern(&mut self, patient: PatientId) -> Result<u32, CohortError> {
        if let Some(&key) = self.index.keys.get(&patient) {
            return Ok(key);
        }
        let key = u32::try_from(self.index.patients.len()).map_err(|_| {
            CohortError::PopulationOverflow {
                max: u64::from(u32::MAX),
            }
        })?;
        self.index.patients.push(patient.clone());
        self.index.keys.insert(patient, key);
        Ok(key)
    }
}

/// Patients flagged with the tracked outcome.
///
/// # Examples
/// ```
/// use comorbid_core::{OutcomeSet, PatientId};
///
/// let outcomes: OutcomeSet = ["p1", "p2"].into_iter().map(PatientId::from).collect();
/// assert!(outcomes.contains(&PatientId::from("p1")));
/// assert_eq!(outcomes.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutcomeSet {
    patients: HashSet<PatientId>,
}

impl OutcomeSet {
    /// Creates an empty outcome set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags a patient; returns `false` if it was already flagged.
    pub fn insert(&mut self, patient: impl Into<PatientId>) -> bool {
        self.patients.insert(patient.into())
    }

    /// Returns whether the patient is flagged.
    #[must_use]
    pub fn contains(&self, patient: &PatientId) -> bool {
        self.patients.contains(patient)
    }

    /// Returns the number of flagged patients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Returns whether no patient is flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Iterates the flagged patients in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PatientId> {
        self.patients.iter()
    }
}

impl FromIterator<PatientId> for OutcomeSet {
    fn from_iter<T: IntoIterator<Item = PatientId>>(iter: T) -> Self {
        Self {
            patients: iter.into_iter().collect(),
        }
    }
}

/// One patient's raw record: outcome flag plus diagnosed diseases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    /// Patient identifier.
    pub id: PatientId,
    /// Whether the patient carries the tracked outcome.
    pub expired: bool,
    /// Diseases recorded for the patient.
    pub diseases: Vec<DiseaseId>,
}

/// Disease index and outcome set derived from the same records.
#[derive(Clone, Debug, Default)]
pub struct Cohort {
    index: DiseaseIndex,
    outcomes: OutcomeSet,
}

impl Cohort {
    /// Pairs an existing index with an outcome set.
    #[must_use]
    pub fn new(index: DiseaseIndex, outcomes: OutcomeSet) -> Self {
        Self { index, outcomes }
    }

    /// Builds the index and outcome set from patient records in one pass.
    ///
    /// Diseases in `excluded` are not indexed, but their patients stay in the
    /// population. Repeated patient ids merge their diseases, and a patient
    /// is flagged if any of its records is.
    ///
    /// # Errors
    /// Returns [`CohortError::PopulationOverflow`] for oversized cohorts.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeSet;
    /// use comorbid_core::{Cohort, DiseaseId, PatientRecord};
    ///
    /// let records = vec![
    ///     PatientRecord { id: "1".into(), expired: true, diseases: vec!["a".into(), "b".into()] },
    ///     PatientRecord { id: "2".into(), expired: false, diseases: vec!["b".into()] },
    /// ];
    /// let excluded = BTreeSet::from([DiseaseId::from("a")]);
    /// let cohort = Cohort::from_records(records, &excluded)?;
    /// assert_eq!(cohort.index().population_len(), 2);
    /// assert_eq!(cohort.index().patient_count(&"a".into()), None);
    /// assert_eq!(cohort.outcomes().len(), 1);
    /// # Ok::<(), comorbid_core::CohortError>(())
    /// ```
    #[instrument(name = "core.cohort.from_records", err, skip_all, fields(excluded = excluded.len()))]
    pub fn from_records<I>(records: I, excluded: &BTreeSet<DiseaseId>) -> Result<Self, CohortError>
    where
        I: IntoIterator<Item = PatientRecord>,
    {
        let mut builder = DiseaseIndex::builder();
        let mut outcomes = OutcomeSet::new();
        for record in records {
            builder.add_patient(record.id.clone())?;
            if record.expired {
                outcomes.insert(record.id.clone());
            }
            for disease in record.diseases {
                if excluded.contains(&disease) {
                    continue;
                }
                builder.add_diagnosis(record.id.clone(), disease)?;
            }
        }
        let index = builder.build();
        debug!(
            patients = index.population_len(),
            diseases = index.disease_count(),
            outcomes = outcomes.len(),
            "cohort indexed"
        );
        Ok(Self { index, outcomes })
    }

    /// Returns the disease index.
    #[must_use]
    pub fn index(&self) -> &DiseaseIndex {
        &self.index
    }

    /// Returns the outcome set.
    #[must_use]
    pub fn outcomes(&self) -> &OutcomeSet {
        &self.outcomes
    }

    /// Splits the cohort into its parts.
    #[must_use]
    pub fn into_parts(self) -> (DiseaseIndex, OutcomeSet) {
        (self.index, self.outcomes)
    }

    /// Returns every indexed disease exhibited by at least one flagged
    /// patient.
    #[must_use]
    pub fn outcome_diseases(&self) -> BTreeSet<DiseaseId> {
        self.index
            .entries
            .iter()
            .filter(|(_, keys)| {
                keys.iter().any(|&key| {
                    self.index
                        .patient(key)
                        .is_some_and(|patient| self.outcomes.contains(patient))
                })
            })
            .map(|(disease, _)| disease.clone())
            .collect()
    }
}
