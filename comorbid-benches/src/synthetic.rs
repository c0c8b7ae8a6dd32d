//! Seeded synthetic cohorts and comorbidity graphs.

use std::collections::BTreeSet;

use comorbid_core::{Cohort, CohortError, ComorbidityGraph, DiseaseId, PatientRecord};
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::index::sample};

/// Errors that may occur while generating a synthetic cohort.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The requested disease count was zero.
    #[error("disease count must be greater than zero")]
    ZeroDiseases,
    /// The requested patient count was zero.
    #[error("patient count must be greater than zero")]
    ZeroPatients,
    /// Patients must be able to carry at least one disease.
    #[error("diseases per patient must be greater than zero")]
    ZeroDiseasesPerPatient,
    /// A probability lay outside `[0, 1]`.
    #[error("probability `{parameter}` must lie in [0, 1]")]
    InvalidProbability {
        /// Name of the invalid parameter.
        parameter: &'static str,
    },
    /// Indexing the generated records failed.
    #[error(transparent)]
    Cohort(#[from] CohortError),
}

/// Shape of a synthetic cohort.
#[derive(Clone, Debug)]
pub struct SyntheticCohortConfig {
    /// Number of diseases, which are also the graph nodes.
    pub diseases: usize,
    /// Number of patients.
    pub patients: usize,
    /// Upper bound on the diseases drawn per patient.
    pub max_diseases_per_patient: usize,
    /// Probability that two diseases are adjacent.
    pub edge_probability: f64,
    /// Probability that a patient carries the outcome.
    pub outcome_probability: f64,
    /// Seed for the generator.
    pub seed: u64,
}

/// A random comorbidity graph with a cohort indexed over the same diseases.
#[derive(Clone, Debug)]
pub struct SyntheticCohort {
    graph: ComorbidityGraph,
    cohort: Cohort,
}

impl SyntheticCohort {
    /// Generates a cohort and graph deterministically from `config.seed`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when a count is zero or a probability lies
    /// outside `[0, 1]`.
    pub fn generate(config: &SyntheticCohortConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let ids: Vec<DiseaseId> = (0..config.diseases).map(disease_id).collect();

        let mut builder = ComorbidityGraph::builder("synthetic");
        for (left, left_id) in ids.iter().enumerate() {
            builder.add_node(left_id.clone());
            for right_id in ids.iter().skip(left + 1) {
                if rng.gen_bool(config.edge_probability) {
                    builder.add_edge(left_id.clone(), right_id.clone());
                }
            }
        }

        let per_patient = config.max_diseases_per_patient.min(config.diseases);
        let records: Vec<PatientRecord> = (0..config.patients)
            .map(|patient| {
                let count = rng.gen_range(1..=per_patient);
                let diseases = sample(&mut rng, config.diseases, count)
                    .into_iter()
                    .filter_map(|index| ids.get(index).cloned())
                    .collect();
                PatientRecord {
                    id: format!("P{patient}").into(),
                    expired: rng.gen_bool(config.outcome_probability),
                    diseases,
                }
            })
            .collect();
        let cohort = Cohort::from_records(records, &BTreeSet::new())?;

        Ok(Self {
            graph: builder.build(),
            cohort,
        })
    }

    /// The generated graph.
    #[must_use]
    pub const fn graph(&self) -> &ComorbidityGraph {
        &self.graph
    }

    /// The generated cohort.
    #[must_use]
    pub const fn cohort(&self) -> &Cohort {
        &self.cohort
    }
}

fn validate(config: &SyntheticCohortConfig) -> Result<(), SyntheticError> {
    if config.diseases == 0 {
        return Err(SyntheticError::ZeroDiseases);
    }
    if config.patients == 0 {
        return Err(SyntheticError::ZeroPatients);
    }
    if config.max_diseases_per_patient == 0 {
        return Err(SyntheticError::ZeroDiseasesPerPatient);
    }
    for (parameter, value) in [
        ("edge_probability", config.edge_probability),
        ("outcome_probability", config.outcome_probability),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SyntheticError::InvalidProbability { parameter });
        }
    }
    Ok(())
}

fn disease_id(index: usize) -> DiseaseId {
    DiseaseId::from(format!("D{index:04}"))
}
