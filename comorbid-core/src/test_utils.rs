//! Shared test utilities for `comorbid-core`.

use comorbid_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{
    cohort::{DiseaseIndex, OutcomeSet, PatientId},
    graph::{ComorbidityGraph, DiseaseId, GraphProvider},
    ranking::Score,
    result::SearchReport,
};

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Raw description of a small cohort over nodes `0..node_count`.
///
/// `patients[p]` lists the diseases of patient `p`; `flagged[p]` marks the
/// outcome.
#[derive(Clone, Debug)]
pub(crate) struct Sample {
    pub(crate) node_count: usize,
    pub(crate) edges: Vec<(usize, usize)>,
    pub(crate) patients: Vec<Vec<usize>>,
    pub(crate) flagged: Vec<bool>,
}

impl Sample {
    pub(crate) fn is_flagged(&self, patient: usize) -> bool {
        self.flagged.get(patient).copied().unwrap_or(false)
    }

    fn adjacent(&self, a: usize, b: usize) -> bool {
        self.edges
            .iter()
            .any(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a))
    }
}

/// Graph, index and outcomes addressed by small integers.
///
/// Node `i` is named `d{i}`, so for fewer than ten nodes the identifier
/// order matches the index order. Patient `p` is named `p{p}`.
pub(crate) struct Fixture {
    pub(crate) graph: ComorbidityGraph,
    pub(crate) index: DiseaseIndex,
    pub(crate) outcomes: OutcomeSet,
}

/// A clique as `(node indices, outcomes, support)`.
pub(crate) type Flat = (Vec<usize>, usize, usize);

impl Fixture {
    pub(crate) fn new(sample: &Sample) -> Self {
        let node_count = sample.node_count;
        let mut graph = ComorbidityGraph::builder("fixture");
        for node in 0..node_count {
            graph.add_node(disease(node));
        }
        for &(left, right) in &sample.edges {
            graph.add_edge(disease(left), disease(right));
        }

        let mut index = DiseaseIndex::builder();
        for node in 0..node_count {
            index.add_disease(disease(node));
        }
        let mut outcomes = OutcomeSet::new();
        for (patient, diseases) in sample.patients.iter().enumerate() {
            index
                .add_patient(patient_id(patient))
                .expect("fixture cohorts are small");
            for &node in diseases {
                index
                    .add_diagnosis(patient_id(patient), disease(node))
                    .expect("fixture cohorts are small");
            }
            if sample.is_flagged(patient) {
                outcomes.insert(patient_id(patient));
            }
        }

        Self {
            graph: graph.build(),
            index: index.build(),
            outcomes,
        }
    }

    /// Maps a report back to node indices.
    pub(crate) fn flatten(&self, report: &SearchReport) -> Vec<Flat> {
        report
            .cliques()
            .iter()
            .map(|clique| {
                let members = clique
                    .members()
                    .iter()
                    .map(|id| self.graph.index_of(id).expect("reported nodes exist"))
                    .collect();
                (members, clique.outcomes(), clique.support())
            })
            .collect()
    }
}

pub(crate) fn disease(node: usize) -> DiseaseId {
    DiseaseId::from(format!("d{node}"))
}

pub(crate) fn patient_id(patient: usize) -> PatientId {
    PatientId::from(format!("p{patient}"))
}

/// Exhaustive reference: scores every clique of size `1..=size_bound` that
/// strictly contains `fixed`, keeps those meeting the support threshold and
/// returns the best `capacity` under the documented ranking.
pub(crate) fn brute_force(
    sample: &Sample,
    size_bound: usize,
    min_support: usize,
    capacity: usize,
    fixed: &[usize],
) -> Vec<Flat> {
    let node_count = sample.node_count;
    let patients = &sample.patients;
    let threshold = min_support.max(1);
    let mut found: Vec<Flat> = Vec::new();
    for mask in 1_u32..(1 << node_count) {
        let members: Vec<usize> = (0..node_count).filter(|&n| mask & (1 << n) != 0).collect();
        if members.len() > size_bound || members.len() <= fixed.len() {
            continue;
        }
        if !fixed.iter().all(|f| members.contains(f)) {
            continue;
        }
        let is_clique = members
            .iter()
            .enumerate()
            .all(|(i, &a)| members[i + 1..].iter().all(|&b| a != b && sample.adjacent(a, b)));
        if !is_clique {
            continue;
        }
        let support: Vec<usize> = (0..patients.len())
            .filter(|&p| members.iter().all(|m| patients[p].contains(m)))
            .collect();
        if support.len() < threshold {
            continue;
        }
        let outcomes = support
            .iter()
            .filter(|&&p| sample.is_flagged(p))
            .count();
        found.push((members, outcomes, support.len()));
    }
    found.sort_by(|a, b| {
        let score_a = Score::new(a.1, a.2).expect("support is non-empty");
        let score_b = Score::new(b.1, b.2).expect("support is non-empty");
        score_b
            .cmp(&score_a)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(&b.0))
    });
    found.truncate(capacity);
    found
}
