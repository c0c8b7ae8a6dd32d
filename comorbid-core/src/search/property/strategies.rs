//! Strategy builders for clique search property tests.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::test_utils::Sample;

use super::types::{GraphShape, SearchCase};

/// Upper bound on generated nodes; keeps the exhaustive oracle cheap.
const MAX_NODES: usize = 8;
/// Upper bound on generated patients.
const MAX_PATIENTS: usize = 16;

/// Generates cases across every [`GraphShape`], biased towards dense graphs
/// where cliques are plentiful.
pub(super) fn search_case_strategy() -> impl Strategy<Value = SearchCase> {
    let shape = prop_oneof![
        1 => Just(GraphShape::Edgeless),
        2 => Just(GraphShape::Sparse),
        3 => Just(GraphShape::Dense),
        2 => Just(GraphShape::Complete),
    ];
    (shape, any::<u64>()).prop_map(|(shape, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_case(shape, &mut rng)
    })
}

/// Generates a case for a specific shape.
pub(super) fn generate_case(shape: GraphShape, rng: &mut SmallRng) -> SearchCase {
    let node_count = rng.gen_range(1..=MAX_NODES);
    let edge_probability = match shape {
        GraphShape::Edgeless => 0.0,
        GraphShape::Sparse => 0.2,
        GraphShape::Dense => rng.gen_range(0.6..0.95),
        GraphShape::Complete => 1.0,
    };
    let mut edges = Vec::new();
    for left in 0..node_count {
        for right in left + 1..node_count {
            if rng.gen_bool(edge_probability) {
                edges.push((left, right));
            }
        }
    }

    let patient_count = rng.gen_range(0..=MAX_PATIENTS);
    let diagnosis_probability = rng.gen_range(0.2..0.9);
    let outcome_probability = rng.gen_range(0.0..=1.0);
    let mut patients = Vec::with_capacity(patient_count);
    let mut flagged = Vec::with_capacity(patient_count);
    for _ in 0..patient_count {
        patients.push(
            (0..node_count)
                .filter(|_| rng.gen_bool(diagnosis_probability))
                .collect(),
        );
        flagged.push(rng.gen_bool(outcome_probability));
    }

    let size_bound = rng.gen_range(1..=4);
    let fixed = if rng.gen_bool(0.25) {
        vec![rng.gen_range(0..node_count)]
    } else {
        Vec::new()
    };

    SearchCase {
        sample: Sample {
            node_count,
            edges,
            patients,
            flagged,
        },
        size_bound,
        min_support: rng.gen_range(0..=3),
        capacity: rng.gen_range(1..=8),
        fixed,
        shape,
    }
}
