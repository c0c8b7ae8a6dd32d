//! Comorbid core library: density-constrained clique search over a
//! comorbidity graph.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cohort;
mod error;
mod graph;
mod ranking;
mod result;
mod search;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    cohort::{
        Cohort, CohortError, DiseaseIndex, DiseaseIndexBuilder, OutcomeSet, PatientId,
        PatientRecord,
    },
    error::{GraphError, GraphErrorCode, Result, SearchError, SearchErrorCode},
    graph::{ComorbidityGraph, DiseaseId, GraphBuilder, GraphProvider},
    ranking::{Admission, RankedClique, Score, TopKQueue},
    result::{ScoredClique, SearchReport, Termination},
    search::{CancellationToken, CliqueSearch, CliqueSearchBuilder, ExecutionStrategy, SearchLimits},
};
