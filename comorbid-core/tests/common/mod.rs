use comorbid_core::{Cohort, ComorbidityGraph, DiseaseId, PatientRecord};

/// One patient record from literal parts.
#[must_use]
pub fn record(id: &str, expired: bool, diseases: &[&str]) -> PatientRecord {
    PatientRecord {
        id: id.into(),
        expired,
        diseases: diseases.iter().map(|&disease| DiseaseId::from(disease)).collect(),
    }
}

/// Small hospital-style cohort: hypertension (401), diabetes (250) and
/// kidney failure (585) co-occur among the expired patients.
#[must_use]
pub fn ward() -> (ComorbidityGraph, Cohort) {
    let records = vec![
        record("1", true, &["401", "250", "585"]),
        record("2", true, &["401", "250", "585"]),
        record("3", false, &["401", "250"]),
        record("4", false, &["401"]),
        record("5", true, &["585", "428"]),
        record("6", false, &["428"]),
        record("7", false, &[]),
    ];
    let cohort = Cohort::from_records(records, &Default::default()).expect("ward cohort fits");
    let graph = ComorbidityGraph::builder("ward")
        .with_edge("401", "250")
        .with_edge("401", "585")
        .with_edge("250", "585")
        .with_edge("585", "428")
        .build();
    (graph, cohort)
}
