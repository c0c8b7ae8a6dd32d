//! Loaders turning patient-record JSON and comorbidity edge lists into
//! `comorbid-core` inputs.

mod edges;
mod errors;
mod records;

pub use edges::EdgeList;
pub use errors::{RecordsProviderError, RecordsProviderErrorCode};
pub use records::PatientRecords;
