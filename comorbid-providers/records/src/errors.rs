use std::{fmt, io, path::PathBuf};

use comorbid_core::CohortError;
use thiserror::Error;

/// Failures raised while loading records or edge lists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecordsProviderError {
    #[error("failed to open `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("patient records are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("edge list line {line} needs a source and a target, found `{content}`")]
    MalformedEdge { line: usize, content: String },
    #[error(transparent)]
    Cohort(#[from] CohortError),
}

/// Stable codes describing [`RecordsProviderError`] variants.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RecordsProviderErrorCode {
    Open,
    Io,
    Json,
    MalformedEdge,
    Cohort,
}

impl RecordsProviderErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "RECORDS_OPEN",
            Self::Io => "RECORDS_IO",
            Self::Json => "RECORDS_JSON",
            Self::MalformedEdge => "RECORDS_MALFORMED_EDGE",
            Self::Cohort => "RECORDS_COHORT",
        }
    }
}

impl fmt::Display for RecordsProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecordsProviderError {
    /// Retrieve the stable [`RecordsProviderErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> RecordsProviderErrorCode {
        match self {
            Self::Open { .. } => RecordsProviderErrorCode::Open,
            Self::Io(_) => RecordsProviderErrorCode::Io,
            Self::Json(_) => RecordsProviderErrorCode::Json,
            Self::MalformedEdge { .. } => RecordsProviderErrorCode::MalformedEdge,
            Self::Cohort(_) => RecordsProviderErrorCode::Cohort,
        }
    }

    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
