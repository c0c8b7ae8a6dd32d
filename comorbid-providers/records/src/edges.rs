//! Comorbidity edge lists: one `source target [attributes...]` per line.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use comorbid_core::{ComorbidityGraph, DiseaseId};
use tracing::{debug, instrument};

use crate::errors::RecordsProviderError;

/// Undirected edges in file order.
///
/// Blank lines and lines starting with `#` are skipped; tokens after the
/// target are ignored.
///
/// # Examples
/// ```
/// use comorbid_core::{DiseaseId, GraphProvider};
/// use comorbid_providers_records::EdgeList;
///
/// let edges = EdgeList::from_reader("401 250 {'weight': 0.4}\n# note\n250 585 {}\n".as_bytes())?;
/// assert_eq!(edges.len(), 2);
/// let graph = edges.into_graph("ward", ["250", "401"].map(DiseaseId::from));
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// # Ok::<(), comorbid_providers_records::RecordsProviderError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeList {
    edges: Vec<(DiseaseId, DiseaseId)>,
}

impl EdgeList {
    /// Parses an edge list from `reader`.
    ///
    /// # Errors
    /// Returns [`RecordsProviderError::MalformedEdge`] for a line holding a
    /// single token and [`RecordsProviderError::Io`] when reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RecordsProviderError> {
        let mut edges = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let mut tokens = content.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(source), Some(target)) => {
                    edges.push((DiseaseId::from(source), DiseaseId::from(target)));
                }
                _ => {
                    return Err(RecordsProviderError::MalformedEdge {
                        line: number + 1,
                        content: content.to_owned(),
                    });
                }
            }
        }
        Ok(Self { edges })
    }

    /// Opens and parses the edge list at `path`.
    ///
    /// # Errors
    /// Returns [`RecordsProviderError::Open`] when the file cannot be opened,
    /// otherwise as [`Self::from_reader`].
    #[instrument(name = "records.edges", err, skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, RecordsProviderError> {
        let file = File::open(path).map_err(|source| RecordsProviderError::open(path, source))?;
        let edges = Self::from_reader(BufReader::new(file))?;
        debug!(edges = edges.len(), "edge list loaded");
        Ok(edges)
    }

    #[must_use]
    pub fn edges(&self) -> &[(DiseaseId, DiseaseId)] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Builds a graph over exactly `nodes`, keeping the edges whose endpoints
    /// are both in `nodes`.
    #[must_use]
    pub fn into_graph(
        self,
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = DiseaseId>,
    ) -> ComorbidityGraph {
        let mut builder = ComorbidityGraph::builder(name);
        for (source, target) in self.edges {
            builder.add_edge(source, target);
        }
        builder.restrict_to(nodes).build()
    }
}
