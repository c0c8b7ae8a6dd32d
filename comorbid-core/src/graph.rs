//! Comorbidity graph abstractions.
//!
//! The search addresses nodes by dense indices `0..node_count`. Providers
//! expose each node's neighbours as a strictly ascending, self-loop free
//! slice, and adjacency must be symmetric. [`GraphProvider::validate`] checks
//! that contract before a search starts.

use std::{
    borrow::Borrow,
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use tracing::debug;

use crate::error::GraphError;

/// Opaque identifier of a disease (a graph node).
///
/// Identifiers are cheap to clone and order lexicographically.
///
/// # Examples
/// ```
/// use comorbid_core::DiseaseId;
///
/// let id = DiseaseId::from("252");
/// assert_eq!(id.as_str(), "252");
/// assert!(DiseaseId::from("10") < DiseaseId::from("9"));
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DiseaseId(Arc<str>);

impl DiseaseId {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiseaseId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for DiseaseId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for DiseaseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only undirected graph over disease identifiers.
///
/// # Examples
/// ```
/// use comorbid_core::{ComorbidityGraph, GraphProvider};
///
/// let graph = ComorbidityGraph::builder("demo")
///     .with_edge("a", "b")
///     .with_node("c")
///     .build();
/// assert_eq!(graph.node_count(), 3);
/// let a = graph.index_of(&"a".into()).expect("a is present");
/// let b = graph.index_of(&"b".into()).expect("b is present");
/// assert_eq!(graph.neighbours(a)?, &[b]);
/// assert!(graph.validate().is_ok());
/// # Ok::<(), comorbid_core::GraphError>(())
/// ```
pub trait GraphProvider {
    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the number of nodes.
    fn node_count(&self) -> usize;

    /// Returns whether the graph has no nodes.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Returns the identifier stored at `index`.
    fn node(&self, index: usize) -> Option<&DiseaseId>;

    /// Returns the neighbours of `index` in strictly ascending order.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] for invalid indices.
    fn neighbours(&self, index: usize) -> Result<&[usize], GraphError>;

    /// Resolves an identifier to its node index.
    ///
    /// The default implementation scans every node; implementations holding
    /// a lookup table should override it.
    fn index_of(&self, id: &DiseaseId) -> Option<usize> {
        (0..self.node_count()).find(|&index| self.node(index) == Some(id))
    }

    /// Returns whether `left` and `right` share an edge.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when `left` is invalid.
    fn are_adjacent(&self, left: usize, right: usize) -> Result<bool, GraphError> {
        Ok(self.neighbours(left)?.binary_search(&right).is_ok())
    }

    /// Checks the provider contract: indices in range, strictly ascending
    /// neighbour lists, no self loops, symmetric adjacency.
    ///
    /// # Errors
    /// Returns the first [`GraphError`] encountered.
    fn validate(&self) -> Result<(), GraphError> {
        let node_count = self.node_count();
        for node in 0..node_count {
            let neighbours = self.neighbours(node)?;
            if neighbours.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(GraphError::UnsortedNeighbours { node });
            }
            for &other in neighbours {
                if other >= node_count {
                    return Err(GraphError::NodeOutOfBounds {
                        index: other,
                        node_count,
                    });
                }
                if other == node {
                    return Err(GraphError::SelfLoop { node });
                }
                if !self.are_adjacent(other, node)? {
                    return Err(GraphError::AsymmetricEdge {
                        from: node,
                        to: other,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Adjacency-list graph built from disease identifiers.
///
/// Node indices follow the lexicographic order of the identifiers.
#[derive(Clone, Debug)]
pub struct ComorbidityGraph {
    name: String,
    nodes: Vec<DiseaseId>,
    lookup: HashMap<DiseaseId, usize>,
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
}

impl ComorbidityGraph {
    /// Starts building a graph with the given display name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> GraphBuilder {
        GraphBuilder::new(name)
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns the node identifiers in index order.
    #[must_use]
    pub fn nodes(&self) -> &[DiseaseId] {
        &self.nodes
    }
}

impl GraphProvider for ComorbidityGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, index: usize) -> Option<&DiseaseId> {
        self.nodes.get(index)
    }

    fn neighbours(&self, index: usize) -> Result<&[usize], GraphError> {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .ok_or(GraphError::NodeOutOfBounds {
                index,
                node_count: self.nodes.len(),
            })
    }

    fn index_of(&self, id: &DiseaseId) -> Option<usize> {
        self.lookup.get(id).copied()
    }
}

/// Incrementally collects nodes and edges for a [`ComorbidityGraph`].
///
/// Self loops and repeated edges are ignored. When a node restriction is set
/// the graph contains exactly the restricted nodes, and edges touching any
/// other node are dropped.
///
/// # Examples
/// ```
/// use comorbid_core::{ComorbidityGraph, DiseaseId, GraphProvider};
///
/// let graph = ComorbidityGraph::builder("restricted")
///     .with_edge("a", "b")
///     .with_edge("b", "z")
///     .restrict_to(["a", "b", "c"].map(DiseaseId::from))
///     .build();
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    name: String,
    nodes: BTreeSet<DiseaseId>,
    edges: Vec<(DiseaseId, DiseaseId)>,
    restriction: Option<BTreeSet<DiseaseId>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: BTreeSet::new(),
            edges: Vec::new(),
            restriction: None,
        }
    }

    /// Registers a node, which may remain isolated.
    pub fn add_node(&mut self, node: impl Into<DiseaseId>) -> &mut Self {
        self.nodes.insert(node.into());
        self
    }

    /// Registers an undirected edge and both endpoints.
    pub fn add_edge(&mut self, left: impl Into<DiseaseId>, right: impl Into<DiseaseId>) -> &mut Self {
        let left = left.into();
        let right = right.into();
        self.nodes.insert(left.clone());
        self.nodes.insert(right.clone());
        self.edges.push((left, right));
        self
    }

    /// Consuming form of [`Self::add_node`].
    #[must_use]
    pub fn with_node(mut self, node: impl Into<DiseaseId>) -> Self {
        self.add_node(node);
        self
    }

    /// Consuming form of [`Self::add_edge`].
    #[must_use]
    pub fn with_edge(mut self, left: impl Into<DiseaseId>, right: impl Into<DiseaseId>) -> Self {
        self.add_edge(left, right);
        self
    }

    /// Limits the graph to exactly `nodes`.
    #[must_use]
    pub fn restrict_to(mut self, nodes: impl IntoIterator<Item = DiseaseId>) -> Self {
        self.restriction = Some(nodes.into_iter().collect());
        self
    }

    /// Finalises the graph.
    #[must_use]
    pub fn build(self) -> ComorbidityGraph {
        let Self {
            name,
            nodes,
            edges,
            restriction,
        } = self;
        let nodes: Vec<DiseaseId> = restriction.unwrap_or(nodes).into_iter().collect();
        let lookup: HashMap<DiseaseId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut dropped = 0_usize;
        for (left, right) in &edges {
            match (lookup.get(left), lookup.get(right)) {
                (Some(&a), Some(&b)) if a != b => {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
                (Some(_), Some(_)) => {}
                _ => dropped += 1,
            }
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
            neighbours.dedup();
        }
        let edge_count = adjacency.iter().map(Vec::len).sum::<usize>() / 2;
        debug!(
            graph = name.as_str(),
            nodes = nodes.len(),
            edges = edge_count,
            dropped_edges = dropped,
            "graph built"
        );

        ComorbidityGraph {
            name,
            nodes,
            lookup,
            adjacency,
            edge_count,
        }
    }
}
