//! Directed hiring multigraphs.
//!
//! Nodes are canonical institutions; an edge `degree -> employer` carries the
//! number of professors trained at `degree` and observed at `employer` for
//! one field (and, for windowed graphs, one base year). Parallel edges are
//! kept so that each field stays a separate edge.

mod artifact;
mod builder;
mod counts;

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    error::{GraphError, RankingError},
    ranking::WeightedAdjacency,
    record::FieldInfo,
};

pub use self::artifact::{
    EdgeRecord, GraphArtifact, NodeRecord, PROFESSOR_COUNTS_FILE, window_file_name,
    yearly_file_name,
};
pub use self::builder::{
    DEFAULT_TIME_WINDOWS, GraphBuilder, GraphSet, TimeWindow, WindowVariant, WindowedGraphs,
    international_nodes, select_window_rows,
};
pub use self::counts::{CountGranularity, ProfessorCount, professor_counts};

/// Attributes of one institution node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstitutionNode {
    /// Canonical abbreviation, or the country for international nodes.
    pub id: String,
    /// Whether the node is a foreign degree origin.
    pub international: bool,
    /// State from the domestic registry.
    pub state: Option<String>,
    /// Region from the domestic registry.
    pub region: Option<String>,
}

impl InstitutionNode {
    /// Creates a domestic node with no registry attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            international: false,
            state: None,
            region: None,
        }
    }
}

/// Attributes of one aggregated hiring edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiringEdge {
    /// Number of rows aggregated into the edge.
    pub weight: u64,
    /// Field the hires belong to.
    pub field: FieldInfo,
    /// Observation year, present on windowed graphs only.
    pub base_year: Option<i32>,
}

/// Borrowed view of one edge with node positions resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeView<'a> {
    /// Position of the degree institution.
    pub source: usize,
    /// Position of the employing institution.
    pub target: usize,
    /// Edge attributes.
    pub edge: &'a HiringEdge,
}

/// Directed multigraph of institution-to-institution placements.
///
/// Node positions and edge order follow insertion order, and both survive a
/// round trip through [`GraphArtifact`].
///
/// # Examples
/// ```
/// use lineage_core::{FieldInfo, HiringEdge, HiringGraph, InstitutionNode};
///
/// let mut graph = HiringGraph::new();
/// graph.add_node(InstitutionNode::new("UFX"))?;
/// graph.add_node(InstitutionNode::new("UFY"))?;
/// let field = FieldInfo::new(1, "math", 10, "exact");
/// graph.add_edge("UFX", "UFY", HiringEdge { weight: 3, field, base_year: None })?;
/// assert_eq!(graph.total_weight(), 3);
/// assert_eq!(graph.out_degrees(), vec![1, 0]);
/// # Ok::<(), lineage_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct HiringGraph {
    graph: DiGraph<InstitutionNode, HiringEdge>,
    positions: HashMap<String, NodeIndex>,
}

impl HiringGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` and returns its position.
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateNode`] when the id is already present.
    pub fn add_node(&mut self, node: InstitutionNode) -> Result<usize, GraphError> {
        if self.positions.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode { id: node.id });
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.positions.insert(id, index);
        Ok(index.index())
    }

    /// Returns the position of `id`, inserting a plain node when absent.
    pub(crate) fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(index) = self.positions.get(id) {
            return *index;
        }
        let index = self.graph.add_node(InstitutionNode::new(id));
        self.positions.insert(id.to_owned(), index);
        index
    }

    /// Adds a parallel-safe edge between two declared nodes.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when either endpoint is missing.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        edge: HiringEdge,
    ) -> Result<usize, GraphError> {
        let from = self.lookup(source)?;
        let to = self.lookup(target)?;
        Ok(self.graph.add_edge(from, to, edge).index())
    }

    pub(crate) fn push_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: HiringEdge) {
        self.graph.add_edge(from, to, edge);
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut InstitutionNode> + '_ {
        self.graph.node_weights_mut()
    }

    fn lookup(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.positions
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode { id: id.to_owned() })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn has_no_edges(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Position of the node named `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).map(|index| index.index())
    }

    /// Node at `position`.
    #[must_use]
    pub fn node(&self, position: usize) -> Option<&InstitutionNode> {
        self.graph.node_weight(NodeIndex::new(position))
    }

    /// Nodes in position order.
    pub fn nodes(&self) -> impl Iterator<Item = &InstitutionNode> + '_ {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_references().map(|edge| EdgeView {
            source: edge.source().index(),
            target: edge.target().index(),
            edge: edge.weight(),
        })
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.graph.edge_weights().map(|edge| edge.weight).sum()
    }

    /// In-degree per node, counting parallel edges.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        self.degrees(Direction::Incoming)
    }

    /// Out-degree per node, counting parallel edges.
    #[must_use]
    pub fn out_degrees(&self) -> Vec<usize> {
        self.degrees(Direction::Outgoing)
    }

    fn degrees(&self, direction: Direction) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|index| self.graph.edges_directed(index, direction).count())
            .collect()
    }

    /// Edge weights in edge order.
    #[must_use]
    pub fn weights(&self) -> Vec<u64> {
        self.graph.edge_weights().map(|edge| edge.weight).collect()
    }

    /// Weighted adjacency matrix in node order, parallel edges summed.
    ///
    /// # Errors
    /// Propagates [`RankingError`] from matrix construction; a well-formed
    /// graph never triggers it.
    pub fn adjacency(&self) -> Result<WeightedAdjacency, RankingError> {
        WeightedAdjacency::from_triplets(
            self.node_count(),
            self.edges()
                .map(|view| (view.source, view.target, view.edge.weight as f64)),
        )
    }

    /// Returns the underlying petgraph graph.
    #[must_use]
    pub fn as_petgraph(&self) -> &DiGraph<InstitutionNode, HiringEdge> {
        &self.graph
    }
}

#[cfg(test)]
mod tests;
