//! JSON persistence for [`HiringGraph`].

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{HiringEdge, HiringGraph, InstitutionNode, TimeWindow, WindowVariant};
use crate::{error::GraphError, record::FieldInfo};

/// File name of the per-period professor count table.
pub const PROFESSOR_COUNTS_FILE: &str = "professors_by_period.csv";

/// Serialized node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Institution identifier.
    pub id: String,
    /// International flag.
    pub international: bool,
    /// Registry state, omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Registry region, omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Serialized edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Degree institution id.
    pub source: String,
    /// Employing institution id.
    pub target: String,
    /// Aggregated professor count.
    pub weight: u64,
    /// Field attributes flattened into the edge object.
    #[serde(flatten)]
    pub field: FieldInfo,
    /// Observation year on windowed graphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_year: Option<i32>,
}

/// On-disk representation of a hiring graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphArtifact {
    /// Nodes in position order.
    pub nodes: Vec<NodeRecord>,
    /// Edges in edge order.
    pub edges: Vec<EdgeRecord>,
}

impl From<&HiringGraph> for GraphArtifact {
    fn from(graph: &HiringGraph) -> Self {
        let nodes: Vec<NodeRecord> = graph
            .nodes()
            .map(|node| NodeRecord {
                id: node.id.clone(),
                international: node.international,
                state: node.state.clone(),
                region: node.region.clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .filter_map(|view| {
                let source = nodes.get(view.source)?.id.clone();
                let target = nodes.get(view.target)?.id.clone();
                Some(EdgeRecord {
                    source,
                    target,
                    weight: view.edge.weight,
                    field: view.edge.field.clone(),
                    base_year: view.edge.base_year,
                })
            })
            .collect();
        Self { nodes, edges }
    }
}

impl TryFrom<GraphArtifact> for HiringGraph {
    type Error = GraphError;

    fn try_from(artifact: GraphArtifact) -> Result<Self, Self::Error> {
        let mut graph = Self::new();
        for node in artifact.nodes {
            graph.add_node(InstitutionNode {
                id: node.id,
                international: node.international,
                state: node.state,
                region: node.region,
            })?;
        }
        for edge in artifact.edges {
            graph.add_edge(
                &edge.source,
                &edge.target,
                HiringEdge {
                    weight: edge.weight,
                    field: edge.field,
                    base_year: edge.base_year,
                },
            )?;
        }
        Ok(graph)
    }
}

impl HiringGraph {
    /// Writes the graph as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`GraphError::Json`] or [`GraphError::Io`] when encoding or
    /// writing fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), GraphError> {
        serde_json::to_writer_pretty(writer, &GraphArtifact::from(self))?;
        Ok(())
    }

    /// Reads a graph previously written by [`HiringGraph::to_writer`].
    ///
    /// # Errors
    /// Returns [`GraphError::Json`] for malformed input and
    /// [`GraphError::UnknownNode`] or [`GraphError::DuplicateNode`] when the
    /// node declarations are inconsistent with the edges.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        let artifact: GraphArtifact = serde_json::from_reader(reader)?;
        Self::try_from(artifact)
    }

    /// Writes the graph to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the file cannot be created or flushed.
    #[instrument(name = "core.write_graph", err, skip_all, fields(path = %path.display()))]
    pub fn write_json_file(&self, path: &Path) -> Result<(), GraphError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a graph from `path`.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the file cannot be opened, plus the
    /// errors of [`HiringGraph::from_reader`].
    #[instrument(name = "core.read_graph", err, skip_all, fields(path = %path.display()))]
    pub fn read_json_file(path: &Path) -> Result<Self, GraphError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}

/// File name of the graph for one calendar year.
///
/// # Examples
/// ```
/// assert_eq!(lineage_core::yearly_file_name(2015), "2015.json");
/// ```
#[must_use]
pub fn yearly_file_name(year: i32) -> String {
    format!("{year}.json")
}

/// File name of one windowed graph variant.
///
/// # Examples
/// ```
/// use lineage_core::{TimeWindow, WindowVariant, window_file_name};
///
/// let window = TimeWindow::new(2011, 2020)?;
/// assert_eq!(window_file_name(window, WindowVariant::MostRecent), "2011-2020.json");
/// assert_eq!(
///     window_file_name(window, WindowVariant::FirstAppearance),
///     "2011-2020-first-appearance.json",
/// );
/// # Ok::<(), lineage_core::LineageError>(())
/// ```
#[must_use]
pub fn window_file_name(window: TimeWindow, variant: WindowVariant) -> String {
    match variant {
        WindowVariant::MostRecent => format!("{}.json", window.label()),
        WindowVariant::FirstAppearance => format!("{}-first-appearance.json", window.label()),
    }
}
