//! Yearly and windowed graph construction from canonical records.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::{debug, info, instrument};

use super::{
    HiringEdge, HiringGraph,
    artifact::{window_file_name, yearly_file_name},
    counts::{ProfessorCount, professor_counts},
};
use crate::{
    error::{GraphError, LineageError, Result},
    institution::InstitutionRegistry,
    record::{CanonicalRecord, FieldInfo, ProfessorId},
};

/// Windows built when none are configured.
pub const DEFAULT_TIME_WINDOWS: [(i32, i32); 2] = [(2004, 2024), (2011, 2020)];

/// Closed interval of base years.
///
/// # Examples
/// ```
/// use lineage_core::TimeWindow;
///
/// let window: TimeWindow = "2011-2020".parse()?;
/// assert!(window.contains(2011) && window.contains(2020));
/// assert!(!window.contains(2021));
/// assert_eq!(window.label(), "2011-2020");
/// assert!(TimeWindow::new(2020, 2011).is_err());
/// # Ok::<(), lineage_core::LineageError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    start: i32,
    end: i32,
}

impl TimeWindow {
    /// Creates the window `[start, end]`.
    ///
    /// # Errors
    /// Returns [`LineageError::InvalidTimeWindow`] when `end < start`.
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if end < start {
            return Err(LineageError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The configured default windows.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_TIME_WINDOWS
            .iter()
            .map(|&(start, end)| Self { start, end })
            .collect()
    }

    /// First year of the window.
    #[must_use]
    pub const fn start(self) -> i32 {
        self.start
    }

    /// Last year of the window.
    #[must_use]
    pub const fn end(self) -> i32 {
        self.end
    }

    /// Returns `true` when `year` falls inside the window.
    #[must_use]
    pub const fn contains(self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Period label `start-end`.
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeWindow {
    type Err = LineageError;

    fn from_str(label: &str) -> Result<Self> {
        let malformed = || LineageError::MalformedTimeWindow {
            label: label.to_owned(),
        };
        let (start, end) = label.trim().split_once('-').ok_or_else(malformed)?;
        let start = start.trim().parse().map_err(|_| malformed())?;
        let end = end.trim().parse().map_err(|_| malformed())?;
        Self::new(start, end)
    }
}

/// Which observation of each professor a windowed graph keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowVariant {
    /// Rows at the professor's earliest year inside the window.
    FirstAppearance,
    /// Rows at the professor's latest year inside the window.
    MostRecent,
}

/// Keeps the rows of `rows` inside `window` that sit at each professor's
/// extreme year for `variant`.
///
/// Every professor contributes exactly one year. When a professor appears in
/// several years the two variants select disjoint rows.
#[must_use]
pub fn select_window_rows<'a>(
    rows: &[&'a CanonicalRecord],
    window: TimeWindow,
    variant: WindowVariant,
) -> Vec<&'a CanonicalRecord> {
    let inside: Vec<&CanonicalRecord> = rows
        .iter()
        .copied()
        .filter(|row| window.contains(row.base_year))
        .collect();
    let mut extreme: HashMap<ProfessorId, i32> = HashMap::new();
    for row in &inside {
        extreme
            .entry(row.professor_id)
            .and_modify(|year| {
                *year = match variant {
                    WindowVariant::FirstAppearance => (*year).min(row.base_year),
                    WindowVariant::MostRecent => (*year).max(row.base_year),
                };
            })
            .or_insert(row.base_year);
    }
    inside
        .into_iter()
        .filter(|row| extreme.get(&row.professor_id) == Some(&row.base_year))
        .collect()
}

/// Both variants of one windowed graph plus the window's professor counts.
#[derive(Clone, Debug)]
pub struct WindowedGraphs {
    /// Window the graphs cover.
    pub window: TimeWindow,
    /// Graph of each professor's earliest rows.
    pub first_appearance: HiringGraph,
    /// Graph of each professor's latest rows.
    pub most_recent: HiringGraph,
    /// Counts over the most recent rows, labelled `start-end`.
    pub professor_counts: Vec<ProfessorCount>,
}

/// Every graph produced from one record set.
#[derive(Clone, Debug, Default)]
pub struct GraphSet {
    /// One graph per base year.
    pub yearly: BTreeMap<i32, HiringGraph>,
    /// Windowed graphs in configuration order.
    pub windows: Vec<WindowedGraphs>,
    /// Yearly counts in year order followed by window counts.
    pub professor_counts: Vec<ProfessorCount>,
}

impl GraphSet {
    /// Writes every graph into `dir` using the standard file names and
    /// returns the paths written.
    ///
    /// # Errors
    /// Returns the first [`GraphError`] raised while writing.
    pub fn write_graphs(&self, dir: &Path) -> core::result::Result<Vec<PathBuf>, GraphError> {
        let mut written = Vec::with_capacity(self.yearly.len() + 2 * self.windows.len());
        for (year, graph) in &self.yearly {
            let path = dir.join(yearly_file_name(*year));
            graph.write_json_file(&path)?;
            written.push(path);
        }
        for windowed in &self.windows {
            for (variant, graph) in [
                (WindowVariant::FirstAppearance, &windowed.first_appearance),
                (WindowVariant::MostRecent, &windowed.most_recent),
            ] {
                let path = dir.join(window_file_name(windowed.window, variant));
                graph.write_json_file(&path)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

type EdgeKey<'a> = (&'a str, &'a str, &'a FieldInfo, Option<i32>);

/// Aggregates canonical records into hiring graphs.
///
/// # Examples
/// ```
/// use lineage_core::{GraphBuilder, InstitutionRegistry};
///
/// let registry = InstitutionRegistry::default();
/// let graphs = GraphBuilder::new(&registry, "invalid").build(&[], &[]);
/// assert!(graphs.yearly.is_empty());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GraphBuilder<'a> {
    registry: &'a InstitutionRegistry,
    sentinel: &'a str,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder attaching attributes from `registry` and skipping
    /// rows whose endpoints equal `sentinel`.
    #[must_use]
    pub const fn new(registry: &'a InstitutionRegistry, sentinel: &'a str) -> Self {
        Self { registry, sentinel }
    }

    /// Rows usable as edges: both abbreviations present and not the sentinel.
    #[must_use]
    pub fn edge_rows<'r>(&self, records: &'r [CanonicalRecord]) -> Vec<&'r CanonicalRecord> {
        records
            .iter()
            .filter(|record| record.edge_endpoints(self.sentinel).is_some())
            .collect()
    }

    /// Builds one graph from `rows`, keeping `base_year` on edges when
    /// `with_year` is set.
    ///
    /// `international` lists degree abbreviations flagged international
    /// anywhere in the source data.
    #[must_use]
    pub fn graph_from_rows(
        &self,
        rows: &[&CanonicalRecord],
        international: &HashSet<&str>,
        with_year: bool,
    ) -> HiringGraph {
        let mut weights: BTreeMap<EdgeKey<'_>, u64> = BTreeMap::new();
        for row in rows {
            let Some((degree, employer)) = row.edge_endpoints(self.sentinel) else {
                continue;
            };
            let year = with_year.then_some(row.base_year);
            *weights.entry((degree, employer, &row.field, year)).or_insert(0) += 1;
        }

        let mut graph = HiringGraph::new();
        for ((degree, employer, field, base_year), weight) in weights {
            let from = graph.ensure_node(degree);
            let to = graph.ensure_node(employer);
            graph.push_edge(
                from,
                to,
                HiringEdge {
                    weight,
                    field: field.clone(),
                    base_year,
                },
            );
        }
        for node in graph.nodes_mut() {
            node.international = international.contains(node.id.as_str());
            if let Some(entry) = self.registry.get(&node.id) {
                node.state.clone_from(&entry.state);
                node.region.clone_from(&entry.region);
            }
        }
        graph
    }

    /// Builds both windowed variants and the window's professor counts.
    #[must_use]
    pub fn windowed(
        &self,
        rows: &[&CanonicalRecord],
        international: &HashSet<&str>,
        window: TimeWindow,
    ) -> WindowedGraphs {
        let first = select_window_rows(rows, window, WindowVariant::FirstAppearance);
        let latest = select_window_rows(rows, window, WindowVariant::MostRecent);
        debug!(
            window = %window,
            first_rows = first.len(),
            latest_rows = latest.len(),
            "window rows selected"
        );
        WindowedGraphs {
            window,
            first_appearance: self.graph_from_rows(&first, international, true),
            most_recent: self.graph_from_rows(&latest, international, true),
            professor_counts: professor_counts(&window.label(), latest.iter().copied()),
        }
    }

    /// Builds yearly graphs, windowed graphs and professor counts.
    #[instrument(
        name = "core.build_graphs",
        skip_all,
        fields(records = records.len(), windows = windows.len()),
    )]
    pub fn build(&self, records: &[CanonicalRecord], windows: &[TimeWindow]) -> GraphSet {
        let rows = self.edge_rows(records);
        let international = international_nodes(&rows);
        let mut by_year: BTreeMap<i32, Vec<&CanonicalRecord>> = BTreeMap::new();
        for row in rows.iter().copied() {
            by_year.entry(row.base_year).or_default().push(row);
        }

        let mut set = GraphSet::default();
        for (year, year_rows) in &by_year {
            let graph = self.graph_from_rows(year_rows, &international, false);
            info!(
                year,
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "yearly graph built"
            );
            set.professor_counts
                .extend(professor_counts(&year.to_string(), year_rows.iter().copied()));
            set.yearly.insert(*year, graph);
        }
        for window in windows {
            let windowed = self.windowed(&rows, &international, *window);
            info!(
                window = %window,
                nodes = windowed.most_recent.node_count(),
                edges = windowed.most_recent.edge_count(),
                first_appearance_edges = windowed.first_appearance.edge_count(),
                "windowed graphs built"
            );
            set.professor_counts
                .extend(windowed.professor_counts.iter().cloned());
            set.windows.push(windowed);
        }
        info!(
            usable_rows = rows.len(),
            dropped_rows = records.len() - rows.len(),
            international_nodes = international.len(),
            "graph construction completed"
        );
        set
    }
}

/// Degree abbreviations of rows flagged international.
#[must_use]
pub fn international_nodes<'r>(rows: &[&'r CanonicalRecord]) -> HashSet<&'r str> {
    rows.iter()
        .filter(|row| row.international)
        .filter_map(|row| row.degree_granter.abbr.as_deref())
        .collect()
}
