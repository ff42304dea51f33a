//! Reproducible synthetic inputs.
//!
//! Faculty tables follow the shape of real yearly exports: each professor
//! appears in a run of consecutive years, some rows lose the document number
//! and spell the name differently, and every raw institution pair maps to one
//! registered abbreviation.

use lineage_core::{
    FieldInfo, GraphError, HiringEdge, HiringGraph, InstitutionNode, InstitutionPair,
    InstitutionRegistry, MappingEntry, MappingTable, RawRecord, RegistryEntry,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

/// Errors raised by the synthetic generators.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// At least one professor is required.
    #[error("professor count must be positive")]
    ZeroProfessors,
    /// At least two institutions are required for hiring edges.
    #[error("at least two institutions are required, got {0}")]
    TooFewInstitutions(usize),
    /// The year range is empty.
    #[error("year range {first}-{last} is empty")]
    EmptyYears {
        /// First base year.
        first: i32,
        /// Last base year.
        last: i32,
    },
}

/// Shape of a synthetic faculty table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntheticConfig {
    /// Distinct professors.
    pub professors: usize,
    /// Distinct institutions.
    pub institutions: usize,
    /// First base year.
    pub first_year: i32,
    /// Last base year, inclusive.
    pub last_year: i32,
    /// Generator seed.
    pub seed: u64,
}

/// A synthetic faculty table with matching lookup tables.
#[derive(Clone, Debug)]
pub struct SyntheticFaculty {
    /// Raw yearly observations.
    pub records: Vec<RawRecord>,
    /// Mapping from raw pairs to canonical abbreviations.
    pub mapping: MappingTable,
    /// Every canonical abbreviation the mapping targets.
    pub registry: InstitutionRegistry,
}

impl SyntheticFaculty {
    /// Generates a table for `config`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is degenerate.
    ///
    /// # Examples
    /// ```
    /// use lineage_benches::synthetic::{SyntheticConfig, SyntheticFaculty};
    ///
    /// let faculty = SyntheticFaculty::generate(&SyntheticConfig {
    ///     professors: 10,
    ///     institutions: 3,
    ///     first_year: 2010,
    ///     last_year: 2012,
    ///     seed: 42,
    /// })?;
    /// assert!(faculty.records.len() >= 10);
    /// assert_eq!(faculty.registry.len(), 3);
    /// # Ok::<(), lineage_benches::synthetic::SyntheticError>(())
    /// ```
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut records = Vec::new();
        for professor in 0..config.professors {
            let start = rng.gen_range(config.first_year..=config.last_year);
            let end = rng.gen_range(start..=config.last_year);
            let employer = rng.gen_range(0..config.institutions);
            let granter = rng.gen_range(0..config.institutions);
            let birth = 1950 + rng.gen_range(0..40);
            let degree = birth + 28 + rng.gen_range(0..10);
            for year in start..=end {
                let unlinked = rng.gen_bool(0.1);
                let name = if unlinked {
                    format!("PROFESSOR {professor}")
                } else {
                    format!("Professor {professor}")
                };
                records.push(RawRecord {
                    professor_name: Some(name),
                    document_number: (!unlinked).then(|| format!("{:011}", professor + 1)),
                    birth_year: Some(birth.to_string()),
                    degree_year: Some(degree.to_string()),
                    employer: raw_pair(employer),
                    degree_granter: raw_pair(granter),
                    degree_country: Some("BRASIL".to_owned()),
                    field: FieldInfo::new(
                        u32::try_from(professor % 7).unwrap_or_default(),
                        "field",
                        1,
                        "big field",
                    ),
                    base_year: year,
                });
            }
        }
        let mapping = MappingTable::from_entries((0..config.institutions).map(|index| {
            let pair = raw_pair(index);
            MappingEntry {
                name: pair.name.unwrap_or_default(),
                abbr: pair.abbr.unwrap_or_default(),
                mapped_abbr: Some(canonical_abbr(index)),
            }
        }));
        let registry =
            InstitutionRegistry::from_entries((0..config.institutions).map(|index| RegistryEntry {
                abbr: canonical_abbr(index),
                name: format!("University {index}"),
                state: Some("RJ".to_owned()),
                region: Some("Sudeste".to_owned()),
            }));
        Ok(Self {
            records,
            mapping,
            registry,
        })
    }
}

fn validate(config: &SyntheticConfig) -> Result<(), SyntheticError> {
    if config.professors == 0 {
        return Err(SyntheticError::ZeroProfessors);
    }
    if config.institutions < 2 {
        return Err(SyntheticError::TooFewInstitutions(config.institutions));
    }
    if config.last_year < config.first_year {
        return Err(SyntheticError::EmptyYears {
            first: config.first_year,
            last: config.last_year,
        });
    }
    Ok(())
}

fn raw_pair(index: usize) -> InstitutionPair {
    InstitutionPair::new(
        Some(&format!("Institution {index}")),
        Some(&format!("I{index}")),
    )
}

fn canonical_abbr(index: usize) -> String {
    format!("U{index}")
}

/// Generates a hiring graph with `nodes` institutions and `edges` random
/// edges of weight 1 to 5. Self-loops and parallel edges are allowed.
///
/// # Errors
/// Returns [`SyntheticError::TooFewInstitutions`] for fewer than two nodes.
/// Graph assembly errors cannot occur for generated ids but are propagated.
pub fn hiring_graph(nodes: usize, edges: usize, seed: u64) -> Result<HiringGraph, SyntheticGraphError> {
    if nodes < 2 {
        return Err(SyntheticError::TooFewInstitutions(nodes).into());
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut graph = HiringGraph::new();
    for node in 0..nodes {
        graph.add_node(InstitutionNode::new(canonical_abbr(node)))?;
    }
    for _ in 0..edges {
        let source = canonical_abbr(rng.gen_range(0..nodes));
        let target = canonical_abbr(rng.gen_range(0..nodes));
        graph.add_edge(
            &source,
            &target,
            HiringEdge {
                weight: rng.gen_range(1..=5),
                field: FieldInfo::new(1, "field", 1, "big field"),
                base_year: None,
            },
        )?;
    }
    Ok(graph)
}

/// Failure of [`hiring_graph`].
#[derive(Debug, Error)]
pub enum SyntheticGraphError {
    /// The requested shape is degenerate.
    #[error(transparent)]
    Synthetic(#[from] SyntheticError),
    /// The graph rejected a node or edge.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
