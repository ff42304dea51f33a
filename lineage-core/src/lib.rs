//! Lineage core library.
//!
//! Turns yearly faculty records into institution-to-institution hiring
//! graphs and tests them for hierarchical structure. The stages are:
//! identity resolution ([`resolve_identities`]), institution
//! canonicalization ([`Canonicalizer`]), graph construction
//! ([`GraphBuilder`]), ranking ([`SpringRank`]) and the Monte Carlo
//! significance test ([`MonteCarlo`]). [`Pipeline`] chains the first three.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod graph;
mod identity;
mod inequality;
mod institution;
mod normalize;
mod pipeline;
mod ranking;
mod record;
mod significance;

pub use crate::{
    error::{
        GraphError, GraphErrorCode, LineageError, LineageErrorCode, NullModelError,
        NullModelErrorCode, RankingError, RankingErrorCode, Result, SignificanceError,
        SignificanceErrorCode, require_columns,
    },
    graph::{
        CountGranularity, DEFAULT_TIME_WINDOWS, EdgeRecord, EdgeView, GraphArtifact, GraphBuilder,
        GraphSet, HiringEdge, HiringGraph, InstitutionNode, NodeRecord, PROFESSOR_COUNTS_FILE,
        ProfessorCount, TimeWindow, WindowVariant, WindowedGraphs, international_nodes,
        professor_counts, select_window_rows, window_file_name, yearly_file_name,
    },
    identity::{
        DisjointSet, IdentityReport, IdentityResolution, KeyScheme, partition_records,
        resolve_identities,
    },
    inequality::{NodeStrength, gini, node_strengths, pearson, spearman},
    institution::{
        CANDIDATE_DELIMITER, Canonicalization, CanonicalizationReport, Canonicalizer,
        DEFAULT_INVALID_SENTINEL, InstitutionRegistry, MappingEntry, MappingTable, RegistryEntry,
    },
    normalize::{is_missing_marker, is_placeholder, is_valid_value, normalize_text},
    pipeline::{DEFAULT_PIPELINE_SEED, Pipeline, PipelineBuilder, PipelineOutput},
    ranking::{Ranker, SpringRank, SpringRankBuilder, WeightedAdjacency, shift_to_zero_min},
    record::{
        AnonymizedRecord, CanonicalRecord, FieldInfo, InstitutionPair, ProfessorId, RawRecord,
        ResolvedInstitution,
    },
    significance::{
        DEFAULT_ITERATIONS, DEFAULT_SEED, DirectedConfigurationModel, MonteCarlo,
        MonteCarloBuilder, MonteCarloResult, NullModel, RandomStreams, hierarchy_strength,
    },
};
