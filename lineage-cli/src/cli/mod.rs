//! Command-line interface for the lineage hiring-network analysis.
//!
//! `build` turns the raw CSV tables into graph artifacts, `significance`
//! runs the Monte Carlo hierarchy test on one artifact and `inequality`
//! summarises how unevenly an artifact's placements are spread.

mod commands;
mod render;

pub use commands::{
    BuildCommand, BuildSummary, Cli, CliError, Command, CommandSummary, InequalityCommand,
    InequalitySummary, SignificanceCommand, SignificanceSummary, StreamPolicy, run_cli,
};
pub use render::render_summary;
