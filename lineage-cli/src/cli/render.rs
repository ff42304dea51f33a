//! Plain-text rendering of command summaries.

use std::io::{self, Write};

use super::commands::{BuildSummary, CommandSummary, InequalitySummary, SignificanceSummary};

/// Renders `summary` to `writer` as `label: value` lines.
///
/// Undefined statistics (for example a p-value with no null samples) are
/// written as `n/a`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &CommandSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        CommandSummary::Build(build) => render_build(build, &mut writer),
        CommandSummary::Significance(significance) => {
            render_significance(significance, &mut writer)
        }
        CommandSummary::Inequality(inequality) => render_inequality(inequality, &mut writer),
    }
}

fn render_build(summary: &BuildSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "records: {}", summary.records)?;
    writeln!(writer, "identities: {}", summary.identities)?;
    writeln!(writer, "canonical rows: {}", summary.canonical_rows)?;
    writeln!(writer, "dropped invalid: {}", summary.dropped_invalid)?;
    writeln!(writer, "international rows: {}", summary.international_rows)?;
    writeln!(writer, "graphs: {}", summary.graphs.len())?;
    for path in &summary.graphs {
        writeln!(writer, "\t{}", path.display())?;
    }
    writeln!(writer, "counts: {}", summary.counts.display())
}

fn render_significance(summary: &SignificanceSummary, writer: &mut impl Write) -> io::Result<()> {
    let result = &summary.result;
    writeln!(writer, "graph: {}", summary.graph.display())?;
    writeln!(writer, "nodes: {}", summary.nodes)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    writeln!(writer, "observed: {:.6}", result.observed())?;
    writeln!(
        writer,
        "null samples: {} of {} ({} skipped)",
        result.sample_count(),
        result.requested(),
        result.skipped()
    )?;
    writeln!(writer, "null mean: {}", optional(result.null_mean()))?;
    writeln!(writer, "p-value: {}", optional(result.p_value()))?;
    writeln!(
        writer,
        "upper-tail p-value: {}",
        optional(result.upper_tail_p_value())
    )
}

fn render_inequality(summary: &InequalitySummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "graph: {}", summary.graph.display())?;
    writeln!(writer, "institutions: {}", summary.strengths.len())?;
    writeln!(writer, "gini produced: {}", optional(summary.produced_gini))?;
    writeln!(writer, "gini hired: {}", optional(summary.hired_gini))?;
    writeln!(
        writer,
        "spearman produced/hired: {}",
        optional(summary.produced_hired_spearman)
    )?;
    for strength in &summary.strengths {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            strength.id, strength.out_strength, strength.in_strength, strength.self_hires
        )?;
    }
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |value| format!("{value:.6}"))
}
