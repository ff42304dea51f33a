//! Descriptive inequality measures over hiring graphs.

use serde::{Deserialize, Serialize};

use crate::graph::HiringGraph;

/// Placement totals of one institution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStrength {
    /// Institution id.
    pub id: String,
    /// Number of incoming edges.
    pub in_degree: usize,
    /// Number of outgoing edges.
    pub out_degree: usize,
    /// Professors hired: total incoming weight.
    pub in_strength: u64,
    /// Professors produced: total outgoing weight.
    pub out_strength: u64,
    /// Professors hired by the institution that trained them.
    pub self_hires: u64,
}

/// Tabulates [`NodeStrength`] for every node, in node order.
///
/// # Examples
/// ```
/// use lineage_core::{FieldInfo, HiringEdge, HiringGraph, InstitutionNode, node_strengths};
///
/// let mut graph = HiringGraph::new();
/// graph.add_node(InstitutionNode::new("UFX"))?;
/// graph.add_node(InstitutionNode::new("UFY"))?;
/// let field = FieldInfo::new(1, "math", 10, "exact");
/// graph.add_edge("UFX", "UFY", HiringEdge { weight: 3, field: field.clone(), base_year: None })?;
/// graph.add_edge("UFX", "UFX", HiringEdge { weight: 2, field, base_year: None })?;
///
/// let table = node_strengths(&graph);
/// assert_eq!(table[0].out_strength, 5);
/// assert_eq!(table[0].self_hires, 2);
/// assert_eq!(table[1].in_strength, 3);
/// # Ok::<(), lineage_core::GraphError>(())
/// ```
#[must_use]
pub fn node_strengths(graph: &HiringGraph) -> Vec<NodeStrength> {
    let mut table: Vec<NodeStrength> = graph
        .nodes()
        .map(|node| NodeStrength {
            id: node.id.clone(),
            in_degree: 0,
            out_degree: 0,
            in_strength: 0,
            out_strength: 0,
            self_hires: 0,
        })
        .collect();
    for view in graph.edges() {
        let weight = view.edge.weight;
        if let Some(source) = table.get_mut(view.source) {
            source.out_degree += 1;
            source.out_strength += weight;
        }
        if let Some(target) = table.get_mut(view.target) {
            target.in_degree += 1;
            target.in_strength += weight;
            if view.source == view.target {
                target.self_hires += weight;
            }
        }
    }
    table
}

/// Gini coefficient from the area under the Lorenz curve of the sorted
/// values: `1 - 2 * mean(cumsum / total)`.
///
/// The estimate is not bias-corrected: `n` equal values score `-1 / n`.
/// Returns `None` for empty input or a zero total.
///
/// # Examples
/// ```
/// use lineage_core::gini;
///
/// assert_eq!(gini(&[1.0, 1.0, 1.0, 1.0]), Some(-0.25));
/// assert_eq!(gini(&[0.0, 0.0, 0.0, 4.0]), Some(0.5));
/// assert_eq!(gini(&[]), None);
/// ```
#[must_use]
pub fn gini(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let total: f64 = sorted.iter().sum();
    if sorted.is_empty() || total == 0.0 || !total.is_finite() {
        return None;
    }
    let mut cumulative = 0.0;
    let mut area = 0.0;
    for value in &sorted {
        cumulative += value;
        area += cumulative / total;
    }
    Some(1.0 - 2.0 * area / sorted.len() as f64)
}

/// Pearson correlation coefficient.
///
/// Returns `None` when the slices differ in length, hold fewer than two
/// values, or either has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(covariance / (var_x * var_y).sqrt())
}

/// Spearman rank correlation: Pearson over average ranks, so tied values
/// share the mean of the ranks they span.
///
/// # Examples
/// ```
/// use lineage_core::spearman;
///
/// let rho = spearman(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 25.0, 100.0]).unwrap();
/// assert!((rho - 1.0).abs() < 1e-12);
/// assert_eq!(spearman(&[1.0], &[2.0]), None);
/// ```
#[must_use]
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    pearson(&average_ranks(xs), &average_ranks(ys))
}

/// One-based ranks with ties averaged.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == value {
            end += 1;
        }
        // positions start..end hold ranks start+1 ..= end
        let shared = (start + 1 + end) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = shared;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    #[case::equal(&[2.0, 2.0, 2.0], -1.0 / 3.0)]
    #[case::concentrated(&[0.0, 0.0, 0.0, 4.0], 0.5)]
    #[case::unsorted(&[3.0, 1.0, 2.0], 1.0 - 2.0 * (1.0 / 6.0 + 3.0 / 6.0 + 1.0) / 3.0)]
    fn gini_follows_lorenz_area(#[case] values: &[f64], #[case] expected: f64) {
        assert_close(gini(values).expect("positive total"), expected);
    }

    #[rstest]
    fn gini_rejects_zero_total() {
        assert_eq!(gini(&[0.0, 0.0]), None);
    }

    #[rstest]
    fn ties_share_average_ranks() {
        assert_eq!(
            average_ranks(&[10.0, 20.0, 10.0, 5.0]),
            vec![2.5, 4.0, 2.5, 1.0]
        );
    }

    #[rstest]
    fn pearson_detects_inverse_relation() {
        assert_close(
            pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).expect("variance present"),
            -1.0,
        );
    }

    #[rstest]
    #[case::lengths(&[1.0, 2.0], &[1.0])]
    #[case::too_short(&[1.0], &[1.0])]
    #[case::constant(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0])]
    fn degenerate_inputs_have_no_correlation(#[case] xs: &[f64], #[case] ys: &[f64]) {
        assert_eq!(pearson(xs, ys), None);
        assert_eq!(spearman(xs, ys), None);
    }

    #[rstest]
    fn spearman_ignores_monotone_transforms() {
        let xs = [1.0, 5.0, 2.0, 8.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.powi(3) + 1.0).collect();
        assert_close(spearman(&xs, &ys).expect("variance present"), 1.0);
    }
}
