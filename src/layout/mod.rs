mod curve;
mod ranking;
pub(crate) mod types;

pub use curve::CubicCurve;
pub use ranking::assign_columns;
pub use types::*;

use ranking::{Adjacency, rank_columns};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::ir::Graph;
use crate::theme::Theme;

/// Positions every node and link of `graph` inside `config.bounds`.
///
/// Node size follows the larger of inflow and outflow. Columns are spaced
/// evenly and nodes keep their ranking order top to bottom, each column scaled
/// on its own. Link widths are normalized against the largest node value in
/// the whole graph. Links are anchored at node tops, so several links sharing
/// a node overlap at that end.
pub fn compute_layout(
    graph: &Graph,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    validate_config(config)?;
    let adjacency = Adjacency::build(graph)?;
    let node_count = graph.nodes.len();

    let values: Vec<f64> = (0..node_count)
        .map(|idx| {
            let outflow: f64 = adjacency.source_links[idx]
                .iter()
                .map(|&link| graph.links[link].value)
                .sum();
            let inflow: f64 = adjacency.target_links[idx]
                .iter()
                .map(|&link| graph.links[link].value)
                .sum();
            outflow.max(inflow)
        })
        .collect();

    let columns = rank_columns(graph, &adjacency);

    let bounds = config.bounds;
    let thickness = config.node_thickness;
    let gap = config.node_gap;
    let column_step = (bounds.width() - thickness) / column_divisor(columns.len());

    let mut column_of = vec![0usize; node_count];
    let mut x_of = vec![bounds.x0; node_count];
    let mut y_span = vec![(bounds.y0, bounds.y0); node_count];
    for (column_idx, column) in columns.iter().enumerate() {
        let x0 = bounds.x0 + column_idx as f64 * column_step;
        let total: f64 = column.iter().map(|&idx| values[idx]).sum();
        let gaps = gap * column.len().saturating_sub(1) as f64;
        let available = (bounds.height() - gaps).max(0.0);
        let scale = available / total.max(1.0);
        let mut y = bounds.y0;
        for &idx in column {
            let y1 = y + values[idx] * scale;
            column_of[idx] = column_idx;
            x_of[idx] = x0;
            y_span[idx] = (y, y1);
            y = y1 + gap;
        }
    }

    let nodes: Vec<NodeLayout> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let color = node
                .color
                .clone()
                .unwrap_or_else(|| theme.palette_color(idx).to_string());
            NodeLayout {
                id: node.id.clone(),
                color,
                value: values[idx],
                column: column_of[idx],
                x0: x_of[idx],
                x1: x_of[idx] + thickness,
                y0: y_span[idx].0,
                y1: y_span[idx].1,
                source_links: adjacency.source_links[idx].clone(),
                target_links: adjacency.target_links[idx].clone(),
            }
        })
        .collect();

    let max_value = values.iter().copied().fold(0.0, f64::max).max(1.0);
    let links: Vec<LinkLayout> = graph
        .links
        .iter()
        .map(|link| LinkLayout {
            source: link.source,
            target: link.target,
            value: link.value,
            label: link.label.clone(),
            width: link.value * bounds.height() / max_value,
            y0: nodes[link.source].y0,
            y1: nodes[link.target].y0,
        })
        .collect();

    log::debug!(
        "sankey layout: {} columns, {} nodes, {} links",
        columns.len(),
        nodes.len(),
        links.len()
    );

    Ok(Layout {
        nodes,
        links,
        options: graph.options.clone(),
        bounds,
        node_thickness: thickness,
        columns,
    })
}

fn column_divisor(column_count: usize) -> f64 {
    column_count.saturating_sub(1).max(1) as f64
}

fn validate_config(config: &LayoutConfig) -> Result<(), LayoutError> {
    if !config.node_thickness.is_finite() || config.node_thickness <= 0.0 {
        return Err(LayoutError::InvalidConfig(format!(
            "node thickness must be positive, got {}",
            config.node_thickness
        )));
    }
    if !config.node_gap.is_finite() || config.node_gap < 0.0 {
        return Err(LayoutError::InvalidConfig(format!(
            "node gap must be non-negative, got {}",
            config.node_gap
        )));
    }
    let b = config.bounds;
    let finite = [b.x0, b.y0, b.x1, b.y1].iter().all(|v| v.is_finite());
    if !finite || b.x1 < b.x0 || b.y1 < b.y0 {
        return Err(LayoutError::InvalidConfig(format!(
            "bounds ({}, {}) - ({}, {}) are not a valid rectangle",
            b.x0, b.y0, b.x1, b.y1
        )));
    }
    Ok(())
}
