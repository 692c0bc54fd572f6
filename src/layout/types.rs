use std::collections::BTreeMap;

use crate::config::Bounds;

use super::curve::CubicCurve;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    /// Override from a `class` directive, or the theme palette entry for this node's position.
    pub color: String,
    pub value: f64,
    pub column: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub source_links: Vec<usize>,
    pub target_links: Vec<usize>,
}

impl NodeLayout {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub label: Option<String>,
    pub width: f64,
    /// Top of the source node. Every link leaving a node shares this anchor.
    pub y0: f64,
    /// Top of the target node. Every link entering a node shares this anchor.
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub links: Vec<LinkLayout>,
    pub options: BTreeMap<String, String>,
    pub bounds: Bounds,
    pub node_thickness: f64,
    /// Node indices per column, in stacking order.
    pub columns: Vec<Vec<usize>>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn column_ids(&self) -> Vec<Vec<&str>> {
        self.columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .filter_map(|&idx| self.nodes.get(idx).map(|node| node.id.as_str()))
                    .collect()
            })
            .collect()
    }

    pub fn max_node_value(&self) -> f64 {
        self.nodes.iter().map(|node| node.value).fold(0.0, f64::max)
    }

    pub fn title(&self) -> Option<&str> {
        self.options
            .get("title")
            .map(String::as_str)
            .filter(|title| !title.is_empty())
    }

    /// Horizontal S-curve from the source's right edge to the target's left edge.
    /// The stroke is centered, so the curve runs half a width below the anchors.
    pub fn link_curve(&self, link_idx: usize) -> Option<CubicCurve> {
        let link = self.links.get(link_idx)?;
        let source = self.nodes.get(link.source)?;
        let target = self.nodes.get(link.target)?;
        let half = link.width / 2.0;
        Some(CubicCurve::horizontal(
            (source.x1, link.y0 + half),
            (target.x0, link.y1 + half),
        ))
    }
}
