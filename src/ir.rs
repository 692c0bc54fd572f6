use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub color: Option<String>,
}

/// One hop of a chain. `source` and `target` index into [`Graph::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub color: Option<String>,
}

impl NodeStyle {
    fn apply(&self, node: &mut Node) {
        if let Some(color) = &self.color {
            node.color = Some(color.clone());
        }
    }
}

/// Parsed flow description. Node order is first-seen order and is significant:
/// ranking uses it to order columns and default colors are indexed by it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub options: BTreeMap<String, String>,
    pub styles: BTreeMap<String, NodeStyle>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the index of `id`, appending a new node when it has not been seen yet.
    pub fn ensure_node(&mut self, id: &str) -> usize {
        if let Some(idx) = self.node_index(id) {
            return idx;
        }
        self.nodes.push(Node {
            id: id.to_string(),
            color: None,
        });
        self.nodes.len() - 1
    }

    pub fn add_link(&mut self, source: &str, target: &str, value: f64, label: Option<&str>) {
        let source = self.ensure_node(source);
        let target = self.ensure_node(target);
        self.links.push(Link {
            source,
            target,
            value,
            label: label.map(str::to_string),
        });
    }

    /// Merges the collected `class` styles onto the nodes they name.
    pub fn apply_styles(&mut self) {
        for node in &mut self.nodes {
            if let Some(style) = self.styles.get(&node.id) {
                style.apply(node);
            }
        }
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id.as_str()).collect()
    }
}
