use crate::error::LayoutError;
use crate::ir::Graph;

/// Link indices leaving and entering every node, in link order.
#[derive(Debug, Clone)]
pub(super) struct Adjacency {
    pub source_links: Vec<Vec<usize>>,
    pub target_links: Vec<Vec<usize>>,
}

impl Adjacency {
    pub fn build(graph: &Graph) -> Result<Self, LayoutError> {
        let node_count = graph.nodes.len();
        let mut source_links = vec![Vec::new(); node_count];
        let mut target_links = vec![Vec::new(); node_count];
        for (link_idx, link) in graph.links.iter().enumerate() {
            for node in [link.source, link.target] {
                if node >= node_count {
                    return Err(LayoutError::UnresolvedNode {
                        link: link_idx,
                        node,
                        node_count,
                    });
                }
            }
            if !link.value.is_finite() || link.value < 0.0 {
                return Err(LayoutError::InvalidLinkValue {
                    link: link_idx,
                    value: link.value,
                });
            }
            source_links[link.source].push(link_idx);
            target_links[link.target].push(link_idx);
        }
        Ok(Self {
            source_links,
            target_links,
        })
    }
}

/// Groups node indices into left-to-right columns.
///
/// Column 0 holds every node without incoming links. A node joins the next
/// column once it is the target of a node in the current column and all of
/// its predecessors have been placed. Nodes never reached this way (cycles,
/// nodes fed from a cycle) are appended to the last column, or to a fresh
/// column when nothing was placed at all. This is not cycle breaking; cyclic
/// graphs get a best-effort layering.
pub fn assign_columns(graph: &Graph) -> Result<Vec<Vec<usize>>, LayoutError> {
    let adjacency = Adjacency::build(graph)?;
    Ok(rank_columns(graph, &adjacency))
}

pub(super) fn rank_columns(graph: &Graph, adjacency: &Adjacency) -> Vec<Vec<usize>> {
    let node_count = graph.nodes.len();
    let mut visited = vec![false; node_count];
    let mut queued = vec![false; node_count];
    let mut columns: Vec<Vec<usize>> = Vec::new();

    let mut current: Vec<usize> = (0..node_count)
        .filter(|&idx| adjacency.target_links[idx].is_empty())
        .collect();

    while !current.is_empty() {
        for &idx in &current {
            visited[idx] = true;
        }
        let mut next = Vec::new();
        for &node in &current {
            for &link_idx in &adjacency.source_links[node] {
                let target = graph.links[link_idx].target;
                if visited[target] || queued[target] {
                    continue;
                }
                let ready = adjacency.target_links[target]
                    .iter()
                    .all(|&incoming| visited[graph.links[incoming].source]);
                if ready {
                    queued[target] = true;
                    next.push(target);
                }
            }
        }
        columns.push(current);
        current = next;
    }

    let unplaced: Vec<usize> = (0..node_count).filter(|&idx| !visited[idx]).collect();
    if !unplaced.is_empty() {
        log::warn!(
            "{} node(s) unreachable by ranking (cycle?), appending to the last column",
            unplaced.len()
        );
        match columns.last_mut() {
            Some(last) => last.extend(unplaced),
            None => columns.push(unplaced),
        }
    }
    columns
}
