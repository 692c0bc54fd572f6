use crate::config::Bounds;
use crate::layout::Layout;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub bounds: Bounds,
    pub node_thickness: f64,
    pub options: BTreeMap<String, String>,
    pub columns: Vec<Vec<String>>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub color: String,
    pub value: f64,
    pub column: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub label: Option<String>,
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
    pub path: Option<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                color: node.color.clone(),
                value: node.value,
                column: node.column,
                x0: node.x0,
                x1: node.x1,
                y0: node.y0,
                y1: node.y1,
            })
            .collect();

        let links = layout
            .links
            .iter()
            .enumerate()
            .map(|(idx, link)| LinkDump {
                source: layout.nodes[link.source].id.clone(),
                target: layout.nodes[link.target].id.clone(),
                value: link.value,
                label: link.label.clone(),
                width: link.width,
                y0: link.y0,
                y1: link.y1,
                path: layout.link_curve(idx).map(|curve| curve.to_svg_path()),
            })
            .collect();

        let columns = layout
            .column_ids()
            .into_iter()
            .map(|column| column.into_iter().map(str::to_string).collect())
            .collect();

        LayoutDump {
            bounds: layout.bounds,
            node_thickness: layout.node_thickness,
            options: layout.options.clone(),
            columns,
            nodes,
            links,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
