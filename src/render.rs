use crate::config::RenderConfig;
use crate::layout::{Layout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const LABEL_OFFSET: f64 = 8.0;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = config.width.max(1.0);
    let height = config.height.max(1.0);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    );

    svg.push_str("<defs>");
    svg.push_str(
        "<filter id=\"dropshadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"1\" dy=\"2\" stdDeviation=\"1\" flood-color=\"rgba(0,0,0,0.15)\"/></filter>",
    );
    for (idx, link) in layout.links.iter().enumerate() {
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        let _ = write!(
            svg,
            "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.2}\" x2=\"{:.2}\"><stop offset=\"0%\" stop-color=\"{}\" stop-opacity=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\" stop-opacity=\"{}\"/></linearGradient>",
            gradient_id(idx),
            source.x1,
            target.x0,
            escape_xml(color_or(&source.color, theme)),
            config.gradient_opacity,
            escape_xml(color_or(&target.color, theme)),
            config.gradient_opacity
        );
    }
    svg.push_str("</defs>");

    if let Some(title) = layout.title() {
        let _ = write!(
            svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">{}</text>",
            layout.bounds.center_x(),
            (layout.bounds.y0 / 2.0).max(theme.font_size),
            escape_xml(&theme.font_family),
            theme.font_size * 1.3,
            theme.font_weight,
            escape_xml(&theme.label_color),
            escape_xml(title)
        );
    }

    svg.push_str("<g fill=\"none\">");
    for (idx, link) in layout.links.iter().enumerate() {
        let Some(curve) = layout.link_curve(idx) else {
            continue;
        };
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        let mut tooltip = format!("{} → {}\n{}", source.id, target.id, format_value(link.value));
        if let Some(label) = &link.label {
            tooltip.push('\n');
            tooltip.push_str(label);
        }
        let _ = write!(
            svg,
            "<path d=\"{}\" stroke=\"url(#{})\" stroke-width=\"{:.2}\" opacity=\"{}\"><title>{}</title></path>",
            curve.to_svg_path(),
            gradient_id(idx),
            link.width.max(config.min_link_width),
            config.link_opacity,
            escape_xml(&tooltip)
        );
    }
    svg.push_str("</g>");

    for (idx, link) in layout.links.iter().enumerate() {
        let (Some(label), Some(curve)) = (&link.label, layout.link_curve(idx)) else {
            continue;
        };
        let (x, y) = curve.point_at(0.5);
        let _ = write!(
            svg,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" dy=\"0.35em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" pointer-events=\"none\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size * 0.85,
            escape_xml(&theme.label_color),
            escape_xml(label)
        );
    }

    for node in &layout.nodes {
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" ry=\"2\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" filter=\"url(#dropshadow)\"><title>{}</title></rect>",
            node.x0,
            node.y0,
            node.width(),
            node.height(),
            escape_xml(color_or(&node.color, theme)),
            escape_xml(&theme.node_stroke),
            escape_xml(&format!("{}\n{}", node.id, format_value(node.value)))
        );
    }

    for node in &layout.nodes {
        svg.push_str(&node_label_svg(node, layout, theme));
    }

    svg.push_str("</svg>");
    svg
}

/// Nodes in the left half get their label on the right, and vice versa.
fn node_label_svg(node: &NodeLayout, layout: &Layout, theme: &Theme) -> String {
    let (x, anchor) = if node.x0 < layout.bounds.center_x() {
        (node.x1 + LABEL_OFFSET, "start")
    } else {
        (node.x0 - LABEL_OFFSET, "end")
    };
    let y = (node.y0 + node.y1) / 2.0;
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" dy=\"0.35em\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" pointer-events=\"none\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.font_weight,
        escape_xml(&theme.label_color),
        escape_xml(&node.id)
    )
}

fn gradient_id(link_idx: usize) -> String {
    format!("sankey-grad-{link_idx}")
}

fn color_or<'a>(color: &'a str, theme: &'a Theme) -> &'a str {
    if color.is_empty() {
        theme.link_fallback_color.as_str()
    } else {
        color
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn ensure_export_size(len: usize, config: &RenderConfig) -> Result<()> {
    if len > config.max_export_bytes {
        anyhow::bail!(
            "export too large ({len} bytes, maximum {})",
            config.max_export_bytes
        );
    }
    Ok(())
}

pub fn write_output_svg(svg: &str, output: Option<&Path>, config: &RenderConfig) -> Result<()> {
    ensure_export_size(svg.len(), config)?;
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            log::info!("wrote {}", path.display());
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    let png = pixmap.encode_png()?;
    ensure_export_size(png.len(), render_cfg)?;
    std::fs::write(output, png)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::layout::compute_layout;
    use crate::parser::parse_sankey;

    fn render(input: &str) -> String {
        let config = Config::default();
        let graph = parse_sankey(input).unwrap();
        let layout = compute_layout(&graph, &config.theme, &config.layout).unwrap();
        render_svg(&layout, &config.theme, &config.render)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render("Coal --> Power: 100\nPower --> Homes: 80\nPower --> Loss: 20");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<linearGradient").count(), 3);
        assert_eq!(svg.matches("<rect x=").count(), 4);
        assert!(svg.contains(">Homes</text>"));
        assert!(svg.contains("url(#sankey-grad-2)"));
    }

    #[test]
    fn labels_flip_sides_across_the_midline() {
        let svg = render("Left --> Right: 1");
        assert!(svg.contains("text-anchor=\"start\" font-family"));
        assert!(svg.contains("text-anchor=\"end\" font-family"));
    }

    #[test]
    fn escapes_names_titles_and_labels() {
        let svg = render("title: A & B\n\"<script>\" --> Out: 2 \"x<y\"");
        assert!(svg.contains("A &amp; B"));
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains(">x&lt;y</text>"));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn thin_links_get_minimum_stroke() {
        let svg = render("A --> B: 1000\nA --> C: 1");
        assert!(svg.contains("stroke-width=\"3.00\""));
    }

    #[test]
    fn export_guard_refuses_oversized_payloads() {
        let config = RenderConfig {
            max_export_bytes: 4,
            ..RenderConfig::default()
        };
        assert!(write_output_svg("<svg></svg>", None, &config).is_err());
    }

    #[test]
    fn integer_values_print_without_fraction() {
        assert_eq!(format_value(80.0), "80");
        assert_eq!(format_value(2.5), "2.5");
    }
}
