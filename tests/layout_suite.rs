use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use sankey_rs_renderer::{
    Config, Layout, ParseErrorKind, Severity, compute_layout, parse_sankey, render_svg,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture read failed")
}

fn layout_fixture(name: &str) -> Layout {
    let config = Config::default();
    let graph = parse_sankey(&read_fixture(name)).expect("parse failed");
    compute_layout(&graph, &config.theme, &config.layout).expect("layout failed")
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "energy.sankey",
        "chain.sankey",
        "diamond.sankey",
        "cycle.sankey",
        "styled.sankey",
    ];
    let config = Config::default();
    for name in fixtures {
        let path = fixture_path(name);
        assert!(path.exists(), "fixture missing: {name}");
        let layout = layout_fixture(name);
        let svg = render_svg(&layout, &config.theme, &config.render);
        assert_valid_svg(&svg, name);
        for node in &layout.nodes {
            assert!(node.x0 >= layout.bounds.x0, "{name}: {} left of bounds", node.id);
            assert!(node.x1 <= layout.bounds.x1 + 1e-9, "{name}: {} right of bounds", node.id);
            assert!(node.y0 >= layout.bounds.y0, "{name}: {} above bounds", node.id);
            assert!(node.y1 <= layout.bounds.y1 + 1e-9, "{name}: {} below bounds", node.id);
        }
    }
}

#[test]
fn energy_fixture_columns() {
    let layout = layout_fixture("energy.sankey");
    assert_eq!(
        layout.column_ids(),
        vec![vec!["Coal"], vec!["Power"], vec!["Homes", "Loss"]]
    );
    assert_eq!(layout.node("Power").map(|n| n.value), Some(100.0));
    assert_eq!(layout.title(), Some("Energy"));
}

#[test]
fn chain_fixture_labels_last_hop() {
    let graph = parse_sankey(&read_fixture("chain.sankey")).unwrap();
    assert_eq!(graph.node_ids(), vec!["Farm", "Mill", "Bakery", "Shop"]);
    let labels: Vec<Option<&str>> = graph.links.iter().map(|l| l.label.as_deref()).collect();
    assert_eq!(labels, vec![None, None, Some("bread")]);
    assert!(graph.links.iter().all(|l| l.value == 10.0));
}

#[test]
fn diamond_fixture_waits_for_predecessors() {
    let layout = layout_fixture("diamond.sankey");
    assert_eq!(
        layout.column_ids(),
        vec![vec!["A"], vec!["B", "C"], vec!["D"]]
    );
}

#[test]
fn cycle_fixture_falls_back_to_single_column() {
    let layout = layout_fixture("cycle.sankey");
    assert_eq!(layout.column_ids(), vec![vec!["A", "B"]]);
}

#[test]
fn styled_fixture_applies_overrides() {
    let layout = layout_fixture("styled.sankey");
    let theme = Config::default().theme;
    assert_eq!(layout.node("South Africa").unwrap().color, "#FF0000");
    assert_eq!(layout.node("Europe").unwrap().color, "#00aa00");
    // Asia is the third node seen.
    assert_eq!(layout.node("Asia").unwrap().color, theme.palette[2]);
    assert!(layout.node("Unused").is_none());
}

#[test]
fn bad_value_fixture_reports_line() {
    let err = parse_sankey(&read_fixture("bad_value.sankey")).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidValue);
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.severity(), Severity::Error);
}

#[test]
fn render_entry_point_matches_manual_pipeline() {
    let input = read_fixture("energy.sankey");
    let config = Config::default();
    let layout = layout_fixture("energy.sankey");
    let manual = render_svg(&layout, &config.theme, &config.render);
    assert_eq!(sankey_rs_renderer::render(&input).unwrap(), manual);
}

#[test]
fn parse_errors_surface_through_render() {
    let err = sankey_rs_renderer::render("A --> B: abc").unwrap_err();
    assert!(err.to_string().starts_with("line 1: syntax error"));
}
