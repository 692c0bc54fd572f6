#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Bounds, Config, LayoutConfig, Margin, ParseLimits, RenderConfig, load_config};
pub use error::{Diagnostic, LayoutError, ParseError, ParseErrorKind, Severity};
pub use ir::{Graph, Link, Node, NodeStyle};
pub use layout::{CubicCurve, Layout, LinkLayout, NodeLayout, assign_columns, compute_layout};
pub use parser::{parse_sankey, parse_sankey_with_limits};
pub use render::render_svg;
pub use theme::Theme;

/// Parses, lays out and renders `input` to an SVG string.
pub fn render_with_config(input: &str, config: &Config) -> anyhow::Result<String> {
    let graph = parse_sankey_with_limits(input, &config.limits)?;
    let layout = compute_layout(&graph, &config.theme, &config.layout)?;
    Ok(render_svg(&layout, &config.theme, &config.render))
}

pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_config(input, &Config::default())
}

/// Parses `input` and reports the first problem as a diagnostic, if any.
pub fn validate(input: &str, limits: &ParseLimits) -> Option<Diagnostic> {
    parse_sankey_with_limits(input, limits)
        .err()
        .map(|err| err.to_diagnostic())
}
