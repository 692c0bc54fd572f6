use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 150.0,
            bottom: 50.0,
            left: 150.0,
        }
    }
}

/// Axis-aligned rectangle the layout is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_thickness: f64,
    pub node_gap: f64,
    pub bounds: Bounds,
}

impl LayoutConfig {
    /// Places `bounds` inside a `width` x `height` canvas, leaving `margin` free for labels.
    pub fn fit_canvas(&mut self, width: f64, height: f64, margin: &Margin) {
        let x0 = margin.left;
        let y0 = margin.top;
        let x1 = (width - margin.right).max(x0);
        let y1 = (height - margin.bottom).max(y0);
        self.bounds = Bounds::new(x0, y0, x1, y1);
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let render = RenderConfig::default();
        let mut config = Self {
            node_thickness: 20.0,
            node_gap: 30.0,
            bounds: Bounds::new(0.0, 0.0, render.width, render.height),
        };
        config.fit_canvas(render.width, render.height, &render.margin);
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub min_link_width: f64,
    pub link_opacity: f64,
    pub gradient_opacity: f64,
    pub max_export_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: Margin::default(),
            min_link_width: 3.0,
            link_opacity: 0.7,
            gradient_opacity: 0.6,
            max_export_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Denial-of-service guards applied while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseLimits {
    pub max_input_chars: usize,
    pub max_nodes: usize,
    pub max_links: usize,
    pub max_node_name_chars: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_chars: 100_000,
            max_nodes: 1_000,
            max_links: 5_000,
            max_node_name_chars: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub limits: ParseLimits,
}

impl Config {
    /// Re-derives the layout bounds after the canvas size or margin changed.
    pub fn sync_layout_bounds(&mut self) {
        self.layout
            .fit_canvas(self.render.width, self.render.height, &self.render.margin);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    label_color: Option<String>,
    background: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarginFile {
    top: Option<f64>,
    right: Option<f64>,
    bottom: Option<f64>,
    left: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyConfigFile {
    node_thickness: Option<f64>,
    node_gap: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<MarginFile>,
    min_link_width: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitsFile {
    max_input_chars: Option<usize>,
    max_nodes: Option<usize>,
    max_links: Option<usize>,
    max_node_name_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    sankey: Option<SankeyConfigFile>,
    limits: Option<LimitsFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config_str(&contents)
}

/// Parses a JSON5 config document on top of [`Config::default`].
pub fn parse_config_str(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => {
                log::warn!("unknown theme {other:?}, keeping the classic theme");
            }
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.palette {
            config.theme.palette = v;
        }
    }

    if let Some(sankey) = parsed.sankey {
        if let Some(v) = sankey.node_thickness {
            config.layout.node_thickness = v;
        }
        if let Some(v) = sankey.node_gap {
            config.layout.node_gap = v;
        }
        if let Some(v) = sankey.width {
            config.render.width = v;
        }
        if let Some(v) = sankey.height {
            config.render.height = v;
        }
        if let Some(margin) = sankey.margin {
            let current = &mut config.render.margin;
            if let Some(v) = margin.top {
                current.top = v;
            }
            if let Some(v) = margin.right {
                current.right = v;
            }
            if let Some(v) = margin.bottom {
                current.bottom = v;
            }
            if let Some(v) = margin.left {
                current.left = v;
            }
        }
        if let Some(v) = sankey.min_link_width {
            config.render.min_link_width = v;
        }
    }

    if let Some(limits) = parsed.limits {
        if let Some(v) = limits.max_input_chars {
            config.limits.max_input_chars = v;
        }
        if let Some(v) = limits.max_nodes {
            config.limits.max_nodes = v;
        }
        if let Some(v) = limits.max_links {
            config.limits.max_links = v;
        }
        if let Some(v) = limits.max_node_name_chars {
            config.limits.max_node_name_chars = v;
        }
    }

    config.sync_layout_bounds();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_leave_room_for_labels() {
        let config = Config::default();
        assert_eq!(config.layout.bounds, Bounds::new(150.0, 50.0, 650.0, 550.0));
    }

    #[test]
    fn parses_json5_with_comments_and_trailing_commas() {
        let input = r##"{
            // switch palette
            theme: "modern",
            themeVariables: { fontSize: 12, palette: ["#111111", "#222222"], },
            sankey: { nodeThickness: 12, nodeGap: 4, width: 1000, margin: { left: 100 } },
            limits: { maxNodes: 10 },
        }"##;
        let config = parse_config_str(input).unwrap();
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.theme.palette, vec!["#111111", "#222222"]);
        assert_eq!(config.layout.node_thickness, 12.0);
        assert_eq!(config.layout.node_gap, 4.0);
        assert_eq!(config.limits.max_nodes, 10);
        assert_eq!(config.limits.max_links, 5_000);
        assert_eq!(config.layout.bounds, Bounds::new(100.0, 50.0, 850.0, 550.0));
    }

    #[test]
    fn rejects_malformed_config() {
        assert!(parse_config_str("{ sankey: ").is_err());
    }

    #[test]
    fn tiny_canvas_does_not_invert_bounds() {
        let mut layout = LayoutConfig::default();
        layout.fit_canvas(100.0, 40.0, &Margin::default());
        assert!(layout.bounds.width() >= 0.0);
        assert!(layout.bounds.height() >= 0.0);
    }
}
