use sankey_rs_renderer::{Config, Theme, render_with_config, validate};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

fn build_config(options: SankeyRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    // Webviews are never laid out smaller than the default canvas.
    if let Some(width) = options.width {
        config.render.width = width.max(config.render.width);
    }
    if let Some(height) = options.height {
        config.render.height = height.max(config.render.height);
    }
    config.sync_layout_bounds();
    config
}

fn parse_options(options_json: Option<String>) -> Result<SankeyRenderOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str::<SankeyRenderOptions>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(SankeyRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_sankey_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let config = build_config(parse_options(options_json)?);
    render_with_config(code, &config).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Returns the first diagnostic as JSON, or `null` when the document parses.
#[wasm_bindgen]
pub fn validate_sankey(code: &str) -> Result<String, JsValue> {
    let diagnostic = validate(code, &Config::default().limits);
    serde_json::to_string(&diagnostic).map_err(|error| JsValue::from_str(&error.to_string()))
}
