use serde::{Deserialize, Serialize};

const CLASSIC_PALETTE: [&str; 15] = [
    "#3498db", "#2ecc71", "#e74c3c", "#f39c12", "#9b59b6", "#1abc9c", "#34495e", "#e67e22",
    "#8e44ad", "#27ae60", "#2980b9", "#c0392b", "#d35400", "#7f8c8d", "#16a085",
];

const MODERN_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub label_color: String,
    pub node_stroke: String,
    pub link_fallback_color: String,
    pub background: String,
    pub palette: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif"
                .to_string(),
            font_size: 14.0,
            font_weight: 600,
            label_color: "#2c3e50".to_string(),
            node_stroke: "#FFFFFF".to_string(),
            link_fallback_color: "#888888".to_string(),
            background: "#FFFFFF".to_string(),
            palette: CLASSIC_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            font_weight: 500,
            label_color: "#1C2430".to_string(),
            node_stroke: "#FFFFFF".to_string(),
            link_fallback_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
            palette: MODERN_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Default color for the node at `index` in first-seen order.
    pub fn palette_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return self.link_fallback_color.as_str();
        }
        self.palette[index % self.palette.len()].as_str()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_by_position() {
        let theme = Theme::classic();
        assert_eq!(theme.palette_color(0), "#3498db");
        assert_eq!(theme.palette_color(15), "#3498db");
        assert_eq!(theme.palette_color(16), "#2ecc71");
    }

    #[test]
    fn empty_palette_falls_back() {
        let mut theme = Theme::modern();
        theme.palette.clear();
        assert_eq!(theme.palette_color(3), "#7A8AA6");
    }
}
