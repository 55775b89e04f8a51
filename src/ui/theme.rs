use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_muted: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub cell_fg: String,
    pub cell_1: String,
    pub cell_2: String,
    pub cell_3: String,
    pub cell_4: String,
    pub cursor: String,
    pub hint_step: String,
    pub hint_final: String,
    pub hint_solution: String,
    pub arc: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // Try user themes dir
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("numberline")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(err) => tracing::warn!(%err, theme = name, "ignoring broken user theme"),
                }
            }
        }

        // Try bundled themes
        let filename = format!("{name}.toml");
        if let Some(file) = ThemeAssets::get(&filename) {
            if let Ok(content) = std::str::from_utf8(file.data.as_ref()) {
                if let Ok(theme) = toml::from_str::<Theme>(content) {
                    return Some(theme);
                }
            }
        }

        None
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("classroom").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#f8fafc".to_string(),
            fg: "#334155".to_string(),
            text_muted: "#64748b".to_string(),
            accent: "#2563eb".to_string(),
            border: "#cbd5e1".to_string(),
            header_bg: "#e0e7ff".to_string(),
            header_fg: "#1e293b".to_string(),
            cell_fg: "#ffffff".to_string(),
            cell_1: "#2563eb".to_string(),
            cell_2: "#dc2626".to_string(),
            cell_3: "#0ea5e9".to_string(),
            cell_4: "#f43f5e".to_string(),
            cursor: "#0f172a".to_string(),
            hint_step: "#facc15".to_string(),
            hint_final: "#f97316".to_string(),
            hint_solution: "#22c55e".to_string(),
            arc: "#f97316".to_string(),
            bar_filled: "#14b8a6".to_string(),
            bar_empty: "#e2e8f0".to_string(),
            error: "#ef4444".to_string(),
            warning: "#f59e0b".to_string(),
            success: "#22c55e".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_muted(&self) -> Color { Self::parse_color(&self.text_muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn cell_fg(&self) -> Color { Self::parse_color(&self.cell_fg) }
    pub fn cursor(&self) -> Color { Self::parse_color(&self.cursor) }
    pub fn hint_step(&self) -> Color { Self::parse_color(&self.hint_step) }
    pub fn hint_final(&self) -> Color { Self::parse_color(&self.hint_final) }
    pub fn hint_solution(&self) -> Color { Self::parse_color(&self.hint_solution) }
    pub fn arc(&self) -> Color { Self::parse_color(&self.arc) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }

    /// Resting colour of a cell, one of four palette slots.
    pub fn cell_palette(&self, slot: usize) -> Color {
        let hex = match slot % 4 {
            0 => &self.cell_1,
            1 => &self.cell_2,
            2 => &self.cell_3,
            _ => &self.cell_4,
        };
        Self::parse_color(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"classroom".to_string()));
        for name in names {
            assert!(Theme::load(&name).is_some(), "theme {name} failed to parse");
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("nope"), Color::White);
    }
}
