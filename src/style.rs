//! Presentation constants for generated charts.
//!
//! [`ChartStyleConfig`] carries the default dark palette. Overrides are read
//! from a partial JSON object: any field left out keeps its default.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const LOGO_BLUE: &str = "https://parcllabs-assets.s3.amazonaws.com/powered-by-parcllabs-api.png";
const LOGO_WHITE: &str =
    "https://parcllabs-assets.s3.amazonaws.com/powered-by-parcllabs-api-logo-white+(1).svg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: u32,
    pub color: String,
    pub family: String,
}

impl FontSpec {
    fn new(size: u32, color: &str, family: &str) -> Self {
        Self {
            size,
            color: color.to_string(),
            family: family.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyleConfig {
    pub line_color: String,
    pub line_width: f64,
    pub marker_size: f64,
    pub marker_color: String,
    pub marker_outline_color: String,
    pub bar1_color: String,
    pub bar1_opacity: f64,
    pub bar2_color: String,
    pub bar2_opacity: f64,
    pub background_color: String,
    pub font_color: String,
    pub title_font: FontSpec,
    pub axis_font: FontSpec,
    pub title_font_axis: FontSpec,
    pub grid_color: String,
    pub line_color_axis: String,
    pub hover_bg_color: String,
    pub hover_font_size: u32,
    pub hover_font_family: String,
    pub hover_font_color: String,
    pub legend_font: FontSpec,
    pub legend_x: f64,
    pub legend_y: f64,
    pub legend_xanchor: String,
    pub legend_yanchor: String,
    pub tick_angle: i32,
    pub tick_prefix: String,
    pub tick_suffix: String,
    pub showgrid: bool,
    pub gridwidth: f64,
    pub linewidth: f64,
    /// Applied only when a second bar series is present.
    pub barmode: String,
}

impl Default for ChartStyleConfig {
    fn default() -> Self {
        Self {
            line_color: "#2ca02c".to_string(),
            line_width: 3.0,
            marker_size: 8.0,
            marker_color: "#2ca02c".to_string(),
            marker_outline_color: "#ffffff".to_string(),
            bar1_color: "#1f77b4".to_string(),
            bar1_opacity: 0.8,
            bar2_color: "#ff7f0e".to_string(),
            bar2_opacity: 0.8,
            background_color: "#1e1e1e".to_string(),
            font_color: "#ffffff".to_string(),
            title_font: FontSpec::new(24, "#ffffff", "Arial Black"),
            axis_font: FontSpec::new(12, "#ffffff", "Arial"),
            title_font_axis: FontSpec::new(14, "#ffffff", "Arial Black"),
            grid_color: "rgba(255, 255, 255, 0.2)".to_string(),
            line_color_axis: "rgba(255, 255, 255, 0.7)".to_string(),
            hover_bg_color: "#2f2f2f".to_string(),
            hover_font_size: 12,
            hover_font_family: "Arial".to_string(),
            hover_font_color: "#ffffff".to_string(),
            legend_font: FontSpec::new(12, "#ffffff", "Arial"),
            legend_x: 0.01,
            legend_y: 0.98,
            legend_xanchor: "left".to_string(),
            legend_yanchor: "top".to_string(),
            tick_angle: -45,
            tick_prefix: "$".to_string(),
            tick_suffix: " units".to_string(),
            showgrid: true,
            gridwidth: 0.5,
            linewidth: 1.0,
            barmode: "stack".to_string(),
        }
    }
}

impl ChartStyleConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid chart style overrides")
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read style file {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// Canvas sizes for common publishing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SizePreset {
    X,
    InstagramSquare,
    InstagramPortrait,
    InstagramLandscape,
    Linkedin,
    Blog,
}

impl SizePreset {
    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SizePreset::X => (1200, 675),
            SizePreset::InstagramSquare => (1080, 1080),
            SizePreset::InstagramPortrait => (1350, 1080),
            SizePreset::InstagramLandscape => (566, 1080),
            SizePreset::Linkedin => (1200, 627),
            SizePreset::Blog => (1200, 630),
        }
    }
}

/// A layout image placing the "powered by" logo on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoImage {
    pub source: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub sizex: f64,
    pub sizey: f64,
    pub xanchor: String,
    pub yanchor: String,
}

impl LogoImage {
    /// Bottom-right logo in the requested color. Unknown colors fall back to
    /// white; unknown sources yield `None`.
    pub fn lookup(src: &str, color: &str) -> Option<Self> {
        let source = match (src, color) {
            ("labs", "blue") => LOGO_BLUE,
            ("labs", _) => LOGO_WHITE,
            _ => return None,
        };
        Some(Self {
            source: source.to_string(),
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            x: 1.0,
            y: 0.0,
            sizex: 0.15,
            sizey: 0.15,
            xanchor: "right".to_string(),
            yanchor: "bottom".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let style =
            ChartStyleConfig::from_json(r##"{"line_color": "#000000", "title_font": {"size": 30, "color": "#111111", "family": "Helvetica"}}"##)
                .unwrap();
        let defaults = ChartStyleConfig::default();

        assert_eq!(style.line_color, "#000000");
        assert_eq!(style.title_font.size, 30);
        assert_eq!(style.bar1_color, defaults.bar1_color);
        assert_eq!(style.axis_font, defaults.axis_font);
        assert_eq!(style.barmode, "stack");
    }

    #[test]
    fn empty_override_is_default() {
        assert_eq!(
            ChartStyleConfig::from_json("{}").unwrap(),
            ChartStyleConfig::default()
        );
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(ChartStyleConfig::from_json(r#"{"line_width": "thick"}"#).is_err());
    }

    #[test]
    fn presets_report_width_then_height() {
        assert_eq!(SizePreset::X.dimensions(), (1200, 675));
        assert_eq!(SizePreset::Linkedin.dimensions(), (1200, 627));
        assert_eq!(SizePreset::InstagramSquare.dimensions(), (1080, 1080));
    }

    #[test]
    fn logo_falls_back_to_white() {
        let logo = LogoImage::lookup("labs", "green").unwrap();
        assert_eq!(logo.source, LOGO_WHITE);
        assert_eq!(LogoImage::lookup("labs", "blue").unwrap().source, LOGO_BLUE);
        assert!(LogoImage::lookup("other", "white").is_none());
    }
}
