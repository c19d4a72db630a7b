//! Dual-axis chart specs for Plotly.
//!
//! A line series is drawn on the primary axis, over up to two bar series that
//! share a secondary axis on the right. Building a spec is pure; writing it
//! out is left to [`save_figure`].

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::TimeSeriesPoint;
use crate::series::sort_chart_data;
use crate::style::{ChartStyleConfig, FontSpec, LogoImage};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Points plus the name of the value to plot from each point.
#[derive(Debug, Clone)]
pub struct Series {
    pub points: Vec<TimeSeriesPoint>,
    pub field: String,
}

impl Series {
    pub fn new(points: Vec<TimeSeriesPoint>, field: impl Into<String>) -> Self {
        Self {
            points,
            field: field.into(),
        }
    }

    fn sorted_xy(mut self) -> (Vec<NaiveDate>, Vec<Option<f64>>, String) {
        sort_chart_data(&mut self.points);
        let x = self.points.iter().map(|p| p.date).collect();
        let y = self.points.iter().map(|p| p.value(&self.field)).collect();
        (x, y, self.field)
    }
}

#[derive(Debug, Clone)]
pub struct DualAxisChart {
    pub title: String,
    pub line: Series,
    pub bar1: Option<Series>,
    pub bar2: Option<Series>,
    pub yaxis1_title: String,
    pub yaxis2_title: String,
    pub width: u32,
    pub height: u32,
    pub style: ChartStyleConfig,
    pub logo: Option<LogoImage>,
}

impl DualAxisChart {
    pub fn new(title: impl Into<String>, line: Series) -> Self {
        Self {
            title: title.into(),
            line,
            bar1: None,
            bar2: None,
            yaxis1_title: "Primary Y-Axis".to_string(),
            yaxis2_title: "Secondary Y-Axis".to_string(),
            width: 1200,
            height: 675,
            style: ChartStyleConfig::default(),
            logo: None,
        }
    }

    pub fn build(self) -> ChartSpec {
        let style = &self.style;
        let has_bar2 = self.bar2.is_some();
        let mut data = Vec::with_capacity(3);

        if let Some(bar) = self.bar1 {
            data.push(bar_trace(bar, &style.bar1_color, style.bar1_opacity));
        }
        if let Some(bar) = self.bar2 {
            data.push(bar_trace(bar, &style.bar2_color, style.bar2_opacity));
        }

        let (x, y, _) = self.line.sorted_xy();
        data.push(Trace {
            kind: "scatter",
            mode: Some("lines+markers"),
            x,
            y,
            name: self.yaxis1_title.clone(),
            yaxis: None,
            line: Some(LineStyle {
                width: style.line_width,
                color: style.line_color.clone(),
            }),
            marker: Marker {
                color: style.marker_color.clone(),
                opacity: None,
                size: Some(style.marker_size),
                line: Some(LineStyle {
                    width: 1.0,
                    color: style.marker_outline_color.clone(),
                }),
            },
        });
        // Line first so it paints above the bars.
        data.reverse();

        let axis_title = |text: &str| AxisTitle {
            text: text.to_string(),
            font: style.title_font_axis.clone(),
        };

        let layout = Layout {
            margin: Margin {
                l: 40,
                r: 40,
                t: 80,
                b: 40,
            },
            height: self.height,
            width: self.width,
            title: Title {
                text: self.title.clone(),
                x: 0.5,
                y: 0.95,
                xanchor: "center",
                yanchor: "top",
                font: style.title_font.clone(),
            },
            plot_bgcolor: style.background_color.clone(),
            paper_bgcolor: style.background_color.clone(),
            font: FontColor {
                color: style.font_color.clone(),
            },
            xaxis: Axis {
                title: axis_title(""),
                showgrid: style.showgrid,
                gridwidth: style.gridwidth,
                gridcolor: Some(style.grid_color.clone()),
                tickangle: Some(style.tick_angle),
                tickfont: style.axis_font.clone(),
                tickprefix: None,
                ticksuffix: None,
                zeroline: None,
                linecolor: style.line_color_axis.clone(),
                linewidth: style.linewidth,
                overlaying: None,
                side: None,
            },
            yaxis: Axis {
                title: axis_title(&self.yaxis1_title),
                showgrid: style.showgrid,
                gridwidth: style.gridwidth,
                gridcolor: Some(style.grid_color.clone()),
                tickangle: None,
                tickfont: style.axis_font.clone(),
                tickprefix: Some(style.tick_prefix.clone()),
                ticksuffix: None,
                zeroline: Some(false),
                linecolor: style.line_color_axis.clone(),
                linewidth: style.linewidth,
                overlaying: None,
                side: None,
            },
            yaxis2: Axis {
                title: axis_title(&self.yaxis2_title),
                showgrid: false,
                gridwidth: style.gridwidth,
                gridcolor: None,
                tickangle: None,
                tickfont: style.axis_font.clone(),
                tickprefix: None,
                ticksuffix: Some(style.tick_suffix.clone()),
                zeroline: Some(false),
                linecolor: style.line_color_axis.clone(),
                linewidth: style.linewidth,
                overlaying: Some("y"),
                side: Some("right"),
            },
            hovermode: "x unified",
            hoverlabel: HoverLabel {
                bgcolor: style.hover_bg_color.clone(),
                font: FontSpec {
                    size: style.hover_font_size,
                    color: style.hover_font_color.clone(),
                    family: style.hover_font_family.clone(),
                },
            },
            legend: Legend {
                x: style.legend_x,
                y: style.legend_y,
                xanchor: style.legend_xanchor.clone(),
                yanchor: style.legend_yanchor.clone(),
                font: style.legend_font.clone(),
                bgcolor: "rgba(0, 0, 0, 0)",
            },
            barmode: if has_bar2 {
                style.barmode.clone()
            } else {
                "group".to_string()
            },
            images: self.logo.into_iter().collect(),
        };

        ChartSpec { data, layout }
    }
}

fn bar_trace(series: Series, color: &str, opacity: f64) -> Trace {
    let (x, y, name) = series.sorted_xy();
    Trace {
        kind: "bar",
        mode: None,
        x,
        y,
        name,
        yaxis: Some("y2"),
        line: None,
        marker: Marker {
            color: color.to_string(),
            opacity: Some(opacity),
            size: None,
            line: None,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub margin: Margin,
    pub height: u32,
    pub width: u32,
    pub title: Title,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
    pub font: FontColor,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub yaxis2: Axis,
    pub hovermode: &'static str,
    pub hoverlabel: HoverLabel,
    pub legend: Legend,
    pub barmode: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<LogoImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub font: FontSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FontColor {
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisTitle {
    pub text: String,
    pub font: FontSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    pub showgrid: bool,
    pub gridwidth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
    pub tickfont: FontSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickprefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticksuffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    pub linecolor: String,
    pub linewidth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverLabel {
    pub bgcolor: String,
    pub font: FontSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub xanchor: String,
    pub yanchor: String,
    pub font: FontSpec,
    pub bgcolor: &'static str,
}

/// Writes `spec` at the given size. Does nothing without a path.
///
/// A `.html` path gets a standalone page that loads plotly.js; anything else
/// gets the figure as Plotly JSON.
pub fn save_figure(
    spec: &ChartSpec,
    path: Option<&Path>,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let mut figure = spec.clone();
    figure.layout.width = width;
    figure.layout.height = height;

    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    let contents = if is_html {
        render_html(&figure)?
    } else {
        serde_json::to_string_pretty(&figure)?
    };

    std::fs::write(path, contents)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    tracing::info!(path = %path.display(), width, height, "chart saved");
    Ok(())
}

fn render_html(spec: &ChartSpec) -> anyhow::Result<String> {
    let data = script_json(&spec.data)?;
    let layout = script_json(&spec.layout)?;
    let title = escape_html(&spec.layout.title.text);
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body style="margin:0;background:{background}">
<div id="chart"></div>
<script>Plotly.newPlot("chart", {data}, {layout});</script>
</body>
</html>
"#,
        background = escape_html(&spec.layout.paper_bgcolor),
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON safe to inline in a `<script>` element. `<` only appears inside
/// JSON strings, where `\u003c` decodes to the same character.
fn script_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}
