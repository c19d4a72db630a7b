use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDate;

use crate::models::TimeSeriesPoint;

/// Orders points by date, oldest first. Points sharing a date keep their
/// relative order.
pub fn sort_chart_data(points: &mut [TimeSeriesPoint]) {
    points.sort_by_key(|point| point.date);
}

/// Loads a CSV with a `date` column (`YYYY-MM-DD`) and any number of numeric
/// series columns. Blank cells are kept as missing values.
pub fn load_series_csv(path: &Path) -> anyhow::Result<Vec<TimeSeriesPoint>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open series file {}", path.display()))?;
    read_series(reader).with_context(|| format!("invalid series file {}", path.display()))
}

fn read_series<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<TimeSeriesPoint>> {
    let headers = reader.headers()?.clone();
    let Some(date_index) = headers.iter().position(|h| h.trim() == "date") else {
        bail!("missing `date` column");
    };

    let mut points = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let raw_date = record.get(date_index).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .with_context(|| format!("row {}: bad date {raw_date:?}", line + 1))?;

        let mut point = TimeSeriesPoint::new(date);
        for (index, header) in headers.iter().enumerate() {
            if index == date_index {
                continue;
            }
            let cell = record.get(index).unwrap_or_default().trim();
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().with_context(|| {
                    format!("row {}: column {header} is not numeric: {cell:?}", line + 1)
                })?)
            };
            point.values.insert(header.trim().to_string(), value);
        }
        points.push(point);
    }

    tracing::debug!(points = points.len(), "loaded series");
    Ok(points)
}
