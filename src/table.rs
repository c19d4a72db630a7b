use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::models::ResultRow;

pub const NO_DATA: &str = "No data yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub header: String,
}

/// A rendered view of search results. Columns come from the first row only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows(records: &[ResultRow]) -> Self {
        let Some(first) = records.first() else {
            return Self::default();
        };

        let columns: Vec<Column> = first
            .keys()
            .map(|key| Column {
                key: key.clone(),
                header: capitalize(key),
            })
            .collect();

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let extra = record
                    .keys()
                    .filter(|key| !first.contains_key(key.as_str()))
                    .count();
                if extra > 0 {
                    tracing::debug!(row = index, extra, "dropping keys not present on first row");
                }
                columns
                    .iter()
                    .map(|column| record.get(&column.key).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn builder(&self, cell: impl Fn(&str) -> String) -> Builder {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| cell(c.header.as_str())));
        for row in &self.rows {
            builder.push_record(row.iter().map(|value| cell(value.as_str())));
        }
        builder
    }

    /// Bordered plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return format!("{NO_DATA}\n");
        }

        let mut table = self.builder(str::to_string).build();
        table.with(Style::rounded());
        format!("{table}\n")
    }

    pub fn render_markdown(&self) -> String {
        if self.is_empty() {
            return format!("{NO_DATA}\n");
        }

        let mut table = self
            .builder(|value| value.replace('|', "\\|").replace('\n', "<br>"))
            .build();
        table.with(Style::markdown());
        format!("{table}\n")
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        if !self.columns.is_empty() {
            writer.write_record(self.columns.iter().map(|c| c.key.as_str()))?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        nested => nested.to_string(),
    }
}
