use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::filters::{LocationType, Region, SortBy, SortOrder, ALL};

/// One record returned by the search API. Key order follows the JSON payload.
pub type ResultRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub location_type: LocationType,
    pub region: Region,
    pub state_abbreviation: String,
    pub state_fips_code: String,
    pub parcl_id: Option<u64>,
    pub geoid: String,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            location_type: LocationType::All,
            region: Region::All,
            state_abbreviation: ALL.to_string(),
            state_fips_code: ALL.to_string(),
            parcl_id: None,
            geoid: String::new(),
            sort_by: Some(SortBy::TotalPopulation),
            sort_order: Some(SortOrder::Desc),
            limit: 12,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<ResultRow>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Option<f64>>,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn with_value(mut self, series: impl Into<String>, value: f64) -> Self {
        self.values.insert(series.into(), Some(value));
        self
    }

    pub fn value(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_without_items_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total, Some(0));
    }

    #[test]
    fn rows_keep_payload_key_order() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"items": [{"zeta": 1, "alpha": "a", "mid": null}]}"#,
        )
        .unwrap();
        let keys: Vec<&String> = response.items[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_series_value_reads_as_none() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let point = TimeSeriesPoint::new(date).with_value("median_price", 410_000.0);
        assert_eq!(point.value("median_price"), Some(410_000.0));
        assert_eq!(point.value("inventory"), None);
    }
}
