use url::form_urlencoded;

use crate::filters::ALL;
use crate::models::SearchParams;

/// Ordered `(key, value)` pairs for the fields that carry a filter.
///
/// Text fields are skipped when empty, enumerated fields when set to `ALL`,
/// optional fields when unset. `limit` and `offset` are always present.
pub fn query_pairs(params: &SearchParams) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    if !params.query.is_empty() {
        pairs.push(("query", params.query.clone()));
    }
    if params.location_type.as_str() != ALL {
        pairs.push(("location_type", params.location_type.as_str().to_string()));
    }
    if params.region.as_str() != ALL {
        pairs.push(("region", params.region.as_str().to_string()));
    }
    if params.state_abbreviation != ALL {
        pairs.push(("state_abbreviation", params.state_abbreviation.clone()));
    }
    if params.state_fips_code != ALL {
        pairs.push(("state_fips_code", params.state_fips_code.clone()));
    }
    if let Some(parcl_id) = params.parcl_id {
        pairs.push(("parcl_id", parcl_id.to_string()));
    }
    if !params.geoid.is_empty() {
        pairs.push(("geoid", params.geoid.clone()));
    }
    if let Some(sort_by) = params.sort_by {
        pairs.push(("sort_by", sort_by.as_str().to_string()));
    }
    if let Some(sort_order) = params.sort_order {
        pairs.push(("sort_order", sort_order.as_str().to_string()));
    }
    pairs.push(("limit", params.limit.to_string()));
    pairs.push(("offset", params.offset.to_string()));

    pairs
}

pub fn build_query_string(params: &SearchParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query_pairs(params) {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::filters::{LocationType, Region, SortOrder};

    fn keys(query: &str) -> HashSet<String> {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, _)| key.into_owned())
            .collect()
    }

    #[test]
    fn default_params_emit_sort_and_pagination() {
        let query = build_query_string(&SearchParams::default());
        assert_eq!(query, "sort_by=TOTAL_POPULATION&sort_order=DESC&limit=12&offset=0");
    }

    #[test]
    fn unfiltered_params_emit_only_pagination() {
        let params = SearchParams {
            sort_by: None,
            sort_order: None,
            ..SearchParams::default()
        };
        let expected: HashSet<String> = ["limit", "offset"].iter().map(|k| k.to_string()).collect();
        assert_eq!(keys(&build_query_string(&params)), expected);
    }

    #[test]
    fn set_fields_map_to_snake_case_keys() {
        let params = SearchParams {
            query: "New York".to_string(),
            location_type: LocationType::City,
            region: Region::MiddleAtlantic,
            state_abbreviation: "NY".to_string(),
            state_fips_code: "36".to_string(),
            parcl_id: Some(2_900_187),
            geoid: "3651000".to_string(),
            sort_order: Some(SortOrder::Asc),
            ..SearchParams::default()
        };
        let pairs: Vec<(String, String)> =
            form_urlencoded::parse(build_query_string(&params).as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

        assert!(pairs.contains(&("query".to_string(), "New York".to_string())));
        assert!(pairs.contains(&("location_type".to_string(), "CITY".to_string())));
        assert!(pairs.contains(&("region".to_string(), "MIDDLE_ATLANTIC".to_string())));
        assert!(pairs.contains(&("state_abbreviation".to_string(), "NY".to_string())));
        assert!(pairs.contains(&("state_fips_code".to_string(), "36".to_string())));
        assert!(pairs.contains(&("parcl_id".to_string(), "2900187".to_string())));
        assert!(pairs.contains(&("geoid".to_string(), "3651000".to_string())));
        assert!(pairs.contains(&("sort_order".to_string(), "ASC".to_string())));
    }

    #[test]
    fn values_are_form_encoded() {
        let params = SearchParams {
            query: "St. Louis & Co".to_string(),
            ..SearchParams::default()
        };
        let query = build_query_string(&params);
        assert!(query.starts_with("query=St.+Louis+%26+Co&"));
    }

    #[test]
    fn pagination_passes_through_unchecked() {
        let params = SearchParams {
            limit: 100_000,
            offset: -20,
            ..SearchParams::default()
        };
        let pairs = query_pairs(&params);
        assert_eq!(pairs[pairs.len() - 2], ("limit", "100000".to_string()));
        assert_eq!(pairs[pairs.len() - 1], ("offset", "-20".to_string()));
    }
}
