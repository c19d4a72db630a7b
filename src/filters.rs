use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel shared by every enumerated filter meaning "no filter".
pub const ALL: &str = "ALL";

pub const STATE_ABBREVIATIONS: &[&str] = &[
    "ALL", "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "IA", "ID", "IL",
    "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE",
    "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VA", "VT", "WA", "WI", "WV", "WY",
];

pub const STATE_FIPS_CODES: &[&str] = &[
    "ALL", "01", "02", "04", "05", "06", "08", "09", "10", "11", "12", "13", "15", "16", "17",
    "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32",
    "33", "34", "35", "36", "37", "38", "39", "40", "41", "42", "44", "45", "46", "47", "48",
    "49", "50", "51", "53", "54", "55", "56",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    #[default]
    All,
    County,
    City,
    #[value(name = "ZIP5")]
    Zip5,
    Cdp,
    Village,
    Town,
    Cbsa,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::All => ALL,
            LocationType::County => "COUNTY",
            LocationType::City => "CITY",
            LocationType::Zip5 => "ZIP5",
            LocationType::Cdp => "CDP",
            LocationType::Village => "VILLAGE",
            LocationType::Town => "TOWN",
            LocationType::Cbsa => "CBSA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    EastNorthCentral,
    EastSouthCentral,
    MiddleAtlantic,
    Mountain,
    NewEngland,
    Pacific,
    SouthAtlantic,
    WestNorthCentral,
    WestSouthCentral,
    #[default]
    All,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::EastNorthCentral => "EAST_NORTH_CENTRAL",
            Region::EastSouthCentral => "EAST_SOUTH_CENTRAL",
            Region::MiddleAtlantic => "MIDDLE_ATLANTIC",
            Region::Mountain => "MOUNTAIN",
            Region::NewEngland => "NEW_ENGLAND",
            Region::Pacific => "PACIFIC",
            Region::SouthAtlantic => "SOUTH_ATLANTIC",
            Region::WestNorthCentral => "WEST_NORTH_CENTRAL",
            Region::WestSouthCentral => "WEST_SOUTH_CENTRAL",
            Region::All => ALL,
        }
    }

    /// Human readable name, e.g. `NEW ENGLAND`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    #[default]
    TotalPopulation,
    PriceDrop,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::TotalPopulation => "TOTAL_POPULATION",
            SortBy::PriceDrop => "PRICE_DROP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

pub fn location_types() -> Vec<&'static str> {
    LocationType::value_variants()
        .iter()
        .map(LocationType::as_str)
        .collect()
}
