use std::path::PathBuf;

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

mod chart;
mod client;
mod filters;
mod models;
mod query;
mod series;
mod style;
mod table;

use filters::{LocationType, Region, SortBy, SortOrder};
use models::SearchParams;

#[derive(Parser)]
#[command(name = "market-search")]
#[command(about = "Search real-estate markets through the API proxy and chart the results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search and print the results
    Search {
        #[command(flatten)]
        filters: SearchArgs,
        /// Proxy base url (defaults to MARKET_SEARCH_BASE_URL or http://localhost:3000)
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write the output to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the query string a search would send
    Query {
        #[command(flatten)]
        filters: SearchArgs,
    },
    /// Build a dual-axis chart from CSV time series
    Chart(ChartArgs),
    /// List accepted filter values
    Options,
}

#[derive(Args)]
struct SearchArgs {
    /// Free text search, e.g. "New York"
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long, value_enum, ignore_case = true, default_value_t = LocationType::All)]
    location_type: LocationType,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Region::All)]
    region: Region,
    #[arg(
        long,
        default_value = filters::ALL,
        value_parser = PossibleValuesParser::new(filters::STATE_ABBREVIATIONS.iter().copied())
    )]
    state_abbreviation: String,
    #[arg(
        long,
        default_value = filters::ALL,
        value_parser = PossibleValuesParser::new(filters::STATE_FIPS_CODES.iter().copied())
    )]
    state_fips_code: String,
    #[arg(long)]
    parcl_id: Option<u64>,
    /// Geographic identifier
    #[arg(long, default_value = "")]
    geoid: String,
    #[arg(long, value_enum, ignore_case = true, default_value_t = SortBy::TotalPopulation)]
    sort_by: SortBy,
    #[arg(long, value_enum, ignore_case = true, default_value_t = SortOrder::Desc)]
    sort_order: SortOrder,
    #[arg(long, default_value_t = 12, allow_negative_numbers = true)]
    limit: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        Self {
            query: args.query,
            location_type: args.location_type,
            region: args.region,
            state_abbreviation: args.state_abbreviation,
            state_fips_code: args.state_fips_code,
            parcl_id: args.parcl_id,
            geoid: args.geoid,
            sort_by: Some(args.sort_by),
            sort_order: Some(args.sort_order),
            limit: args.limit,
            offset: args.offset,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Markdown,
    Csv,
    Json,
}

#[derive(Args)]
struct ChartArgs {
    #[arg(long)]
    title: String,
    /// CSV with a `date` column for the line series
    #[arg(long)]
    line: PathBuf,
    /// Column of the line CSV to plot
    #[arg(long)]
    line_series: String,
    #[arg(long, requires = "bar1_series")]
    bar1: Option<PathBuf>,
    #[arg(long, requires = "bar1")]
    bar1_series: Option<String>,
    #[arg(long, requires = "bar2_series")]
    bar2: Option<PathBuf>,
    #[arg(long, requires = "bar2")]
    bar2_series: Option<String>,
    #[arg(long, default_value = "Primary Y-Axis")]
    yaxis1_title: String,
    #[arg(long, default_value = "Secondary Y-Axis")]
    yaxis2_title: String,
    #[arg(long, value_enum, conflicts_with_all = ["width", "height"])]
    size: Option<style::SizePreset>,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 675)]
    height: u32,
    /// JSON file overriding any subset of the default chart style
    #[arg(long)]
    style: Option<PathBuf>,
    /// Add the "powered by" logo in the given color (white or blue)
    #[arg(long)]
    logo: Option<String>,
    /// Save to this path (.html for a page, anything else for Plotly JSON)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            filters,
            base_url,
            format,
            out,
        } => {
            let params = SearchParams::from(filters);
            let mut config = client::ClientConfig::from_env()?;
            if let Some(base_url) = base_url {
                config = config.with_base_url(base_url);
            }
            let client = client::SearchClient::new(config)?;

            let response = match client.search(&params).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(error = %err, "search failed");
                    anyhow::bail!("Failed to load data");
                }
            };

            let rendered = render_results(&response.items, format)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote {} rows to {}.", response.items.len(), path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Query { filters } => {
            println!("{}", query::build_query_string(&SearchParams::from(filters)));
        }
        Commands::Chart(args) => run_chart(args)?,
        Commands::Options => print_options(),
    }

    Ok(())
}

fn render_results(rows: &[models::ResultRow], format: OutputFormat) -> anyhow::Result<String> {
    let table = table::Table::from_rows(rows);
    let rendered = match format {
        OutputFormat::Table => table.render_text(),
        OutputFormat::Markdown => table.render_markdown(),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            table.write_csv(&mut buffer)?;
            String::from_utf8(buffer).context("csv output was not utf-8")?
        }
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(rows)?),
    };
    Ok(rendered)
}

fn run_chart(args: ChartArgs) -> anyhow::Result<()> {
    let load = |path: &PathBuf, field: String| -> anyhow::Result<chart::Series> {
        Ok(chart::Series::new(series::load_series_csv(path)?, field))
    };

    let mut builder = chart::DualAxisChart::new(args.title, load(&args.line, args.line_series)?);
    if let (Some(path), Some(field)) = (&args.bar1, args.bar1_series) {
        builder.bar1 = Some(load(path, field)?);
    }
    if let (Some(path), Some(field)) = (&args.bar2, args.bar2_series) {
        builder.bar2 = Some(load(path, field)?);
    }
    if let Some(path) = &args.style {
        builder.style = style::ChartStyleConfig::from_path(path)?;
    }

    let (width, height) = args
        .size
        .map(|preset| preset.dimensions())
        .unwrap_or((args.width, args.height));
    builder.width = width;
    builder.height = height;
    builder.yaxis1_title = args.yaxis1_title;
    builder.yaxis2_title = args.yaxis2_title;
    builder.logo = match args.logo.as_deref() {
        Some(color) => Some(
            style::LogoImage::lookup("labs", color).context("no logo available for this source")?,
        ),
        None => None,
    };

    let spec = builder.build();
    match args.out {
        Some(path) => {
            chart::save_figure(&spec, Some(&path), width, height)?;
            println!("Chart written to {}.", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&spec)?),
    }
    Ok(())
}

fn print_options() {
    println!("Location types: {}", filters::location_types().join(", "));
    let regions: Vec<String> = Region::value_variants()
        .iter()
        .map(|region| format!("{} ({})", region.as_str(), region.label()))
        .collect();
    println!("Regions: {}", regions.join(", "));
    println!("State abbreviations: {}", filters::STATE_ABBREVIATIONS.join(", "));
    println!("State FIPS codes: {}", filters::STATE_FIPS_CODES.join(", "));
    let sort_by: Vec<&str> = SortBy::value_variants().iter().map(SortBy::as_str).collect();
    println!("Sort by: {}", sort_by.join(", "));
    let sort_order: Vec<&str> = SortOrder::value_variants()
        .iter()
        .map(SortOrder::as_str)
        .collect();
    println!("Sort order: {}", sort_order.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn default_flags_build_default_params() {
        let cli = Cli::parse_from(["market-search", "query"]);
        let Commands::Query { filters } = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(SearchParams::from(filters), SearchParams::default());
    }

    #[test]
    fn enum_flags_are_case_insensitive() {
        let cli = Cli::parse_from([
            "market-search",
            "query",
            "--location-type",
            "zip5",
            "--region",
            "new_england",
            "--sort-order",
            "asc",
        ]);
        let Commands::Query { filters } = cli.command else {
            panic!("expected query command");
        };
        let params = SearchParams::from(filters);
        assert_eq!(params.location_type, LocationType::Zip5);
        assert_eq!(params.region, Region::NewEngland);
        assert_eq!(params.sort_order, Some(SortOrder::Asc));
    }

    #[test]
    fn negative_pagination_reaches_query() {
        let cli = Cli::parse_from(["market-search", "query", "--offset", "-1", "--limit=-5"]);
        let Commands::Query { filters } = cli.command else {
            panic!("expected query command");
        };
        let query = query::build_query_string(&SearchParams::from(filters));
        assert!(query.ends_with("&limit=-5&offset=-1"));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let result = Cli::try_parse_from(["market-search", "query", "--state-abbreviation", "XX"]);
        assert!(result.is_err());
    }

    #[test]
    fn json_format_keeps_raw_rows() {
        let rows: Vec<models::ResultRow> =
            serde_json::from_str(r#"[{"name": "Tulsa", "parcl_id": 5}]"#).unwrap();
        let rendered = render_results(&rows, OutputFormat::Json).unwrap();
        assert!(rendered.contains("\"name\": \"Tulsa\""));
        let rendered = render_results(&[], OutputFormat::Table).unwrap();
        assert_eq!(rendered, "No data yet.\n");
    }
}
