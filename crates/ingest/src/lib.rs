pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod district;
pub mod export;
pub mod fetcher;
pub mod links;
pub mod page;

pub use aggregate::{collect_results, collect_results_with_summary, RunSummary};
pub use chart::{chart_path, render_top_parties};
pub use cli::CliArgs;
pub use config::{PageLayout, ScrapeConfig};
pub use district::{parse_district, DistrictOutcome, SkipReason};
pub use export::{export_csv, write_csv};
pub use fetcher::{FetchError, HttpFetcher, PageSource};
pub use links::extract_district_links;
pub use page::{Node, Page};
