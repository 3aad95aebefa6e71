use anyhow::Result;
use clap::Parser;
use ingest::{
    collect_results, export_csv, render_top_parties, CliArgs, FetchError, HttpFetcher, PageLayout,
    ScrapeConfig,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    init_tracing();

    // usage errors exit with 2, --help with 0
    let args = CliArgs::parse();
    let config = ScrapeConfig::from_env();
    ExitCode::from(exit_status(&run(&config, &args)))
}

/// Reports a failed run on stderr or in the log and picks the exit status.
fn exit_status(result: &Result<()>) -> u8 {
    let Err(e) = result else {
        return 0;
    };
    match fetch_diagnostic(e) {
        Some(diagnostic) => eprintln!("{diagnostic}"),
        None => tracing::error!(error = %format!("{e:#}"), "scrape failed"),
    }
    1
}

fn fetch_diagnostic(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<FetchError>().map(|fetch| {
        format!(
            "ERROR: Failed to fetch the page '{}'\n{}: {}",
            fetch.url, fetch.class, fetch.message
        )
    })
}

fn run(config: &ScrapeConfig, args: &CliArgs) -> Result<()> {
    tracing::info!(url = %args.index_url, "downloading data from the selected URL");
    tracing::info!(
        results_dir = %config.results_dir.display(),
        base_url = %config.base_url,
        "output settings"
    );

    let fetcher = HttpFetcher::new()?;
    let layout = PageLayout::default();
    let results = collect_results(&fetcher, &args.index_url, &layout, &config.base_url)?;

    export_csv(&results, &config.results_dir, &args.name)?;
    render_top_parties(&results, &config.results_dir, &args.name, config.chart_font.as_deref())?;

    tracing::info!("process successfully finished");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
