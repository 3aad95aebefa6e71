use anyhow::Result;
use election_core::ResultSet;
use std::time::Instant;

use crate::config::PageLayout;
use crate::district::{parse_district, DistrictOutcome};
use crate::fetcher::{FetchError, PageSource};
use crate::links::extract_district_links;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub links: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Scrapes every district listed on the index page.
///
/// A district that fails to parse is logged and left out. A page that cannot
/// be fetched aborts the run with a [`FetchError`].
pub fn collect_results<S: PageSource + ?Sized>(
    source: &S,
    index_url: &str,
    layout: &PageLayout,
    base_url: &str,
) -> Result<ResultSet> {
    let (results, _) = collect_results_with_summary(source, index_url, layout, base_url)?;
    Ok(results)
}

pub fn collect_results_with_summary<S: PageSource + ?Sized>(
    source: &S,
    index_url: &str,
    layout: &PageLayout,
    base_url: &str,
) -> Result<(ResultSet, RunSummary)> {
    let index = source.fetch(index_url)?;
    let links = extract_district_links(&index, layout, base_url)?;

    let mut results = ResultSet::new();
    let mut summary = RunSummary {
        links: links.len(),
        ..RunSummary::default()
    };
    let started = Instant::now();

    for (idx, link) in links.iter().enumerate() {
        match scrape_district(source, link, layout) {
            Ok(DistrictOutcome::Parsed(record)) => {
                let code = record.code.clone();
                if results.insert(record).is_some() {
                    tracing::warn!(code = %code, url = %link, "district code repeated, keeping the latest record");
                }
                summary.parsed += 1;
            }
            Ok(DistrictOutcome::Skipped { .. }) => summary.skipped += 1,
            Err(e) if e.is::<FetchError>() => return Err(e),
            Err(e) => {
                tracing::error!(url = %link, error = %format!("{e:#}"), "an error occurred for district");
                summary.failed += 1;
            }
        }

        let processed = idx + 1;
        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { processed as f64 / elapsed } else { 0.0 };
        tracing::info!(
            processed,
            total = links.len(),
            elapsed_s = %format!("{elapsed:.1}"),
            rate = %format!("{rate:.2}/s"),
            "scraping district information"
        );
    }

    tracing::info!(
        districts = results.len(),
        parsed = summary.parsed,
        skipped = summary.skipped,
        failed = summary.failed,
        "district scrape finished"
    );
    if results.is_empty() {
        tracing::warn!(url = index_url, "no district results collected");
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => tracing::debug!(results = %json, "scraped data"),
            Err(e) => tracing::debug!(error = %e, "failed to serialize scraped data"),
        }
    }

    Ok((results, summary))
}

fn scrape_district<S: PageSource + ?Sized>(
    source: &S,
    link: &str,
    layout: &PageLayout,
) -> Result<DistrictOutcome> {
    let page = source.fetch(link)?;
    parse_district(&page, link, layout)
}
