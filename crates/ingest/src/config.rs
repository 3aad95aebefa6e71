use std::{env, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://volby.cz/pls/ps2017nss/";
pub const DEFAULT_RESULTS_DIR: &str = "Results";

#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    /// Prefix for the relative district links found on the index page.
    pub base_url: String,
    pub results_dir: PathBuf,
    pub chart_font: Option<PathBuf>,
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            results_dir: env::var("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_DIR)),
            chart_font: env::var("CHART_FONT").ok().filter(|p| !p.is_empty()).map(PathBuf::from),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            chart_font: None,
        }
    }
}

/// Tags, classes and header markers of the volby.cz result pages.
#[derive(Clone, Copy, Debug)]
pub struct PageLayout {
    pub cell_tag: &'static str,
    pub number_class: &'static str,
    pub link_tag: &'static str,
    pub link_attr: &'static str,
    pub location_selector: &'static str,
    pub location_label: &'static str,
    pub code_param: &'static str,
    pub party_name_class: &'static str,
    /// One marker per ballot-sheet table.
    pub vote_headers: &'static [&'static str],
    pub registered_header: &'static str,
    pub envelopes_header: &'static str,
    pub valid_header: &'static str,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            cell_tag: "td",
            number_class: "cislo",
            link_tag: "a",
            link_attr: "href",
            location_selector: "h3",
            location_label: "Obec:",
            code_param: "xobec",
            party_name_class: "overflow_name",
            vote_headers: &["t1sa2 t1sb3", "t2sa2 t2sb3"],
            registered_header: "sa2",
            envelopes_header: "sa3",
            valid_header: "sa6",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_volby() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.results_dir, PathBuf::from("Results"));
        assert!(cfg.chart_font.is_none());
    }
}
