use anyhow::{Context, Result};
use election_core::{PROJECT_NAME, PROJECT_VERSION};

use crate::page::Page;

/// A page could not be downloaded. This ends the whole run.
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch the page '{url}': {class}: {message}")]
pub struct FetchError {
    pub url: String,
    pub class: &'static str,
    pub message: String,
}

impl FetchError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let class = if err.is_status() {
            "HTTPError"
        } else if err.is_timeout() {
            "Timeout"
        } else if err.is_connect() {
            "ConnectionError"
        } else {
            "RequestError"
        };
        Self {
            url: url.to_string(),
            class,
            message: err.to_string(),
        }
    }
}

/// Anything that can turn a URL into a parsed page.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

fn build_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("{PROJECT_NAME}/{PROJECT_VERSION}"))
        .build()
        .context("failed to build HTTP client")
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        tracing::debug!(url, "fetching page");

        let body = self
            .client
            .get(url)
            .header("Accept", "text/html")
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| {
                let err = FetchError::from_reqwest(url, e);
                tracing::error!(url, class = err.class, error = %err.message, "failed to fetch page");
                err
            })?;

        tracing::debug!(url, bytes = body.len(), "downloaded page");
        Ok(Page::parse(&body))
    }
}
