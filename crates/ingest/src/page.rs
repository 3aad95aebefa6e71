//! Query helpers over a parsed HTML document.
//!
//! The scrapers only ever need a handful of lookups: every cell with a given
//! tag and class, those same cells narrowed by their `headers` attribute, and
//! the first element under a CSS selector whose text contains a label.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

pub struct Page {
    document: Html,
}

#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Elements named `tag` that carry `class`, in document order.
    pub fn find_all(&self, tag: &str, class: &str) -> Result<Vec<Node<'_>>> {
        let selector = parse_selector(tag)?;
        Ok(self
            .document
            .select(&selector)
            .filter(|el| el.value().classes().any(|c| c == class))
            .map(Node::from)
            .collect())
    }

    pub fn find_all_with_headers(
        &self,
        tag: &str,
        class: &str,
        markers: &[&str],
    ) -> Result<Vec<Node<'_>>> {
        Ok(self
            .find_all(tag, class)?
            .into_iter()
            .filter(|node| markers.iter().any(|m| node.has_header(m)))
            .collect())
    }

    pub fn find_first_with_header(
        &self,
        tag: &str,
        class: &str,
        marker: &str,
    ) -> Result<Option<Node<'_>>> {
        Ok(self
            .find_all(tag, class)?
            .into_iter()
            .find(|node| node.has_header(marker)))
    }

    pub fn select_first_containing(&self, selector: &str, needle: &str) -> Result<Option<Node<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .map(Node::from)
            .find(|node| node.text().contains(needle)))
    }
}

impl<'a> Node<'a> {
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn first_descendant(&self, tag: &str) -> Result<Option<Node<'a>>> {
        let selector = parse_selector(tag)?;
        Ok(self.element.select(&selector).next().map(Node::from))
    }

    fn has_header(&self, marker: &str) -> bool {
        self.attr("headers")
            .is_some_and(|value| header_matches(value, marker))
    }
}

impl<'a> From<ElementRef<'a>> for Node<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

/// `headers` is a token list: a marker matches the whole value, or a single
/// token of it.
pub fn header_matches(value: &str, marker: &str) -> bool {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let wanted: Vec<&str> = marker.split_whitespace().collect();
    tokens == wanted || (wanted.len() == 1 && tokens.contains(&wanted[0]))
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid CSS selector '{selector}': {e}"))
}
