use anyhow::Result;

use crate::config::PageLayout;
use crate::page::Page;

/// Absolute district URLs listed on an index page, in document order.
pub fn extract_district_links(page: &Page, layout: &PageLayout, base_url: &str) -> Result<Vec<String>> {
    let mut links = Vec::new();

    for cell in page.find_all(layout.cell_tag, layout.number_class)? {
        let href = cell
            .first_descendant(layout.link_tag)?
            .and_then(|link| link.attr(layout.link_attr))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        match href {
            Some(href) => links.push(format!("{base_url}{href}")),
            None => tracing::warn!(
                cell = %cell.text().trim(),
                attribute = layout.link_attr,
                "failed to obtain complete URL for a link"
            ),
        }
    }

    tracing::info!(count = links.len(), "extracted district links");
    Ok(links)
}
