use anyhow::{Context, Result};
use election_core::{DistrictRecord, PartyVotes};
use std::fmt;
use std::num::ParseIntError;

use crate::config::PageLayout;
use crate::page::Page;

/// Why a district page produced no record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MalformedUrl,
    MissingCode,
    MissingLocation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MalformedUrl => "malformed district URL",
            SkipReason::MissingCode => "district code not found",
            SkipReason::MissingLocation => "district name not found",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub enum DistrictOutcome {
    Parsed(DistrictRecord),
    Skipped { url: String, reason: SkipReason },
}

/// Extracts one district record.
///
/// Only a missing code or a missing location name drops the district. Every
/// other problem leaves the affected field empty and is logged.
pub fn parse_district(page: &Page, url: &str, layout: &PageLayout) -> Result<DistrictOutcome> {
    let code = match district_code(url, layout.code_param) {
        Ok(Some(code)) => code,
        Ok(None) => {
            tracing::error!(url, param = layout.code_param, "district code not found for link");
            return Ok(skipped(url, SkipReason::MissingCode));
        }
        Err(e) => {
            tracing::error!(url, error = %format!("{e:#}"), "failed to parse district URL");
            return Ok(skipped(url, SkipReason::MalformedUrl));
        }
    };

    let Some(location) = location_name(page, layout)? else {
        tracing::error!(url, code = %code, label = layout.location_label, "district name not found");
        return Ok(skipped(url, SkipReason::MissingLocation));
    };

    let mut record = DistrictRecord::new(code, location);
    record.party_votes = party_votes(page, layout, &record.location)?;
    record.count_registered = aggregate_count(page, layout, layout.registered_header, &record.location)?;
    record.count_envelopes = aggregate_count(page, layout, layout.envelopes_header, &record.location)?;
    record.count_valid = aggregate_count(page, layout, layout.valid_header, &record.location)?;

    Ok(DistrictOutcome::Parsed(record))
}

fn skipped(url: &str, reason: SkipReason) -> DistrictOutcome {
    DistrictOutcome::Skipped {
        url: url.to_string(),
        reason,
    }
}

/// First non-empty value of `param` in the URL's query string.
pub fn district_code(url: &str, param: &str) -> Result<Option<String>> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid URL '{url}'"))?;
    Ok(parsed
        .query_pairs()
        .find(|(key, value)| key == param && !value.is_empty())
        .map(|(_, value)| value.into_owned()))
}

fn location_name(page: &Page, layout: &PageLayout) -> Result<Option<String>> {
    let heading = page.select_first_containing(layout.location_selector, layout.location_label)?;
    Ok(heading.and_then(|h| {
        h.text()
            .trim()
            .split_once(':')
            .map(|(_, name)| name.trim().to_string())
    }))
}

fn party_votes(page: &Page, layout: &PageLayout, location: &str) -> Result<Option<PartyVotes>> {
    let names = page.find_all(layout.cell_tag, layout.party_name_class)?;
    if names.is_empty() {
        tracing::warn!(location, "no political parties found");
        return Ok(None);
    }

    let counts = page.find_all_with_headers(layout.cell_tag, layout.number_class, layout.vote_headers)?;
    if counts.len() != names.len() {
        tracing::warn!(
            location,
            parties = names.len(),
            vote_cells = counts.len(),
            "party names and vote cells differ in number"
        );
    }

    let mut votes = PartyVotes::new();
    for (name, cell) in names.iter().zip(&counts) {
        let party = name.text().trim().to_string();
        match parse_count(&cell.text()) {
            Ok(count) => votes.insert(party, count),
            Err(e) => tracing::error!(
                location,
                party = %party,
                text = %cell.text(),
                error = %e,
                "failed to parse votes of party"
            ),
        }
    }
    Ok(Some(votes))
}

fn aggregate_count(page: &Page, layout: &PageLayout, header: &str, location: &str) -> Result<Option<u64>> {
    let Some(cell) = page.find_first_with_header(layout.cell_tag, layout.number_class, header)? else {
        tracing::warn!(header, location, "data cell not found for header");
        return Ok(None);
    };

    match parse_count(&cell.text()) {
        Ok(count) => Ok(Some(count)),
        Err(e) => {
            tracing::error!(header, location, text = %cell.text(), error = %e, "failed to parse data cell");
            Ok(None)
        }
    }
}

/// Removes non-breaking spaces (thousands separators on volby.cz).
pub fn clean_number_text(text: &str) -> String {
    text.replace('\u{a0}', "").trim().to_string()
}

pub fn parse_count(text: &str) -> Result<u64, ParseIntError> {
    clean_number_text(text).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str =
        "https://volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=2&xobec=529303&xvyber=2101";

    fn district_html(registered: Option<&str>, heading: bool) -> String {
        let heading = if heading { "<h3>Obec: Benešov</h3>" } else { "" };
        let registered = registered
            .map(|v| format!(r#"<td class="cislo" headers="sa2">{v}</td>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body>
              <h3>Kraj: Středočeský kraj</h3>
              <h3>Okres: Benešov</h3>
              {heading}
              <table id="ps311_t1">
                <tr>{registered}
                    <td class="cislo" headers="sa3">10&nbsp;020</td>
                    <td class="cislo" headers="sa6">9&nbsp;981</td></tr>
              </table>
              <table>
                <tr><td class="cislo" headers="t1sa1 t1sb1">1</td>
                    <td class="overflow_name" headers="t1sa1 t1sb2">Občanská demokratická strana</td>
                    <td class="cislo" headers="t1sa2 t1sb3">1&nbsp;052</td>
                    <td class="cislo" headers="t1sa2 t1sb4">10,54</td></tr>
                <tr><td class="cislo" headers="t1sa1 t1sb1">2</td>
                    <td class="overflow_name" headers="t1sa1 t1sb2">Řád národa - Vlastenecká unie</td>
                    <td class="cislo" headers="t1sa2 t1sb3">5</td>
                    <td class="cislo" headers="t1sa2 t1sb4">0,05</td></tr>
              </table>
              <table>
                <tr><td class="cislo" headers="t2sa1 t2sb1">3</td>
                    <td class="overflow_name" headers="t2sa1 t2sb2">ANO 2011</td>
                    <td class="cislo" headers="t2sa2 t2sb3">3&nbsp;194</td>
                    <td class="cislo" headers="t2sa2 t2sb4">32,00</td></tr>
              </table>
            </body></html>"#
        )
    }

    fn parsed(outcome: DistrictOutcome) -> DistrictRecord {
        match outcome {
            DistrictOutcome::Parsed(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn parses_full_district() {
        let page = Page::parse(&district_html(Some("13&nbsp;105"), true));
        let record = parsed(parse_district(&page, URL, &PageLayout::default()).unwrap());

        assert_eq!(record.code, "529303");
        assert_eq!(record.location, "Benešov");
        assert_eq!(record.count_registered, Some(13105));
        assert_eq!(record.count_envelopes, Some(10020));
        assert_eq!(record.count_valid, Some(9981));

        let votes: Vec<_> = record.party_votes.as_ref().unwrap().iter().collect();
        assert_eq!(
            votes,
            vec![
                ("Občanská demokratická strana", 1052),
                ("Řád národa - Vlastenecká unie", 5),
                ("ANO 2011", 3194),
            ]
        );
    }

    #[test]
    fn missing_registered_cell_leaves_field_null() {
        let page = Page::parse(&district_html(None, true));
        let record = parsed(parse_district(&page, URL, &PageLayout::default()).unwrap());

        assert_eq!(record.count_registered, None);
        assert_eq!(record.count_envelopes, Some(10020));
        assert_eq!(record.count_valid, Some(9981));
        assert_eq!(record.party_votes.unwrap().len(), 3);
    }

    #[test]
    fn unparseable_count_leaves_field_null() {
        let page = Page::parse(&district_html(Some("n/a"), true));
        let record = parsed(parse_district(&page, URL, &PageLayout::default()).unwrap());
        assert_eq!(record.count_registered, None);
        assert_eq!(record.count_valid, Some(9981));
    }

    #[test]
    fn missing_heading_skips_district() {
        let page = Page::parse(&district_html(Some("1"), false));
        match parse_district(&page, URL, &PageLayout::default()).unwrap() {
            DistrictOutcome::Skipped { reason, url } => {
                assert_eq!(reason, SkipReason::MissingLocation);
                assert_eq!(url, URL);
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn missing_code_skips_district() {
        let page = Page::parse(&district_html(Some("1"), true));
        let url = "https://volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=2";
        match parse_district(&page, url, &PageLayout::default()).unwrap() {
            DistrictOutcome::Skipped { reason, .. } => assert_eq!(reason, SkipReason::MissingCode),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn malformed_url_skips_district() {
        let page = Page::parse(&district_html(Some("1"), true));
        match parse_district(&page, "ps311?xobec=1", &PageLayout::default()).unwrap() {
            DistrictOutcome::Skipped { reason, .. } => assert_eq!(reason, SkipReason::MalformedUrl),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn page_without_parties_has_no_vote_map() {
        let html = r#"<h3>Obec: Prázdná</h3><table><tr><td class="cislo" headers="sa2">10</td></tr></table>"#;
        let record = parsed(parse_district(&Page::parse(html), URL, &PageLayout::default()).unwrap());
        assert_eq!(record.location, "Prázdná");
        assert_eq!(record.count_registered, Some(10));
        assert!(record.party_votes.is_none());
    }

    #[test]
    fn bad_vote_cell_drops_only_that_party() {
        let html = r#"<h3>Obec: X</h3><table>
            <tr><td class="overflow_name">A</td><td class="cislo" headers="t1sa2 t1sb3">-</td></tr>
            <tr><td class="overflow_name">B</td><td class="cislo" headers="t1sa2 t1sb3">7</td></tr>
            </table>"#;
        let record = parsed(parse_district(&Page::parse(html), URL, &PageLayout::default()).unwrap());
        let votes = record.party_votes.unwrap();
        assert_eq!(votes.get("A"), None);
        assert_eq!(votes.get("B"), Some(7));
    }

    #[test]
    fn code_comes_from_query_parameter() {
        assert_eq!(district_code(URL, "xobec").unwrap().as_deref(), Some("529303"));
        assert_eq!(district_code(URL, "xokrsek").unwrap(), None);
        assert_eq!(
            district_code("https://volby.cz/ps311?xobec=&xobec=7", "xobec").unwrap().as_deref(),
            Some("7")
        );
        assert!(district_code("not a url", "xobec").is_err());
    }

    #[test]
    fn nbsp_is_removed_before_parsing() {
        assert_eq!(parse_count("1\u{a0}234"), Ok(1234));
        assert_eq!(parse_count(" 12 "), Ok(12));
        assert!(parse_count("1,5").is_err());
        assert_eq!(clean_number_text("10\u{a0}020"), "10020");
    }
}
