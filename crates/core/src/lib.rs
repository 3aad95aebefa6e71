use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

pub const PROJECT_NAME: &str = "election-scraper";
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of parties shown in the summary chart.
pub const TOP_PARTIES: usize = 10;

/// Votes per party in document order.
///
/// Inserting a party that is already present replaces its count but keeps
/// the position of the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartyVotes {
    entries: Vec<(String, u64)>,
}

impl PartyVotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, party: impl Into<String>, votes: u64) {
        let party = party.into();
        match self.entries.iter_mut().find(|(name, _)| *name == party) {
            Some(entry) => entry.1 = votes,
            None => self.entries.push((party, votes)),
        }
    }

    pub fn get(&self, party: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, votes)| *votes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, votes)| (name.as_str(), *votes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for PartyVotes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut votes = PartyVotes::new();
        for (party, count) in iter {
            votes.insert(party, count);
        }
        votes
    }
}

impl Serialize for PartyVotes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (party, votes) in &self.entries {
            map.serialize_entry(party, votes)?;
        }
        map.end()
    }
}

/// Results scraped from a single district page.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DistrictRecord {
    pub code: String,
    pub location: String,
    pub count_registered: Option<u64>,
    pub count_envelopes: Option<u64>,
    pub count_valid: Option<u64>,
    /// `None` when the page carries no party table at all.
    pub party_votes: Option<PartyVotes>,
}

impl DistrictRecord {
    pub fn new(code: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            location: location.into(),
            count_registered: None,
            count_envelopes: None,
            count_valid: None,
            party_votes: None,
        }
    }

    pub fn votes_for(&self, party: &str) -> Option<u64> {
        self.party_votes.as_ref().and_then(|votes| votes.get(party))
    }
}

/// District records keyed by code, kept in order of first insertion.
#[derive(Clone, Debug, Default)]
pub struct ResultSet {
    records: Vec<DistrictRecord>,
    positions: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any earlier record with the same code.
    /// Returns the replaced record.
    pub fn insert(&mut self, record: DistrictRecord) -> Option<DistrictRecord> {
        match self.positions.get(&record.code) {
            Some(&idx) => Some(std::mem::replace(&mut self.records[idx], record)),
            None => {
                self.positions.insert(record.code.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&DistrictRecord> {
        self.positions.get(code).map(|&idx| &self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistrictRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct party names across all records, in first-encounter order.
    pub fn party_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for votes in self.records.iter().filter_map(|r| r.party_votes.as_ref()) {
            for (party, _) in votes.iter() {
                if !columns.iter().any(|c| c == party) {
                    columns.push(party.to_string());
                }
            }
        }
        columns
    }

    pub fn party_totals(&self) -> PartyTotals {
        PartyTotals::from_results(self)
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.code, record)?;
        }
        map.end()
    }
}

/// Votes per party summed over every district of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartyTotals {
    totals: Vec<(String, u64)>,
}

impl PartyTotals {
    pub fn from_results(results: &ResultSet) -> Self {
        let mut totals: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for votes in results.iter().filter_map(|r| r.party_votes.as_ref()) {
            for (party, count) in votes.iter() {
                match index.get(party) {
                    Some(&idx) => totals[idx].1 = totals[idx].1.saturating_add(count),
                    None => {
                        index.insert(party, totals.len());
                        totals.push((party.to_string(), count));
                    }
                }
            }
        }

        Self { totals }
    }

    pub fn get(&self, party: &str) -> Option<u64> {
        self.totals
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, total)| *total)
    }

    /// The `k` largest totals. Ties keep encounter order.
    pub fn top(&self, k: usize) -> Vec<(String, u64)> {
        let mut ranked = self.totals.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

/// Appends `.ext` unless `name` already ends with it.
pub fn with_extension(name: &str, ext: &str) -> String {
    if name.ends_with(&format!(".{ext}")) {
        name.to_string()
    } else {
        format!("{name}.{ext}")
    }
}

/// `name` without its final extension. Leading dots do not count.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
