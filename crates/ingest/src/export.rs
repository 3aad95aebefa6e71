use anyhow::{Context, Result};
use election_core::{with_extension, ResultSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lets spreadsheet tools pick up the UTF-8 encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const FIXED_COLUMNS: [&str; 5] = [
    "code",
    "location",
    "count_registered",
    "count_envelopes",
    "count_valid",
];

/// Writes `<results_dir>/<name>.csv`. An existing file is never overwritten.
pub fn export_csv(results: &ResultSet, results_dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(results_dir)
        .with_context(|| format!("failed to create directory {}", results_dir.display()))?;

    let path = results_dir.join(with_extension(name, "csv"));
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            anyhow::bail!("file {} already exists", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create {}", path.display()));
        }
    };

    file.write_all(UTF8_BOM)
        .with_context(|| format!("failed to write {}", path.display()))?;
    write_csv(results, file).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = results.len(), "CSV file successfully created");
    Ok(path)
}

/// Header row plus one row per district. Party columns come in the order
/// they were first seen; absent values are empty cells.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<()> {
    let parties = results.party_columns();
    let mut csv = csv::Writer::from_writer(writer);

    let header = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(parties.iter().map(String::as_str));
    csv.write_record(header)?;

    for record in results.iter() {
        let mut row = vec![
            record.code.clone(),
            record.location.clone(),
            cell(record.count_registered),
            cell(record.count_envelopes),
            cell(record.count_valid),
        ];
        row.extend(parties.iter().map(|party| cell(record.votes_for(party))));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

fn cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
