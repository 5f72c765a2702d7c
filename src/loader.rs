//! Bulk load from delimited text
//!
//! Each non-blank line is one record with exactly four fields in the order
//! `id, name, bio, managerId`. The first bad row aborts the whole load;
//! rows before it stay inserted.

use crate::index::LinearHashIndex;
use crate::types::Record;
use crate::{IndexError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

const FIELDS_PER_ROW: usize = 4;

/// Parse one row; `line` is the 1-based line number used in errors
pub fn parse_row(row: &str, delimiter: char, line: usize) -> Result<Record> {
    let fields: Vec<&str> = row.split(delimiter).collect();
    if fields.len() != FIELDS_PER_ROW {
        return Err(IndexError::malformed(
            line,
            format!("expected {} fields, found {}", FIELDS_PER_ROW, fields.len()),
        ));
    }

    let id = parse_u32(fields[0], "id", line)?;
    let manager_id = parse_u32(fields[3], "managerId", line)?;
    Ok(Record::new(id, fields[1], fields[2], manager_id))
}

fn parse_u32(raw: &str, field: &str, line: usize) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(IndexError::malformed(line, format!("missing {}", field)));
    }
    raw.parse::<u32>()
        .map_err(|_| IndexError::malformed(line, format!("non-numeric {} '{}'", field, raw)))
}

/// Insert every row of `reader` in order. Returns rows loaded.
pub fn load_from_reader<R: BufRead>(index: &mut LinearHashIndex, reader: R) -> Result<u64> {
    let delimiter = index.config().delimiter;
    let mut loaded = 0u64;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let row = line.strip_suffix('\r').unwrap_or(&line);
        if row.trim().is_empty() {
            continue;
        }

        let record = parse_row(row, delimiter, n + 1)?;
        index.insert(&record)?;
        loaded += 1;
    }

    let stats = index.stats()?;
    info!(
        rows = loaded,
        buckets = stats.buckets,
        overflow_pages = stats.overflow_pages,
        fill_ratio = stats.fill_ratio,
        "bulk load complete"
    );
    Ok(loaded)
}

pub fn load_from_path<P: AsRef<Path>>(index: &mut LinearHashIndex, path: P) -> Result<u64> {
    let file = File::open(path)?;
    load_from_reader(index, BufReader::new(file))
}
