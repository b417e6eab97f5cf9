//! Parser for OPeNDAP (DODS) ASCII responses.
//!
//! A `.ascii` query for one variable returns the data rows followed by the
//! coordinate arrays:
//!
//! ```text
//! ugrd10m, [1][3][4]
//! [0][0], -8.60, -8.91, -8.48, -8.22
//! [0][1], -8.58, -8.98, -8.73, -8.39
//! [0][2], -8.51, -8.90, -8.70, -8.31
//!
//! time, [1]
//! 739589.25
//! lat, [3]
//! -10.0, -9.5, -9.0
//! lon, [4]
//! 79.0, 79.5, 80.0, 80.5
//! ```
//!
//! Rows run south to north, columns west to east in 0..360 longitude.

use crate::error::{ProviderError, ProviderResult};

/// One decoded 2-D slab.
#[derive(Debug, Clone, PartialEq)]
pub struct DodsGrid {
    /// `values[row][col]`, row-aligned with `lats`, column-aligned with `lons`.
    pub values: Vec<Vec<f64>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl DodsGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Decode a DODS ASCII body.
pub fn parse_dods_ascii(text: &str) -> ProviderResult<DodsGrid> {
    let mut values = Vec::new();
    let mut lats = Vec::new();
    let mut lons = Vec::new();

    let mut lines = text.lines().map(str::trim);
    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        if line.starts_with("lat,") {
            lats = parse_numbers(lines.next().unwrap_or_default())?;
        } else if line.starts_with("lon,") {
            lons = parse_numbers(lines.next().unwrap_or_default())?;
        } else if line.starts_with('[') {
            if let Some((index, rest)) = line.split_once(',') {
                if is_index_prefix(index) {
                    values.push(parse_numbers(rest)?);
                }
            }
        }
    }

    if values.is_empty() {
        return Err(ProviderError::Parse("no data rows in DODS response".to_string()));
    }
    if lats.len() != values.len() {
        return Err(ProviderError::Parse(format!(
            "DODS response has {} rows but {} latitudes",
            values.len(),
            lats.len()
        )));
    }
    if let Some(row) = values.iter().find(|row| row.len() != lons.len()) {
        return Err(ProviderError::Parse(format!(
            "DODS row has {} values but {} longitudes",
            row.len(),
            lons.len()
        )));
    }

    Ok(DodsGrid { values, lats, lons })
}

/// `[0][12]`-style index prefix.
fn is_index_prefix(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '[' || c == ']')
        && s.ends_with(']')
}

fn parse_numbers(line: &str) -> ProviderResult<Vec<f64>> {
    line.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| ProviderError::Parse(format!("bad DODS number '{}'", s)))
        })
        .collect()
}
