mod basemap;

pub use basemap::{load_basemap, LineString};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Fallback map center when no towers are loaded (Cumberland County, TN area).
/// Stored as (lat, lon).
pub const DEFAULT_CENTER: (f64, f64) = (36.0, -84.5);

/// One validated, geocoded row from the tower registration table.
///
/// `latitude`/`longitude` are promoted to numeric form; every other column
/// stays a raw string, looked up by header name. A record only exists if
/// both coordinates parsed as finite numbers.
#[derive(Clone, Debug)]
pub struct TowerRecord {
    pub latitude: f64,
    pub longitude: f64,
    fields: HashMap<String, String>,
}

impl TowerRecord {
    /// Look up a raw column value by header name. Absent columns read as
    /// the empty string, never as an error.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Ordered set of valid tower records; iteration order is input row order.
#[derive(Clone, Debug, Default)]
pub struct TowerCollection {
    records: Vec<TowerRecord>,
}

impl TowerCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TowerRecord> {
        self.records.iter()
    }

    /// Centroid of the collection as (lat, lon): the arithmetic mean of
    /// all record coordinates, or `DEFAULT_CENTER` when empty.
    pub fn center(&self) -> (f64, f64) {
        if self.records.is_empty() {
            return DEFAULT_CENTER;
        }
        let n = self.records.len() as f64;
        let (lat_sum, lon_sum) = self
            .records
            .iter()
            .fold((0.0, 0.0), |(la, lo), r| (la + r.latitude, lo + r.longitude));
        (lat_sum / n, lon_sum / n)
    }
}

/// Read the tower CSV at `path` and parse it into a collection.
pub fn load_towers(path: &Path) -> Result<TowerCollection> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tower data from {}", path.display()))?;
    Ok(parse_towers(&raw))
}

/// Parse delimiter-separated tower data: first line is the header, fields
/// split on literal commas with surrounding whitespace trimmed and double
/// quotes stripped. Rows whose `Latitude`/`Longitude` do not parse as
/// finite numbers are dropped whole.
///
/// The comma split is deliberately naive: a quoted field containing an
/// embedded comma will be mis-split, matching the upstream data contract.
pub fn parse_towers(raw: &str) -> TowerCollection {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return TowerCollection::default();
    }

    let mut lines = trimmed.lines();
    let headers: Vec<String> = match lines.next() {
        Some(line) => split_fields(line),
        None => return TowerCollection::default(),
    };

    let records = lines
        .filter_map(|line| {
            let values = split_fields(line);

            // Zip headers to values by position; short rows read as empty,
            // extra values beyond the header count are ignored. On duplicate
            // header names the last occurrence wins.
            let mut fields = HashMap::with_capacity(headers.len());
            for (i, header) in headers.iter().enumerate() {
                let value = values.get(i).cloned().unwrap_or_default();
                fields.insert(header.clone(), value);
            }

            let latitude = parse_coord(fields.get("Latitude"))?;
            let longitude = parse_coord(fields.get("Longitude"))?;

            Some(TowerRecord {
                latitude,
                longitude,
                fields,
            })
        })
        .collect();

    TowerCollection { records }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().replace('"', ""))
        .collect()
}

/// Parse a coordinate field, rejecting absent, non-numeric, and
/// non-finite values.
fn parse_coord(value: Option<&String>) -> Option<f64> {
    let parsed: f64 = value?.parse().ok()?;
    parsed.is_finite().then_some(parsed)
}
