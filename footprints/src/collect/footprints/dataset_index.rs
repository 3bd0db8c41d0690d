use anyhow::{Context, Result};
use csv::ReaderBuilder;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;

use crate::collect::footprints::source::Source;
use crate::error::FootprintError;
use crate::geometric::quadkey::QuadKey;

/// One partition of the dataset: a tile, the region it belongs to and
/// where its features can be downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    /// 0-based row number in the index table
    pub position: usize,
    pub location: String,
    pub quad_key: QuadKey,
    pub url: String,
}

/// Row deserialized from the index CSV
/// (headers: Location,QuadKey,Url,Size,UploadDate; extra columns ignored)
#[derive(Debug, Deserialize)]
struct IndexCsvRecord {
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "QuadKey")]
    quad_key: u64,
    #[serde(rename = "Url")]
    url: String,
}

/// In-memory dataset index, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    rows: Vec<IndexRow>,
}

impl DatasetIndex {
    /// Download (or read) and parse the index.
    pub fn load(source: &Source, client: &Client) -> Result<Self> {
        tracing::info!(%source, "Loading dataset index");
        let reader = source
            .open(client)
            .with_context(|| format!("Failed to load dataset index from {}", source))?;
        let index = Self::from_reader(reader)
            .with_context(|| format!("Failed to parse dataset index from {}", source))?;
        tracing::info!(rows = index.len(), "Dataset index loaded");
        Ok(index)
    }

    /// Parse the index CSV with the `csv` crate, keeping row order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let mut rows = Vec::new();
        for (position, result) in rdr.deserialize().enumerate() {
            let record: IndexCsvRecord = result.context("Failed to deserialize CSV record")?;
            rows.push(IndexRow {
                position,
                location: record.location,
                quad_key: QuadKey(record.quad_key),
                url: record.url,
            });
        }

        Ok(DatasetIndex { rows })
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `Location` equals `location` exactly (case-sensitive).
    /// An unknown location yields an empty selection, not an error.
    pub fn rows_for_location(&self, location: &str) -> Vec<&IndexRow> {
        self.rows
            .iter()
            .filter(|row| row.location == location)
            .collect()
    }

    pub fn rows_for_quadkey(&self, quad_key: QuadKey) -> Vec<&IndexRow> {
        self.rows
            .iter()
            .filter(|row| row.quad_key == quad_key)
            .collect()
    }

    /// Rows of every requested quad key, grouped by key in key order.
    ///
    /// A key missing from the index aborts the selection; a key with several
    /// rows only logs a warning and every row is returned.
    pub fn rows_for_quadkeys(&self, quad_keys: &BTreeSet<QuadKey>) -> Result<Vec<&IndexRow>> {
        let mut selected = Vec::new();
        for &quad_key in quad_keys {
            let rows = self.rows_for_quadkey(quad_key);
            match rows.len() {
                0 => return Err(FootprintError::QuadKeyNotFound(quad_key).into()),
                1 => {}
                n => tracing::warn!(%quad_key, rows = n, "Multiple rows found for QuadKey"),
            }
            selected.extend(rows);
        }
        Ok(selected)
    }
}
