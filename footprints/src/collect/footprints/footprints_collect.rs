use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};

use crate::collect::footprints::dataset_index::{DatasetIndex, IndexRow};
use crate::collect::footprints::source::Source;
use crate::collect::footprints::tile_fetch::{TileFetcher, TileNaming};
use crate::collect::global_variables::{INDEX_URL, TILE_ZOOM};
#[cfg(feature = "indicatif")]
use crate::commons::progress::progress_bar;
use crate::commons::basic_functions::recreate_dir;
use crate::geometric::aoi::Aoi;

/// Entry point to the building footprints dataset.
///
/// Creating one wipes and recreates the working directory, then loads the
/// index. Selections download their tiles into the working directory and
/// return the intermediate files in the order they must be merged.
pub struct FootprintsCollect {
    pub index: DatasetIndex,
    fetcher: TileFetcher,
}

impl FootprintsCollect {
    /// Collector over the published index, working in `tmp_dir`.
    pub fn new(tmp_dir: PathBuf) -> Result<Self> {
        Self::with_index_location(INDEX_URL, tmp_dir)
    }

    pub fn with_index_location(index_location: &str, tmp_dir: PathBuf) -> Result<Self> {
        recreate_dir(&tmp_dir)?;

        // Every fetch blocks until complete, no timeout
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("Failed to create HTTP client")?;

        let source = Source::parse(index_location)?;
        let index = DatasetIndex::load(&source, &client)?;

        Ok(FootprintsCollect {
            index,
            fetcher: TileFetcher::new(client, tmp_dir),
        })
    }

    pub fn tmp_dir(&self) -> &Path {
        self.fetcher.tmp_dir()
    }

    /// Download every tile of `location`. Files are always rewritten.
    pub fn download_country(&self, location: &str) -> Result<Vec<PathBuf>> {
        let rows = self.index.rows_for_location(location);
        if rows.is_empty() {
            tracing::warn!(location, "No tiles found for location");
        }

        let total = rows.len();
        let mut tmp_files = Vec::with_capacity(total);
        for (ind, row) in rows.into_iter().enumerate() {
            let path = self.fetcher.tile_path(row, TileNaming::QuadKey);
            tracing::info!(
                "Downloading {}/{} for {} to tmp file: {}",
                ind + 1,
                total,
                row.location,
                path.display()
            );
            tmp_files.push(self.fetcher.fetch(row, TileNaming::QuadKey)?);
        }

        Ok(tmp_files)
    }

    /// Download every tile whose extent meets the AOI bounding box.
    ///
    /// Fails on the first quad key the index does not know. Tiles already in
    /// the working directory are not downloaded again.
    pub fn download_aoi(&self, aoi: &Aoi) -> Result<Vec<PathBuf>> {
        let quad_keys = aoi.quadkeys(TILE_ZOOM);
        let keys: Vec<String> = quad_keys.iter().map(|k| k.to_string()).collect();
        tracing::info!(
            "The input area spans {} tiles: [{}]",
            quad_keys.len(),
            keys.join(", ")
        );

        let rows: Vec<&IndexRow> = self.index.rows_for_quadkeys(&quad_keys)?;

        #[cfg(feature = "indicatif")]
        let pb = progress_bar(rows.len() as u64, "Tiles");

        let mut tmp_files = Vec::with_capacity(rows.len());
        for row in rows {
            tmp_files.push(self.fetcher.fetch(row, TileNaming::QuadKeyAndRow)?);
            #[cfg(feature = "indicatif")]
            pb.inc(1);
        }

        #[cfg(feature = "indicatif")]
        pb.finish_with_message("Tiles downloaded");

        Ok(tmp_files)
    }
}
