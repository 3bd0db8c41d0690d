use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{BufRead, BufWriter};
use std::path::{Path, PathBuf};

use crate::collect::footprints::dataset_index::IndexRow;
use crate::collect::footprints::source::Source;
use crate::geo_core::GeoCore;

/// How an intermediate tile file is named and whether an existing one is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileNaming {
    /// `<quadkey>.geojson`, always rewritten
    QuadKey,
    /// `<quadkey>_<row>.geojson`, skipped when already present
    QuadKeyAndRow,
}

/// Downloads dataset tiles into per-tile GeoJSON files under a working directory.
pub struct TileFetcher {
    client: Client,
    tmp_dir: PathBuf,
    geo_core: GeoCore,
}

impl TileFetcher {
    pub fn new(client: Client, tmp_dir: PathBuf) -> Self {
        TileFetcher {
            client,
            tmp_dir,
            geo_core: GeoCore::default(),
        }
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn tile_path(&self, row: &IndexRow, naming: TileNaming) -> PathBuf {
        let file_name = match naming {
            TileNaming::QuadKey => format!("{}.geojson", row.quad_key),
            TileNaming::QuadKeyAndRow => format!("{}_{}.geojson", row.quad_key, row.position),
        };
        self.tmp_dir.join(file_name)
    }

    /// Fetch one tile and return the path of its intermediate file.
    ///
    /// With [`TileNaming::QuadKeyAndRow`] an existing file is assumed complete
    /// and nothing is downloaded.
    pub fn fetch(&self, row: &IndexRow, naming: TileNaming) -> Result<PathBuf> {
        let path = self.tile_path(row, naming);

        if naming == TileNaming::QuadKeyAndRow && path.exists() {
            tracing::debug!(path = %path.display(), "Tile already downloaded, skipping");
            return Ok(path);
        }

        let source = Source::parse(&row.url)?;
        let reader = source
            .open(&self.client)
            .with_context(|| format!("Failed to download tile {}", row.quad_key))?;
        let features = read_features(reader)
            .with_context(|| format!("Failed to read features of tile {} from {}", row.quad_key, source))?;

        tracing::debug!(
            quad_key = %row.quad_key,
            features = features.len(),
            path = %path.display(),
            "Writing tile"
        );
        self.write_tile(&path, features)?;

        Ok(path)
    }

    fn write_tile(&self, path: &Path, features: Vec<Feature>) -> Result<()> {
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string());
        let feature_collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(self.geo_core.foreign_members(name.as_deref())),
        };

        let file = File::create(path)
            .with_context(|| format!("Failed to create tile file: {:?}", path))?;
        serde_json::to_writer(BufWriter::new(file), &feature_collection)
            .with_context(|| format!("Failed to write tile file: {:?}", path))?;
        Ok(())
    }
}

/// Parse newline-delimited GeoJSON features, one per line.
///
/// Every geometry must convert to a `geo` geometry; a malformed line fails
/// the whole tile.
pub fn read_features<R: BufRead>(reader: R) -> Result<Vec<Feature>> {
    let mut features = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let feature: Feature = serde_json::from_str(line)
            .with_context(|| format!("Invalid GeoJSON feature on line {}", line_number + 1))?;

        if let Some(geometry) = &feature.geometry {
            geo::Geometry::<f64>::try_from(geometry)
                .with_context(|| format!("Invalid geometry on line {}", line_number + 1))?;
        }

        features.push(feature);
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::quadkey::QuadKey;
    use geojson::GeoJson;

    const TILE_NDJSON: &str = r#"{"type":"Feature","properties":{"height":-1.0,"confidence":-1.0},"geometry":{"type":"Polygon","coordinates":[[[0.1,0.1],[0.2,0.1],[0.2,0.2],[0.1,0.1]]]}}
{"type":"Feature","properties":{"height":4.2,"confidence":0.9},"geometry":{"type":"Polygon","coordinates":[[[0.3,0.3],[0.4,0.3],[0.4,0.4],[0.3,0.3]]]}}

"#;

    fn row(dir: &Path, position: usize) -> IndexRow {
        let url = dir.join("122222222.csv");
        std::fs::write(&url, TILE_NDJSON).unwrap();
        IndexRow {
            position,
            location: "Nowhere".to_string(),
            quad_key: QuadKey(122222222),
            url: url.to_string_lossy().to_string(),
        }
    }

    fn read_back(path: &Path) -> FeatureCollection {
        let content = std::fs::read_to_string(path).unwrap();
        match content.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            _ => panic!("expected a FeatureCollection"),
        }
    }

    #[test]
    fn test_read_features_skips_blank_lines() {
        let features = read_features(TILE_NDJSON.as_bytes()).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[1].property("height").and_then(|v| v.as_f64()),
            Some(4.2)
        );
    }

    #[test]
    fn test_read_features_rejects_malformed_line() {
        let input = "{\"type\":\"Feature\",\"properties\":{},\"geometry\":{\"type\":\"Polygon\",\"coordinates\":\"oops\"}}\n";
        assert!(read_features(input.as_bytes()).is_err());
        assert!(read_features("not json\n".as_bytes()).is_err());
    }

    #[test]
    fn test_tile_path_naming() {
        let src = tempfile::tempdir().unwrap();
        let fetcher = TileFetcher::new(Client::new(), PathBuf::from("./tmp"));
        let row = row(src.path(), 7);
        assert_eq!(
            fetcher.tile_path(&row, TileNaming::QuadKey),
            PathBuf::from("./tmp/122222222.geojson")
        );
        assert_eq!(
            fetcher.tile_path(&row, TileNaming::QuadKeyAndRow),
            PathBuf::from("./tmp/122222222_7.geojson")
        );
    }

    #[test]
    fn test_fetch_writes_feature_collection() {
        let src = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = TileFetcher::new(Client::new(), tmp.path().to_path_buf());

        let path = fetcher.fetch(&row(src.path(), 0), TileNaming::QuadKey).unwrap();
        assert_eq!(path, tmp.path().join("122222222.geojson"));

        let fc = read_back(&path);
        assert_eq!(fc.features.len(), 2);
        let crs = &fc.foreign_members.unwrap()["crs"];
        assert_eq!(crs["properties"]["name"], "urn:ogc:def:crs:OGC:1.3:CRS84");
    }

    #[test]
    fn test_fetch_skips_existing_row_file() {
        let src = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = TileFetcher::new(Client::new(), tmp.path().to_path_buf());
        let mut row = row(src.path(), 3);

        let existing = tmp.path().join("122222222_3.geojson");
        std::fs::write(&existing, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        // Point the row at a source that does not exist: any download attempt fails
        row.url = src.path().join("gone.csv").to_string_lossy().to_string();

        let path = fetcher.fetch(&row, TileNaming::QuadKeyAndRow).unwrap();
        assert_eq!(path, existing);
        assert!(read_back(&path).features.is_empty());
    }

    #[test]
    fn test_fetch_overwrites_quadkey_file() {
        let src = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = TileFetcher::new(Client::new(), tmp.path().to_path_buf());

        let existing = tmp.path().join("122222222.geojson");
        std::fs::write(&existing, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

        let path = fetcher.fetch(&row(src.path(), 0), TileNaming::QuadKey).unwrap();
        assert_eq!(read_back(&path).features.len(), 2);
    }
}
