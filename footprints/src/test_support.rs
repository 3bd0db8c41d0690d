//! Fixtures standing in for the remote dataset.

use std::path::{Path, PathBuf};

/// One footprint inside the Redmond test AOI, one crossing its east edge.
pub const TILE_NDJSON: &str = r#"{"type":"Feature","properties":{"height":-1.0,"confidence":-1.0},"geometry":{"type":"Polygon","coordinates":[[[-122.15,47.65],[-122.149,47.65],[-122.149,47.651],[-122.15,47.65]]]}}
{"type":"Feature","properties":{"height":-1.0,"confidence":-1.0},"geometry":{"type":"Polygon","coordinates":[[[-122.101,47.65],[-122.099,47.65],[-122.099,47.651],[-122.101,47.65]]]}}
"#;

/// Lay out a fake dataset in `dir`: one NDJSON tile per `(location, quad key)`
/// row plus the index CSV pointing at them. Returns the index path.
pub fn fake_dataset(dir: &Path, rows: &[(&str, u64)]) -> PathBuf {
    let mut csv = String::from("Location,QuadKey,Url,Size,UploadDate\n");
    for (position, (location, quad_key)) in rows.iter().enumerate() {
        let tile = dir.join(format!("{}-{}.csv", quad_key, position));
        std::fs::write(&tile, TILE_NDJSON).unwrap();
        csv.push_str(&format!(
            "{},{},{},1KB,2023-04-25\n",
            location,
            quad_key,
            tile.display()
        ));
    }
    let index = dir.join("dataset-links.csv");
    std::fs::write(&index, csv).unwrap();
    index
}

/// AOI file covering 0.1° x 0.1° around Redmond, WA (a single level-9 tile).
pub fn redmond_aoi_file(dir: &Path) -> PathBuf {
    let path = dir.join("redmond.geojson");
    std::fs::write(
        &path,
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
            "geometry":{"type":"Polygon","coordinates":[[
                [-122.2,47.6],[-122.1,47.6],[-122.1,47.7],[-122.2,47.7],[-122.2,47.6]
            ]]}}]}"#,
    )
    .unwrap();
    path
}
