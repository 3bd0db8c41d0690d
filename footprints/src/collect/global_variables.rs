use std::path::PathBuf;

/// Working directory for per-tile intermediate files, recreated at each run.
pub const TEMP_PATH: &str = "./tmp";

/// Published index of the global building footprints dataset.
pub const INDEX_URL: &str =
    "https://minedbuildings.blob.core.windows.net/global-buildings/dataset-links.csv";

/// Zoom level the dataset is partitioned at.
pub const TILE_ZOOM: u8 = 9;

/// Every tile and every output file is WGS84 lon/lat.
pub const WGS84_EPSG: i32 = 4326;

/// Suffix appended to the AOI stem or country name to build the output file name.
pub const OUTPUT_SUFFIX: &str = "_buildings.geojson";

pub fn get_temp_path() -> PathBuf {
    PathBuf::from(TEMP_PATH)
}
