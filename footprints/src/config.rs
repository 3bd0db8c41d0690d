use clap::Parser;
use std::path::PathBuf;

use crate::collect::global_variables::{INDEX_URL, TEMP_PATH};

/// Fetch global building footprints for a country or an area of interest
/// and merge them into a single GeoJSON file.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// GeoJSON file of the AOI (e.g. drawn on geojson.io). Not required if --country is given.
    #[arg(short, long, value_name = "FILE", env = "FOOTPRINTS_AOI")]
    pub aoi: Option<PathBuf>,

    /// Country (index `Location`) of the footprints required. Not required if --aoi is given.
    #[arg(short, long, env = "FOOTPRINTS_COUNTRY")]
    pub country: Option<String>,

    /// Dataset index CSV: URL, file:// URL or local path
    #[arg(long, value_name = "URL", env = "FOOTPRINTS_INDEX_URL", default_value = INDEX_URL)]
    pub index_url: String,

    /// Working directory for per-tile files, emptied at start
    #[arg(long, value_name = "DIR", env = "FOOTPRINTS_TMP_DIR", default_value = TEMP_PATH)]
    pub tmp_dir: PathBuf,

    /// Directory the merged GeoJSON files are written to
    #[arg(long, value_name = "DIR", env = "FOOTPRINTS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

impl Config {
    /// Empty strings count as absent, like an unset flag.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref().filter(|c| !c.is_empty())
    }

    pub fn aoi(&self) -> Option<&PathBuf> {
        self.aoi.as_ref().filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["footprints", "-c", "Abyei"]).unwrap();
        assert_eq!(config.country(), Some("Abyei"));
        assert!(config.aoi().is_none());
        assert_eq!(config.index_url, INDEX_URL);
        assert_eq!(config.tmp_dir, PathBuf::from("./tmp"));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_both_selections() {
        let config = Config::try_parse_from([
            "footprints",
            "--aoi",
            "redmond.geojson",
            "--country",
            "UnitedStates",
            "--tmp-dir",
            "/var/tmp/fp",
        ])
        .unwrap();
        assert_eq!(config.aoi(), Some(&PathBuf::from("redmond.geojson")));
        assert_eq!(config.country(), Some("UnitedStates"));
        assert_eq!(config.tmp_dir, PathBuf::from("/var/tmp/fp"));
    }

    #[test]
    fn test_empty_country_is_absent() {
        let config = Config::try_parse_from(["footprints", "--country", ""]).unwrap();
        assert!(config.country().is_none());
    }
}
