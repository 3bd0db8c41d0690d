use anyhow::Result;
use std::path::PathBuf;

use crate::collect::footprints::footprints_collect::FootprintsCollect;
use crate::collect::global_variables::WGS84_EPSG;
use crate::commons::basic_functions::output_file_name;
use crate::config::Config;
use crate::geo_core::GeoCore;
use crate::geometric::aoi::Aoi;
use crate::geometric::building::BuildingCollection;

/// Run the selections requested by `config` and return the files written.
///
/// The country selection runs first, then the AOI one; each merges only its
/// own tiles into its own output. With neither, only the index is loaded.
pub fn run(config: &Config) -> Result<Vec<PathBuf>> {
    let collect =
        FootprintsCollect::with_index_location(&config.index_url, config.tmp_dir.clone())?;
    let geo_core = GeoCore::new(WGS84_EPSG, config.output_dir.clone());

    let mut outputs = Vec::new();

    if let Some(country) = config.country() {
        tracing::info!(country, "Selecting tiles by location");
        let collection = BuildingCollection::from_country(&collect, country, geo_core.clone())?;
        outputs.push(collection.to_geojson(&output_file_name(country))?);
    }

    if let Some(aoi_file) = config.aoi() {
        tracing::info!(aoi = %aoi_file.display(), "Selecting tiles by area of interest");
        let aoi = Aoi::from_geojson_file(aoi_file)?;
        let collection = BuildingCollection::from_aoi(&collect, &aoi, geo_core.clone())?;
        outputs.push(collection.to_geojson(&output_file_name(&aoi.name))?);
    }

    if outputs.is_empty() {
        tracing::warn!("Neither --aoi nor --country given, nothing to extract");
    }

    Ok(outputs)
}
