// Example: extracting the building footprints of a small area around Redmond, WA
use anyhow::Result;
use footprints::collect::footprints::footprints_collect::FootprintsCollect;
use footprints::collect::global_variables::get_temp_path;
use footprints::commons::basic_functions::output_file_name;
use footprints::geo_core::GeoCore;
use footprints::geometric::aoi::Aoi;
use footprints::geometric::building::BuildingCollection;
use geo::polygon;
use std::path::PathBuf;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let aoi = Aoi::from_polygon(
        "redmond",
        polygon![
            (x: -122.16484503187519, y: 47.69090474454916),
            (x: -122.16484503187519, y: 47.6217555345674),
            (x: -122.06529607517405, y: 47.6217555345674),
            (x: -122.06529607517405, y: 47.69090474454916),
            (x: -122.16484503187519, y: 47.69090474454916),
        ],
    )?;
    println!("AOI bounding box: {:?}", aoi.bbox);

    let collect = FootprintsCollect::new(get_temp_path())?;
    let geo_core = GeoCore::new(4326, PathBuf::from("./output"));
    std::fs::create_dir_all(geo_core.get_output_path())?;

    let collection = BuildingCollection::from_aoi(&collect, &aoi, geo_core)?;
    println!("Buildings inside the AOI: {}", collection.len());

    let path = collection.to_geojson(&output_file_name(&aoi.name))?;
    println!("Saved to {}", path.display());

    Ok(())
}
