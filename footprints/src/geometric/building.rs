use anyhow::{Context, Result};
use geo::Polygon;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::collect::footprints::footprints_collect::FootprintsCollect;
#[cfg(feature = "indicatif")]
use crate::commons::progress::progress_bar;
use crate::error::FootprintError;
use crate::geo_core::GeoCore;
use crate::geometric::aoi::{geometry_kind, Aoi};

/// A building footprint as written to the combined output.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFootprint {
    /// Sequential id, replaces whatever id the tile carried
    pub id: u64,
    pub footprint: Polygon<f64>,
}

impl BuildingFootprint {
    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("id".to_string(), Value::from(self.id));

        Feature {
            bbox: None,
            geometry: Some(Geometry::from(&self.footprint)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Footprints merged from the intermediate tile files, numbered densely from 0
/// in file-then-feature order.
#[derive(Debug)]
pub struct BuildingCollection {
    buildings: Vec<BuildingFootprint>,
    pub geo_core: GeoCore,
}

impl BuildingCollection {
    pub fn new(geo_core: GeoCore) -> Self {
        BuildingCollection {
            buildings: Vec::new(),
            geo_core,
        }
    }

    /// Merge every tile file in order. With an AOI only footprints lying
    /// entirely inside it are kept.
    pub fn from_files(paths: &[PathBuf], aoi: Option<&Aoi>, geo_core: GeoCore) -> Result<Self> {
        let mut collection = Self::new(geo_core);
        for path in paths {
            let kept = collection.merge_file(path, aoi)?;
            tracing::debug!(path = %path.display(), kept, "Merged tile");
        }
        tracing::info!(
            files = paths.len(),
            buildings = collection.len(),
            "Merged tile files"
        );
        Ok(collection)
    }

    /// Every footprint of every tile of `location`, no geometric filter.
    pub fn from_country(
        collect: &FootprintsCollect,
        location: &str,
        geo_core: GeoCore,
    ) -> Result<Self> {
        let tmp_files = collect.download_country(location)?;
        Self::from_files(&tmp_files, None, geo_core)
    }

    /// Footprints fully inside the AOI, from the tiles covering its bounding box.
    pub fn from_aoi(collect: &FootprintsCollect, aoi: &Aoi, geo_core: GeoCore) -> Result<Self> {
        let tmp_files = collect.download_aoi(aoi)?;
        Self::from_files(&tmp_files, Some(aoi), geo_core)
    }

    /// Merge one tile file, returning how many footprints were kept.
    pub fn merge_file(&mut self, path: &Path, aoi: Option<&Aoi>) -> Result<usize> {
        let file = File::open(path).with_context(|| format!("Failed to open tile file: {:?}", path))?;
        let geojson = GeoJson::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse tile file: {:?}", path))?;

        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                anyhow::bail!("Tile file {:?} must be a Feature or FeatureCollection", path)
            }
        };

        #[cfg(feature = "indicatif")]
        let pb = progress_bar(features.len() as u64, path.display().to_string());

        let mut kept = 0;
        for (index, feature) in features.iter().enumerate() {
            #[cfg(feature = "indicatif")]
            pb.inc(1);

            let polygon = Self::feature_to_polygon(feature, path, index)?;
            if aoi.map_or(true, |aoi| aoi.contains(&polygon)) {
                self.add_footprint(polygon);
                kept += 1;
            }
        }

        #[cfg(feature = "indicatif")]
        pb.finish_and_clear();

        Ok(kept)
    }

    /// Convert a tile feature's geometry to a polygon.
    /// Output is Polygon-only, any other geometry type is a schema mismatch.
    fn feature_to_polygon(feature: &Feature, path: &Path, index: usize) -> Result<Polygon<f64>> {
        let geometry = feature.geometry.as_ref().ok_or_else(|| FootprintError::MissingGeometry {
            file: path.to_path_buf(),
            index,
        })?;

        let geo_geom: geo::Geometry<f64> = geometry.try_into().with_context(|| {
            format!("Failed to convert feature {} of {:?} to geo::Geometry", index, path)
        })?;

        match geo_geom {
            geo::Geometry::Polygon(polygon) => Ok(polygon),
            other => Err(FootprintError::UnsupportedGeometry {
                file: path.to_path_buf(),
                kind: geometry_kind(&other),
            }
            .into()),
        }
    }

    /// Append a footprint under the next sequential id.
    pub fn add_footprint(&mut self, footprint: Polygon<f64>) -> u64 {
        let id = self.buildings.len() as u64;
        self.buildings.push(BuildingFootprint { id, footprint });
        id
    }

    pub fn buildings(&self) -> &[BuildingFootprint] {
        &self.buildings
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn to_feature_collection(&self, name: Option<&str>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.buildings.iter().map(BuildingFootprint::to_feature).collect(),
            foreign_members: Some(self.geo_core.foreign_members(name)),
        }
    }

    /// Write all footprints in one go to `<output_path>/<file_name>`.
    pub fn to_geojson(&self, file_name: &str) -> Result<PathBuf> {
        let output_file = self.geo_core.get_output_path().join(file_name);
        let name = output_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string());

        let file = File::create(&output_file)
            .with_context(|| format!("Failed to create GeoJSON file: {:?}", output_file))?;
        serde_json::to_writer(BufWriter::new(file), &self.to_feature_collection(name.as_deref()))
            .with_context(|| format!("Failed to write GeoJSON file: {:?}", output_file))?;

        tracing::info!(
            path = %output_file.display(),
            buildings = self.len(),
            "Buildings saved"
        );
        Ok(output_file)
    }
}
