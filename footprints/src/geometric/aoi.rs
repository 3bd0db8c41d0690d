use anyhow::{Context, Result};
use geo::{Geometry, MultiPolygon, Polygon, Relate};
use geojson::GeoJson;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::FootprintError;
use crate::geo_core::BoundingBox;
use crate::geometric::quadkey::{quadkeys_in_bbox, QuadKey};

/// Area of interest read from a GeoJSON FeatureCollection.
///
/// Only the first feature counts. Its geometry is kept as a multipolygon so
/// single and multi-part areas are tested the same way.
#[derive(Debug, Clone)]
pub struct Aoi {
    /// File stem of the source, used to name the output
    pub name: String,
    pub shape: MultiPolygon<f64>,
    pub bbox: BoundingBox,
}

impl Aoi {
    pub fn new(name: impl Into<String>, shape: MultiPolygon<f64>) -> Result<Self> {
        let name = name.into();
        let bbox = BoundingBox::of(&shape)
            .with_context(|| format!("AOI {} has no coordinates", name))?;
        Ok(Aoi { name, shape, bbox })
    }

    pub fn from_polygon(name: impl Into<String>, polygon: Polygon<f64>) -> Result<Self> {
        Self::new(name, MultiPolygon::new(vec![polygon]))
    }

    /// Load the AOI from a GeoJSON file (e.g. one drawn on geojson.io).
    pub fn from_geojson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open AOI file: {:?}", path))?;
        let geojson = GeoJson::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse AOI GeoJSON: {:?}", path))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "aoi".to_string());

        Self::from_geojson(name, geojson, path)
    }

    fn from_geojson(name: String, geojson: GeoJson, path: &Path) -> Result<Self> {
        let geometry = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .next()
                .ok_or_else(|| FootprintError::EmptyAoi(PathBuf::from(path)))?
                .geometry,
            GeoJson::Feature(feature) => feature.geometry,
            GeoJson::Geometry(geometry) => Some(geometry),
        }
        .ok_or_else(|| FootprintError::EmptyAoi(PathBuf::from(path)))?;

        let geometry: Geometry<f64> = (&geometry)
            .try_into()
            .context("Failed to convert AOI geometry to geo::Geometry")?;

        let shape = match geometry {
            Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
            Geometry::MultiPolygon(multi) => multi,
            other => {
                return Err(FootprintError::UnsupportedAoiGeometry(geometry_kind(&other)).into())
            }
        };

        Self::new(name, shape)
    }

    /// Strict containment: the footprint must lie entirely inside the AOI,
    /// touching or crossing the boundary is not enough.
    pub fn contains(&self, footprint: &Polygon<f64>) -> bool {
        self.shape.relate(footprint).is_contains()
    }

    /// Level `zoom` quad keys of every tile covering the AOI bounding box.
    /// Tiles that only meet the box and not the AOI itself are included.
    pub fn quadkeys(&self, zoom: u8) -> BTreeSet<QuadKey> {
        quadkeys_in_bbox(&self.bbox, zoom)
    }
}

/// GeoJSON type name of a geometry, for error messages.
pub fn geometry_kind(geometry: &Geometry<f64>) -> String {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use std::io::Write;

    const REDMOND_AOI: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [-122.16484503187519, 47.69090474454916],
                        [-122.16484503187519, 47.6217555345674],
                        [-122.06529607517405, 47.6217555345674],
                        [-122.06529607517405, 47.69090474454916],
                        [-122.16484503187519, 47.69090474454916]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
            }
        ]
    }"#;

    fn unit_square() -> Aoi {
        Aoi::from_polygon(
            "square",
            polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ],
        )
        .unwrap()
    }

    fn write_aoi(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_from_geojson_file_uses_first_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_aoi(dir.path(), "redmond.geojson", REDMOND_AOI);

        let aoi = Aoi::from_geojson_file(&path).unwrap();
        assert_eq!(aoi.name, "redmond");
        assert_eq!(aoi.shape.0.len(), 1);
        assert!((aoi.bbox.min_x - -122.16484503187519).abs() < 1e-12);
        assert!((aoi.bbox.max_y - 47.69090474454916).abs() < 1e-12);
    }

    #[test]
    fn test_quadkeys_of_small_aoi() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_aoi(dir.path(), "redmond.geojson", REDMOND_AOI);

        let aoi = Aoi::from_geojson_file(&path).unwrap();
        let keys: Vec<_> = aoi.quadkeys(9).into_iter().collect();
        assert_eq!(keys, vec![QuadKey(21230030)]);
    }

    #[test]
    fn test_empty_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_aoi(
            dir.path(),
            "empty.geojson",
            r#"{"type": "FeatureCollection", "features": []}"#,
        );

        let err = Aoi::from_geojson_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FootprintError>(),
            Some(FootprintError::EmptyAoi(_))
        ));
    }

    #[test]
    fn test_point_aoi_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_aoi(
            dir.path(),
            "point.geojson",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}
            ]}"#,
        );

        let err = Aoi::from_geojson_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FootprintError>(),
            Some(FootprintError::UnsupportedAoiGeometry(kind)) if kind == "Point"
        ));
    }

    #[test]
    fn test_contains_inner_polygon() {
        let aoi = unit_square();
        let inner = polygon![
            (x: 0.2, y: 0.2),
            (x: 0.4, y: 0.2),
            (x: 0.4, y: 0.4),
            (x: 0.2, y: 0.4),
            (x: 0.2, y: 0.2),
        ];
        assert!(aoi.contains(&inner));
    }

    #[test]
    fn test_crossing_polygon_is_not_contained() {
        let aoi = unit_square();
        let crossing = polygon![
            (x: 0.8, y: 0.8),
            (x: 1.2, y: 0.8),
            (x: 1.2, y: 1.2),
            (x: 0.8, y: 1.2),
            (x: 0.8, y: 0.8),
        ];
        assert!(!aoi.contains(&crossing));
    }

    #[test]
    fn test_outside_polygon_is_not_contained() {
        let aoi = unit_square();
        let outside = polygon![
            (x: 2.0, y: 2.0),
            (x: 3.0, y: 2.0),
            (x: 3.0, y: 3.0),
            (x: 2.0, y: 2.0),
        ];
        assert!(!aoi.contains(&outside));
    }
}
