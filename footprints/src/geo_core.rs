use geo::{BoundingRect, Rect};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

use crate::collect::global_variables::WGS84_EPSG;

/// CRS and output location shared by everything that writes GeoJSON.
#[derive(Debug, Clone)]
pub struct GeoCore {
    pub epsg: i32,
    /// Directory output files are written to
    pub output_path: PathBuf,
}

impl Default for GeoCore {
    fn default() -> Self {
        GeoCore::new(WGS84_EPSG, PathBuf::from("."))
    }
}

impl GeoCore {
    pub fn new(epsg: i32, output_path: PathBuf) -> Self {
        GeoCore { epsg, output_path }
    }

    pub fn get_epsg(&self) -> i32 {
        self.epsg
    }

    pub fn get_output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn set_output_path(&mut self, output_path: PathBuf) {
        self.output_path = output_path;
    }

    /// Name GeoJSON readers expect in the legacy `crs` member.
    /// EPSG:4326 in lon/lat order is spelled CRS84.
    pub fn crs_name(&self) -> String {
        if self.epsg == WGS84_EPSG {
            "urn:ogc:def:crs:OGC:1.3:CRS84".to_string()
        } else {
            format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
        }
    }

    /// Foreign members tagging a FeatureCollection with its CRS and layer name.
    pub fn foreign_members(&self, name: Option<&str>) -> Map<String, Value> {
        let mut members = Map::new();
        if let Some(name) = name {
            members.insert("name".to_string(), Value::String(name.to_string()));
        }
        members.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": self.crs_name() } }),
        );
        members
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of any geometry, `None` when it has no coordinates.
    pub fn of<G: BoundingRect<f64>>(geometry: &G) -> Option<Self>
    where
        G::Output: Into<Option<Rect<f64>>>,
    {
        geometry.bounding_rect().into().map(Self::from)
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}
