use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use crate::geo_core::BoundingBox;

/// Web mercator latitude limit.
const MAX_LAT: f64 = 85.051129;
/// Nudge applied to the east/south edges so a bbox ending exactly on a tile
/// boundary does not pull in the neighbouring tile.
const LL_EPSILON: f64 = 1e-11;
const EPSILON: f64 = 1e-14;

/// Slippy map tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// Quad key of a tile as stored in the dataset index.
///
/// The index keeps the base-4 digit string as a decimal integer, so the
/// leading zeros of western-hemisphere keys are lost: `"021230030"` is
/// `21230030`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuadKey(pub u64);

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Tile {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Tile { x, y, z }
    }

    /// Tile containing a lon/lat position.
    /// Positions on or beyond the world edges fall into the edge tiles.
    pub fn containing(lon: f64, lat: f64, zoom: u8) -> Self {
        let x = lon / 360.0 + 0.5;
        let sin_lat = lat.to_radians().sin();
        let y = 0.5 - 0.25 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / PI;

        Tile::new(axis_index(x, zoom), axis_index(y, zoom), zoom)
    }

    /// Base-4 quad key digits, one per zoom level.
    pub fn quadkey_digits(&self) -> String {
        let mut digits = String::with_capacity(self.z as usize);
        for level in (1..=self.z).rev() {
            let mask = 1u32 << (level - 1);
            let mut digit = b'0';
            if self.x & mask != 0 {
                digit += 1;
            }
            if self.y & mask != 0 {
                digit += 2;
            }
            digits.push(digit as char);
        }
        digits
    }

    pub fn quadkey(&self) -> QuadKey {
        let value = self
            .quadkey_digits()
            .bytes()
            .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'));
        QuadKey(value)
    }
}

fn axis_index(fraction: f64, zoom: u8) -> u32 {
    let n = 1u32 << zoom;
    if fraction <= 0.0 {
        0
    } else if fraction >= 1.0 {
        n - 1
    } else {
        ((fraction + EPSILON) * n as f64).floor() as u32
    }
}

/// All tiles at `zoom` covering the bounding box, row by row from the
/// north-west corner.
pub fn tiles_in_bbox(bbox: &BoundingBox, zoom: u8) -> Vec<Tile> {
    let west = bbox.min_x.max(-180.0);
    let south = bbox.min_y.max(-MAX_LAT);
    let east = bbox.max_x.min(180.0);
    let north = bbox.max_y.min(MAX_LAT);

    let upper_left = Tile::containing(west, north, zoom);
    let lower_right = Tile::containing(east - LL_EPSILON, south + LL_EPSILON, zoom);

    let mut tiles = Vec::new();
    for x in upper_left.x..=lower_right.x {
        for y in upper_left.y..=lower_right.y {
            tiles.push(Tile::new(x, y, zoom));
        }
    }
    tiles
}

/// Distinct quad keys of the tiles covering the bounding box.
pub fn quadkeys_in_bbox(bbox: &BoundingBox, zoom: u8) -> BTreeSet<QuadKey> {
    tiles_in_bbox(bbox, zoom)
        .iter()
        .map(Tile::quadkey)
        .collect()
}
