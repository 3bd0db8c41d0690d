pub mod aoi;
pub mod building;
pub mod quadkey;
