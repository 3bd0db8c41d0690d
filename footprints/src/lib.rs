pub mod collect;
pub mod commons;
pub mod config;
pub mod error;
pub mod extract;
pub mod geo_core;
pub mod geometric;

#[cfg(test)]
mod test_support;

pub use error::FootprintError;
