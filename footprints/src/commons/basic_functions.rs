use anyhow::{Context, Result};
use std::fs::{create_dir_all, remove_dir_all};
use std::path::Path;

use crate::collect::global_variables::OUTPUT_SUFFIX;

/// Delete `dir` with everything in it and create it again, empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        remove_dir_all(dir).with_context(|| format!("Failed to remove directory: {:?}", dir))?;
    }
    create_dir_all(dir).with_context(|| format!("Failed to create directory: {:?}", dir))
}

/// `<name>_buildings.geojson`
pub fn output_file_name(name: &str) -> String {
    format!("{}{}", name, OUTPUT_SUFFIX)
}
