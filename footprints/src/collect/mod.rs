pub mod footprints;
pub mod global_variables;
