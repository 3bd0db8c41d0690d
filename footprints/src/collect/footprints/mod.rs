pub mod dataset_index;
pub mod footprints_collect;
pub mod source;
pub mod tile_fetch;
