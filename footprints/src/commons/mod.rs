pub mod basic_functions;
#[cfg(feature = "indicatif")]
pub mod progress;
