//! Static catalog of conversion presets.
//!
//! A preset pins a target container, a codec per stream type and a few
//! encoder flags. The catalog is fixed at compile time and always returned
//! in the same order.

mod catalog;
mod types;

pub use catalog::{find_preset, list_presets};
pub use types::{Preset, PresetCategory};
