//! Conversion pipeline from a classic Refractor-engine map tree to a
//! modern scene file and packaged experience bundle for the curated
//! target level editor.

pub mod catalog;
pub mod constants;
pub mod emitter;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod model;
pub mod orientation;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod rebase;
pub mod report;
pub mod scene;
pub mod script;
pub mod snapper;
pub mod terrain;
pub mod validate;

pub use error::{ConvertError, Result};
pub use pipeline::{convert_map, ConversionOutput};
pub use report::RunReport;
