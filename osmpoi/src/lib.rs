//! Thinning and labeling of OpenStreetMap points of interest.
//!
//! The crate reads the node lists an extractor produces for a category of
//! POIs, thins clustered nodes by great-circle distance, composes display
//! labels from whitelisted tags and writes the result back as an OSM XML
//! node list for the gpi converter.

mod filter;
mod geo;
mod label;
mod osmxml;

pub use crate::filter::*;
pub use crate::geo::*;
pub use crate::label::*;
pub use crate::osmxml::*;
