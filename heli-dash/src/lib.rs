//! Library part of the `heli-dash` utility.
//!
//! Helicopter position reports are read from a CSV file, each one is mapped onto an H3 cell,
//! reports are counted per cell and every visited cell is turned into a GeoJSON polygon.  Out
//! of this we get summary statistics, a choropleth heatmap and one trajectory per helicopter
//! for any given day, all as render-ready chart specifications.
//!
//! The whole chain is in `pipeline::run()`, the `cache` module keeps its results between
//! renders.
//!

/// Re-export
///
pub use aggregate::*;
pub use boundary::*;
pub use cache::*;
pub use cell::*;
pub use charts::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use record::*;
pub use stats::*;

mod aggregate;
mod boundary;
mod cache;
mod cell;
mod charts;
mod cli;
mod config;
mod error;
mod pipeline;
mod record;
mod stats;
