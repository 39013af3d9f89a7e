//! Mapping of positions onto the H3 hexagonal grid.
//!
//! Lower resolutions mean larger cells, the dashboard uses resolution 6 (~36 km² cells) by
//! default.  Coordinates out of the valid range are rejected instead of being silently
//! dropped.
//!

use eyre::Result;
use h3o::{CellIndex, LatLng, Resolution};
use tracing::trace;

use crate::error::Status;
use crate::record::{Position, Report};

/// Default resolution
pub const DEF_RESOLUTION: Resolution = Resolution::Six;

/// Check and convert a resolution level.
///
pub fn resolution(level: u8) -> Result<Resolution> {
    Resolution::try_from(level).map_err(|_| Status::BadResolution(level).into())
}

/// Map one (lat, lon) pair, in degrees, to its cell.
///
pub fn to_cell(lat: f64, lon: f64, res: Resolution) -> Result<CellIndex> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Status::BadCoordinate { lat, lon }.into());
    }
    let ll = LatLng::new(lat, lon).map_err(|_| Status::BadCoordinate { lat, lon })?;
    Ok(ll.to_cell(res))
}

/// Derive cell and day for every report, keeping the input order.
///
#[tracing::instrument(skip(reports))]
pub fn locate(reports: &[Report], res: Resolution) -> Result<Vec<Position>> {
    trace!("locating {} reports", reports.len());
    reports
        .iter()
        .map(|r| Ok(Position::new(r, to_cell(r.latitude, r.longitude, res)?)))
        .collect()
}
