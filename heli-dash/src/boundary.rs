//! Turn cells into polygons for the heatmap.
//!
//! Each visited cell becomes a GeoJSON `Feature` whose `id` is the cell index, which is what
//! the choropleth uses to join the visit counts back onto the geometry.  Coordinates follow
//! the GeoJSON convention: `[longitude, latitude]`, ring closed.
//!

use eyre::Result;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use h3o::CellIndex;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, trace};

use crate::aggregate::CellCount;
use crate::error::Status;

/// A visited cell, ready to be drawn.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellAggregate {
    /// H3 index as hex string
    pub cell_id: String,
    /// Number of reports in the cell
    pub visit_count: u64,
    /// Closed ring of `[lon, lat]`
    pub boundary: Vec<Vec<f64>>,
    /// GeoJSON version of the above
    pub feature: Feature,
}

/// Closed ring of the cell vertices as `[lon, lat]`.
///
fn ring(cell: CellIndex) -> Vec<Vec<f64>> {
    let mut coords: Vec<Vec<f64>> = cell
        .boundary()
        .iter()
        .map(|ll| vec![ll.lng(), ll.lat()])
        .collect();

    if let Some(first) = coords.first().cloned() {
        if coords.last() != Some(&first) {
            coords.push(first);
        }
    }
    coords
}

/// Build the GeoJSON feature for a cell.
///
fn to_feature(cell_id: &str, visit_count: u64, ring: &[Vec<f64>]) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("h3".to_string(), json!(cell_id));
    properties.insert("count".to_string(), json!(visit_count));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring.to_vec()]))),
        id: Some(Id::String(cell_id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Resolve a cell, given by its identifier, into its polygon and feature.
///
pub fn resolve(cell_id: &str, visit_count: u64) -> Result<CellAggregate> {
    let cell: CellIndex = cell_id
        .parse()
        .map_err(|_| Status::BadCell(cell_id.to_string()))?;

    let boundary = ring(cell);

    // A hexagon (or pentagon) has at least 3 distinct vertices plus the closing one.
    //
    if boundary.len() < 4 {
        return Err(Status::BadBoundary(cell_id.to_string()).into());
    }
    trace!("{cell_id}: {} vertices", boundary.len() - 1);

    let feature = to_feature(cell_id, visit_count, &boundary);
    Ok(CellAggregate {
        cell_id: cell_id.to_string(),
        visit_count,
        boundary,
        feature,
    })
}

/// Resolve every counted cell, the first failure aborts everything.
///
#[tracing::instrument(skip(counts))]
pub fn resolve_all(counts: &[CellCount]) -> Result<Vec<CellAggregate>> {
    let res = counts
        .iter()
        .map(|c| resolve(&c.cell.to_string(), c.visits))
        .collect::<Result<Vec<_>>>()?;
    debug!("{} cells resolved", res.len());
    Ok(res)
}

/// Gather all features for the choropleth.
///
pub fn feature_collection(aggregates: &[CellAggregate]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: aggregates.iter().map(|a| a.feature.clone()).collect(),
        foreign_members: None,
    }
}

/// Get the cell identifier back from a feature.
///
pub fn feature_cell_id(feature: &Feature) -> Option<&str> {
    match &feature.id {
        Some(Id::String(s)) => Some(s.as_str()),
        _ => None,
    }
}
