//! Chart specifications for the dashboard.
//!
//! We do not draw anything here, we describe the figures the way plotly expects them
//! (`data` traces + `layout`) and let the front-end render the JSON:
//!
//! - the heatmap is a `choroplethmapbox` trace over the cell polygons, colored by visit
//!   count on a `[0, mean]` scale,
//! - the routes of a given day are `scattermapbox` line traces, one per registration.
//!

use chrono::NaiveDate;
use geojson::FeatureCollection;
use serde::Serialize;
use tracing::debug;

use crate::boundary::{feature_collection, CellAggregate};
use crate::config::{Center, InitialDay, MapView};
use crate::record::Position;
use crate::stats::SummaryStats;

/// A complete figure.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Trace {
    #[serde(rename = "choroplethmapbox")]
    Choropleth(Choropleth),
    #[serde(rename = "scattermapbox")]
    Line(Line),
}

/// Heatmap trace
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Choropleth {
    pub geojson: FeatureCollection,
    /// Which feature member matches `locations`
    pub featureidkey: String,
    /// Cell ids
    pub locations: Vec<String>,
    /// Visit counts, same order as `locations`
    pub z: Vec<u64>,
    pub colorscale: String,
    pub zmin: f64,
    pub zmax: f64,
    pub marker: Marker,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub opacity: f64,
}

/// One aircraft route
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Line {
    pub name: String,
    pub mode: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub mapbox: Mapbox,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mapbox {
    pub style: String,
    pub center: Center,
    pub zoom: u8,
}

impl Layout {
    fn new(title: Option<String>, view: &MapView) -> Self {
        Layout {
            title,
            mapbox: Mapbox {
                style: view.style.clone(),
                center: view.center,
                zoom: view.zoom,
            },
        }
    }
}

/// Color range of the heatmap: from 0 to the *mean* of the visit counts, not the maximum,
/// so that busy cells saturate.
///
pub fn color_range(aggregates: &[CellAggregate]) -> (f64, f64) {
    if aggregates.is_empty() {
        return (0., 0.);
    }
    let sum: f64 = aggregates.iter().map(|a| a.visit_count as f64).sum();
    (0., sum / aggregates.len() as f64)
}

/// Build the heatmap figure.
///
#[tracing::instrument(skip(aggregates, view))]
pub fn heatmap(aggregates: &[CellAggregate], view: &MapView) -> Figure {
    let (zmin, zmax) = color_range(aggregates);
    debug!("{} cells, range {zmin}..{zmax}", aggregates.len());

    let trace = Choropleth {
        geojson: feature_collection(aggregates),
        featureidkey: "id".to_string(),
        locations: aggregates.iter().map(|a| a.cell_id.clone()).collect(),
        z: aggregates.iter().map(|a| a.visit_count).collect(),
        colorscale: view.color_scale.clone(),
        zmin,
        zmax,
        marker: Marker {
            opacity: view.opacity,
        },
    };
    Figure {
        data: vec![Trace::Choropleth(trace)],
        layout: Layout::new(None, view),
    }
}

/// Build the routes of one day, one line per registration in order of appearance.
///
/// A day without any position gives a figure without traces.
///
#[tracing::instrument(skip(positions, view))]
pub fn trajectory(positions: &[Position], day: NaiveDate, view: &MapView) -> Figure {
    let mut lines: Vec<Line> = vec![];

    positions.iter().filter(|p| p.day == day).for_each(|p| {
        let idx = match lines.iter().position(|l| l.name == p.registration) {
            Some(idx) => idx,
            None => {
                lines.push(Line {
                    name: p.registration.clone(),
                    mode: "lines".to_string(),
                    lat: vec![],
                    lon: vec![],
                });
                lines.len() - 1
            }
        };
        lines[idx].lat.push(p.latitude);
        lines[idx].lon.push(p.longitude);
    });
    debug!("{day}: {} routes", lines.len());

    Figure {
        data: lines.into_iter().map(Trace::Line).collect(),
        layout: Layout::new(Some(day.to_string()), view),
    }
}

/// Metrics shown on top of the page.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsPanel {
    pub samples: usize,
    pub registrations: Vec<String>,
    pub first_seen: String,
    pub last_update: String,
}

impl From<&SummaryStats> for StatsPanel {
    fn from(stats: &SummaryStats) -> Self {
        StatsPanel {
            samples: stats.sample_count,
            registrations: stats.registrations.clone(),
            first_seen: stats.first_seen(),
            last_update: stats.last_seen(),
        }
    }
}

/// Day selector, bounded by the first and last active days.
///
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DatePicker {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub value: NaiveDate,
}

impl DatePicker {
    /// `None` when there is no data at all.
    ///
    pub fn new(stats: &SummaryStats, initial: InitialDay) -> Option<Self> {
        let (min, max) = stats.day_range()?;
        let value = match initial {
            InitialDay::First => min,
            InitialDay::Last => max,
        };
        Some(DatePicker { min, max, value })
    }
}

/// Routes for one day
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub day: NaiveDate,
    pub figure: Figure,
}

/// The whole dashboard.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub stats: StatsPanel,
    pub heatmap: Figure,
    pub picker: Option<DatePicker>,
    pub routes: Vec<Route>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use eyre::Result;
    use serde_json::{json, Value};

    use super::*;
    use crate::boundary::resolve;
    use crate::cell::{locate, to_cell, DEF_RESOLUTION};
    use crate::config::Settings;
    use crate::record::{Report, Reports};

    fn report(reg: &str, day: u32, min: u32, lat: f64, lon: f64) -> Report {
        Report {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 10, min, 0).unwrap(),
            registration: reg.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    fn fixture() -> Vec<CellAggregate> {
        [
            ((40.4168, -3.7038), 1),
            ((41.3874, 2.1686), 2),
            ((39.4699, -0.3763), 6),
        ]
        .iter()
        .map(|&((lat, lon), n)| {
            let cell = to_cell(lat, lon, DEF_RESOLUTION).unwrap();
            resolve(&cell.to_string(), n).unwrap()
        })
        .collect()
    }

    #[test]
    fn test_color_range_is_mean() {
        // (1 + 2 + 6) / 3 = 3, max would be 6
        //
        assert_eq!((0., 3.), color_range(&fixture()));
        assert_eq!((0., 0.), color_range(&[]));
    }

    #[test_pretty_log::test]
    fn test_heatmap() -> Result<()> {
        let aggs = fixture();
        let view = Settings::default().view;
        let fig = heatmap(&aggs, &view);

        assert_eq!(1, fig.data.len());
        let Trace::Choropleth(ref trace) = fig.data[0] else {
            panic!("not a choropleth");
        };
        assert_eq!(3, trace.locations.len());
        assert_eq!(vec![1, 2, 6], trace.z);
        assert_eq!(3., trace.zmax);
        assert_eq!(0.7, trace.marker.opacity);
        assert_eq!(3, trace.geojson.features.len());

        let v = serde_json::to_value(&fig)?;
        assert_eq!(json!("choroplethmapbox"), v["data"][0]["type"]);
        assert_eq!(json!("id"), v["data"][0]["featureidkey"]);
        assert_eq!(json!("Viridis"), v["data"][0]["colorscale"]);
        assert_eq!(v["data"][0]["locations"][1], v["data"][0]["geojson"]["features"][1]["id"]);
        assert_eq!(json!("carto-positron"), v["layout"]["mapbox"]["style"]);
        assert_eq!(json!(7), v["layout"]["mapbox"]["zoom"]);
        assert_eq!(json!({"lat": 40.4168, "lon": -3.7038}), v["layout"]["mapbox"]["center"]);
        assert_eq!(Value::Null, v["layout"]["title"]);
        Ok(())
    }

    #[test]
    fn test_trajectory() -> Result<()> {
        let reports = vec![
            report("EC-LTB", 1, 0, 40.50, -3.60),
            report("EC-KJH", 1, 1, 40.41, -3.70),
            report("EC-LTB", 1, 2, 40.51, -3.61),
            report("EC-KJH", 2, 0, 40.42, -3.71),
        ];
        let pos = locate(&reports, DEF_RESOLUTION)?;
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fig = trajectory(&pos, day, &Settings::default().view);

        assert_eq!(2, fig.data.len());
        let names: Vec<&str> = fig
            .data
            .iter()
            .map(|t| match t {
                Trace::Line(l) => l.name.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(vec!["EC-LTB", "EC-KJH"], names);

        let Trace::Line(ref ltb) = fig.data[0] else {
            panic!("not a line");
        };
        assert_eq!(vec![40.50, 40.51], ltb.lat);
        assert_eq!(vec![-3.60, -3.61], ltb.lon);
        assert_eq!("lines", ltb.mode);
        assert_eq!(Some("2024-03-01".to_string()), fig.layout.title);
        Ok(())
    }

    #[test]
    fn test_trajectory_empty_day() -> Result<()> {
        let pos = locate(&[report("EC-KJH", 1, 0, 40.4, -3.7)], DEF_RESOLUTION)?;
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let fig = trajectory(&pos, day, &Settings::default().view);

        assert!(fig.data.is_empty());
        let v = serde_json::to_value(&fig)?;
        assert_eq!(json!([]), v["data"]);
        Ok(())
    }

    #[test]
    fn test_date_picker() {
        let data = Reports {
            reports: vec![
                report("EC-KJH", 3, 0, 40.4, -3.7),
                report("EC-KJH", 1, 0, 40.4, -3.7),
                report("EC-KJH", 9, 0, 40.4, -3.7),
            ],
            dropped: 0,
        };
        let stats = SummaryStats::summarise(&data);
        let first = DatePicker::new(&stats, InitialDay::First).unwrap();
        let last = DatePicker::new(&stats, InitialDay::Last).unwrap();

        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), first.min);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), first.max);
        assert_eq!(first.min, first.value);
        assert_eq!(last.max, last.value);

        assert_eq!(None, DatePicker::new(&SummaryStats::default(), InitialDay::First));
    }

    #[test]
    fn test_stats_panel() {
        let data = Reports {
            reports: vec![report("EC-KJH", 1, 5, 40.4, -3.7)],
            dropped: 2,
        };
        let panel = StatsPanel::from(&SummaryStats::summarise(&data));
        assert_eq!(1, panel.samples);
        assert_eq!(vec!["EC-KJH"], panel.registrations);
        assert_eq!("01/03/2024 10:05", panel.first_seen);
        assert_eq!(panel.first_seen, panel.last_update);
    }
}
