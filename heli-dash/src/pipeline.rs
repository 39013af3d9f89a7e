//! From a CSV file to everything the dashboard needs.
//!
//! ```text
//! load_reports ─┬─> summarise ───────────────────────────────> stats
//!               └─> locate ─┬─> aggregate ─> resolve_all ────> aggregates
//!                           └────────────────────────────────> records
//! ```
//!

use std::path::Path;

use chrono::NaiveDate;
use eyre::Result;
use tracing::info;

use crate::aggregate::aggregate;
use crate::boundary::{resolve_all, CellAggregate};
use crate::cell::locate;
use crate::charts::{heatmap, trajectory, DatePicker, Figure, Page, Route, StatsPanel};
use crate::config::{InitialDay, Settings};
use crate::record::{load_reports, Position, Reports};
use crate::stats::SummaryStats;

/// Render-ready data for one input file.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Bundle {
    pub stats: SummaryStats,
    pub aggregates: Vec<CellAggregate>,
    pub records: Vec<Position>,
}

/// Run the whole pipeline over `fname`.
///
#[tracing::instrument(skip(settings))]
pub fn run(fname: &Path, settings: &Settings) -> Result<Bundle> {
    let data = load_reports(fname)?;
    build(data, settings)
}

/// Same as `run()` but with already loaded reports.
///
pub fn build(data: Reports, settings: &Settings) -> Result<Bundle> {
    let stats = SummaryStats::summarise(&data);

    let records = locate(&data.reports, settings.resolution)?;
    let counts = aggregate(&records);
    let aggregates = resolve_all(&counts)?;

    info!(
        "{} samples from {} helicopters over {} days in {} cells",
        stats.sample_count,
        stats.helicopter_count,
        stats.active_day_count,
        aggregates.len()
    );
    Ok(Bundle {
        stats,
        aggregates,
        records,
    })
}

impl Bundle {
    /// Day to show first, `None` if there is nothing at all.
    ///
    pub fn initial_day(&self, initial: InitialDay) -> Option<NaiveDate> {
        DatePicker::new(&self.stats, initial).map(|p| p.value)
    }

    pub fn heatmap(&self, settings: &Settings) -> Figure {
        heatmap(&self.aggregates, &settings.view)
    }

    pub fn route(&self, day: NaiveDate, settings: &Settings) -> Route {
        Route {
            day,
            figure: trajectory(&self.records, day, &settings.view),
        }
    }

    /// Assemble the page with the routes of `days`, or those of the initial day if empty.
    ///
    #[tracing::instrument(skip(self, settings))]
    pub fn page(&self, settings: &Settings, days: &[NaiveDate]) -> Page {
        let picker = DatePicker::new(&self.stats, settings.initial_day);
        let days = match (days.is_empty(), picker) {
            (false, _) => days.to_vec(),
            (true, Some(p)) => vec![p.value],
            (true, None) => vec![],
        };

        Page {
            title: settings.title.clone(),
            stats: StatsPanel::from(&self.stats),
            heatmap: self.heatmap(settings),
            picker,
            routes: days.iter().map(|&d| self.route(d, settings)).collect(),
        }
    }
}
