//! Statistics about the loaded data
//!

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::record::Reports;

/// Format used to display timestamps
pub const DISPLAY_FMT: &str = "%d/%m/%Y %H:%M";

/// Snapshot of the data set, computed over complete rows only.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of valid samples
    pub sample_count: usize,
    /// Earliest report
    pub first_update: Option<DateTime<Utc>>,
    /// Latest report
    pub last_update: Option<DateTime<Utc>>,
    /// Number of distinct aircraft
    pub helicopter_count: usize,
    /// Registrations, in order of first appearance
    pub registrations: Vec<String>,
    /// Number of days with at least one report
    pub active_day_count: usize,
    /// These days, sorted
    pub active_days: Vec<NaiveDate>,
    /// Incomplete rows ignored by the loader
    pub dropped: usize,
}

impl SummaryStats {
    /// Gather all statistics in one pass.
    ///
    #[tracing::instrument(skip(data))]
    pub fn summarise(data: &Reports) -> Self {
        let reports = &data.reports;

        let mut seen = HashSet::new();
        let mut registrations = vec![];
        for r in reports {
            if seen.insert(r.registration.as_str()) {
                registrations.push(r.registration.clone());
            }
        }

        let active_days: Vec<NaiveDate> = reports
            .iter()
            .map(|r| r.day())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        SummaryStats {
            sample_count: reports.len(),
            first_update: reports.iter().map(|r| r.timestamp).min(),
            last_update: reports.iter().map(|r| r.timestamp).max(),
            helicopter_count: registrations.len(),
            registrations,
            active_day_count: active_days.len(),
            active_days,
            dropped: data.dropped,
        }
    }

    /// First report, formatted for display
    ///
    pub fn first_seen(&self) -> String {
        fmt_ts(self.first_update)
    }

    /// Last report, formatted for display
    ///
    pub fn last_seen(&self) -> String {
        fmt_ts(self.last_update)
    }

    /// Range of the date picker.
    ///
    pub fn day_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.active_days.first(), self.active_days.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        }
    }
}

#[inline]
fn fmt_ts(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(DISPLAY_FMT).to_string(),
        None => "-".to_string(),
    }
}

impl Display for SummaryStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        let rows = [
            ("Samples", self.sample_count.to_string()),
            ("Dropped rows", self.dropped.to_string()),
            ("First seen", self.first_seen()),
            ("Last update", self.last_seen()),
            ("Active days", self.active_day_count.to_string()),
            ("Helicopters", self.helicopter_count.to_string()),
        ];
        rows.into_iter().for_each(|(name, value)| {
            builder.push_record(vec![name.to_string(), value]);
        });
        self.registrations.iter().for_each(|reg| {
            builder.push_record(vec![String::new(), reg.clone()]);
        });

        let table = builder.build().with(Style::modern()).to_string();
        write!(f, "{}", table)
    }
}
