//! Count how many times each cell has been visited.
//!

use std::collections::HashMap;

use h3o::CellIndex;
use tracing::debug;

use crate::record::Position;

/// Number of reports falling into a given cell.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellCount {
    pub cell: CellIndex,
    pub visits: u64,
}

/// Group positions by cell.
///
/// Every cell seen in `positions` appears once.  The result is sorted by cell index so that
/// generated files are stable, callers must not rely on any other ordering.
///
#[tracing::instrument(skip(positions))]
pub fn aggregate(positions: &[Position]) -> Vec<CellCount> {
    let mut counts: HashMap<CellIndex, u64> = HashMap::new();
    positions
        .iter()
        .for_each(|p| *counts.entry(p.cell).or_default() += 1);

    let mut res: Vec<CellCount> = counts
        .into_iter()
        .map(|(cell, visits)| CellCount { cell, visits })
        .collect();
    res.sort_by_key(|c| u64::from(c.cell));

    debug!("{} positions in {} cells", positions.len(), res.len());
    res
}

/// Sum of all visits.
///
#[inline]
pub fn total_visits(counts: &[CellCount]) -> u64 {
    counts.iter().map(|c| c.visits).sum()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use eyre::Result;

    use super::*;
    use crate::cell::{locate, DEF_RESOLUTION};
    use crate::record::Report;

    fn report(reg: &str, lat: f64, lon: f64) -> Report {
        Report {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            registration: reg.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test_pretty_log::test]
    fn test_aggregate_two_cells() -> Result<()> {
        let reports = vec![
            report("EC-KJH", 40.4168, -3.7038),
            report("EC-LTB", 40.4168, -3.7038),
            report("EC-KJH", 41.3874, 2.1686),
        ];
        let pos = locate(&reports, DEF_RESOLUTION)?;
        let counts = aggregate(&pos);

        assert_eq!(2, counts.len());
        let mut visits: Vec<u64> = counts.iter().map(|c| c.visits).collect();
        visits.sort();
        assert_eq!(vec![1, 2], visits);

        let madrid = counts.iter().find(|c| c.cell == pos[0].cell).unwrap();
        assert_eq!(2, madrid.visits);
        Ok(())
    }

    #[test]
    fn test_aggregate_total_is_record_count() -> Result<()> {
        let reports: Vec<Report> = (0..50)
            .map(|i| report("EC-KJH", 40.0 + (i as f64) * 0.05, -3.7 + (i % 7) as f64 * 0.1))
            .collect();
        let pos = locate(&reports, DEF_RESOLUTION)?;
        let counts = aggregate(&pos);

        assert_eq!(reports.len() as u64, total_visits(&counts));
        assert!(counts.iter().all(|c| c.visits >= 1));

        // Each cell only once
        //
        let mut cells: Vec<CellIndex> = counts.iter().map(|c| c.cell).collect();
        cells.dedup();
        assert_eq!(counts.len(), cells.len());
        Ok(())
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
        assert_eq!(0, total_visits(&[]));
    }
}
