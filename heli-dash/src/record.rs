//! Loading of the position reports.
//!
//! The input is a CSV file with a header line and at least the `timestamp`, `registration`,
//! `lat` and `lon` columns, in any order.  Other columns are ignored.
//!
//! ```text
//! timestamp,registration,lat,lon
//! 2024-03-01 10:15:00,EC-KJH,40.4168,-3.7038
//! 2024-03-01T10:16:00Z,EC-LTB,40.5,-3.6
//! ```
//!
//! Timestamps may come in several formats within the same file (see
//! `pegasus_common::parse_timestamp()`).  Rows with an empty (or `NaN`-like) value in any of
//! these columns are dropped, as are rows cut short before them.  Non-empty values that do
//! not parse are fatal.
//!

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, Trim};
use eyre::Result;
use h3o::CellIndex;
use pegasus_common::parse_timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::error::Status;

/// Columns we need.
const COLUMNS: [&str; 4] = ["timestamp", "registration", "lat", "lon"];

/// Values considered as missing, like the usual dataframe readers do.
const NULLS: [&str; 8] = ["", "nan", "NaN", "NA", "N/A", "null", "NULL", "None"];

/// One sighting of an helicopter, as loaded.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// When, in UTC
    pub timestamp: DateTime<Utc>,
    /// Aircraft registration
    pub registration: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

impl Report {
    /// Calendar day of the report (UTC).
    ///
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A report with its derived fields: H3 cell and day.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub timestamp: DateTime<Utc>,
    pub registration: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cell: CellIndex,
    pub day: NaiveDate,
}

impl Position {
    pub fn new(report: &Report, cell: CellIndex) -> Self {
        Position {
            timestamp: report.timestamp,
            registration: report.registration.clone(),
            latitude: report.latitude,
            longitude: report.longitude,
            cell,
            day: report.day(),
        }
    }
}

/// Everything the loader found in a file.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reports {
    /// Complete rows, in file order
    pub reports: Vec<Report>,
    /// Number of rows dropped because of a missing value
    pub dropped: usize,
}

/// Raw CSV line, everything optional.
///
#[derive(Debug, Deserialize)]
struct Line {
    timestamp: Option<String>,
    registration: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

#[inline]
fn not_null(v: Option<String>) -> Option<String> {
    v.filter(|s| !NULLS.contains(&s.trim()))
}

fn parse_number(row: u64, field: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        Status::BadNumber {
            row,
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

impl Line {
    /// Validate the line, `None` meaning one of the fields is missing.
    ///
    fn into_report(self, row: u64) -> Result<Option<Report>> {
        // Parse whatever is present first so that garbage is reported even on incomplete rows.
        //
        let timestamp = match not_null(self.timestamp) {
            Some(ts) => Some(parse_timestamp(&ts).map_err(|_| Status::BadTimestamp {
                row,
                value: ts.clone(),
            })?),
            None => None,
        };
        let latitude = match not_null(self.lat) {
            Some(v) => Some(parse_number(row, "lat", &v)?),
            None => None,
        };
        let longitude = match not_null(self.lon) {
            Some(v) => Some(parse_number(row, "lon", &v)?),
            None => None,
        };
        let registration = not_null(self.registration);

        match (timestamp, registration, latitude, longitude) {
            (Some(timestamp), Some(registration), Some(latitude), Some(longitude)) => {
                Ok(Some(Report {
                    timestamp,
                    registration,
                    latitude,
                    longitude,
                }))
            }
            _ => {
                trace!("row {row} incomplete, dropped");
                Ok(None)
            }
        }
    }
}

/// Read reports from any CSV source.
///
pub fn read_reports<R: Read>(input: R) -> Result<Reports> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    if let Some(col) = COLUMNS.iter().find(|&&c| !headers.iter().any(|h| h == c)) {
        return Err(Status::MissingColumn(col.to_string()).into());
    }

    let mut res = Reports::default();
    for rec in rdr.records() {
        let rec = rec?;
        let row = rec.position().map(|p| p.line()).unwrap_or_default();
        let line: Line = rec.deserialize(Some(&headers))?;
        match line.into_report(row)? {
            Some(r) => res.reports.push(r),
            None => res.dropped += 1,
        }
    }
    debug!("{} reports, {} dropped", res.reports.len(), res.dropped);
    Ok(res)
}

/// Load the reports from a CSV file.
///
#[tracing::instrument]
pub fn load_reports(fname: &Path) -> Result<Reports> {
    trace!("opening {fname:?}");
    let fh = File::open(fname).map_err(|e| {
        error!("{fname:?}: {e}");
        Status::MissingFile(fname.to_string_lossy().to_string())
    })?;
    read_reports(fh)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const MIXED: &str = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,40.4168,-3.7038
2024-03-01T10:20:00Z,EC-KJH,40.4200,-3.7000
2024-03-01T10:25:00,EC-LTB,40.5000,-3.6000
1709375400,EC-LTB,40.6000,-3.5000
"##;

    #[test_pretty_log::test]
    fn test_read_reports_mixed_formats() -> Result<()> {
        let r = read_reports(MIXED.as_bytes())?;

        assert_eq!(4, r.reports.len());
        assert_eq!(0, r.dropped);
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 0).unwrap(),
            r.reports[1].timestamp
        );
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 3, 2, 10, 30, 0).unwrap(),
            r.reports[3].timestamp
        );
        assert_eq!("EC-LTB", r.reports[2].registration);
        assert_eq!(-3.6, r.reports[2].longitude);
        Ok(())
    }

    #[test_pretty_log::test]
    fn test_read_reports_drop_nulls() -> Result<()> {
        let data = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,40.4168,-3.7038
2024-03-01 10:16:00,EC-KJH,,-3.7038
2024-03-01 10:17:00,EC-KJH,40.4168,-3.7038
2024-03-01 10:18:00,EC-KJH,40.4168,-3.7038
2024-03-01 10:19:00,EC-KJH,40.4168,-3.7038
"##;
        let r = read_reports(data.as_bytes())?;
        assert_eq!(4, r.reports.len());
        assert_eq!(1, r.dropped);
        Ok(())
    }

    #[test]
    fn test_read_reports_nan_like() -> Result<()> {
        let data = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,NaN,-3.7038
,EC-KJH,40.4,-3.7
2024-03-01 10:17:00,None,40.4168,-3.7038
2024-03-01 10:18:00,EC-KJH,40.4168,-3.7038
"##;
        let r = read_reports(data.as_bytes())?;
        assert_eq!(1, r.reports.len());
        assert_eq!(3, r.dropped);
        Ok(())
    }

    #[test]
    fn test_read_reports_short_row_is_dropped() -> Result<()> {
        let data = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,40.4
2024-03-01 10:16:00,EC-KJH,40.4168,-3.7038
"##;
        let r = read_reports(data.as_bytes())?;
        assert_eq!(1, r.reports.len());
        assert_eq!(1, r.dropped);
        Ok(())
    }

    #[test]
    fn test_read_reports_short_row_with_garbage() {
        let data = "timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,forty
";
        let err = read_reports(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Status>(),
            Some(Status::BadNumber { row: 2, .. })
        ));
    }

    #[test]
    fn test_read_reports_date_only() -> Result<()> {
        let data = "timestamp,registration,lat,lon
2024/03/01,EC-KJH,40.4168,-3.7038
";
        let r = read_reports(data.as_bytes())?;
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            r.reports[0].timestamp
        );
        Ok(())
    }

    #[test]
    fn test_read_reports_extra_columns() -> Result<()> {
        let data = r##"lon,callsign,registration,alt,timestamp,lat
-3.7038,PGS1,EC-KJH,1200,2024-03-01 10:15:00,40.4168
"##;
        let r = read_reports(data.as_bytes())?;
        assert_eq!(1, r.reports.len());
        assert_eq!(40.4168, r.reports[0].latitude);
        assert_eq!(-3.7038, r.reports[0].longitude);
        Ok(())
    }

    #[test]
    fn test_read_reports_bad_timestamp() {
        let data = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,40.4168,-3.7038
sometime tomorrow,EC-KJH,40.4168,-3.7038
"##;
        let err = read_reports(data.as_bytes()).unwrap_err();
        assert_eq!(
            Some(&Status::BadTimestamp {
                row: 3,
                value: "sometime tomorrow".to_string()
            }),
            err.downcast_ref::<Status>()
        );
    }

    #[test]
    fn test_read_reports_bad_number() {
        let data = r##"timestamp,registration,lat,lon
2024-03-01 10:15:00,EC-KJH,forty,-3.7038
"##;
        let err = read_reports(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Status>(),
            Some(Status::BadNumber { row: 2, .. })
        ));
    }

    #[test]
    fn test_read_reports_missing_column() {
        let data = "timestamp,registration,lat\n2024-03-01 10:15:00,EC-KJH,40.4\n";
        let err = read_reports(data.as_bytes()).unwrap_err();
        assert_eq!(
            Some(&Status::MissingColumn("lon".to_string())),
            err.downcast_ref::<Status>()
        );
    }

    #[test]
    fn test_load_reports_no_file() {
        let err = load_reports(Path::new("/nonexistent/aircraftinformation.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Status>(),
            Some(Status::MissingFile(_))
        ));
    }

    #[test]
    fn test_report_day() {
        let r = Report {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap(),
            registration: "EC-KJH".to_string(),
            latitude: 40.4,
            longitude: -3.7,
        };
        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), r.day());
    }

    #[test]
    fn test_report_day_is_utc() -> Result<()> {
        let data = "timestamp,registration,lat,lon
2024-03-02T01:00:00+02:00,EC-KJH,40.4,-3.7
";
        let r = read_reports(data.as_bytes())?;
        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), r.reports[0].day());
        Ok(())
    }
}
