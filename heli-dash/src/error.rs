use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Status {
    #[error("Can not read {0}")]
    MissingFile(String),
    #[error("Missing column {0} in header")]
    MissingColumn(String),
    #[error("Row {row}: bad timestamp {value}")]
    BadTimestamp { row: u64, value: String },
    #[error("Row {row}: bad number {value} for {field}")]
    BadNumber {
        row: u64,
        field: String,
        value: String,
    },
    #[error("Invalid coordinates lat={lat} lon={lon}")]
    BadCoordinate { lat: f64, lon: f64 },
    #[error("Invalid H3 resolution {0}, must be 0-15")]
    BadResolution(u8),
    #[error("Invalid H3 cell {0}")]
    BadCell(String),
    #[error("No usable boundary for cell {0}")]
    BadBoundary(String),
    #[error("Invalid day {0}")]
    BadDay(String),
    #[error("Invalid opacity {0}, must be within 0.0-1.0")]
    BadOpacity(f64),
}
