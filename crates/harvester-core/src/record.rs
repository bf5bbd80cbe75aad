use std::path::PathBuf;

use chrono::NaiveDate;

/// One harvested file: where it lives and what its name says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRecord {
    /// Resolved path of the matched file
    pub absolute_path: PathBuf,
    /// First filename segment
    pub name: String,
    /// Second filename segment (opaque identifier)
    pub cine: String,
    /// Calendar date of the epoch timestamp in the third segment
    pub date: NaiveDate,
}

impl HarvestRecord {
    pub fn new(absolute_path: PathBuf, name: String, cine: String, date: NaiveDate) -> Self {
        Self {
            absolute_path,
            name,
            cine,
            date,
        }
    }
}
