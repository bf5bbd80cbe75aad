use std::path::Path;

use chrono::{DateTime, Datelike, Local, NaiveDate, Offset, TimeDelta, TimeZone};

use crate::error::{HarvestError, Result};
use crate::record::HarvestRecord;

/// Separator between filename segments
pub const DELIMITER: char = '_';

/// `<NAME>_<CINE>_<UNIX_TIMESTAMP>_<TAG>`
pub const SEGMENT_COUNT: usize = 4;

/// Fields carried by a well-formed filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameFields {
    pub name: String,
    pub cine: String,
    pub date: NaiveDate,
}

/// Years that fit the four-digit `YYYY-MM-DD` output form
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Convert Unix epoch seconds to a calendar date.
/// Uses the local time zone unless `utc` is set; `None` if out of range.
pub fn epoch_to_date(epoch: i64, utc: bool) -> Option<NaiveDate> {
    let naive_utc = DateTime::from_timestamp(epoch, 0)?.naive_utc();
    let naive = if utc {
        naive_utc
    } else {
        // Checked: the local offset can push the edges of chrono's range over
        let offset = Local.offset_from_utc_datetime(&naive_utc).fix();
        naive_utc.checked_add_signed(TimeDelta::try_seconds(offset.local_minus_utc().into())?)?
    };

    let date = naive.date();
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

fn malformed(filename: &str, reason: String) -> HarvestError {
    HarvestError::MalformedFilename {
        filename: filename.to_string(),
        reason,
    }
}

/// Split a bare filename into its fields.
///
/// A name with the wrong number of segments is not a harvest candidate and
/// yields `Ok(None)`. A correctly shaped name whose timestamp segment does not
/// convert to a date is an error, so the caller can report it.
pub fn parse_filename(filename: &str, utc: bool) -> Result<Option<FilenameFields>> {
    let segments: Vec<&str> = filename.split(DELIMITER).collect();
    if segments.len() != SEGMENT_COUNT {
        return Ok(None);
    }

    let raw = segments[2];
    let epoch = raw.parse::<i64>().map_err(|e| {
        malformed(
            filename,
            format!("timestamp segment '{}' is not an integer ({})", raw, e),
        )
    })?;
    let date = epoch_to_date(epoch, utc)
        .ok_or_else(|| malformed(filename, format!("timestamp {} is out of range", epoch)))?;

    Ok(Some(FilenameFields {
        name: segments[0].to_string(),
        cine: segments[1].to_string(),
        date,
    }))
}

/// Build a record for the file at `path` from its final path component.
pub fn fetch_record(path: &Path, utc: bool) -> Result<Option<HarvestRecord>> {
    // Non UTF-8 names can't carry the convention
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };

    Ok(parse_filename(filename, utc)?.map(|fields| {
        HarvestRecord::new(path.to_path_buf(), fields.name, fields.cine, fields.date)
    }))
}
