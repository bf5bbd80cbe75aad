use std::borrow::Cow;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::record::HarvestRecord;

/// Column names, kept as-is for consumers of existing harvest files
pub const HEADER: [&str; 4] = ["absolute_path", "NAME", "CINE", "DATE"];

#[derive(Serialize)]
struct Row<'a> {
    absolute_path: Cow<'a, str>,
    name: &'a str,
    cine: &'a str,
    date: NaiveDate,
}

impl<'a> From<&'a HarvestRecord> for Row<'a> {
    fn from(r: &'a HarvestRecord) -> Self {
        Self {
            absolute_path: r.absolute_path.to_string_lossy(),
            name: &r.name,
            cine: &r.cine,
            date: r.date,
        }
    }
}

fn temp_path_for(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "harvest".to_string());
    output_path.with_file_name(format!(".{}.tmp", name))
}

fn write_rows(records: &[HarvestRecord], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(file));

    // Explicit header so an empty harvest still gets one
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(Row::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write all records to `output_path`, replacing any existing file.
///
/// Rows go to a temporary sibling first and are renamed into place once
/// complete.
pub fn write_csv(records: &[HarvestRecord], output_path: &Path) -> Result<()> {
    let temp_path = temp_path_for(output_path);

    if let Err(err) = write_rows(records, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, output_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}
