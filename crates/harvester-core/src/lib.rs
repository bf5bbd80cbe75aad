pub mod error;
pub mod filename;
pub mod record;
pub mod scan;
pub mod validate;
pub mod writer;

use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use error::{HarvestError, Result};
pub use record::HarvestRecord;

/// Default output CSV name
pub const DEFAULT_FILENAME: &str = "harvested_files.csv";

/// Default filename glob
pub const DEFAULT_PATTERN: &str = "*_train.nc";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestOptions {
    /// Directory to scan
    pub directory: PathBuf,
    /// Directory the CSV is written into
    pub output: PathBuf,
    /// CSV file name inside `output`
    pub filename: String,
    /// Glob matched against file names
    pub pattern: String,
    /// Walk subdirectories
    pub recursive: bool,
    /// Derive dates in UTC instead of local time
    pub utc: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./"),
            output: PathBuf::from("./"),
            filename: DEFAULT_FILENAME.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            recursive: true,
            utc: false,
        }
    }
}

impl HarvestOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output.join(&self.filename)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestResult {
    /// Files whose name matched the pattern
    pub candidates: u64,
    pub records_written: u64,
    /// Candidates dropped for a malformed timestamp
    pub files_skipped: u64,
    pub output_path: PathBuf,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Type alias for progress callback
pub type ProgressCallback = dyn Fn(&str, u64, u64, &str) + Send + Sync;

/// Throttled progress reporter, emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback,
    last_emit: Cell<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback) -> Self {
        let start = Instant::now();
        Self {
            inner,
            last_emit: Cell::new(start.checked_sub(Duration::from_secs(1)).unwrap_or(start)),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            if self.last_emit.get().elapsed() < Duration::from_millis(200) {
                return;
            }
            self.last_emit.set(Instant::now());
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Run validate, scan and write for one harvest.
pub fn harvest(options: &HarvestOptions, progress_callback: &ProgressCallback) -> Result<HarvestResult> {
    let tp = ThrottledProgress::new(progress_callback);

    // Stage 1: Validate
    tp.report("validate", 0, 1, "Checking directories");
    validate::check_directories(&[options.directory.as_path(), options.output.as_path()])?;

    // Stage 2: Scan
    let scan = scan::scan_directory(
        &options.directory,
        &options.pattern,
        options.recursive,
        options.utc,
        &tp,
    )?;
    debug!(
        "Scan done: {} candidate(s), {} record(s), {} skipped",
        scan.candidates,
        scan.records.len(),
        scan.skipped.len()
    );

    // Stage 3: Write
    let output_path = options.output_path();
    tp.report("write", 0, 1, "Writing CSV");
    writer::write_csv(&scan.records, &output_path)?;
    info!(
        "Wrote {} record(s) to {}",
        scan.records.len(),
        output_path.display()
    );

    let warnings = scan
        .skipped
        .iter()
        .map(|s| format!("{}: {}", s.path.display(), s.reason))
        .collect();

    Ok(HarvestResult {
        candidates: scan.candidates,
        records_written: scan.records.len() as u64,
        files_skipped: scan.skipped.len() as u64,
        output_path,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn options(directory: PathBuf, output: PathBuf) -> HarvestOptions {
        HarvestOptions {
            directory,
            output,
            utc: true,
            ..HarvestOptions::default()
        }
    }

    #[test]
    fn test_default_options() {
        let opts = HarvestOptions::default();
        assert_eq!(opts.output_path(), PathBuf::from("./harvested_files.csv"));
        assert_eq!(opts.pattern, "*_train.nc");
        assert!(opts.recursive);
        assert!(!opts.utc);

        let parsed: HarvestOptions = serde_json::from_str(r#"{"directory": "/data"}"#).unwrap();
        assert_eq!(parsed.directory, PathBuf::from("/data"));
        assert_eq!(parsed.filename, DEFAULT_FILENAME);
    }

    #[test]
    fn test_harvest_end_to_end() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::create_dir_all(input.path().join("sub")).unwrap();
        File::create(input.path().join("A_B_1700000000_train.nc")).unwrap();
        File::create(input.path().join("sub/C_D_0_train.nc")).unwrap();
        File::create(input.path().join("E_F_soon_train.nc")).unwrap();
        File::create(input.path().join("weird.name.nc")).unwrap();

        let opts = options(input.path().to_path_buf(), output.path().to_path_buf());
        let result = harvest(&opts, &|_, _, _, _| {}).unwrap();
        assert_eq!(result.candidates, 3);
        assert_eq!(result.records_written, 2);
        assert_eq!(result.files_skipped, 1);
        assert_eq!(result.warnings.len(), 1);

        let csv = fs::read_to_string(output.path().join(DEFAULT_FILENAME)).unwrap();
        let mut lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.remove(0), "absolute_path,NAME,CINE,DATE");
        lines.sort_by_key(|l| l.rsplit(',').next().map(str::to_string));
        assert!(lines[0].ends_with("C_D_0_train.nc,C,D,1970-01-01"));
        assert!(lines[1].ends_with("A_B_1700000000_train.nc,A,B,2023-11-14"));
    }

    #[test]
    fn test_missing_directory_writes_nothing() {
        let output = tempdir().unwrap();
        let opts = options(output.path().join("missing"), output.path().to_path_buf());
        let err = harvest(&opts, &|_, _, _, _| {}).unwrap_err();
        assert!(err.is_usage());
        assert!(!output.path().join(DEFAULT_FILENAME).exists());
    }

    #[test]
    fn test_progress_stages() {
        let input = tempdir().unwrap();
        File::create(input.path().join("A_B_0_train.nc")).unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);
        let cb = move |stage: &str, _: u64, _: u64, _: &str| {
            seen.lock().unwrap().push(stage.to_string());
        };
        let opts = options(input.path().to_path_buf(), input.path().to_path_buf());
        harvest(&opts, &cb).unwrap();
        assert_eq!(*stages.lock().unwrap(), vec!["validate", "scan", "write"]);
    }

    #[test]
    fn test_throttle_always_emits_final() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let cb = |_: &str, _: u64, _: u64, _: &str| {
            COUNT.fetch_add(1, Ordering::Relaxed);
        };
        let tp = ThrottledProgress::new(&cb);
        for i in 0..1000 {
            tp.report("scan", i, 1000, "");
        }
        // first emission plus the final one, the rest fall inside the window
        let count = COUNT.load(Ordering::Relaxed);
        assert!(count >= 2);
        assert!(count < 1000);
    }
}
