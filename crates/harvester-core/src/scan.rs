use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::filename;
use crate::record::HarvestRecord;
use crate::ThrottledProgress;

/// A candidate that matched the pattern but could not be parsed
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning one directory tree
pub struct ScanResult {
    /// Parsed records, in traversal order
    pub records: Vec<HarvestRecord>,
    /// Candidates with a malformed timestamp segment
    pub skipped: Vec<SkippedFile>,
    /// Number of files whose name matched the pattern
    pub candidates: u64,
}

/// Compile the filename glob (matched against the file name, not the path).
pub fn build_matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// Walk `root` and collect regular files whose name matches.
///
/// Symlinks are not followed. Errors below the root are logged and skipped;
/// an error on the root itself is returned.
pub fn find_candidates(root: &Path, matcher: &GlobMatcher, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if matcher.is_match(entry.file_name()) {
            candidates.push(entry.into_path());
        }
    }

    Ok(candidates)
}

/// Scan `root` for matching files and parse each name into a record.
pub fn scan_directory(
    root: &Path,
    pattern: &str,
    recursive: bool,
    utc: bool,
    progress: &ThrottledProgress,
) -> Result<ScanResult> {
    let matcher = build_matcher(pattern)?;
    let root = root.canonicalize()?;

    let candidates = find_candidates(&root, &matcher, recursive)?;
    let total = candidates.len() as u64;
    debug!("Found {} candidate(s) under {}", total, root.display());

    let mut records = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for (i, path) in candidates.into_iter().enumerate() {
        progress.report("scan", i as u64, total, "Parsing file names");

        match filename::fetch_record(&path, utc) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => debug!("Not a harvest name: {}", path.display()),
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(ScanResult {
        records,
        skipped,
        candidates: total,
    })
}
