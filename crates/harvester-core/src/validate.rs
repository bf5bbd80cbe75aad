use std::path::Path;

use crate::error::{HarvestError, Result};

/// Check that every path is an existing directory.
/// Paths are checked in order and the first failure is returned.
pub fn check_directories(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.is_dir() {
            return Err(HarvestError::NotADirectory(path.to_path_buf()));
        }
    }
    Ok(())
}
