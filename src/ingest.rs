use std::path::{Path, PathBuf};

use crate::error::{CovdiffError, Result};
use crate::model::CoverageMap;
use crate::summary;

/// Read and parse a single coverage summary file.
pub fn load(path: &Path) -> Result<CoverageMap> {
    let content = std::fs::read(path)?;
    summary::parse(&content)
}

/// Like [`load`], but a missing file is `Ok(None)` rather than an error.
pub fn load_optional(path: &Path) -> Result<Option<CoverageMap>> {
    match std::fs::read(path) {
        Ok(content) => summary::parse(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Expand a glob pattern and merge every matching summary into one map.
/// Matches are merged in sorted path order; later files win on duplicate
/// file paths.
pub fn load_glob(pattern: &str) -> Result<CoverageMap> {
    let paths = expand(pattern)?;
    if paths.is_empty() {
        return Err(CovdiffError::NoMatches(pattern.to_string()));
    }

    let mut merged = CoverageMap::new();
    for path in &paths {
        log::debug!("reading coverage summary {}", path.display());
        merged.merge(load(path)?);
    }
    log::info!(
        "Loaded {} file(s) from {} summary file(s)",
        merged.per_file.len(),
        paths.len()
    );
    Ok(merged)
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry.map_err(|e| CovdiffError::Io(e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
