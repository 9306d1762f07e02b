//! File pattern resolution using glob

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to actual file paths
///
/// Paths are sorted and deduplicated; directories are skipped.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).map_err(|_| CliError::InvalidGlob(pattern.clone()))?;

        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;

            if path.is_file() {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(CliError::NoInputFiles(patterns.to_vec()).into());
    }

    files.sort();
    files.dedup();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_glob_sorted_and_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c.md"] {
            fs::write(temp_dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(temp_dir.path().join("dir.txt")).unwrap();

        let pattern = temp_dir.path().join("*.txt").display().to_string();
        let single = temp_dir.path().join("a.txt").display().to_string();
        let files = resolve_patterns(&[pattern, single]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = temp_dir.path().join("*.txt").display().to_string();

        let error = resolve_patterns(&[pattern]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::NoInputFiles(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let error = resolve_patterns(&["[".to_string()]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::InvalidGlob(_))
        ));
    }
}
