use crate::manifest::ManifestFormat;
use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Finds manifest files for a documentation build.
///
/// The input may be a single manifest file or a directory. Directories are
/// walked recursively for `.yaml`, `.yml` and `.json` files, skipping hidden
/// directories and `target`.
///
/// # Example
///
/// ```no_run
/// use dto_swagger::scanner::ManifestScanner;
/// use std::path::PathBuf;
///
/// let scanner = ManifestScanner::new(PathBuf::from("./docs/api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct ManifestScanner {
    root_path: PathBuf,
}

/// Result of a scan
pub struct ScanResult {
    /// Manifest paths, sorted so that merging is deterministic
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for inaccessible entries
    pub warnings: Vec<String>,
}

impl ManifestScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collect manifest files under the root path.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist, or is a file without a
    /// manifest extension.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            bail!("Input path does not exist: {}", self.root_path.display());
        }

        if self.root_path.is_file() {
            if ManifestFormat::from_path(&self.root_path).is_none() {
                bail!(
                    "Input file is not a .yaml, .yml or .json manifest: {}",
                    self.root_path.display()
                );
            }
            return Ok(ScanResult {
                manifest_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && ManifestFormat::from_path(path).is_some() {
                        debug!("Found manifest: {}", path.display());
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
