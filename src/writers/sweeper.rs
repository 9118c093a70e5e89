use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::utils::constants::CSV_EXTENSION;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub files_checked: usize,
    pub removed_empty: Vec<PathBuf>,
    pub removed_header_only: Vec<PathBuf>,
    /// Files that could not be inspected or removed and were left in place
    pub skipped: Vec<PathBuf>,
}

impl SweepReport {
    pub fn removed_count(&self) -> usize {
        self.removed_empty.len() + self.removed_header_only.len()
    }
}

/// Removes CSV outputs that carry no data rows.
pub struct EmptyOutputSweeper;

impl EmptyOutputSweeper {
    pub fn new() -> Self {
        Self
    }

    /// Walk `root` recursively, deleting zero-byte and header-only CSV files
    pub fn sweep(&self, root: &Path) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(CSV_EXTENSION)
            {
                continue;
            }
            report.files_checked += 1;

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Error reading metadata of {}: {}", path.display(), e);
                    report.skipped.push(path.to_path_buf());
                    continue;
                }
            };

            if size == 0 {
                if remove(path, &mut report) {
                    info!("Removed empty CSV: {}", path.display());
                    report.removed_empty.push(path.to_path_buf());
                }
            } else if has_one_row(path) && remove(path, &mut report) {
                info!("Removed CSV with only header: {}", path.display());
                report.removed_header_only.push(path.to_path_buf());
            }
        }

        Ok(report)
    }
}

impl Default for EmptyOutputSweeper {
    fn default() -> Self {
        Self::new()
    }
}

fn remove(path: &Path, report: &mut SweepReport) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Error removing {}: {}", path.display(), e);
            report.skipped.push(path.to_path_buf());
            false
        }
    }
}

/// True when the file holds exactly one row.
///
/// Files that cannot be opened or read are reported and treated as not
/// header-only so they are left alone.
pub fn has_one_row(path: &Path) -> bool {
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Error opening file {}: {}", path.display(), e);
            return false;
        }
    };

    let mut record = csv::ByteRecord::new();
    match reader.read_byte_record(&mut record) {
        Ok(true) => {}
        Ok(false) => return false,
        Err(e) => {
            warn!("Error reading file {}: {}", path.display(), e);
            return false;
        }
    }

    match reader.read_byte_record(&mut record) {
        Ok(more) => !more,
        Err(e) => {
            warn!("Error reading file {}: {}", path.display(), e);
            false
        }
    }
}
