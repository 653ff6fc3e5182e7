//! Size-based file rotation

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Zoned;

use crate::logger::config::RotationConfig;
use crate::logger::error::LoggerError;

/// Renames the active log file once it grows past `max_size` and keeps
/// the newest `max_files` rotated files next to it.
pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_file_size: u64) -> bool {
        current_file_size >= self.config.max_size
    }

    /// Move `current_path` aside and prune old rotations. Returns the rotated path.
    pub fn rotate(&self, current_path: &Path) -> Result<Option<PathBuf>, LoggerError> {
        let rotated = if current_path.exists() {
            let rotated_path = self.generate_rotated_path(current_path);
            fs::rename(current_path, &rotated_path).map_err(|e| {
                LoggerError::rotation(format!(
                    "failed to rename {} to {}: {}",
                    current_path.display(),
                    rotated_path.display(),
                    e
                ))
            })?;
            Some(rotated_path)
        } else {
            None
        };

        self.cleanup_old_files(current_path)?;

        Ok(rotated)
    }

    /// `stockroom.log` becomes `stockroom.20240601_123000.042.log`.
    fn generate_rotated_path(&self, base_path: &Path) -> PathBuf {
        let now = Zoned::now();
        let timestamp = format!(
            "{}.{:03}",
            now.strftime("%Y%m%d_%H%M%S"),
            now.subsec_nanosecond() / 1_000_000
        );
        let (stem, ext) = stem_and_extension(base_path);

        let mut candidate = base_path.with_file_name(rotated_name(&stem, &timestamp, &ext));
        let mut counter = 1;
        while candidate.exists() {
            let suffixed = format!("{}-{}", timestamp, counter);
            candidate = base_path.with_file_name(rotated_name(&stem, &suffixed, &ext));
            counter += 1;
        }
        candidate
    }

    fn cleanup_old_files(&self, base_path: &Path) -> Result<(), LoggerError> {
        let mut rotated_files = rotated_files(base_path)?;

        // Timestamped names sort oldest first
        rotated_files.sort();

        let excess = rotated_files.len().saturating_sub(self.config.max_files);
        for oldest in rotated_files.into_iter().take(excess) {
            fs::remove_file(&oldest)?;
        }

        Ok(())
    }
}

fn stem_and_extension(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let ext = path
        .extension()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    (stem, ext)
}

fn rotated_name(stem: &str, timestamp: &str, ext: &str) -> String {
    if ext.is_empty() {
        format!("{}.{}", stem, timestamp)
    } else {
        format!("{}.{}.{}", stem, timestamp, ext)
    }
}

/// Rotated siblings of `base_path`, in directory order.
pub(crate) fn rotated_files(base_path: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match base_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let (stem, ext) = stem_and_extension(base_path);
    let prefix = format!("{}.", stem);
    let suffix = format!(".{}", ext);
    let base_name = base_path.file_name().unwrap_or_default();

    let files = fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            if path.file_name().unwrap_or_default() == base_name || !path.is_file() {
                return false;
            }
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            name.starts_with(&prefix) && (ext.is_empty() || name.ends_with(&suffix))
        })
        .collect();

    Ok(files)
}
