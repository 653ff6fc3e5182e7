//! Rotating file writer plugged into `tracing_subscriber::fmt`

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use crate::logger::rotation::RotationManager;

/// File writer with size-based rotation.
///
/// A failed write switches the writer to stderr for the rest of the process
/// so that logging never takes the server down.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    rotation_manager: RotationManager,
    fallback_mode: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                rotation_manager: RotationManager::new(config.rotation.clone()),
                fallback_mode: false,
            })),
            path: config.path.clone(),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.state.lock().map(|s| s.fallback_mode).unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            state: self.state.clone(),
            path: self.path.clone(),
        }
    }
}

/// Per-event handle; flushes on drop.
pub struct RotatingWriterGuard {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

impl RotatingWriterGuard {
    fn lock(&self) -> io::Result<MutexGuard<'_, WriterState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("failed to acquire log writer lock"))
    }
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let path = self.path.clone();
        let mut state = self.lock()?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        if state.rotation_manager.should_rotate(state.current_size) {
            let rotated = state
                .file
                .flush()
                .and_then(|_| {
                    state
                        .rotation_manager
                        .rotate(&path)
                        .map_err(|e| io::Error::other(e.to_string()))
                })
                .and_then(|_| open_log_file(&path, false));

            match rotated {
                Ok(file) => {
                    state.file = file;
                    state.current_size = 0;
                }
                Err(e) => return fall_back(&mut state, buf, e),
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => fall_back(&mut state, buf, e),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock()?;
        if state.fallback_mode {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn fall_back(state: &mut WriterState, buf: &[u8], error: io::Error) -> io::Result<usize> {
    state.fallback_mode = true;
    eprintln!(
        "[logger] file write failed, falling back to stderr: {}",
        error
    );
    io::stderr().write(buf)
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::{LogFormat, RotationConfig};
    use crate::logger::rotation::rotated_files;
    use tempfile::tempdir;

    fn file_config(path: PathBuf, append: bool, max_size: u64) -> FileConfig {
        FileConfig {
            enabled: true,
            path,
            append,
            format: LogFormat::Full,
            rotation: RotationConfig {
                max_size,
                max_files: 2,
            },
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/logs/stockroom.log");

        let writer = RotatingFileWriter::new(&file_config(path.clone(), true, 1024)).unwrap();
        writer.make_writer().write_all(b"hello\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        assert!(!writer.is_in_fallback_mode());
    }

    #[test]
    fn test_append_mode_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stockroom.log");
        std::fs::write(&path, "before\n").unwrap();

        let writer = RotatingFileWriter::new(&file_config(path.clone(), true, 1024)).unwrap();
        writer.make_writer().write_all(b"after\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "before\nafter\n");
    }

    #[test]
    fn test_truncate_mode_discards_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stockroom.log");
        std::fs::write(&path, "before\n").unwrap();

        let writer = RotatingFileWriter::new(&file_config(path.clone(), false, 1024)).unwrap();
        writer.make_writer().write_all(b"after\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "after\n");
    }

    #[test]
    fn test_rotates_when_size_reached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stockroom.log");
        let writer = RotatingFileWriter::new(&file_config(path.clone(), true, 8)).unwrap();

        writer.make_writer().write_all(b"0123456789\n").unwrap();
        writer.make_writer().write_all(b"next\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "next\n");
        let rotated = rotated_files(&path).unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&rotated[0]).unwrap(),
            "0123456789\n"
        );
    }
}
