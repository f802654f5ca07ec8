use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use scrape_core::{shard_file_name, ShardDocument};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("failed to serialize shard: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability probe.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
///
/// A crash mid-write leaves either the previous file or no file, never a
/// truncated one.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Writes shard documents as `batch<N>.json`, pretty printed with four-space
/// indentation.
#[derive(Debug, Clone)]
pub struct ShardWriter {
    writer: AtomicFileWriter,
}

impl ShardWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn path_for(&self, shard: usize) -> PathBuf {
        self.writer.dir().join(shard_file_name(shard))
    }

    pub fn write(&self, document: &ShardDocument) -> Result<PathBuf, PersistError> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;
        buffer.push(b'\n');
        self.writer.write(&shard_file_name(document.batch), &buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrape_core::{FetchJob, FetchResult};

    #[test]
    fn shard_files_use_four_space_indent() {
        let temp = tempfile::TempDir::new().unwrap();
        let writer = ShardWriter::new(temp.path().to_path_buf());
        let job = FetchJob::new("9", "https://example.com/");
        let document = ShardDocument::new(2, vec![FetchResult::unavailable(&job)]);

        let path = writer.write(&document).unwrap();
        assert_eq!(path, writer.path_for(2));
        assert_eq!(path.file_name().unwrap(), "batch2.json");

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"9\": {\n        \"batch\": 2,"));
    }
}
