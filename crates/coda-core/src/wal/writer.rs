use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::WalError;
use crate::wal::LogEntry;

/// Append-only writer for one queue's log file.
///
/// The writer lives inside the queue's monitor, which serializes appends
/// against each other and against compaction.
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl WalWriter {
    /// Open the log in append mode, creating parent directories as needed.
    /// Existing records are preserved.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one record and push it to stable storage before returning.
    ///
    /// Flush-and-sync per append: zero loss of acknowledged transitions on
    /// crash, at the cost of throughput. Batching is deliberately absent.
    pub fn append(&mut self, entry: &LogEntry) -> Result<(), WalError> {
        let line = serde_json::to_string(entry)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Atomically replace the log contents with exactly `survivors`, in order.
    ///
    /// Writes a sibling file and renames it over the log, so a crash during
    /// compaction leaves the previous file intact. The append handle is
    /// reopened afterwards; the old one points at the unlinked inode.
    pub fn compact(&mut self, survivors: &[LogEntry]) -> Result<(), WalError> {
        self.writer.flush()?;

        let tmp_path = self.path.with_extension("log.tmp");
        {
            let tmp = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            let mut tmp_writer = BufWriter::new(tmp);
            for entry in survivors {
                let line = serde_json::to_string(entry)?;
                tmp_writer.write_all(line.as_bytes())?;
                tmp_writer.write_all(b"\n")?;
            }
            tmp_writer.flush()?;
            tmp_writer.get_ref().sync_data()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }

    /// Flush and sync outstanding writes. Dropping the writer releases the
    /// file handle.
    pub fn close(&mut self) -> Result<(), WalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}

impl std::fmt::Debug for WalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalWriter").field("path", &self.path).finish()
    }
}
