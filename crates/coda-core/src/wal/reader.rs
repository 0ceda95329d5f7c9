use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::error::WalError;
use crate::wal::LogEntry;

/// Read every decodable record from a log file, in file order.
///
/// A missing file is an empty log (first startup). A record that fails to
/// decode is skipped with a warning rather than aborting the read: a partial
/// final line is expected after a crash mid-append, and replay must make
/// forward progress past any damaged record.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>, WalError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping corrupt WAL record"
                );
            }
        }
    }
    Ok(entries)
}
