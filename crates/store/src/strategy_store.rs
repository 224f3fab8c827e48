//! Durable strategy store
//!
//! The append-only log is the source of truth; the in-memory index is
//! a rebuildable cache and never authoritative. Startup replays the
//! whole log in order - each PUT overwrites the index entry for its id
//! (last writer wins), each DELETE removes it - reconstructing the
//! exact visible state no matter how many times an id was rewritten or
//! deleted and re-created.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use hermes_core::StrategyDefinition;
use log::{info, warn};
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, StoreError};
use crate::record::LogRecord;

/// Crash-safe strategy definition store
pub struct StrategyStore {
    path: PathBuf,
    /// Single-writer append handle; `None` once closed
    writer: Mutex<Option<BufWriter<File>>>,
    /// id -> latest definition; concurrent reads, rebuilt on open
    index: RwLock<HashMap<String, StrategyDefinition>>,
}

impl StrategyStore {
    /// Open (creating if absent) the log at `path` and rebuild the
    /// index with a one-time sequential scan. No call is served before
    /// the scan completes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut index = HashMap::new();

        if path.exists() {
            let mut content = String::new();
            File::open(&path)?.read_to_string(&mut content)?;
            let consumed = replay(&content, &mut index)?;
            if consumed < content.len() {
                // Drop the torn tail so the next append starts a clean record
                warn!("truncating torn record at end of strategy log");
                OpenOptions::new()
                    .write(true)
                    .open(&path)?
                    .set_len(consumed as u64)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(
            "strategy store opened at {} with {} definitions",
            path.display(),
            index.len()
        );

        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            index: RwLock::new(index),
        })
    }

    /// Append a PUT record, then update the index. A failed append is
    /// never reflected in the index.
    pub fn save(&self, definition: &StrategyDefinition) -> Result<()> {
        self.append(&LogRecord::Put(definition.clone()))?;
        self.index
            .write()
            .insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    /// Append a DELETE tombstone, then drop the id from the index.
    /// Returns whether the id was present. The tombstone is appended
    /// either way: the log, not the index, is the source of truth.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.append(&LogRecord::Delete(id.to_string()))?;
        Ok(self.index.write().remove(id).is_some())
    }

    /// Index lookup; never scans the log
    pub fn find_by_id(&self, id: &str) -> Option<StrategyDefinition> {
        self.index.read().get(id).cloned()
    }

    /// All visible definitions; never scans the log
    pub fn find_all(&self) -> Vec<StrategyDefinition> {
        self.index.read().values().cloned().collect()
    }

    /// Flush and release the log handle. Idempotent: closing twice is a
    /// no-op, and every record fully written before close survives
    /// reopen.
    pub fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            info!("strategy store closed at {}", self.path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &LogRecord) -> Result<()> {
        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(StoreError::Closed)?;
        writer.write_all(record.encode().as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Replay the full log content into an index, returning the byte
/// length of the fully written records. A final line without a record
/// terminator is an interrupted append and is excluded; any other
/// undecodable record aborts the replay.
fn replay(content: &str, index: &mut HashMap<String, StrategyDefinition>) -> Result<usize> {
    let (lines, consumed) = crate::record::complete_lines(content);
    for (number, line) in lines.into_iter().enumerate() {
        let record = LogRecord::parse(line).map_err(|reason| StoreError::Corrupt {
            line: number + 1,
            reason,
        })?;
        match record {
            LogRecord::Put(definition) => {
                index.insert(definition.id.clone(), definition);
            }
            LogRecord::Delete(id) => {
                index.remove(&id);
            }
        }
    }
    Ok(consumed)
}
