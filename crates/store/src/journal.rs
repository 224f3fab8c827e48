//! Applied-fill journal
//!
//! Written ahead of the in-memory order/position mutation, replayed on
//! restart to rebuild the position book. There is no cross-entity
//! transaction between an order update and its position update; this
//! log is the recovery source that makes a crash between the two
//! survivable, and the per-fill sequence number makes replay
//! idempotent.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hermes_core::{Fill, OrderId};
use log::{info, warn};
use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::record::{complete_lines, escape, parse_exchange, parse_side, split_escaped, unescape};

/// Append-only log of applied fills
pub struct FillJournal {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    /// Highest sequence number found at open
    last_seq: u64,
}

impl FillJournal {
    /// Open (creating if absent) the journal, scanning it once to find
    /// the sequence high-water mark and truncate any torn tail.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut last_seq = 0;

        if path.exists() {
            let mut content = String::new();
            File::open(&path)?.read_to_string(&mut content)?;
            let (lines, consumed) = complete_lines(&content);
            for (number, line) in lines.into_iter().enumerate() {
                let fill = decode_fill(line).map_err(|reason| StoreError::Corrupt {
                    line: number + 1,
                    reason,
                })?;
                last_seq = last_seq.max(fill.seq);
            }
            if consumed < content.len() {
                warn!("truncating torn record at end of fill journal");
                OpenOptions::new()
                    .write(true)
                    .open(&path)?
                    .set_len(consumed as u64)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(
            "fill journal opened at {} (last seq {last_seq})",
            path.display()
        );

        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            last_seq,
        })
    }

    /// Highest sequence number present when the journal was opened;
    /// the order manager continues numbering from here
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Append one fill and flush it to the OS before returning
    pub fn append(&self, fill: &Fill) -> Result<()> {
        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(StoreError::Closed)?;
        writer.write_all(encode_fill(fill).as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Read back every fully written fill, in append order
    pub fn replay(&self) -> Result<Vec<Fill>> {
        // Make sure buffered appends are visible to the read
        if let Some(writer) = self.writer.lock().as_mut() {
            writer.flush()?;
        }

        let mut content = String::new();
        File::open(&self.path)?.read_to_string(&mut content)?;
        let (lines, _) = complete_lines(&content);
        lines
            .into_iter()
            .enumerate()
            .map(|(number, line)| {
                decode_fill(line).map_err(|reason| StoreError::Corrupt {
                    line: number + 1,
                    reason,
                })
            })
            .collect()
    }

    /// Flush, sync and release the handle. Idempotent.
    pub fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.writer.lock().take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn encode_fill(fill: &Fill) -> String {
    format!(
        "F|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        fill.seq,
        fill.order_id,
        escape(fill.strategy_id.as_deref().unwrap_or("")),
        escape(&fill.symbol),
        fill.exchange.as_str(),
        fill.side.as_str(),
        fill.quantity,
        fill.price,
        fill.timestamp.to_rfc3339(),
    )
}

fn decode_fill(line: &str) -> std::result::Result<Fill, String> {
    let fields = split_escaped(line, '|');
    if fields.len() != 10 {
        return Err(format!("fill record has {} fields, expected 10", fields.len()));
    }
    if fields[0] != "F" {
        return Err(format!("unknown record tag {:?}", fields[0]));
    }

    let seq: u64 = fields[1]
        .parse()
        .map_err(|e| format!("bad seq {:?}: {e}", fields[1]))?;
    let order_id: OrderId = fields[2]
        .parse()
        .map_err(|e| format!("bad order id {:?}: {e}", fields[2]))?;
    let strategy = unescape(&fields[3])?;
    let symbol = unescape(&fields[4])?;
    let exchange = parse_exchange(&fields[5])?;
    let side = parse_side(&fields[6])?;
    let quantity = fields[7]
        .parse()
        .map_err(|e| format!("bad quantity {:?}: {e}", fields[7]))?;
    let price = fields[8]
        .parse()
        .map_err(|e| format!("bad price {:?}: {e}", fields[8]))?;
    let timestamp = DateTime::parse_from_rfc3339(&fields[9])
        .map_err(|e| format!("bad timestamp {:?}: {e}", fields[9]))?
        .with_timezone(&Utc);

    Ok(Fill {
        seq,
        order_id,
        strategy_id: (!strategy.is_empty()).then_some(strategy),
        symbol,
        exchange,
        side,
        quantity,
        price,
        timestamp,
    })
}
