//! Framed record codec
//!
//! One record per newline-terminated line. Reserved characters:
//!
//! | char | role                      |
//! |------|---------------------------|
//! | `\n` | record terminator         |
//! | `\|` | field separator           |
//! | `,`  | symbol-list separator     |
//! | `;`  | parameter-entry separator |
//! | `=`  | parameter key/value       |
//! | `\\` | escape introducer         |
//!
//! Every reserved character occurring inside a value is written as a
//! backslash escape, so round-tripping any value is lossless.

use hermes_core::{Exchange, LifecycleState, ParamValue, Side, StrategyDefinition};

/// Characters that must be escaped inside a field value
const RESERVED: &[char] = &['\\', '|', ',', ';', '='];

/// Escape a value for embedding in a record
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if RESERVED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape`]. Fails on a dangling escape introducer.
pub fn unescape(value: &str) -> Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(escaped) => out.push(escaped),
            None => return Err("dangling escape at end of value".into()),
        }
    }
    Ok(out)
}

/// Split on an unescaped separator, leaving each segment still escaped
pub fn split_escaped(raw: &str, separator: char) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut escaping = false;
    for c in raw.chars() {
        if escaping {
            current.push(c);
            escaping = false;
        } else if c == '\\' {
            current.push(c);
            escaping = true;
        } else if c == separator {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}

/// A single record in the strategy log
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    /// Full definition, overwrites any earlier record for the same id
    Put(StrategyDefinition),
    /// Tombstone: suppresses earlier PUTs for the id during replay
    Delete(String),
}

impl LogRecord {
    /// Encode without the trailing record terminator
    pub fn encode(&self) -> String {
        match self {
            LogRecord::Put(def) => {
                let symbols = def
                    .symbols
                    .iter()
                    .map(|s| escape(s))
                    .collect::<Vec<_>>()
                    .join(",");
                let params = def
                    .params
                    .iter()
                    .map(|(key, value)| {
                        format!("{}={}", escape(key), escape(&encode_param(value)))
                    })
                    .collect::<Vec<_>>()
                    .join(";");
                format!(
                    "P|{}|{}|{}|{}|{}|{}|{}",
                    escape(&def.id),
                    escape(&def.name),
                    escape(&def.algorithm),
                    def.exchange.as_str(),
                    def.lifecycle.as_str(),
                    symbols,
                    params,
                )
            }
            LogRecord::Delete(id) => format!("D|{}", escape(id)),
        }
    }

    /// Decode one line. The error is a plain message; the caller knows
    /// the line number.
    pub fn parse(line: &str) -> Result<LogRecord, String> {
        let fields = split_escaped(line, '|');
        match fields.first().map(String::as_str) {
            Some("P") => {
                if fields.len() != 8 {
                    return Err(format!("PUT record has {} fields, expected 8", fields.len()));
                }
                let id = unescape(&fields[1])?;
                let name = unescape(&fields[2])?;
                let algorithm = unescape(&fields[3])?;
                let exchange = parse_exchange(&fields[4])?;
                let lifecycle = parse_lifecycle(&fields[5])?;

                let symbols = if fields[6].is_empty() {
                    Vec::new()
                } else {
                    split_escaped(&fields[6], ',')
                        .iter()
                        .map(|s| unescape(s))
                        .collect::<Result<Vec<_>, _>>()?
                };

                let params = if fields[7].is_empty() {
                    Vec::new()
                } else {
                    split_escaped(&fields[7], ';')
                        .iter()
                        .map(|entry| parse_param(entry))
                        .collect::<Result<Vec<_>, _>>()?
                };

                Ok(LogRecord::Put(StrategyDefinition {
                    id,
                    name,
                    algorithm,
                    symbols,
                    exchange,
                    params,
                    lifecycle,
                }))
            }
            Some("D") => {
                if fields.len() != 2 {
                    return Err(format!(
                        "DELETE record has {} fields, expected 2",
                        fields.len()
                    ));
                }
                Ok(LogRecord::Delete(unescape(&fields[1])?))
            }
            Some(tag) => Err(format!("unknown record tag {tag:?}")),
            None => Err("empty record".into()),
        }
    }
}

/// Typed parameter values carry a one-character marker so Int and Text
/// round-trip unambiguously
fn encode_param(value: &ParamValue) -> String {
    match value {
        ParamValue::Int(n) => format!("I{n}"),
        ParamValue::Text(s) => format!("T{s}"),
    }
}

fn parse_param(entry: &str) -> Result<(String, ParamValue), String> {
    let parts = split_escaped(entry, '=');
    if parts.len() != 2 {
        return Err(format!("parameter entry has {} parts, expected 2", parts.len()));
    }
    let key = unescape(&parts[0])?;
    let raw = unescape(&parts[1])?;
    let value = match raw.split_at_checked(1) {
        Some(("I", digits)) => ParamValue::Int(
            digits
                .parse()
                .map_err(|e| format!("bad integer parameter {digits:?}: {e}"))?,
        ),
        Some(("T", text)) => ParamValue::Text(text.to_string()),
        _ => return Err(format!("parameter value {raw:?} missing type marker")),
    };
    Ok((key, value))
}

pub(crate) fn parse_exchange(s: &str) -> Result<Exchange, String> {
    match s {
        "ALPACA" => Ok(Exchange::Alpaca),
        "BINANCE" => Ok(Exchange::Binance),
        "SIM" => Ok(Exchange::Sim),
        other => Err(format!("unknown exchange {other:?}")),
    }
}

pub(crate) fn parse_lifecycle(s: &str) -> Result<LifecycleState, String> {
    match s {
        "CREATED" => Ok(LifecycleState::Created),
        "INITIALIZED" => Ok(LifecycleState::Initialized),
        "RUNNING" => Ok(LifecycleState::Running),
        "PAUSED" => Ok(LifecycleState::Paused),
        "STOPPED" => Ok(LifecycleState::Stopped),
        "COMPLETED" => Ok(LifecycleState::Completed),
        "CANCELLED" => Ok(LifecycleState::Cancelled),
        "FAILED" => Ok(LifecycleState::Failed),
        other => Err(format!("unknown lifecycle state {other:?}")),
    }
}

pub(crate) fn parse_side(s: &str) -> Result<Side, String> {
    match s {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => Err(format!("unknown side {other:?}")),
    }
}

/// Split log content into fully terminated lines, reporting the byte
/// length they cover. Anything past that length is a torn tail from an
/// interrupted append; the caller truncates it before appending again.
pub(crate) fn complete_lines(content: &str) -> (Vec<&str>, usize) {
    let mut lines = Vec::new();
    let mut consumed = 0;
    for line in content.split_inclusive('\n') {
        match line.strip_suffix('\n') {
            Some(complete) => {
                lines.push(complete);
                consumed += line.len();
            }
            None => break,
        }
    }
    (lines, consumed)
}
