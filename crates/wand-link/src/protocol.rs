use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;
use wand_gesture::schema::PAYLOAD_KEY;

/// Line terminator between messages.
const NEWLINE: u8 = b'\n';
/// Separator between dictionary entries on one line.
const ENTRY_SEP: char = '\t';
/// Longest line held while waiting for its terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Message is not valid UTF-8")]
    InvalidUtf8,
    #[error("Message has no transaction id")]
    MissingTransactionId,
    #[error("Transaction id {0:?} is not a number in 0..=255")]
    BadTransactionId(String),
    #[error("Entry {0:?} is not of the form key=value")]
    BadEntry(String),
    #[error("Dictionary key {0:?} is not a hex u32")]
    BadKey(String),
    #[error("Line exceeds {MAX_LINE_LEN} bytes without a terminator")]
    LineTooLong,
}

/// One app message from the watch: a transaction id and a keyed dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchMessage {
    pub transaction_id: u8,
    pub entries: BTreeMap<u32, String>,
}

impl WatchMessage {
    pub fn new(transaction_id: u8) -> Self {
        Self {
            transaction_id,
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: u32, value: impl Into<String>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    pub fn get(&self, key: u32) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// The text payload under [`PAYLOAD_KEY`].
    pub fn payload(&self) -> Option<&str> {
        self.get(PAYLOAD_KEY)
    }

    /// Encode as one wire line, including the trailing newline.
    pub fn to_line(&self) -> String {
        let entries: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k:08x}={v}"))
            .collect();
        format!("{} {}\n", self.transaction_id, entries.join("\t"))
    }
}

/// Streaming parser for the newline-framed watch protocol.
///
/// Feed raw bytes via `push_data`, then drain messages via `next_message`.
pub struct LineParser {
    buffer: VecDeque<u8>,
    /// Dropping the rest of an oversized line up to its terminator.
    discarding: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
            discarding: false,
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Try to extract the next complete message from the buffer.
    /// Returns `None` if no complete line is available yet. Blank lines are
    /// skipped. A line longer than [`MAX_LINE_LEN`] is reported once and
    /// dropped through its terminator.
    pub fn next_message(&mut self) -> Option<Result<WatchMessage, LinkError>> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == NEWLINE) else {
                if self.buffer.len() > MAX_LINE_LEN {
                    self.buffer.clear();
                    if !self.discarding {
                        self.discarding = true;
                        return Some(Err(LinkError::LineTooLong));
                    }
                } else if self.discarding {
                    self.buffer.clear();
                }
                return None;
            };
            if self.discarding {
                self.buffer.drain(..=end);
                self.discarding = false;
                continue;
            }
            if end > MAX_LINE_LEN {
                self.buffer.drain(..=end);
                return Some(Err(LinkError::LineTooLong));
            }
            let line: Vec<u8> = self.buffer.drain(..=end).collect();

            let text = match std::str::from_utf8(&line) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(_) => return Some(Err(LinkError::InvalidUtf8)),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(parse_line(text));
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `<transaction_id> <key_hex>=<value>[\t<key_hex>=<value>...]`.
pub fn parse_line(line: &str) -> Result<WatchMessage, LinkError> {
    let line = line.trim_start();
    let (id, rest) = match line.split_once(' ') {
        Some((id, rest)) => (id, rest),
        None => (line, ""),
    };
    if id.is_empty() {
        return Err(LinkError::MissingTransactionId);
    }
    let transaction_id = id
        .parse::<u8>()
        .map_err(|_| LinkError::BadTransactionId(id.to_owned()))?;

    let mut message = WatchMessage::new(transaction_id);
    for entry in rest.split(ENTRY_SEP).filter(|e| !e.is_empty()) {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| LinkError::BadEntry(entry.to_owned()))?;
        let key_text = key.trim();
        let digits = key_text.strip_prefix("0x").unwrap_or(key_text);
        let key = u32::from_str_radix(digits, 16)
            .map_err(|_| LinkError::BadKey(key_text.to_owned()))?;
        message.entries.insert(key, value.to_owned());
    }
    Ok(message)
}
