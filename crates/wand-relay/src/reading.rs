use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Menu selections the watch can send, and the value relayed for each.
const MENU_READINGS: [(&str, i64); 2] = [("First Item", 100_000_000), ("Second Item", 200_000_000)];

/// Value to relay for a watch payload, if it is one of the menu selections.
pub fn reading_for(payload: &str) -> Option<i64> {
    MENU_READINGS
        .iter()
        .find(|(text, _)| *text == payload)
        .map(|&(_, value)| value)
}

/// One data point for a cloud stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Feed (device blueprint) the stream belongs to.
    pub feed: String,
    pub stream: String,
    pub value: i64,
    /// Unix time in milliseconds.
    pub at: u64,
}

impl Reading {
    pub fn new(feed: impl Into<String>, stream: impl Into<String>, value: i64) -> Self {
        let at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            feed: feed.into(),
            stream: stream.into(),
            value,
            at,
        }
    }
}
