//! Identifiers shared with the watch application.

/// Dictionary key under which the watch sends its text payload.
pub const PAYLOAD_KEY: u32 = 0xabba_babe;

/// Watch application the host talks to.
pub const WATCH_APP_UUID: &str = "2daf4c14-973c-474f-80c3-706e1c6df62a";

/// Samples carried by one accelerometer message.
pub const STATELESS_WINDOW_SAMPLES: usize = 10;

/// Samples accumulated by the buffered detector before evaluation.
pub const BUFFERED_WINDOW_SAMPLES: usize = 20;

/// Shortest window that can contain a transition.
pub const MIN_WINDOW_SAMPLES: usize = 2;
