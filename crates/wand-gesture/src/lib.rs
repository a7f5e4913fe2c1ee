//! Arm-twist detection over short windows of wrist accelerometer samples.
//!
//! A twist is reported when, somewhere in the window, the Y axis flips from
//! negative to positive between two consecutive samples and the Z axis does
//! the same (not necessarily at the same step).

pub mod detector;
pub mod notify;
pub mod parse;
pub mod ring;
pub mod schema;
pub mod types;

pub use detector::{detect_twist, scan, BufferedDetector, GestureDetector, GestureError};
pub use notify::{GestureNotifier, TracingNotifier};
pub use parse::{parse_sample, parse_samples, parse_window, MalformedSampleError};
pub use ring::{SampleRing, WindowSnapshot};
pub use types::{GestureResult, Sample, TwistScan};
