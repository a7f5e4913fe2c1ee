use std::fmt;

/// One raw accelerometer reading from the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Sample {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Outcome of evaluating a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureResult {
    /// Both Y and Z flipped from negative to positive somewhere in the window.
    ArmTwisted,
    NoGesture,
}

impl GestureResult {
    pub fn is_twist(self) -> bool {
        matches!(self, Self::ArmTwisted)
    }

    /// Text shown to the user.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ArmTwisted => "Arm Twisted",
            Self::NoGesture => "no gesture",
        }
    }
}

impl From<bool> for GestureResult {
    fn from(twisted: bool) -> Self {
        if twisted {
            Self::ArmTwisted
        } else {
            Self::NoGesture
        }
    }
}

impl fmt::Display for GestureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latched transition flags from a scan, with the sample index where each
/// transition was first seen (the index of the positive sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TwistScan {
    pub y_flip_at: Option<usize>,
    pub z_flip_at: Option<usize>,
}

impl TwistScan {
    pub fn y_flipped(&self) -> bool {
        self.y_flip_at.is_some()
    }

    pub fn z_flipped(&self) -> bool {
        self.z_flip_at.is_some()
    }

    pub fn result(&self) -> GestureResult {
        GestureResult::from(self.y_flipped() && self.z_flipped())
    }
}
