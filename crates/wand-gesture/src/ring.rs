use crate::detector::GestureError;
use crate::schema::MIN_WINDOW_SAMPLES;
use crate::types::Sample;

/// Fixed-capacity sample history owned by a single detector.
///
/// Writes go to `index`; when the ring fills, the whole window is handed
/// out as a snapshot and the index wraps to zero.
#[derive(Debug, Clone)]
pub struct SampleRing {
    slots: Box<[Sample]>,
    index: usize,
}

/// Immutable copy of a window, safe to evaluate while the ring keeps filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    samples: Vec<Sample>,
}

impl WindowSnapshot {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<Sample>> for WindowSnapshot {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl SampleRing {
    /// Fails when `capacity` could never hold a transition.
    pub fn new(capacity: usize) -> Result<Self, GestureError> {
        if capacity < MIN_WINDOW_SAMPLES {
            return Err(GestureError::WindowTooShort { len: capacity });
        }
        Ok(Self::sized(capacity))
    }

    pub(crate) fn sized(capacity: usize) -> Self {
        debug_assert!(capacity >= MIN_WINDOW_SAMPLES);
        Self {
            slots: vec![Sample::default(); capacity].into_boxed_slice(),
            index: 0,
        }
    }

    /// Store a sample. Returns the completed window when this write filled
    /// the ring.
    pub fn push(&mut self, sample: Sample) -> Option<WindowSnapshot> {
        self.slots[self.index] = sample;
        self.index += 1;
        if self.index == self.slots.len() {
            self.index = 0;
            return Some(WindowSnapshot::from(self.slots.to_vec()));
        }
        None
    }

    /// Samples written since the last wrap, oldest first.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot::from(self.slots[..self.index].to_vec())
    }

    pub fn len(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: i32) -> Sample {
        Sample::new(v, v, v)
    }

    #[test]
    fn fills_then_wraps() {
        let mut ring = SampleRing::new(3).unwrap();
        assert!(ring.push(s(1)).is_none());
        assert!(ring.push(s(2)).is_none());
        let full = ring.push(s(3)).unwrap();
        assert_eq!(full.samples(), &[s(1), s(2), s(3)]);
        assert!(ring.is_empty());

        ring.push(s(4));
        assert_eq!(ring.snapshot().samples(), &[s(4)]);
    }

    #[test]
    fn snapshot_is_detached_from_ring() {
        let mut ring = SampleRing::new(4).unwrap();
        ring.push(s(1));
        ring.push(s(2));
        let snap = ring.snapshot();
        ring.clear();
        ring.push(s(9));
        assert_eq!(snap.samples(), &[s(1), s(2)]);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn capacities_below_two_are_refused() {
        assert_eq!(
            SampleRing::new(0).unwrap_err(),
            GestureError::WindowTooShort { len: 0 }
        );
        assert_eq!(
            SampleRing::new(1).unwrap_err(),
            GestureError::WindowTooShort { len: 1 }
        );
        assert_eq!(SampleRing::new(2).unwrap().capacity(), 2);
    }
}
