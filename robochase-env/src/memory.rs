//! Last-known position of the target.
use crate::{TargetProvenance, FRAME_CENTER, LOST_HIGH, LOST_LOW};

/// Remembers where the target was last measured within an episode.
///
/// When the target is lost, the horizontal coordinate is replaced by the side
/// of the frame it most likely left by. Inferred positions are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetMemory {
    last: Option<[i32; 2]>,
}

impl TargetMemory {
    /// Constructs an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the stored position.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// The last measured position, if any.
    pub fn last(&self) -> Option<[i32; 2]> {
        self.last
    }

    /// Returns the position to report for the current reading.
    ///
    /// * Measured: stored and returned unchanged.
    /// * Lost with memory: `x` becomes `-1` if the last measurement was left of
    ///   the frame center, `101` otherwise; `y` is carried over.
    /// * Lost without memory: `(-1, -1)`.
    pub fn infer(&mut self, measured: Option<[i32; 2]>) -> ([i32; 2], TargetProvenance) {
        match (measured, self.last) {
            (Some(xy), _) => {
                self.last = Some(xy);
                (xy, TargetProvenance::Measured)
            }
            (None, Some([x, y])) => {
                let x = if x < FRAME_CENTER { LOST_LOW } else { LOST_HIGH };
                ([x, y], TargetProvenance::Inferred)
            }
            (None, None) => ([LOST_LOW, LOST_LOW], TargetProvenance::Unknown),
        }
    }
}
