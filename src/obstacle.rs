#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A snapshot of the vehicle a follower must not run into.
///
/// Taken from the leader before the follower moves, so the follower can be
/// mutated while the leader is still borrowed from the same collection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    /// The longitudinal position of the obstacle.
    pub pos: f64,
    /// The length of the obstacle, which extends behind `pos`.
    pub length: f64,
    /// The speed of the obstacle.
    pub speed: f64,
    /// Whether the obstacle has come to a stop.
    pub stopped: bool,
}

impl Obstacle {
    /// The free distance between the obstacle's rear and a follower at `pos`,
    /// clamped to zero.
    pub fn gap_from(&self, pos: f64) -> f64 {
        f64::max(self.pos - pos - self.length, 0.0)
    }
}
