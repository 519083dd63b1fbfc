//! Geometry of the intersection.

use cgmath::{Point2, Vector2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
pub use util::*;

mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// The axis along which an approach's traffic travels.
///
/// Both approaches run towards the positive end of their axis and share
/// a single stop line offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The perpendicular approach.
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// A unit vector in the direction of travel.
    pub fn tangent(self) -> Vector2d {
        match self {
            Axis::X => Vector2d::new(1.0, 0.0),
            Axis::Y => Vector2d::new(0.0, 1.0),
        }
    }

    /// A unit vector pointing across the lanes of this axis.
    pub fn normal(self) -> Vector2d {
        rot90(self.tangent())
    }

    /// Converts a longitudinal position and lateral offset into world coordinates.
    pub fn world(self, pos: f64, offset: f64) -> Point2d {
        Point2d::new(0.0, 0.0) + pos * self.tangent() + offset * self.normal()
    }
}
