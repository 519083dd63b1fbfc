//! Per-tick outputs of a simulation.

use crate::light::LightState;
use crate::math::Axis;
use crate::vehicle::VehicleClass;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One vehicle's state after a tick, flattened for tabular logging.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickRecord {
    /// Simulated time in s.
    pub time: f64,
    pub vehicle_id: u32,
    pub class: VehicleClass,
    /// Longitudinal position along the vehicle's axis.
    pub pos: f64,
    /// World coordinates.
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub stopped: bool,
    pub troublemaker: bool,
    pub axis: Axis,
    pub lane: i32,
    pub signal: LightState,
}

/// Aggregate measurements taken at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickMetrics {
    /// Simulated time in s.
    pub time: f64,
    /// Stopped vehicles travelling along X.
    pub queue_x: u32,
    /// Stopped vehicles travelling along Y.
    pub queue_y: u32,
    /// Vehicles sharing a rounded position with another vehicle.
    pub collisions: u32,
    /// Vehicles at or past the stop line.
    pub passed: u32,
    /// Vehicles that crossed the stop line during this tick.
    pub newly_passed: u32,
}

impl TickMetrics {
    pub fn queue(&self) -> u32 {
        self.queue_x + self.queue_y
    }
}
