//! Tunable parameters of the motion model and the simulation loop.
//!
//! The defaults are empirical and have not been calibrated against
//! observed traffic.

use crate::error::{non_negative, positive, probability, Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the per-tick vehicle motion model.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrivingParams {
    /// Distance before the stop line within which a denied vehicle must stop.
    pub approach_window: f64,
    /// The safe-following distance at zero speed.
    pub min_gap: f64,
    /// The safe-following distance added per unit of own speed, in s.
    pub headway: f64,
    /// Extra distance kept from a leader that has stopped.
    pub stopped_leader_margin: f64,
    /// Speeds below this count as stopped.
    pub stop_speed: f64,
    /// Fraction of max speed a denied vehicle slows towards outside the approach window.
    pub approach_slowdown: f64,
    /// Per-tick probability that a troublemaker brakes spontaneously.
    pub brake_probability: f64,
    /// Speed removed instantly by a spontaneous brake.
    pub brake_impulse: f64,
}

impl Default for DrivingParams {
    fn default() -> Self {
        Self {
            approach_window: 15.0,
            min_gap: 10.0,
            headway: 0.5,
            stopped_leader_margin: 5.0,
            stop_speed: 0.1,
            approach_slowdown: 0.5,
            brake_probability: 0.01,
            brake_impulse: 3.0,
        }
    }
}

impl DrivingParams {
    /// The speed-dependent safe-following distance.
    pub fn safe_gap(&self, speed: f64) -> f64 {
        self.min_gap + self.headway * speed
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("approach_window", self.approach_window)?;
        non_negative("min_gap", self.min_gap)?;
        non_negative("headway", self.headway)?;
        non_negative("stopped_leader_margin", self.stopped_leader_margin)?;
        positive("stop_speed", self.stop_speed)?;
        probability("approach_slowdown", self.approach_slowdown)?;
        probability("brake_probability", self.brake_probability)?;
        non_negative("brake_impulse", self.brake_impulse)
    }
}

/// Parameters of the lane-change decision.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaneChangeParams {
    /// Required clearance to the nearest vehicle ahead in the target lane.
    pub gap_ahead: f64,
    /// Required clearance to the nearest vehicle behind in the target lane.
    pub gap_behind: f64,
    /// How much faster the target lane's leader must be than the current one.
    pub speed_gain: f64,
}

impl Default for LaneChangeParams {
    fn default() -> Self {
        Self {
            gap_ahead: 10.0,
            gap_behind: 8.0,
            speed_gain: 1.0,
        }
    }
}

impl LaneChangeParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("gap_ahead", self.gap_ahead)?;
        non_negative("gap_behind", self.gap_behind)?;
        non_negative("speed_gain", self.speed_gain)
    }
}

/// Configuration of a [Simulation](crate::Simulation).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The time step in seconds.
    pub dt: f64,
    /// The number of lanes per approach, for lane-change bounds.
    pub lanes: i32,
    /// The lateral distance between adjacent lanes.
    pub lane_width: f64,
    /// Whether vehicles may change lanes.
    pub lane_changes: bool,
    pub driving: DrivingParams,
    pub lane_change: LaneChangeParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.5,
            lanes: 1,
            lane_width: 3.0,
            lane_changes: false,
            driving: Default::default(),
            lane_change: Default::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(Error::InvalidTimeStep(self.dt));
        }
        if self.lanes < 1 {
            return Err(Error::InvalidParameter {
                name: "lanes",
                value: self.lanes as f64,
            });
        }
        positive("lane_width", self.lane_width)?;
        self.driving.validate()?;
        self.lane_change.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn safe_gap_grows_with_speed() {
        let params = DrivingParams::default();
        assert_approx_eq!(params.safe_gap(0.0), 10.0);
        assert_approx_eq!(params.safe_gap(10.0), 15.0);
    }

    #[test]
    fn rejects_bad_time_step() {
        let config = SimulationConfig {
            dt: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidTimeStep(0.0)));
    }

    #[test]
    fn rejects_zero_lanes() {
        let config = SimulationConfig {
            lanes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
