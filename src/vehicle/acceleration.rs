#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The longitudinal dynamics of a vehicle.
///
/// Speeds produced by this model always lie within `[0, max_speed]`
/// provided the input speed does.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccelerationModel {
    max_speed: f64,
    acceleration: f64,
    deceleration: f64,
}

/// The parameters of the acceleration model.
pub struct ModelParams {
    /// The top speed of the vehicle.
    pub max_speed: f64,
    /// The rate at which the vehicle gains speed, in units/s<sup>2</sup>.
    pub acceleration: f64,
    /// The rate at which the vehicle sheds speed when braking, a positive number.
    pub deceleration: f64,
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &ModelParams) -> Self {
        AccelerationModel {
            max_speed: params.max_speed,
            acceleration: params.acceleration,
            deceleration: params.deceleration,
        }
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn deceleration(&self) -> f64 {
        self.deceleration
    }

    /// Clamps a speed into the range the vehicle can drive at.
    pub fn clamp(&self, vel: f64) -> f64 {
        vel.clamp(0.0, self.max_speed)
    }

    /// Moves `vel` one time step towards `ceiling`, accelerating from below
    /// and braking from above without overshooting it.
    ///
    /// # Arguments
    /// * `vel` - The current speed.
    /// * `ceiling` - The highest speed allowed this step; capped at the max speed.
    /// * `dt` - The time step in seconds.
    pub fn approach(&self, vel: f64, ceiling: f64, dt: f64) -> f64 {
        let ceiling = f64::min(ceiling, self.max_speed);
        if vel > ceiling {
            f64::max(vel - self.deceleration * dt, ceiling)
        } else {
            f64::min(vel + self.acceleration * dt, ceiling)
        }
    }

    /// Brakes for one time step.
    pub fn brake(&self, vel: f64, dt: f64) -> f64 {
        f64::max(vel - self.deceleration * dt, 0.0)
    }
}
