use rand::Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// The share of sampled vehicles that are trucks.
const TRUCK_SHARE: f64 = 0.2;

/// The mean reaction delay of a driver in s.
const REACTION_MEAN: f64 = 1.0;

/// The standard deviation of the reaction delay in s.
const REACTION_STDDEV: f64 = 0.25;

/// The range reaction delays are clamped to, in s.
const REACTION_BOUNDS: (f64, f64) = (0.5, 1.5);

/// The kind of vehicle, which determines its size and performance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VehicleClass {
    Car,
    Truck,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleAttributes {
    pub class: VehicleClass,
    /// The vehicle length.
    pub length: f64,
    /// The top speed in units/s.
    pub max_speed: f64,
    /// The acceleration in units/s<sup>2</sup>.
    pub acceleration: f64,
    /// The braking deceleration, a positive number in units/s<sup>2</sup>.
    pub deceleration: f64,
    /// Seconds before a stop stimulus is acted upon.
    pub reaction_delay: f64,
    /// Whether the vehicle brakes spontaneously now and then.
    pub troublemaker: bool,
}

/// The sampling ranges of one vehicle class.
struct ClassRanges {
    length: RangeInclusive<f64>,
    max_speed: RangeInclusive<f64>,
    acceleration: RangeInclusive<f64>,
    deceleration: RangeInclusive<f64>,
}

impl VehicleClass {
    /// Picks a class at random; most vehicles are cars.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(TRUCK_SHARE) {
            VehicleClass::Truck
        } else {
            VehicleClass::Car
        }
    }

    /// Draws a set of attributes within this class's ranges.
    pub fn sample_attributes<R: Rng + ?Sized>(self, rng: &mut R) -> VehicleAttributes {
        let ranges = self.ranges();
        let reaction = match Normal::new(REACTION_MEAN, REACTION_STDDEV) {
            Ok(distr) => distr.sample(&mut *rng),
            Err(_) => REACTION_MEAN,
        };
        let reaction = reaction.clamp(REACTION_BOUNDS.0, REACTION_BOUNDS.1);
        VehicleAttributes {
            class: self,
            length: rng.gen_range(ranges.length),
            max_speed: rng.gen_range(ranges.max_speed),
            acceleration: rng.gen_range(ranges.acceleration),
            deceleration: rng.gen_range(ranges.deceleration),
            reaction_delay: reaction,
            troublemaker: false,
        }
    }

    fn ranges(self) -> ClassRanges {
        match self {
            VehicleClass::Car => ClassRanges {
                length: 4.0..=5.0,
                max_speed: 12.0..=16.0,
                acceleration: 2.5..=3.5,
                deceleration: 4.5..=6.0,
            },
            VehicleClass::Truck => ClassRanges {
                length: 8.0..=12.0,
                max_speed: 8.0..=11.0,
                acceleration: 1.0..=2.0,
                deceleration: 2.5..=3.5,
            },
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleClass::Car => write!(f, "car"),
            VehicleClass::Truck => write!(f, "truck"),
        }
    }
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            class: VehicleClass::Car,
            length: 4.5,
            max_speed: 14.0,
            acceleration: 3.0,
            deceleration: 5.0,
            reaction_delay: 1.0,
            troublemaker: false,
        }
    }
}
