//! A microscopic traffic simulation for comparing intersection control
//! strategies: fixed-time, queue-adaptive and externally (learned) driven.

pub use compare::{ArmReport, Comparison};
pub use config::{DrivingParams, LaneChangeParams, SimulationConfig};
pub use env::{EnvConfig, IntersectionEnv, Policy, RewardWeights, Step};
pub use error::{Error, Result};
pub use lane::Lane;
pub use light::{
    Action, ControlMode, LightConfig, LightState, QueueTelemetry, RightOfWay, TrafficLight,
};
pub use math::Axis;
pub use obstacle::Obstacle;
pub use record::{TickMetrics, TickRecord};
pub use rng::SimRng;
pub use scenario::{Crossing, Platoon};
pub use simulation::{Observation, Simulation};
pub use vehicle::{Placement, Vehicle, VehicleAttributes, VehicleClass, VehicleTelemetry};

mod compare;
mod config;
mod env;
mod error;
mod lane;
mod light;
pub mod math;
mod obstacle;
mod record;
mod rng;
pub mod scenario;
mod simulation;
mod vehicle;
