use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::lane::Lane;
use crate::light::{Action, LightState, QueueTelemetry, TrafficLight};
use crate::math::{grid_key, Axis};
use crate::record::{TickMetrics, TickRecord};
use crate::rng::SimRng;
use crate::vehicle::{can_change_lane, Vehicle};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use itertools::Itertools;
use smallvec::SmallVec;
use std::collections::HashSet;

/// An intersection simulation.
///
/// The simulation exclusively owns its vehicles, light and random source;
/// cloning it yields a fully independent copy.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Simulation {
    config: SimulationConfig,
    /// The signal guarding the stop line.
    light: TrafficLight,
    /// The vehicles being simulated, updated in order.
    vehicles: Vec<Vehicle>,
    /// The source of all randomness during a step.
    rng: SimRng,
    /// The simulated time in s.
    time: f64,
    /// The current frame of simulation.
    frame: usize,
    /// Measurements from the previously simulated frame.
    metrics: TickMetrics,
}

/// The observation handed to an external controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    pub queue_x: u32,
    pub queue_y: u32,
    /// 0 while X is green, 1 otherwise.
    pub phase: u8,
}

impl Observation {
    /// The observation as a fixed-size vector `[queue_x, queue_y, phase]`.
    pub fn to_array(self) -> [f32; 3] {
        [self.queue_x as f32, self.queue_y as f32, self.phase as f32]
    }
}

impl Simulation {
    /// Creates a new simulation.
    pub fn new(
        config: SimulationConfig,
        light: TrafficLight,
        vehicles: Vec<Vehicle>,
        rng: SimRng,
    ) -> Result<Self> {
        config.validate()?;
        let mut ids = HashSet::new();
        if let Some(dup) = vehicles.iter().map(Vehicle::id).find(|id| !ids.insert(*id)) {
            return Err(Error::DuplicateVehicle(dup));
        }
        let mut sim = Self {
            config,
            light,
            vehicles,
            rng,
            time: 0.0,
            frame: 0,
            metrics: Default::default(),
        };
        sim.metrics = sim.measure(0);
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn light(&self) -> &TrafficLight {
        &self.light
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, id: u32) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// The simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Measurements from the most recent step.
    pub fn metrics(&self) -> TickMetrics {
        self.metrics
    }

    /// The current observation for an external controller.
    pub fn observation(&self) -> Observation {
        Observation {
            queue_x: self.metrics.queue_x,
            queue_y: self.metrics.queue_y,
            phase: self.light.phase_indicator(),
        }
    }

    /// Advances the simulation by one time step.
    ///
    /// `action` only has an effect when the light is externally controlled.
    pub fn step(&mut self, action: Action) -> TickMetrics {
        let dt = self.config.dt;
        self.update_light(dt, action);

        let stop_line = self.light.position();
        let mut newly_passed = 0;
        for idx in 0..self.vehicles.len() {
            if self.config.lane_changes {
                self.change_lane(idx);
            }
            let leader = Lane::leader(&self.vehicles, idx).map(|i| self.vehicles[i].obstacle());
            let vehicle = &mut self.vehicles[idx];
            let was_before = vehicle.pos() < stop_line;
            vehicle.step(
                dt,
                leader.as_ref(),
                &self.light,
                &self.config.driving,
                &mut self.rng,
            );
            if was_before && vehicle.pos() >= stop_line {
                newly_passed += 1;
            }
        }

        self.frame += 1;
        self.time += dt;
        self.metrics = self.measure(newly_passed);
        self.metrics
    }

    /// Returns one record per vehicle describing the current state.
    pub fn records(&self) -> impl Iterator<Item = TickRecord> + '_ {
        let signal = self.light.state();
        self.vehicles.iter().map(move |v| self.record(v, signal))
    }

    fn record(&self, vehicle: &Vehicle, signal: LightState) -> TickRecord {
        let world = vehicle.world_pos(self.config.lane_width);
        TickRecord {
            time: self.time,
            vehicle_id: vehicle.id(),
            class: vehicle.class(),
            pos: vehicle.pos(),
            x: world.x,
            y: world.y,
            speed: vehicle.speed(),
            stopped: vehicle.has_stopped(),
            troublemaker: vehicle.is_troublemaker(),
            axis: vehicle.axis(),
            lane: vehicle.lane(),
            signal,
        }
    }

    /// Reports the queues to the light and advances it.
    fn update_light(&mut self, dt: f64, action: Action) {
        let stop_line = self.light.position();
        let telemetry = self.vehicles.iter().map(|v| v.telemetry(stop_line));
        self.light.receive(QueueTelemetry::from_vehicles(telemetry));
        self.light.update(dt, action);
    }

    /// Moves the vehicle at `idx` into a faster neighbouring lane if one is open,
    /// preferring the lane to its left.
    fn change_lane(&mut self, idx: usize) {
        for delta in [-1, 1] {
            if can_change_lane(
                &self.vehicles,
                idx,
                delta,
                self.config.lanes,
                &self.config.lane_change,
            ) {
                let vehicle = &mut self.vehicles[idx];
                vehicle.change_lane(delta);
                log::trace!("vehicle {} -> lane {}", vehicle.id(), vehicle.lane());
                return;
            }
        }
    }

    /// Computes the aggregate measurements of the current state.
    fn measure(&self, newly_passed: u32) -> TickMetrics {
        let stop_line = self.light.position();
        let queues = QueueTelemetry::from_vehicles(
            self.vehicles.iter().map(|v| v.telemetry(stop_line)),
        );
        let passed = self
            .vehicles
            .iter()
            .filter(|v| v.pos() >= stop_line)
            .count() as u32;
        let collisions = self.count_collisions();
        if collisions > 0 {
            log::warn!("{} collision(s) at t={:.2}s", collisions, self.time);
        }
        TickMetrics {
            time: self.time,
            queue_x: queues.get(Axis::X),
            queue_y: queues.get(Axis::Y),
            collisions,
            passed,
            newly_passed,
        }
    }

    /// Counts vehicles occupying the same rounded world position as another.
    ///
    /// Only coincident positions are detected; two vehicles passing through
    /// each other between ticks go unnoticed.
    fn count_collisions(&self) -> u32 {
        let mut keys = self
            .vehicles
            .iter()
            .map(|v| grid_key(v.world_pos(self.config.lane_width)))
            .collect::<SmallVec<[_; 32]>>();
        keys.sort_unstable();
        keys.iter().tuple_windows().filter(|(a, b)| a == b).count() as u32
    }
}
