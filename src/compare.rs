//! Side-by-side runs of different control strategies on identical traffic.

use crate::config::SimulationConfig;
use crate::env::{ActionLatch, Policy};
use crate::error::{positive, Result};
use crate::light::{Action, ControlMode, LightConfig, TrafficLight};
use crate::rng::SimRng;
use crate::simulation::Simulation;
use crate::vehicle::Vehicle;

/// A fixed starting point from which several control strategies are run.
///
/// Each run gets its own copy of the template vehicles and a random source
/// seeded identically, so differences between runs come from the control
/// strategy alone.
#[derive(Clone, Debug)]
pub struct Comparison {
    template: Vec<Vehicle>,
    config: SimulationConfig,
    light: LightConfig,
    seed: u64,
    /// Run length in simulated seconds.
    duration: f64,
    /// Ticks between successive policy decisions.
    action_interval: u32,
}

/// The outcome of one run of a [Comparison].
#[derive(Clone, Debug, PartialEq)]
pub struct ArmReport {
    pub control: ControlMode,
    /// The number of stopped vehicles after each tick.
    pub queue_lengths: Vec<u32>,
    /// The sum of collisions over all ticks.
    pub collisions: u32,
    /// The number of vehicles past the stop line at the end.
    pub passed: u32,
}

impl ArmReport {
    pub fn mean_queue(&self) -> f64 {
        if self.queue_lengths.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.queue_lengths.iter().sum();
        sum as f64 / self.queue_lengths.len() as f64
    }
}

impl Comparison {
    /// Creates a comparison. The `control` field of `light` is replaced per run.
    pub fn new(
        template: Vec<Vehicle>,
        config: SimulationConfig,
        light: LightConfig,
        seed: u64,
        duration: f64,
    ) -> Result<Self> {
        config.validate()?;
        positive("duration", duration)?;
        Ok(Self {
            template,
            config,
            light,
            seed,
            duration,
            action_interval: 1,
        })
    }

    /// Sets how many ticks pass between successive policy decisions.
    ///
    /// Decisions follow the same cadence as [IntersectionEnv](crate::IntersectionEnv):
    /// the first one takes effect on tick `interval`.
    pub fn with_action_interval(mut self, interval: u32) -> Result<Self> {
        ActionLatch::new(interval)?;
        self.action_interval = interval;
        Ok(self)
    }

    /// Runs the template under `control`.
    ///
    /// `policy` is asked for an action every `action_interval` ticks; without
    /// one, the light only ever receives [Action::Hold].
    pub fn run(&self, control: ControlMode, mut policy: Option<&mut dyn Policy>) -> Result<ArmReport> {
        let light = TrafficLight::new(&LightConfig {
            control,
            ..self.light
        })?;
        let mut sim = Simulation::new(
            self.config,
            light,
            self.template.clone(),
            SimRng::new(self.seed),
        )?;

        let ticks = (self.duration / self.config.dt).round() as usize;
        let mut report = ArmReport {
            control,
            queue_lengths: Vec::with_capacity(ticks),
            collisions: 0,
            passed: 0,
        };
        let mut latch = ActionLatch::new(self.action_interval)?;
        for _ in 0..ticks {
            let action = latch.tick(|| match policy.as_deref_mut() {
                Some(policy) => policy.act(&sim.observation()),
                None => Action::Hold,
            });
            let metrics = sim.step(action);
            report.queue_lengths.push(metrics.queue());
            report.collisions += metrics.collisions;
            report.passed = metrics.passed;
        }

        log::info!(
            "{:?}: mean queue {:.2}, {} passed, {} collisions",
            control,
            report.mean_queue(),
            report.passed,
            report.collisions
        );
        Ok(report)
    }
}
