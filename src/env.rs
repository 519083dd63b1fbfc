//! A reset/step environment for training external signal controllers.
//!
//! Observations, actions and rewards have a fixed shape, so any generic
//! reinforcement learning loop can drive [IntersectionEnv] directly.

use crate::config::SimulationConfig;
use crate::error::{positive, Error, Result};
use crate::light::{Action, ControlMode, LightConfig, TrafficLight};
use crate::math::Axis;
use crate::record::TickMetrics;
use crate::rng::SimRng;
use crate::scenario::Crossing;
use crate::simulation::{Observation, Simulation};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How each tick's outcome is scored.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardWeights {
    /// Penalty per stopped vehicle.
    pub queue: f64,
    /// Penalty per collision.
    pub collision: f64,
    /// Bonus per vehicle crossing the stop line.
    pub pass: f64,
    /// Penalty for a tick in which a switch is requested.
    pub switch: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            queue: 1.0,
            collision: 10.0,
            pass: 3.0,
            switch: 2.0,
        }
    }
}

impl RewardWeights {
    /// Scores one tick.
    pub fn reward(&self, metrics: &TickMetrics, action: Action) -> f64 {
        let mut reward = -self.queue * metrics.queue() as f64
            - self.collision * metrics.collisions as f64
            + self.pass * metrics.newly_passed as f64;
        if action == Action::Switch {
            reward -= self.switch;
        }
        reward
    }
}

/// The configuration of an [IntersectionEnv].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvConfig {
    /// The initial vehicles of each episode.
    pub scenario: Crossing,
    /// Episode length in simulated seconds.
    pub duration: f64,
    /// Ticks between successive actions taking effect.
    pub action_interval: u32,
    /// Seed used when [IntersectionEnv::reset] is given none.
    pub seed: u64,
    pub yellow_duration: f64,
    pub min_green: f64,
    pub max_red: f64,
    pub rewards: RewardWeights,
    pub simulation: SimulationConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scenario: Default::default(),
            duration: 120.0,
            action_interval: 8,
            seed: 0,
            yellow_duration: 3.0,
            min_green: 5.0,
            max_red: 30.0,
            rewards: Default::default(),
            simulation: SimulationConfig {
                dt: 0.25,
                lanes: 2,
                ..Default::default()
            },
        }
    }
}

/// Holds an external controller's action between decision ticks.
///
/// The tick counter advances before it is checked, so the first decision
/// takes effect on tick `interval`; until then [Action::Hold] applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ActionLatch {
    interval: u32,
    ticks: u32,
    current: Action,
}

impl ActionLatch {
    pub(crate) fn new(interval: u32) -> Result<Self> {
        if interval == 0 {
            return Err(Error::InvalidParameter {
                name: "action_interval",
                value: 0.0,
            });
        }
        Ok(Self {
            interval,
            ticks: 0,
            current: Action::Hold,
        })
    }

    /// Advances one tick, taking a fresh action from `decide` on decision ticks.
    pub(crate) fn tick(&mut self, decide: impl FnOnce() -> Action) -> Action {
        self.ticks += 1;
        if self.ticks % self.interval == 0 {
            self.current = decide();
        }
        self.current
    }
}

impl EnvConfig {
    fn light(&self) -> LightConfig {
        LightConfig {
            position: 0.0,
            yellow_duration: self.yellow_duration,
            initial: Axis::X,
            control: ControlMode::External {
                min_green: self.min_green,
                max_red: self.max_red,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("duration", self.duration)?;
        ActionLatch::new(self.action_interval)?;
        self.simulation.validate()?;
        TrafficLight::new(&self.light()).map(|_| ())
    }
}

/// The outcome of [IntersectionEnv::step].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    /// Whether the episode has run for its full duration.
    pub terminated: bool,
    /// Always false; episodes only end by running out of time.
    pub truncated: bool,
    pub info: TickMetrics,
}

/// An external controller choosing signal actions from observations.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;
}

impl<F: FnMut(&Observation) -> Action> Policy for F {
    fn act(&mut self, observation: &Observation) -> Action {
        self(observation)
    }
}

/// A crossing whose light is driven by an external controller.
pub struct IntersectionEnv {
    config: EnvConfig,
    sim: Simulation,
    /// The action in effect until the next decision tick.
    latch: ActionLatch,
}

impl IntersectionEnv {
    /// Creates a new environment and resets it with the configured seed.
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let sim = Self::episode(&config, config.seed)?;
        let latch = ActionLatch::new(config.action_interval)?;
        Ok(Self { config, sim, latch })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The simulation of the current episode.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Starts a new episode and returns its first observation.
    ///
    /// On error the current episode is left untouched.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<Observation> {
        let seed = seed.unwrap_or(self.config.seed);
        log::info!("resetting episode with seed {}", seed);
        let sim = Self::episode(&self.config, seed)?;
        let latch = ActionLatch::new(self.config.action_interval)?;
        self.sim = sim;
        self.latch = latch;
        Ok(self.sim.observation())
    }

    /// Advances the episode by one tick.
    ///
    /// `action` only takes effect on every `action_interval`-th tick;
    /// in between, the previously chosen action persists.
    pub fn step(&mut self, action: Action) -> Step {
        let applied = self.latch.tick(|| action);

        let metrics = self.sim.step(applied);
        Step {
            observation: self.sim.observation(),
            reward: self.config.rewards.reward(&metrics, applied),
            terminated: self.is_done(),
            truncated: false,
            info: metrics,
        }
    }

    /// Whether the episode has run for its configured duration.
    pub fn is_done(&self) -> bool {
        self.sim.time() >= self.config.duration - 1e-9
    }

    /// Runs a whole episode under `policy`, returning the total reward.
    pub fn run_episode(&mut self, seed: Option<u64>, policy: &mut dyn Policy) -> Result<f64> {
        let mut observation = self.reset(seed)?;
        let mut total = 0.0;
        loop {
            let step = self.step(policy.act(&observation));
            total += step.reward;
            observation = step.observation;
            if step.terminated {
                return Ok(total);
            }
        }
    }

    fn episode(config: &EnvConfig, seed: u64) -> Result<Simulation> {
        let mut rng = SimRng::new(seed);
        let vehicles = config.scenario.generate(&mut rng);
        let light = TrafficLight::new(&config.light())?;
        Simulation::new(config.simulation, light, vehicles, rng)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn reward_combines_terms() {
        let weights = RewardWeights::default();
        let metrics = TickMetrics {
            queue_x: 2,
            queue_y: 1,
            collisions: 1,
            newly_passed: 2,
            ..Default::default()
        };
        assert_approx_eq!(weights.reward(&metrics, Action::Hold), -3.0 - 10.0 + 6.0);
        assert_approx_eq!(weights.reward(&metrics, Action::Switch), -9.0);
    }

    #[test]
    fn action_only_applies_on_interval() {
        let mut env = IntersectionEnv::new(EnvConfig {
            min_green: 0.25,
            action_interval: 4,
            ..Default::default()
        })
        .unwrap();
        env.reset(Some(3)).unwrap();
        for _ in 0..3 {
            let step = env.step(Action::Switch);
            assert_eq!(step.observation.phase, 0);
        }
        env.step(Action::Switch);
        assert!(env.simulation().light().state().is_yellow());
    }

    #[test]
    fn episode_terminates_on_time() {
        let mut env = IntersectionEnv::new(EnvConfig {
            duration: 10.0,
            ..Default::default()
        })
        .unwrap();
        env.reset(None).unwrap();
        let mut ticks = 0;
        loop {
            ticks += 1;
            if env.step(Action::Hold).terminated {
                break;
            }
        }
        assert_eq!(ticks, 40);
    }

    #[test]
    fn reset_is_reproducible() {
        let mut env = IntersectionEnv::new(Default::default()).unwrap();
        let mut policy = |obs: &Observation| {
            if obs.queue_y > obs.queue_x + 2 {
                Action::Switch
            } else {
                Action::Hold
            }
        };
        let a = env.run_episode(Some(17), &mut policy).unwrap();
        let b = env.run_episode(Some(17), &mut policy).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn latch_decides_on_every_interval() {
        let mut latch = ActionLatch::new(3).unwrap();
        let mut decided = vec![];
        for tick in 1..=7 {
            let action = latch.tick(|| {
                decided.push(tick);
                Action::Switch
            });
            let expected = if tick < 3 { Action::Hold } else { Action::Switch };
            assert_eq!(action, expected);
        }
        assert_eq!(decided, vec![3, 6]);
        assert!(ActionLatch::new(0).is_err());
    }

    #[test]
    fn reset_restarts_the_cadence() {
        let mut env = IntersectionEnv::new(EnvConfig {
            min_green: 0.25,
            action_interval: 4,
            ..Default::default()
        })
        .unwrap();
        env.step(Action::Hold);
        env.step(Action::Hold);
        let obs = env.reset(Some(3)).unwrap();
        assert_eq!(obs.phase, 0);
        assert_eq!(env.simulation().frame(), 0);
        // Two more ticks would hit the old cadence; the new one needs four
        env.step(Action::Switch);
        env.step(Action::Switch);
        assert_eq!(env.simulation().light().state(), crate::LightState::GreenX);
        env.step(Action::Switch);
        env.step(Action::Switch);
        assert!(env.simulation().light().state().is_yellow());
    }

    #[test]
    fn rejects_zero_interval() {
        let result = IntersectionEnv::new(EnvConfig {
            action_interval: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
