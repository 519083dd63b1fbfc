use crate::error::{positive, Error, Result};
use crate::math::Axis;
use crate::vehicle::VehicleTelemetry;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing accumulated timers against durations.
const TIMER_EPSILON: f64 = 1e-9;

/// A traffic signal guarding a stop line shared by two perpendicular approaches.
///
/// A single-approach road is modelled by sending all traffic along [Axis::X];
/// the phases in which [Axis::Y] holds the right of way then act as red.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrafficLight {
    /// The longitudinal position of the stop line on both axes.
    position: f64,
    /// The duration of the yellow phase in s.
    yellow_duration: f64,
    /// The strategy deciding when to leave a green phase.
    control: ControlMode,
    /// The current state.
    state: LightState,
    /// The time since the current green phase was entered.
    green_timer: f64,
    /// The time since the current yellow phase was entered.
    yellow_timer: f64,
    /// The time the approach without right of way has been waiting.
    red_timer: f64,
    /// The most recently received queue telemetry.
    queues: QueueTelemetry,
}

/// The attributes of a traffic light.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightConfig {
    /// The position of the stop line.
    pub position: f64,
    /// The duration of the yellow phase in s.
    pub yellow_duration: f64,
    /// The approach that starts out green.
    pub initial: Axis,
    pub control: ControlMode,
}

/// The state of the signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    GreenX,
    YellowX,
    GreenY,
    YellowY,
}

/// When a green phase ends.
///
/// Every variant only decides *whether* to leave green; the yellow phase
/// that follows is handled identically for all of them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlMode {
    /// Switch after a fixed green time.
    Fixed { cycle_time: f64 },
    /// Switch once the waiting queue outgrows the moving one by `queue_margin`.
    Adaptive { min_green: f64, queue_margin: u32 },
    /// Switch when an external controller asks, or when the waiting approach
    /// would otherwise be held for longer than `max_red`.
    External { min_green: f64, max_red: f64 },
}

/// A request from an external controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    #[default]
    Hold,
    Switch,
}

/// The number of stopped vehicles on each approach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueueTelemetry {
    pub stopped_x: u32,
    pub stopped_y: u32,
}

/// What a green-phase decision is based on.
struct PhaseContext {
    green: Axis,
    green_timer: f64,
    red_timer: f64,
    yellow_duration: f64,
    dt: f64,
    queues: QueueTelemetry,
    action: Action,
}

/// Something that grants or denies vehicles the right to cross a stop line.
pub trait RightOfWay {
    /// The position of the stop line.
    fn stop_line(&self) -> f64;

    /// Whether a vehicle travelling along `axis` at `pos` may proceed.
    fn permits(&self, axis: Axis, pos: f64) -> bool;
}

impl TrafficLight {
    /// Creates a new traffic light, green for `config.initial`.
    pub fn new(config: &LightConfig) -> Result<Self> {
        if !config.position.is_finite() {
            return Err(Error::InvalidParameter {
                name: "position",
                value: config.position,
            });
        }
        positive("yellow_duration", config.yellow_duration)?;
        config.control.validate(config.yellow_duration)?;
        Ok(Self {
            position: config.position,
            yellow_duration: config.yellow_duration,
            control: config.control,
            state: LightState::green(config.initial),
            green_timer: 0.0,
            yellow_timer: 0.0,
            red_timer: 0.0,
            queues: Default::default(),
        })
    }

    /// The position of the stop line.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn control(&self) -> ControlMode {
        self.control
    }

    pub fn yellow_duration(&self) -> f64 {
        self.yellow_duration
    }

    /// The time spent in the current green phase, or the one that preceded
    /// the current yellow phase.
    pub fn green_timer(&self) -> f64 {
        self.green_timer
    }

    pub fn yellow_timer(&self) -> f64 {
        self.yellow_timer
    }

    /// The time the approach without right of way has been waiting.
    pub fn red_timer(&self) -> f64 {
        self.red_timer
    }

    pub fn queues(&self) -> QueueTelemetry {
        self.queues
    }

    /// 0 while X is green, 1 otherwise.
    pub fn phase_indicator(&self) -> u8 {
        match self.state {
            LightState::GreenX => 0,
            _ => 1,
        }
    }

    /// Stores the queue telemetry for the next call to [Self::update].
    pub fn receive(&mut self, queues: QueueTelemetry) {
        self.queues = queues;
    }

    /// Advances the signal by `dt` seconds.
    ///
    /// `action` is only consulted by [ControlMode::External].
    pub fn update(&mut self, dt: f64, action: Action) {
        self.red_timer += dt;

        if let LightState::YellowX | LightState::YellowY = self.state {
            self.yellow_timer += dt;
            if self.yellow_timer >= self.yellow_duration - TIMER_EPSILON {
                let next = LightState::green(self.state.axis().other());
                log::debug!("light {:?} -> {:?}", self.state, next);
                self.state = next;
                self.green_timer = 0.0;
                self.yellow_timer = 0.0;
                self.red_timer = 0.0;
            }
            return;
        }

        self.green_timer += dt;
        let ctx = PhaseContext {
            green: self.state.axis(),
            green_timer: self.green_timer,
            red_timer: self.red_timer,
            yellow_duration: self.yellow_duration,
            dt,
            queues: self.queues,
            action,
        };
        if self.control.wants_switch(&ctx) {
            let next = LightState::yellow(ctx.green);
            log::debug!(
                "light {:?} -> {:?} after {:.2}s green (queues {:?})",
                self.state,
                next,
                self.green_timer,
                self.queues
            );
            self.state = next;
            self.yellow_timer = 0.0;
        }
    }
}

impl RightOfWay for TrafficLight {
    fn stop_line(&self) -> f64 {
        self.position
    }

    fn permits(&self, axis: Axis, pos: f64) -> bool {
        match self.state {
            LightState::GreenX | LightState::GreenY => self.state.axis() == axis,
            LightState::YellowX | LightState::YellowY => {
                self.state.axis() == axis && pos >= self.position
            }
        }
    }
}

impl LightState {
    /// The green state for `axis`.
    pub fn green(axis: Axis) -> Self {
        match axis {
            Axis::X => LightState::GreenX,
            Axis::Y => LightState::GreenY,
        }
    }

    /// The yellow state following green for `axis`.
    pub fn yellow(axis: Axis) -> Self {
        match axis {
            Axis::X => LightState::YellowX,
            Axis::Y => LightState::YellowY,
        }
    }

    /// The axis this state shows green or yellow to.
    pub fn axis(self) -> Axis {
        match self {
            LightState::GreenX | LightState::YellowX => Axis::X,
            LightState::GreenY | LightState::YellowY => Axis::Y,
        }
    }

    pub fn is_yellow(self) -> bool {
        matches!(self, LightState::YellowX | LightState::YellowY)
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightState::GreenX => "green_x",
            LightState::YellowX => "yellow_x",
            LightState::GreenY => "green_y",
            LightState::YellowY => "yellow_y",
        };
        f.write_str(name)
    }
}

impl ControlMode {
    fn validate(&self, yellow: f64) -> Result<()> {
        match *self {
            ControlMode::Fixed { cycle_time } => positive("cycle_time", cycle_time),
            ControlMode::Adaptive { min_green, .. } => positive("min_green", min_green),
            ControlMode::External { min_green, max_red } => {
                positive("min_green", min_green)?;
                positive("max_red", max_red)?;
                if max_red + TIMER_EPSILON < min_green + yellow {
                    return Err(Error::InconsistentTiming {
                        max_red,
                        min_green,
                        yellow,
                    });
                }
                Ok(())
            }
        }
    }

    /// Decides whether the current green phase should end this tick.
    fn wants_switch(&self, ctx: &PhaseContext) -> bool {
        match *self {
            ControlMode::Fixed { cycle_time } => ctx.green_timer >= cycle_time - TIMER_EPSILON,
            ControlMode::Adaptive {
                min_green,
                queue_margin,
            } => {
                let moving = ctx.queues.get(ctx.green) as i64;
                let waiting = ctx.queues.get(ctx.green.other()) as i64;
                ctx.green_timer >= min_green - TIMER_EPSILON
                    && waiting - moving >= queue_margin as i64
            }
            ControlMode::External { min_green, max_red } => {
                if ctx.green_timer < min_green - TIMER_EPSILON {
                    return false;
                }
                // Leave green early enough that yellow ends within max_red
                let starving = ctx.red_timer + ctx.dt + ctx.yellow_duration > max_red + TIMER_EPSILON;
                ctx.action == Action::Switch || starving
            }
        }
    }
}

impl QueueTelemetry {
    /// Counts the stopped vehicles on each approach.
    pub fn from_vehicles(vehicles: impl IntoIterator<Item = VehicleTelemetry>) -> Self {
        vehicles
            .into_iter()
            .filter(|t| t.stopped)
            .fold(Self::default(), |mut queues, t| {
                match t.axis {
                    Axis::X => queues.stopped_x += 1,
                    Axis::Y => queues.stopped_y += 1,
                }
                queues
            })
    }

    /// The number of stopped vehicles on `axis`.
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.stopped_x,
            Axis::Y => self.stopped_y,
        }
    }

    pub fn total(&self) -> u32 {
        self.stopped_x + self.stopped_y
    }
}

impl TryFrom<u8> for Action {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Action::Hold),
            1 => Ok(Action::Switch),
            other => Err(Error::InvalidAction(other)),
        }
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> u8 {
        match action {
            Action::Hold => 0,
            Action::Switch => 1,
        }
    }
}
