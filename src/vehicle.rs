use self::acceleration::{AccelerationModel, ModelParams};
use crate::config::DrivingParams;
use crate::light::RightOfWay;
use crate::math::{Axis, Point2d};
use crate::obstacle::Obstacle;
pub use class::{VehicleAttributes, VehicleClass};
pub(crate) use lane_change::can_change_lane;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod acceleration;
mod class;
mod lane_change;

/// A simulated vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    /// The vehicle's ID
    id: u32,
    class: VehicleClass,
    /// The vehicle's length.
    length: f64,
    /// The acceleration model
    acc: AccelerationModel,
    /// The axis the vehicle travels along.
    axis: Axis,
    /// The lane index; the lateral offset is `lane * lane_width`.
    lane: i32,
    /// The longitudinal position of the vehicle's front.
    pos: f64,
    /// The speed in units/s.
    speed: f64,
    /// Seconds before a stop stimulus is acted upon.
    reaction_delay: f64,
    /// Time accumulated towards the reaction delay.
    delay_timer: f64,
    /// Whether the vehicle brakes spontaneously now and then.
    troublemaker: bool,
    /// Whether the vehicle came to rest because it had to stop.
    stopped: bool,
}

/// Where a vehicle starts out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub axis: Axis,
    pub lane: i32,
    /// The longitudinal position of the front of the vehicle.
    pub pos: f64,
    /// The initial speed; clamped to the vehicle's speed range.
    pub speed: f64,
}

/// What a vehicle reports to the traffic light each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleTelemetry {
    pub id: u32,
    pub axis: Axis,
    pub pos: f64,
    pub speed: f64,
    pub stopped: bool,
    /// Distance left to the stop line, zero once past it.
    pub distance_to_stop_line: f64,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub fn new(id: u32, attributes: &VehicleAttributes, placement: Placement) -> Self {
        let acc = AccelerationModel::new(&ModelParams {
            max_speed: attributes.max_speed,
            acceleration: attributes.acceleration,
            deceleration: attributes.deceleration,
        });
        Self {
            id,
            class: attributes.class,
            length: attributes.length,
            axis: placement.axis,
            lane: placement.lane,
            pos: placement.pos,
            speed: acc.clamp(placement.speed),
            acc,
            reaction_delay: attributes.reaction_delay,
            delay_timer: 0.0,
            troublemaker: attributes.troublemaker,
            stopped: false,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// The vehicle's length.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn lane(&self) -> i32 {
        self.lane
    }

    /// The longitudinal position of the front of the vehicle.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The world coordinates of the front of the vehicle.
    pub fn world_pos(&self, lane_width: f64) -> Point2d {
        self.axis.world(self.pos, self.lane as f64 * lane_width)
    }

    /// The vehicle's speed in units/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_speed(&self) -> f64 {
        self.acc.max_speed()
    }

    pub fn acceleration(&self) -> f64 {
        self.acc.acceleration()
    }

    pub fn deceleration(&self) -> f64 {
        self.acc.deceleration()
    }

    pub fn reaction_delay(&self) -> f64 {
        self.reaction_delay
    }

    pub fn delay_timer(&self) -> f64 {
        self.delay_timer
    }

    pub fn is_troublemaker(&self) -> bool {
        self.troublemaker
    }

    /// Whether the vehicle is stopped.
    pub fn has_stopped(&self) -> bool {
        self.stopped
    }

    /// The vehicle as seen by a follower.
    pub fn obstacle(&self) -> Obstacle {
        Obstacle {
            pos: self.pos,
            length: self.length,
            speed: self.speed,
            stopped: self.stopped,
        }
    }

    /// The report sent to the traffic light.
    pub fn telemetry(&self, stop_line: f64) -> VehicleTelemetry {
        VehicleTelemetry {
            id: self.id,
            axis: self.axis,
            pos: self.pos,
            speed: self.speed,
            stopped: self.stopped,
            distance_to_stop_line: f64::max(stop_line - self.pos, 0.0),
        }
    }

    /// Moves the vehicle into the neighbouring lane `delta` lanes over.
    pub(crate) fn change_lane(&mut self, delta: i32) {
        self.lane += delta;
    }

    /// Advances the vehicle by one time step.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    /// * `leader` - The nearest vehicle ahead in the same lane, if any
    /// * `signal` - The signal guarding the stop line
    /// * `params` - The driving parameters
    /// * `rng` - The source of spontaneous braking
    pub fn step<S, R>(
        &mut self,
        dt: f64,
        leader: Option<&Obstacle>,
        signal: &S,
        params: &DrivingParams,
        rng: &mut R,
    ) where
        S: RightOfWay + ?Sized,
        R: Rng + ?Sized,
    {
        self.delay_timer += dt;

        let stop_line = signal.stop_line();
        let before_line = self.pos < stop_line;
        let mut must_stop = false;
        let mut ceiling = self.acc.max_speed();

        // Denied by the signal
        if before_line && !signal.permits(self.axis, self.pos) {
            if stop_line - self.pos <= params.approach_window {
                must_stop = true;
            } else {
                ceiling = params.approach_slowdown * self.acc.max_speed();
            }
        }

        // Too close to the vehicle ahead
        if let Some(leader) = leader {
            let gap = leader.gap_from(self.pos);
            let safe = params.safe_gap(self.speed);
            if gap < safe || (leader.stopped && gap < safe + params.stopped_leader_margin) {
                must_stop = true;
            }
        }

        if self.troublemaker && before_line && rng.gen_bool(params.brake_probability) {
            self.speed = f64::max(self.speed - params.brake_impulse, 0.0);
        }

        // A vehicle already at rest holds without reacting again
        if must_stop && (self.stopped || self.delay_timer >= self.reaction_delay) {
            self.speed = self.acc.brake(self.speed, dt);
            self.stopped = self.speed < params.stop_speed;
        } else {
            self.speed = self.acc.approach(self.speed, ceiling, dt);
            self.stopped = false;
        }

        self.pos += self.speed * dt;

        if self.stopped {
            self.delay_timer = 0.0;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SimRng;
    use assert_approx_eq::assert_approx_eq;

    /// A signal that always grants or always denies the right of way.
    struct Fixed {
        stop_line: f64,
        green: bool,
    }

    impl RightOfWay for Fixed {
        fn stop_line(&self) -> f64 {
            self.stop_line
        }

        fn permits(&self, _axis: Axis, _pos: f64) -> bool {
            self.green
        }
    }

    fn vehicle(pos: f64, speed: f64) -> Vehicle {
        Vehicle::new(
            0,
            &VehicleAttributes::default(),
            Placement {
                axis: Axis::X,
                lane: 0,
                pos,
                speed,
            },
        )
    }

    const GREEN: Fixed = Fixed {
        stop_line: 1000.0,
        green: true,
    };

    #[test]
    fn unobstructed_vehicle_accelerates_then_cruises() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(0.0, 0.0);
        let dt = 0.5;

        let mut pos = veh.pos();
        for _ in 0..40 {
            let was_at_max = veh.speed() >= veh.max_speed();
            veh.step(dt, None, &GREEN, &params, &mut rng);
            assert!(veh.pos() > pos);
            if was_at_max {
                assert_approx_eq!(veh.pos() - pos, veh.max_speed() * dt);
            }
            assert!(veh.speed() <= veh.max_speed());
            pos = veh.pos();
        }
        assert_approx_eq!(veh.speed(), veh.max_speed());
    }

    #[test]
    fn position_uses_updated_speed() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(0.0, 2.0);
        veh.step(0.5, None, &GREEN, &params, &mut rng);
        assert_approx_eq!(veh.speed(), 3.5);
        assert_approx_eq!(veh.pos(), 1.75);
    }

    #[test]
    fn short_stimulus_is_ignored() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(0.0, 10.0);
        let red = Fixed {
            stop_line: 10.0,
            green: false,
        };

        // Reaction delay is 1s; half a second of red changes nothing
        veh.step(0.5, None, &red, &params, &mut rng);
        assert!(veh.speed() > 10.0);
        veh.step(0.5, None, &GREEN, &params, &mut rng);
        assert!(veh.speed() > 10.0);
        assert!(!veh.has_stopped());
    }

    #[test]
    fn red_light_stops_vehicle_before_line() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(-14.0, 3.0);
        let red = Fixed {
            stop_line: 0.0,
            green: false,
        };

        for _ in 0..40 {
            veh.step(0.25, None, &red, &params, &mut rng);
        }
        assert!(veh.has_stopped());
        assert_approx_eq!(veh.speed(), 0.0);
        assert!(veh.pos() < 0.0);
    }

    #[test]
    fn stopped_vehicle_holds() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(-14.0, 3.0);
        let red = Fixed {
            stop_line: 0.0,
            green: false,
        };
        for _ in 0..40 {
            veh.step(0.25, None, &red, &params, &mut rng);
        }
        let pos = veh.pos();
        for _ in 0..40 {
            veh.step(0.25, None, &red, &params, &mut rng);
            assert!(veh.has_stopped());
            assert_approx_eq!(veh.pos(), pos);
            assert_approx_eq!(veh.delay_timer(), 0.0);
        }
    }

    #[test]
    fn distant_red_slows_to_half_speed() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let mut veh = vehicle(-500.0, 14.0);
        let red = Fixed {
            stop_line: 0.0,
            green: false,
        };
        for _ in 0..20 {
            veh.step(0.5, None, &red, &params, &mut rng);
        }
        assert_approx_eq!(veh.speed(), 7.0);
        assert!(!veh.has_stopped());
    }

    #[test]
    fn follows_stopped_leader_without_overlap() {
        let params = DrivingParams::default();
        let mut rng = SimRng::new(0);
        let leader = Obstacle {
            pos: 60.0,
            length: 5.0,
            speed: 0.0,
            stopped: true,
        };
        let mut veh = vehicle(0.0, 14.0);
        for _ in 0..200 {
            let gap_before = leader.gap_from(veh.pos());
            veh.step(0.25, Some(&leader), &GREEN, &params, &mut rng);
            assert!(leader.pos - veh.pos() - leader.length >= 0.0 || gap_before <= 0.0);
        }
        assert!(veh.has_stopped());
    }

    #[test]
    fn troublemaker_brakes_sometimes() {
        let params = DrivingParams {
            brake_probability: 1.0,
            ..Default::default()
        };
        let mut rng = SimRng::new(0);
        let mut veh = Vehicle::new(
            1,
            &VehicleAttributes {
                troublemaker: true,
                ..Default::default()
            },
            Placement {
                axis: Axis::X,
                lane: 0,
                pos: 0.0,
                speed: 10.0,
            },
        );
        veh.step(0.5, None, &GREEN, &params, &mut rng);
        // 10 - 3 impulse, then + 1.5 acceleration
        assert_approx_eq!(veh.speed(), 8.5);
    }

    #[test]
    fn telemetry_distance_is_clamped() {
        let veh = vehicle(5.0, 0.0);
        assert_approx_eq!(veh.telemetry(10.0).distance_to_stop_line, 5.0);
        assert_approx_eq!(veh.telemetry(0.0).distance_to_stop_line, 0.0);
    }
}
