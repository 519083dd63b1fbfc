//! Generators for the initial vehicle sets of the standard scenarios.
//!
//! Every generator draws from the passed random source only, so the same
//! seed always yields the same vehicles.

use crate::math::Axis;
use crate::vehicle::{Placement, Vehicle, VehicleClass};
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A platoon of vehicles queued up on a single multi-lane approach.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Platoon {
    pub vehicles: u32,
    pub lanes: i32,
    /// Position of the front of the leading vehicle.
    pub head: f64,
    /// Range of the free space left behind each vehicle.
    pub min_spacing: u32,
    pub max_spacing: u32,
}

impl Default for Platoon {
    fn default() -> Self {
        Self {
            vehicles: 12,
            lanes: 2,
            head: -100.0,
            min_spacing: 10,
            max_spacing: 25,
        }
    }
}

/// Two perpendicular approaches, each with two lanes either side of the centre.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Crossing {
    pub vehicles_x: u32,
    pub vehicles_y: u32,
    /// Position of the front of the leading vehicle in each lane.
    pub head: f64,
    /// Range of the distance between successive vehicles in a lane.
    pub min_spacing: u32,
    pub max_spacing: u32,
}

impl Default for Crossing {
    fn default() -> Self {
        Self {
            vehicles_x: 8,
            vehicles_y: 8,
            head: -60.0,
            min_spacing: 15,
            max_spacing: 25,
        }
    }
}

/// The lane indices used on each crossing approach.
const CROSSING_LANES: [i32; 2] = [-1, 1];

impl Platoon {
    /// Generates the platoon, with exactly one troublemaker among it.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vehicle> {
        if self.vehicles == 0 {
            return vec![];
        }
        let troublemaker = rng.gen_range(0..self.vehicles);
        let mut vehicles = Vec::with_capacity(self.vehicles as usize);
        let mut pos = self.head;
        for id in 0..self.vehicles {
            let lane = rng.gen_range(0..self.lanes.max(1));
            let vehicle = spawn(id, Axis::X, lane, pos, id == troublemaker, rng);
            let spacing = rng.gen_range(self.min_spacing..=self.max_spacing);
            pos -= vehicle.length() + spacing as f64;
            vehicles.push(vehicle);
        }
        vehicles
    }
}

impl Crossing {
    /// Generates both approaches, with exactly one troublemaker among all vehicles.
    ///
    /// Each approach's vehicles are split over its two lanes, the second lane
    /// taking the odd one out.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vehicle> {
        let total = self.vehicles_x + self.vehicles_y;
        if total == 0 {
            return vec![];
        }
        let troublemaker = rng.gen_range(0..total);
        let mut vehicles = Vec::with_capacity(total as usize);
        let mut id = 0;

        for (axis, count) in [(Axis::X, self.vehicles_x), (Axis::Y, self.vehicles_y)] {
            let per_lane = [count / 2, count - count / 2];
            for (lane, lane_count) in CROSSING_LANES.into_iter().zip(per_lane) {
                let mut pos = self.head;
                for _ in 0..lane_count {
                    vehicles.push(spawn(id, axis, lane, pos, id == troublemaker, rng));
                    pos -= rng.gen_range(self.min_spacing..=self.max_spacing) as f64;
                    id += 1;
                }
            }
        }

        vehicles
    }
}

/// Samples a vehicle of random class, placed at `pos` and already moving.
fn spawn<R: Rng + ?Sized>(
    id: u32,
    axis: Axis,
    lane: i32,
    pos: f64,
    troublemaker: bool,
    rng: &mut R,
) -> Vehicle {
    let class = VehicleClass::sample(rng);
    let mut attributes = class.sample_attributes(rng);
    attributes.troublemaker = troublemaker;
    let speed = attributes.max_speed * rng.gen_range(0.5..=1.0);
    Vehicle::new(
        id,
        &attributes,
        Placement {
            axis,
            lane,
            pos,
            speed,
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SimRng;

    #[test]
    fn platoon_is_spaced_out() {
        let vehicles = Platoon::default().generate(&mut SimRng::new(42));
        assert_eq!(vehicles.len(), 12);
        assert_eq!(vehicles.iter().filter(|v| v.is_troublemaker()).count(), 1);
        assert_eq!(vehicles[0].pos(), -100.0);
        for pair in vehicles.windows(2) {
            let gap = pair[0].pos() - pair[1].pos() - pair[0].length();
            assert!(gap > 10.0 - 1e-9 && gap < 25.0 + 1e-9, "gap {}", gap);
        }
        assert!(vehicles.iter().all(|v| (0..2).contains(&v.lane())));
    }

    #[test]
    fn crossing_fills_both_axes() {
        let vehicles = Crossing::default().generate(&mut SimRng::new(1));
        assert_eq!(vehicles.len(), 16);
        assert_eq!(vehicles.iter().filter(|v| v.axis() == Axis::Y).count(), 8);
        assert_eq!(vehicles.iter().filter(|v| v.is_troublemaker()).count(), 1);
        assert!(vehicles.iter().all(|v| v.pos() <= -60.0));
        assert!(vehicles.iter().all(|v| v.speed() <= v.max_speed()));
    }

    #[test]
    fn odd_counts_keep_every_vehicle() {
        let crossing = Crossing {
            vehicles_x: 5,
            vehicles_y: 3,
            ..Default::default()
        };
        for seed in 0..50 {
            let vehicles = crossing.generate(&mut SimRng::new(seed));
            assert_eq!(vehicles.len(), 8);
            assert_eq!(vehicles.iter().filter(|v| v.axis() == Axis::X).count(), 5);
            assert_eq!(vehicles.iter().filter(|v| v.is_troublemaker()).count(), 1);
            let in_lane = |axis, lane| {
                vehicles
                    .iter()
                    .filter(|v| v.axis() == axis && v.lane() == lane)
                    .count()
            };
            assert_eq!(in_lane(Axis::X, -1), 2);
            assert_eq!(in_lane(Axis::X, 1), 3);
            assert_eq!(in_lane(Axis::Y, 1), 2);
        }
    }

    #[test]
    fn same_seed_same_vehicles() {
        let a = Crossing::default().generate(&mut SimRng::new(9));
        let b = Crossing::default().generate(&mut SimRng::new(9));
        assert_eq!(a, b);
    }
}
