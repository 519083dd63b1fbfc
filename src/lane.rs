use crate::math::Axis;
use crate::vehicle::Vehicle;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single lane of traffic on one approach.
///
/// Lanes hold no state of their own; they select the vehicles travelling
/// in them out of the simulation's vehicle set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lane {
    pub axis: Axis,
    pub index: i32,
}

impl Lane {
    /// The lane the given vehicle is travelling in.
    pub fn of(vehicle: &Vehicle) -> Self {
        Self {
            axis: vehicle.axis(),
            index: vehicle.lane(),
        }
    }

    /// The lane `delta` lanes over on the same approach.
    pub fn shifted(self, delta: i32) -> Self {
        Self {
            index: self.index + delta,
            ..self
        }
    }

    /// Iterates over the vehicles in this lane along with their indices,
    /// skipping the vehicle at `exclude`.
    fn vehicles<'a>(
        self,
        vehicles: &'a [Vehicle],
        exclude: usize,
    ) -> impl Iterator<Item = (usize, &'a Vehicle)> + 'a {
        vehicles
            .iter()
            .enumerate()
            .filter(move |(idx, veh)| *idx != exclude && Lane::of(veh) == self)
    }

    /// Finds the nearest vehicle strictly ahead of `pos`.
    pub fn ahead(self, vehicles: &[Vehicle], pos: f64, exclude: usize) -> Option<usize> {
        self.vehicles(vehicles, exclude)
            .filter(|(_, veh)| veh.pos() > pos)
            .min_by(|(_, a), (_, b)| a.pos().total_cmp(&b.pos()))
            .map(|(idx, _)| idx)
    }

    /// Finds the nearest vehicle level with or behind `pos`.
    pub fn behind(self, vehicles: &[Vehicle], pos: f64, exclude: usize) -> Option<usize> {
        self.vehicles(vehicles, exclude)
            .filter(|(_, veh)| veh.pos() <= pos)
            .max_by(|(_, a), (_, b)| a.pos().total_cmp(&b.pos()))
            .map(|(idx, _)| idx)
    }

    /// Finds the vehicle the vehicle at `idx` must follow.
    pub fn leader(vehicles: &[Vehicle], idx: usize) -> Option<usize> {
        let vehicle = &vehicles[idx];
        Lane::of(vehicle).ahead(vehicles, vehicle.pos(), idx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vehicle::{Placement, VehicleAttributes};

    fn at(id: u32, axis: Axis, lane: i32, pos: f64) -> Vehicle {
        Vehicle::new(
            id,
            &VehicleAttributes::default(),
            Placement {
                axis,
                lane,
                pos,
                speed: 0.0,
            },
        )
    }

    #[test]
    fn leader_is_nearest_ahead_in_same_lane() {
        let vehicles = vec![
            at(0, Axis::X, 0, 0.0),
            at(1, Axis::X, 0, 30.0),
            at(2, Axis::X, 0, 12.0),
            at(3, Axis::X, 1, 5.0),
            at(4, Axis::Y, 0, 3.0),
        ];
        assert_eq!(Lane::leader(&vehicles, 0), Some(2));
        assert_eq!(Lane::leader(&vehicles, 2), Some(1));
        assert_eq!(Lane::leader(&vehicles, 1), None);
        assert_eq!(Lane::leader(&vehicles, 3), None);
        assert_eq!(Lane::leader(&vehicles, 4), None);
    }

    #[test]
    fn level_vehicle_counts_as_behind() {
        let vehicles = vec![at(0, Axis::X, 0, 10.0), at(1, Axis::X, 1, 10.0)];
        let lane = Lane {
            axis: Axis::X,
            index: 1,
        };
        assert_eq!(lane.ahead(&vehicles, 10.0, 0), None);
        assert_eq!(lane.behind(&vehicles, 10.0, 0), Some(1));
        assert_eq!(Lane::of(&vehicles[0]).shifted(1), lane);
    }
}
