use super::Vehicle;
use crate::config::LaneChangeParams;
use crate::lane::Lane;

/// Determines whether the vehicle at `idx` may move `delta` lanes over.
///
/// A change needs room in the target lane both ahead and behind, and is only
/// worth making when the target lane's leader is faster than the current one.
/// An empty target lane counts as moving at the vehicle's own top speed;
/// with nobody ahead in the current lane there is nothing to gain.
pub(crate) fn can_change_lane(
    vehicles: &[Vehicle],
    idx: usize,
    delta: i32,
    lanes: i32,
    params: &LaneChangeParams,
) -> bool {
    let vehicle = &vehicles[idx];
    let current = Lane::of(vehicle);
    let target = current.shifted(delta);
    if !(0..lanes).contains(&target.index) {
        return false;
    }

    let pos = vehicle.pos();
    let target_ahead = target.ahead(vehicles, pos, idx).map(|i| &vehicles[i]);
    let target_behind = target.behind(vehicles, pos, idx).map(|i| &vehicles[i]);

    if target_ahead.map_or(false, |v| v.pos() - pos <= params.gap_ahead) {
        return false;
    }
    if target_behind.map_or(false, |v| pos - v.pos() <= params.gap_behind) {
        return false;
    }

    let current_speed = match current.ahead(vehicles, pos, idx) {
        Some(i) => vehicles[i].speed(),
        None => return false,
    };
    let target_speed = target_ahead.map_or(vehicle.max_speed(), |v| v.speed());
    target_speed > current_speed + params.speed_gain
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Axis;
    use crate::vehicle::{Placement, VehicleAttributes};

    fn at(id: u32, lane: i32, pos: f64, speed: f64) -> Vehicle {
        Vehicle::new(
            id,
            &VehicleAttributes::default(),
            Placement {
                axis: Axis::X,
                lane,
                pos,
                speed,
            },
        )
    }

    #[test]
    fn changes_into_faster_lane() {
        let params = LaneChangeParams::default();
        let vehicles = vec![
            at(0, 0, 0.0, 5.0),
            at(1, 0, 20.0, 2.0),
            at(2, 1, 25.0, 9.0),
        ];
        assert!(can_change_lane(&vehicles, 0, 1, 2, &params));
        assert!(!can_change_lane(&vehicles, 0, -1, 2, &params));
    }

    #[test]
    fn needs_a_speed_advantage() {
        let params = LaneChangeParams::default();
        let vehicles = vec![
            at(0, 0, 0.0, 5.0),
            at(1, 0, 20.0, 8.5),
            at(2, 1, 25.0, 9.0),
        ];
        assert!(!can_change_lane(&vehicles, 0, 1, 2, &params));
    }

    #[test]
    fn needs_room_ahead_and_behind() {
        let params = LaneChangeParams::default();
        let blocked_ahead = vec![
            at(0, 0, 0.0, 5.0),
            at(1, 0, 20.0, 2.0),
            at(2, 1, 9.0, 9.0),
        ];
        assert!(!can_change_lane(&blocked_ahead, 0, 1, 2, &params));

        let blocked_behind = vec![
            at(0, 0, 0.0, 5.0),
            at(1, 0, 20.0, 2.0),
            at(2, 1, -7.0, 9.0),
        ];
        assert!(!can_change_lane(&blocked_behind, 0, 1, 2, &params));
    }

    #[test]
    fn free_lane_attracts_only_when_blocked() {
        let params = LaneChangeParams::default();
        let blocked = vec![at(0, 0, 0.0, 5.0), at(1, 0, 20.0, 2.0)];
        assert!(can_change_lane(&blocked, 0, 1, 2, &params));

        let free = vec![at(0, 0, 0.0, 5.0)];
        assert!(!can_change_lane(&free, 0, 1, 2, &params));
    }
}
