use super::{Point2d, Vector2d};

/// The resolution of [grid_key] in world units.
const GRID_RESOLUTION: f64 = 0.1;

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Rounds a point to the nearest 0.1 units in each coordinate,
/// returned as an integer key suitable for equality checks.
pub fn grid_key(point: Point2d) -> (i64, i64) {
    let snap = |v: f64| (v / GRID_RESOLUTION).round() as i64;
    (snap(point.x), snap(point.y))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_key_rounds_to_tenths() {
        assert_eq!(grid_key(Point2d::new(1.04, -2.96)), (10, -30));
        assert_eq!(
            grid_key(Point2d::new(5.01, 0.0)),
            grid_key(Point2d::new(4.98, 0.02))
        );
        assert_ne!(
            grid_key(Point2d::new(5.0, 0.0)),
            grid_key(Point2d::new(5.2, 0.0))
        );
    }
}
