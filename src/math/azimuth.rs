use std::f64::consts::TAU;

use super::Point2;

/// Azimuth of the direction from `a` to `b`, measured clockwise from the
/// positive Y axis, in `[0, 2π)`.
///
/// Returns `None` when the two points coincide.
#[must_use]
pub fn azimuth(a: &Point2, b: &Point2) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(normalize_angle(dx.atan2(dy)))
}

/// Normalizes an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        let wrapped = a + TAU;
        // -tiny + TAU rounds to TAU
        if wrapped >= TAU {
            0.0
        } else {
            wrapped
        }
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-12;

    #[test]
    fn cardinal_directions() {
        let o = Point2::new(0.0, 0.0);
        let north = azimuth(&o, &Point2::new(0.0, 1.0)).unwrap_or(-1.0);
        let east = azimuth(&o, &Point2::new(1.0, 0.0)).unwrap_or(-1.0);
        let south = azimuth(&o, &Point2::new(0.0, -1.0)).unwrap_or(-1.0);
        let west = azimuth(&o, &Point2::new(-1.0, 0.0)).unwrap_or(-1.0);
        assert!(north.abs() < TOL, "north={north}");
        assert!((east - FRAC_PI_2).abs() < TOL, "east={east}");
        assert!((south - PI).abs() < TOL, "south={south}");
        assert!((west - 3.0 * FRAC_PI_2).abs() < TOL, "west={west}");
    }

    #[test]
    fn coincident_points_have_no_azimuth() {
        let p = Point2::new(2.0, 3.0);
        assert!(azimuth(&p, &p).is_none());
    }

    #[test]
    fn normalize_wraps_negative() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < TOL);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < TOL);
        assert!(normalize_angle(-1e-300) < TAU);
    }
}
