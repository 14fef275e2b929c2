use std::f32::consts::{PI, TAU};

/// Wraps an angle in radians into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Moves `from` a fraction `t` of the way toward `to` along the shorter arc.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    wrap_angle(from + angle_delta(from, to) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_stays_in_half_open_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-0.25) + 0.25).abs() < 1e-6);
    }

    #[test]
    fn delta_takes_the_short_way() {
        let delta = angle_delta(3.1, -3.1);
        assert!(delta > 0.0);
        assert!((delta - (TAU - 6.2)).abs() < 1e-5);
    }

    #[test]
    fn lerp_crosses_the_seam() {
        let blended = lerp_angle(3.1, -3.1, 0.5);
        assert!((blended.abs() - PI).abs() < 1e-3);
    }
}
