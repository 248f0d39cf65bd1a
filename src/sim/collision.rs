//! Collision helpers for circles against walls, circles and boxes
//!
//! Screen coordinates: x grows right, y grows down.

use glam::Vec2;

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce a circle between the vertical walls at `left` and `right`
///
/// The circle is pushed back inside before its velocity is mirrored.
/// Returns true when a wall was hit.
pub fn reflect_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, left: f32, right: f32) -> bool {
    if pos.x - radius < left {
        pos.x = left + radius;
        *vel = reflect_velocity(*vel, Vec2::X);
        true
    } else if pos.x + radius > right {
        pos.x = right - radius;
        *vel = reflect_velocity(*vel, Vec2::NEG_X);
        true
    } else {
        false
    }
}

/// Check whether two centres are closer than `reach`
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, reach: f32) -> bool {
    a.distance_squared(b) < reach * reach
}

/// Box-circle test used for catching
///
/// The circle's vertical extent must overlap the box and its centre must
/// lie inside the box's horizontal span (edges included).
pub fn circle_hits_box(center: Vec2, radius: f32, box_min: Vec2, box_max: Vec2) -> bool {
    let vertical = center.y + radius >= box_min.y && center.y - radius <= box_max.y;
    let horizontal = center.x >= box_min.x && center.x <= box_max.x;
    vertical && horizontal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_wall_bounce_clamps_and_mirrors() {
        let mut pos = Vec2::new(3.0, 50.0);
        let mut vel = Vec2::new(-4.0, -10.0);
        assert!(reflect_off_walls(&mut pos, &mut vel, 10.0, 0.0, 200.0));
        assert_eq!(pos.x, 10.0);
        assert!((vel.x - 4.0).abs() < 1e-6);
        assert!((vel.y + 10.0).abs() < 1e-6);

        let mut pos = Vec2::new(195.0, 50.0);
        let mut vel = Vec2::new(4.0, -10.0);
        assert!(reflect_off_walls(&mut pos, &mut vel, 10.0, 0.0, 200.0));
        assert_eq!(pos.x, 190.0);
        assert!((vel.x + 4.0).abs() < 1e-6);

        let mut pos = Vec2::new(100.0, 50.0);
        let mut vel = Vec2::new(4.0, -10.0);
        assert!(!reflect_off_walls(&mut pos, &mut vel, 10.0, 0.0, 200.0));
        assert_eq!(vel, Vec2::new(4.0, -10.0));
    }

    #[test]
    fn test_circles_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, Vec2::new(44.0, 0.0), 45.0));
        assert!(!circles_overlap(Vec2::ZERO, Vec2::new(45.0, 0.0), 45.0));
    }

    #[test]
    fn test_circle_box() {
        let min = Vec2::new(100.0, 400.0);
        let max = Vec2::new(200.0, 460.0);

        // Touching the top edge from above
        assert!(circle_hits_box(Vec2::new(150.0, 375.0), 25.0, min, max));
        // Still above
        assert!(!circle_hits_box(Vec2::new(150.0, 374.0), 25.0, min, max));
        // Centre just outside the span
        assert!(!circle_hits_box(Vec2::new(201.0, 420.0), 25.0, min, max));
        // Below the box
        assert!(!circle_hits_box(Vec2::new(150.0, 486.0), 25.0, min, max));
        assert!(circle_hits_box(Vec2::new(100.0, 485.0), 25.0, min, max));
    }
}
