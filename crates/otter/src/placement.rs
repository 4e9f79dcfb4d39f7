//! Deterministic initial placement.

use crate::geom::Vec2;
use crate::state::Body;

/// Distance of the first node from the canvas center.
pub const SPIRAL_BASE_RADIUS: f64 = 320.0;
/// Fraction of `radius_step` added per node index.
pub const SPIRAL_SPREAD: f64 = 0.22;
/// Smallest angular divisor, so that tiny sets still fan out by quarter turns.
pub const SPIRAL_MIN_SLOTS: usize = 4;

/// Places `count` nodes on an outward spiral around `(width/2, height/2)`.
///
/// Node `i` sits at angle `i·2π / max(4, count)` and distance `320 + i·radius_step·0.22`.
/// Velocities start at zero. The output depends only on the arguments.
pub fn spiral(count: usize, width: f64, height: f64, radius_step: f64) -> Vec<Body> {
    let center = Vec2::new(width / 2.0, height / 2.0);
    let slots = count.max(SPIRAL_MIN_SLOTS) as f64;
    (0..count)
        .map(|i| {
            let i = i as f64;
            let angle = i * std::f64::consts::TAU / slots;
            let rho = SPIRAL_BASE_RADIUS + i * radius_step * SPIRAL_SPREAD;
            Body::at_rest(Vec2::new(
                center.x + angle.cos() * rho,
                center.y + angle.sin() * rho,
            ))
        })
        .collect()
}
