use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Simulation vector type (positions and velocities).
pub type Vec2 = na::Vector2<f64>;

/// Canvas-space point handed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

pub(crate) fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
