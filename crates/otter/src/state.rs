use crate::config::LayoutConfig;
use crate::geom::Vec2;
use crate::node::NodeSet;
use crate::placement::spiral;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Body {
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// Index-aligned position/velocity state, one body per node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    bodies: Vec<Body>,
}

impl SimulationState {
    /// Fresh spiral placement for `nodes` on the configured canvas.
    pub fn seed(nodes: &NodeSet, config: &LayoutConfig) -> Self {
        Self {
            bodies: spiral(
                nodes.len(),
                config.canvas.width,
                config.canvas.height,
                config.radius_step,
            ),
        }
    }

    pub fn from_bodies(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Sum of velocity magnitudes across all bodies.
    pub fn total_speed(&self) -> f64 {
        self.bodies.iter().map(Body::speed).sum()
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        self.total_speed() < epsilon
    }

    pub fn is_finite(&self) -> bool {
        self.bodies.iter().all(|b| {
            crate::geom::is_finite(&b.position) && crate::geom::is_finite(&b.velocity)
        })
    }
}
