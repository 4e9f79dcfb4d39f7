//! Per-tick force model.
//!
//! Every tick accumulates four contributions into each node's velocity, all evaluated against the
//! positions at the start of the tick:
//!
//! 1. inverse-square repulsion between every pair,
//! 2. a linear push-back when two footprints overlap (plus padding),
//! 3. a pull towards the canvas center,
//! 4. a pull of project nodes towards every stat/action node.
//!
//! Integration is explicit Euler (`p += v`) followed by damping (`v *= damping`).

use crate::config::{ForceConstants, LayoutConfig, RadiusTable};
use crate::error::{Error, Result};
use crate::geom::{Vec2, is_finite};
use crate::node::{NodeKind, NodeSet};
use crate::state::SimulationState;

#[derive(Debug, Clone)]
pub struct ForceSimulator {
    constants: ForceConstants,
    radii: RadiusTable,
    center: Vec2,
}

impl ForceSimulator {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            constants: config.forces,
            radii: config.radii,
            center: config.canvas.center(),
        }
    }

    pub fn constants(&self) -> &ForceConstants {
        &self.constants
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Advances `state` by one tick.
    ///
    /// `state` must be index-aligned with `nodes`; a state of a different length is rejected
    /// untouched. The driver keeps them aligned by reseeding whenever the node set changes.
    pub fn step(&self, state: &mut SimulationState, nodes: &NodeSet) -> Result<()> {
        if state.len() != nodes.len() {
            return Err(Error::StateMismatch {
                state: state.len(),
                nodes: nodes.len(),
            });
        }
        let n = state.len();
        if n == 0 {
            return Ok(());
        }

        let c = &self.constants;
        let radii = nodes.radii(&self.radii);
        let kinds: Vec<NodeKind> = nodes.iter().map(|node| node.kind).collect();
        let positions: Vec<Vec2> = state.bodies().iter().map(|b| b.position).collect();
        let mut dv: Vec<Vec2> = vec![Vec2::zeros(); n];

        // Both contributions are symmetric, so each unordered pair is visited once.
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let dist = delta.norm().max(c.min_distance);
                // Zero for coincident nodes, never NaN.
                let dir = delta / dist;

                let mut push = c.repulsion / (dist * dist) * c.alpha;
                let min_dist = (radii[i] + radii[j]) / 2.0 + c.collision_padding;
                if dist < min_dist {
                    push += (min_dist - dist) * c.collision_stiffness;
                }

                dv[i] += dir * push;
                dv[j] -= dir * push;
            }
        }

        let centering = c.centering * c.alpha;
        let attraction = c.attraction * c.alpha;
        for i in 0..n {
            dv[i] += (self.center - positions[i]) * centering;

            if kinds[i] != NodeKind::Project {
                continue;
            }
            for j in 0..n {
                if j != i && kinds[j].is_satellite() {
                    dv[i] += (positions[j] - positions[i]) * attraction;
                }
            }
        }

        for (i, body) in state.bodies_mut().iter_mut().enumerate() {
            let velocity = body.velocity + dv[i];
            let position = body.position + velocity;
            if is_finite(&velocity) && is_finite(&position) {
                body.position = position;
                body.velocity = velocity * c.damping;
            } else {
                tracing::warn!(
                    node = %nodes.nodes()[i].id,
                    "discarding non-finite layout update"
                );
                body.velocity = Vec2::zeros();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ForceSimulator;
    use crate::config::{ForceConstants, LayoutConfig};
    use crate::error::Error;
    use crate::geom::Vec2;
    use crate::node::{Node, NodeSet};
    use crate::state::{Body, SimulationState};

    fn simulator(width: f64, height: f64, forces: ForceConstants) -> ForceSimulator {
        let config = LayoutConfig {
            forces,
            ..LayoutConfig::default().with_canvas(width, height)
        };
        ForceSimulator::new(&config)
    }

    fn state_at(points: &[(f64, f64)]) -> SimulationState {
        SimulationState::from_bodies(
            points
                .iter()
                .map(|&(x, y)| Body::at_rest(Vec2::new(x, y)))
                .collect(),
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn far_pair_only_feels_repulsion_without_centering() {
        let sim = simulator(
            1000.0,
            0.0,
            ForceConstants {
                centering: 0.0,
                ..ForceConstants::default()
            },
        );
        let nodes = NodeSet::new(vec![Node::stat("a", "A"), Node::stat("b", "B")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0), (1000.0, 0.0)]);

        sim.step(&mut state, &nodes).unwrap();

        // 40000 / 1000² * 0.13
        let kick = 0.04 * 0.13;
        let a = state.bodies()[0];
        let b = state.bodies()[1];
        assert!(approx(a.position.x, -kick), "a.x = {}", a.position.x);
        assert!(approx(b.position.x, 1000.0 + kick), "b.x = {}", b.position.x);
        assert!(approx(a.velocity.x, -kick * 0.85));
        assert_eq!(a.position.y, 0.0);
    }

    #[test]
    fn single_node_is_pulled_to_center() {
        let sim = simulator(1000.0, 600.0, ForceConstants::default());
        let nodes = NodeSet::new(vec![Node::action("a", "A")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0)]);

        sim.step(&mut state, &nodes).unwrap();

        let body = state.bodies()[0];
        assert!(approx(body.position.x, 500.0 * 0.013));
        assert!(approx(body.position.y, 300.0 * 0.013));
    }

    #[test]
    fn overlapping_pair_is_pushed_apart_by_collision() {
        let sim = simulator(
            0.0,
            0.0,
            ForceConstants {
                repulsion: 0.0,
                centering: 0.0,
                ..ForceConstants::default()
            },
        );
        let nodes = NodeSet::new(vec![Node::stat("a", "A"), Node::stat("b", "B")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0), (5.0, 0.0)]);

        sim.step(&mut state, &nodes).unwrap();

        // min_dist = 75 + 30, overlap = 100
        let push = 100.0 * 0.35;
        assert!(approx(state.bodies()[0].position.x, -push));
        assert!(approx(state.bodies()[1].position.x, 5.0 + push));
    }

    #[test]
    fn only_projects_are_attracted() {
        let sim = simulator(
            0.0,
            0.0,
            ForceConstants {
                repulsion: 0.0,
                centering: 0.0,
                ..ForceConstants::default()
            },
        );
        let nodes = NodeSet::new(vec![Node::project("p", "P"), Node::stat("s", "S")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0), (1000.0, 0.0)]);

        sim.step(&mut state, &nodes).unwrap();

        assert!(approx(state.bodies()[0].position.x, 1000.0 * 0.07 * 0.13));
        assert_eq!(state.bodies()[1].position.x, 1000.0);
    }

    #[test]
    fn projects_do_not_attract_each_other() {
        let sim = simulator(
            0.0,
            0.0,
            ForceConstants {
                repulsion: 0.0,
                centering: 0.0,
                ..ForceConstants::default()
            },
        );
        let nodes = NodeSet::new(vec![Node::project("p", "P"), Node::project("q", "Q")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0), (1000.0, 0.0)]);

        sim.step(&mut state, &nodes).unwrap();

        assert_eq!(state.bodies()[0].position.x, 0.0);
        assert_eq!(state.bodies()[1].position.x, 1000.0);
    }

    #[test]
    fn coincident_nodes_stay_finite() {
        let sim = simulator(1400.0, 900.0, ForceConstants::default());
        let nodes = NodeSet::new(vec![Node::project("p", "P"), Node::stat("s", "S")]).unwrap();
        let mut state = state_at(&[(10.0, 10.0), (10.0, 10.0)]);

        for _ in 0..200 {
            sim.step(&mut state, &nodes).unwrap();
            assert!(state.is_finite());
        }
    }

    #[test]
    fn misaligned_state_is_rejected_untouched() {
        let sim = simulator(1400.0, 900.0, ForceConstants::default());
        let nodes = NodeSet::new(vec![Node::stat("a", "A")]).unwrap();
        let mut state = state_at(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let before = state.clone();

        let err = sim.step(&mut state, &nodes).unwrap_err();

        assert!(matches!(err, Error::StateMismatch { state: 3, nodes: 1 }));
        assert_eq!(state, before);
    }

    #[test]
    fn short_state_is_rejected() {
        let sim = simulator(1400.0, 900.0, ForceConstants::default());
        let nodes = NodeSet::new(vec![Node::stat("a", "A"), Node::project("p", "P")]).unwrap();
        let mut state = SimulationState::default();

        assert!(matches!(
            sim.step(&mut state, &nodes),
            Err(Error::StateMismatch { state: 0, nodes: 2 })
        ));
    }

    #[test]
    fn non_finite_update_keeps_position_and_zeroes_velocity() {
        // Valid by `validate`, but the push between two close nodes overflows to infinity.
        let forces = ForceConstants {
            repulsion: 1e308,
            alpha: 10.0,
            ..ForceConstants::default()
        };
        forces.validate().expect("finite constants pass validation");
        let sim = simulator(1400.0, 900.0, forces);
        let nodes = NodeSet::new(vec![Node::stat("a", "A"), Node::stat("b", "B")]).unwrap();
        let mut state = SimulationState::from_bodies(vec![
            Body {
                position: Vec2::new(0.0, 0.0),
                velocity: Vec2::new(3.0, -2.0),
            },
            Body::at_rest(Vec2::new(1.0, 0.0)),
        ]);

        sim.step(&mut state, &nodes).unwrap();

        assert!(state.is_finite());
        let bodies = state.bodies();
        assert_eq!(bodies[0].position, Vec2::new(0.0, 0.0));
        assert_eq!(bodies[1].position, Vec2::new(1.0, 0.0));
        assert_eq!(bodies[0].velocity, Vec2::zeros());
        assert_eq!(bodies[1].velocity, Vec2::zeros());
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let sim = simulator(1400.0, 900.0, ForceConstants::default());
        let mut state = SimulationState::default();
        sim.step(&mut state, &NodeSet::empty()).unwrap();
        assert!(state.is_empty());
    }
}
