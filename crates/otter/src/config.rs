//! Layout configuration.
//!
//! Every field is optional when loading from JSON; missing values fall back to the tuned
//! dashboard defaults.

use crate::error::{Error, Result};
use crate::geom::Vec2;
use crate::node::NodeKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub canvas: Canvas,
    /// Radial spacing step of the initial spiral (see [`crate::placement::spiral`]).
    pub radius_step: f64,
    pub forces: ForceConstants,
    pub radii: RadiusTable,
}

impl LayoutConfig {
    pub const DEFAULT_RADIUS_STEP: f64 = 200.0;

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.canvas = Canvas { width, height };
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        if !self.radius_step.is_finite() || self.radius_step < 0.0 {
            return Err(Error::InvalidConstant {
                name: "radius_step",
                value: self.radius_step,
            });
        }
        self.forces.validate()?;
        self.radii.validate()
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            radius_step: Self::DEFAULT_RADIUS_STEP,
            forces: ForceConstants::default(),
            radii: RadiusTable::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(Error::InvalidCanvas {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

/// Tuning constants of the per-tick force model.
///
/// The defaults were tuned by eye for the dashboard canvas and have no derivation; keep them as
/// they are unless the product asks for a different feel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConstants {
    /// Numerator of the inverse-square repulsion (`repulsion / dist²`).
    pub repulsion: f64,
    /// Global force multiplier applied to repulsion, centering and attraction.
    pub alpha: f64,
    /// Pull towards the canvas center.
    pub centering: f64,
    /// Pull of project nodes towards stat/action nodes.
    pub attraction: f64,
    /// Extra spacing added to the mean radius before two nodes count as colliding.
    pub collision_padding: f64,
    /// Fraction of the overlap pushed back per tick.
    pub collision_stiffness: f64,
    /// Per-tick velocity retention.
    pub damping: f64,
    /// Lower bound applied to every pair distance before it is used as a divisor.
    pub min_distance: f64,
}

impl ForceConstants {
    pub fn validate(&self) -> Result<()> {
        let checks: [(&'static str, f64, bool); 8] = [
            ("repulsion", self.repulsion, self.repulsion >= 0.0),
            ("alpha", self.alpha, self.alpha >= 0.0),
            ("centering", self.centering, self.centering >= 0.0),
            ("attraction", self.attraction, self.attraction >= 0.0),
            (
                "collision_padding",
                self.collision_padding,
                self.collision_padding >= 0.0,
            ),
            (
                "collision_stiffness",
                self.collision_stiffness,
                self.collision_stiffness >= 0.0,
            ),
            (
                "damping",
                self.damping,
                (0.0..1.0).contains(&self.damping),
            ),
            ("min_distance", self.min_distance, self.min_distance > 0.0),
        ];
        for (name, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(Error::InvalidConstant { name, value });
            }
        }
        Ok(())
    }
}

impl Default for ForceConstants {
    fn default() -> Self {
        Self {
            repulsion: 40_000.0,
            alpha: 0.13,
            centering: 0.10,
            attraction: 0.07,
            collision_padding: 30.0,
            collision_stiffness: 0.35,
            damping: 0.85,
            min_distance: 1.0,
        }
    }
}

/// Node radius by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadiusTable {
    pub project: f64,
    pub active_project: f64,
    pub stat: f64,
    pub action: f64,
}

impl RadiusTable {
    pub fn radius_for(&self, kind: NodeKind, active: bool) -> f64 {
        match kind {
            NodeKind::Project if active => self.active_project,
            NodeKind::Project => self.project,
            NodeKind::Stat => self.stat,
            NodeKind::Action => self.action,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, radius) in [
            ("project", self.project),
            ("activeProject", self.active_project),
            ("stat", self.stat),
            ("action", self.action),
        ] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(Error::InvalidRadius {
                    node_id: format!("<{name}>"),
                    radius,
                });
            }
        }
        Ok(())
    }
}

impl Default for RadiusTable {
    fn default() -> Self {
        Self {
            project: 80.0,
            active_project: 90.0,
            stat: 75.0,
            action: 70.0,
        }
    }
}
