use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Wrench;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_ridge_num() -> usize {
    4
}
const fn default_regular_weight() -> f64 {
    1e-8
}
const fn default_ridge_force_min_max() -> [f64; 2] {
    [0.0, 1e3]
}
const fn default_max_solver_iters() -> u32 {
    100
}
fn default_wrench_weight() -> WrenchConfig {
    WrenchConfig {
        force: [1.0; 3],
        couple: [1.0; 3],
    }
}

// ---------------------------------------------------------------------------
// PoseConfig / WrenchConfig
// ---------------------------------------------------------------------------

/// Rigid pose: translation plus roll/pitch/yaw rotation (radians).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default)]
    pub translation: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
}

impl PoseConfig {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.translation;
        let [roll, pitch, yaw] = self.rotation;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

/// Wrench given as force and couple triples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WrenchConfig {
    pub force: [f64; 3],
    pub couple: [f64; 3],
}

impl WrenchConfig {
    pub fn to_wrench(&self) -> Wrench {
        Wrench::new(Vector3::from(self.couple), Vector3::from(self.force))
    }
}

impl From<&Wrench> for WrenchConfig {
    fn from(w: &Wrench) -> Self {
        Self {
            force: w.force.into(),
            couple: w.moment.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Vertex tables
// ---------------------------------------------------------------------------

/// Named table of surface vertices in the contact's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticesConfig {
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
}

/// Named table of grasp vertex poses in the contact's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraspVerticesConfig {
    pub name: String,
    pub vertices: Vec<PoseConfig>,
}

// ---------------------------------------------------------------------------
// ContactConfig
// ---------------------------------------------------------------------------

/// Construction parameters of a single contact, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContactConfig {
    Empty {
        name: String,
    },
    Surface {
        name: String,
        fric_coeff: f64,
        vertices_name: String,
        #[serde(default)]
        pose: PoseConfig,
        #[serde(default)]
        max_wrench: Option<WrenchConfig>,
        #[serde(default = "default_ridge_num")]
        ridge_num: usize,
    },
    Grasp {
        name: String,
        fric_coeff: f64,
        vertices_name: String,
        #[serde(default)]
        pose: PoseConfig,
        #[serde(default)]
        max_wrench: Option<WrenchConfig>,
        #[serde(default = "default_ridge_num")]
        ridge_num: usize,
    },
}

impl ContactConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Empty { name } | Self::Surface { name, .. } | Self::Grasp { name, .. } => name,
        }
    }
}

// ---------------------------------------------------------------------------
// WrenchDistributionConfig
// ---------------------------------------------------------------------------

/// Which QP backend the distribution hands its problem to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QpSolverType {
    /// Whatever backend is available.
    #[default]
    Any,
    Clarabel,
}

/// Weights and bounds of the wrench distribution QP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrenchDistributionConfig {
    /// Per-axis weight of the wrench tracking error.
    #[serde(default = "default_wrench_weight")]
    pub wrench_weight: WrenchConfig,

    /// Weight of the ridge force regularization term.
    #[serde(default = "default_regular_weight")]
    pub regular_weight: f64,

    /// Bound applied to every ridge force magnitude.
    #[serde(default = "default_ridge_force_min_max")]
    pub ridge_force_min_max: [f64; 2],

    #[serde(default)]
    pub qp_solver_type: QpSolverType,

    /// Iteration cap handed to the QP backend.
    #[serde(default = "default_max_solver_iters")]
    pub max_solver_iters: u32,
}

impl Default for WrenchDistributionConfig {
    fn default() -> Self {
        Self {
            wrench_weight: default_wrench_weight(),
            regular_weight: default_regular_weight(),
            ridge_force_min_max: default_ridge_force_min_max(),
            qp_solver_type: QpSolverType::default(),
            max_solver_iters: default_max_solver_iters(),
        }
    }
}

impl WrenchDistributionConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = self.wrench_weight.to_wrench().to_vector();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "wrench_weight".into(),
                message: "must be finite and >= 0".into(),
            });
        }
        if !self.regular_weight.is_finite() || self.regular_weight < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "regular_weight".into(),
                message: format!("must be finite and >= 0, got {}", self.regular_weight),
            });
        }
        let [min, max] = self.ridge_force_min_max;
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ConfigError::InvalidValue {
                field: "ridge_force_min_max".into(),
                message: format!("must satisfy min <= max, got [{min}, {max}]"),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// A full contact scene: vertex tables, contacts and solver settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub surface_vertices: Vec<VerticesConfig>,
    #[serde(default)]
    pub grasp_vertices: Vec<GraspVerticesConfig>,
    #[serde(default)]
    pub contacts: Vec<ContactConfig>,
    #[serde(default)]
    pub wrench_distribution: WrenchDistributionConfig,
}

impl SceneConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.wrench_distribution.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
