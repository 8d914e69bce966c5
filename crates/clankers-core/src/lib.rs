// clankers-core: Spatial force types, errors and configuration for contact wrench distribution.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    ContactConfig, GraspVerticesConfig, PoseConfig, QpSolverType, SceneConfig, VerticesConfig,
    WrenchConfig, WrenchDistributionConfig,
};
pub use error::{ClankersError, ConfigError, ContactError, DistributionError};
pub use types::Wrench;
