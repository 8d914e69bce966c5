//! Named tables of contact geometry.
//!
//! Populated once at startup (typically from a [`SceneConfig`]) and read-only
//! afterwards. Contacts built from configuration refer to their vertices by
//! table name.

use std::collections::{HashMap, HashSet};

use clankers_core::{ConfigError, ContactError, GraspVerticesConfig, SceneConfig, VerticesConfig};
use nalgebra::{Isometry3, Vector3};

/// Owner of the named surface and grasp vertex tables.
#[derive(Debug, Clone, Default)]
pub struct VertexRegistry {
    surface: HashMap<String, Vec<Vector3<f64>>>,
    grasp: HashMap<String, Vec<Isometry3<f64>>>,
}

impl VertexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every vertex table of `scene`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateVertices`] if a table name repeats
    /// within the same kind.
    pub fn from_scene(scene: &SceneConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_surface_vertices(&scene.surface_vertices)?;
        registry.load_grasp_vertices(&scene.grasp_vertices)?;
        Ok(registry)
    }

    /// Add surface vertex tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateVertices`] if a name is already taken
    /// or repeats within `tables`. Nothing is added in that case.
    pub fn load_surface_vertices(&mut self, tables: &[VerticesConfig]) -> Result<(), ConfigError> {
        check_new_names(&self.surface, tables.iter().map(|t| t.name.as_str()))?;
        for table in tables {
            let vertices = table.vertices.iter().map(|v| Vector3::from(*v)).collect();
            self.insert_surface(table.name.clone(), vertices);
        }
        Ok(())
    }

    /// Add grasp vertex tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateVertices`] if a name is already taken
    /// or repeats within `tables`. Nothing is added in that case.
    pub fn load_grasp_vertices(
        &mut self,
        tables: &[GraspVerticesConfig],
    ) -> Result<(), ConfigError> {
        check_new_names(&self.grasp, tables.iter().map(|t| t.name.as_str()))?;
        for table in tables {
            let vertices = table.vertices.iter().map(|p| p.to_isometry()).collect();
            self.insert_grasp(table.name.clone(), vertices);
        }
        Ok(())
    }

    /// Insert or replace a surface table.
    pub fn insert_surface(&mut self, name: impl Into<String>, vertices: Vec<Vector3<f64>>) {
        let name = name.into();
        tracing::debug!(name = %name, count = vertices.len(), "surface vertices registered");
        self.surface.insert(name, vertices);
    }

    /// Insert or replace a grasp table.
    pub fn insert_grasp(&mut self, name: impl Into<String>, vertices: Vec<Isometry3<f64>>) {
        let name = name.into();
        tracing::debug!(name = %name, count = vertices.len(), "grasp vertices registered");
        self.grasp.insert(name, vertices);
    }

    /// Surface vertices of table `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingVertices`] if no such table exists.
    pub fn surface_vertices(&self, name: &str) -> Result<&[Vector3<f64>], ContactError> {
        self.surface
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ContactError::MissingVertices {
                kind: "Surface",
                name: name.to_string(),
            })
    }

    /// Grasp vertex poses of table `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingVertices`] if no such table exists.
    pub fn grasp_vertices(&self, name: &str) -> Result<&[Isometry3<f64>], ContactError> {
        self.grasp
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ContactError::MissingVertices {
                kind: "Grasp",
                name: name.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.grasp.is_empty()
    }
}

/// Reject names that are already in `existing` or repeat among `names`.
fn check_new_names<'a, V>(
    existing: &HashMap<String, V>,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if existing.contains_key(name) || !seen.insert(name) {
            return Err(ConfigError::DuplicateVertices(name.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clankers_core::PoseConfig;

    fn foot_table() -> VerticesConfig {
        VerticesConfig {
            name: "foot".into(),
            vertices: vec![[0.0, 0.0, 0.0], [0.1, -0.2, 0.3]],
        }
    }

    #[test]
    fn surface_lookup() {
        let mut registry = VertexRegistry::new();
        assert!(registry.is_empty());
        registry.load_surface_vertices(&[foot_table()]).unwrap();
        let vertices = registry.surface_vertices("foot").unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1], Vector3::new(0.1, -0.2, 0.3));
        assert!(!registry.is_empty());
    }

    #[test]
    fn grasp_lookup() {
        let mut registry = VertexRegistry::new();
        registry
            .load_grasp_vertices(&[GraspVerticesConfig {
                name: "hand".into(),
                vertices: vec![PoseConfig {
                    translation: [0.0, 0.05, 0.0],
                    rotation: [0.0; 3],
                }],
            }])
            .unwrap();
        let poses = registry.grasp_vertices("hand").unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].translation.vector, Vector3::new(0.0, 0.05, 0.0));
    }

    #[test]
    fn missing_table_is_an_error() {
        let registry = VertexRegistry::new();
        assert_eq!(
            registry.surface_vertices("foot").unwrap_err(),
            ContactError::MissingVertices {
                kind: "Surface",
                name: "foot".into()
            }
        );
        assert!(registry.grasp_vertices("hand").is_err());
    }

    #[test]
    fn surface_and_grasp_namespaces_are_separate() {
        let mut registry = VertexRegistry::new();
        registry.load_surface_vertices(&[foot_table()]).unwrap();
        assert!(registry.grasp_vertices("foot").is_err());
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let mut registry = VertexRegistry::new();
        let err = registry
            .load_surface_vertices(&[foot_table(), foot_table()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateVertices(name) if name == "foot"));
    }

    #[test]
    fn rejected_load_adds_nothing() {
        let hand_table = VerticesConfig {
            name: "hand".into(),
            vertices: vec![[0.0; 3]],
        };

        let mut registry = VertexRegistry::new();
        let err = registry
            .load_surface_vertices(&[hand_table.clone(), foot_table(), hand_table.clone()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateVertices(name) if name == "hand"));
        assert!(registry.is_empty());

        // A clash with an earlier load keeps the registry as it was.
        registry.load_surface_vertices(&[foot_table()]).unwrap();
        assert!(
            registry
                .load_surface_vertices(&[hand_table, foot_table()])
                .is_err()
        );
        assert!(registry.surface_vertices("hand").is_err());
        assert_eq!(registry.surface_vertices("foot").unwrap().len(), 2);
    }
}
