//! Contact model for wrench distribution.
//!
//! A contact between a rigid body and its environment is represented by a
//! set of vertices, each with a polyhedral friction cone (a
//! [`FrictionPyramid`]). Nonnegative magnitudes along the pyramid ridges map
//! linearly, through the contact's grasp matrix, to the wrench the contact
//! exerts on the body.
//!
//! # Contact kinds
//!
//! - **Empty**: no vertices. Keeps a fixed limb set uniform when a limb is
//!   not touching anything.
//! - **Surface**: planar patch; all vertices share the patch normal.
//! - **Grasp**: each vertex is a full pose with its own normal.

pub mod aggregate;
pub mod contact;
pub mod friction;
pub mod registry;
pub mod viz;

pub use aggregate::{
    contacts_from_map, local_wrench_list, local_wrench_map, total_ridge_num, total_wrench,
    wrench_list, wrench_map,
};
pub use contact::{Contact, ContactKind, SharedContact, VertexWithRidges};
pub use friction::{DEFAULT_RIDGE_NUM, FrictionPyramid};
pub use registry::VertexRegistry;
pub use viz::{DEFAULT_FORCE_SCALE, DEFAULT_FRIC_PYRAMID_SCALE, Marker};
