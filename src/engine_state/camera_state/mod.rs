//! # Camera State
//!
//! View-dependent culling. The camera itself (input handling, uniforms) is
//! owned by the embedding renderer; the meshing pipeline only needs to ask
//! whether a chunk's bounds are visible.

pub mod frustum;

pub use frustum::{Frustum, ViewFrustum, OPENGL_TO_WGPU_MATRIX};
