//! Rendering side of the voxel pipeline.
//!
//! This module contains the mesh builder that runs on worker threads, the
//! scratch buffers it writes into, the vertex format shared with the GPU, and
//! the `wgpu` pipeline that draws uploaded chunk meshes.

pub mod meshing;
pub mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;
