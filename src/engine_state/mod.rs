//! # Engine State Module
//!
//! The pieces of the voxel engine that the meshing pipeline is built from.
//!
//! ## Key Components
//!
//! * `buffer_state` - GPU vertex buffers behind opaque handles
//! * `camera_state` - View frustum culling
//! * `rendering` - Vertex format, mesh builder, scratch buffers, and the chunk pipeline
//! * `task_management` - Job queues and the mesh worker pool
//! * `voxels` - Blocks, chunks, biomes, and the world
//!
//! ## Data Flow
//!
//! 1. Block edits mark chunks dirty
//! 2. `World::draw` submits dirty chunks as mesh jobs
//! 3. Workers build meshes into their scratch buffers
//! 4. `World::draw` uploads finished meshes and records draws for visible chunks

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;
