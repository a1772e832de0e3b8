#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! A concurrent chunk meshing pipeline for a block world rendered with WGPU.
//!
//! Chunks of 16x256x16 blocks are turned into triangle meshes on a pool of
//! worker threads, handed back to the render thread through bounded job
//! queues, and uploaded to the GPU. The render thread never blocks on a
//! worker.
//!
//! ## Key Modules
//!
//! * `config` - Worker pool and queue configuration
//! * `core` - Shared resource handles and memory accounting
//! * `engine_state` - Blocks, chunks, the world, meshing, and GPU buffers
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_mesher::config::WorldConfig;
//! use voxel_mesher::engine_state::voxels::{biome::BiomeColorTable, world::World};
//!
//! voxel_mesher::init_logging();
//!
//! let mut world = World::new(WorldConfig::default(), BiomeColorTable::default())?;
//! let chunk = world.add_chunk(Point3::new(0, 0, 0));
//! chunk.get_mut().fill_zeroed();
//! # Ok::<(), voxel_mesher::error::WorldError>(())
//! ```

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Installs an `env_logger` logger writing to stdout, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless; later calls leave the first logger
/// in place.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}
