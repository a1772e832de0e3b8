//! # Voxel Data
//!
//! Block, chunk, and world storage for the meshing pipeline.
//!
//! ## Architecture
//!
//! * **Block**: A packed 32-bit voxel record holding id, metadata, and light
//! * **Chunk**: A 16x256x16 column of blocks plus its dirty and mesh state
//! * **World**: Sparse chunk map that schedules meshing and issues draws
//! * **Biome**: Colormap coordinates for grass and foliage tinting
//!
//! ## Thread Safety
//!
//! Chunks are shared with the mesh workers behind reader-writer locks. Only the
//! render thread takes write locks, and it never holds more than one at a time.

pub mod biome;
pub mod block;
pub mod chunk;
pub mod world;
