//! Mesh generation for voxel chunks.
//!
//! This module turns the blocks of one chunk into a flat list of triangles. It
//! is the code that runs on mesh worker threads; everything here only reads
//! chunk data and writes into the worker's private scratch buffer.
//!
//! # Architecture
//! - `MeshBuilder`: scans a chunk and emits the visible faces of every block
//! - `ChunkNeighborhood`: a chunk plus its six face-adjacent neighbors, so
//!   faces on the chunk boundary can be culled against the adjacent chunk
//! - `block_models`: per-block-id rendering rules
//! - `face`: face geometry and vertex emission
//! - `tessellation_buffer`: the scratch buffers meshes are written into
//! - `renderer`: the `wgpu` pipeline that draws uploaded meshes
//!
//! # Scan Order
//! The builder walks z, then y, then x. Sections whose bit is clear in the
//! chunk's primary bitmask are skipped entirely. Along x it keeps a sliding
//! window of (left, current, right) so each block is fetched once per row; the
//! remaining neighbors are read directly from the chunk and only go through a
//! bounds-checked cross-chunk lookup at the chunk boundary.

pub mod block_models;
pub mod face;
pub mod renderer;
pub mod tessellation_buffer;

use std::sync::Arc;

use cgmath::Point3;

pub use renderer::ChunkPipeline;
pub use tessellation_buffer::{ScratchState, ScratchWriter, TessellationBuffer};

use crate::engine_state::voxels::{
    biome::BiomeColorTable,
    block::{block_side::BlockSide, Block},
    chunk::{
        to_flat, Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, SECTION_COUNT, SECTION_HEIGHT,
    },
};

use block_models::model_for;
use face::{BlockContext, FaceWriter};

/// A chunk together with whichever of its six face-adjacent neighbors are
/// loaded. Missing neighbors read as air.
pub struct ChunkNeighborhood<'a> {
    /// The chunk being meshed.
    pub center: &'a Chunk,
    /// Neighboring chunks, indexed by `BlockSide`.
    pub neighbors: [Option<&'a Chunk>; 6],
}

impl<'a> ChunkNeighborhood<'a> {
    /// A chunk with no loaded neighbors.
    pub fn isolated(center: &'a Chunk) -> Self {
        Self {
            center,
            neighbors: [None; 6],
        }
    }

    /// Looks up a block by chunk-local coordinates that may lie up to one
    /// block outside the center chunk.
    #[inline]
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        const W: i32 = CHUNK_WIDTH as i32;
        const H: i32 = CHUNK_HEIGHT as i32;
        const D: i32 = CHUNK_DEPTH as i32;

        let side = if x < 0 {
            BlockSide::LEFT
        } else if x >= W {
            BlockSide::RIGHT
        } else if z < 0 {
            BlockSide::BACK
        } else if z >= D {
            BlockSide::FRONT
        } else if y < 0 {
            BlockSide::BOTTOM
        } else if y >= H {
            BlockSide::TOP
        } else {
            return self.center.get_block_safe(x, y, z, Block::AIR);
        };

        match self.neighbors[side as usize] {
            Some(chunk) => chunk.get_block_safe(
                x.rem_euclid(W),
                y.rem_euclid(H),
                z.rem_euclid(D),
                Block::AIR,
            ),
            None => Block::AIR,
        }
    }
}

/// Builds chunk meshes.
///
/// Stateless apart from the shared biome color table, so every worker can hold
/// its own clone.
#[derive(Clone)]
pub struct MeshBuilder {
    biome_colors: Arc<BiomeColorTable>,
}

impl MeshBuilder {
    /// Creates a builder that tints faces from `biome_colors`.
    pub fn new(biome_colors: Arc<BiomeColorTable>) -> Self {
        Self { biome_colors }
    }

    /// Emits the visible faces of the center chunk of `neighborhood`.
    ///
    /// # Arguments
    /// * `position` - Chunk coordinate, used to place vertices in world space
    /// * `neighborhood` - The chunk and its loaded neighbors
    /// * `out` - Scratch storage to append vertices to
    ///
    /// # Returns
    /// The number of vertices emitted.
    pub fn build(
        &self,
        position: Point3<i32>,
        neighborhood: &ChunkNeighborhood<'_>,
        out: &mut ScratchWriter<'_>,
    ) -> usize {
        let chunk = neighborhood.center;
        let mask = chunk.primary_bitmask();
        if mask == 0 {
            return 0;
        }

        let blocks = chunk.blocks();
        let mut faces = FaceWriter::new(out);
        let start = faces.len();

        let origin_x = (position.x * CHUNK_WIDTH as i32) as f32;
        let origin_y = (position.y * CHUNK_HEIGHT as i32) as f32;
        let origin_z = (position.z * CHUNK_DEPTH as i32) as f32;

        for z in 0..CHUNK_DEPTH {
            let center_z = origin_z + z as f32 + 0.5;

            for section in (0..SECTION_COUNT).filter(|section| mask & (1 << section) != 0) {
                for y in section * SECTION_HEIGHT..(section + 1) * SECTION_HEIGHT {
                    let center_y = origin_y + y as f32 + 0.5;

                    let mut left = neighborhood.block_at(-1, y as i32, z as i32);
                    let mut current = blocks[to_flat(0, y, z)];

                    for x in 0..CHUNK_WIDTH {
                        let right = if x + 1 < CHUNK_WIDTH {
                            blocks[to_flat(x + 1, y, z)]
                        } else {
                            neighborhood.block_at(CHUNK_WIDTH as i32, y as i32, z as i32)
                        };

                        if !current.is_air() {
                            let ctx = BlockContext {
                                block: current,
                                center: [origin_x + x as f32 + 0.5, center_y, center_z],
                                neighbors: self.neighbors(neighborhood, blocks, x, y, z, left, right),
                                biome: self.biome_colors.get(chunk.biome_at(x, z)),
                            };
                            faces.reserve_block();
                            model_for(current.id()).emit_faces(&ctx, &mut faces);
                        }

                        left = current;
                        current = right;
                    }
                }
            }
        }

        faces.len() - start
    }

    /// Gathers the six neighbors of `(x, y, z)`, indexed by `BlockSide`.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    fn neighbors(
        &self,
        neighborhood: &ChunkNeighborhood<'_>,
        blocks: &[Block],
        x: usize,
        y: usize,
        z: usize,
        left: Block,
        right: Block,
    ) -> [Block; 6] {
        let (xi, yi, zi) = (x as i32, y as i32, z as i32);

        let front = if z + 1 < CHUNK_DEPTH {
            blocks[to_flat(x, y, z + 1)]
        } else {
            neighborhood.block_at(xi, yi, zi + 1)
        };
        let back = if z > 0 {
            blocks[to_flat(x, y, z - 1)]
        } else {
            neighborhood.block_at(xi, yi, zi - 1)
        };
        let bottom = if y > 0 {
            blocks[to_flat(x, y - 1, z)]
        } else {
            neighborhood.block_at(xi, yi - 1, zi)
        };
        let top = if y + 1 < CHUNK_HEIGHT {
            blocks[to_flat(x, y + 1, z)]
        } else {
            neighborhood.block_at(xi, yi + 1, zi)
        };

        //  FRONT  BACK  BOTTOM  TOP  LEFT  RIGHT
        [front, back, bottom, top, left, right]
    }
}
