//! # World Module
//!
//! This module provides the `World` struct which manages the chunks of the voxel
//! world and drives their meshes through the worker pool to the GPU.
//!
//! ## Architecture
//!
//! The world uses sparse storage: a hash map from chunk coordinate to chunk.
//! Chunks are shared with the mesh workers through `MtResource` handles, so a
//! worker can read a chunk and its neighbors while the render thread keeps
//! editing others.
//!
//! Chunk coordinates address 16x256x16 columns. A world block coordinate maps
//! to its chunk by floor division (`x >> 4`, `y >> 8`, `z >> 4`) and to the
//! block inside the chunk by floor modulo, so negative coordinates land in the
//! chunk below rather than being truncated toward zero.
//!
//! ## Frame Flow
//!
//! `draw` is called once per frame on the render thread:
//! 1. Finished meshes are uploaded and their scratch buffers handed back
//! 2. Dirty chunks are submitted to the workers without blocking
//! 3. Chunks with a mesh are frustum culled and drawn
//!
//! ## Thread Safety
//!
//! All methods must be called from the render thread. GPU handles, the GPU
//! byte count, and the chunk map are only touched there.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};

use crate::{
    config::WorldConfig,
    core::MtResource,
    engine_state::{
        buffer_state::{GpuBufferHandle, RenderBackend},
        camera_state::ViewFrustum,
        rendering::meshing::MeshBuilder,
        task_management::{MeshJob, MeshResult, MeshWorkerPool},
        voxels::{
            biome::BiomeColorTable,
            block::{block_side::BlockSide, Block},
            chunk::{
                Chunk, ChunkMesh, BIOME_COUNT, CHUNK_DEPTH, CHUNK_DEPTH_LOG2, CHUNK_HEIGHT,
                CHUNK_HEIGHT_LOG2, CHUNK_WIDTH, CHUNK_WIDTH_LOG2,
            },
        },
    },
    error::{QueueError, WorldError},
};

/// Splits a world block coordinate into its chunk coordinate and the
/// chunk-local coordinate inside that chunk.
#[inline]
pub fn world_to_chunk(x: i32, y: i32, z: i32) -> (Point3<i32>, (usize, usize, usize)) {
    (
        Point3::new(
            x >> CHUNK_WIDTH_LOG2,
            y >> CHUNK_HEIGHT_LOG2,
            z >> CHUNK_DEPTH_LOG2,
        ),
        (
            (x & (CHUNK_WIDTH as i32 - 1)) as usize,
            (y & (CHUNK_HEIGHT as i32 - 1)) as usize,
            (z & (CHUNK_DEPTH as i32 - 1)) as usize,
        ),
    )
}

/// World-space bounding box of the chunk at `position`.
pub fn chunk_bounds(position: Point3<i32>) -> (Point3<f32>, Point3<f32>) {
    let min = Point3::new(
        (position.x * CHUNK_WIDTH as i32) as f32,
        (position.y * CHUNK_HEIGHT as i32) as f32,
        (position.z * CHUNK_DEPTH as i32) as f32,
    );
    let max = Point3::new(
        min.x + CHUNK_WIDTH as f32,
        min.y + CHUNK_HEIGHT as f32,
        min.z + CHUNK_DEPTH as f32,
    );
    (min, max)
}

/// What one call to `World::draw` did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Finished meshes uploaded to the GPU.
    pub uploaded: usize,
    /// Finished meshes thrown away because their chunk was removed.
    pub discarded: usize,
    /// Mesh jobs handed to the workers.
    pub submitted: usize,
    /// Dirty chunks left for a later frame because the input queue was full.
    pub deferred: usize,
    /// Chunks drawn.
    pub drawn: usize,
    /// Chunks with a mesh that were outside the frustum.
    pub culled: usize,
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_mesher::config::WorldConfig;
/// use voxel_mesher::engine_state::voxels::{biome::BiomeColorTable, block::Block, world::World};
///
/// let mut world = World::new(WorldConfig::default(), BiomeColorTable::default())?;
/// world.add_chunk(Point3::new(0, 0, 0));
///
/// world.set_block(3, 64, -1, Block::new(1, 0)).ok(); // chunk (0, 0, -1) is not loaded
/// assert!(world.set_block(3, 64, 1, Block::new(1, 0))?);
/// assert_eq!(world.get_block(3, 64, 1)?, Block::new(1, 0));
/// # Ok::<(), voxel_mesher::error::WorldError>(())
/// ```
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
    /// World block coordinate players spawn at.
    spawn: Point3<i32>,
    biome_colors: Arc<BiomeColorTable>,
    workers: MeshWorkerPool,
    /// Bytes of vertex data currently on the GPU.
    gpu_memory: u64,
    /// Meshes of replaced chunks, destroyed on the next `draw`.
    retired_meshes: Vec<ChunkMesh>,
}

impl World {
    /// Creates an empty world and starts its mesh workers.
    ///
    /// # Arguments
    ///
    /// * `config` - Worker pool and queue configuration
    /// * `biome_colors` - Colormap coordinates for biome-tinted faces
    ///
    /// # Errors
    ///
    /// `WorldError::Config` for an invalid configuration,
    /// `WorldError::WorkerSpawn` if a worker thread cannot be started.
    pub fn new(config: WorldConfig, biome_colors: BiomeColorTable) -> Result<Self, WorldError> {
        config.validate()?;
        let biome_colors = Arc::new(biome_colors);
        let workers = MeshWorkerPool::new(&config, MeshBuilder::new(biome_colors.clone()))?;

        Ok(World {
            chunks: HashMap::new(),
            spawn: Point3::new(0, 0, 0),
            biome_colors,
            workers,
            gpu_memory: 0,
            retired_meshes: Vec::new(),
        })
    }

    /// Adds an empty chunk at `position` if none exists. A new chunk starts
    /// dirty so it receives an (empty) mesh.
    ///
    /// # Returns
    ///
    /// The chunk at `position`, new or existing.
    pub fn add_chunk(&mut self, position: Point3<i32>) -> MtResource<Chunk> {
        self.chunks
            .entry(position)
            .or_insert_with(|| {
                let chunk = Chunk::new();
                chunk.mark_dirty();
                MtResource::new(chunk)
            })
            .clone()
    }

    /// Inserts `chunk` at `position`, replacing any chunk already there.
    ///
    /// The chunk and its neighbors are marked dirty. A replaced chunk's GPU
    /// mesh is released on the next `draw`.
    pub fn insert_chunk(&mut self, position: Point3<i32>, chunk: Chunk) -> MtResource<Chunk> {
        chunk.mark_dirty();
        let handle = MtResource::new(chunk);
        if let Some(previous) = self.chunks.insert(position, handle.clone()) {
            self.retired_meshes.push(previous.get().take_mesh());
        }
        self.mark_surrounding_chunks_dirty(position);
        handle
    }

    /// Loads decoded block data into the chunk at `position`, creating it if
    /// needed.
    ///
    /// # Arguments
    ///
    /// * `position` - Chunk coordinate
    /// * `blocks` - Exactly `CHUNK_VOLUME` blocks in flat-index order
    /// * `primary_bitmask` - Non-empty sections as sent with the data, or
    ///   `None` to derive it from the blocks
    /// * `biomes` - Per-column biome ids, if sent
    pub fn load_chunk(
        &mut self,
        position: Point3<i32>,
        blocks: Box<[Block]>,
        primary_bitmask: Option<u16>,
        biomes: Option<&[u8; BIOME_COUNT]>,
    ) -> MtResource<Chunk> {
        let handle = self.add_chunk(position);
        {
            let mut chunk = handle.get_mut();
            match primary_bitmask {
                Some(mask) => chunk.fill_with_bitmask(blocks, mask),
                None => chunk.fill(blocks),
            }
            if let Some(biomes) = biomes {
                chunk.set_biomes(biomes);
            }
        }
        self.mark_surrounding_chunks_dirty(position);
        handle
    }

    /// Releases the block storage of the chunk at `position`, keeping the
    /// chunk itself loaded as air.
    ///
    /// # Returns
    ///
    /// `false` if no chunk is loaded there.
    pub fn unload_chunk(&mut self, position: Point3<i32>) -> bool {
        let Some(chunk) = self.chunks.get(&position) else {
            return false;
        };
        chunk.get_mut().empty();
        self.mark_surrounding_chunks_dirty(position);
        true
    }

    /// Removes the chunk at `position` and releases its GPU mesh.
    ///
    /// Meshes still in flight for the chunk are discarded when they arrive.
    ///
    /// # Returns
    ///
    /// `false` if no chunk is loaded there.
    pub fn remove_chunk<B: RenderBackend + ?Sized>(
        &mut self,
        position: Point3<i32>,
        backend: &mut B,
    ) -> bool {
        let Some(chunk) = self.chunks.remove(&position) else {
            return false;
        };
        let mesh = chunk.get().take_mesh();
        self.release_mesh(backend, mesh);
        self.mark_surrounding_chunks_dirty(position);
        true
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    ///
    /// # Returns
    ///
    /// A clone of the `MtResource<Chunk>` if the chunk exists, or `None` if not.
    pub fn get_chunk(&self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of every loaded chunk.
    pub fn chunk_positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Gets the block at a world coordinate.
    ///
    /// # Errors
    ///
    /// `WorldError::NoChunk` if the containing chunk is not loaded.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        let (position, (lx, ly, lz)) = world_to_chunk(x, y, z);
        let chunk = self
            .chunks
            .get(&position)
            .ok_or(WorldError::NoChunk { position })?;
        let block = chunk
            .get()
            .get_block_safe(lx as i32, ly as i32, lz as i32, Block::AIR);
        Ok(block)
    }

    /// Gets the block at a world coordinate, or `default` if the containing
    /// chunk is not loaded.
    pub fn get_block_safe(&self, x: i32, y: i32, z: i32, default: Block) -> Block {
        let (position, (lx, ly, lz)) = world_to_chunk(x, y, z);
        match self.chunks.get(&position) {
            Some(chunk) => chunk
                .get()
                .get_block_safe(lx as i32, ly as i32, lz as i32, default),
            None => default,
        }
    }

    /// Writes the block at a world coordinate.
    ///
    /// If the block changed, the chunk and its six face-adjacent neighbors are
    /// marked dirty.
    ///
    /// # Returns
    ///
    /// Whether the block changed.
    ///
    /// # Errors
    ///
    /// `WorldError::NoChunk` if the containing chunk is not loaded.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) -> Result<bool, WorldError> {
        let (position, (lx, ly, lz)) = world_to_chunk(x, y, z);
        let chunk = self
            .chunks
            .get(&position)
            .ok_or(WorldError::NoChunk { position })?;

        let changed = chunk.get_mut().set_block(lx, ly, lz, block);
        if changed {
            self.mark_surrounding_chunks_dirty(position);
        }
        Ok(changed)
    }

    /// Marks the chunk at `position` dirty.
    ///
    /// # Returns
    ///
    /// `false` if no chunk is loaded there.
    pub fn mark_chunk_dirty(&self, position: Point3<i32>) -> bool {
        match self.chunks.get(&position) {
            Some(chunk) => {
                chunk.get().mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Marks the six face-adjacent neighbors of `position` dirty. Diagonal
    /// neighbors and the chunk itself are left alone.
    pub fn mark_surrounding_chunks_dirty(&self, position: Point3<i32>) {
        for side in BlockSide::all() {
            self.mark_chunk_dirty(position + side.offset());
        }
    }

    /// World block coordinate players spawn at.
    pub fn spawn(&self) -> Point3<i32> {
        self.spawn
    }

    /// Sets the spawn location.
    pub fn set_spawn(&mut self, spawn: Point3<i32>) {
        self.spawn = spawn;
    }

    /// The biome color table shared with the mesh workers.
    pub fn biome_colors(&self) -> &Arc<BiomeColorTable> {
        &self.biome_colors
    }

    /// Bytes of vertex data currently on the GPU.
    pub fn gpu_memory(&self) -> u64 {
        self.gpu_memory
    }

    /// Mesh jobs submitted and not yet finished by a worker.
    pub fn pending_jobs(&self) -> usize {
        self.workers.pending_jobs()
    }

    /// Runs one frame of the mesh pipeline and records draws for every visible
    /// chunk.
    ///
    /// # Arguments
    ///
    /// * `backend` - Where meshes are uploaded and draws recorded
    /// * `frustum` - View frustum for culling
    pub fn draw<B, F>(&mut self, backend: &mut B, frustum: &F) -> DrawStats
    where
        B: RenderBackend + ?Sized,
        F: ViewFrustum + ?Sized,
    {
        let mut stats = DrawStats::default();

        for mesh in std::mem::take(&mut self.retired_meshes) {
            self.release_mesh(backend, mesh);
        }

        while let Some(result) = self.workers.try_recv_result() {
            let live = self
                .chunks
                .get(&result.position)
                .is_some_and(|chunk| chunk.ptr_eq(&result.chunk));

            if live {
                self.upload(backend, &result);
                stats.uploaded += 1;
            } else {
                result.chunk.get().job_finished();
                debug!("Discarding mesh for removed chunk {:?}", result.position);
                stats.discarded += 1;
            }

            if let Err(error) = result.buffer.mark_available() {
                warn!("Could not return scratch buffer: {error}");
            }
            self.workers.result_done();
        }

        for (&position, chunk) in &self.chunks {
            {
                let chunk = chunk.get();
                if !chunk.take_dirty() {
                    continue;
                }
                chunk.set_tessellated(false);
                chunk.job_submitted();
            }

            let job = MeshJob {
                chunk: chunk.clone(),
                position,
                neighbors: self.neighbor_handles(position),
            };
            match self.workers.submit(job) {
                Ok(()) => stats.submitted += 1,
                Err(error) => {
                    // Not queued: keep the chunk dirty so a later frame retries.
                    let chunk = chunk.get();
                    chunk.job_finished();
                    chunk.mark_dirty();
                    stats.deferred += 1;
                    if !matches!(error, QueueError::Full(_)) {
                        warn!("Mesh job for chunk {position:?} rejected: {error}");
                    }
                }
            }
        }

        for (&position, chunk) in &self.chunks {
            let mesh = chunk.get().mesh();
            let Some(handle) = mesh.buffer else {
                continue;
            };
            let (min, max) = chunk_bounds(position);
            if frustum.intersects_aabb(min, max) {
                backend.draw(handle, mesh.vertex_count);
                stats.drawn += 1;
            } else {
                stats.culled += 1;
            }
        }

        stats
    }

    /// Stops the mesh workers, then releases every chunk and GPU mesh.
    pub fn shutdown<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.workers.shutdown();

        for mesh in std::mem::take(&mut self.retired_meshes) {
            self.release_mesh(backend, mesh);
        }
        let chunks: Vec<_> = self.chunks.drain().map(|(_, chunk)| chunk).collect();
        for chunk in chunks {
            let mesh = chunk.get().take_mesh();
            self.release_mesh(backend, mesh);
        }
        info!("World shut down");
    }

    fn upload<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, result: &MeshResult) {
        let chunk = result.chunk.get();
        let newest = chunk.job_finished();

        let mesh = if result.vertex_count == 0 {
            ChunkMesh::default()
        } else {
            let vertices = match result.buffer.vertices() {
                Ok(vertices) => vertices,
                Err(error) => {
                    warn!("Mesh for chunk {:?} lost: {error}", result.position);
                    chunk.mark_dirty();
                    return;
                }
            };
            let bytes: &[u8] = bytemuck::cast_slice(&*vertices);
            let label = format!(
                "Chunk ({}, {}, {})",
                result.position.x, result.position.y, result.position.z
            );
            ChunkMesh {
                buffer: Some(backend.create_vertex_buffer(&label, bytes)),
                vertex_count: result.vertex_count as u32,
                bytes: bytes.len() as u64,
            }
        };

        debug!(
            "Uploaded {} vertices for chunk {:?}",
            mesh.vertex_count, result.position
        );
        self.gpu_memory += mesh.bytes;
        let previous = chunk.replace_mesh(mesh);
        chunk.set_tessellated(newest);
        drop(chunk);

        self.release_mesh(backend, previous);
    }

    fn release_mesh<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, mesh: ChunkMesh) {
        if let Some(handle) = mesh.buffer {
            backend.destroy_buffer(handle);
            self.gpu_memory = self.gpu_memory.saturating_sub(mesh.bytes);
        }
    }

    fn neighbor_handles(&self, position: Point3<i32>) -> [Option<MtResource<Chunk>>; 6] {
        BlockSide::all().map(|side| self.chunks.get(&(position + side.offset())).cloned())
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.workers.shutdown();

        let leaked: Vec<GpuBufferHandle> = self
            .chunks
            .values()
            .filter_map(|chunk| chunk.get().mesh().buffer)
            .chain(self.retired_meshes.iter().filter_map(|mesh| mesh.buffer))
            .collect();
        if !leaked.is_empty() {
            warn!(
                "World dropped without shutdown; {} GPU buffers ({} bytes) leaked",
                leaked.len(),
                self.gpu_memory
            );
        }
    }
}
