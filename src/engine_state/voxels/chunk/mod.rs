//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense 16x256x16 column of blocks
//! together with per-column biome indices, a bitmask of non-empty vertical
//! sections, dirty tracking, and the GPU mesh slot the render thread fills in.
//!
//! ## Memory Optimization
//!
//! Chunks that contain nothing but air do not own any block storage. They all
//! reference a single process-wide, read-only air array. The first mutation that
//! writes a non-air block allocates a private array (copy-on-first-write), and
//! unloading a chunk drops its private array and returns it to the shared one.
//! The shared array is reference counted: it is allocated when the first empty
//! chunk is created and freed once no chunk references it.
//!
//! ## Snapshots
//!
//! Private arrays are reference counted as well. `Chunk::snapshot` hands a mesh
//! worker a read-only view that shares the array, so the worker never holds the
//! chunk lock while it builds. A write while a snapshot is alive copies the
//! array first.
//!
//! ## Indexing
//!
//! Blocks are laid out x-fastest, then y, then z:
//! `index = x + y * WIDTH + z * WIDTH * HEIGHT`. All three dimensions are
//! powers of two, so the inverse mapping is done with shifts and masks using
//! the `*_LOG2` constants.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::Mutex;

use crate::core::memory::{ByteCounter, MemoryCounters};
use crate::engine_state::buffer_state::GpuBufferHandle;

use super::block::Block;

/// log2 of the chunk width (x).
pub const CHUNK_WIDTH_LOG2: u32 = 4;
/// log2 of the chunk height (y).
pub const CHUNK_HEIGHT_LOG2: u32 = 8;
/// log2 of the chunk depth (z).
pub const CHUNK_DEPTH_LOG2: u32 = 4;

/// Chunk width in blocks (x).
pub const CHUNK_WIDTH: usize = 1 << CHUNK_WIDTH_LOG2;
/// Chunk height in blocks (y).
pub const CHUNK_HEIGHT: usize = 1 << CHUNK_HEIGHT_LOG2;
/// Chunk depth in blocks (z).
pub const CHUNK_DEPTH: usize = 1 << CHUNK_DEPTH_LOG2;
/// Number of blocks in one horizontal layer.
pub const CHUNK_LAYER_SIZE: usize = CHUNK_WIDTH * CHUNK_DEPTH;
/// Number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_DEPTH;

/// log2 of the height of one vertical section.
pub const SECTION_HEIGHT_LOG2: u32 = 4;
/// Height of one vertical section tracked by the primary bitmask.
pub const SECTION_HEIGHT: usize = 1 << SECTION_HEIGHT_LOG2;
/// Number of vertical sections in a chunk (one bit each in the primary bitmask).
pub const SECTION_COUNT: usize = CHUNK_HEIGHT / SECTION_HEIGHT;

/// Number of biome entries, one per (x, z) column.
pub const BIOME_COUNT: usize = CHUNK_WIDTH * CHUNK_DEPTH;

/// Name of the counter tracking bytes of privately owned chunk block storage.
pub const CHUNK_STORAGE_COUNTER: &str = "chunk_blocks";

const STORAGE_BYTES: u64 = (CHUNK_VOLUME * std::mem::size_of::<Block>()) as u64;

/// Converts chunk-local coordinates to a flat block index.
#[inline]
pub const fn to_flat(x: usize, y: usize, z: usize) -> usize {
    x | (y << CHUNK_WIDTH_LOG2) | (z << (CHUNK_WIDTH_LOG2 + CHUNK_HEIGHT_LOG2))
}

/// Converts a flat block index back to chunk-local `(x, y, z)` coordinates.
#[inline]
pub const fn from_flat(index: usize) -> (usize, usize, usize) {
    (
        index & (CHUNK_WIDTH - 1),
        (index >> CHUNK_WIDTH_LOG2) & (CHUNK_HEIGHT - 1),
        index >> (CHUNK_WIDTH_LOG2 + CHUNK_HEIGHT_LOG2),
    )
}

/// Returns `true` if the signed local coordinates lie inside a chunk.
#[inline]
pub const fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    x >= 0
        && y >= 0
        && z >= 0
        && (x as usize) < CHUNK_WIDTH
        && (y as usize) < CHUNK_HEIGHT
        && (z as usize) < CHUNK_DEPTH
}

static SHARED_AIR: Mutex<Option<Weak<[Block]>>> = parking_lot::const_mutex(None);

/// Returns the process-wide read-only air array, allocating it if no chunk
/// currently holds it.
fn shared_air() -> Arc<[Block]> {
    let mut slot = SHARED_AIR.lock();
    if let Some(air) = slot.as_ref().and_then(Weak::upgrade) {
        return air;
    }
    let air: Arc<[Block]> = Arc::from(vec![Block::AIR; CHUNK_VOLUME]);
    *slot = Some(Arc::downgrade(&air));
    air
}

/// A privately owned block array, reported to the chunk storage counter for as
/// long as it lives.
struct OwnedBlocks {
    blocks: Box<[Block]>,
    counter: Arc<ByteCounter>,
}

impl OwnedBlocks {
    fn adopt(blocks: Box<[Block]>) -> Self {
        let counter = MemoryCounters::global().counter(CHUNK_STORAGE_COUNTER);
        counter.add(STORAGE_BYTES);
        Self { blocks, counter }
    }
}

impl Clone for OwnedBlocks {
    fn clone(&self) -> Self {
        Self::adopt(self.blocks.clone())
    }
}

impl Drop for OwnedBlocks {
    fn drop(&mut self) {
        self.counter.sub(STORAGE_BYTES);
    }
}

#[derive(Clone)]
enum BlockStorage {
    /// The shared all-air array. Never written through.
    Shared(Arc<[Block]>),
    /// Storage owned by this chunk, possibly still shared with snapshots.
    Owned(Arc<OwnedBlocks>),
}

/// GPU-side state of a chunk's mesh. Only the render thread touches this.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMesh {
    /// The vertex buffer holding the uploaded mesh, if any.
    pub buffer: Option<GpuBufferHandle>,
    /// Number of vertices to draw from `buffer`.
    pub vertex_count: u32,
    /// Size of `buffer` in bytes, for GPU memory accounting.
    pub bytes: u64,
}

/// A 16x256x16 column of blocks.
///
/// The dirty and tessellated flags are atomics and the mesh slot has its own
/// lock, so the render thread can update them through a shared reference while
/// workers hold read access to the block data.
pub struct Chunk {
    storage: BlockStorage,
    /// Biome index per column, indexed `x + z * CHUNK_WIDTH`.
    biomes: Box<[u8; BIOME_COUNT]>,
    /// Bit `b` set means section `b` contains at least one non-air block.
    primary_bitmask: u16,
    dirty: AtomicBool,
    tessellated: AtomicBool,
    /// Mesh jobs submitted but not yet uploaded or discarded.
    pending_jobs: AtomicU32,
    mesh: Mutex<ChunkMesh>,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    /// Creates an empty chunk referencing the shared air array.
    pub fn new() -> Self {
        Self {
            storage: BlockStorage::Shared(shared_air()),
            biomes: Box::new([0; BIOME_COUNT]),
            primary_bitmask: 0,
            dirty: AtomicBool::new(false),
            tessellated: AtomicBool::new(false),
            pending_jobs: AtomicU32::new(0),
            mesh: Mutex::new(ChunkMesh::default()),
        }
    }

    /// All blocks of this chunk in flat-index order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        match &self.storage {
            BlockStorage::Shared(air) => air,
            BlockStorage::Owned(owned) => &owned.blocks,
        }
    }

    /// Copies the block data, bitmask and biomes without copying the block
    /// array. The copy starts clean, with no jobs and no mesh.
    pub fn snapshot(&self) -> Chunk {
        Self {
            storage: self.storage.clone(),
            biomes: self.biomes.clone(),
            primary_bitmask: self.primary_bitmask,
            dirty: AtomicBool::new(false),
            tessellated: AtomicBool::new(false),
            pending_jobs: AtomicU32::new(0),
            mesh: Mutex::new(ChunkMesh::default()),
        }
    }

    /// Returns `true` while the chunk references the shared air array.
    pub fn is_empty(&self) -> bool {
        matches!(self.storage, BlockStorage::Shared(_))
    }

    /// Gets the block at chunk-local coordinates.
    ///
    /// The chunk must not be empty and the coordinates must be in bounds. Both
    /// are caller contracts checked only in debug builds.
    #[inline]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        debug_assert!(!self.is_empty(), "get_block on an empty chunk");
        debug_assert!(
            x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH,
            "chunk-local coordinate ({x}, {y}, {z}) out of bounds"
        );
        self.blocks()[to_flat(x, y, z)]
    }

    /// Gets the block at signed chunk-local coordinates, or `default` when they
    /// fall outside the chunk. Never fails, also on empty chunks.
    #[inline]
    pub fn get_block_safe(&self, x: i32, y: i32, z: i32, default: Block) -> Block {
        if in_bounds(x, y, z) {
            self.blocks()[to_flat(x as usize, y as usize, z as usize)]
        } else {
            default
        }
    }

    /// Writes a block at chunk-local coordinates.
    ///
    /// The chunk is marked dirty only if the stored block actually changed
    /// (id or metadata). Writing a non-air block into an empty chunk first
    /// allocates private storage.
    ///
    /// # Returns
    /// `true` if the block changed.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, value: Block) -> bool {
        debug_assert!(
            x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH,
            "chunk-local coordinate ({x}, {y}, {z}) out of bounds"
        );
        let index = to_flat(x, y, z);
        let current = self.blocks()[index];

        if current == value {
            // Same block; keep any new light values if we own the storage.
            if let BlockStorage::Owned(owned) = &mut self.storage {
                Arc::make_mut(owned).blocks[index] = value;
            }
            return false;
        }

        self.make_owned()[index] = value;
        self.update_section_bit(y >> SECTION_HEIGHT_LOG2, value);
        self.mark_dirty();
        true
    }

    /// Adopts an externally allocated block array and derives the primary
    /// bitmask from its contents.
    ///
    /// # Panics
    /// Panics if `blocks` does not hold exactly `CHUNK_VOLUME` entries.
    pub fn fill(&mut self, blocks: Box<[Block]>) {
        assert_eq!(blocks.len(), CHUNK_VOLUME, "chunk payload has the wrong length");
        let mask = compute_primary_bitmask(&blocks);
        self.adopt(blocks, mask);
    }

    /// Adopts an externally allocated block array together with the primary
    /// bitmask that came with it. The mask is taken verbatim and decides which
    /// sections the tessellator visits.
    ///
    /// # Panics
    /// Panics if `blocks` does not hold exactly `CHUNK_VOLUME` entries.
    pub fn fill_with_bitmask(&mut self, blocks: Box<[Block]>, primary_bitmask: u16) {
        assert_eq!(blocks.len(), CHUNK_VOLUME, "chunk payload has the wrong length");
        self.adopt(blocks, primary_bitmask);
    }

    /// Replaces the contents with a freshly zeroed (all-air) private array.
    pub fn fill_zeroed(&mut self) {
        self.adopt(vec![Block::AIR; CHUNK_VOLUME].into_boxed_slice(), 0);
    }

    /// Releases private storage and reverts to the shared air array.
    ///
    /// The chunk is marked dirty so its (now empty) mesh gets rebuilt.
    pub fn empty(&mut self) {
        self.storage = BlockStorage::Shared(shared_air());
        self.primary_bitmask = 0;
        self.mark_dirty();
    }

    fn adopt(&mut self, blocks: Box<[Block]>, primary_bitmask: u16) {
        self.storage = BlockStorage::Owned(Arc::new(OwnedBlocks::adopt(blocks)));
        self.primary_bitmask = primary_bitmask;
        self.mark_dirty();
    }

    fn make_owned(&mut self) -> &mut [Block] {
        if let BlockStorage::Shared(_) = self.storage {
            let blocks = vec![Block::AIR; CHUNK_VOLUME].into_boxed_slice();
            self.storage = BlockStorage::Owned(Arc::new(OwnedBlocks::adopt(blocks)));
        }
        match &mut self.storage {
            BlockStorage::Owned(owned) => &mut Arc::make_mut(owned).blocks,
            BlockStorage::Shared(_) => unreachable!("storage was just made owned"),
        }
    }

    fn update_section_bit(&mut self, section: usize, written: Block) {
        let bit = 1u16 << section;
        if !written.is_air() {
            self.primary_bitmask |= bit;
        } else if self.primary_bitmask & bit != 0 && !section_has_blocks(self.blocks(), section) {
            self.primary_bitmask &= !bit;
        }
    }

    /// The primary bitmask of non-empty sections.
    pub fn primary_bitmask(&self) -> u16 {
        self.primary_bitmask
    }

    /// Replaces every biome index.
    pub fn set_biomes(&mut self, biomes: &[u8; BIOME_COUNT]) {
        self.biomes.copy_from_slice(biomes);
    }

    /// Biome index of the column at `(x, z)`.
    #[inline]
    pub fn biome_at(&self, x: usize, z: usize) -> u8 {
        self.biomes[x + z * CHUNK_WIDTH]
    }

    /// Returns `true` if the mesh is stale and must be rebuilt.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Flags the mesh as stale.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clears the dirty flag, returning whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Returns `true` if the current mesh is valid and not stale.
    pub fn is_tessellated(&self) -> bool {
        self.tessellated.load(Ordering::Acquire)
    }

    /// Sets the tessellated flag.
    pub fn set_tessellated(&self, tessellated: bool) {
        self.tessellated.store(tessellated, Ordering::Release);
    }

    /// Records that a mesh job for this chunk entered the pipeline.
    pub fn job_submitted(&self) {
        self.pending_jobs.fetch_add(1, Ordering::AcqRel);
    }

    /// Records that a mesh job for this chunk left the pipeline.
    ///
    /// # Returns
    /// `true` if no other job for this chunk is still in flight, i.e. the mesh
    /// being uploaded is the newest one.
    pub fn job_finished(&self) -> bool {
        let previous = self
            .pending_jobs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pending| {
                Some(pending.saturating_sub(1))
            })
            .unwrap_or(0);
        previous <= 1
    }

    /// Number of mesh jobs in flight for this chunk.
    pub fn pending_jobs(&self) -> u32 {
        self.pending_jobs.load(Ordering::Acquire)
    }

    /// Snapshot of the GPU mesh slot.
    pub fn mesh(&self) -> ChunkMesh {
        *self.mesh.lock()
    }

    /// Number of vertices in the uploaded mesh.
    pub fn vertex_count(&self) -> u32 {
        self.mesh.lock().vertex_count
    }

    /// Stores a new GPU mesh, returning the one it replaces.
    pub fn replace_mesh(&self, mesh: ChunkMesh) -> ChunkMesh {
        std::mem::replace(&mut *self.mesh.lock(), mesh)
    }

    /// Takes the GPU mesh out of the chunk, leaving it without one.
    pub fn take_mesh(&self) -> ChunkMesh {
        std::mem::take(&mut *self.mesh.lock())
    }
}

/// Computes the primary bitmask of a full block array.
pub fn compute_primary_bitmask(blocks: &[Block]) -> u16 {
    (0..SECTION_COUNT)
        .filter(|&section| section_has_blocks(blocks, section))
        .fold(0u16, |mask, section| mask | (1 << section))
}

fn section_has_blocks(blocks: &[Block], section: usize) -> bool {
    let y_range = section * SECTION_HEIGHT..(section + 1) * SECTION_HEIGHT;
    (0..CHUNK_DEPTH).any(|z| {
        y_range.clone().any(|y| {
            let row = to_flat(0, y, z);
            blocks[row..row + CHUNK_WIDTH].iter().any(|block| !block.is_air())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn solid_blocks(block: Block) -> Box<[Block]> {
        vec![block; CHUNK_VOLUME].into_boxed_slice()
    }

    #[test]
    fn test_flat_index_is_a_bijection() {
        for index in 0..CHUNK_VOLUME {
            let (x, y, z) = from_flat(index);
            assert!(x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH);
            assert_eq!(to_flat(x, y, z), index);
        }
        assert_eq!(to_flat(1, 0, 0), 1);
        assert_eq!(to_flat(0, 1, 0), CHUNK_WIDTH);
        assert_eq!(to_flat(0, 0, 1), CHUNK_WIDTH * CHUNK_HEIGHT);
    }

    #[test]
    fn test_new_chunk_is_empty_and_shares_air() {
        let a = Chunk::new();
        let b = Chunk::new();
        assert!(a.is_empty());
        assert_eq!(a.primary_bitmask(), 0);
        assert!(std::ptr::eq(a.blocks().as_ptr(), b.blocks().as_ptr()));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let mut chunk = Chunk::new();
        for _ in 0..256 {
            let (x, y, z) = (
                fastrand::usize(..CHUNK_WIDTH),
                fastrand::usize(..CHUNK_HEIGHT),
                fastrand::usize(..CHUNK_DEPTH),
            );
            let block = Block::new(fastrand::u16(1..4096), fastrand::u8(..16));
            chunk.set_block(x, y, z, block);
            assert_eq!(chunk.get_block(x, y, z), block);
        }
    }

    #[test]
    fn test_first_write_allocates_private_storage() {
        let mut chunk = Chunk::new();
        let other = Chunk::new();

        assert!(chunk.set_block(3, 40, 5, Block::of(BlockType::STONE, 0)));

        assert!(!chunk.is_empty());
        assert!(other.is_empty());
        assert!(other.blocks().iter().all(|block| block.is_air()));
        assert_eq!(chunk.primary_bitmask(), 1 << 2);
    }

    #[test]
    fn test_writing_air_into_empty_chunk_is_a_no_op() {
        let mut chunk = Chunk::new();
        assert!(!chunk.set_block(0, 0, 0, Block::AIR));
        assert!(chunk.is_empty());
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_dirty_only_on_change() {
        let mut chunk = Chunk::new();
        chunk.fill_zeroed();
        chunk.take_dirty();

        let stone = Block::of(BlockType::STONE, 0);
        assert!(chunk.set_block(1, 1, 1, stone));
        assert!(chunk.take_dirty());

        assert!(!chunk.set_block(1, 1, 1, stone));
        assert!(!chunk.is_dirty());

        // A light-only difference is not a change.
        assert!(!chunk.set_block(1, 1, 1, stone.with_light(4, 9)));
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.get_block(1, 1, 1).sky_light(), 9);
    }

    #[test]
    fn test_clearing_last_block_clears_section_bit() {
        let mut chunk = Chunk::new();
        let dirt = Block::of(BlockType::DIRT, 0);
        chunk.set_block(0, 17, 0, dirt);
        chunk.set_block(15, 31, 15, dirt);
        assert_eq!(chunk.primary_bitmask(), 1 << 1);

        chunk.set_block(0, 17, 0, Block::AIR);
        assert_eq!(chunk.primary_bitmask(), 1 << 1);
        chunk.set_block(15, 31, 15, Block::AIR);
        assert_eq!(chunk.primary_bitmask(), 0);
    }

    #[test]
    fn test_fill_computes_bitmask_and_marks_dirty() {
        let mut blocks = vec![Block::AIR; CHUNK_VOLUME];
        blocks[to_flat(0, 0, 0)] = Block::of(BlockType::BEDROCK, 0);
        blocks[to_flat(4, 255, 9)] = Block::of(BlockType::GLASS, 0);

        let mut chunk = Chunk::new();
        chunk.fill(blocks.into_boxed_slice());

        assert!(!chunk.is_empty());
        assert!(chunk.is_dirty());
        assert_eq!(chunk.primary_bitmask(), 1 | (1 << 15));
    }

    #[test]
    fn test_fill_with_bitmask_keeps_supplied_mask() {
        let mut chunk = Chunk::new();
        chunk.fill_with_bitmask(solid_blocks(Block::of(BlockType::STONE, 0)), 0b101);
        assert_eq!(chunk.primary_bitmask(), 0b101);
    }

    #[test]
    fn test_empty_reverts_to_shared_air() {
        let mut chunk = Chunk::new();
        chunk.fill(solid_blocks(Block::of(BlockType::STONE, 0)));
        chunk.take_dirty();

        chunk.empty();

        assert!(chunk.is_empty());
        assert!(chunk.is_dirty());
        assert_eq!(chunk.primary_bitmask(), 0);
        assert_eq!(chunk.get_block_safe(0, 0, 0, Block::of(BlockType::DIRT, 0)), Block::AIR);
    }

    #[test]
    fn test_get_block_safe_returns_default_out_of_range() {
        let mut chunk = Chunk::new();
        chunk.fill(solid_blocks(Block::of(BlockType::STONE, 0)));
        let marker = Block::of(BlockType::WOOL, 14);

        assert_eq!(chunk.get_block_safe(-1, 0, 0, marker), marker);
        assert_eq!(chunk.get_block_safe(0, 256, 0, marker), marker);
        assert_eq!(chunk.get_block_safe(0, 0, 16, marker), marker);
        assert_eq!(chunk.get_block_safe(15, 255, 15, marker), Block::of(BlockType::STONE, 0));
    }

    #[test]
    fn test_snapshot_shares_storage_until_written() {
        let stone = Block::of(BlockType::STONE, 0);
        let mut chunk = Chunk::new();
        chunk.fill(solid_blocks(stone));
        let mut biomes = [0u8; BIOME_COUNT];
        biomes[5] = 7;
        chunk.set_biomes(&biomes);
        let snapshot = chunk.snapshot();
        assert!(std::ptr::eq(snapshot.blocks().as_ptr(), chunk.blocks().as_ptr()));
        assert_eq!(snapshot.primary_bitmask(), chunk.primary_bitmask());
        assert_eq!(snapshot.biome_at(5, 0), 7);
        assert!(!snapshot.is_dirty());

        assert!(chunk.set_block(2, 3, 4, Block::AIR));

        assert_eq!(chunk.get_block(2, 3, 4), Block::AIR);
        assert_eq!(snapshot.get_block(2, 3, 4), stone);
        assert!(!std::ptr::eq(snapshot.blocks().as_ptr(), chunk.blocks().as_ptr()));

        // Once the snapshot is gone, writes land in place again.
        drop(snapshot);
        let storage = chunk.blocks().as_ptr();
        chunk.set_block(5, 5, 5, Block::AIR);
        assert!(std::ptr::eq(chunk.blocks().as_ptr(), storage));
    }

    #[test]
    fn test_biomes_indexed_by_column() {
        let mut chunk = Chunk::new();
        let mut biomes = [0u8; BIOME_COUNT];
        biomes[3 + 7 * CHUNK_WIDTH] = 21;
        chunk.set_biomes(&biomes);

        assert_eq!(chunk.biome_at(3, 7), 21);
        assert_eq!(chunk.biome_at(7, 3), 0);
    }

    #[test]
    fn test_job_accounting() {
        let chunk = Chunk::new();
        chunk.job_submitted();
        chunk.job_submitted();
        assert_eq!(chunk.pending_jobs(), 2);

        assert!(!chunk.job_finished());
        assert!(chunk.job_finished());
        assert!(chunk.job_finished());
        assert_eq!(chunk.pending_jobs(), 0);
    }

    #[test]
    fn test_mesh_slot_replace_and_take() {
        let chunk = Chunk::new();
        let mesh = ChunkMesh {
            buffer: Some(GpuBufferHandle::new(9)),
            vertex_count: 36,
            bytes: 36 * 24,
        };

        assert_eq!(chunk.replace_mesh(mesh), ChunkMesh::default());
        assert_eq!(chunk.vertex_count(), 36);
        assert_eq!(chunk.take_mesh(), mesh);
        assert_eq!(chunk.mesh(), ChunkMesh::default());
    }
}
