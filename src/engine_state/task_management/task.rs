//! # Mesh Jobs
//!
//! The units of work passed through the job queues.
//!
//! ## Job Lifecycle
//! 1. The render thread captures a dirty chunk and its loaded neighbors into a
//!    `MeshJob` and puts it on the input queue
//! 2. A worker whose scratch buffer is idle dequeues it and calls `process`
//! 3. `process` snapshots the chunks under a short read lock, builds the mesh
//!    from the snapshots into the buffer, and returns a `MeshResult` carrying
//!    the buffer
//! 4. The render thread uploads the result and hands the buffer back to the
//!    worker with `TessellationBuffer::mark_available`
//!
//! ## Thread Safety
//! - The chunk locks are released before the mesh is built, so block edits on
//!   the render thread never wait for a worker
//! - Jobs own clones of the chunk handles, so a chunk removed from the world
//!   while a job is in flight stays alive until the job is finished
//! - Results are matched back to their chunk by handle identity, not by
//!   coordinate

use std::sync::Arc;

use cgmath::Point3;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{ChunkNeighborhood, MeshBuilder, TessellationBuffer},
        voxels::chunk::Chunk,
    },
    error::ScratchError,
};

/// A request to mesh one chunk.
pub struct MeshJob {
    /// The chunk to mesh.
    pub chunk: MtResource<Chunk>,
    /// Its chunk coordinate.
    pub position: Point3<i32>,
    /// Loaded face-adjacent neighbors, indexed by `BlockSide`.
    pub neighbors: [Option<MtResource<Chunk>>; 6],
}

/// A finished mesh waiting in a worker's scratch buffer.
pub struct MeshResult {
    /// The chunk the mesh belongs to.
    pub chunk: MtResource<Chunk>,
    /// Its chunk coordinate.
    pub position: Point3<i32>,
    /// The scratch buffer holding the vertices. Must be made available again
    /// once uploaded.
    pub buffer: Arc<TessellationBuffer>,
    /// Number of vertices in the buffer.
    pub vertex_count: usize,
}

impl MeshJob {
    /// Builds the mesh into `buffer`.
    ///
    /// The buffer must be idle. On success it is left in the `ReadyForUpload`
    /// state and travels with the result.
    ///
    /// # Arguments
    /// * `builder` - The mesh builder
    /// * `buffer` - The calling worker's scratch buffer
    pub fn process(
        self,
        builder: &MeshBuilder,
        buffer: &Arc<TessellationBuffer>,
    ) -> Result<MeshResult, ScratchError> {
        buffer.mark_busy()?;
        let center = self.chunk.get().snapshot();
        let neighbors: [Option<Chunk>; 6] = std::array::from_fn(|side| {
            self.neighbors[side]
                .as_ref()
                .map(|chunk| chunk.get().snapshot())
        });
        {
            let neighborhood = ChunkNeighborhood {
                center: &center,
                neighbors: std::array::from_fn(|side| neighbors[side].as_ref()),
            };

            let mut writer = buffer.writer()?;
            builder.build(self.position, &neighborhood, &mut writer);
        }
        let vertex_count = buffer.finish_writing()?;

        Ok(MeshResult {
            chunk: self.chunk,
            position: self.position,
            buffer: buffer.clone(),
            vertex_count,
        })
    }
}
