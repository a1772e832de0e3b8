//! Helpers shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cgmath::Point3;

use voxel_mesher::{
    config::WorldConfig,
    engine_state::{
        buffer_state::{GpuBufferHandle, RenderBackend},
        camera_state::ViewFrustum,
        voxels::{
            biome::BiomeColorTable,
            block::Block,
            chunk::{from_flat, CHUNK_VOLUME},
            world::{DrawStats, World},
        },
    },
};

/// Backend that keeps buffer sizes in memory and records draws.
#[derive(Default)]
pub struct RecordingBackend {
    pub live: HashMap<GpuBufferHandle, usize>,
    pub draws: Vec<(GpuBufferHandle, u32)>,
    pub created: usize,
    next_id: u64,
}

impl RecordingBackend {
    pub fn live_bytes(&self) -> u64 {
        self.live.values().map(|&bytes| bytes as u64).sum()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_vertex_buffer(&mut self, _label: &str, contents: &[u8]) -> GpuBufferHandle {
        let handle = GpuBufferHandle::new(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.live.insert(handle, contents.len());
        handle
    }

    fn destroy_buffer(&mut self, handle: GpuBufferHandle) {
        assert!(self.live.remove(&handle).is_some(), "double free of {handle:?}");
    }

    fn draw(&mut self, handle: GpuBufferHandle, vertex_count: u32) {
        assert!(self.live.contains_key(&handle), "draw of freed {handle:?}");
        self.draws.push((handle, vertex_count));
    }
}

pub struct AlwaysVisible;

impl ViewFrustum for AlwaysVisible {
    fn intersects_aabb(&self, _min: Point3<f32>, _max: Point3<f32>) -> bool {
        true
    }
}

pub fn world_with(worker_count: usize, input_queue_capacity: Option<usize>) -> World {
    voxel_mesher::init_logging();
    let config = WorldConfig {
        worker_count,
        input_queue_capacity,
        poll_interval_ms: 5,
        ..WorldConfig::default()
    };
    World::new(config, BiomeColorTable::default()).unwrap()
}

pub fn solid(block: Block) -> Box<[Block]> {
    vec![block; CHUNK_VOLUME].into_boxed_slice()
}

/// Alternating `block` and air in all three directions: the most faces a
/// chunk can produce.
pub fn checkerboard(block: Block) -> Box<[Block]> {
    (0..CHUNK_VOLUME)
        .map(|index| {
            let (x, y, z) = from_flat(index);
            if (x + y + z) % 2 == 0 {
                block
            } else {
                Block::AIR
            }
        })
        .collect()
}

/// Runs frames until every loaded chunk is meshed and no job is in flight.
///
/// Returns the summed stats of every frame.
pub fn draw_until_meshed(world: &mut World, backend: &mut RecordingBackend) -> DrawStats {
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut total = DrawStats::default();

    loop {
        backend.draws.clear();
        let stats = world.draw(backend, &AlwaysVisible);
        total.uploaded += stats.uploaded;
        total.discarded += stats.discarded;
        total.submitted += stats.submitted;
        total.deferred += stats.deferred;
        total.drawn = stats.drawn;
        total.culled = stats.culled;

        let meshed = world.chunk_positions().all(|position| {
            let chunk = world.get_chunk(position).unwrap();
            let chunk = chunk.get();
            chunk.is_tessellated() && !chunk.is_dirty()
        });
        if meshed && world.pending_jobs() == 0 {
            return total;
        }

        assert!(Instant::now() < deadline, "chunks were not meshed in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

pub fn vertex_count(world: &World, position: Point3<i32>) -> u32 {
    world.get_chunk(position).unwrap().get().vertex_count()
}
