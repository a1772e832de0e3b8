//! # Buffer State Module
//!
//! This module provides the seam between the meshing pipeline and the GPU: the
//! `RenderBackend` trait the world uploads and draws chunk meshes through, and
//! `WgpuBackend`, its `wgpu` implementation.
//!
//! ## Architecture
//!
//! Chunks refer to their vertex buffers through opaque `GpuBufferHandle`s. The
//! backend owns the actual buffer objects, keyed by handle, together with
//! per-buffer analytics for memory tracking. All methods are called from the
//! render thread only.
//!
//! Draw calls are recorded during `World::draw` and replayed into a render
//! pass by `encode_draws`, so the world never has to borrow a render pass.

use std::collections::HashMap;

use wgpu::{util::DeviceExt, Buffer, Device, RenderPass};

/// Opaque identifier of a GPU vertex buffer owned by a `RenderBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBufferHandle(u64);

impl GpuBufferHandle {
    /// Wraps a backend-specific id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The backend-specific id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The render collaborator the world uploads and draws chunk meshes through.
///
/// Meshes are non-indexed triangle lists.
pub trait RenderBackend {
    /// Creates an immutable vertex buffer initialized with `contents`.
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> GpuBufferHandle;

    /// Releases a buffer created by `create_vertex_buffer`.
    fn destroy_buffer(&mut self, handle: GpuBufferHandle);

    /// Draws `vertex_count` vertices from `handle` as a triangle list.
    fn draw(&mut self, handle: GpuBufferHandle, vertex_count: u32);
}

/// Analytics data for a GPU buffer
#[derive(Debug)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
}

/// `wgpu` implementation of `RenderBackend`.
///
/// # Examples
///
/// ```no_run
/// # fn frame(device: wgpu::Device, world: &mut voxel_mesher::engine_state::voxels::world::World,
/// #          frustum: &voxel_mesher::engine_state::camera_state::Frustum,
/// #          pipeline: &voxel_mesher::engine_state::rendering::meshing::ChunkPipeline,
/// #          render_pass: &mut wgpu::RenderPass<'_>) {
/// use voxel_mesher::engine_state::buffer_state::WgpuBackend;
///
/// let mut backend = WgpuBackend::new(device);
/// world.draw(&mut backend, frustum);
/// pipeline.render(render_pass, &backend);
/// backend.clear_draws();
/// # }
/// ```
pub struct WgpuBackend {
    /// The GPU device buffers are created on
    device: Device,
    /// Live buffers by handle
    buffers: HashMap<GpuBufferHandle, Buffer>,
    /// Analytics data for each buffer
    buffer_analytics: HashMap<GpuBufferHandle, BufferAnalytics>,
    /// Draws recorded since the last `clear_draws`
    draws: Vec<(GpuBufferHandle, u32)>,
    next_id: u64,
}

impl WgpuBackend {
    /// Creates a backend with no buffers.
    ///
    /// # Arguments
    ///
    /// * `device` - The GPU device to create buffers on
    pub fn new(device: Device) -> Self {
        Self {
            device,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
            draws: Vec::new(),
            next_id: 0,
        }
    }

    /// Replays the recorded draws into `render_pass`.
    ///
    /// The chunk pipeline and its bind groups must already be set.
    pub fn encode_draws(&self, render_pass: &mut RenderPass<'_>) {
        for (handle, vertex_count) in &self.draws {
            let Some(buffer) = self.buffers.get(handle) else {
                log::warn!("Draw recorded for destroyed buffer {:?}", handle);
                continue;
            };
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..*vertex_count, 0..1);
        }
    }

    /// Forgets the recorded draws. Call once per frame after encoding.
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// Draws recorded since the last `clear_draws`.
    pub fn recorded_draws(&self) -> &[(GpuBufferHandle, u32)] {
        &self.draws
    }

    /// Gets a buffer by handle.
    pub fn get_buffer(&self, handle: GpuBufferHandle) -> Option<&Buffer> {
        self.buffers.get(&handle)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Gets the total allocated memory across all buffers
    ///
    /// # Returns
    ///
    /// Total allocated memory in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, analytics| acc + analytics.allocated_memory)
    }
}

impl RenderBackend for WgpuBackend {
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> GpuBufferHandle {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });

        let handle = GpuBufferHandle::new(self.next_id);
        self.next_id += 1;

        self.buffers.insert(handle, buffer);
        self.buffer_analytics.insert(
            handle,
            BufferAnalytics {
                allocated_memory: contents.len() as u64,
            },
        );
        handle
    }

    fn destroy_buffer(&mut self, handle: GpuBufferHandle) {
        self.buffer_analytics.remove(&handle);
        match self.buffers.remove(&handle) {
            Some(buffer) => buffer.destroy(),
            None => log::warn!("Destroying unknown buffer {:?}", handle),
        }
    }

    fn draw(&mut self, handle: GpuBufferHandle, vertex_count: u32) {
        self.draws.push((handle, vertex_count));
    }
}

impl Drop for WgpuBackend {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            log::warn!(
                "Dropping render backend with {} live buffers ({} bytes)",
                self.buffers.len(),
                self.get_total_allocated_memory()
            );
        }
    }
}
