//! Chunk renderer for the voxel engine.
//!
//! This module builds the render pipeline that draws uploaded chunk meshes.
//!
//! # Architecture
//!
//! The pipeline expects non-indexed triangle lists in the `Vertex` layout, one
//! vertex buffer per chunk. Bind groups (camera, block atlas, biome colormaps)
//! belong to the embedding renderer; their layouts are passed in and the
//! groups themselves must be set on the pass before `render` is called.

use wgpu::{BindGroupLayout, Device, RenderPass, RenderPipeline, TextureFormat};

use crate::engine_state::buffer_state::WgpuBackend;
use crate::engine_state::rendering::vertex::Vertex;

/// Render pipeline for chunk meshes.
pub struct ChunkPipeline {
    /// The WebGPU render pipeline for chunk rendering
    render_pipeline: RenderPipeline,
}

impl ChunkPipeline {
    /// Creates a new `ChunkPipeline` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `shader_source` - WGSL source with `vs_main` and `fs_main` entry points
    /// * `texture_format` - The color target format
    /// * `bind_group_layouts` - Layouts of the groups the shader binds
    /// * `depth_stencil` - Optional depth stencil state
    ///
    /// # Returns
    /// A new `ChunkPipeline` with back-face culling of counter-clockwise fronts
    pub fn new(
        device: &Device,
        shader_source: &str,
        texture_format: TextureFormat,
        bind_group_layouts: &[&BindGroupLayout],
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Render Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Chunk Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { render_pipeline }
    }

    /// Draws every chunk `backend` recorded this frame.
    ///
    /// # Arguments
    /// * `render_pass` - Pass with the shader's bind groups already set
    /// * `backend` - Backend holding this frame's recorded draws
    pub fn render(&self, render_pass: &mut RenderPass<'_>, backend: &WgpuBackend) {
        render_pass.set_pipeline(&self.render_pipeline);
        backend.encode_draws(render_pass);
    }
}
