//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format the tessellator writes into scratch
//! buffers and the render backend uploads verbatim, along with the matching
//! `wgpu` vertex buffer layout.

use std::mem::offset_of;

/// A vertex in the voxel rendering pipeline.
///
/// Every face is emitted as two triangles (six vertices, no index buffer), so
/// the format is kept small and fixed-size.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes), world space
/// - Color: 4x u8 (4 bytes), RGB face shade and A biome tint weight
/// - Texture Coordinates: 2x i16 (4 bytes), atlas texels
/// - Mask UV: 2x u8 (2 bytes), biome colormap coordinates
/// - Light: 2x u8 (2 bytes), block light and sky light
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Directional shade in RGB; alpha is 255 for biome-tinted faces, 0 otherwise
    pub color: [u8; 4],
    /// Texel coordinates into the block texture atlas
    pub tex_coords: [i16; 2],
    /// Colormap coordinates used to look up the biome tint
    pub mask_uv: [u8; 2],
    /// Block light and sky light, scaled to the full byte range
    pub light: [u8; 2],
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 24);

impl Vertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<Vertex>();

    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, color) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Unorm8x4,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Sint16x2,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, mask_uv) as wgpu::BufferAddress,
            shader_location: 3,
            format: wgpu::VertexFormat::Uint8x2,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, light) as wgpu::BufferAddress,
            shader_location: 4,
            format: wgpu::VertexFormat::Unorm8x2,
        },
    ];

    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - World-space position
    /// * `color` - Face shade (RGB) and tint weight (A)
    /// * `tex_coords` - Atlas texel coordinates
    /// * `mask_uv` - Biome colormap coordinates
    /// * `light` - Block light and sky light
    pub const fn new(
        position: [f32; 3],
        color: [u8; 4],
        tex_coords: [i16; 2],
        mask_uv: [u8; 2],
        light: [u8; 2],
    ) -> Self {
        Vertex {
            position,
            color,
            tex_coords,
            mask_uv,
            light,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec4<f32>, normalized)
    /// - `location = 2`: tex_coords (vec2<i32>)
    /// - `location = 3`: mask_uv (vec2<u32>)
    /// - `location = 4`: light (vec2<f32>, normalized)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
