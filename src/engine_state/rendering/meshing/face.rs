//! Face geometry and vertex emission.
//!
//! A face is a quad of four corners (bottom-left, bottom-right, top-right,
//! top-left as seen from outside the block) emitted as two counter-clockwise
//! triangles: `(0, 1, 2)` and `(0, 2, 3)`.

use crate::engine_state::rendering::meshing::tessellation_buffer::ScratchWriter;
use crate::engine_state::rendering::vertex::Vertex;
use crate::engine_state::voxels::biome::BiomeColors;
use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

/// Vertices emitted per face.
pub const VERTICES_PER_FACE: usize = 6;
/// Upper bound on the vertices a single block can emit.
pub const MAX_VERTICES_PER_BLOCK: usize = 6 * VERTICES_PER_FACE;

/// Edge length of one atlas tile in texels.
pub const TILE_SIZE: i16 = 16;

/// Corner selectors per side, `[x, y, z]` with 0 = min and 1 = max, ordered
/// bottom-left, bottom-right, top-right, top-left as seen from outside.
const CORNERS: [[[u8; 3]; 4]; 6] = [
    // FRONT (+Z)
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    // BACK (-Z)
    [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]],
    // BOTTOM (-Y)
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    // TOP (+Y)
    [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]],
    // LEFT (-X)
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
    // RIGHT (+X)
    [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]],
];

/// Texture corners matching `CORNERS`, in tile units.
const UV_CORNERS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

const TRIANGLES: [usize; VERTICES_PER_FACE] = [0, 1, 2, 0, 2, 3];

/// A tile in the block texture atlas, addressed by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Column, counted from the left edge.
    pub col: u8,
    /// Row, counted from the top edge.
    pub row: u8,
}

impl Tile {
    /// Creates a tile reference.
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }
}

/// Which biome colormap, if any, tints a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    /// Untinted.
    None,
    /// Grass colormap.
    Grass,
    /// Foliage colormap.
    Foliage,
}

/// Vertical extent of a face relative to the block center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Bottom edge.
    pub min: f32,
    /// Top edge.
    pub max: f32,
}

#[allow(missing_docs)]
impl Span {
    pub const FULL: Span = Span { min: -0.5, max: 0.5 };
    pub const LOWER_HALF: Span = Span { min: -0.5, max: 0.0 };
    pub const UPPER_HALF: Span = Span { min: 0.0, max: 0.5 };
}

/// Everything a block model needs to know about the block being tessellated.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    /// The block being tessellated.
    pub block: Block,
    /// World-space center of the block.
    pub center: [f32; 3],
    /// Neighboring blocks, indexed by `BlockSide`.
    pub neighbors: [Block; 6],
    /// Colormap coordinates of the block's biome.
    pub biome: BiomeColors,
}

impl BlockContext {
    /// The block a given face looks into.
    #[inline]
    pub fn neighbor(&self, side: BlockSide) -> Block {
        self.neighbors[side as usize]
    }
}

/// Appends faces to a scratch buffer.
pub struct FaceWriter<'w, 'b> {
    out: &'w mut ScratchWriter<'b>,
}

impl<'w, 'b> FaceWriter<'w, 'b> {
    /// Wraps the writer of a buffer in the `Writing` state.
    pub fn new(out: &'w mut ScratchWriter<'b>) -> Self {
        Self { out }
    }

    /// Reserves room for one block's worth of faces.
    #[inline]
    pub fn reserve_block(&mut self) {
        self.out.reserve(MAX_VERTICES_PER_BLOCK);
    }

    /// Vertices written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Emits one face of the block in `ctx`.
    ///
    /// # Arguments
    /// * `ctx` - The block being tessellated
    /// * `side` - Which face to emit
    /// * `tile` - Atlas tile to map onto the face
    /// * `tint` - Biome colormap used by the shader, if any
    /// * `span` - Vertical extent, so slabs get half-height side faces
    /// * `light_source` - Block whose light values the face takes
    pub fn face(
        &mut self,
        ctx: &BlockContext,
        side: BlockSide,
        tile: Tile,
        tint: Tint,
        span: Span,
        light_source: Block,
    ) {
        let shade = side.shade();
        let (alpha, mask_uv) = match tint {
            Tint::None => (0, [0, 0]),
            Tint::Grass => (255, ctx.biome.grass),
            Tint::Foliage => (255, ctx.biome.foliage),
        };
        let color = [shade, shade, shade, alpha];
        let light = [
            light_source.block_light() * 17,
            light_source.sky_light() * 17,
        ];
        let vertical = matches!(side, BlockSide::TOP | BlockSide::BOTTOM);

        let corners = CORNERS[side as usize].map(|[sx, sy, sz]| {
            let dy = if sy == 0 { span.min } else { span.max };
            [
                ctx.center[0] + if sx == 0 { -0.5 } else { 0.5 },
                ctx.center[1] + dy,
                ctx.center[2] + if sz == 0 { -0.5 } else { 0.5 },
            ]
        });

        let uvs = std::array::from_fn::<[f32; 2], 4, _>(|corner| {
            let [u, v] = UV_CORNERS[corner];
            if vertical {
                [u, v]
            } else {
                // Side faces take v from height so partial blocks show a partial tile.
                let sy = CORNERS[side as usize][corner][1];
                let dy = if sy == 0 { span.min } else { span.max };
                [u, 0.5 - dy]
            }
        });

        for &corner in &TRIANGLES {
            let [u, v] = uvs[corner];
            self.out.push(Vertex::new(
                corners[corner],
                color,
                [
                    tile.col as i16 * TILE_SIZE + (u * TILE_SIZE as f32) as i16,
                    tile.row as i16 * TILE_SIZE + (v * TILE_SIZE as f32) as i16,
                ],
                mask_uv,
                light,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::tessellation_buffer::TessellationBuffer;
    use cgmath::{InnerSpace, Vector3};

    fn context() -> BlockContext {
        BlockContext {
            block: Block::new(1, 0),
            center: [0.5, 0.5, 0.5],
            neighbors: [Block::AIR.with_light(3, 15); 6],
            biome: BiomeColors::uniform(9, 10),
        }
    }

    fn emit(side: BlockSide, tint: Tint, span: Span) -> Vec<Vertex> {
        let buffer = TessellationBuffer::new(0);
        buffer.mark_busy().unwrap();
        let mut writer = buffer.writer().unwrap();
        let ctx = context();
        let mut faces = FaceWriter::new(&mut writer);
        faces.reserve_block();
        faces.face(&ctx, side, Tile::new(2, 3), tint, span, ctx.neighbor(side));
        writer.as_slice().to_vec()
    }

    #[test]
    fn test_triangles_wind_counter_clockwise_from_outside() {
        for side in BlockSide::all() {
            let vertices = emit(side, Tint::None, Span::FULL);
            assert_eq!(vertices.len(), VERTICES_PER_FACE);

            let outward = side.offset().cast::<f32>().unwrap();
            for triangle in vertices.chunks(3) {
                let p: Vec<Vector3<f32>> = triangle.iter().map(|v| Vector3::from(v.position)).collect();
                let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
                assert!((normal - outward).magnitude() < 1e-5, "{side:?} winds the wrong way");
            }
        }
    }

    #[test]
    fn test_face_lies_on_block_boundary() {
        let vertices = emit(BlockSide::RIGHT, Tint::None, Span::FULL);
        assert!(vertices.iter().all(|v| v.position[0] == 1.0));
        let vertices = emit(BlockSide::BOTTOM, Tint::None, Span::FULL);
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn test_attributes() {
        let vertices = emit(BlockSide::TOP, Tint::Grass, Span::FULL);
        for vertex in &vertices {
            assert_eq!(vertex.color, [255, 255, 255, 255]);
            assert_eq!(vertex.mask_uv, [9, 10]);
            assert_eq!(vertex.light, [51, 255]);
            assert!((32..=48).contains(&vertex.tex_coords[0]));
            assert!((48..=64).contains(&vertex.tex_coords[1]));
        }

        let vertices = emit(BlockSide::LEFT, Tint::None, Span::FULL);
        assert_eq!(vertices[0].color, [153, 153, 153, 0]);
        assert_eq!(vertices[0].mask_uv, [0, 0]);
    }

    #[test]
    fn test_half_span_maps_half_tile() {
        let vertices = emit(BlockSide::FRONT, Tint::None, Span::LOWER_HALF);
        let heights: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert!(heights.iter().all(|&y| y == 0.0 || y == 0.5));

        let v_range: Vec<i16> = vertices.iter().map(|v| v.tex_coords[1] - 48).collect();
        assert!(v_range.iter().all(|&v| v == 8 || v == 16));
    }
}
