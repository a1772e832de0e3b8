//! # Block Models
//!
//! Per-block-id rendering rules. Every block id maps to a `BlockModel` that
//! knows which atlas tiles its faces use, whether it is tinted by the biome,
//! which of its faces fully cover the cell boundary (and so hide a neighbor's
//! touching face), and how to emit its visible faces.
//!
//! The lookup is a compile-time perfect hash map keyed by block id. Ids without
//! an entry render as a plain cube with the missing-texture tile.
//!
//! ## Atlas Layout
//!
//! Tiles are addressed by `(column, row)` in a 16x16 grid of 16-texel tiles,
//! following the classic terrain atlas where it has a slot and using the last
//! two rows for the rest.

use phf::phf_map;

use crate::engine_state::voxels::block::{block_side::BlockSide, Block, BlockId};

use super::face::{BlockContext, FaceWriter, Span, Tile, Tint};

/// Tiles for the six faces of a block, indexed by `BlockSide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceTiles([Tile; 6]);

impl FaceTiles {
    /// The same tile on every face.
    pub const fn uniform(tile: Tile) -> Self {
        Self([tile; 6])
    }

    /// A column: distinct top and bottom, one tile for the four sides.
    pub const fn column(top: Tile, side: Tile, bottom: Tile) -> Self {
        //        FRONT BACK  BOTTOM  TOP  LEFT  RIGHT
        Self([side, side, bottom, top, side, side])
    }

    /// The tile on `side`.
    #[inline]
    pub fn get(&self, side: BlockSide) -> Tile {
        self.0[side as usize]
    }
}

/// Side and end tiles of one log species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTiles {
    /// Tile on the faces along the log.
    pub bark: Tile,
    /// Tile on the two cut ends.
    pub rings: Tile,
}

/// How a block id is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockModel {
    /// Never emits, never occludes.
    Air,
    /// Opaque cube with fixed tiles.
    Cube(FaceTiles),
    /// Opaque cube with tiles picked by metadata.
    Variants(&'static [FaceTiles]),
    /// Opaque cube; the top is tinted with the biome grass color.
    Grass {
        /// Tinted top tile.
        top: Tile,
        /// Tile on the four sides.
        side: Tile,
        /// Bottom tile.
        bottom: Tile,
    },
    /// Opaque cube; species in metadata bits 0-1, axis in bits 2-3.
    Log(&'static [LogTiles]),
    /// Foliage-tinted, see-through, culls against identical leaves only.
    Leaves(&'static [Tile]),
    /// See-through, culls against identical glass only.
    Glass(Tile),
    /// Half block; variant in metadata bits 0-2, bit 3 selects the upper half.
    Slab(&'static [FaceTiles]),
}

const SLAB_UPPER_BIT: u8 = 0x8;
const SLAB_VARIANT_MASK: u8 = 0x7;
const SPECIES_MASK: u8 = 0x3;
const LOG_AXIS_SHIFT: u8 = 2;

const MISSING: Tile = Tile::new(15, 15);

/// Model used for ids without an entry.
pub const FALLBACK_MODEL: BlockModel = BlockModel::Cube(FaceTiles::uniform(MISSING));

static STONE_VARIANTS: [FaceTiles; 7] = [
    FaceTiles::uniform(Tile::new(1, 0)),  // stone
    FaceTiles::uniform(Tile::new(0, 14)), // granite
    FaceTiles::uniform(Tile::new(1, 14)), // polished granite
    FaceTiles::uniform(Tile::new(2, 14)), // diorite
    FaceTiles::uniform(Tile::new(3, 14)), // polished diorite
    FaceTiles::uniform(Tile::new(4, 14)), // andesite
    FaceTiles::uniform(Tile::new(5, 14)), // polished andesite
];

static PLANK_VARIANTS: [FaceTiles; 6] = [
    FaceTiles::uniform(Tile::new(4, 0)),  // oak
    FaceTiles::uniform(Tile::new(6, 12)), // spruce
    FaceTiles::uniform(Tile::new(6, 13)), // birch
    FaceTiles::uniform(Tile::new(7, 12)), // jungle
    FaceTiles::uniform(Tile::new(0, 15)), // acacia
    FaceTiles::uniform(Tile::new(1, 15)), // dark oak
];

static SANDSTONE_VARIANTS: [FaceTiles; 3] = [
    FaceTiles::column(Tile::new(0, 11), Tile::new(0, 12), Tile::new(0, 13)),
    FaceTiles::column(Tile::new(0, 11), Tile::new(5, 14), Tile::new(0, 11)), // chiseled
    FaceTiles::column(Tile::new(0, 11), Tile::new(6, 14), Tile::new(0, 11)), // smooth
];

static WOOL_VARIANTS: [FaceTiles; 16] = [
    FaceTiles::uniform(Tile::new(0, 4)),  // white
    FaceTiles::uniform(Tile::new(2, 13)), // orange
    FaceTiles::uniform(Tile::new(2, 12)), // magenta
    FaceTiles::uniform(Tile::new(2, 11)), // light blue
    FaceTiles::uniform(Tile::new(2, 10)), // yellow
    FaceTiles::uniform(Tile::new(2, 9)),  // lime
    FaceTiles::uniform(Tile::new(2, 8)),  // pink
    FaceTiles::uniform(Tile::new(2, 7)),  // gray
    FaceTiles::uniform(Tile::new(1, 14)), // light gray
    FaceTiles::uniform(Tile::new(1, 13)), // cyan
    FaceTiles::uniform(Tile::new(1, 12)), // purple
    FaceTiles::uniform(Tile::new(1, 11)), // blue
    FaceTiles::uniform(Tile::new(1, 10)), // brown
    FaceTiles::uniform(Tile::new(1, 9)),  // green
    FaceTiles::uniform(Tile::new(1, 8)),  // red
    FaceTiles::uniform(Tile::new(1, 7)),  // black
];

static STONE_BRICK_VARIANTS: [FaceTiles; 4] = [
    FaceTiles::uniform(Tile::new(6, 3)),  // normal
    FaceTiles::uniform(Tile::new(4, 6)),  // mossy
    FaceTiles::uniform(Tile::new(5, 6)),  // cracked
    FaceTiles::uniform(Tile::new(5, 13)), // chiseled
];

static SLAB_VARIANTS: [FaceTiles; 8] = [
    FaceTiles::column(Tile::new(6, 0), Tile::new(5, 0), Tile::new(6, 0)), // stone
    FaceTiles::column(Tile::new(0, 11), Tile::new(0, 12), Tile::new(0, 13)), // sandstone
    FaceTiles::uniform(Tile::new(4, 0)), // wooden
    FaceTiles::uniform(Tile::new(0, 1)), // cobblestone
    FaceTiles::uniform(Tile::new(7, 0)), // brick
    FaceTiles::uniform(Tile::new(6, 3)), // stone brick
    FaceTiles::uniform(Tile::new(0, 14)), // nether brick
    FaceTiles::column(Tile::new(10, 15), Tile::new(11, 15), Tile::new(10, 15)), // quartz
];

static LOG_SPECIES: [LogTiles; 4] = [
    LogTiles { bark: Tile::new(4, 1), rings: Tile::new(5, 1) }, // oak
    LogTiles { bark: Tile::new(4, 7), rings: Tile::new(2, 15) }, // spruce
    LogTiles { bark: Tile::new(5, 7), rings: Tile::new(3, 15) }, // birch
    LogTiles { bark: Tile::new(9, 9), rings: Tile::new(4, 15) }, // jungle
];

static LOG2_SPECIES: [LogTiles; 2] = [
    LogTiles { bark: Tile::new(5, 15), rings: Tile::new(6, 15) }, // acacia
    LogTiles { bark: Tile::new(7, 15), rings: Tile::new(8, 15) }, // dark oak
];

static LEAVES_SPECIES: [Tile; 4] = [
    Tile::new(4, 3),  // oak
    Tile::new(4, 8),  // spruce
    Tile::new(4, 3),  // birch
    Tile::new(4, 12), // jungle
];

static LEAVES2_SPECIES: [Tile; 2] = [
    Tile::new(12, 15), // acacia
    Tile::new(13, 15), // dark oak
];

/// Block id to model.
static BLOCK_MODELS: phf::Map<u16, BlockModel> = phf_map! {
    0u16 => BlockModel::Air,
    1u16 => BlockModel::Variants(&STONE_VARIANTS),
    2u16 => BlockModel::Grass {
        top: Tile::new(0, 0),
        side: Tile::new(3, 0),
        bottom: Tile::new(2, 0),
    },
    3u16 => BlockModel::Cube(FaceTiles::uniform(Tile::new(2, 0))),
    4u16 => BlockModel::Cube(FaceTiles::uniform(Tile::new(0, 1))),
    5u16 => BlockModel::Variants(&PLANK_VARIANTS),
    7u16 => BlockModel::Cube(FaceTiles::uniform(Tile::new(1, 1))),
    12u16 => BlockModel::Cube(FaceTiles::uniform(Tile::new(2, 1))),
    13u16 => BlockModel::Cube(FaceTiles::uniform(Tile::new(3, 1))),
    17u16 => BlockModel::Log(&LOG_SPECIES),
    18u16 => BlockModel::Leaves(&LEAVES_SPECIES),
    20u16 => BlockModel::Glass(Tile::new(1, 3)),
    24u16 => BlockModel::Variants(&SANDSTONE_VARIANTS),
    35u16 => BlockModel::Variants(&WOOL_VARIANTS),
    43u16 => BlockModel::Variants(&SLAB_VARIANTS),
    44u16 => BlockModel::Slab(&SLAB_VARIANTS),
    98u16 => BlockModel::Variants(&STONE_BRICK_VARIANTS),
    161u16 => BlockModel::Leaves(&LEAVES2_SPECIES),
    162u16 => BlockModel::Log(&LOG2_SPECIES),
};

/// Returns the model of a block id, or `FALLBACK_MODEL` for unknown ids.
#[inline]
pub fn model_for(id: BlockId) -> &'static BlockModel {
    BLOCK_MODELS.get(&id).unwrap_or(&FALLBACK_MODEL)
}

/// Picks `items[index]`, or the first entry for out-of-range metadata.
#[inline]
fn pick<T: Copy>(items: &[T], index: u8) -> T {
    items.get(index as usize).copied().unwrap_or(items[0])
}

impl BlockModel {
    /// Returns `true` if `block`, rendered with this model, completely covers
    /// its cell boundary on `side`.
    pub fn occludes(&self, block: Block, side: BlockSide) -> bool {
        match self {
            BlockModel::Air | BlockModel::Leaves(_) | BlockModel::Glass(_) => false,
            BlockModel::Slab(_) => {
                let upper = block.metadata() & SLAB_UPPER_BIT != 0;
                (side == BlockSide::TOP && upper) || (side == BlockSide::BOTTOM && !upper)
            }
            BlockModel::Cube(_)
            | BlockModel::Variants(_)
            | BlockModel::Grass { .. }
            | BlockModel::Log(_) => true,
        }
    }

    /// Returns `true` if the face on `side` is hidden by an identical block
    /// even though this model does not occlude.
    ///
    /// Identical slabs only meet flush on the four horizontal sides. Stacked
    /// identical slabs have half a cell of air between them.
    pub fn self_culls(&self, side: BlockSide) -> bool {
        match self {
            BlockModel::Air => false,
            BlockModel::Slab(_) => !matches!(side, BlockSide::TOP | BlockSide::BOTTOM),
            _ => true,
        }
    }

    /// Returns `true` if the face of `ctx.block` on `side` cannot be seen.
    #[inline]
    fn face_hidden(&self, ctx: &BlockContext, side: BlockSide) -> bool {
        let neighbor = ctx.neighbor(side);
        model_for(neighbor.id()).occludes(neighbor, side.opposite())
            || (neighbor == ctx.block && self.self_culls(side))
    }

    /// Emits every visible face of the block described by `ctx`.
    pub fn emit_faces(&self, ctx: &BlockContext, out: &mut FaceWriter<'_, '_>) {
        let metadata = ctx.block.metadata();
        match *self {
            BlockModel::Air => {}
            BlockModel::Cube(tiles) => self.emit_cube(ctx, out, |side| (tiles.get(side), Tint::None)),
            BlockModel::Variants(variants) => {
                let tiles = pick(variants, metadata);
                self.emit_cube(ctx, out, |side| (tiles.get(side), Tint::None))
            }
            BlockModel::Grass { top, side, bottom } => self.emit_cube(ctx, out, |face| match face {
                BlockSide::TOP => (top, Tint::Grass),
                BlockSide::BOTTOM => (bottom, Tint::None),
                _ => (side, Tint::None),
            }),
            BlockModel::Log(species) => {
                let tiles = pick(species, metadata & SPECIES_MASK);
                let axis = (metadata >> LOG_AXIS_SHIFT) & 0x3;
                self.emit_cube(ctx, out, |side| {
                    let on_axis = match axis {
                        0 => matches!(side, BlockSide::TOP | BlockSide::BOTTOM),
                        1 => matches!(side, BlockSide::LEFT | BlockSide::RIGHT),
                        2 => matches!(side, BlockSide::FRONT | BlockSide::BACK),
                        _ => false,
                    };
                    (if on_axis { tiles.rings } else { tiles.bark }, Tint::None)
                })
            }
            BlockModel::Leaves(species) => {
                let tile = pick(species, metadata & SPECIES_MASK);
                self.emit_cube(ctx, out, |_| (tile, Tint::Foliage))
            }
            BlockModel::Glass(tile) => self.emit_cube(ctx, out, |_| (tile, Tint::None)),
            BlockModel::Slab(variants) => self.emit_slab(ctx, out, pick(variants, metadata & SLAB_VARIANT_MASK)),
        }
    }

    fn emit_cube(
        &self,
        ctx: &BlockContext,
        out: &mut FaceWriter<'_, '_>,
        texture: impl Fn(BlockSide) -> (Tile, Tint),
    ) {
        for side in BlockSide::all() {
            if self.face_hidden(ctx, side) {
                continue;
            }
            let (tile, tint) = texture(side);
            out.face(ctx, side, tile, tint, Span::FULL, ctx.neighbor(side));
        }
    }

    fn emit_slab(&self, ctx: &BlockContext, out: &mut FaceWriter<'_, '_>, tiles: FaceTiles) {
        let upper = ctx.block.metadata() & SLAB_UPPER_BIT != 0;
        let span = if upper { Span::UPPER_HALF } else { Span::LOWER_HALF };

        for side in BlockSide::all() {
            let inner = (side == BlockSide::TOP && !upper) || (side == BlockSide::BOTTOM && upper);
            if inner {
                // Not on the cell boundary: nothing can cover it.
                out.face(ctx, side, tiles.get(side), Tint::None, span, ctx.block);
                continue;
            }
            if self.face_hidden(ctx, side) {
                continue;
            }
            out.face(ctx, side, tiles.get(side), Tint::None, span, ctx.neighbor(side));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::face::VERTICES_PER_FACE;
    use crate::engine_state::rendering::meshing::tessellation_buffer::TessellationBuffer;
    use crate::engine_state::rendering::vertex::Vertex;
    use crate::engine_state::voxels::biome::BiomeColors;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn context(block: Block, neighbors: [Block; 6]) -> BlockContext {
        BlockContext {
            block,
            center: [0.5, 0.5, 0.5],
            neighbors,
            biome: BiomeColors::uniform(40, 50),
        }
    }

    fn emit(block: Block, neighbors: [Block; 6]) -> Vec<Vertex> {
        let buffer = TessellationBuffer::new(0);
        buffer.mark_busy().unwrap();
        let mut writer = buffer.writer().unwrap();
        {
            let mut faces = FaceWriter::new(&mut writer);
            faces.reserve_block();
            model_for(block.id()).emit_faces(&context(block, neighbors), &mut faces);
        }
        writer.as_slice().to_vec()
    }

    fn faces(vertices: &[Vertex]) -> usize {
        vertices.len() / VERTICES_PER_FACE
    }

    /// Horizontal faces lying entirely at height `y`.
    fn flat_faces_at(vertices: &[Vertex], y: f32) -> usize {
        vertices
            .chunks(VERTICES_PER_FACE)
            .filter(|face| face.iter().all(|v| v.position[1] == y))
            .count()
    }

    #[test]
    fn test_isolated_cube_emits_six_faces() {
        let stone = Block::of(BlockType::STONE, 0);
        assert_eq!(faces(&emit(stone, [Block::AIR; 6])), 6);
    }

    #[test]
    fn test_enclosed_cube_emits_nothing() {
        let stone = Block::of(BlockType::STONE, 0);
        let dirt = Block::of(BlockType::DIRT, 0);
        assert_eq!(faces(&emit(stone, [dirt; 6])), 0);
    }

    #[test]
    fn test_air_emits_nothing() {
        assert!(emit(Block::AIR, [Block::AIR; 6]).is_empty());
    }

    #[test]
    fn test_unknown_id_renders_fallback_cube() {
        let unknown = Block::new(4000, 0);
        assert_eq!(*model_for(4000), FALLBACK_MODEL);
        let vertices = emit(unknown, [Block::AIR; 6]);
        assert_eq!(faces(&vertices), 6);
        assert!(vertices.iter().all(|v| v.tex_coords[0] >= 15 * 16));
    }

    #[test]
    fn test_glass_culls_only_against_glass() {
        let glass = Block::of(BlockType::GLASS, 0);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::RIGHT as usize] = glass;
        assert_eq!(faces(&emit(glass, neighbors)), 5);

        // Glass never hides the faces of its neighbors.
        let stone = Block::of(BlockType::STONE, 0);
        assert_eq!(faces(&emit(stone, [glass; 6])), 6);
    }

    #[test]
    fn test_leaves_tinted_and_self_culling() {
        let oak = Block::of(BlockType::LEAVES, 0);
        let spruce = Block::of(BlockType::LEAVES, 1);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::TOP as usize] = oak;
        neighbors[BlockSide::FRONT as usize] = spruce;

        let vertices = emit(oak, neighbors);
        assert_eq!(faces(&vertices), 5);
        assert!(vertices.iter().all(|v| v.color[3] == 255 && v.mask_uv == [40, 50]));
    }

    #[test]
    fn test_grass_tints_top_only() {
        let grass = Block::of(BlockType::GRASS, 0);
        let vertices = emit(grass, [Block::AIR; 6]);
        let tinted = vertices.iter().filter(|v| v.color[3] == 255).count();
        assert_eq!(tinted, VERTICES_PER_FACE);
        assert!(vertices
            .iter()
            .filter(|v| v.color[3] == 255)
            .all(|v| v.color[0] == BlockSide::TOP.shade()));
    }

    #[test]
    fn test_log_axis_moves_rings() {
        let upright = emit(Block::of(BlockType::LOG, 0), [Block::AIR; 6]);
        let sideways = emit(Block::of(BlockType::LOG, 4), [Block::AIR; 6]);
        let rings_u = LOG_SPECIES[0].rings.col as i16 * 16;

        let ring_faces = |vertices: &[Vertex]| -> Vec<u8> {
            vertices
                .chunks(VERTICES_PER_FACE)
                .filter(|face| face.iter().all(|v| (rings_u..=rings_u + 16).contains(&v.tex_coords[0])))
                .map(|face| face[0].color[0])
                .collect()
        };

        assert_eq!(ring_faces(&upright), vec![BlockSide::BOTTOM.shade(), BlockSide::TOP.shade()]);
        assert_eq!(ring_faces(&sideways), vec![BlockSide::LEFT.shade(); 2]);
    }

    #[test]
    fn test_bottom_slab_always_emits_inner_top() {
        let slab = Block::of(BlockType::STONE_SLAB, 0);
        let stone = Block::of(BlockType::STONE, 0);
        let vertices = emit(slab, [stone; 6]);
        assert_eq!(faces(&vertices), 1);
        assert!(vertices.iter().all(|v| v.position[1] == 0.5));
    }

    #[test]
    fn test_upper_slab_covers_top_boundary() {
        let upper = Block::of(BlockType::STONE_SLAB, 8);
        assert!(BlockModel::Slab(&SLAB_VARIANTS).occludes(upper, BlockSide::TOP));
        assert!(!BlockModel::Slab(&SLAB_VARIANTS).occludes(upper, BlockSide::BOTTOM));

        let vertices = emit(upper, [Block::AIR; 6]);
        assert_eq!(faces(&vertices), 6);
        assert!(vertices.iter().all(|v| v.position[1] >= 0.5));
    }

    #[test]
    fn test_bottom_slab_above_hides_top_face() {
        let stone = Block::of(BlockType::STONE, 0);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::TOP as usize] = Block::of(BlockType::STONE_SLAB, 0);
        assert_eq!(faces(&emit(stone, neighbors)), 5);
    }

    #[test]
    fn test_stacked_identical_slabs_keep_facing_faces() {
        let bottom = Block::of(BlockType::STONE_SLAB, 0);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::BOTTOM as usize] = bottom;
        let vertices = emit(bottom, neighbors);
        assert_eq!(faces(&vertices), 6);
        assert_eq!(flat_faces_at(&vertices, 0.0), 1);

        let upper = Block::of(BlockType::STONE_SLAB, 8);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::TOP as usize] = upper;
        let vertices = emit(upper, neighbors);
        assert_eq!(faces(&vertices), 6);
        assert_eq!(flat_faces_at(&vertices, 1.0), 1);
    }

    #[test]
    fn test_identical_slabs_side_by_side_hide_shared_face() {
        let slab = Block::of(BlockType::STONE_SLAB, 0);
        let mut neighbors = [Block::AIR; 6];
        neighbors[BlockSide::LEFT as usize] = slab;
        neighbors[BlockSide::FRONT as usize] = slab;
        assert_eq!(faces(&emit(slab, neighbors)), 4);

        // A bottom slab next to an upper slab shares no boundary.
        neighbors[BlockSide::LEFT as usize] = Block::of(BlockType::STONE_SLAB, 8);
        assert_eq!(faces(&emit(slab, neighbors)), 5);
    }

    #[test]
    fn test_wool_color_follows_metadata() {
        let white = emit(Block::of(BlockType::WOOL, 0), [Block::AIR; 6]);
        let black = emit(Block::of(BlockType::WOOL, 15), [Block::AIR; 6]);
        assert_ne!(white[0].tex_coords, black[0].tex_coords);
    }
}
