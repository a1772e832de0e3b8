//! # Block Type Module
//!
//! Named block ids for the blocks the tessellator has dedicated rules for.
//! Any other 12-bit id is still a valid block; it simply has no name here and
//! renders with the fallback model.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockId;

/// Enumerates the block ids with dedicated rendering rules.
///
/// The discriminants are the wire ids delivered by the protocol layer. The
/// `FromPrimitive` derive allows converting a raw id back to a variant.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u16)]
pub enum BlockType {
    /// Empty space. Never tessellated, never occludes.
    AIR = 0,
    /// Stone; metadata selects granite/diorite/andesite and polished forms.
    STONE = 1,
    /// Grass block; the top face is tinted by the biome grass color.
    GRASS = 2,
    /// Dirt.
    DIRT = 3,
    /// Cobblestone.
    COBBLESTONE = 4,
    /// Wooden planks; metadata selects the wood species.
    PLANKS = 5,
    /// Bedrock.
    BEDROCK = 7,
    /// Sand.
    SAND = 12,
    /// Gravel.
    GRAVEL = 13,
    /// Log; metadata bits 0-1 select species, bits 2-3 the orientation.
    LOG = 17,
    /// Leaves; tinted by the biome foliage color.
    LEAVES = 18,
    /// Glass; does not hide neighboring faces.
    GLASS = 20,
    /// Sandstone; metadata selects normal, chiseled, or smooth finish.
    SANDSTONE = 24,
    /// Wool; metadata selects one of sixteen colors.
    WOOL = 35,
    /// Two stacked slabs forming a full block.
    DOUBLE_STONE_SLAB = 43,
    /// Half-height slab; bit 3 of metadata places it in the upper half.
    STONE_SLAB = 44,
    /// Stone bricks; metadata selects normal, mossy, cracked, or chiseled.
    STONE_BRICK = 98,
    /// Second leaves table (acacia, dark oak).
    LEAVES2 = 161,
    /// Second log table (acacia, dark oak).
    LOG2 = 162,
}

impl BlockType {
    /// Converts a raw block id to a named `BlockType`.
    ///
    /// # Returns
    /// `None` for ids without dedicated rendering rules.
    pub fn from_id(id: BlockId) -> Option<Self> {
        FromPrimitive::from_u16(id)
    }

    /// The wire id of this block type.
    pub const fn id(self) -> BlockId {
        self as BlockId
    }
}
