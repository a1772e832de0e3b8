//! # Block Module
//!
//! This module provides the packed block record stored in chunks, along with
//! block face and block type definitions.

pub mod block_side;
pub mod block_type;

use block_type::BlockType;

/// The integer type holding a 12-bit block id.
pub type BlockId = u16;

const ID_BITS: u32 = 12;
const META_SHIFT: u32 = 12;
const BLOCK_LIGHT_SHIFT: u32 = 16;
const SKY_LIGHT_SHIFT: u32 = 20;

const ID_MASK: u32 = (1 << ID_BITS) - 1;
const NIBBLE_MASK: u32 = 0xF;
/// Bits compared by `PartialEq`: id and metadata.
const IDENTITY_MASK: u32 = ID_MASK | (NIBBLE_MASK << META_SHIFT);

/// Highest block id representable in the packed record.
pub const MAX_BLOCK_ID: BlockId = ID_MASK as BlockId;

/// A single voxel block, packed into 32 bits.
///
/// # Memory Layout
/// - Bits 0-11: block id
/// - Bits 12-15: metadata (variant, orientation, color...)
/// - Bits 16-19: block light
/// - Bits 20-23: sky light
/// - Bits 24-31: padding, always zero
///
/// Equality compares the id and metadata only; two blocks that differ solely in
/// their light values are the same block. This matters for dirty tracking:
/// relighting a block is not an edit that requires re-meshing.
#[repr(transparent)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct Block(u32);

impl Block {
    /// The empty block. Also the all-zero bit pattern, so zeroed memory is air.
    pub const AIR: Block = Block(0);

    /// Creates a block from an id and metadata with no light.
    ///
    /// Out-of-range inputs are masked to their field widths.
    pub const fn new(id: BlockId, metadata: u8) -> Self {
        Block((id as u32 & ID_MASK) | ((metadata as u32 & NIBBLE_MASK) << META_SHIFT))
    }

    /// Creates a block of a named type with the given metadata.
    pub const fn of(block_type: BlockType, metadata: u8) -> Self {
        Self::new(block_type.id(), metadata)
    }

    /// Reinterprets a raw packed word as delivered by the protocol layer.
    ///
    /// The padding byte is cleared.
    pub const fn from_raw(raw: u32) -> Self {
        Block(raw & 0x00FF_FFFF)
    }

    /// The raw packed word.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The 12-bit block id.
    #[inline]
    pub const fn id(self) -> BlockId {
        (self.0 & ID_MASK) as BlockId
    }

    /// The 4-bit metadata.
    #[inline]
    pub const fn metadata(self) -> u8 {
        ((self.0 >> META_SHIFT) & NIBBLE_MASK) as u8
    }

    /// The 4-bit block light level.
    #[inline]
    pub const fn block_light(self) -> u8 {
        ((self.0 >> BLOCK_LIGHT_SHIFT) & NIBBLE_MASK) as u8
    }

    /// The 4-bit sky light level.
    #[inline]
    pub const fn sky_light(self) -> u8 {
        ((self.0 >> SKY_LIGHT_SHIFT) & NIBBLE_MASK) as u8
    }

    /// Returns a copy with the given light levels (masked to 4 bits each).
    pub const fn with_light(self, block_light: u8, sky_light: u8) -> Self {
        let cleared = self.0 & IDENTITY_MASK;
        Block(
            cleared
                | ((block_light as u32 & NIBBLE_MASK) << BLOCK_LIGHT_SHIFT)
                | ((sky_light as u32 & NIBBLE_MASK) << SKY_LIGHT_SHIFT),
        )
    }

    /// Returns `true` for the air id, regardless of metadata or light.
    #[inline]
    pub const fn is_air(self) -> bool {
        self.id() == 0
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.0 & IDENTITY_MASK == other.0 & IDENTITY_MASK
    }
}

impl Eq for Block {}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id())
            .field("metadata", &self.metadata())
            .field("block_light", &self.block_light())
            .field("sky_light", &self.sky_light())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_packing() {
        let block = Block::new(0xABC, 0x5).with_light(0x7, 0xE);
        assert_eq!(block.id(), 0xABC);
        assert_eq!(block.metadata(), 0x5);
        assert_eq!(block.block_light(), 0x7);
        assert_eq!(block.sky_light(), 0xE);
        assert_eq!(block.raw() >> 24, 0);
    }

    #[test]
    fn test_fields_are_masked() {
        let block = Block::new(0xFFFF, 0xFF);
        assert_eq!(block.id(), MAX_BLOCK_ID);
        assert_eq!(block.metadata(), 0xF);
        assert_eq!(Block::from_raw(0xFFFF_FFFF).raw(), 0x00FF_FFFF);
    }

    #[test]
    fn test_equality_ignores_light() {
        let dark = Block::of(BlockType::STONE, 2);
        let lit = dark.with_light(15, 15);
        assert_eq!(dark, lit);
        assert_ne!(dark, Block::of(BlockType::STONE, 3));
        assert_ne!(dark, Block::of(BlockType::DIRT, 2));
    }

    #[test]
    fn test_zeroed_memory_is_air() {
        let zeroed: Block = bytemuck::Zeroable::zeroed();
        assert!(zeroed.is_air());
        assert_eq!(zeroed, Block::AIR);
    }
}
