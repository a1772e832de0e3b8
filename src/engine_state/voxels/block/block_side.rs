//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, their neighbor offsets,
//! and the directional shade applied to each face when it is tessellated.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-face
/// arrays (texture tiles, neighbor blocks, visibility masks).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[allow(clippy::upper_case_acronyms)]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub const fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The face pointing the other way along the same axis.
    pub const fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Unit offset from a block to the neighbor this face looks at.
    pub const fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Directional shade baked into the vertex color of this face.
    ///
    /// Tops are fully lit, bottoms darkest, and the two horizontal axes get
    /// different values so edges stay readable without any light propagation.
    pub const fn shade(self) -> u8 {
        match self {
            BlockSide::TOP => 255,
            BlockSide::FRONT | BlockSide::BACK => 204,
            BlockSide::LEFT | BlockSide::RIGHT => 153,
            BlockSide::BOTTOM => 127,
        }
    }
}
