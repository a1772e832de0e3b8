//! # Biome Module
//!
//! Maps biome ids to the colormap coordinates used to tint grass and foliage.
//!
//! The tessellator does not compute colors itself. Biome-tinted faces carry the
//! colormap coordinates in the vertex mask-uv attribute and the shader samples
//! the grass or foliage colormap with them.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ConfigError;

/// Colormap coordinates for one biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BiomeColors {
    /// Grass colormap coordinates.
    pub grass: [u8; 2],
    /// Foliage colormap coordinates.
    pub foliage: [u8; 2],
}

impl BiomeColors {
    /// Uses the same coordinates for grass and foliage.
    pub const fn uniform(u: u8, v: u8) -> Self {
        Self {
            grass: [u, v],
            foliage: [u, v],
        }
    }
}

/// Biome id to colormap coordinates, with a fallback for unknown ids.
#[derive(Debug, Clone)]
pub struct BiomeColorTable {
    default: BiomeColors,
    entries: Box<[Option<BiomeColors>; 256]>,
}

#[derive(Deserialize)]
struct RawTable {
    default: BiomeColors,
    #[serde(default)]
    biomes: HashMap<u8, BiomeColors>,
}

impl BiomeColorTable {
    /// Creates a table where every biome uses `default`.
    pub fn new(default: BiomeColors) -> Self {
        Self {
            default,
            entries: Box::new([None; 256]),
        }
    }

    /// Sets the colors of one biome.
    pub fn insert(&mut self, biome: u8, colors: BiomeColors) {
        self.entries[biome as usize] = Some(colors);
    }

    /// Colors of `biome`, or the default entry if it has none.
    #[inline]
    pub fn get(&self, biome: u8) -> BiomeColors {
        self.entries[biome as usize].unwrap_or(self.default)
    }

    /// The fallback entry.
    pub fn default_colors(&self) -> BiomeColors {
        self.default
    }

    /// Parses a table from JSON.
    ///
    /// ```json
    /// {
    ///     "default": { "grass": [51, 173], "foliage": [51, 173] },
    ///     "biomes": { "4": { "grass": [76, 112], "foliage": [76, 112] } }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawTable = serde_json::from_str(json)?;
        let mut table = Self::new(raw.default);
        for (biome, colors) in raw.biomes {
            table.insert(biome, colors);
        }
        Ok(table)
    }
}

impl Default for BiomeColorTable {
    /// Coordinates derived from each biome's temperature and rainfall:
    /// `u = (1 - t) * 255`, `v = (1 - r * t) * 255`.
    fn default() -> Self {
        let plains = BiomeColors::uniform(51, 173);
        let mut table = Self::new(plains);
        for (biome, colors) in [
            (0, BiomeColors::uniform(127, 191)),
            (1, plains),
            (2, BiomeColors::uniform(0, 255)),
            (3, BiomeColors::uniform(204, 239)),
            (4, BiomeColors::uniform(76, 112)),
            (5, BiomeColors::uniform(191, 204)),
            (6, BiomeColors::uniform(51, 71)),
            (21, BiomeColors::uniform(12, 37)),
        ] {
            table.insert(biome, colors);
        }
        table
    }
}
