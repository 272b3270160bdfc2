//! Tile types module - the four tile-layer variants, their identity key for
//! hit-testing/color-mod lookups, and the owning `Tile` record.

use crate::types::geometry::TilePosition;
use crate::types::graphic_set::{TerrainHeight, WallType};

/// Which of the four graphic-set families a [`TileLayer`] draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileLayerType {
    Terrain,
    Floor,
    Wall,
    Object,
}

/// A fractional tile displacement, used by Floor and Object layers to place
/// sub-tile decorations; Terrain and Wall layers always use a zero offset
/// (Walls instead encode their vertical displacement via `TileLayer::z_offset`,
/// derived from the tile's terrain height).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileOffset {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One placed layer within a [`Tile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayer {
    pub layer_type: TileLayerType,
    pub graphic_set_id: u32,
    /// Meaning depends on `layer_type`: for Terrain, a bit-packed
    /// (start-height, total-height) pair (see [`TileLayer::terrain_height`]
    /// and [`TileLayer::terrain_start_height`]); for Wall, a [`WallType`]
    /// index; for Floor/Object, a [`crate::types::graphic_set::Direction`]
    /// index.
    pub graphic_value: u8,
    pub tile_offset: TileOffset,
}

impl TileLayer {
    /// Decodes the total height (in terrain-height steps) from a Terrain
    /// layer's graphic value. The low nibble holds total height, the high
    /// nibble holds start height.
    pub fn terrain_height(&self) -> TerrainHeight {
        match self.graphic_value & 0x0F {
            0 => TerrainHeight::Flat,
            1 => TerrainHeight::OneThird,
            2 => TerrainHeight::TwoThirds,
            _ => TerrainHeight::Full,
        }
    }

    /// Decodes the start height (in terrain-height steps) from a Terrain
    /// layer's graphic value.
    pub fn terrain_start_height(&self) -> u8 {
        (self.graphic_value >> 4) & 0x0F
    }

    pub fn wall_type(&self) -> WallType {
        WallType::ALL[(self.graphic_value as usize) % WallType::ALL.len()]
    }
}

/// The minimal tuple that uniquely identifies a placed layer, used for
/// hit-testing and as the color-mod lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLayerId {
    pub tile_position: TilePosition,
    pub tile_offset_key: (i32, i32, i32),
    pub layer_type: TileLayerType,
    pub graphic_set_id: u32,
    pub graphic_value: u8,
}

impl TileLayerId {
    pub fn new(tile_position: TilePosition, tile_offset: TileOffset, layer: &TileLayer) -> Self {
        TileLayerId {
            tile_position,
            tile_offset_key: (
                tile_offset.x.to_bits() as i32,
                tile_offset.y.to_bits() as i32,
                tile_offset.z.to_bits() as i32,
            ),
            layer_type: layer.layer_type,
            graphic_set_id: layer.graphic_set_id,
            graphic_value: layer.graphic_value,
        }
    }
}

/// A single map tile: up to one Terrain layer, plus any number of Floor,
/// Wall, and Object layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tile {
    pub terrain: Option<TileLayer>,
    pub floors: Vec<TileLayer>,
    pub walls: Vec<TileLayer>,
    pub objects: Vec<TileLayer>,
}

impl Tile {
    pub fn layers_of(&self, layer_type: TileLayerType) -> Vec<&TileLayer> {
        match layer_type {
            TileLayerType::Terrain => self.terrain.iter().collect(),
            TileLayerType::Floor => self.floors.iter().collect(),
            TileLayerType::Wall => self.walls.iter().collect(),
            TileLayerType::Object => self.objects.iter().collect(),
        }
    }

    pub fn first_layer_of(&self, layer_type: TileLayerType) -> Option<&TileLayer> {
        match layer_type {
            TileLayerType::Terrain => self.terrain.as_ref(),
            TileLayerType::Floor => self.floors.first(),
            TileLayerType::Wall => self.walls.first(),
            TileLayerType::Object => self.objects.first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_height_decodes_low_nibble() {
        let layer = TileLayer {
            layer_type: TileLayerType::Terrain,
            graphic_set_id: 7,
            graphic_value: 0x02,
            tile_offset: TileOffset::default(),
        };
        assert_eq!(layer.terrain_height(), TerrainHeight::TwoThirds);
        assert_eq!(layer.terrain_start_height(), 0);
    }

    #[test]
    fn first_layer_of_returns_none_for_empty_tile() {
        let tile = Tile::default();
        assert!(tile.first_layer_of(TileLayerType::Wall).is_none());
    }
}
