//! Tile map types module - the 3D chunked tile grid the sorter gathers tile
//! sprites from.

use std::collections::HashMap;

use crate::constants::CHUNK_WIDTH;
use crate::types::geometry::{ChunkPosition, TilePosition};
use crate::types::tile::Tile;

/// A fixed-size (`CHUNK_WIDTH` x `CHUNK_WIDTH` x 1) block of tiles, the unit
/// of map storage. Tiles default to empty until explicitly set.
#[derive(Debug, Clone)]
pub struct Chunk {
    tiles: Vec<Tile>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk { tiles: vec![Tile::default(); (CHUNK_WIDTH * CHUNK_WIDTH) as usize] }
    }

    fn local_index(local_x: u32, local_y: u32) -> usize {
        (local_y * CHUNK_WIDTH + local_x) as usize
    }

    pub fn tile(&self, local_x: u32, local_y: u32) -> &Tile {
        &self.tiles[Self::local_index(local_x, local_y)]
    }

    pub fn tile_mut(&mut self, local_x: u32, local_y: u32) -> &mut Tile {
        &mut self.tiles[Self::local_index(local_x, local_y)]
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Chunk::new()
    }
}

/// An inclusive range of tile positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileExtent {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl TileExtent {
    /// Clamps `other` to lie within `self`.
    pub fn intersect(&self, other: &TileExtent) -> TileExtent {
        TileExtent {
            x_min: self.x_min.max(other.x_min),
            x_max: self.x_max.min(other.x_max),
            y_min: self.y_min.max(other.y_min),
            y_max: self.y_max.min(other.y_max),
            z_min: self.z_min.max(other.z_min),
            z_max: self.z_max.min(other.z_max),
        }
    }

    pub fn iter_positions(&self) -> impl Iterator<Item = TilePosition> + '_ {
        (self.z_min..=self.z_max).flat_map(move |z| {
            (self.y_min..=self.y_max)
                .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TilePosition::new(x, y, z)))
        })
    }
}

/// A 3D grid of chunks. Chunks are allocated lazily; a chunk that was never
/// written is treated as fully empty.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    chunks: HashMap<ChunkPosition, Chunk>,
    tile_extent: TileExtent,
}

impl TileMap {
    pub fn new(tile_extent: TileExtent) -> Self {
        TileMap { chunks: HashMap::new(), tile_extent }
    }

    pub fn tile_extent(&self) -> TileExtent {
        self.tile_extent
    }

    /// Returns the tile at `position`, or `None` if its chunk has never been
    /// allocated (an empty region of the map).
    pub fn get(&self, position: TilePosition) -> Option<&Tile> {
        let chunk_pos = position.to_chunk_position();
        let chunk = self.chunks.get(&chunk_pos)?;
        let (local_x, local_y) = local_coords(position, chunk_pos);
        Some(chunk.tile(local_x, local_y))
    }

    /// Returns a mutable reference to the tile at `position`, allocating its
    /// chunk if necessary.
    pub fn get_or_create_mut(&mut self, position: TilePosition) -> &mut Tile {
        let chunk_pos = position.to_chunk_position();
        let chunk = self.chunks.entry(chunk_pos).or_insert_with(Chunk::new);
        let (local_x, local_y) = local_coords(position, chunk_pos);
        chunk.tile_mut(local_x, local_y)
    }
}

fn local_coords(position: TilePosition, chunk_pos: ChunkPosition) -> (u32, u32) {
    let local_x = (position.x - chunk_pos.x * CHUNK_WIDTH as i32) as u32;
    let local_y = (position.y - chunk_pos.y * CHUNK_WIDTH as i32) as u32;
    (local_x, local_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tile::{TileLayer, TileLayerType, TileOffset};

    #[test]
    fn get_on_unallocated_chunk_returns_none() {
        let map = TileMap::new(TileExtent { x_min: 0, x_max: 33, y_min: 0, y_max: 33, z_min: 0, z_max: 0 });
        assert!(map.get(TilePosition::new(5, 5, 0)).is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut map = TileMap::new(TileExtent { x_min: 0, x_max: 33, y_min: 0, y_max: 33, z_min: 0, z_max: 0 });
        let pos = TilePosition::new(20, 20, 0);
        map.get_or_create_mut(pos).terrain = Some(TileLayer {
            layer_type: TileLayerType::Terrain,
            graphic_set_id: 7,
            graphic_value: 0x02,
            tile_offset: TileOffset::default(),
        });
        let tile = map.get(pos).expect("tile should exist after set");
        assert!(tile.terrain.is_some());
    }

    #[test]
    fn tile_extent_iterates_row_major() {
        let extent = TileExtent { x_min: 0, x_max: 1, y_min: 0, y_max: 1, z_min: 0, z_max: 0 };
        let positions: Vec<_> = extent.iter_positions().collect();
        assert_eq!(
            positions,
            vec![
                TilePosition::new(0, 0, 0),
                TilePosition::new(1, 0, 0),
                TilePosition::new(0, 1, 0),
                TilePosition::new(1, 1, 0),
            ]
        );
    }
}
