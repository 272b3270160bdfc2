//! Geometry types module - world/tile/chunk positions, bounding volumes, and
//! the screen-space camera rectangle used by the transforms and sorter.

use serde::{Deserialize, Serialize};

use crate::constants::{CHUNK_WIDTH, TILE_WORLD_WIDTH};

/// A continuous 3D point in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3 { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns this vector scaled to unit length. Returns [`Vector3::ZERO`]
    /// if the vector has zero length (avoids a divide-by-zero).
    pub fn normalized(&self) -> Vector3 {
        let len = self.length();
        if len == 0.0 {
            return Vector3::ZERO;
        }
        Vector3::new(self.x / len, self.y / len, self.z / len)
    }

    pub fn scaled(&self, factor: f32) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// The position of a particular map tile, in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        TilePosition { x, y, z }
    }

    /// Calculates the position of the tile that contains the given world
    /// point.
    pub fn from_world_point(point: Vector3) -> Self {
        TilePosition {
            x: (point.x / TILE_WORLD_WIDTH as f32).floor() as i32,
            y: (point.y / TILE_WORLD_WIDTH as f32).floor() as i32,
            z: (point.z / TILE_WORLD_WIDTH as f32).floor() as i32,
        }
    }

    /// Returns the world point at this tile's origin (the least extreme
    /// point along all axes).
    pub fn origin_point(&self) -> Vector3 {
        Vector3::new(
            (self.x * TILE_WORLD_WIDTH as i32) as f32,
            (self.y * TILE_WORLD_WIDTH as i32) as f32,
            (self.z * TILE_WORLD_WIDTH as i32) as f32,
        )
    }

    pub fn to_chunk_position(&self) -> ChunkPosition {
        ChunkPosition {
            x: self.x.div_euclid(CHUNK_WIDTH as i32),
            y: self.y.div_euclid(CHUNK_WIDTH as i32),
            z: self.z,
        }
    }
}

/// The position of a particular map chunk, in chunk units along X/Y (chunks
/// are one tile tall along Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkPosition { x, y, z }
    }
}

/// An axis-aligned bounding volume in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        BoundingBox { min, max }
    }

    pub fn translated(&self, offset: Vector3) -> BoundingBox {
        BoundingBox::new(self.min + offset, self.max + offset)
    }

    /// Strict componentwise intersection test. Boxes that only touch at an
    /// edge or face are *not* considered intersecting - this mirrors the
    /// upstream renderer's temporary reimplementation of
    /// `SDL_HasRectIntersectionFloat` and must not be loosened to `<=`.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// True iff `other` is "behind" `self`, per the sorter's occlusion test:
    /// `other`'s min corner sits strictly inside the half-space formed by
    /// `self`'s max corner on every axis.
    pub fn is_behind(&self, other: &BoundingBox) -> bool {
        other.min.x < self.max.x && other.min.y < self.max.y && other.min.z < self.max.z
    }
}

/// An axis-aligned rectangle in screen-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        ScreenRect { x, y, w, h }
    }

    /// True if this rect has zero or negative area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Strict intersection test, matching [`BoundingBox::intersects`]'s
    /// edge-touching-is-not-overlapping semantics.
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < (other.x + other.w)
            && other.x < (self.x + self.w)
            && self.y < (other.y + other.h)
            && other.y < (self.y + self.h)
    }
}

/// The render camera: a screen-space view rectangle over the world, with a
/// zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space point currently under the screen top-left corner.
    pub position: Vector3,
    /// Width/height of the camera's view in screen pixels.
    pub screen_extent: ScreenRect,
    pub zoom: f32,
}

impl Camera {
    pub fn new(position: Vector3, screen_extent: ScreenRect, zoom: f32) -> Self {
        Camera { position, screen_extent, zoom }
    }

    /// The camera's view rectangle in screen-space, anchored at (0, 0).
    pub fn view_rect(&self) -> ScreenRect {
        ScreenRect::new(0.0, 0.0, self.screen_extent.w, self.screen_extent.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
    }

    #[test]
    fn tile_position_round_trips_through_chunk() {
        let tile = TilePosition::new(20, 5, 0);
        let chunk = tile.to_chunk_position();
        assert_eq!(chunk, ChunkPosition::new(1, 0, 0));
    }

    #[test]
    fn tile_position_from_world_point_floors_negative_correctly() {
        let point = Vector3::new(-1.0, 0.0, 0.0);
        let tile = TilePosition::from_world_point(point);
        assert_eq!(tile.x, -1);
    }

    #[test]
    fn bounding_box_edge_touch_is_not_intersecting() {
        let a = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(32.0, 32.0, 32.0));
        let b = BoundingBox::new(Vector3::new(32.0, 0.0, 0.0), Vector3::new(64.0, 32.0, 32.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn is_behind_is_one_directional_for_disjoint_boxes() {
        // A sits strictly inside the half-space formed by B's max corner on
        // every axis, so A is behind B. The reverse does not hold: B's min.y
        // (64) is not less than A's max.y (32), since there's a gap between
        // them on the Y axis.
        let a = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(32.0, 32.0, 32.0));
        let b = BoundingBox::new(Vector3::new(0.0, 64.0, 0.0), Vector3::new(32.0, 96.0, 32.0));
        assert!(b.is_behind(&a));
        assert!(!a.is_behind(&b));
    }
}
