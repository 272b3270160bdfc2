//! Graphic set types module - the four tile-layer graphic set variants and
//! the entity graphic set, plus the small discriminator enums they're keyed
//! by (direction, terrain height, wall type, entity graphic type).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::geometry::Vector3;
use crate::types::graphic::GraphicId;

/// One of the 8 compass directions an entity or Floor/Object graphic can
/// face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    /// True for the four diagonal directions.
    pub fn is_ordinal(&self) -> bool {
        matches!(
            self,
            Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
        )
    }

    /// For an ordinal direction, the two cardinal directions adjacent to it.
    /// Returns `None` for a direction that's already cardinal.
    pub fn adjacent_cardinals(&self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NorthEast => Some((Direction::North, Direction::East)),
            Direction::SouthEast => Some((Direction::South, Direction::East)),
            Direction::SouthWest => Some((Direction::South, Direction::West)),
            Direction::NorthWest => Some((Direction::North, Direction::West)),
            _ => None,
        }
    }

    /// The single nearer cardinal fallback used by the graphic-type fallback
    /// ladder: South-ish ordinals fall back to South, North-ish to North.
    pub fn nearer_cardinal(&self) -> Direction {
        match self {
            Direction::SouthEast | Direction::SouthWest => Direction::South,
            Direction::NorthEast | Direction::NorthWest => Direction::North,
            other => *other,
        }
    }

    /// Maps a normalized 2D direction vector (components rounded to -1/0/1,
    /// Z ignored) to the closest compass direction, defaulting to South on a
    /// zero vector.
    pub fn from_vector(direction_vec: Vector3) -> Direction {
        let normalized = Vector3::new(direction_vec.x, direction_vec.y, 0.0).normalized();
        let x = normalized.x.round() as i32;
        let y = normalized.y.round() as i32;
        match (x, y) {
            (-1, -1) => Direction::NorthWest,
            (-1, 0) => Direction::West,
            (-1, 1) => Direction::SouthWest,
            (0, -1) => Direction::North,
            (0, 1) => Direction::South,
            (1, -1) => Direction::NorthEast,
            (1, 0) => Direction::East,
            (1, 1) => Direction::SouthEast,
            _ => Direction::South,
        }
    }
}

/// Terrain height, bit-packed into a tile layer's graphic value as
/// (start height, total height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainHeight {
    Flat,
    OneThird,
    TwoThirds,
    Full,
}

impl TerrainHeight {
    pub const ALL: [TerrainHeight; 4] =
        [TerrainHeight::Flat, TerrainHeight::OneThird, TerrainHeight::TwoThirds, TerrainHeight::Full];

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    /// World units of height contributed by one "third" step.
    pub fn step_world_height(tile_world_width: u32) -> f32 {
        tile_world_width as f32 / 3.0
    }
}

/// Which of the 4 wall graphics a Wall layer selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallType {
    West,
    North,
    NorthWestGapFill,
    NorthEastGapFill,
}

impl WallType {
    pub const ALL: [WallType; 4] =
        [WallType::West, WallType::North, WallType::NorthWestGapFill, WallType::NorthEastGapFill];

    pub fn to_index(&self) -> usize {
        *self as usize
    }
}

/// The per-entity graphic family/direction key used by [`EntityGraphicSet`].
/// Values >= 50 are reserved for project-defined extensions (see
/// `NotSet`/`Crouch`/`Jump`, which the base engine never assigns graphics to
/// but which are part of the manifest's type space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityGraphicType {
    NotSet,
    Idle,
    Run,
    Crouch,
    Jump,
}

impl EntityGraphicType {
    pub fn is_not_set(&self) -> bool {
        matches!(self, EntityGraphicType::NotSet)
    }
}

/// `array[TerrainHeight] -> GraphicId`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerrainGraphicSet {
    pub numeric_id: u32,
    pub string_id: String,
    pub display_name: String,
    pub graphics: [GraphicId; 4],
}

impl TerrainGraphicSet {
    pub fn graphic(&self, height: TerrainHeight) -> GraphicId {
        self.graphics[height.to_index()]
    }
}

/// `array[Direction] -> GraphicId`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloorGraphicSet {
    pub numeric_id: u32,
    pub string_id: String,
    pub display_name: String,
    pub graphics: [GraphicId; 8],
}

impl FloorGraphicSet {
    pub fn graphic(&self, direction: Direction) -> GraphicId {
        self.graphics[direction.to_index()]
    }
}

/// `array[WallType] -> GraphicId`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WallGraphicSet {
    pub numeric_id: u32,
    pub string_id: String,
    pub display_name: String,
    pub graphics: [GraphicId; 4],
}

impl WallGraphicSet {
    pub fn graphic(&self, wall_type: WallType) -> GraphicId {
        self.graphics[wall_type.to_index()]
    }
}

/// `array[Direction] -> GraphicId`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectGraphicSet {
    pub numeric_id: u32,
    pub string_id: String,
    pub display_name: String,
    pub graphics: [GraphicId; 8],
}

impl ObjectGraphicSet {
    pub fn graphic(&self, direction: Direction) -> GraphicId {
        self.graphics[direction.to_index()]
    }
}

/// `map[EntityGraphicType] -> array[Direction] -> GraphicId`. The
/// `(Idle, South)` slot is always present (enforced by the registry parser).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityGraphicSet {
    pub numeric_id: u32,
    pub string_id: String,
    pub display_name: String,
    pub graphics: HashMap<EntityGraphicType, [GraphicId; 8]>,
    /// Precomputed per-graphic alignment offsets so sprites of differing
    /// sizes within the set remain anchored to the same world point.
    pub alignment_offsets: HashMap<(EntityGraphicType, Direction), Vector3>,
}

impl EntityGraphicSet {
    /// Looks up `(graphic_type, direction)` directly, with no fallback.
    pub fn graphic(&self, graphic_type: EntityGraphicType, direction: Direction) -> Option<GraphicId> {
        self.graphics
            .get(&graphic_type)
            .map(|by_direction| by_direction[direction.to_index()])
    }

    pub fn contains(&self, graphic_type: EntityGraphicType, direction: Direction) -> bool {
        self.graphic(graphic_type, direction).is_some_and(|id| id != GraphicId::NULL)
    }

    pub fn render_alignment_offset(&self, graphic_type: EntityGraphicType, direction: Direction) -> Vector3 {
        self.alignment_offsets
            .get(&(graphic_type, direction))
            .copied()
            .unwrap_or(Vector3::ZERO)
    }

    /// Applies the fallback ladder (see `entity_graphic_state` module) to
    /// find a graphic that's actually present in this set, guaranteed to
    /// terminate at `(Idle, South)`.
    pub fn resolve_fallback(
        &self,
        family: EntityGraphicType,
        direction: Direction,
        previous_direction: Direction,
    ) -> (EntityGraphicType, Direction) {
        if self.contains(family, direction) {
            return (family, direction);
        }

        if direction.is_ordinal() {
            if let Some((a, b)) = direction.adjacent_cardinals() {
                if (previous_direction == a || previous_direction == b)
                    && self.contains(family, previous_direction)
                {
                    return (family, previous_direction);
                }
            }
            let nearer = direction.nearer_cardinal();
            if self.contains(family, nearer) {
                return (family, nearer);
            }
        }

        if self.contains(EntityGraphicType::Idle, direction) {
            return (EntityGraphicType::Idle, direction);
        }

        (EntityGraphicType::Idle, Direction::South)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(entries: &[(EntityGraphicType, Direction)]) -> EntityGraphicSet {
        let mut set = EntityGraphicSet::default();
        for (ty, dir) in entries {
            let arr = set.graphics.entry(*ty).or_insert([GraphicId::NULL; 8]);
            arr[dir.to_index()] = GraphicId::from_sprite_id(1);
        }
        set
    }

    #[test]
    fn direction_from_vector_defaults_south_on_zero() {
        assert_eq!(Direction::from_vector(Vector3::ZERO), Direction::South);
    }

    #[test]
    fn direction_from_vector_matches_compass() {
        assert_eq!(Direction::from_vector(Vector3::new(0.0, 1.0, 0.0)), Direction::South);
        assert_eq!(Direction::from_vector(Vector3::new(1.0, 0.0, 0.0)), Direction::East);
        assert_eq!(Direction::from_vector(Vector3::new(-1.0, -1.0, 0.0)), Direction::NorthWest);
    }

    #[test]
    fn fallback_ladder_matches_scenario_four() {
        let set = set_with(&[
            (EntityGraphicType::Idle, Direction::South),
            (EntityGraphicType::Idle, Direction::North),
            (EntityGraphicType::Run, Direction::South),
            (EntityGraphicType::Run, Direction::North),
        ]);

        // SouthEast with no previous-direction strafe context falls to the
        // nearer cardinal, South.
        let (ty, dir) = set.resolve_fallback(EntityGraphicType::Idle, Direction::SouthEast, Direction::South);
        assert_eq!((ty, dir), (EntityGraphicType::Idle, Direction::South));

        let (ty, dir) = set.resolve_fallback(EntityGraphicType::Idle, Direction::NorthEast, Direction::North);
        assert_eq!((ty, dir), (EntityGraphicType::Idle, Direction::North));
    }

    #[test]
    fn fallback_ladder_keeps_strafe_when_previous_cardinal_present() {
        let set = set_with(&[
            (EntityGraphicType::Run, Direction::North),
            (EntityGraphicType::Run, Direction::East),
        ]);

        // Entity was running East, turns to NorthEast (ordinal, missing).
        // NorthEast's adjacent cardinals are North and East; East is the
        // previously-displayed direction and is present, so we keep it
        // rather than snapping straight to North.
        let (ty, dir) =
            set.resolve_fallback(EntityGraphicType::Run, Direction::NorthEast, Direction::East);
        assert_eq!((ty, dir), (EntityGraphicType::Run, Direction::East));
    }

    #[test]
    fn fallback_ladder_terminates_at_idle_south() {
        let set = set_with(&[(EntityGraphicType::Idle, Direction::South)]);
        let (ty, dir) = set.resolve_fallback(EntityGraphicType::Run, Direction::West, Direction::East);
        assert_eq!((ty, dir), (EntityGraphicType::Idle, Direction::South));
    }
}
