//! Entity types module - server-synced entities, client-local transient A/V
//! entities, their shared graphic-selection state, and visual effects.

use bitflags::bitflags;

use crate::types::geometry::Vector3;
use crate::types::graphic_set::{Direction, EntityGraphicType};

/// Identity of a server-synced [`Entity`].
pub type EntityId = u32;
/// Identity of a client-local [`AVEntity`].
pub type AVEntityId = u32;

bitflags! {
    /// Movement intent bits. Any bit set means the entity is moving, which
    /// drives the Idle/Run choice in the graphic state machine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Input: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// Which entity graphic set an entity draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicState {
    pub graphic_set_id: u32,
}

/// The currently-selected graphic within an entity's graphic set, plus the
/// bookkeeping needed to time its animation. Mutated by both the simulation
/// (entity graphic state machine / A/V system) and the sorter (which starts
/// the animation clock on the first frame it's observed).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientGraphicState {
    pub graphic_type: EntityGraphicType,
    pub direction: Direction,
    pub animation_start_time: f64,
    /// Set when the next sort/tick must capture a fresh
    /// `animation_start_time`; direction-only changes don't set this so a
    /// Run animation keeps playing smoothly through a turn.
    pub set_start_time: bool,
}

impl Default for EntityGraphicType {
    fn default() -> Self {
        EntityGraphicType::NotSet
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::South
    }
}

/// A server-synced, drawable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vector3,
    pub previous_position: Option<Vector3>,
    pub input: Input,
    pub rotation: Direction,
    pub graphic_state: GraphicState,
    pub client_graphic_state: ClientGraphicState,
    pub av_effects: Vec<VisualEffectState>,
}

/// Behaviors an A/V entity phase can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    MoveToEntity,
    MoveToPosition,
    FollowEntityStartCaster,
    FollowEntityStartTarget,
    FollowDirection,
    StaticPosition,
    /// Invalid as a phase's definition does not include one when it's the
    /// first phase.
    CurrentPosition,
}

impl Behavior {
    /// True for behaviors whose completion is governed by elapsed time
    /// rather than reaching a target position.
    pub fn is_time_based(&self) -> bool {
        matches!(
            self,
            Behavior::FollowEntityStartCaster
                | Behavior::FollowDirection
                | Behavior::FollowEntityStartTarget
                | Behavior::StaticPosition
                | Behavior::CurrentPosition
        )
    }

    /// True for behaviors whose completion is governed by reaching the
    /// target position exactly.
    pub fn is_position_based(&self) -> bool {
        matches!(self, Behavior::MoveToEntity | Behavior::MoveToPosition)
    }
}

/// One phase of an [`AVEntityDefinition`]'s behavior chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub graphic_set_id: u32,
    pub behavior: Behavior,
    pub movement_speed: f32,
    /// -1 means "until the current graphic completes".
    pub duration_s: f32,
}

/// Immutable, authored definition of an A/V entity's phase chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AVEntityDefinition {
    pub numeric_id: u32,
    pub string_id: String,
    pub start_distance: f32,
    pub can_move_vertically: bool,
    pub phases: Vec<Phase>,
}

/// Runtime phase-tracking state for an [`AVEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AVEntityState {
    pub av_entity_definition_id: u32,
    pub target_entity: Option<EntityId>,
    pub target_position: Option<Vector3>,
    pub current_phase_index: usize,
    /// 0 means "not yet set".
    pub phase_start_time: f64,
    pub set_start_time: bool,
}

/// A client-local, transient A/V entity (a spell effect, an impact, etc).
#[derive(Debug, Clone, PartialEq)]
pub struct AVEntity {
    pub id: AVEntityId,
    pub position: Vector3,
    pub previous_position: Option<Vector3>,
    pub graphic_state: GraphicState,
    pub client_graphic_state: ClientGraphicState,
    pub av_state: AVEntityState,
}

/// How a looping visual effect's lifetime is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    PlayOnce,
    Loop,
}

/// Immutable, authored definition of a visual effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualEffectDefinition {
    pub numeric_id: u32,
    pub graphic_id: crate::types::graphic::GraphicId,
    pub loop_mode: LoopMode,
    pub loop_time: f64,
}

/// Runtime timing state for a visual effect attached to an entity. Timing is
/// managed by the sorter (it starts the clock the first time it renders the
/// effect).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualEffectState {
    pub definition_id: u32,
    /// 0 means "not yet started".
    pub start_time: f64,
}

/// A resolved `None | TileLayer | Entity | AVEntity` owner tag for a sorted
/// sprite, used for hit-testing, color-mod keying, and the A/V-entity
/// in-front override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldObjectId {
    None,
    TileLayer(crate::types::tile::TileLayerId),
    Entity(EntityId),
    AVEntity(AVEntityId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_classification_is_mutually_exclusive() {
        for behavior in [
            Behavior::MoveToEntity,
            Behavior::MoveToPosition,
            Behavior::FollowEntityStartCaster,
            Behavior::FollowEntityStartTarget,
            Behavior::FollowDirection,
            Behavior::StaticPosition,
            Behavior::CurrentPosition,
        ] {
            assert_ne!(behavior.is_time_based(), behavior.is_position_based());
        }
    }

    #[test]
    fn input_empty_has_no_bits_set() {
        assert!(Input::empty().is_empty());
        assert!(!Input::UP.is_empty());
    }
}
