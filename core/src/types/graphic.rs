//! Graphic types module - sprites, animations, and the tagged-union graphic
//! reference that the sorter and graphic sets operate on.

use serde::{Deserialize, Serialize};

use crate::constants::GRAPHIC_ID_TYPE_BIT;
use crate::types::geometry::{BoundingBox, Vector3};

/// Numeric id of a [`Sprite`].
pub type SpriteId = u32;
/// Numeric id of an [`Animation`].
pub type AnimationId = u32;
/// Numeric id of a shared [`BoundingBox`] entry in the manifest.
pub type BoundingBoxId = u16;

/// A 32-bit tagged reference to either a sprite or an animation. The top bit
/// selects the type; the low 31 bits are the referenced id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct GraphicId(pub u32);

impl GraphicId {
    pub const NULL: GraphicId = GraphicId(0);

    pub fn from_sprite_id(id: SpriteId) -> Self {
        GraphicId(id & !GRAPHIC_ID_TYPE_BIT)
    }

    pub fn from_animation_id(id: AnimationId) -> Self {
        GraphicId((id & !GRAPHIC_ID_TYPE_BIT) | GRAPHIC_ID_TYPE_BIT)
    }

    pub fn is_sprite(&self) -> bool {
        (self.0 & GRAPHIC_ID_TYPE_BIT) == 0
    }

    pub fn is_animation(&self) -> bool {
        !self.is_sprite()
    }

    /// The id, stripped of the type tag bit.
    pub fn value(&self) -> u32 {
        self.0 & !GRAPHIC_ID_TYPE_BIT
    }

    pub fn to_sprite_id(&self) -> Option<SpriteId> {
        self.is_sprite().then(|| self.value())
    }

    pub fn to_animation_id(&self) -> Option<AnimationId> {
        self.is_animation().then(|| self.value())
    }
}

/// A loaded sprite. Immutable after load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sprite {
    pub numeric_id: SpriteId,
    pub string_id: String,
    pub display_name: String,
    pub collision_enabled: bool,
    /// Model-space bounding box (min/max points), used to derive world
    /// bounds once placed at a tile or entity position.
    pub model_bounds: BoundingBox,
}

/// A single (frame-number, sprite) keyframe in an [`Animation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub frame_number: u32,
    pub sprite_id: SpriteId,
}

/// A loaded animation. Immutable after load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    pub numeric_id: AnimationId,
    pub string_id: String,
    pub display_name: String,
    pub fps: u32,
    pub frame_count: u32,
    /// Ascending by `frame_number`.
    pub frames: Vec<AnimationFrame>,
    pub model_bounds: BoundingBox,
}

impl Animation {
    /// Seconds for one full loop of this animation.
    pub fn length_s(&self) -> f64 {
        self.frame_count as f64 / self.fps as f64
    }

    /// The sprite id to show at the given animation time, computed as
    /// `frame = floor(time * fps) mod frameCount`, then selecting the last
    /// keyed frame at or before that frame number.
    pub fn sprite_id_at_time(&self, time_s: f64) -> Option<SpriteId> {
        if self.frames.is_empty() || self.fps == 0 || self.frame_count == 0 {
            return None;
        }
        let frame = ((time_s * self.fps as f64).floor() as i64).rem_euclid(self.frame_count as i64) as u32;
        self.frames
            .iter()
            .rev()
            .find(|f| f.frame_number <= frame)
            .or_else(|| self.frames.first())
            .map(|f| f.sprite_id)
    }
}

/// A tagged union over a sprite reference or an animation reference,
/// resolved from the graphic data registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphicRef<'a> {
    Sprite(&'a Sprite),
    Animation(&'a Animation),
}

impl<'a> GraphicRef<'a> {
    pub fn graphic_id(&self) -> GraphicId {
        match self {
            GraphicRef::Sprite(s) => GraphicId::from_sprite_id(s.numeric_id),
            GraphicRef::Animation(a) => GraphicId::from_animation_id(a.numeric_id),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            GraphicRef::Sprite(s) => &s.display_name,
            GraphicRef::Animation(a) => &a.display_name,
        }
    }

    pub fn model_bounds(&self) -> BoundingBox {
        match self {
            GraphicRef::Sprite(s) => s.model_bounds,
            GraphicRef::Animation(a) => a.model_bounds,
        }
    }

    /// The first sprite in this graphic: itself for a sprite, frame 0 for an
    /// animation.
    pub fn first_sprite_id(&self) -> Option<SpriteId> {
        match self {
            GraphicRef::Sprite(s) => Some(s.numeric_id),
            GraphicRef::Animation(a) => a.sprite_id_at_time(0.0),
        }
    }

    pub fn sprite_id_at_time(&self, time_s: f64) -> Option<SpriteId> {
        match self {
            GraphicRef::Sprite(s) => Some(s.numeric_id),
            GraphicRef::Animation(a) => a.sprite_id_at_time(time_s),
        }
    }
}

/// Per-sprite data needed to draw it: texture reference, UV rect within the
/// sheet, and the stage origin offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpriteRenderData {
    pub sprite_sheet_rel_path: String,
    pub texture_extent: TextureExtent,
    pub stage_origin: Vector3,
}

/// A sprite's UV rectangle within its parent sprite sheet, in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureExtent {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphic_id_round_trips_for_sprite() {
        let id: SpriteId = 42;
        let gid = GraphicId::from_sprite_id(id);
        assert!(gid.is_sprite());
        assert!(!gid.is_animation());
        assert_eq!(gid.to_sprite_id(), Some(id));
        assert_eq!(gid.to_animation_id(), None);
    }

    #[test]
    fn graphic_id_round_trips_for_animation() {
        let id: AnimationId = 7;
        let gid = GraphicId::from_animation_id(id);
        assert!(gid.is_animation());
        assert!(!gid.is_sprite());
        assert_eq!(gid.to_animation_id(), Some(id));
        assert_eq!(gid.to_sprite_id(), None);
    }

    #[test]
    fn animation_picks_last_keyed_frame_at_or_before_computed_frame() {
        let animation = Animation {
            fps: 10,
            frame_count: 5,
            frames: vec![
                AnimationFrame { frame_number: 0, sprite_id: 100 },
                AnimationFrame { frame_number: 2, sprite_id: 102 },
                AnimationFrame { frame_number: 4, sprite_id: 104 },
            ],
            ..Default::default()
        };
        // t=0.25s -> frame = floor(2.5) = 2 -> keyed exactly.
        assert_eq!(animation.sprite_id_at_time(0.25), Some(102));
        // t=0.35s -> frame = floor(3.5) = 3 -> last keyed at-or-before is frame 2.
        assert_eq!(animation.sprite_id_at_time(0.35), Some(102));
        // A full loop (0.5s) wraps back to frame 0.
        assert_eq!(animation.sprite_id_at_time(0.5), Some(100));
    }

    #[test]
    fn animation_length_matches_scenario_five() {
        let animation = Animation { fps: 10, frame_count: 5, ..Default::default() };
        assert!((animation.length_s() - 0.5).abs() < f64::EPSILON);
    }
}
