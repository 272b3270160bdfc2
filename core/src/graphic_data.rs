//! Graphic data registry module - loads `ResourceData.json` and serves every
//! lookup the sorter and renderer need: sprites, animations, tagged graphic
//! references, and the five graphic set families (by numeric or string ID).

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::EngineError;
use crate::types::{
    Animation, AnimationFrame, BoundingBox, Direction, EntityGraphicSet, EntityGraphicType,
    FloorGraphicSet, GraphicId, GraphicRef, ObjectGraphicSet, Sprite, SpriteRenderData,
    TerrainGraphicSet, TerrainHeight, TextureExtent, Vector3, WallGraphicSet, WallType,
};

/// On-disk shape of `ResourceData.json`. Field names match the manifest
/// exactly; all conversion into the engine's runtime types happens in
/// [`GraphicData::load`].
#[derive(Debug, Deserialize)]
struct ResourceDataJson {
    #[serde(default)]
    sprites: Vec<SpriteJson>,
    #[serde(default)]
    animations: Vec<AnimationJson>,
    #[serde(default)]
    terrain: Vec<GraphicSetJson>,
    #[serde(default)]
    floors: Vec<GraphicSetJson>,
    #[serde(default)]
    walls: Vec<GraphicSetJson>,
    #[serde(default)]
    objects: Vec<GraphicSetJson>,
    #[serde(default)]
    entities: Vec<EntityGraphicSetJson>,
}

#[derive(Debug, Deserialize)]
struct SpriteJson {
    #[serde(rename = "numericID")]
    numeric_id: u32,
    #[serde(rename = "stringID")]
    string_id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "collisionEnabled", default)]
    collision_enabled: bool,
    #[serde(rename = "spriteSheetRelPath", default)]
    sprite_sheet_rel_path: String,
    #[serde(rename = "textureExtent", default)]
    texture_extent: TextureExtentJson,
    #[serde(rename = "modelBounds", default)]
    model_bounds: BoundingBoxJson,
    #[serde(rename = "stageOrigin", default)]
    stage_origin: VectorJson,
}

#[derive(Debug, Deserialize, Default)]
struct TextureExtentJson {
    #[serde(default)]
    x: u32,
    #[serde(default)]
    y: u32,
    #[serde(default)]
    w: u32,
    #[serde(default)]
    h: u32,
}

#[derive(Debug, Deserialize, Default)]
struct VectorJson {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Debug, Deserialize, Default)]
struct BoundingBoxJson {
    #[serde(default)]
    min: VectorJson,
    #[serde(default)]
    max: VectorJson,
}

#[derive(Debug, Deserialize)]
struct AnimationJson {
    #[serde(rename = "numericID")]
    numeric_id: u32,
    #[serde(rename = "stringID")]
    string_id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "fps")]
    fps: u32,
    #[serde(rename = "frameCount")]
    frame_count: u32,
    #[serde(default)]
    frames: Vec<AnimationFrameJson>,
    #[serde(rename = "modelBounds", default)]
    model_bounds: BoundingBoxJson,
}

#[derive(Debug, Deserialize)]
struct AnimationFrameJson {
    #[serde(rename = "frameNumber")]
    frame_number: u32,
    #[serde(rename = "spriteID")]
    sprite_id: u32,
}

#[derive(Debug, Deserialize)]
struct GraphicSetJson {
    #[serde(rename = "numericID")]
    numeric_id: u32,
    #[serde(rename = "stringID")]
    string_id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    /// Graphic IDs, in the natural index order of the owning set's key enum
    /// (`TerrainHeight`, `Direction`, or `WallType`).
    graphics: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct EntityGraphicSetJson {
    #[serde(rename = "numericID")]
    numeric_id: u32,
    #[serde(rename = "stringID")]
    string_id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    /// Keyed by lowercase graphic type name ("idle", "run", ...); each value
    /// holds 8 graphic IDs in `Direction::ALL` order.
    graphics: HashMap<String, Vec<u32>>,
}

fn parse_graphic_type(name: &str) -> Option<EntityGraphicType> {
    match name {
        "idle" => Some(EntityGraphicType::Idle),
        "run" => Some(EntityGraphicType::Run),
        "crouch" => Some(EntityGraphicType::Crouch),
        "jump" => Some(EntityGraphicType::Jump),
        _ => None,
    }
}

impl From<VectorJson> for Vector3 {
    fn from(v: VectorJson) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<BoundingBoxJson> for BoundingBox {
    fn from(b: BoundingBoxJson) -> Self {
        BoundingBox::new(b.min.into(), b.max.into())
    }
}

impl From<TextureExtentJson> for TextureExtent {
    fn from(t: TextureExtentJson) -> Self {
        TextureExtent { x: t.x, y: t.y, w: t.w, h: t.h }
    }
}

fn fixed_array<const N: usize>(set_string_id: &str, values: &[u32]) -> Result<[GraphicId; N]> {
    if values.len() != N {
        anyhow::bail!(
            "graphic set '{set_string_id}' has {} graphics, expected {N}",
            values.len()
        );
    }
    let mut array = [GraphicId::NULL; N];
    for (i, value) in values.iter().enumerate() {
        array[i] = GraphicId(*value);
    }
    Ok(array)
}

/// The loaded, immutable graphic data registry. Construct with
/// [`GraphicData::load`]; all lookup methods borrow from this instance.
#[derive(Debug, Default)]
pub struct GraphicData {
    sprites: Vec<Sprite>,
    animations: Vec<Animation>,
    sprite_render_data: HashMap<u32, SpriteRenderData>,
    terrain_sets: Vec<TerrainGraphicSet>,
    floor_sets: Vec<FloorGraphicSet>,
    wall_sets: Vec<WallGraphicSet>,
    object_sets: Vec<ObjectGraphicSet>,
    entity_sets: Vec<EntityGraphicSet>,

    sprite_string_index: HashMap<String, usize>,
    animation_string_index: HashMap<String, usize>,
    terrain_string_index: HashMap<String, usize>,
    floor_string_index: HashMap<String, usize>,
    wall_string_index: HashMap<String, usize>,
    object_string_index: HashMap<String, usize>,
    entity_string_index: HashMap<String, usize>,
}

impl GraphicData {
    /// Parses `json_text` as a `ResourceData.json` manifest and builds a
    /// fully-indexed registry. Errors (missing required sections,
    /// mismatched graphic-set array lengths) abort the load entirely -
    /// there's no such thing as a partially loaded registry.
    pub fn load(json_text: &str) -> Result<Self> {
        let raw: ResourceDataJson =
            serde_json::from_str(json_text).context("failed to parse ResourceData.json")?;

        let mut data = GraphicData::default();

        for sprite_json in raw.sprites {
            let sprite = Sprite {
                numeric_id: sprite_json.numeric_id,
                string_id: sprite_json.string_id.clone(),
                display_name: sprite_json.display_name,
                collision_enabled: sprite_json.collision_enabled,
                model_bounds: sprite_json.model_bounds.into(),
            };
            data.sprite_render_data.insert(
                sprite.numeric_id,
                SpriteRenderData {
                    sprite_sheet_rel_path: sprite_json.sprite_sheet_rel_path,
                    texture_extent: sprite_json.texture_extent.into(),
                    stage_origin: sprite_json.stage_origin.into(),
                },
            );
            data.sprite_string_index.insert(sprite_json.string_id, data.sprites.len());
            data.sprites.push(sprite);
        }

        for anim_json in raw.animations {
            let animation = Animation {
                numeric_id: anim_json.numeric_id,
                string_id: anim_json.string_id.clone(),
                display_name: anim_json.display_name,
                fps: anim_json.fps,
                frame_count: anim_json.frame_count,
                frames: anim_json
                    .frames
                    .into_iter()
                    .map(|f| AnimationFrame { frame_number: f.frame_number, sprite_id: f.sprite_id })
                    .collect(),
                model_bounds: anim_json.model_bounds.into(),
            };
            data.animation_string_index.insert(anim_json.string_id, data.animations.len());
            data.animations.push(animation);
        }

        for set_json in raw.terrain {
            let set = TerrainGraphicSet {
                numeric_id: set_json.numeric_id,
                string_id: set_json.string_id.clone(),
                display_name: set_json.display_name,
                graphics: fixed_array::<4>(&set_json.string_id, &set_json.graphics)?,
            };
            data.terrain_string_index.insert(set_json.string_id, data.terrain_sets.len());
            data.terrain_sets.push(set);
        }

        for set_json in raw.floors {
            let set = FloorGraphicSet {
                numeric_id: set_json.numeric_id,
                string_id: set_json.string_id.clone(),
                display_name: set_json.display_name,
                graphics: fixed_array::<8>(&set_json.string_id, &set_json.graphics)?,
            };
            data.floor_string_index.insert(set_json.string_id, data.floor_sets.len());
            data.floor_sets.push(set);
        }

        for set_json in raw.walls {
            let set = WallGraphicSet {
                numeric_id: set_json.numeric_id,
                string_id: set_json.string_id.clone(),
                display_name: set_json.display_name,
                graphics: fixed_array::<4>(&set_json.string_id, &set_json.graphics)?,
            };
            data.wall_string_index.insert(set_json.string_id, data.wall_sets.len());
            data.wall_sets.push(set);
        }

        for set_json in raw.objects {
            let set = ObjectGraphicSet {
                numeric_id: set_json.numeric_id,
                string_id: set_json.string_id.clone(),
                display_name: set_json.display_name,
                graphics: fixed_array::<8>(&set_json.string_id, &set_json.graphics)?,
            };
            data.object_string_index.insert(set_json.string_id, data.object_sets.len());
            data.object_sets.push(set);
        }

        for set_json in raw.entities {
            let mut graphics = HashMap::new();
            for (type_name, values) in &set_json.graphics {
                let graphic_type = parse_graphic_type(type_name).with_context(|| {
                    format!(
                        "entity graphic set '{}' has unrecognized graphic type '{type_name}'",
                        set_json.string_id
                    )
                })?;
                graphics.insert(graphic_type, fixed_array::<8>(&set_json.string_id, values)?);
            }
            if !graphics
                .get(&EntityGraphicType::Idle)
                .is_some_and(|arr| arr[Direction::South.to_index()] != GraphicId::NULL)
            {
                anyhow::bail!(
                    "entity graphic set '{}' is missing a required (Idle, South) graphic",
                    set_json.string_id
                );
            }
            let set = EntityGraphicSet {
                numeric_id: set_json.numeric_id,
                string_id: set_json.string_id.clone(),
                display_name: set_json.display_name,
                graphics,
                alignment_offsets: HashMap::new(),
            };
            data.entity_string_index.insert(set_json.string_id, data.entity_sets.len());
            data.entity_sets.push(set);
        }

        Ok(data)
    }

    pub fn get_sprite(&self, numeric_id: u32) -> Result<&Sprite, EngineError> {
        self.sprites
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("sprite {numeric_id}")))
    }

    pub fn get_sprite_by_string_id(&self, string_id: &str) -> Result<&Sprite, EngineError> {
        self.sprite_string_index
            .get(string_id)
            .map(|&i| &self.sprites[i])
            .ok_or_else(|| EngineError::NotFound(format!("sprite '{string_id}'")))
    }

    pub fn get_animation(&self, numeric_id: u32) -> Result<&Animation, EngineError> {
        self.animations
            .iter()
            .find(|a| a.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("animation {numeric_id}")))
    }

    /// Resolves a [`GraphicId`] to whichever concrete type it's tagged as.
    pub fn get_graphic(&self, graphic_id: GraphicId) -> Result<GraphicRef<'_>, EngineError> {
        match graphic_id.to_sprite_id() {
            Some(sprite_id) => self.get_sprite(sprite_id).map(GraphicRef::Sprite),
            None => self.get_animation(graphic_id.value()).map(GraphicRef::Animation),
        }
    }

    pub fn get_sprite_render_data(&self, sprite_id: u32) -> Result<&SpriteRenderData, EngineError> {
        self.sprite_render_data
            .get(&sprite_id)
            .ok_or_else(|| EngineError::NotFound(format!("render data for sprite {sprite_id}")))
    }

    pub fn get_terrain_graphic_set(&self, numeric_id: u32) -> Result<&TerrainGraphicSet, EngineError> {
        self.terrain_sets
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("terrain graphic set {numeric_id}")))
    }

    pub fn get_floor_graphic_set(&self, numeric_id: u32) -> Result<&FloorGraphicSet, EngineError> {
        self.floor_sets
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("floor graphic set {numeric_id}")))
    }

    pub fn get_wall_graphic_set(&self, numeric_id: u32) -> Result<&WallGraphicSet, EngineError> {
        self.wall_sets
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("wall graphic set {numeric_id}")))
    }

    pub fn get_object_graphic_set(&self, numeric_id: u32) -> Result<&ObjectGraphicSet, EngineError> {
        self.object_sets
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("object graphic set {numeric_id}")))
    }

    pub fn get_entity_graphic_set(&self, numeric_id: u32) -> Result<&EntityGraphicSet, EngineError> {
        self.entity_sets
            .iter()
            .find(|s| s.numeric_id == numeric_id)
            .ok_or_else(|| EngineError::NotFound(format!("entity graphic set {numeric_id}")))
    }

    pub fn get_entity_graphic_set_by_string_id(&self, string_id: &str) -> Result<&EntityGraphicSet, EngineError> {
        self.entity_string_index
            .get(string_id)
            .map(|&i| &self.entity_sets[i])
            .ok_or_else(|| EngineError::NotFound(format!("entity graphic set '{string_id}'")))
    }

    pub fn get_all_sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn get_all_animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn get_all_entity_graphic_sets(&self) -> &[EntityGraphicSet] {
        &self.entity_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> &'static str {
        r#"{
            "sprites": [
                {
                    "numericID": 1,
                    "stringID": "rock",
                    "displayName": "Rock",
                    "collisionEnabled": true,
                    "spriteSheetRelPath": "terrain.png",
                    "textureExtent": {"x": 0, "y": 0, "w": 32, "h": 32},
                    "modelBounds": {"min": {"x": 0.0, "y": 0.0, "z": 0.0}, "max": {"x": 32.0, "y": 32.0, "z": 32.0}},
                    "stageOrigin": {"x": 0.0, "y": 0.0, "z": 0.0}
                }
            ],
            "animations": [],
            "terrain": [],
            "floors": [],
            "walls": [],
            "objects": [],
            "entities": [
                {
                    "numericID": 1,
                    "stringID": "human",
                    "displayName": "Human",
                    "graphics": {
                        "idle": [0, 0, 0, 0, 1, 0, 0, 0]
                    }
                }
            ]
        }"#
    }

    #[test]
    fn load_parses_sprites_and_entity_sets() {
        let data = GraphicData::load(sample_manifest()).expect("manifest should parse");
        let sprite = data.get_sprite_by_string_id("rock").expect("sprite should be found");
        assert_eq!(sprite.numeric_id, 1);

        let set = data.get_entity_graphic_set_by_string_id("human").expect("set should be found");
        assert!(set.contains(EntityGraphicType::Idle, Direction::South));
    }

    #[test]
    fn load_rejects_entity_set_missing_idle_south() {
        let manifest = r#"{
            "sprites": [], "animations": [], "terrain": [], "floors": [], "walls": [], "objects": [],
            "entities": [
                {"numericID": 1, "stringID": "broken", "displayName": "Broken", "graphics": {}}
            ]
        }"#;
        assert!(GraphicData::load(manifest).is_err());
    }

    #[test]
    fn get_graphic_dispatches_on_type_tag() {
        let data = GraphicData::load(sample_manifest()).expect("manifest should parse");
        let graphic = data.get_graphic(GraphicId::from_sprite_id(1)).expect("sprite 1 should resolve");
        assert_eq!(graphic.display_name(), "Rock");
    }

    #[test]
    fn unknown_sprite_id_returns_not_found() {
        let data = GraphicData::load(sample_manifest()).expect("manifest should parse");
        assert!(data.get_sprite(999).is_err());
    }
}
