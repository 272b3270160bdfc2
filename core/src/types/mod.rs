//! Data types module - the world model, graphic resolution, and entity
//! structures shared by the graphic data registry, sorter, and renderer.

pub mod entity;
pub mod geometry;
pub mod graphic;
pub mod graphic_set;
pub mod tile;
pub mod tile_map;

pub use entity::{
    AVEntity, AVEntityDefinition, AVEntityId, AVEntityState, Behavior, ClientGraphicState, Entity,
    EntityId, GraphicState, Input, LoopMode, Phase, VisualEffectDefinition, VisualEffectState,
    WorldObjectId,
};
pub use geometry::{BoundingBox, Camera, ChunkPosition, ScreenRect, TilePosition, Vector3};
pub use graphic::{
    Animation, AnimationFrame, AnimationId, BoundingBoxId, GraphicId, GraphicRef, Sprite, SpriteId,
    SpriteRenderData, TextureExtent,
};
pub use graphic_set::{
    Direction, EntityGraphicSet, EntityGraphicType, FloorGraphicSet, ObjectGraphicSet, TerrainGraphicSet,
    TerrainHeight, WallGraphicSet, WallType,
};
pub use tile::{Tile, TileLayer, TileLayerId, TileLayerType, TileOffset};
pub use tile_map::{Chunk, TileExtent, TileMap};
