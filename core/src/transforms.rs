//! Transforms module - pure, stateless functions mapping world points and
//! tile/entity positions to screen-space rectangles.

use crate::constants::Z_SCREEN_SCALE;
use crate::types::{BoundingBox, Camera, ScreenRect, SpriteRenderData, TileOffset, TilePosition, Vector3};

/// Isometric world-to-screen projection of a single point. Does not account
/// for camera position - callers subtract the camera's top-left separately
/// (see [`tile_to_screen_extent`]/[`entity_to_screen_extent`]) so this stays
/// a pure function of the point and zoom alone.
pub fn world_to_screen(point: Vector3, zoom: f32) -> (f32, f32) {
    let screen_x = (point.x - point.y) * zoom;
    let screen_y = (point.x + point.y) * 0.5 * zoom + world_z_to_screen_y(point.z, zoom);
    (screen_x, screen_y)
}

/// The isolated Z-axis contribution to screen Y. Z is scaled by
/// [`Z_SCREEN_SCALE`] before it's folded into the Y projection, and negated
/// because higher Z (up) moves a sprite toward the top of the screen.
pub fn world_z_to_screen_y(z: f32, zoom: f32) -> f32 {
    -(z * Z_SCREEN_SCALE) * zoom
}

/// Projects a tile's origin (plus its sub-tile offset) and sizes the result
/// using the tile graphic's render data, then subtracts the camera's
/// top-left so the result is in viewport-relative screen coordinates.
pub fn tile_to_screen_extent(
    tile_pos: TilePosition,
    tile_offset: TileOffset,
    sprite_render_data: &SpriteRenderData,
    camera: &Camera,
) -> ScreenRect {
    let world_point = tile_pos.origin_point()
        + Vector3::new(tile_offset.x, tile_offset.y, tile_offset.z)
        + sprite_render_data.stage_origin;
    screen_extent_for_point(world_point, sprite_render_data, camera)
}

/// Projects an entity's position, shifted by the entity-graphic-set's
/// per-graphic alignment offset, so differently-sized sprites within the
/// same graphic set stay anchored to the same point on the ground.
pub fn entity_to_screen_extent(
    position: Vector3,
    collision_bottom_center: Vector3,
    render_alignment_offset: Vector3,
    sprite_render_data: &SpriteRenderData,
    camera: &Camera,
) -> ScreenRect {
    let world_point = position - collision_bottom_center + render_alignment_offset + sprite_render_data.stage_origin;
    screen_extent_for_point(world_point, sprite_render_data, camera)
}

fn screen_extent_for_point(world_point: Vector3, sprite_render_data: &SpriteRenderData, camera: &Camera) -> ScreenRect {
    let (screen_x, screen_y) = world_to_screen(world_point, camera.zoom);
    let camera_screen = world_to_screen(camera.position, camera.zoom);
    ScreenRect::new(
        screen_x - camera_screen.0,
        screen_y - camera_screen.1,
        sprite_render_data.texture_extent.w as f32 * camera.zoom,
        sprite_render_data.texture_extent.h as f32 * camera.zoom,
    )
}

/// Translates a model-space bounding box to a tile's world origin.
pub fn model_to_world_tile(model_bounds: BoundingBox, tile_pos: TilePosition) -> BoundingBox {
    model_bounds.translated(tile_pos.origin_point())
}

/// Centers a model-space bounding box under an entity's world position. The
/// model box's XY center is aligned to the entity's point, and Z is placed
/// so the box's bottom sits at the entity's feet.
pub fn model_to_world_entity(model_bounds: BoundingBox, position: Vector3) -> BoundingBox {
    let half_width_x = (model_bounds.max.x - model_bounds.min.x) / 2.0;
    let half_width_y = (model_bounds.max.y - model_bounds.min.y) / 2.0;
    let offset = Vector3::new(position.x - half_width_x, position.y - half_width_y, position.z);
    model_bounds.translated(offset - model_bounds.min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextureExtent;

    #[test]
    fn world_z_to_screen_y_scales_and_negates() {
        assert_eq!(world_z_to_screen_y(10.0, 1.0), -20.0);
    }

    #[test]
    fn world_to_screen_is_origin_preserving() {
        assert_eq!(world_to_screen(Vector3::ZERO, 1.0), (0.0, 0.0));
    }

    #[test]
    fn tile_to_screen_extent_accounts_for_camera_offset() {
        let render_data = SpriteRenderData {
            sprite_sheet_rel_path: "tiles.png".to_string(),
            texture_extent: TextureExtent { x: 0, y: 0, w: 256, h: 512 },
            stage_origin: Vector3::ZERO,
        };
        let camera = Camera::new(Vector3::ZERO, ScreenRect::new(0.0, 0.0, 1280.0, 720.0), 1.0);
        let rect = tile_to_screen_extent(TilePosition::new(0, 0, 0), TileOffset::default(), &render_data, &camera);
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
        assert_eq!((rect.w, rect.h), (256.0, 512.0));
    }

    #[test]
    fn model_to_world_entity_centers_on_position() {
        let model_bounds = BoundingBox::new(Vector3::new(-16.0, -16.0, 0.0), Vector3::new(16.0, 16.0, 32.0));
        let world_bounds = model_to_world_entity(model_bounds, Vector3::new(100.0, 100.0, 0.0));
        assert_eq!(world_bounds.min, Vector3::new(84.0, 84.0, 0.0));
        assert_eq!(world_bounds.max, Vector3::new(116.0, 116.0, 32.0));
    }
}
