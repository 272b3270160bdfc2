//! Renderer module - the per-frame camera lerp, sort invocation, and draw
//! loop, plus the extension trait a concrete windowing backend implements.

use crate::sorter::{SpriteSortInfo, WorldSpriteSorter};
use crate::types::{Camera, ScreenRect, Vector3};

/// Hook a concrete application registers to draw its own content around the
/// sorted world sprites, and to get first crack at OS events.
pub trait RendererExtension {
    fn before_world(&mut self, camera: &Camera, alpha: f32);
    fn after_world(&mut self, camera: &Camera, alpha: f32);

    /// Returns `true` if the event was consumed and should not be passed to
    /// the engine's own input handling.
    fn handle_os_event(&mut self, event: &OsEvent) -> bool;
}

/// A minimal OS event shape; a concrete windowing backend maps its own
/// event type into this before calling into the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OsEvent {
    WindowClosed,
    WindowResized { width: u32, height: u32 },
}

/// Draws one fully-assembled sprite: the backend is responsible for
/// actually blitting a texture, this crate only describes what and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub sprite_id: crate::types::SpriteId,
    pub destination: ScreenRect,
    pub color_mod: [u8; 4],
}

impl DrawCommand {
    fn from_sprite_sort_info(info: &SpriteSortInfo) -> Self {
        DrawCommand { sprite_id: info.sprite_id, destination: info.screen_extent, color_mod: info.color_mod }
    }
}

/// Lerps `previous` towards `current` by `alpha`.
pub fn lerp_camera_position(previous: Vector3, current: Vector3, alpha: f32) -> Vector3 {
    previous + (current - previous).scaled(alpha)
}

/// Frame assembly loop. Produces the ordered list of draw commands for this
/// frame and writes the lerped camera back so other subsystems (hit-testing,
/// the UI) see the same camera the frame was drawn with.
pub struct Renderer {
    sorter: WorldSpriteSorter,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { sorter: WorldSpriteSorter::new() }
    }

    pub fn sorter(&self) -> &WorldSpriteSorter {
        &self.sorter
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &mut self,
        graphic_data: &crate::graphic_data::GraphicData,
        tile_map: &crate::types::TileMap,
        entities: &mut [crate::types::Entity],
        av_entities: &mut [crate::types::AVEntity],
        visual_effect_definitions: &[crate::types::VisualEffectDefinition],
        phantom_sprites: &[crate::sorter::PhantomSprite],
        color_mods: &[crate::sorter::ColorModEntry],
        previous_camera_position: Vector3,
        current_camera_position: Vector3,
        screen_extent: ScreenRect,
        zoom: f32,
        alpha: f32,
        current_time: f64,
        extension: Option<&mut dyn RendererExtension>,
    ) -> (Camera, Vec<DrawCommand>) {
        let lerped_center = lerp_camera_position(previous_camera_position, current_camera_position, alpha);
        let top_left = Vector3::new(
            lerped_center.x - screen_extent.w / 2.0,
            lerped_center.y - screen_extent.h / 2.0,
            lerped_center.z,
        );
        let camera = Camera::new(top_left, screen_extent, zoom);

        if let Some(extension) = extension {
            extension.before_world(&camera, alpha);
            self.sorter.sort(
                graphic_data,
                tile_map,
                entities,
                av_entities,
                visual_effect_definitions,
                phantom_sprites,
                color_mods,
                &camera,
                alpha,
                current_time,
            );
            let commands = self.sorter.sorted_sprites().iter().map(DrawCommand::from_sprite_sort_info).collect();
            extension.after_world(&camera, alpha);
            (camera, commands)
        } else {
            self.sorter.sort(
                graphic_data,
                tile_map,
                entities,
                av_entities,
                visual_effect_definitions,
                phantom_sprites,
                color_mods,
                &camera,
                alpha,
                current_time,
            );
            let commands = self.sorter.sorted_sprites().iter().map(DrawCommand::from_sprite_sort_info).collect();
            (camera, commands)
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_camera_position_at_alpha_zero_is_previous() {
        let previous = Vector3::new(0.0, 0.0, 0.0);
        let current = Vector3::new(10.0, 10.0, 0.0);
        assert_eq!(lerp_camera_position(previous, current, 0.0), previous);
    }

    #[test]
    fn lerp_camera_position_at_alpha_one_is_current() {
        let previous = Vector3::new(0.0, 0.0, 0.0);
        let current = Vector3::new(10.0, 10.0, 0.0);
        assert_eq!(lerp_camera_position(previous, current, 1.0), current);
    }

    #[test]
    fn render_frame_centers_camera_on_lerped_position() {
        let graphic_data = crate::graphic_data::GraphicData::default();
        let tile_map = crate::types::TileMap::default();
        let mut renderer = Renderer::new();
        let (camera, commands) = renderer.render_frame(
            &graphic_data,
            &tile_map,
            &mut [],
            &mut [],
            &[],
            &[],
            &[],
            Vector3::ZERO,
            Vector3::ZERO,
            ScreenRect::new(0.0, 0.0, 1280.0, 720.0),
            1.0,
            1.0,
            0.0,
            None,
        );
        assert_eq!(camera.position, Vector3::new(-640.0, -360.0, 0.0));
        assert!(commands.is_empty());
    }
}
