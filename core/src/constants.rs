//! Engine constants module - shared configuration constants that must be
//! consistent between the world model, the sprite sorter, and the renderer.

// =============================================================================
// Simulation
// =============================================================================

/// The rate at which the simulation is processed.
pub const SIM_TICKS_PER_SECOND: u32 = 30;
/// Seconds per simulation tick, derived from [`SIM_TICKS_PER_SECOND`].
pub const SIM_TICK_TIMESTEP_S: f64 = 1.0 / SIM_TICKS_PER_SECOND as f64;

/// The max number of entities that we will allow.
pub const MAX_ENTITIES: usize = 200;

/// The x and y axis width, in world units, of our tiles.
pub const TILE_WORLD_WIDTH: u32 = 32;

/// The x and y axis width, in tiles, of our chunks.
pub const CHUNK_WIDTH: u32 = 16;

/// The number of tiles in a chunk.
pub const CHUNK_TILE_COUNT: u32 = CHUNK_WIDTH * CHUNK_WIDTH;

/// The number of world units around the player that are considered to be
/// within the player's view range. Used to determine how much of the world
/// should be rendered.
pub const VIEW_RADIUS: f32 = TILE_WORLD_WIDTH as f32 * 8.0;

/// The speed that entities move at by default.
pub const MOVEMENT_VELOCITY: f32 = 50.0;

// =============================================================================
// Network
// =============================================================================

/// The rate at which the network sends queued messages, or a heartbeat if
/// none are queued.
pub const NETWORK_TICKS_PER_SECOND: u32 = 20;
/// Seconds per network tick, derived from [`NETWORK_TICKS_PER_SECOND`].
pub const NETWORK_TICK_TIMESTEP_S: f64 = 1.0 / NETWORK_TICKS_PER_SECOND as f64;

// =============================================================================
// Renderer
// =============================================================================

/// The rate the renderer targets on the main thread.
pub const RENDER_TICKS_PER_SECOND: u32 = 60;

/// The width of a tile in screen coordinates.
pub const TILE_SCREEN_WIDTH: u32 = 256;
/// The height of the top face of a tile in screen coordinates.
pub const TILE_SCREEN_HEIGHT: u32 = 128;

/// The total width of a standard tile sprite.
pub const TILE_SPRITE_WIDTH: u32 = 256;
/// The total height of a standard tile sprite.
pub const TILE_SPRITE_HEIGHT: u32 = 512;

// Note: this is temporary. Eventually the Tile concept will be replaced with
// 3D Blocks and this value will be derivable like the others.
/// The value used to scale world Z-axis units to screen Y-axis units.
pub const Z_SCREEN_SCALE: f32 = 2.0;

/// Sentinel `GraphicID` meaning "no graphic" / "skip this layer".
pub const NULL_GRAPHIC_ID: u32 = 0;

/// Reserved numeric sprite id for the null sprite returned by lookups against
/// [`NULL_GRAPHIC_ID`].
pub const NULL_SPRITE_ID: u32 = 0;

/// Bit that discriminates a [`crate::types::graphic::GraphicId`] between a
/// sprite reference (0) and an animation reference (1).
pub const GRAPHIC_ID_TYPE_BIT: u32 = 1 << 31;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_timestep_matches_tick_rate() {
        assert!((SIM_TICK_TIMESTEP_S - (1.0 / 30.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn chunk_tile_count_is_square_of_width() {
        assert_eq!(CHUNK_TILE_COUNT, 256);
    }
}
