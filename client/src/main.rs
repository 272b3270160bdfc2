use std::env;
use std::fs;

use log::{info, warn, LevelFilter};
use mag_engine_core::constants::{SIM_TICK_TIMESTEP_S, SIM_TICKS_PER_SECOND};
use mag_engine_core::graphic_data::GraphicData;
use mag_engine_core::renderer::Renderer;
use mag_engine_core::types::{ScreenRect, TileMap, Vector3};

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn resolve_log_level() -> LevelFilter {
    env::var("MAG_CLIENT_LOG_LEVEL").ok().as_deref().and_then(parse_log_level).unwrap_or(LevelFilter::Info)
}

fn resolve_log_file() -> Option<String> {
    match env::var("MAG_CLIENT_LOG_FILE") {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => Some("client.log".to_string()),
    }
}

fn resolve_resource_data_path() -> String {
    env::var("MAG_RESOURCE_DATA").unwrap_or_else(|_| "ResourceData.json".to_string())
}

/// Thin application entry point. This crate's engine logic (sorter,
/// transforms, A/V system) is windowing-agnostic; a real client would plug
/// in an SDL/wgpu backend behind [`mag_engine_core::renderer::RendererExtension`]
/// and an `AssetCache` implementation for texture binding. This binary wires
/// the engine together and runs a headless frame to prove the plumbing.
fn main() -> anyhow::Result<()> {
    let log_level = resolve_log_level();
    let log_file = resolve_log_file();
    mag_engine_core::initialize_logger(log_level, log_file.as_deref())?;

    info!("client starting (level={}, logfile={})", log_level, log_file.as_deref().unwrap_or("none"));

    let resource_data_path = resolve_resource_data_path();
    let graphic_data = match fs::read_to_string(&resource_data_path) {
        Ok(contents) => GraphicData::load(&contents)?,
        Err(err) => {
            warn!("failed to read '{resource_data_path}': {err}; starting with an empty graphic registry");
            GraphicData::default()
        }
    };
    info!("loaded {} sprites, {} entity graphic sets", graphic_data.get_all_sprites().len(), graphic_data.get_all_entity_graphic_sets().len());

    let tile_map = TileMap::default();
    let mut renderer = Renderer::new();

    let (camera, draw_commands) = renderer.render_frame(
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
    info!("rendered frame: camera at ({:.1}, {:.1}), {} draw commands", camera.position.x, camera.position.y, draw_commands.len());
    info!("simulation ticks at {} Hz ({:.4}s per tick)", SIM_TICKS_PER_SECOND, SIM_TICK_TIMESTEP_S);

    Ok(())
}
