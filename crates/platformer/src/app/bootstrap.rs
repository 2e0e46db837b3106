use std::env;
use std::path::{Path, PathBuf};

use engine::{load_tmx_map, resolve_app_paths, LoopConfig, MapLoadError, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, WORLD_HEIGHT, WORLD_WIDTH};

pub(crate) const MAP_ENV_VAR: &str = "PLATFORMER_MAP";
const DEFAULT_MAP_FILE: &str = "first_map.tmx";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load map {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: MapLoadError,
    },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "startup");

    let map_path = resolve_map_path(&paths.maps_dir, env::var(MAP_ENV_VAR).ok().as_deref());
    let tilemap = load_tmx_map(&map_path).map_err(|source| BootstrapError::Map {
        path: map_path.clone(),
        source,
    })?;
    info!(
        path = %map_path.display(),
        width = tilemap.width(),
        height = tilemap.height(),
        tile_width = tilemap.tile_width(),
        tile_height = tilemap.tile_height(),
        has_tileset = tilemap.tileset().is_some(),
        "map_loaded"
    );

    let config = LoopConfig {
        window_title: "Platformer".to_string(),
        world_width: WORLD_WIDTH as u32,
        world_height: WORLD_HEIGHT as u32,
        textures_dir: paths.assets_dir.join("textures"),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: gameplay::build_scene(tilemap),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Relative overrides resolve against the maps directory.
fn resolve_map_path(maps_dir: &Path, override_value: Option<&str>) -> PathBuf {
    match override_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => {
            let candidate = PathBuf::from(value);
            if candidate.is_absolute() {
                candidate
            } else {
                maps_dir.join(candidate)
            }
        }
        None => maps_dir.join(DEFAULT_MAP_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_path_defaults_to_first_map() {
        let maps_dir = Path::new("/game/assets/maps");
        assert_eq!(
            resolve_map_path(maps_dir, None),
            maps_dir.join("first_map.tmx")
        );
        assert_eq!(
            resolve_map_path(maps_dir, Some("  ")),
            maps_dir.join("first_map.tmx")
        );
    }

    #[test]
    fn relative_map_override_is_joined_to_maps_dir() {
        let maps_dir = Path::new("/game/assets/maps");
        assert_eq!(
            resolve_map_path(maps_dir, Some("cave.tmx")),
            maps_dir.join("cave.tmx")
        );
    }

    #[test]
    fn absolute_map_override_is_used_as_is() {
        let maps_dir = Path::new("/game/assets/maps");
        let absolute = std::env::temp_dir().join("other.tmx");
        let raw = absolute.to_str().expect("utf-8 temp path");
        assert_eq!(resolve_map_path(maps_dir, Some(raw)), absolute);
    }
}
