//! Viewer configuration (window, camera feel). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};

/// Persistent viewer settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Mouse look sensitivity in degrees per pixel of cursor travel.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Camera movement speed in world units per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Draw all planets in one instanced call instead of one draw per planet.
    #[serde(default = "default_true")]
    pub instanced: bool,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_sensitivity() -> f32 {
    0.1
}
fn default_move_speed() -> f32 {
    50.0
}
fn default_true() -> bool {
    true
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            sensitivity: default_sensitivity(),
            move_speed: default_move_speed(),
            instanced: default_true(),
        }
    }
}

impl ViewerConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_settings() {
        let config = ViewerConfig::default();
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.sensitivity, 0.1);
        assert_eq!(config.move_speed, 50.0);
        assert!(config.instanced);
    }

    #[test]
    fn partial_ron_fills_missing_fields_with_defaults() {
        let config: ViewerConfig = ron::from_str("(window_width: 1920, instanced: false)").unwrap();
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 720);
        assert!(!config.instanced);
    }
}
