use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "scene_editor.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "CameraConfig::default_fov_y_deg")]
    pub fov_y_deg: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrbitConfig {
    /// Radians per pixel of pointer travel.
    #[serde(default = "OrbitConfig::default_rotate_speed")]
    pub rotate_speed: f32,
    #[serde(default = "OrbitConfig::default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "OrbitConfig::default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "OrbitConfig::default_max_distance")]
    pub max_distance: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureConfig {
    #[serde(default = "FixtureConfig::default_ground_size")]
    pub ground_size: f32,
    #[serde(default = "FixtureConfig::default_grid_divisions")]
    pub grid_divisions: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub fixtures: FixtureConfig,
    #[serde(default = "EditorConfig::default_log_filter")]
    pub log_filter: String,
}

impl WindowConfig {
    fn default_title() -> String {
        "Scene Editor".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl CameraConfig {
    const fn default_position() -> [f32; 3] {
        [6.0, 5.0, 8.0]
    }

    const fn default_fov_y_deg() -> f32 {
        60.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Self::default_position(),
            target: [0.0, 0.0, 0.0],
            fov_y_deg: Self::default_fov_y_deg(),
        }
    }
}

impl OrbitConfig {
    const fn default_rotate_speed() -> f32 {
        0.005
    }

    const fn default_zoom_speed() -> f32 {
        0.1
    }

    const fn default_min_distance() -> f32 {
        0.5
    }

    const fn default_max_distance() -> f32 {
        200.0
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: Self::default_rotate_speed(),
            zoom_speed: Self::default_zoom_speed(),
            min_distance: Self::default_min_distance(),
            max_distance: Self::default_max_distance(),
        }
    }
}

impl FixtureConfig {
    const fn default_ground_size() -> f32 {
        20.0
    }

    const fn default_grid_divisions() -> u32 {
        20
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            ground_size: Self::default_ground_size(),
            grid_divisions: Self::default_grid_divisions(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            fixtures: FixtureConfig::default(),
            log_filter: Self::default_log_filter(),
        }
    }
}

impl EditorConfig {
    fn default_log_filter() -> String {
        "info".to_string()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_field_defaults() {
        let cfg: EditorConfig =
            serde_json::from_str(r#"{ "window": { "width": 800 }, "orbit": { "zoom_speed": 0.5 } }"#)
                .unwrap();
        assert_eq!(cfg.window.width, 800);
        assert_eq!(cfg.window.height, 720);
        assert_eq!(cfg.window.title, "Scene Editor");
        assert!((cfg.orbit.zoom_speed - 0.5).abs() < 1e-6);
        assert!((cfg.orbit.rotate_speed - 0.005).abs() < 1e-6);
        assert_eq!(cfg.fixtures.grid_divisions, 20);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn missing_file_is_an_io_error_with_defaults_available() {
        let dir = tempfile::tempdir().unwrap();
        let result = EditorConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
        let cfg = result.unwrap_or_default();
        assert_eq!(cfg.window.width, 1280);
        assert_eq!(cfg.camera.position, [6.0, 5.0, 8.0]);
    }

    #[test]
    fn malformed_file_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EditorConfig::load(&path), Err(ConfigError::Json { .. })));
    }
}
