//! Scene Editor
//!
//! Places primitive shapes and glTF models into a 3D scene, picks them with
//! the pointer, edits them through a transform gizmo and persists the
//! editable subset as a JSON scene document.

mod app;
mod assets;
mod config;
mod editor;
mod render;
mod scene;
mod ui;

use config::{EditorConfig, DEFAULT_CONFIG_PATH};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    // logging is configured from the file, so report a bad file only once it is up
    let loaded = EditorConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .format_timestamp_millis()
    .init();

    if let Err(err) = loaded {
        log::warn!("Config load error: {err}. Falling back to defaults.");
    }

    app::run(config);
}
