//! Launch-time configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files. Every
//! field has a default, so a partial file (or none at all) is valid.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::rasterizer::{
    CameraSettings, Color, Mat4, RasterSettings, SampleMode, ShadingMode, Vec4, HEIGHT, WIDTH,
};
use crate::scene::WorldSettings;

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Window pixels per framebuffer pixel
    pub window_scale: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub light_direction: Vec4,
    pub min_intensity: f32,
    pub shading: ShadingMode,
    pub sample_mode: SampleMode,
    pub wireframe: bool,
    pub backface_cull: bool,
    pub clear_color: Color,
    pub camera: CameraSettings,
    pub world: WorldSettings,
    /// OBJ file; built-in quad when unset
    pub mesh: Option<PathBuf>,
    /// Whether OBJ faces carry `vt` indices
    pub mesh_has_texture: bool,
    /// Image file; checkerboard when unset
    pub texture: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            window_scale: 3,
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            light_direction: Vec4::dir(0.0, 1.0, -1.0),
            min_intensity: 0.1,
            shading: ShadingMode::Textured,
            sample_mode: SampleMode::Clamp,
            wireframe: false,
            backface_cull: true,
            clear_color: Color::new(32, 32, 32),
            camera: CameraSettings::default(),
            world: WorldSettings::default(),
            mesh: None,
            mesh_has_texture: true,
            texture: None,
        }
    }
}

impl EngineConfig {
    /// `height / width`
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    /// `1 / tan(fov / 2)`
    pub fn fov_scale(&self) -> f32 {
        1.0 / (self.fov_degrees.to_radians() * 0.5).tan()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::projection(self.fov_scale(), self.aspect_ratio(), self.near, self.far)
    }

    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            shading: self.shading,
            sample_mode: self.sample_mode,
            backface_cull: self.backface_cull,
            light_dir: Vec4 { w: 0.0, ..self.light_direction }.normalize(),
            min_intensity: self.min_intensity,
            wireframe: self.wireframe,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load `path`, or fall back to defaults when it is missing or invalid.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> EngineConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            log::info!("Loaded config {}", path.display());
            config
        }
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config at {}, using defaults", path.display());
            EngineConfig::default()
        }
        Err(e) => {
            log::warn!("Failed to load {}: {}, using defaults", path.display(), e);
            EngineConfig::default()
        }
    }
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<EngineConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &EngineConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::Mutex;

    /// Keeps every record so tests can look for a message
    struct Recorder(Mutex<Vec<(log::Level, String)>>);

    impl log::Log for Recorder {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static RECORDER: Recorder = Recorder(Mutex::new(Vec::new()));

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scanline-{}-{}.ron", tag, std::process::id()))
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = load_config_from_str("()").unwrap();
        assert_eq!(config.width, 256);
        assert_eq!(config.near, 0.1);
        assert_eq!(config.shading, ShadingMode::Textured);
        assert!(config.mesh.is_none());
    }

    #[test]
    fn test_partial_override() {
        let src = r#"(
            width: 320,
            shading: Flat,
            sample_mode: Wrap,
            camera: (start: (x: 1.0, y: 2.0, z: 3.0), move_speed: 2.0),
            mesh: Some("teapot.obj"),
        )"#;
        let config = load_config_from_str(src).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 256);
        assert_eq!(config.shading, ShadingMode::Flat);
        assert_eq!(config.sample_mode, SampleMode::Wrap);
        assert_eq!(config.camera.start, Vec4::point(1.0, 2.0, 3.0));
        assert_eq!(config.camera.turn_rate, 1.0);
        assert_eq!(config.mesh.as_deref(), Some(Path::new("teapot.obj")));
    }

    #[test]
    fn test_bad_document_is_parse_error() {
        assert!(matches!(load_config_from_str("(width: \"wide\")"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_projection_parameters() {
        let config = EngineConfig::default();
        assert_abs_diff_eq!(config.fov_scale(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(config.aspect_ratio(), 1.0);
        assert_eq!(config.projection(), Mat4::projection(1.0, 1.0, 0.1, 1000.0));
        let light = config.raster_settings().light_dir;
        assert_abs_diff_eq!(light.len(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_save_round_trip() {
        let path = temp_path("config");
        let mut config = EngineConfig::default();
        config.wireframe = true;
        config.world.spin = Vec4::dir(0.0, 0.5, 0.0);

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(loaded.wireframe);
        assert_eq!(loaded.world.spin, config.world.spin);
        assert_eq!(loaded.clear_color, config.clear_color);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(load_config("/definitely/not/here.ron"), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_or_default("/definitely/not/here.ron");
        assert_eq!(config.width, WIDTH);
        assert!(config.mesh.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back_with_warning() {
        let _ = log::set_logger(&RECORDER);
        log::set_max_level(log::LevelFilter::Trace);

        let path = temp_path("invalid");
        fs::write(&path, "(width: \"wide\")").unwrap();
        let config = load_config_or_default(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(config.width, WIDTH);
        let shown = path.display().to_string();
        let records = RECORDER.0.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == log::Level::Warn && msg.contains(&shown)));
    }
}
