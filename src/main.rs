//! Scanline Engine viewer
//!
//! Thin window shell around the software pipeline: reads held keys, steps
//! the engine once per frame and shows the framebuffer upscaled.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use macroquad::prelude::*;
use scanline_engine::config::{load_config_or_default, EngineConfig};
use scanline_engine::input::{Action, InputState};
use scanline_engine::rasterizer::{self, Framebuffer};
use scanline_engine::scene::{self, Engine};
use scanline_engine::VERSION;

const DEFAULT_CONFIG: &str = "scanline.ron";

const KEY_BINDINGS: [(KeyCode, Action); 8] = [
    (KeyCode::W, Action::MoveForward),
    (KeyCode::S, Action::MoveBack),
    (KeyCode::A, Action::TurnLeft),
    (KeyCode::D, Action::TurnRight),
    (KeyCode::Up, Action::MoveUp),
    (KeyCode::Down, Action::MoveDown),
    (KeyCode::Left, Action::StrafeLeft),
    (KeyCode::Right, Action::StrafeRight),
];

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn engine_config() -> &'static EngineConfig {
    CONFIG.get_or_init(|| load_config_or_default(config_path()))
}

fn load_mesh(config: &EngineConfig) -> scene::Mesh {
    let Some(path) = &config.mesh else {
        return scene::Mesh::quad();
    };

    match scene::load_obj(path, config.mesh_has_texture) {
        Ok(mesh) => {
            log::info!("Loaded mesh {} ({} triangles)", path.display(), mesh.len());
            mesh
        }
        Err(e) => {
            log::warn!("Failed to load mesh {}: {}, using built-in cube", path.display(), e);
            scene::Mesh::cube()
        }
    }
}

fn load_texture(path: Option<&Path>) -> rasterizer::Texture {
    let fallback = || {
        let red = rasterizer::Color::new(200, 40, 40);
        rasterizer::Texture::checkerboard(64, 64, rasterizer::Color::WHITE, red)
    };

    let Some(path) = path else {
        return fallback();
    };

    match rasterizer::Texture::from_file(path) {
        Ok(tex) => {
            log::info!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
            tex
        }
        Err(e) => {
            log::warn!("{}, using checkerboard", e);
            fallback()
        }
    }
}

fn held_actions() -> InputState {
    KEY_BINDINGS
        .iter()
        .filter(|(key, _)| is_key_down(*key))
        .map(|(_, action)| *action)
        .collect()
}

/// Must run before the first config load; `window_conf` is the earliest hook.
fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env).try_init();
    }
}

fn window_conf() -> Conf {
    init_logging();
    let config = engine_config();
    let scale = config.window_scale.max(1) as i32;
    Conf {
        window_title: format!("Scanline Engine v{}", VERSION),
        window_width: config.width as i32 * scale,
        window_height: config.height as i32 * scale,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = engine_config();
    let mesh = load_mesh(config);
    let texture = load_texture(config.texture.as_deref());

    let mut engine = Engine::new(config, mesh, Some(texture));
    let (width, height) = engine.size();
    let mut fb = Framebuffer::new(width, height);

    log::info!(
        "=== Scanline Engine {}x{}, {} triangles ===",
        width,
        height,
        engine.mesh().len()
    );

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) && config.mesh.is_some() {
            engine.set_mesh(load_mesh(config));
        }

        let input = held_actions();
        let start = get_time();
        let stats = engine.frame(get_frame_time(), &input, &mut fb);
        let render_ms = (get_time() - start) * 1000.0;

        clear_background(BLACK);

        let texture = Texture2D::from_rgba8(width as u16, height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        // keep square pixels, letterbox the rest
        let scale = (screen_width() / width as f32).min(screen_height() / height as f32);
        let draw_w = width as f32 * scale;
        let draw_h = height as f32 * scale;
        draw_texture_ex(
            &texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        draw_text(
            &format!("{} FPS, {} tris, {:.1} ms", get_fps(), stats.rasterized, render_ms),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await
    }
}
