//! Per-frame orchestration
//!
//! Owns the mesh, camera, matrices and depth buffer, and drives every mesh
//! triangle through world transform, culling, lighting, view transform,
//! near clip, projection, screen-edge clip and rasterization.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};
use crate::config::EngineConfig;
use crate::input::InputState;
use crate::rasterizer::{
    clip_against_planes, clip_triangle, draw_triangle_outline, is_front_facing,
    rasterize_triangle, shade_triangle, Camera, CameraSettings, Color, DepthBuffer, Mat4, Plane,
    RasterSettings, Surface, Texture, Triangle, Vec4,
};
use super::Mesh;

/// Placement of the mesh in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub translation: Vec4,
    /// Fixed rotation about X, Y, Z in radians
    pub rotation: Vec4,
    /// Added rotation per second about X, Y, Z
    pub spin: Vec4,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            translation: Vec4::point(0.0, 0.0, 5.0),
            rotation: Vec4::dir(0.0, 0.0, 0.0),
            spin: Vec4::dir(0.0, 0.0, 0.0),
        }
    }
}

impl WorldSettings {
    /// Rotations X, Y, Z then translation, after `elapsed` seconds of spin
    pub fn matrix(&self, elapsed: f32) -> Mat4 {
        let angle = self.rotation + self.spin * elapsed;
        Mat4::rotation_x(angle.x)
            * Mat4::rotation_y(angle.y)
            * Mat4::rotation_z(angle.z)
            * Mat4::translation(self.translation.x, self.translation.y, self.translation.z)
    }
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Mesh triangles considered
    pub submitted: usize,
    /// Rejected as back-facing
    pub culled: usize,
    /// Survived the near plane and were projected
    pub projected: usize,
    /// Handed to the scanline fill after screen-edge clipping
    pub rasterized: usize,
    /// Pixels that won the depth test
    pub pixels: usize,
}

pub struct Engine {
    mesh: Mesh,
    texture: Option<Texture>,
    pub camera: Camera,
    pub camera_settings: CameraSettings,
    pub world_settings: WorldSettings,
    pub settings: RasterSettings,
    pub clear_color: Color,

    width: usize,
    height: usize,
    near_plane: Plane,
    screen_planes: [Plane; 4],
    projection: Mat4,
    world: Mat4,
    view: Mat4,
    elapsed: f32,

    depth: DepthBuffer,
    to_raster: Vec<Triangle>,
    clip_queue: VecDeque<Triangle>,
}

impl Engine {
    pub fn new(config: &EngineConfig, mesh: Mesh, texture: Option<Texture>) -> Self {
        let (width, height) = (config.width, config.height);
        let camera = Camera::from_settings(&config.camera);
        let view = camera.view_matrix();

        Self {
            mesh,
            texture,
            camera,
            camera_settings: config.camera.clone(),
            world_settings: config.world.clone(),
            settings: config.raster_settings(),
            clear_color: config.clear_color,
            width,
            height,
            near_plane: Plane::new(Vec4::point(0.0, 0.0, config.near), Vec4::dir(0.0, 0.0, 1.0)),
            screen_planes: Plane::screen_edges(width, height),
            projection: config.projection(),
            world: config.world.matrix(0.0),
            view,
            elapsed: 0.0,
            depth: DepthBuffer::new(width, height),
            to_raster: Vec::new(),
            clip_queue: VecDeque::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Swap in a new mesh; takes effect on the next rendered frame.
    pub fn set_mesh(&mut self, mesh: Mesh) {
        log::debug!("mesh replaced: {} ({} triangles)", mesh.name, mesh.len());
        self.mesh = mesh;
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Apply `dt` seconds of input and recompute the world and view matrices.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.camera.update(dt, input, &self.camera_settings);
        self.elapsed += dt;
        self.world = self.world_settings.matrix(self.elapsed);
        self.view = self.camera.view_matrix();
    }

    /// Update then render one frame into `surface`.
    pub fn frame<S: Surface>(
        &mut self,
        dt: f32,
        input: &InputState,
        surface: &mut S,
    ) -> FrameStats {
        self.update(dt, input);
        self.render(surface)
    }

    /// Render the mesh with the current matrices.
    pub fn render<S: Surface>(&mut self, surface: &mut S) -> FrameStats {
        surface.clear(self.clear_color);
        self.depth.clear();
        self.to_raster.clear();

        let mut stats = FrameStats {
            submitted: self.mesh.len(),
            ..Default::default()
        };

        for tri in &self.mesh.tris {
            let world_tri = tri.transformed(&self.world);

            if self.settings.backface_cull && !is_front_facing(&world_tri, self.camera.position) {
                stats.culled += 1;
                continue;
            }

            let lit = world_tri.with_color(shade_triangle(&world_tri, &self.settings));
            let viewed = lit.transformed(&self.view);

            for clipped in clip_triangle(&self.near_plane, &viewed) {
                self.to_raster.push(project_to_screen(
                    &self.projection,
                    &clipped,
                    self.width,
                    self.height,
                ));
            }
        }
        stats.projected = self.to_raster.len();

        let texture = self.texture.as_ref();
        for tri in &self.to_raster {
            clip_against_planes(&self.screen_planes, *tri, &mut self.clip_queue);

            for piece in &self.clip_queue {
                let depth = &mut self.depth;
                stats.pixels += rasterize_triangle(surface, depth, piece, texture, &self.settings);
                if self.settings.wireframe {
                    draw_triangle_outline(surface, piece, Color::WHITE);
                }
            }
            stats.rasterized += self.clip_queue.len();
        }

        log::trace!("{:?}", stats);
        stats
    }
}

/// Project a view-space triangle to pixel coordinates.
///
/// Texture coordinates are divided by view depth with `w = 1/z` kept for
/// perspective-correct recovery. Vertex `w` ends at 1.
pub fn project_to_screen(
    projection: &Mat4,
    tri: &Triangle,
    width: usize,
    height: usize,
) -> Triangle {
    let half_w = 0.5 * width as f32;
    let half_h = 0.5 * height as f32;
    let offset = Vec4::dir(1.0, 1.0, 0.0);

    let mut out = *tri;
    for i in 0..3 {
        let clip = projection.transform(tri.p[i]);
        out.t[i] = tri.t[i].to_perspective(clip.w);

        // projection flips both screen axes; undo, then map [-1, 1] to pixels
        let mut p = clip.perspective_divide();
        p.x = -p.x;
        p.y = -p.y;
        p = p + offset;
        p.x *= half_w;
        p.y *= half_h;
        out.p[i] = p;
    }
    out
}
