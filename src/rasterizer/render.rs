//! Core rendering functions
//! Face culling, flat lighting and scanline triangle fill

use super::math::{TexCoord, Vec4};
use super::types::{Color, RasterSettings, Texture, Triangle};

/// Anything pixels can be written into
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_pixel(&mut self, x: usize, y: usize, color: Color);

    fn clear(&mut self, color: Color) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set_pixel(x, y, color);
            }
        }
    }
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let p = &self.pixels[idx..idx + 4];
            Some(Color::with_alpha(p[0], p[1], p[2], p[3]))
        } else {
            None
        }
    }

    /// Number of pixels that differ from `background`
    pub fn count_not(&self, background: Color) -> usize {
        let bytes = background.to_bytes();
        self.pixels.chunks_exact(4).filter(|px| *px != bytes).count()
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }
}

/// Per-pixel reciprocal view depth; larger is nearer, 0 means empty.
pub struct DepthBuffer {
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![0.0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.values[y * self.width + x])
    }

    /// Store `inv_depth` if it is strictly nearer than what is there.
    pub fn test_and_set(&mut self, x: usize, y: usize, inv_depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let slot = &mut self.values[y * self.width + x];
        if inv_depth > *slot {
            *slot = inv_depth;
            true
        } else {
            false
        }
    }
}

/// True when the world-space triangle faces `camera`.
pub fn is_front_facing(tri: &Triangle, camera: Vec4) -> bool {
    let normal = tri.normal();
    let camera_ray = tri.p[0] - camera;
    normal.dot(camera_ray) < 0.0
}

/// Calculate flat light intensity for a unit face normal
pub fn light_intensity(normal: Vec4, light_dir: Vec4, min_intensity: f32) -> f32 {
    normal.dot(light_dir).max(min_intensity).min(1.0)
}

/// Flat color for a world-space triangle under the current shading mode
pub fn shade_triangle(tri: &Triangle, settings: &RasterSettings) -> Color {
    if settings.shading.is_lit() {
        Color::grey(light_intensity(tri.normal(), settings.light_dir, settings.min_intensity))
    } else if settings.shading.is_textured() {
        Color::WHITE
    } else {
        tri.color
    }
}

/// Screen-space vertex handed to the scanline fill
#[derive(Debug, Clone, Copy)]
struct Corner {
    x: i32,
    y: i32,
    tex: TexCoord,
}

/// Point on a triangle edge at one scanline
#[derive(Debug, Clone, Copy)]
struct Boundary {
    x: f32,
    tex: TexCoord,
}

/// Per-scanline increments along one edge
#[derive(Debug, Clone, Copy)]
struct EdgeStep {
    origin: Corner,
    dx: f32,
    du: f32,
    dv: f32,
    dw: f32,
}

impl EdgeStep {
    /// `None` for a zero-height edge
    fn new(from: Corner, to: Corner) -> Option<Self> {
        let dy = to.y - from.y;
        if dy <= 0 {
            return None;
        }
        let dy = dy as f32;
        Some(Self {
            origin: from,
            dx: (to.x - from.x) as f32 / dy,
            du: (to.tex.u - from.tex.u) / dy,
            dv: (to.tex.v - from.tex.v) / dy,
            dw: (to.tex.w - from.tex.w) / dy,
        })
    }

    fn at(&self, y: i32) -> Boundary {
        let n = (y - self.origin.y) as f32;
        let o = self.origin;
        Boundary {
            x: o.x as f32 + n * self.dx,
            tex: TexCoord {
                u: o.tex.u + n * self.du,
                v: o.tex.v + n * self.dv,
                w: o.tex.w + n * self.dw,
            },
        }
    }
}

/// Largest screen coordinate magnitude the fill accepts; keeps edge arithmetic in `i32`.
const COORD_LIMIT: f32 = 1_048_576.0;

fn to_pixel(c: f32) -> i32 {
    c.clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// What every span of one triangle shares
struct SpanFill<'a> {
    tri: &'a Triangle,
    texture: Option<&'a Texture>,
    settings: &'a RasterSettings,
}

impl SpanFill<'_> {
    /// Fill one horizontal span, depth tested. Returns pixels written.
    fn span<S: Surface>(
        &self,
        surface: &mut S,
        depth: &mut DepthBuffer,
        y: i32,
        mut a: Boundary,
        mut b: Boundary,
    ) -> usize {
        if y < 0 || y >= surface.height() as i32 {
            return 0;
        }
        if a.x > b.x {
            std::mem::swap(&mut a, &mut b);
        }

        let ax = to_pixel(a.x);
        let bx = to_pixel(b.x);
        if bx <= ax {
            return 0;
        }

        let tstep = 1.0 / (bx - ax) as f32;
        let mut written = 0;

        for x in ax.max(0)..bx.min(surface.width() as i32) {
            let t = (x - ax) as f32 * tstep;
            let tex = a.tex.lerp(b.tex, t);

            if depth.test_and_set(x as usize, y as usize, tex.w) {
                surface.set_pixel(x as usize, y as usize, self.color(tex));
                written += 1;
            }
        }

        written
    }

    fn color(&self, tex: TexCoord) -> Color {
        match self.texture {
            Some(texture) if self.settings.shading.is_textured() => {
                let (u, v) = tex.recover();
                let texel = texture.sample(u, v, self.settings.sample_mode);
                if self.settings.shading.is_lit() {
                    texel.tint(self.tri.color)
                } else {
                    texel
                }
            }
            _ => self.tri.color,
        }
    }
}

/// Rasterize a screen-space triangle
///
/// Vertex `x, y` are pixel coordinates; texture `w` holds reciprocal depth and
/// is both the depth-test value and the perspective divisor for `u, v`.
/// Input is expected to be clipped to the screen edges already. Anything
/// outside the surface is skipped and coordinates are clamped to
/// `±COORD_LIMIT`, so unclipped input is safe but may lose precision.
/// Returns the number of pixels that passed the depth test.
pub fn rasterize_triangle<S: Surface>(
    surface: &mut S,
    depth: &mut DepthBuffer,
    tri: &Triangle,
    texture: Option<&Texture>,
    settings: &RasterSettings,
) -> usize {
    let mut corners = [0, 1, 2].map(|i| Corner {
        x: to_pixel(tri.p[i].x),
        y: to_pixel(tri.p[i].y),
        tex: tri.t[i],
    });
    corners.sort_by_key(|c| c.y);
    let [top, mid, bottom] = corners;

    // Long edge spans the full height; zero height means nothing to draw
    let Some(long) = EdgeStep::new(top, bottom) else {
        return 0;
    };

    let fill = SpanFill { tri, texture, settings };
    let last_row = surface.height() as i32 - 1;
    let mut written = 0;

    if let Some(upper) = EdgeStep::new(top, mid) {
        for y in top.y.max(0)..=mid.y.min(last_row) {
            written += fill.span(surface, depth, y, upper.at(y), long.at(y));
        }
    }

    if let Some(lower) = EdgeStep::new(mid, bottom) {
        let start = if mid.y > top.y { mid.y + 1 } else { mid.y };
        for y in start.max(0)..=bottom.y.min(last_row) {
            written += fill.span(surface, depth, y, lower.at(y), long.at(y));
        }
    }

    written
}

/// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
pub fn draw_line<S: Surface>(surface: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        if x >= 0 && x < surface.width() as i32 && y >= 0 && y < surface.height() as i32 {
            surface.set_pixel(x as usize, y as usize, color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outline a screen-space triangle (no depth test)
pub fn draw_triangle_outline<S: Surface>(surface: &mut S, tri: &Triangle, color: Color) {
    for i in 0..3 {
        let a = tri.p[i];
        let b = tri.p[(i + 1) % 3];
        draw_line(surface, a.x as i32, a.y as i32, b.x as i32, b.y as i32, color);
    }
}
