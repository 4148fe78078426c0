//! Core types for the rasterizer

use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use super::math::{TexCoord, Vec4};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque grey for a light intensity in 0.0-1.0
    pub fn grey(intensity: f32) -> Self {
        let v = (intensity.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(v, v, v)
    }

    /// Per-channel multiply, alpha kept from `self`
    pub fn tint(self, other: Color) -> Self {
        let mul = |a: u8, b: u8| ((a as u16 * b as u16) / 255) as u8;
        Self {
            r: mul(self.r, other.r),
            g: mul(self.g, other.g),
            b: mul(self.b, other.b),
            a: self.a,
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Texture loading failures
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0} has no pixels")]
    Empty(String),
}

/// Decoded texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let img = image::open(path).map_err(|source| TextureError::Decode {
            name: path.display().to_string(),
            source,
        })?;

        Self::from_image(img, name)
    }

    /// Load texture from raw encoded bytes (PNG, JPEG, BMP)
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            name: name.clone(),
            source,
        })?;

        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        use image::GenericImageView;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(name));
        }

        let pixels: Vec<Color> = img
            .to_rgba8()
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }

    /// Sample at a recovered (u, v); v runs bottom to top.
    pub fn sample(&self, u: f32, v: f32, mode: SampleMode) -> Color {
        let (u, v) = mode.apply(u, v);
        let max_x = self.width.saturating_sub(1);
        let max_y = self.height.saturating_sub(1);
        let tx = ((u * max_x as f32) as usize).min(max_x);
        let ty = (((1.0 - v) * max_y as f32) as usize).min(max_y);
        self.get_pixel(tx, ty)
    }
}

/// How out-of-range texture coordinates are brought back into 0.0-1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleMode {
    #[default]
    Clamp,
    Wrap,
}

impl SampleMode {
    pub fn apply(self, u: f32, v: f32) -> (f32, f32) {
        // NaN falls to 0 in both modes
        let fix = |c: f32| if c.is_nan() { 0.0 } else { c };
        match self {
            SampleMode::Clamp => (fix(u).clamp(0.0, 1.0), fix(v).clamp(0.0, 1.0)),
            SampleMode::Wrap => (fix(u).rem_euclid(1.0), fix(v).rem_euclid(1.0)),
        }
    }
}

/// A triangle with texture coordinates and a flat color
///
/// Passed by value between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p: [Vec4; 3],
    pub t: [TexCoord; 3],
    pub color: Color,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            p: [Vec4::ZERO; 3],
            t: [TexCoord::default(); 3],
            color: Color::WHITE,
        }
    }
}

impl Triangle {
    pub fn new(p: [Vec4; 3]) -> Self {
        Self { p, ..Default::default() }
    }

    pub fn textured(p: [Vec4; 3], t: [TexCoord; 3]) -> Self {
        Self { p, t, color: Color::WHITE }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Unit face normal from the winding `p0 -> p1 -> p2`
    pub fn normal(&self) -> Vec4 {
        let edge1 = self.p[1] - self.p[0];
        let edge2 = self.p[2] - self.p[0];
        edge1.cross(edge2).normalize()
    }

    /// Apply a matrix to all three vertices; texture coordinates and color carry over.
    pub fn transformed(&self, m: &super::math::Mat4) -> Triangle {
        Triangle {
            p: self.p.map(|v| m.transform(v)),
            ..*self
        }
    }
}

/// Shading mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Mesh color, no lighting
    Unlit,
    /// Grey level from one directional light
    Flat,
    /// Texel as sampled
    #[default]
    Textured,
    /// Texel tinted by the flat light level
    TexturedLit,
}

impl ShadingMode {
    pub fn is_lit(self) -> bool {
        matches!(self, ShadingMode::Flat | ShadingMode::TexturedLit)
    }

    pub fn is_textured(self) -> bool {
        matches!(self, ShadingMode::Textured | ShadingMode::TexturedLit)
    }
}

/// Rasterizer settings
#[derive(Debug, Clone)]
pub struct RasterSettings {
    pub shading: ShadingMode,
    pub sample_mode: SampleMode,
    /// Backface culling
    pub backface_cull: bool,
    /// Normalized light direction
    pub light_dir: Vec4,
    /// Lowest light level a visible face gets
    pub min_intensity: f32,
    /// Outline each triangle after filling
    pub wireframe: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::Textured,
            sample_mode: SampleMode::Clamp,
            backface_cull: true,
            light_dir: Vec4::dir(0.0, 1.0, -1.0).normalize(),
            min_intensity: 0.1,
            wireframe: false,
        }
    }
}
