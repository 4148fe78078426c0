//! Homogeneous vector and matrix math
//!
//! Row-vector convention: a point is transformed as `v' = v · M`, so the
//! translation lives in the bottom row and composition reads left to right.

use std::ops::{Add, Div, Mul, Sub};
use serde::{Serialize, Deserialize};

/// Homogeneous 3D vector
///
/// Arithmetic and the length/normalize helpers only touch `x, y, z`; `w` is
/// carried through unchanged from the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default = "one")]
    pub w: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for Vec4 {
    fn default() -> Self {
        Self::point(0.0, 0.0, 0.0)
    }
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const UP: Vec4 = Vec4 { x: 0.0, y: 1.0, z: 0.0, w: 0.0 };
    pub const FORWARD: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 1.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Position (`w = 1`)
    pub fn point(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// Direction (`w = 0`)
    pub fn dir(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 0.0 }
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: self.w,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. Zero-length input yields NaN components; callers
    /// must not feed degenerate vectors.
    pub fn normalize(self) -> Vec4 {
        self / self.len()
    }

    pub fn scale(self, s: f32) -> Vec4 {
        Vec4 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
            w: self.w,
        }
    }

    /// Divide `x, y, z` by `w` and reset `w` to 1.
    pub fn perspective_divide(self) -> Vec4 {
        if self.w == 0.0 {
            return Vec4 { w: 1.0, ..self };
        }
        Vec4 {
            x: self.x / self.w,
            y: self.y / self.w,
            z: self.z / self.w,
            w: 1.0,
        }
    }

    /// Linear blend between `self` (t = 0) and `other` (t = 1), `w` included.
    pub fn lerp(self, other: Vec4, t: f32) -> Vec4 {
        Vec4 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
            w: self.w + (other.w - self.w) * t,
        }
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w,
        }
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w,
        }
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        self.scale(s)
    }
}

impl Div<f32> for Vec4 {
    type Output = Vec4;
    fn div(self, s: f32) -> Vec4 {
        Vec4 {
            x: self.x / s,
            y: self.y / s,
            z: self.z / s,
            w: self.w,
        }
    }
}

/// Texture coordinate carried through the pipeline
///
/// After projection `u` and `v` are pre-divided by view depth and `w` holds
/// the reciprocal depth, so the true coordinate is `(u / w, v / w)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl Default for TexCoord {
    fn default() -> Self {
        Self { u: 0.0, v: 0.0, w: 1.0 }
    }
}

impl TexCoord {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v, w: 1.0 }
    }

    pub fn lerp(self, other: TexCoord, t: f32) -> TexCoord {
        TexCoord {
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
            w: self.w + (other.w - self.w) * t,
        }
    }

    /// Prepare for perspective-correct interpolation given view depth `z`.
    pub fn to_perspective(self, z: f32) -> TexCoord {
        TexCoord {
            u: self.u / z,
            v: self.v / z,
            w: 1.0 / z,
        }
    }

    /// Undo [`TexCoord::to_perspective`]
    pub fn recover(self) -> (f32, f32) {
        (self.u / self.w, self.v / self.w)
    }
}

/// 4x4 matrix, `m[row][col]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const ZERO: Mat4 = Mat4 { m: [[0.0; 4]; 4] };

    pub fn identity() -> Self {
        let mut m = Self::ZERO;
        m.m[0][0] = 1.0;
        m.m[1][1] = 1.0;
        m.m[2][2] = 1.0;
        m.m[3][3] = 1.0;
        m
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.m[3][0] = x;
        m.m[3][1] = y;
        m.m[3][2] = z;
        m
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m[1][1] = c;
        m.m[1][2] = s;
        m.m[2][1] = -s;
        m.m[2][2] = c;
        m
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m[0][0] = c;
        m.m[0][2] = s;
        m.m[2][0] = -s;
        m.m[2][2] = c;
        m
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Self::identity();
        m.m[0][0] = c;
        m.m[0][1] = s;
        m.m[1][0] = -s;
        m.m[1][1] = c;
        m
    }

    /// Perspective projection
    ///
    /// `fov_scale` is `1 / tan(fov / 2)`, `aspect` is `height / width`.
    /// View-space depth is copied into `w` for the later perspective divide.
    pub fn projection(fov_scale: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut m = Self::ZERO;
        m.m[0][0] = aspect * fov_scale;
        m.m[1][1] = fov_scale;
        m.m[2][2] = far / (far - near);
        m.m[3][2] = (-far * near) / (far - near);
        m.m[2][3] = 1.0;
        m
    }

    /// `v · M`, all four components
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    /// `self · other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Mat4) -> Mat4 {
        let mut out = Self::ZERO;
        for r in 0..4 {
            for c in 0..4 {
                out.m[r][c] = (0..4).map(|k| self.m[r][k] * other.m[k][c]).sum();
            }
        }
        out
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        self.multiply(&other)
    }
}

/// Rotation + translation with an orthonormal 3x3 block.
///
/// Only constructible from rigid pieces, which is what makes
/// [`RigidTransform::inverse`] valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform(Mat4);

impl RigidTransform {
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self(Mat4::translation(x, y, z))
    }

    pub fn rotation_y(angle: f32) -> Self {
        Self(Mat4::rotation_y(angle))
    }

    /// Camera orientation placed at `pos`, looking towards `target`.
    ///
    /// `up` is re-orthogonalised against the forward axis. `target` must not
    /// coincide with `pos` and forward must not be parallel to `up`.
    pub fn point_at(pos: Vec4, target: Vec4, up: Vec4) -> Self {
        let forward = (target - pos).normalize();
        let a = forward * up.dot(forward);
        let up = (up - a).normalize();
        let right = up.cross(forward);

        Self(Mat4 {
            m: [
                [right.x, right.y, right.z, 0.0],
                [up.x, up.y, up.z, 0.0],
                [forward.x, forward.y, forward.z, 0.0],
                [pos.x, pos.y, pos.z, 1.0],
            ],
        })
    }

    /// Compose two rigid transforms, `self` applied first.
    pub fn then(&self, other: &RigidTransform) -> RigidTransform {
        RigidTransform(self.0.multiply(&other.0))
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.0
    }

    /// Inverse by transposing the rotation and rotating the negated translation.
    pub fn inverse(&self) -> Mat4 {
        let a = &self.0.m;
        let mut m = Mat4::ZERO;
        for r in 0..3 {
            for c in 0..3 {
                m.m[r][c] = a[c][r];
            }
        }
        for c in 0..3 {
            m.m[3][c] = -(a[3][0] * m.m[0][c] + a[3][1] * m.m[1][c] + a[3][2] * m.m[2][c]);
        }
        m.m[3][3] = 1.0;
        m
    }
}
