//! Plane-vs-triangle clipping
//!
//! A single routine serves both the view-space near plane and the four
//! screen edges. A triangle comes out as 0, 1 or 2 triangles.

use std::collections::VecDeque;
use super::math::{TexCoord, Vec4};
use super::types::Triangle;

/// Oriented plane; points with non-negative distance are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec4,
    /// Unit normal
    pub normal: Vec4,
}

impl Plane {
    pub fn new(point: Vec4, normal: Vec4) -> Self {
        Self { point, normal: normal.normalize() }
    }

    /// Signed distance of `p` from the plane
    pub fn distance(&self, p: Vec4) -> f32 {
        self.normal.dot(p) - self.normal.dot(self.point)
    }

    /// Parameter along `start -> end` where the segment crosses the plane
    pub fn intersect_t(&self, start: Vec4, end: Vec4) -> f32 {
        let plane_d = -self.normal.dot(self.point);
        let ad = start.dot(self.normal);
        let bd = end.dot(self.normal);
        (-plane_d - ad) / (bd - ad)
    }

    /// Four inward-facing planes on the pixel edges of a `width x height` viewport
    pub fn screen_edges(width: usize, height: usize) -> [Plane; 4] {
        let bottom = height.saturating_sub(1) as f32;
        let right = width.saturating_sub(1) as f32;
        [
            Plane::new(Vec4::point(0.0, 0.0, 0.0), Vec4::dir(0.0, 1.0, 0.0)),
            Plane::new(Vec4::point(0.0, bottom, 0.0), Vec4::dir(0.0, -1.0, 0.0)),
            Plane::new(Vec4::point(0.0, 0.0, 0.0), Vec4::dir(1.0, 0.0, 0.0)),
            Plane::new(Vec4::point(right, 0.0, 0.0), Vec4::dir(-1.0, 0.0, 0.0)),
        ]
    }
}

/// Output of one clip: up to two triangles without allocating
#[derive(Debug, Clone, Copy, Default)]
pub struct Clipped {
    tris: [Triangle; 2],
    len: usize,
}

impl Clipped {
    fn none() -> Self {
        Self::default()
    }

    fn one(a: Triangle) -> Self {
        Self { tris: [a, Triangle::default()], len: 1 }
    }

    fn two(a: Triangle, b: Triangle) -> Self {
        Self { tris: [a, b], len: 2 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Triangle] {
        &self.tris[..self.len]
    }
}

impl IntoIterator for Clipped {
    type Item = Triangle;
    type IntoIter = std::iter::Take<std::array::IntoIter<Triangle, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tris.into_iter().take(self.len)
    }
}

/// Point where the edge `(p_in, t_in) -> (p_out, t_out)` meets the plane,
/// with the texture coordinate interpolated by the same parameter.
fn edge_crossing(
    plane: &Plane,
    p_in: Vec4,
    t_in: TexCoord,
    p_out: Vec4,
    t_out: TexCoord,
) -> (Vec4, TexCoord) {
    let t = plane.intersect_t(p_in, p_out);
    (p_in.lerp(p_out, t), t_in.lerp(t_out, t))
}

/// Clip `tri` against `plane`.
pub fn clip_triangle(plane: &Plane, tri: &Triangle) -> Clipped {
    let mut inside: [usize; 3] = [0; 3];
    let mut outside: [usize; 3] = [0; 3];
    let (mut n_in, mut n_out) = (0, 0);

    for i in 0..3 {
        if plane.distance(tri.p[i]) >= 0.0 {
            inside[n_in] = i;
            n_in += 1;
        } else {
            outside[n_out] = i;
            n_out += 1;
        }
    }

    match n_in {
        0 => Clipped::none(),
        3 => Clipped::one(*tri),
        1 => {
            let (a, o0, o1) = (inside[0], outside[0], outside[1]);
            let (p1, t1) = edge_crossing(plane, tri.p[a], tri.t[a], tri.p[o0], tri.t[o0]);
            let (p2, t2) = edge_crossing(plane, tri.p[a], tri.t[a], tri.p[o1], tri.t[o1]);
            Clipped::one(Triangle {
                p: [tri.p[a], p1, p2],
                t: [tri.t[a], t1, t2],
                color: tri.color,
            })
        }
        _ => {
            let (a, b, o) = (inside[0], inside[1], outside[0]);
            let (pa, ta) = edge_crossing(plane, tri.p[a], tri.t[a], tri.p[o], tri.t[o]);
            let (pb, tb) = edge_crossing(plane, tri.p[b], tri.t[b], tri.p[o], tri.t[o]);
            let first = Triangle {
                p: [tri.p[a], tri.p[b], pa],
                t: [tri.t[a], tri.t[b], ta],
                color: tri.color,
            };
            let second = Triangle {
                p: [tri.p[b], pa, pb],
                t: [tri.t[b], ta, tb],
                color: tri.color,
            };
            Clipped::two(first, second)
        }
    }
}

/// Clip `tri` against each plane in turn.
///
/// Every triangle produced by one plane is consumed before the next plane
/// starts; the work list is a FIFO reused across calls.
pub fn clip_against_planes(planes: &[Plane], tri: Triangle, queue: &mut VecDeque<Triangle>) {
    queue.clear();
    queue.push_back(tri);

    for plane in planes {
        let pending = queue.len();
        for _ in 0..pending {
            let Some(t) = queue.pop_front() else { break };
            queue.extend(clip_triangle(plane, &t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane_z0() -> Plane {
        Plane::new(Vec4::point(0.0, 0.0, 0.0), Vec4::dir(0.0, 0.0, 1.0))
    }

    fn tri(a: (f32, f32, f32), b: (f32, f32, f32), c: (f32, f32, f32)) -> Triangle {
        Triangle::textured(
            [
                Vec4::point(a.0, a.1, a.2),
                Vec4::point(b.0, b.1, b.2),
                Vec4::point(c.0, c.1, c.2),
            ],
            [TexCoord::new(0.0, 0.0), TexCoord::new(1.0, 0.0), TexCoord::new(0.0, 1.0)],
        )
    }

    fn area(t: &Triangle) -> f32 {
        (t.p[1] - t.p[0]).cross(t.p[2] - t.p[0]).len() * 0.5
    }

    #[test]
    fn test_fully_inside_passes_through() {
        let t = tri((0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (0.0, 1.0, 3.0));
        let out = clip_triangle(&plane_z0(), &t);
        assert_eq!(out.len(), 1);
        assert_eq!(out.as_slice()[0], t);
    }

    #[test]
    fn test_vertex_on_plane_counts_inside() {
        let t = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        assert_eq!(clip_triangle(&plane_z0(), &t).len(), 1);
    }

    #[test]
    fn test_fully_outside_is_dropped() {
        let t = tri((0.0, 0.0, -1.0), (1.0, 0.0, -2.0), (0.0, 1.0, -3.0));
        assert!(clip_triangle(&plane_z0(), &t).is_empty());
    }

    #[test]
    fn test_one_inside_gives_one_triangle_on_plane() {
        let plane = plane_z0();
        let t = tri((0.0, 0.0, 2.0), (2.0, 0.0, -2.0), (0.0, 2.0, -2.0));
        let out = clip_triangle(&plane, &t);
        assert_eq!(out.len(), 1);

        let c = out.as_slice()[0];
        assert_eq!(c.p[0], t.p[0]);
        assert_eq!(c.t[0], t.t[0]);
        for i in 1..3 {
            assert_abs_diff_eq!(plane.distance(c.p[i]), 0.0, epsilon = 1e-5);
            assert_eq!(c.p[i].w, 1.0);
        }
        // halfway along each edge, so texture coordinates are halfway too
        assert_abs_diff_eq!(c.t[1].u, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(c.t[2].v, 0.5, epsilon = 1e-5);
        assert_eq!(c.color, t.color);
    }

    #[test]
    fn test_two_inside_gives_quad() {
        let plane = plane_z0();
        // right triangle in the x/z plane, apex below the plane
        let t = tri((0.0, 0.0, 1.0), (2.0, 0.0, 1.0), (0.0, 0.0, -1.0));
        let out = clip_triangle(&plane, &t);
        assert_eq!(out.len(), 2);

        // quad between z=1 (width 2) and z=0 (width 1): area 1.5
        let total: f32 = out.as_slice().iter().map(area).sum();
        assert_abs_diff_eq!(total, 1.5, epsilon = 1e-5);

        for c in out.as_slice() {
            for p in c.p {
                assert!(plane.distance(p) >= -1e-5);
            }
        }
    }

    #[test]
    fn test_degenerate_triangle_never_panics() {
        let t = tri((1.0, 1.0, -1.0), (1.0, 1.0, -1.0), (1.0, 1.0, 1.0));
        let out = clip_triangle(&plane_z0(), &t);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_screen_edges_keep_inside_bounds() {
        let planes = Plane::screen_edges(64, 64);
        let t = tri((-20.0, 10.0, 0.0), (100.0, 30.0, 0.0), (30.0, 90.0, 0.0));
        let mut queue = VecDeque::new();
        clip_against_planes(&planes, t, &mut queue);

        assert!(!queue.is_empty());
        for c in &queue {
            for p in c.p {
                assert!(p.x >= -1e-3 && p.x <= 63.001, "x out of range: {}", p.x);
                assert!(p.y >= -1e-3 && p.y <= 63.001, "y out of range: {}", p.y);
            }
        }
    }

    #[test]
    fn test_screen_edges_drop_offscreen() {
        let planes = Plane::screen_edges(64, 64);
        let t = tri((70.0, 10.0, 0.0), (100.0, 30.0, 0.0), (80.0, 50.0, 0.0));
        let mut queue = VecDeque::new();
        clip_against_planes(&planes, t, &mut queue);
        assert!(queue.is_empty());
    }
}
