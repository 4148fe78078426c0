//! Triangle meshes and built-in shapes

use crate::rasterizer::{TexCoord, Triangle, Vec4};

/// Ordered triangle list, read-only while a frame renders
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub tris: Vec<Triangle>,
}

/// Texture coordinates shared by both halves of every built-in square face
const FACE_UVS: [[(f32, f32); 3]; 2] = [
    [(0.0, 1.0), (0.0, 0.0), (1.0, 0.0)],
    [(0.0, 1.0), (1.0, 0.0), (1.0, 1.0)],
];

fn face_tri(p: [(f32, f32, f32); 3], half: usize) -> Triangle {
    Triangle::textured(
        p.map(|(x, y, z)| Vec4::point(x, y, z)),
        FACE_UVS[half].map(|(u, v)| TexCoord::new(u, v)),
    )
}

impl Mesh {
    pub fn new(name: &str, tris: Vec<Triangle>) -> Self {
        Self { name: name.to_string(), tris }
    }

    pub fn len(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// Unit square in the z = 0 plane, facing -z
    pub fn quad() -> Self {
        Self::new(
            "quad",
            vec![
                face_tri([(0.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)], 0),
                face_tri([(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0)], 1),
            ],
        )
    }

    /// Unit cube spanning (0,0,0)-(1,1,1), outward winding
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let faces: [[(f32, f32, f32); 4]; 6] = [
            // south
            [(0.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0)],
            // east
            [(1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 1.0, 1.0), (1.0, 0.0, 1.0)],
            // north
            [(1.0, 0.0, 1.0), (1.0, 1.0, 1.0), (0.0, 1.0, 1.0), (0.0, 0.0, 1.0)],
            // west
            [(0.0, 0.0, 1.0), (0.0, 1.0, 1.0), (0.0, 1.0, 0.0), (0.0, 0.0, 0.0)],
            // top
            [(0.0, 1.0, 0.0), (0.0, 1.0, 1.0), (1.0, 1.0, 1.0), (1.0, 1.0, 0.0)],
            // bottom
            [(1.0, 0.0, 1.0), (0.0, 0.0, 1.0), (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)],
        ];

        let tris = faces
            .iter()
            .flat_map(|[a, b, c, d]| [face_tri([*a, *b, *c], 0), face_tri([*a, *c, *d], 1)])
            .collect();

        Self::new("cube", tris)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube();
        assert_eq!(cube.len(), 12);
        let center = Vec4::point(0.5, 0.5, 0.5);
        for tri in &cube.tris {
            let out = tri.p[0] - center;
            assert!(tri.normal().dot(out) > 0.0, "inward face: {:?}", tri.p);
        }
    }

    #[test]
    fn test_quad_faces_negative_z() {
        let quad = Mesh::quad();
        for tri in &quad.tris {
            assert!((tri.normal().z + 1.0).abs() < 1e-6);
        }
    }
}
