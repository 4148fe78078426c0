//! OBJ mesh loading
//!
//! Handles `v`, `vt` and `f` records. Faces reference vertices as `a`, `a/t`,
//! `a/t/n` or `a//n` with 1-based indices, and polygons are fanned into
//! triangles. Every other record is skipped.

use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::rasterizer::{TexCoord, Triangle, Vec4};
use super::Mesh;

/// Error type for mesh loading
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: bad number {value:?}")]
    BadNumber { line: usize, value: String },
    #[error("line {line}: {kind} index {index} out of range")]
    BadIndex { line: usize, kind: &'static str, index: i64 },
    #[error("line {line}: face needs at least 3 vertices")]
    ShortFace { line: usize },
    #[error("line {line}: record needs {expected} values")]
    ShortRecord { line: usize, expected: usize },
    #[error("line {line}: face vertex has no texture index")]
    MissingTexture { line: usize },
}

/// Load a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P, has_texture: bool) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut mesh = parse_obj(&contents, has_texture)?;
    mesh.name = name;
    Ok(mesh)
}

/// Parse OBJ text; `has_texture` requires every face vertex to carry a `vt` index.
pub fn parse_obj(src: &str, has_texture: bool) -> Result<Mesh, MeshError> {
    let mut positions: Vec<Vec4> = Vec::new();
    let mut uvs: Vec<TexCoord> = Vec::new();
    let mut tris = Vec::new();

    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let mut parts = raw.split_whitespace();
        let Some(tag) = parts.next() else { continue };
        let rest: Vec<&str> = parts.collect();

        match tag {
            "v" => {
                let [x, y, z] = floats::<3>(&rest, line)?;
                positions.push(Vec4::point(x, y, z));
            }
            "vt" => {
                let [u, v] = floats::<2>(&rest, line)?;
                uvs.push(TexCoord::new(u, v));
            }
            "f" => {
                if rest.len() < 3 {
                    return Err(MeshError::ShortFace { line });
                }
                let corners = rest
                    .iter()
                    .map(|r| face_corner(r, line, &positions, &uvs, has_texture))
                    .collect::<Result<Vec<_>, _>>()?;

                for k in 1..corners.len() - 1 {
                    let (a, b, c) = (corners[0], corners[k], corners[k + 1]);
                    tris.push(Triangle::textured([a.0, b.0, c.0], [a.1, b.1, c.1]));
                }
            }
            _ => {}
        }
    }

    Ok(Mesh::new("obj", tris))
}

fn floats<const N: usize>(parts: &[&str], line: usize) -> Result<[f32; N], MeshError> {
    if parts.len() < N {
        return Err(MeshError::ShortRecord { line, expected: N });
    }
    let mut out = [0.0; N];
    for (slot, s) in out.iter_mut().zip(parts) {
        *slot = s.parse().map_err(|_| MeshError::BadNumber {
            line,
            value: s.to_string(),
        })?;
    }
    Ok(out)
}

fn index(s: &str, line: usize) -> Result<i64, MeshError> {
    s.parse().map_err(|_| MeshError::BadNumber {
        line,
        value: s.to_string(),
    })
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn lookup<T: Copy>(items: &[T], idx: i64, line: usize, kind: &'static str) -> Result<T, MeshError> {
    let resolved = if idx < 0 { items.len() as i64 + idx } else { idx - 1 };
    usize::try_from(resolved)
        .ok()
        .and_then(|i| items.get(i).copied())
        .ok_or(MeshError::BadIndex { line, kind, index: idx })
}

fn face_corner(
    token: &str,
    line: usize,
    positions: &[Vec4],
    uvs: &[TexCoord],
    has_texture: bool,
) -> Result<(Vec4, TexCoord), MeshError> {
    let mut fields = token.split('/');
    let v = index(fields.next().unwrap_or_default(), line)?;
    let pos = lookup(positions, v, line, "vertex")?;

    let uv = match fields.next().filter(|s| !s.is_empty()) {
        Some(t) if has_texture => lookup(uvs, index(t, line)?, line, "texture")?,
        None if has_texture => return Err(MeshError::MissingTexture { line }),
        _ => TexCoord::default(),
    };

    Ok((pos, uv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_only_faces() {
        let src = "# tri\nv 0 0 0\nv 0 1 0\nv 1 1 0\n\nf 1 2 3\n";
        let mesh = parse_obj(src, false).unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.tris[0].p[2], Vec4::point(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_textured_quad_splits_in_two() {
        let src = "\
v 0 0 0
v 0 1 0
v 1 1 0
v 1 0 0
vt 0 1
vt 0 0
vt 1 0
vt 1 1
s off
f 1/1 2/2 3/3 4/4
";
        let mesh = parse_obj(src, true).unwrap();
        assert_eq!(mesh.len(), 2);
        // second half is (1, 3, 4)
        assert_eq!(mesh.tris[1].p[1], Vec4::point(1.0, 1.0, 0.0));
        assert_eq!(mesh.tris[1].t[2], TexCoord::new(1.0, 1.0));
    }

    #[test]
    fn test_normals_and_negative_indices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0.5 0.5\nf -3/1/1 -2/1/1 -1/1/1\n";
        let mesh = parse_obj(src, true).unwrap();
        assert_eq!(mesh.tris[0].p[0], Vec4::point(0.0, 0.0, 0.0));
        assert_eq!(mesh.tris[0].t[1], TexCoord::new(0.5, 0.5));
    }

    #[test]
    fn test_bad_index_is_reported() {
        let src = "v 0 0 0\nf 1 2 3\n";
        let err = parse_obj(src, false).unwrap_err();
        assert!(matches!(err, MeshError::BadIndex { line: 2, index: 2, .. }));
    }

    #[test]
    fn test_missing_texture_index() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        assert!(matches!(parse_obj(src, true), Err(MeshError::MissingTexture { line: 4 })));
        assert_eq!(parse_obj(src, false).unwrap().len(), 1);
    }

    #[test]
    fn test_bad_number() {
        let src = "v 0 zero 0\n";
        assert!(matches!(parse_obj(src, false), Err(MeshError::BadNumber { line: 1, .. })));
    }

    #[test]
    fn test_short_face() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(parse_obj(src, false), Err(MeshError::ShortFace { line: 3 })));
    }
}
