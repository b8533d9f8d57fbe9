//! Minimal OBJ parsing: positions, texcoords, and fan-triangulated faces.
//!
//! Supports exactly the subset the bundled assets use: `v x y z`,
//! `vt u v`, and `f a/b a/b a/b ...` with 1-based index pairs. Anything
//! else on a face line is an error; unknown record types are skipped.

use crate::mesh::MeshData;
use crate::vertex::Vertex;
use std::path::Path;

/// Errors from parsing a face record.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("face record needs at least 3 vertex/texcoord pairs: `{line}`")]
    ShortFace { line: String },

    #[error("invalid face index token `{token}`")]
    BadIndex { token: String },

    #[error("face index {index} out of range ({positions} positions, {texcoords} texcoords)")]
    IndexOutOfRange {
        index: usize,
        positions: usize,
        texcoords: usize,
    },
}

/// Parse one `a/b` token into 1-based (position, texcoord) indices.
/// A trailing `/c` normal index is accepted and ignored.
fn parse_index_pair(token: &str) -> Result<(usize, usize), ObjError> {
    let mut parts = token.split('/');
    let v = parts
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| ObjError::BadIndex {
            token: token.to_string(),
        })?;
    let vt = parts
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| ObjError::BadIndex {
            token: token.to_string(),
        })?;
    Ok((v, vt))
}

/// Expand a face record into triangles by fanning from the first vertex.
fn parse_face(
    line: &str,
    positions: &[[f32; 3]],
    texcoords: &[[f32; 2]],
    out: &mut Vec<Vertex>,
) -> Result<(), ObjError> {
    let mut pairs = Vec::new();
    for token in line.split_whitespace().skip(1) {
        pairs.push(parse_index_pair(token)?);
    }
    if pairs.len() < 3 {
        return Err(ObjError::ShortFace {
            line: line.to_string(),
        });
    }

    let resolve = |(v, vt): (usize, usize)| -> Result<Vertex, ObjError> {
        let check = |index: usize, len: usize| -> Result<usize, ObjError> {
            if index == 0 || index > len {
                Err(ObjError::IndexOutOfRange {
                    index,
                    positions: positions.len(),
                    texcoords: texcoords.len(),
                })
            } else {
                Ok(index - 1)
            }
        };
        let p = positions[check(v, positions.len())?];
        let t = texcoords[check(vt, texcoords.len())?];
        Ok(Vertex::new(p, t))
    };

    // Expand into a scratch list first so a bad index partway through
    // the fan cannot leave a partial triangle in the output.
    let mut fan = Vec::with_capacity((pairs.len() - 2) * 3);
    for i in 0..pairs.len() - 2 {
        fan.push(resolve(pairs[0])?);
        fan.push(resolve(pairs[i + 1])?);
        fan.push(resolve(pairs[i + 2])?);
    }
    out.extend(fan);
    Ok(())
}

/// Parse OBJ text into a fan-expanded vertex list.
///
/// A malformed face record halts parsing with a diagnostic; triangles
/// expanded before the error are kept. Malformed `v`/`vt` records are
/// skipped with a warning.
pub fn parse_obj(source: &str) -> MeshData {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut vertices: Vec<Vertex> = Vec::new();

    for (line_no, line) in source.lines().enumerate() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                let xyz: Vec<f32> = fields.filter_map(|s| s.parse().ok()).collect();
                if xyz.len() >= 3 {
                    positions.push([xyz[0], xyz[1], xyz[2]]);
                } else {
                    log::warn!("obj: skipping malformed position at line {}", line_no + 1);
                }
            }
            Some("vt") => {
                let uv: Vec<f32> = fields.filter_map(|s| s.parse().ok()).collect();
                if uv.len() >= 2 {
                    texcoords.push([uv[0], uv[1]]);
                } else {
                    log::warn!("obj: skipping malformed texcoord at line {}", line_no + 1);
                }
            }
            Some("f") => {
                if let Err(e) = parse_face(line, &positions, &texcoords, &mut vertices) {
                    log::error!("obj: face parse failed at line {}: {}", line_no + 1, e);
                    break;
                }
            }
            _ => {}
        }
    }

    MeshData { vertices }
}

/// Load and parse an OBJ file. An unreadable file yields an empty mesh
/// with a diagnostic rather than an error.
pub fn load_obj(path: impl AsRef<Path>) -> MeshData {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => {
            let data = parse_obj(&source);
            log::info!(
                "loaded mesh {:?}: {} vertices after fan expansion",
                path,
                data.vertices.len()
            );
            data
        }
        Err(e) => {
            log::error!("failed to read mesh {:?}: {}", path, e);
            MeshData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 0.0 1.0
v 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_fans_into_two_triangles() {
        let data = parse_obj(QUAD);
        assert_eq!(data.vertices.len(), 6);
        // Both triangles share the first listed vertex.
        assert_eq!(data.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(data.vertices[3].position, [0.0, 0.0, 0.0]);
        assert_eq!(data.vertices[5].tex_coords, [0.0, 1.0]);
    }

    #[test]
    fn indices_are_one_based() {
        let src = "v 1.0 2.0 3.0\nv 4.0 5.0 6.0\nv 7.0 8.0 9.0\nvt 0.5 0.5\nf 1/1 2/1 3/1\n";
        let data = parse_obj(src);
        assert_eq!(data.vertices.len(), 3);
        assert_eq!(data.vertices[2].position, [7.0, 8.0, 9.0]);
    }

    #[test]
    fn malformed_face_halts_and_keeps_prior_triangles() {
        let src = format!("{QUAD}f 1/x 2/2 3/3\nf 1/1 2/2 3/3\n");
        let data = parse_obj(&src);
        // Only the quad before the bad face survives; the face after it
        // is never reached.
        assert_eq!(data.vertices.len(), 6);
    }

    #[test]
    fn short_face_is_an_error() {
        let src = "v 0 0 0\nv 1 0 0\nvt 0 0\nf 1/1 2/1\n";
        let data = parse_obj(src);
        assert!(data.vertices.is_empty());
    }

    #[test]
    fn out_of_range_index_halts() {
        let src = "v 0 0 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let data = parse_obj(src);
        assert!(data.vertices.is_empty());
    }

    #[test]
    fn mid_fan_error_discards_the_whole_face() {
        // The first fan triangle resolves; the second hits index 9 and
        // errors. Neither may leave vertices behind, and the quad
        // parsed earlier survives intact.
        let src = format!("{QUAD}f 1/1 2/2 3/3 9/4\n");
        let data = parse_obj(&src);
        assert_eq!(data.vertices.len(), 6);
        assert_eq!(data.vertices.len() % 3, 0);
    }

    #[test]
    fn normals_in_face_tokens_are_ignored() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1/1 2/2/1 3/3/1\n";
        let data = parse_obj(src);
        assert_eq!(data.vertices.len(), 3);
    }

    #[test]
    fn unknown_records_are_skipped() {
        let src = format!("# comment\no plane\ns off\n{QUAD}");
        let data = parse_obj(&src);
        assert_eq!(data.vertices.len(), 6);
    }
}
