//! OBJ model loading through `tobj`
//!
//! Models are triangulated and re-indexed so positions, normals and texture
//! coordinates share one index list. Each named shape in the file becomes
//! one [`ObjShape`].

use std::io::BufRead;
use std::path::Path;

use crate::error::AssetError;

/// Attribute arrays of one triangulated OBJ shape
#[derive(Debug, Clone, PartialEq)]
pub struct ObjShape {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Loads every shape of an OBJ file
///
/// # Errors
/// [`AssetError::Obj`] if the file cannot be parsed and
/// [`AssetError::EmptyModel`] if no shape has any triangles
pub fn load_obj_shapes(path: &Path) -> Result<Vec<ObjShape>, AssetError> {
    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;
    shapes_from_models(models, path)
}

/// Parses OBJ text from any buffered reader, ignoring material libraries
pub fn parse_obj_shapes<R: BufRead>(reader: &mut R, path: &Path) -> Result<Vec<ObjShape>, AssetError> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;
    shapes_from_models(models, path)
}

fn shapes_from_models(models: Vec<tobj::Model>, path: &Path) -> Result<Vec<ObjShape>, AssetError> {
    let shapes: Vec<ObjShape> = models
        .into_iter()
        .filter(|model| {
            let has_geometry = !model.mesh.positions.is_empty() && !model.mesh.indices.is_empty();
            if !has_geometry {
                log::warn!("{}: skipping shape '{}' without geometry", path.display(), model.name);
            }
            has_geometry
        })
        .map(shape_from_model)
        .collect();

    if shapes.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }
    Ok(shapes)
}

fn shape_from_model(model: tobj::Model) -> ObjShape {
    let mesh = model.mesh;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    } else {
        log::debug!("shape '{}' has no normals, computing smooth normals", model.name);
        compute_vertex_normals(&positions, &mesh.indices)
    };

    let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], t[1]])
            .collect()
    });

    ObjShape {
        name: model.name,
        positions,
        normals,
        tex_coords,
        indices: mesh.indices,
    }
}

/// Area-weighted smooth normals for an indexed triangle list
///
/// Vertices not referenced by any triangle get +Y.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let (v0, v1, v2) = (positions[i0], positions[i1], positions[i2]);
        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

        // Cross product length is twice the triangle area
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for index in [i0, i1, i2] {
            for axis in 0..3 {
                normals[index][axis] += face_normal[axis];
            }
        }
    }

    for normal in &mut normals {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        *normal = if length > 0.0 {
            [normal[0] / length, normal[1] / length, normal[2] / length]
        } else {
            [0.0, 1.0, 0.0]
        };
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SHAPES: &str = "\
o board
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 3/3/1 2/2/1
f 1/1/1 4/4/1 3/3/1
o fin
v 0 0 0
v 0 1 0
v 0 0 1
f 5 6 7
";

    fn parse(src: &str) -> Result<Vec<ObjShape>, AssetError> {
        parse_obj_shapes(&mut src.as_bytes(), Path::new("inline.obj"))
    }

    #[test]
    fn test_parses_named_shapes() {
        let shapes = parse(TWO_SHAPES).expect("valid obj");
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].name, "board");
        assert_eq!(shapes[0].indices.len(), 6);
        assert_eq!(shapes[0].positions.len(), shapes[0].normals.len());
        assert!(shapes[0].tex_coords.is_some());
        assert_eq!(shapes[1].name, "fin");
        assert!(shapes[1].tex_coords.is_none());
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let shapes = parse(TWO_SHAPES).expect("valid obj");
        let fin = &shapes[1];
        assert_eq!(fin.normals.len(), fin.positions.len());
        for n in &fin.normals {
            assert!((n[0].abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_source_is_an_error() {
        assert!(matches!(parse(""), Err(AssetError::EmptyModel { .. })));
    }

    #[test]
    fn test_garbage_source_is_an_error() {
        let result = parse("this is not an obj file\n");
        assert!(matches!(result, Err(AssetError::EmptyModel { .. })));
    }

    #[test]
    fn test_shapes_without_faces_are_dropped() {
        let src = format!("{TWO_SHAPES}o empty\nv 1 1 1\n");
        let shapes = parse(&src).expect("valid obj");
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|shape| !shape.indices.is_empty()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_obj_shapes(Path::new("does/not/exist.obj"));
        assert!(matches!(result, Err(AssetError::Obj { .. })));
    }

    #[test]
    fn test_vertex_normals_of_flat_quad() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2]);
        for n in &normals[..3] {
            assert!((n[1] - 1.0).abs() < 1e-6);
        }
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }
}
