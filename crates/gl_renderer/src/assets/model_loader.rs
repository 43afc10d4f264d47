//! OBJ model import
//!
//! Models are read with `tobj`, triangulated and re-indexed so a single
//! index addresses position, normal and texture coordinate together. Texture
//! coordinates are flipped vertically (`v' = 1 - v`) to match images that
//! were flipped on load, and a tangent frame is generated per mesh.

use std::path::{Path, PathBuf};

use crate::assets::AssetError;
use crate::render::mesh::{Mesh, TextureKind, TextureRef, Vertex};

/// Submeshes of one model file
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// One mesh per object/group in the file
    pub meshes: Vec<Mesh>,
    /// Directory the model was loaded from; texture paths are relative to it
    pub directory: PathBuf,
}

impl LoadedModel {
    /// Total vertices over all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Total triangles over all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Load every mesh of an OBJ file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LoadedModel, AssetError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|e| match e {
        tobj::LoadError::OpenFileFailed => AssetError::NotFound(display.clone()),
        source => AssetError::ModelImport { path: display.clone(), source },
    })?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable materials for {}: {}", display, e);
        Vec::new()
    });

    if models.is_empty() {
        return Err(AssetError::NoMeshes(display));
    }

    let meshes = models
        .iter()
        .map(|model| {
            let mesh = convert_mesh(&model.mesh, &materials);
            mesh.validate().map_err(|source| AssetError::InvalidMesh {
                path: display.clone(),
                name: model.name.clone(),
                source,
            })?;
            Ok(mesh)
        })
        .collect::<Result<Vec<_>, AssetError>>()?;

    let loaded = LoadedModel {
        meshes,
        directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    log::info!(
        "Loaded model {}: {} mesh(es), {} vertices, {} triangles, {} material(s)",
        display,
        loaded.meshes.len(),
        loaded.vertex_count(),
        loaded.triangle_count(),
        materials.len()
    );
    Ok(loaded)
}

/// Convert one imported mesh into engine vertices
fn convert_mesh(mesh: &tobj::Mesh, materials: &[tobj::Material]) -> Mesh {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_tex_coords = mesh.texcoords.len() / 2 == vertex_count;

    let vertices = (0..vertex_count)
        .map(|i| {
            let position = [mesh.positions[3 * i], mesh.positions[3 * i + 1], mesh.positions[3 * i + 2]];
            let normal = if has_normals {
                [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
            } else {
                [0.0, 0.0, 0.0]
            };
            let tex_coord = if has_tex_coords {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            };
            Vertex::new(position, normal, tex_coord)
        })
        .collect();

    let textures = mesh
        .material_id
        .and_then(|id| materials.get(id))
        .map(material_textures)
        .unwrap_or_default();

    let mut converted = Mesh::new(vertices, mesh.indices.clone()).with_textures(textures);
    if has_tex_coords {
        converted.compute_tangents();
    }
    converted
}

/// Texture references of a material, grouped by kind
///
/// The ambient map slot carries height maps in the models this loader is
/// used with.
fn material_textures(material: &tobj::Material) -> Vec<TextureRef> {
    [
        (TextureKind::Diffuse, &material.diffuse_texture),
        (TextureKind::Specular, &material.specular_texture),
        (TextureKind::Normal, &material.normal_texture),
        (TextureKind::Height, &material.ambient_texture),
    ]
    .into_iter()
    .filter_map(|(kind, path)| {
        path.as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| TextureRef { kind, path: p.clone() })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn triangle_mesh() -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
            material_id: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_texture_coordinates_are_flipped() {
        let mesh = convert_mesh(&triangle_mesh(), &[]);
        assert_eq!(mesh.vertices[0].tex_coord, [0.0, 1.0]);
        assert_eq!(mesh.vertices[1].tex_coord, [1.0, 1.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [0.0, 0.0]);
        assert!(mesh.textures.is_empty());
    }

    #[test]
    fn test_tangents_are_generated() {
        let mesh = convert_mesh(&triangle_mesh(), &[]);
        assert_eq!(mesh.vertices[0].tangent, [1.0, 0.0, 0.0]);
        // v runs downwards after the flip
        assert_eq!(mesh.vertices[0].bitangent, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_missing_normals_default_to_zero() {
        let source = tobj::Mesh {
            normals: Vec::new(),
            texcoords: Vec::new(),
            ..triangle_mesh()
        };
        let mesh = convert_mesh(&source, &[]);
        assert_eq!(mesh.vertices[1].normal, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].tex_coord, [0.0, 0.0]);
        assert_eq!(mesh.vertices[1].tangent, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_material_textures_by_kind() {
        let material = tobj::Material {
            diffuse_texture: Some("rock.png".to_string()),
            specular_texture: Some(String::new()),
            normal_texture: Some("rock_n.png".to_string()),
            ambient_texture: Some("rock_h.png".to_string()),
            ..Default::default()
        };

        let mesh = convert_mesh(&triangle_mesh(), &[material]);
        let kinds: Vec<_> = mesh.textures.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TextureKind::Diffuse, TextureKind::Normal, TextureKind::Height]);
        assert_eq!(mesh.textures[0].path, "rock.png");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("quad.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1 4/4/1\n",
        )
        .expect("write obj");

        let model = load_model(&path).expect("load");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.directory, dir.path());
    }

    #[test]
    fn test_missing_file() {
        let result = load_model("definitely/not/here.obj");
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }
}
