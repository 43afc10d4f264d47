//! Mesh representation for 3D models
//!
//! CPU-side geometry as produced by the model importer, the vertex layouts
//! the GL layer binds, and tangent-space generation for normal mapping.

use crate::foundation::math::{Vec2, Vec3};
use crate::render::{RenderError, RenderResult};
use thiserror::Error;

/// Full vertex used by imported models
///
/// Attribute locations follow field order: 0 position, 1 normal,
/// 2 texture coordinate, 3 tangent, 4 bitangent.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Tangent vector for normal mapping
    pub tangent: [f32; 3],

    /// Bitangent vector for normal mapping
    pub bitangent: [f32; 3],
}

// Safe to implement Pod and Zeroable for Vertex since it only contains f32 arrays
unsafe impl bytemuck::Pod for Vertex {}
unsafe impl bytemuck::Zeroable for Vertex {}

static_assertions::assert_eq_size!(Vertex, [u8; 56]);

impl Vertex {
    /// Create a new vertex without tangent space
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            ..Self::default()
        }
    }
}

/// Position-only vertex for the tutorial demos
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionVertex {
    /// Position in clip or model space
    pub position: [f32; 3],
}

unsafe impl bytemuck::Pod for PositionVertex {}
unsafe impl bytemuck::Zeroable for PositionVertex {}

static_assertions::assert_eq_size!(PositionVertex, [u8; 12]);

/// One vertex attribute: `components` values of `component_size` bytes each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFeature {
    /// Number of components (1..=4)
    pub components: i32,
    /// Size of one component in bytes
    pub component_size: usize,
    /// GL component type (`glow::FLOAT`, ...)
    pub gl_type: u32,
    /// Normalize integer data to [0, 1] / [-1, 1]
    pub normalized: bool,
}

impl VertexFeature {
    /// `components` 32-bit floats
    pub const fn float(components: i32) -> Self {
        Self {
            components,
            component_size: std::mem::size_of::<f32>(),
            gl_type: glow::FLOAT,
            normalized: false,
        }
    }

    /// Bytes the attribute occupies inside a vertex
    pub const fn size(&self) -> usize {
        self.components as usize * self.component_size
    }
}

/// A vertex type with a consecutive, tightly packed attribute layout
pub trait VertexLayout: bytemuck::Pod {
    /// Attributes in location order
    const FEATURES: &'static [VertexFeature];

    /// Number of attribute locations the layout occupies
    fn attribute_count() -> u32 {
        Self::FEATURES.len() as u32
    }
}

impl VertexLayout for Vertex {
    const FEATURES: &'static [VertexFeature] = &[
        VertexFeature::float(3), // position
        VertexFeature::float(3), // normal
        VertexFeature::float(2), // tex_coord
        VertexFeature::float(3), // tangent
        VertexFeature::float(3), // bitangent
    ];
}

impl VertexLayout for PositionVertex {
    const FEATURES: &'static [VertexFeature] = &[VertexFeature::float(3)];
}

/// Byte offset of every feature, checked against the vertex size
///
/// The features must cover the vertex exactly; anything else means the
/// attribute pointers would read padding or neighbouring vertices.
pub fn feature_offsets(features: &[VertexFeature], vertex_size: usize) -> RenderResult<Vec<usize>> {
    let mut offsets = Vec::with_capacity(features.len());
    let mut offset = 0;
    for feature in features {
        offsets.push(offset);
        offset += feature.size();
    }

    if offset != vertex_size {
        return Err(RenderError::VertexLayoutMismatch { described: offset, actual: vertex_size });
    }
    Ok(offsets)
}

/// Texture role inside a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Albedo map
    Diffuse,
    /// Specular intensity map
    Specular,
    /// Tangent-space normal map
    Normal,
    /// Height / displacement map
    Height,
}

impl TextureKind {
    /// Sampler uniform prefix, completed with a 1-based per-kind number
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
            Self::Normal => "texture_normal",
            Self::Height => "texture_height",
        }
    }
}

/// A texture a mesh refers to, by path relative to its model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef {
    /// Role of the texture
    pub kind: TextureKind,
    /// Path as written in the material file
    pub path: String,
}

/// Sampler uniform names for a mesh's textures, in texture-unit order
///
/// Numbering restarts for each kind: two diffuse maps and a specular map
/// become `texture_diffuse1`, `texture_diffuse2`, `texture_specular1`.
pub fn sampler_names(kinds: impl IntoIterator<Item = TextureKind>) -> Vec<String> {
    let mut counters = [0u32; 4];
    kinds
        .into_iter()
        .map(|kind| {
            let slot = &mut counters[kind as usize];
            *slot += 1;
            format!("{}{}", kind.uniform_prefix(), slot)
        })
        .collect()
}

/// Geometry that cannot be drawn as a triangle list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Index count is not a multiple of three
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    /// An index points past the vertex list
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Vertices in the mesh
        vertex_count: usize,
    },
}

/// Triangle mesh with its texture references
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,

    /// Textures referenced by the mesh's material
    pub textures: Vec<TextureRef>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices, textures: Vec::new() }
    }

    /// Attach texture references
    pub fn with_textures(mut self, textures: Vec<TextureRef>) -> Self {
        self.textures = textures;
        self
    }

    /// Number of indices drawn
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check that the index list forms triangles over existing vertices
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Generate per-vertex tangents and bitangents from positions and UVs
    ///
    /// Contributions of every triangle sharing a vertex are summed and then
    /// normalized. Triangles with degenerate UVs contribute nothing; vertices
    /// touched only by such triangles keep a zero tangent frame.
    pub fn compute_tangents(&mut self) {
        let mut tangents = vec![Vec3::zeros(); self.vertices.len()];
        let mut bitangents = vec![Vec3::zeros(); self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(v0), Some(v1), Some(v2)) =
                (self.vertices.get(i0), self.vertices.get(i1), self.vertices.get(i2))
            else {
                continue;
            };

            let edge1 = Vec3::from(v1.position) - Vec3::from(v0.position);
            let edge2 = Vec3::from(v2.position) - Vec3::from(v0.position);
            let delta_uv1 = Vec2::from(v1.tex_coord) - Vec2::from(v0.tex_coord);
            let delta_uv2 = Vec2::from(v2.tex_coord) - Vec2::from(v0.tex_coord);

            let determinant = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
            if determinant.abs() <= f32::EPSILON {
                continue;
            }
            let f = 1.0 / determinant;

            let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f;
            let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * f;

            for index in [i0, i1, i2] {
                tangents[index] += tangent;
                bitangents[index] += bitangent;
            }
        }

        for ((vertex, tangent), bitangent) in self.vertices.iter_mut().zip(tangents).zip(bitangents) {
            vertex.tangent = normalized_or_zero(tangent).into();
            vertex.bitangent = normalized_or_zero(bitangent).into();
        }
    }
}

fn normalized_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_quad() -> Mesh {
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([0.0, 0.0, 0.0], normal, [0.0, 0.0]),
            Vertex::new([2.0, 0.0, 0.0], normal, [1.0, 0.0]),
            Vertex::new([2.0, 2.0, 0.0], normal, [1.0, 1.0]),
            Vertex::new([0.0, 2.0, 0.0], normal, [0.0, 1.0]),
        ];
        Mesh::new(vertices, vec![0, 1, 2, 2, 3, 0])
    }

    #[test]
    fn test_vertex_features_cover_vertex() {
        let offsets = feature_offsets(Vertex::FEATURES, std::mem::size_of::<Vertex>()).expect("layout");
        assert_eq!(offsets, vec![0, 12, 24, 32, 44]);
        assert_eq!(Vertex::attribute_count(), 5);

        let offsets = feature_offsets(PositionVertex::FEATURES, std::mem::size_of::<PositionVertex>())
            .expect("layout");
        assert_eq!(offsets, vec![0]);
    }

    #[test]
    fn test_layout_mismatch_is_detected() {
        let short = [VertexFeature::float(3), VertexFeature::float(2)];
        let result = feature_offsets(&short, std::mem::size_of::<Vertex>());
        assert!(matches!(
            result,
            Err(RenderError::VertexLayoutMismatch { described: 20, actual: 56 })
        ));
    }

    #[test]
    fn test_tangents_follow_uv_axes() {
        let mut mesh = unit_quad();
        mesh.compute_tangents();

        for vertex in &mesh.vertices {
            assert_relative_eq!(Vec3::from(vertex.tangent), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
            assert_relative_eq!(Vec3::from(vertex.bitangent), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_degenerate_uvs_leave_zero_frame() {
        let mut mesh = unit_quad();
        for vertex in &mut mesh.vertices {
            vertex.tex_coord = [0.5, 0.5];
        }
        mesh.compute_tangents();

        assert_eq!(mesh.vertices[0].tangent, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].bitangent, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate() {
        assert!(unit_quad().validate().is_ok());

        let mut broken = unit_quad();
        broken.indices.push(9);
        assert_eq!(broken.validate(), Err(MeshError::PartialTriangle(7)));

        broken.indices.extend([1, 2]);
        assert_eq!(
            broken.validate(),
            Err(MeshError::IndexOutOfRange { index: 9, vertex_count: 4 })
        );
    }

    #[test]
    fn test_sampler_names_number_per_kind() {
        let names = sampler_names([
            TextureKind::Diffuse,
            TextureKind::Specular,
            TextureKind::Diffuse,
            TextureKind::Normal,
            TextureKind::Height,
        ]);
        assert_eq!(
            names,
            vec![
                "texture_diffuse1",
                "texture_specular1",
                "texture_diffuse2",
                "texture_normal1",
                "texture_height1",
            ]
        );
    }
}
