//! Instanced rendering via a per-instance matrix attribute stream
//!
//! One GPU buffer holds every instance's model matrix back to back. Each
//! submesh that is drawn instanced gets four extra vertex attributes, one per
//! matrix column, that advance once per instance instead of once per vertex.
//! A single `glDrawElementsInstanced` then draws every copy.
//!
//! # Layout
//!
//! ```text
//! buffer:   | M0 (64 B) | M1 (64 B) | M2 (64 B) | ...
//! M_k:      | col0 16 B | col1 16 B | col2 16 B | col3 16 B |
//! attrib:     loc+0       loc+1       loc+2       loc+3
//!             stride 64, offset = column * 16, divisor 1
//! ```
//!
//! The layout is plain data ([`InstanceStreamLayout`]); the same description
//! drives the GL attribute pointers and the CPU-side [`InstanceStreamLayout::decode`]
//! used to verify uploads, so the two cannot drift apart.

use glow::HasContext;

use crate::foundation::math::{Mat4, Vec4};
use crate::render::{RenderError, RenderResult};

/// One instance matrix exactly as the GPU reads it (column-major, packed)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceMatrix {
    /// Matrix columns
    pub columns: [[f32; 4]; 4],
}

// Safe to implement Pod and Zeroable since it only contains f32 arrays
unsafe impl bytemuck::Pod for InstanceMatrix {}
unsafe impl bytemuck::Zeroable for InstanceMatrix {}

static_assertions::assert_eq_size!(InstanceMatrix, [u8; 64]);

impl From<&Mat4> for InstanceMatrix {
    fn from(matrix: &Mat4) -> Self {
        Self { columns: (*matrix).into() }
    }
}

impl InstanceMatrix {
    /// Back to a math matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from(self.columns)
    }
}

/// Description of one per-instance vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceAttribute {
    /// Attribute location
    pub location: u32,
    /// Float components read
    pub components: i32,
    /// Bytes between consecutive instances
    pub stride: i32,
    /// Byte offset inside one instance
    pub offset: i32,
    /// Instances per attribute advance
    pub divisor: u32,
}

/// Placement of the instance matrix stream in a vertex array's attribute slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStreamLayout {
    first_location: u32,
}

impl InstanceStreamLayout {
    /// Attribute slots per matrix (one per column)
    pub const COLUMNS: u32 = 4;

    /// Bytes per instance
    pub const STRIDE: usize = std::mem::size_of::<InstanceMatrix>();

    /// Bytes per column
    pub const COLUMN_SIZE: usize = std::mem::size_of::<[f32; 4]>();

    /// Stream occupying `first_location .. first_location + 4`
    pub const fn new(first_location: u32) -> Self {
        Self { first_location }
    }

    /// First attribute location
    pub const fn first_location(&self) -> u32 {
        self.first_location
    }

    /// One past the last attribute location, saturating at `u32::MAX`
    pub const fn end_location(&self) -> u32 {
        self.first_location.saturating_add(Self::COLUMNS)
    }

    /// The four column attributes
    pub fn attributes(&self) -> [InstanceAttribute; 4] {
        std::array::from_fn(|column| InstanceAttribute {
            location: self.first_location.saturating_add(column as u32),
            components: 4,
            stride: Self::STRIDE as i32,
            offset: (column * Self::COLUMN_SIZE) as i32,
            divisor: 1,
        })
    }

    /// Check the stream fits beside `vertex_attributes` per-vertex slots and
    /// below the driver limit
    pub fn check_locations(&self, vertex_attributes: u32, max_attributes: u32) -> RenderResult<()> {
        if self.first_location < vertex_attributes {
            return Err(RenderError::AttributeOverlap {
                first_location: self.first_location,
                vertex_attributes,
            });
        }
        if self.end_location() > max_attributes {
            return Err(RenderError::AttributeLimitExceeded {
                required: self.end_location(),
                max: max_attributes,
            });
        }
        Ok(())
    }

    /// Read instance `index` out of a raw stream the way the vertex fetch does
    ///
    /// Every column is fetched at `index * stride + offset`, exactly the
    /// addresses the attribute pointers configured by [`bind_instance_stream`]
    /// make the GPU read.
    pub fn decode(&self, bytes: &[u8], index: usize) -> RenderResult<Mat4> {
        let count = bytes.len() / Self::STRIDE;
        if index >= count {
            return Err(RenderError::InstanceOutOfRange { index, count });
        }

        let columns = self.attributes().map(|attribute| {
            let start = index * attribute.stride as usize + attribute.offset as usize;
            let end = start + attribute.components as usize * std::mem::size_of::<f32>();
            Vec4::from(bytemuck::pod_read_unaligned::<[f32; 4]>(&bytes[start..end]))
        });

        Ok(Mat4::from_columns(&columns))
    }
}

/// Configure the instance stream on one vertex array
///
/// Attribute configuration is vertex-array state, so this runs once per
/// submesh that takes part in instanced drawing. The vertex array is unbound
/// on return.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
pub unsafe fn bind_instance_stream(
    gl: &glow::Context,
    vertex_array: glow::VertexArray,
    instances: &InstanceBuffer,
    layout: &InstanceStreamLayout,
) {
    unsafe {
        gl.bind_vertex_array(Some(vertex_array));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(instances.buffer));

        for attribute in layout.attributes() {
            gl.enable_vertex_attrib_array(attribute.location);
            gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components,
                glow::FLOAT,
                false,
                attribute.stride,
                attribute.offset,
            );
            gl.vertex_attrib_divisor(attribute.location, attribute.divisor);
        }

        gl.bind_vertex_array(None);
    }

    log::trace!(
        "Bound {} instances to locations {}..{}",
        instances.count,
        layout.first_location(),
        layout.end_location()
    );
}

/// GPU buffer holding the instance matrices
#[derive(Debug)]
pub struct InstanceBuffer {
    buffer: glow::Buffer,
    count: usize,
}

impl InstanceBuffer {
    /// Upload all instances once with `STATIC_DRAW` usage
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn upload(gl: &glow::Context, instances: &[InstanceMatrix]) -> RenderResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(instances);
        let buffer = unsafe { crate::render::buffer::create_buffer(gl, glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW) }?;
        unsafe { gl.bind_buffer(glow::ARRAY_BUFFER, None) };

        log::info!(
            "Uploaded {} instance matrices ({:.1} MiB)",
            instances.len(),
            bytes.len() as f64 / (1024.0 * 1024.0)
        );
        Ok(Self { buffer, count: instances.len() })
    }

    /// Number of instances in the buffer
    pub fn count(&self) -> usize {
        self.count
    }

    /// Raw GL handle
    pub fn handle(&self) -> glow::Buffer {
        self.buffer
    }

    /// Fetch instance `index` back from GPU memory through `layout`
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn read_back(&self, gl: &glow::Context, layout: &InstanceStreamLayout, index: usize) -> RenderResult<Mat4> {
        if index >= self.count {
            return Err(RenderError::InstanceOutOfRange { index, count: self.count });
        }

        let mut bytes = [0u8; InstanceStreamLayout::STRIDE];
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            gl.get_buffer_sub_data(glow::ARRAY_BUFFER, (index * InstanceStreamLayout::STRIDE) as i32, &mut bytes);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        layout.decode(&bytes, 0)
    }

    /// Compare the first and last uploaded instance with the source data
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn verify(&self, gl: &glow::Context, layout: &InstanceStreamLayout, instances: &[InstanceMatrix]) -> RenderResult<()> {
        let Some(last) = instances.len().checked_sub(1) else {
            return Ok(());
        };

        for index in [0, last] {
            let gpu = unsafe { self.read_back(gl, layout, index) }?;
            if gpu != instances[index].to_mat4() {
                return Err(RenderError::InstanceReadbackMismatch { index });
            }
        }
        log::debug!("Instance buffer readback matches upload");
        Ok(())
    }

    /// Release the GL buffer
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn delete(self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self.buffer) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn numbered_matrix(seed: f32) -> Mat4 {
        Mat4::from_fn(|row, column| seed * 100.0 + (column * 4 + row) as f32)
    }

    #[test]
    fn test_attribute_layout() {
        let layout = InstanceStreamLayout::new(5);
        let attributes = layout.attributes();

        assert_eq!(InstanceStreamLayout::STRIDE, 64);
        for (column, attribute) in attributes.iter().enumerate() {
            assert_eq!(attribute.location, 5 + column as u32);
            assert_eq!(attribute.components, 4);
            assert_eq!(attribute.stride, 64);
            assert_eq!(attribute.offset, column as i32 * 16);
            assert_eq!(attribute.divisor, 1);
        }
        assert_eq!(layout.end_location(), 9);
    }

    #[test]
    fn test_round_trip_through_attribute_layout() {
        let layout = InstanceStreamLayout::new(3);
        let matrices: Vec<Mat4> = (0..6).map(|i| numbered_matrix(i as f32)).collect();
        let instances: Vec<InstanceMatrix> = matrices.iter().map(InstanceMatrix::from).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&instances);

        for (k, expected) in matrices.iter().enumerate() {
            let decoded = layout.decode(bytes, k).expect("in range");
            assert_eq!(&decoded, expected);
        }
    }

    #[test]
    fn test_translation_lands_in_last_column() {
        let layout = InstanceStreamLayout::new(3);
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let instance = InstanceMatrix::from(&m);

        assert_eq!(instance.columns[3], [1.0, 2.0, 3.0, 1.0]);

        // The fourth attribute starts 48 bytes into the instance
        let bytes = bytemuck::bytes_of(&instance);
        let column: [f32; 4] = bytemuck::pod_read_unaligned(&bytes[48..64]);
        assert_eq!(column, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(layout.decode(bytes, 0).expect("decode"), m);
    }

    #[test]
    fn test_decode_out_of_range() {
        let layout = InstanceStreamLayout::new(3);
        let instances = [InstanceMatrix::from(&Mat4::identity()); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);

        assert!(matches!(
            layout.decode(bytes, 2),
            Err(RenderError::InstanceOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_location_checks() {
        assert!(InstanceStreamLayout::new(5).check_locations(5, 16).is_ok());
        assert!(matches!(
            InstanceStreamLayout::new(3).check_locations(5, 16),
            Err(RenderError::AttributeOverlap { first_location: 3, vertex_attributes: 5 })
        ));
        assert!(matches!(
            InstanceStreamLayout::new(13).check_locations(5, 16),
            Err(RenderError::AttributeLimitExceeded { required: 17, max: 16 })
        ));
    }

    #[test]
    fn test_location_near_u32_max_exceeds_limit() {
        let layout = InstanceStreamLayout::new(u32::MAX - 1);
        assert_eq!(layout.end_location(), u32::MAX);
        assert!(matches!(
            layout.check_locations(5, 16),
            Err(RenderError::AttributeLimitExceeded { required: u32::MAX, max: 16 })
        ));
    }
}
