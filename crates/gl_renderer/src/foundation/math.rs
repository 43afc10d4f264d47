//! Math utilities and types
//!
//! Provides the nalgebra aliases used throughout the renderer plus the
//! OpenGL-convention matrix builders (right-handed view space, clip depth in
//! [-1, 1]).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type (column-major storage)
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Length of each of the first three basis columns of an affine matrix.
    ///
    /// For a matrix built as `T * S * R` with a pure rotation `R` this is the
    /// per-axis scale factor.
    pub fn column_scales(matrix: &Mat4) -> Vec3 {
        Vec3::new(
            Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude(),
            Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude(),
            Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude(),
        )
    }

    /// Translation part of an affine matrix
    pub fn translation_of(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }
}

/// Extension trait for Mat4 with the builders the renderer needs
///
/// The post-multiplying helpers (`translated`, `scaled`, `rotated`) mirror the
/// classic fixed-function style: `m.translated(t)` returns `m * T(t)`, so a
/// chain applied to the identity yields `T * S * R` in reading order.
pub trait Mat4Ext {
    /// Create an OpenGL perspective projection matrix (right-handed, depth -1..1)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Return `self * translation(offset)`
    fn translated(&self, offset: Vec3) -> Mat4;

    /// Return `self * uniform_scale(factor)`
    fn scaled(&self, factor: f32) -> Mat4;

    /// Return `self * rotation(angle, axis)`
    ///
    /// `angle` is in radians. The axis is normalized before use, so any
    /// non-zero vector describes a pure rotation.
    fn rotated(&self, angle: f32, axis: Vec3) -> Mat4;

    /// Column-major float columns, the layout OpenGL expects
    fn to_columns(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // P = [1/(a·tan(φ/2))  0            0               0            ]
        //     [0               1/tan(φ/2)   0               0            ]
        //     [0               0            -(f+n)/(f-n)    -2fn/(f-n)   ]
        //     [0               0            -1              0            ]
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,  // Negative forward for right-handed
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn translated(&self, offset: Vec3) -> Mat4 {
        self * Mat4::new_translation(&offset)
    }

    fn scaled(&self, factor: f32) -> Mat4 {
        self * Mat4::new_scaling(factor)
    }

    fn rotated(&self, angle: f32, axis: Vec3) -> Mat4 {
        self * Mat4::from_axis_angle(&Unit::new_normalize(axis), angle)
    }

    fn to_columns(&self) -> [[f32; 4]; 4] {
        (*self).into()
    }
}
