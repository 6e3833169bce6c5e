use bytemuck::{Pod, Zeroable};

use crate::math::{Mat4, Quat, Vec3};

/// 3D Transform of the loaded model
/// Represents position, rotation and scale in 3D space
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Create an identity transform (no translation, rotation, or scale)
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Replace the rotation with one around the vertical (Y) axis
    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle);
    }

    /// Convert to a 4x4 transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// GPU用モデル行列Uniform
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn identity() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            model: matrix.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    fn translated(position: Vec3) -> Transform {
        Transform {
            position,
            ..Transform::identity()
        }
    }

    #[test]
    fn test_to_matrix_translation() {
        let t = translated(Vec3::new(1.0, 2.0, 3.0));
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.to_matrix(), expected);
    }

    #[test]
    fn test_rotation_y_is_applied_before_translation() {
        let mut t = translated(Vec3::new(0.0, 0.0, -1.0));
        t.set_rotation_y(std::f32::consts::FRAC_PI_2);
        // +X rotated a quarter turn about Y lands on -Z, then translated
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_model_uniform_size() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
        let u = ModelUniform::identity();
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
        let t = translated(Vec3::X);
        assert_eq!(ModelUniform::from_matrix(t.to_matrix()).model[3], [1.0, 0.0, 0.0, 1.0]);
    }
}
