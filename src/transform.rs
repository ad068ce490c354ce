use glam::{Mat4, Vec3};

/// Position, euler rotation (degrees) and scale of one drawable.
///
/// The model matrix is recomputed on demand; with a handful of transforms in
/// the scene there is nothing to win by caching it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model matrix composed as translate * rotate (Z, then Y, then X) *
    /// scale.
    pub fn model_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_rotation_z(self.rotation_degrees.z.to_radians())
            * Mat4::from_rotation_y(self.rotation_degrees.y.to_radians())
            * Mat4::from_rotation_x(self.rotation_degrees.x.to_radians());
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_by_default() {
        let transform = Transform::default();
        let m = transform.model_matrix().to_cols_array();
        let i = Mat4::IDENTITY.to_cols_array();
        for (a, b) in m.iter().zip(i.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn translation_applies_after_scale() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::splat(2.0),
            ..Transform::default()
        };
        let point = transform.model_matrix().transform_point3(Vec3::ONE);
        assert!((point - Vec3::new(3.0, 4.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_order_is_z_then_y_then_x() {
        let transform = Transform {
            rotation_degrees: Vec3::new(90.0, 90.0, 0.0),
            ..Transform::default()
        };
        // Rz is identity here, so the result must equal Ry(90) * Rx(90).
        let expected = Mat4::from_rotation_y(90f32.to_radians())
            * Mat4::from_rotation_x(90f32.to_radians());
        let actual = transform.model_matrix();
        for (a, b) in actual
            .to_cols_array()
            .iter()
            .zip(expected.to_cols_array().iter())
        {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
