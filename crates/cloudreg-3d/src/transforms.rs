/// Compute the rotation matrix from an axis and angle.
///
/// The axis is normalized internally; a zero axis is rejected.
///
/// Example:
///
/// ```
/// use cloudreg_3d::transforms::axis_angle_to_rotation_matrix;
///
/// let rotation = axis_angle_to_rotation_matrix(&[0.0, 0.0, 1.0], 0.0).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn axis_angle_to_rotation_matrix(
    axis: &[f64; 3],
    angle: f64,
) -> Result<[[f64; 3]; 3], &'static str> {
    let magnitude = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if magnitude < 1e-10 {
        return Err("cannot compute rotation matrix from a zero vector");
    }
    let (x, y, z) = (axis[0] / magnitude, axis[1] / magnitude, axis[2] / magnitude);

    // Rodrigues: R = I + sin(a) K + (1 - cos(a)) K^2 with K the skew of the axis
    let skew = [[0.0, -z, y], [z, 0.0, -x], [-y, x, 0.0]];
    let skew2 = mat3_mul(&skew, &skew);
    let (s, c) = angle.sin_cos();

    let mut rotation = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let id = if i == j { 1.0 } else { 0.0 };
            rotation[i][j] = id + s * skew[i][j] + (1.0 - c) * skew2[i][j];
        }
    }
    Ok(rotation)
}

/// Compute the rotation matrix `Rz(rz) · Ry(ry) · Rx(rx)`.
///
/// This is the small-angle update convention used by point-to-plane
/// style solvers: the solved angle triple `(rx, ry, rz)` maps back to a
/// full rotation by composing the axis rotations z-y-x.
pub fn euler_zyx_to_rotation_matrix(rx: f64, ry: f64, rz: f64) -> [[f64; 3]; 3] {
    let (sx, cx) = rx.sin_cos();
    let (sy, cy) = ry.sin_cos();
    let (sz, cz) = rz.sin_cos();
    [
        [cz * cy, cz * sy * sx - sz * cx, cz * sy * cx + sz * sx],
        [sz * cy, sz * sy * sx + cz * cx, sz * sy * cx - cz * sx],
        [-sy, cy * sx, cy * cx],
    ]
}

/// The 4×4 identity transform.
pub fn identity_transform() -> [[f64; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Check whether a transform equals the identity exactly.
pub fn is_identity_transform(transformation: &[[f64; 4]; 4]) -> bool {
    *transformation == identity_transform()
}

/// Compose two homogeneous transforms as `a · b` (apply `b` first).
pub fn compose_transforms(a: &[[f64; 4]; 4], b: &[[f64; 4]; 4]) -> [[f64; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let mut acc = 0.0;
            for (k, b_row) in b.iter().enumerate() {
                acc += a[i][k] * b_row[j];
            }
            out[i][j] = acc;
        }
    }
    out
}

/// Assemble a homogeneous transform from a rotation and a translation.
pub fn rt_to_transform(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> [[f64; 4]; 4] {
    let mut out = identity_transform();
    for i in 0..3 {
        out[i][..3].copy_from_slice(&rotation[i]);
        out[i][3] = translation[i];
    }
    out
}

/// Split a homogeneous transform into its rotation block and translation.
pub fn transform_to_rt(transformation: &[[f64; 4]; 4]) -> ([[f64; 3]; 3], [f64; 3]) {
    let mut rotation = [[0.0; 3]; 3];
    let mut translation = [0.0; 3];
    for i in 0..3 {
        rotation[i].copy_from_slice(&transformation[i][..3]);
        translation[i] = transformation[i][3];
    }
    (rotation, translation)
}

/// Apply a homogeneous transform to a point (`w = 1`).
#[inline]
pub fn transform_point3(transformation: &[[f64; 4]; 4], point: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, row) in transformation.iter().take(3).enumerate() {
        out[i] = row[0] * point[0] + row[1] * point[1] + row[2] * point[2] + row[3];
    }
    out
}

/// Apply only the rotation block of a homogeneous transform to a vector.
///
/// Used for directions (normals), which must not pick up the translation.
#[inline]
pub fn rotate_vector3(transformation: &[[f64; 4]; 4], vector: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, row) in transformation.iter().take(3).enumerate() {
        out[i] = row[0] * vector[0] + row[1] * vector[1] + row[2] * vector[2];
    }
    out
}

fn mat3_mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let mut acc = 0.0;
            for (k, b_row) in b.iter().enumerate() {
                acc += a[i][k] * b_row[j];
            }
            out[i][j] = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_angle_quarter_turn() -> Result<(), &'static str> {
        let rotation = axis_angle_to_rotation_matrix(&[1.0, 0.0, 0.0], std::f64::consts::PI / 2.0)?;
        let expected = [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rotation[i][j], expected[i][j], epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_axis_angle_rejects_zero_axis() {
        assert!(axis_angle_to_rotation_matrix(&[0.0, 0.0, 0.0], 1.0).is_err());
    }

    #[test]
    fn test_euler_zyx_matches_axis_composition() -> Result<(), &'static str> {
        let (rx, ry, rz) = (0.1, -0.2, 0.3);
        let composed = mat3_mul(
            &axis_angle_to_rotation_matrix(&[0.0, 0.0, 1.0], rz)?,
            &mat3_mul(
                &axis_angle_to_rotation_matrix(&[0.0, 1.0, 0.0], ry)?,
                &axis_angle_to_rotation_matrix(&[1.0, 0.0, 0.0], rx)?,
            ),
        );
        let euler = euler_zyx_to_rotation_matrix(rx, ry, rz);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(euler[i][j], composed[i][j], epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let shift_x = rt_to_transform(&rotation, &[1.0, 0.0, 0.0]);
        let shift_y = rt_to_transform(&rotation, &[0.0, 2.0, 0.0]);
        let combined = compose_transforms(&shift_y, &shift_x);
        assert_eq!(transform_point3(&combined, &[0.0, 0.0, 0.0]), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_identity_roundtrip() {
        let identity = identity_transform();
        assert!(is_identity_transform(&identity));
        let (rotation, translation) = transform_to_rt(&identity);
        assert_eq!(rt_to_transform(&rotation, &translation), identity);
        assert_eq!(transform_point3(&identity, &[1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }
}
