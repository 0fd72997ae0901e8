use crate::transforms::{rotate_vector3, transform_point3};

/// A point cloud with points, colors, and normals.
///
/// Colors and normals are optional; when present they hold one entry per
/// point. Cloning is cheap enough that callers keep per-worker working
/// copies during registration.
#[derive(Debug, Clone)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[f64; 3]>>,
    // The normals of the points.
    normals: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points, colors (optional), and normals (optional).
    ///
    /// PRECONDITION: colors and normals, when given, have the same length as points.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[f64; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            points,
            colors,
            normals,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[f64; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }

    /// Check whether the cloud carries one normal per point.
    pub fn has_normals(&self) -> bool {
        self.normals
            .as_ref()
            .is_some_and(|normals| normals.len() == self.points.len())
    }

    /// Apply a 4×4 homogeneous transform to the cloud in place.
    ///
    /// Points are treated as homogeneous with `w = 1`; normals are rotated
    /// by the upper-left 3×3 block only.
    pub fn transform(&mut self, transformation: &[[f64; 4]; 4]) {
        for point in self.points.iter_mut() {
            *point = transform_point3(transformation, point);
        }
        if let Some(normals) = self.normals.as_mut() {
            for normal in normals.iter_mut() {
                *normal = rotate_vector3(transformation, normal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::{axis_angle_to_rotation_matrix, rt_to_transform};
    use approx::assert_relative_eq;

    #[test]
    fn test_pointcloud_accessors() {
        let pointcloud = PointCloud::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            Some(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            Some(vec![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
        );

        assert_eq!(pointcloud.len(), 2);
        assert!(!pointcloud.is_empty());
        assert!(pointcloud.has_normals());
        assert_eq!(pointcloud.points()[1], [1.0, 0.0, 0.0]);
        assert_eq!(pointcloud.colors().unwrap().len(), 2);
    }

    #[test]
    fn test_transform_translation() {
        let mut cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]], None, None);
        let identity_rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        cloud.transform(&rt_to_transform(&identity_rotation, &[0.5, -1.0, 2.0]));
        assert_eq!(cloud.points()[0], [1.5, 1.0, 5.0]);
    }

    #[test]
    fn test_transform_rotates_normals_without_translating() -> Result<(), &'static str> {
        let rotation = axis_angle_to_rotation_matrix(&[0.0, 0.0, 1.0], std::f64::consts::PI / 2.0)?;
        let mut cloud = PointCloud::new(
            vec![[1.0, 0.0, 0.0]],
            None,
            Some(vec![[1.0, 0.0, 0.0]]),
        );
        cloud.transform(&rt_to_transform(&rotation, &[10.0, 0.0, 0.0]));

        // point picks up the translation, the normal does not
        let point = cloud.points()[0];
        let normal = cloud.normals().unwrap()[0];
        assert_relative_eq!(point[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(point[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(normal[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal[1], 1.0, epsilon = 1e-12);
        Ok(())
    }
}
