use cloudreg_3d::ops::{dot3, euclidean_distance};
use cloudreg_3d::pointcloud::PointCloud;
use cloudreg_3d::transforms::{rotate_vector3, transform_point3};

/// Fast rejection of a sampled correspondence set before it is scored.
///
/// Checkers come in two flavours, partitioned by
/// [`requires_pointcloud_alignment`](CorrespondenceChecker::requires_pointcloud_alignment):
/// cheap ones run *before* the estimator on raw geometry (the transform
/// argument is then a placeholder), expensive ones run after it and may
/// use the computed transform. The RANSAC driver dispatches on the flag,
/// never on concrete types.
pub trait CorrespondenceChecker: Send + Sync {
    /// Whether [`check`](CorrespondenceChecker::check) needs a meaningful
    /// transform.
    fn requires_pointcloud_alignment(&self) -> bool;

    /// Return `false` to abandon the trial.
    fn check(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
        transformation: &[[f64; 4]; 4],
    ) -> bool;
}

/// Rejects samples whose intra-set edge lengths disagree between clouds.
///
/// For every pair of sampled correspondences, both `‖sᵢ−sⱼ‖ ≥
/// τ·‖tᵢ−tⱼ‖` and `‖tᵢ−tⱼ‖ ≥ τ·‖sᵢ−sⱼ‖` must hold. Runs before the
/// estimator: a rigid transform cannot change edge lengths, so a
/// mismatch dooms the sample regardless of alignment.
#[derive(Debug, Clone)]
pub struct CorrespondenceCheckerBasedOnEdgeLength {
    /// Lower bound on the mutual edge-length ratio, in `(0, 1]`.
    pub similarity_threshold: f64,
}

impl Default for CorrespondenceCheckerBasedOnEdgeLength {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
        }
    }
}

impl CorrespondenceChecker for CorrespondenceCheckerBasedOnEdgeLength {
    fn requires_pointcloud_alignment(&self) -> bool {
        false
    }

    fn check(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
        _transformation: &[[f64; 4]; 4],
    ) -> bool {
        for (idx, &(si, ti)) in corres.iter().enumerate() {
            for &(sj, tj) in corres.iter().take(idx) {
                let source_edge = euclidean_distance(&source.points()[si], &source.points()[sj]);
                let target_edge = euclidean_distance(&target.points()[ti], &target.points()[tj]);
                if source_edge < self.similarity_threshold * target_edge
                    || target_edge < self.similarity_threshold * source_edge
                {
                    return false;
                }
            }
        }
        true
    }
}

/// Rejects samples whose aligned correspondences sit too far apart.
#[derive(Debug, Clone)]
pub struct CorrespondenceCheckerBasedOnDistance {
    /// Maximum allowed distance between a transformed source point and
    /// its matched target point.
    pub distance_threshold: f64,
}

impl CorrespondenceChecker for CorrespondenceCheckerBasedOnDistance {
    fn requires_pointcloud_alignment(&self) -> bool {
        true
    }

    fn check(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
        transformation: &[[f64; 4]; 4],
    ) -> bool {
        corres.iter().all(|&(i, j)| {
            let moved = transform_point3(transformation, &source.points()[i]);
            euclidean_distance(&moved, &target.points()[j]) <= self.distance_threshold
        })
    }
}

/// Rejects samples whose aligned normals disagree in direction.
///
/// Compares the rotated source normal against the target normal per
/// correspondence; the angle between them must stay at or below the
/// threshold. Vacuously passes (with a warning) when either cloud
/// carries no normals, since a checker must never abort a driver.
#[derive(Debug, Clone)]
pub struct CorrespondenceCheckerBasedOnNormal {
    /// Maximum allowed angle between matched normals, in radians.
    pub normal_angle_threshold: f64,
}

impl CorrespondenceChecker for CorrespondenceCheckerBasedOnNormal {
    fn requires_pointcloud_alignment(&self) -> bool {
        true
    }

    fn check(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
        transformation: &[[f64; 4]; 4],
    ) -> bool {
        let (Some(source_normals), Some(target_normals)) = (source.normals(), target.normals())
        else {
            log::warn!("normal checker skipped: point clouds carry no normals");
            return true;
        };
        let cos_threshold = self.normal_angle_threshold.cos();
        corres.iter().all(|&(i, j)| {
            let rotated = rotate_vector3(transformation, &source_normals[i]);
            dot3(&rotated, &target_normals[j]) >= cos_threshold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudreg_3d::transforms::{identity_transform, rt_to_transform};

    const IDENTITY3: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    #[test]
    fn test_edge_length_checker() {
        let source = PointCloud::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], None, None);
        let same_scale = PointCloud::new(vec![[5.0, 0.0, 0.0], [6.0, 0.0, 0.0]], None, None);
        let stretched = PointCloud::new(vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]], None, None);

        let checker = CorrespondenceCheckerBasedOnEdgeLength::default();
        assert!(!checker.requires_pointcloud_alignment());
        let corres = vec![(0, 0), (1, 1)];
        let placeholder = identity_transform();
        assert!(checker.check(&source, &same_scale, &corres, &placeholder));
        assert!(!checker.check(&source, &stretched, &corres, &placeholder));
    }

    #[test]
    fn test_distance_checker() {
        let source = PointCloud::new(vec![[0.0, 0.0, 0.0]], None, None);
        let target = PointCloud::new(vec![[1.0, 0.0, 0.0]], None, None);
        let checker = CorrespondenceCheckerBasedOnDistance {
            distance_threshold: 0.1,
        };
        assert!(checker.requires_pointcloud_alignment());

        let corres = vec![(0, 0)];
        assert!(!checker.check(&source, &target, &corres, &identity_transform()));
        let aligned = rt_to_transform(&IDENTITY3, &[1.0, 0.0, 0.0]);
        assert!(checker.check(&source, &target, &corres, &aligned));
    }

    #[test]
    fn test_normal_checker() {
        let source = PointCloud::new(
            vec![[0.0, 0.0, 0.0]],
            None,
            Some(vec![[1.0, 0.0, 0.0]]),
        );
        let target_aligned = PointCloud::new(
            vec![[0.0, 0.0, 0.0]],
            None,
            Some(vec![[1.0, 0.0, 0.0]]),
        );
        let target_flipped = PointCloud::new(
            vec![[0.0, 0.0, 0.0]],
            None,
            Some(vec![[0.0, 1.0, 0.0]]),
        );

        let checker = CorrespondenceCheckerBasedOnNormal {
            normal_angle_threshold: 0.3,
        };
        let corres = vec![(0, 0)];
        let identity = identity_transform();
        assert!(checker.check(&source, &target_aligned, &corres, &identity));
        assert!(!checker.check(&source, &target_flipped, &corres, &identity));
    }

    #[test]
    fn test_normal_checker_passes_without_normals() {
        let bare = PointCloud::new(vec![[0.0, 0.0, 0.0]], None, None);
        let checker = CorrespondenceCheckerBasedOnNormal {
            normal_angle_threshold: 0.1,
        };
        assert!(checker.check(&bare, &bare, &[(0, 0)], &identity_transform()));
    }
}
