use cloudreg_3d::transforms::identity_transform;

/// An ordered set of `(source_index, target_index)` matches.
///
/// Duplicates are permitted; order carries no meaning beyond iteration.
pub type CorrespondenceSet = Vec<(usize, usize)>;

/// Outcome of a registration driver.
///
/// Invariants maintained by every driver:
/// - `fitness == 0.0` exactly when `correspondence_set` is empty, exactly
///   when `inlier_rmse == 0.0`;
/// - every `(i, j)` in `correspondence_set` is within the driver's
///   correspondence distance threshold under `transformation`;
/// - `transformation` has bottom row `[0, 0, 0, 1]`.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    /// The estimated 4×4 homogeneous transform from source to target.
    pub transformation: [[f64; 4]; 4],
    /// The inlier matches supporting the transform.
    pub correspondence_set: CorrespondenceSet,
    /// Inlier fraction in `[0, 1]`; the denominator depends on the driver
    /// (source size for ICP/feature RANSAC, putative set size for
    /// correspondence RANSAC).
    pub fitness: f64,
    /// Root-mean-square distance over inliers only.
    pub inlier_rmse: f64,
}

impl RegistrationResult {
    /// An empty result wrapping the given transform.
    pub fn with_transformation(transformation: [[f64; 4]; 4]) -> Self {
        Self {
            transformation,
            correspondence_set: CorrespondenceSet::new(),
            fitness: 0.0,
            inlier_rmse: 0.0,
        }
    }

    /// Lexicographic `(fitness, -inlier_rmse)` comparison.
    ///
    /// This is the single tiebreak used for RANSAC incumbent updates and
    /// the final cross-worker reduction: higher fitness wins, equal
    /// fitness falls back to lower RMSE.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.fitness > other.fitness
            || (self.fitness == other.fitness && self.inlier_rmse < other.inlier_rmse)
    }
}

impl Default for RegistrationResult {
    fn default() -> Self {
        Self::with_transformation(identity_transform())
    }
}

/// Convergence criteria for [`crate::registration_icp`].
#[derive(Debug, Clone)]
pub struct ICPConvergenceCriteria {
    /// Stop when the fitness change between iterations drops below this.
    pub relative_fitness: f64,
    /// Stop when the inlier RMSE change between iterations drops below this.
    pub relative_rmse: f64,
    /// Maximum number of ICP iterations to perform.
    pub max_iteration: usize,
}

impl Default for ICPConvergenceCriteria {
    fn default() -> Self {
        Self {
            relative_fitness: 1e-6,
            relative_rmse: 1e-6,
            max_iteration: 30,
        }
    }
}

/// Convergence criteria for the RANSAC drivers.
#[derive(Debug, Clone)]
pub struct RansacConvergenceCriteria {
    /// Bound on the outer trial loop.
    pub max_iteration: usize,
    /// Bound on fully validated (scored) trials across all workers.
    pub max_validation: usize,
    /// Optional fixed seed for reproducible sampling. Each worker mixes
    /// its worker index into the seed, so a fixed seed plus a fixed
    /// worker count reproduces the result exactly.
    pub seed: Option<u64>,
}

impl Default for RansacConvergenceCriteria {
    fn default() -> Self {
        Self {
            max_iteration: 1000,
            max_validation: 1000,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_is_trivial() {
        let result = RegistrationResult::default();
        assert_eq!(result.transformation, identity_transform());
        assert!(result.correspondence_set.is_empty());
        assert_eq!(result.fitness, 0.0);
        assert_eq!(result.inlier_rmse, 0.0);
    }

    #[test]
    fn test_comparator_prefers_fitness_then_rmse() {
        let mut a = RegistrationResult::default();
        let mut b = RegistrationResult::default();

        a.fitness = 0.5;
        a.inlier_rmse = 0.9;
        b.fitness = 0.4;
        b.inlier_rmse = 0.1;
        assert!(a.is_better_than(&b));

        b.fitness = 0.5;
        assert!(b.is_better_than(&a));
        assert!(!a.is_better_than(&a));
    }

    #[test]
    fn test_criteria_defaults() {
        let icp = ICPConvergenceCriteria::default();
        assert_eq!(icp.relative_fitness, 1e-6);
        assert_eq!(icp.relative_rmse, 1e-6);
        assert_eq!(icp.max_iteration, 30);

        let ransac = RansacConvergenceCriteria::default();
        assert_eq!(ransac.max_iteration, 1000);
        assert_eq!(ransac.max_validation, 1000);
        assert!(ransac.seed.is_none());
    }
}
