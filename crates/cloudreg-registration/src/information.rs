use cloudreg_3d::pointcloud::PointCloud;
use rayon::prelude::*;

use crate::result::RegistrationResult;

fn add6(mut left: [[f64; 6]; 6], right: [[f64; 6]; 6]) -> [[f64; 6]; 6] {
    for (left_row, right_row) in left.iter_mut().zip(right.iter()) {
        for (l, r) in left_row.iter_mut().zip(right_row.iter()) {
            *l += r;
        }
    }
    left
}

/// Build the 6×6 Gauss-Newton information matrix of a finished alignment.
///
/// Every matched target point `(x, y, z)` contributes three rank-1
/// updates built from
///
/// ```text
/// g1 = (1, 0, 0,   0,  2z, -2y)
/// g2 = (0, 1, 0, -2z,   0,  2x)
/// g3 = (0, 0, 1,  2y, -2x,   0)
/// ```
///
/// summed on top of a single identity prior, which keeps the matrix well
/// conditioned even for a handful of correspondences. The output is
/// symmetric positive definite and approximates the inverse covariance
/// of the estimated pose, as consumed by pose-graph backends.
///
/// Only target geometry enters the matrix; the source cloud is accepted
/// for signature symmetry with the drivers.
pub fn information_matrix_from_registration_result(
    _source: &PointCloud,
    target: &PointCloud,
    result: &RegistrationResult,
) -> [[f64; 6]; 6] {
    let accumulated = result
        .correspondence_set
        .par_iter()
        .fold(
            || [[0.0f64; 6]; 6],
            |mut gtg, &(_, t)| {
                let [x, y, z] = target.points()[t];
                let rows = [
                    [1.0, 0.0, 0.0, 0.0, 2.0 * z, -2.0 * y],
                    [0.0, 1.0, 0.0, -2.0 * z, 0.0, 2.0 * x],
                    [0.0, 0.0, 1.0, 2.0 * y, -2.0 * x, 0.0],
                ];
                for g in &rows {
                    for r in 0..6 {
                        for c in 0..6 {
                            gtg[r][c] += g[r] * g[c];
                        }
                    }
                }
                gtg
            },
        )
        .reduce(|| [[0.0f64; 6]; 6], add6);

    let mut gtg = accumulated;
    for d in 0..6 {
        gtg[d][d] += 1.0;
    }
    gtg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate_registration;
    use approx::assert_relative_eq;
    use cloudreg_3d::transforms::identity_transform;

    #[test]
    fn test_information_matrix_hand_computed() {
        let target = PointCloud::new(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, None);
        let source = target.clone();
        let mut result = RegistrationResult::default();
        result.correspondence_set = vec![(0, 0), (1, 1)];

        let gtg = information_matrix_from_registration_result(&source, &target, &result);
        let expected = [
            [3.0, 0.0, 0.0, 0.0, 0.0, -2.0],
            [0.0, 3.0, 0.0, 0.0, 0.0, 2.0],
            [0.0, 0.0, 3.0, 2.0, -2.0, 0.0],
            [0.0, 0.0, 2.0, 5.0, 0.0, 0.0],
            [0.0, 0.0, -2.0, 0.0, 5.0, 0.0],
            [-2.0, 2.0, 0.0, 0.0, 0.0, 9.0],
        ];
        for r in 0..6 {
            for c in 0..6 {
                assert_relative_eq!(gtg[r][c], expected[r][c], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_information_matrix_empty_result_is_identity() {
        let cloud = PointCloud::new(vec![[0.0, 0.0, 0.0]], None, None);
        let gtg = information_matrix_from_registration_result(
            &cloud,
            &cloud,
            &RegistrationResult::default(),
        );
        for r in 0..6 {
            for c in 0..6 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(gtg[r][c], expected);
            }
        }
    }

    #[test]
    fn test_information_matrix_symmetric_positive_definite() {
        let points: Vec<[f64; 3]> = (0..20)
            .map(|i| {
                let t = i as f64 * 0.37;
                [t.sin(), t.cos(), 0.1 * t]
            })
            .collect();
        let cloud = PointCloud::new(points, None, None);
        let result = evaluate_registration(&cloud, &cloud, 0.01, &identity_transform());
        let gtg = information_matrix_from_registration_result(&cloud, &cloud, &result);

        for r in 0..6 {
            for c in 0..6 {
                assert_relative_eq!(gtg[r][c], gtg[c][r], epsilon = 1e-9);
            }
        }
        let mut mat = faer::Mat::<f64>::zeros(6, 6);
        for r in 0..6 {
            for c in 0..6 {
                mat.write(r, c, gtg[r][c]);
            }
        }
        assert!(mat.cholesky(faer::Side::Lower).is_ok());
    }
}
