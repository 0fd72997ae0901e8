use cloudreg_3d::pointcloud::PointCloud;
use cloudreg_3d::transforms::{euler_zyx_to_rotation_matrix, identity_transform, rt_to_transform};

use crate::error::RegistrationError;

/// Identifying tag for a transformation estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationEstimationType {
    /// Least-squares fit over point pairs (Umeyama / Kabsch).
    PointToPoint,
    /// Least-squares fit over point-to-plane residuals, needs target normals.
    PointToPlane,
}

/// Strategy computing a best-fit 4×4 transform from a correspondence set.
///
/// Estimators are injected into the drivers and must be shareable across
/// RANSAC workers. Degenerate correspondence sets must not panic: they
/// yield an identity (or near-identity) transform whose low-fitness trial
/// the RANSAC comparator rejects naturally.
pub trait TransformationEstimation: Send + Sync {
    /// The tag identifying this estimator.
    fn estimation_type(&self) -> TransformationEstimationType;

    /// Compute the transform aligning `source[i]` onto `target[j]` for the
    /// given `(i, j)` correspondences.
    fn compute_transformation(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
    ) -> Result<[[f64; 4]; 4], RegistrationError>;
}

/// Point-to-point estimation, optionally solving for a uniform scale.
///
/// Implements the Umeyama closed-form fit: SVD of the de-meaned
/// cross-covariance, with the usual determinant-sign fix to rule out
/// reflections.
#[derive(Debug, Clone, Default)]
pub struct TransformationEstimationPointToPoint {
    /// Solve for a similarity (rotation + uniform scale) instead of a
    /// rigid transform.
    pub with_scaling: bool,
}

impl TransformationEstimation for TransformationEstimationPointToPoint {
    fn estimation_type(&self) -> TransformationEstimationType {
        TransformationEstimationType::PointToPoint
    }

    fn compute_transformation(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
    ) -> Result<[[f64; 4]; 4], RegistrationError> {
        if corres.is_empty() {
            return Ok(identity_transform());
        }
        let num = corres.len() as f64;

        let mut source_mean = [0.0f64; 3];
        let mut target_mean = [0.0f64; 3];
        for &(i, j) in corres {
            for axis in 0..3 {
                source_mean[axis] += source.points()[i][axis] / num;
                target_mean[axis] += target.points()[j][axis] / num;
            }
        }

        // de-meaned cross-covariance (target rows, source columns) and the
        // source variance needed for the scale estimate
        let mut sigma = faer::Mat::<f64>::zeros(3, 3);
        let mut source_variance = 0.0f64;
        for &(i, j) in corres {
            let mut s = [0.0f64; 3];
            let mut t = [0.0f64; 3];
            for axis in 0..3 {
                s[axis] = source.points()[i][axis] - source_mean[axis];
                t[axis] = target.points()[j][axis] - target_mean[axis];
            }
            for r in 0..3 {
                for c in 0..3 {
                    sigma.write(r, c, sigma.read(r, c) + t[r] * s[c] / num);
                }
            }
            source_variance += (s[0] * s[0] + s[1] * s[1] + s[2] * s[2]) / num;
        }

        let svd = sigma.svd();
        let (u, v) = (svd.u(), svd.v());

        // last singular direction flips when U·V^T would be a reflection
        let sign = if u.determinant() * v.determinant() < 0.0 {
            -1.0
        } else {
            1.0
        };

        let mut rotation = [[0.0f64; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    let flip = if k == 2 { sign } else { 1.0 };
                    acc += u.read(r, k) * flip * v.read(c, k);
                }
                rotation[r][c] = acc;
            }
        }

        let scale = if self.with_scaling && source_variance > 0.0 {
            // tr(D·S) without touching the singular values directly:
            // tr(Σ^T·R) = tr(V·D·S·V^T) = tr(D·S)
            let mut trace_ds = 0.0;
            for r in 0..3 {
                for c in 0..3 {
                    trace_ds += sigma.read(r, c) * rotation[r][c];
                }
            }
            trace_ds / source_variance
        } else {
            1.0
        };

        let mut translation = [0.0f64; 3];
        for r in 0..3 {
            let rotated = rotation[r][0] * source_mean[0]
                + rotation[r][1] * source_mean[1]
                + rotation[r][2] * source_mean[2];
            translation[r] = target_mean[r] - scale * rotated;
            for c in 0..3 {
                rotation[r][c] *= scale;
            }
        }

        Ok(rt_to_transform(&rotation, &translation))
    }
}

/// Point-to-plane estimation.
///
/// Minimises `Σ ((R·s + t - q)·n)²` by one Gauss-Newton step: rows
/// `J = [s × n; n]` and residuals `r = (s - q)·n` accumulate into the
/// 6×6 normal equations, solved by an SVD pseudo-inverse so that
/// rank-deficient configurations (e.g. a single plane constraining only
/// three of the six degrees of freedom) degrade gracefully instead of
/// blowing up.
#[derive(Debug, Clone, Default)]
pub struct TransformationEstimationPointToPlane;

impl TransformationEstimation for TransformationEstimationPointToPlane {
    fn estimation_type(&self) -> TransformationEstimationType {
        TransformationEstimationType::PointToPlane
    }

    fn compute_transformation(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        corres: &[(usize, usize)],
    ) -> Result<[[f64; 4]; 4], RegistrationError> {
        if corres.is_empty() {
            return Ok(identity_transform());
        }
        let Some(target_normals) = target.normals() else {
            return Err(RegistrationError::MissingTargetNormals);
        };

        let mut jtj = [[0.0f64; 6]; 6];
        let mut jtr = [0.0f64; 6];
        for &(i, j) in corres {
            let s = source.points()[i];
            let q = target.points()[j];
            let n = target_normals[j];
            let residual = (s[0] - q[0]) * n[0] + (s[1] - q[1]) * n[1] + (s[2] - q[2]) * n[2];
            let row = [
                s[1] * n[2] - s[2] * n[1],
                s[2] * n[0] - s[0] * n[2],
                s[0] * n[1] - s[1] * n[0],
                n[0],
                n[1],
                n[2],
            ];
            for a in 0..6 {
                for b in 0..6 {
                    jtj[a][b] += row[a] * row[b];
                }
                jtr[a] += row[a] * residual;
            }
        }

        let x = solve_normal_equations(&jtj, &jtr);
        let rotation = euler_zyx_to_rotation_matrix(x[0], x[1], x[2]);
        Ok(rt_to_transform(&rotation, &[x[3], x[4], x[5]]))
    }
}

/// Solve `JᵀJ·x = -Jᵀr` through an SVD pseudo-inverse.
///
/// Singular values below `1e-10 · s_max` are treated as exact zeros, so
/// unobservable degrees of freedom come back as zero updates.
fn solve_normal_equations(jtj: &[[f64; 6]; 6], jtr: &[f64; 6]) -> [f64; 6] {
    let mut system = faer::Mat::<f64>::zeros(6, 6);
    for r in 0..6 {
        for c in 0..6 {
            system.write(r, c, jtj[r][c]);
        }
    }
    let svd = system.svd();
    let (u, singular, v) = (svd.u(), svd.s_diagonal(), svd.v());

    let cutoff = 1e-10 * singular.read(0).max(0.0);
    let mut scaled = [0.0f64; 6];
    for k in 0..6 {
        if singular.read(k) > cutoff && cutoff > 0.0 {
            let mut acc = 0.0;
            for r in 0..6 {
                acc += u.read(r, k) * (-jtr[r]);
            }
            scaled[k] = acc / singular.read(k);
        }
    }
    let mut x = [0.0f64; 6];
    for r in 0..6 {
        for k in 0..6 {
            x[r] += v.read(r, k) * scaled[k];
        }
    }
    x
}
