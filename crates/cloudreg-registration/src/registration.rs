use cloudreg_3d::kdtree::KdTree;
use cloudreg_3d::pointcloud::PointCloud;
use cloudreg_3d::transforms::{compose_transforms, is_identity_transform};
use rayon::prelude::*;

use crate::error::RegistrationError;
use crate::estimation::TransformationEstimation;
use crate::result::{CorrespondenceSet, ICPConvergenceCriteria, RegistrationResult};

/// Score `source` against `target` under an evolving transform.
///
/// `transformation` is recorded verbatim in the output; the caller has
/// already applied it to `source`. Each source point is matched to its
/// nearest target neighbour within `max_correspondence_distance`; workers
/// accumulate private correspondence runs and error sums which are then
/// concatenated and added up.
pub(crate) fn get_registration_result_and_correspondences(
    source: &PointCloud,
    target: &PointCloud,
    target_kdtree: &KdTree<3>,
    max_correspondence_distance: f64,
    transformation: [[f64; 4]; 4],
) -> RegistrationResult {
    let mut result = RegistrationResult::with_transformation(transformation);
    if max_correspondence_distance <= 0.0 {
        return result;
    }

    let (correspondences, error2) = source
        .points()
        .par_iter()
        .enumerate()
        .fold(
            || (CorrespondenceSet::new(), 0.0f64),
            |(mut corres, mut error2), (i, point)| {
                if let Some(&(j, distance2)) = target_kdtree
                    .search_hybrid(point, max_correspondence_distance, 1)
                    .first()
                {
                    corres.push((i, j));
                    error2 += distance2;
                }
                (corres, error2)
            },
        )
        .reduce(
            || (CorrespondenceSet::new(), 0.0f64),
            |(mut left, left_error2), (mut right, right_error2)| {
                left.append(&mut right);
                (left, left_error2 + right_error2)
            },
        );

    if !correspondences.is_empty() {
        let num = correspondences.len();
        result.fitness = num as f64 / source.len() as f64;
        result.inlier_rmse = (error2 / num as f64).sqrt();
        result.correspondence_set = correspondences;
    }
    result
}

/// Evaluate how well `transformation` aligns `source` onto `target`.
///
/// Builds a KD-tree over the target, applies the transform to a working
/// copy of the source, and reports fitness (inlier fraction of the
/// source), inlier RMSE, and the inlier correspondences. A non-positive
/// `max_correspondence_distance` yields a trivial result wrapping the
/// supplied transform.
pub fn evaluate_registration(
    source: &PointCloud,
    target: &PointCloud,
    max_correspondence_distance: f64,
    transformation: &[[f64; 4]; 4],
) -> RegistrationResult {
    let kdtree = KdTree::from_points(target.points());
    let mut pcd = source.clone();
    if !is_identity_transform(transformation) {
        pcd.transform(transformation);
    }
    get_registration_result_and_correspondences(
        &pcd,
        target,
        &kdtree,
        max_correspondence_distance,
        *transformation,
    )
}

/// Iterative closest point refinement of an initial alignment.
///
/// Alternates nearest-neighbour correspondence assignment against a
/// target KD-tree with a least-squares pose update from `estimation`,
/// applying each incremental update to the working cloud in place.
/// Stops when both the fitness change and the RMSE change between
/// consecutive iterations drop below the `criteria` thresholds, or after
/// `criteria.max_iteration` iterations.
///
/// A non-positive `max_correspondence_distance` yields a trivial result
/// wrapping `init`.
pub fn registration_icp(
    source: &PointCloud,
    target: &PointCloud,
    max_correspondence_distance: f64,
    init: &[[f64; 4]; 4],
    estimation: &dyn TransformationEstimation,
    criteria: &ICPConvergenceCriteria,
) -> Result<RegistrationResult, RegistrationError> {
    if max_correspondence_distance <= 0.0 {
        return Ok(RegistrationResult::with_transformation(*init));
    }

    let kdtree = KdTree::from_points(target.points());
    let mut transformation = *init;
    let mut pcd = source.clone();
    if !is_identity_transform(init) {
        pcd.transform(init);
    }

    let mut result = get_registration_result_and_correspondences(
        &pcd,
        target,
        &kdtree,
        max_correspondence_distance,
        transformation,
    );
    for iteration in 0..criteria.max_iteration {
        log::debug!(
            "ICP iteration #{}: fitness {:.4}, inlier rmse {:.4}",
            iteration,
            result.fitness,
            result.inlier_rmse
        );
        let update =
            estimation.compute_transformation(&pcd, target, &result.correspondence_set)?;
        transformation = compose_transforms(&update, &transformation);
        pcd.transform(&update);

        let previous = result;
        result = get_registration_result_and_correspondences(
            &pcd,
            target,
            &kdtree,
            max_correspondence_distance,
            transformation,
        );
        if (previous.fitness - result.fitness).abs() < criteria.relative_fitness
            && (previous.inlier_rmse - result.inlier_rmse).abs() < criteria.relative_rmse
        {
            break;
        }
    }
    Ok(result)
}
