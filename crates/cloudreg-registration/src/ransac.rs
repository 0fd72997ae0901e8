use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cloudreg_3d::feature::Feature;
use cloudreg_3d::kdtree::KdTree;
use cloudreg_3d::ops::squared_distance;
use cloudreg_3d::pointcloud::PointCloud;
use cloudreg_3d::transforms::identity_transform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::checker::CorrespondenceChecker;
use crate::error::RegistrationError;
use crate::estimation::TransformationEstimation;
use crate::registration::get_registration_result_and_correspondences;
use crate::result::{RansacConvergenceCriteria, RegistrationResult};

fn make_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Score a trial transform against the putative correspondence set only.
///
/// `source` has already been transformed; the fitness denominator is the
/// putative set size, not the source size.
fn evaluate_ransac_based_on_correspondence(
    source: &PointCloud,
    target: &PointCloud,
    corres: &[(usize, usize)],
    max_correspondence_distance: f64,
    transformation: [[f64; 4]; 4],
) -> RegistrationResult {
    let mut result = RegistrationResult::with_transformation(transformation);
    let max_distance2 = max_correspondence_distance * max_correspondence_distance;
    let mut error2 = 0.0f64;
    for &(i, j) in corres {
        let distance2 = squared_distance(&source.points()[i], &target.points()[j]);
        if distance2 < max_distance2 {
            result.correspondence_set.push((i, j));
            error2 += distance2;
        }
    }
    if !result.correspondence_set.is_empty() {
        let good = result.correspondence_set.len();
        result.fitness = good as f64 / corres.len() as f64;
        result.inlier_rmse = (error2 / good as f64).sqrt();
    }
    result
}

/// Robust alignment from a known putative correspondence set.
///
/// Repeatedly samples `ransac_n` correspondences with replacement, fits a
/// transform with `estimation`, scores it against the whole putative set,
/// and keeps the lexicographically best `(fitness, -rmse)` trial. The
/// trial budget is `min(max_iteration, max_validation)`: for this driver
/// every trial is validated, so the two bounds collapse into one.
///
/// `ransac_n < 3`, fewer putative correspondences than `ransac_n`, or a
/// non-positive `max_correspondence_distance` yield the default result.
/// The conventional sample size is 6.
pub fn registration_ransac_based_on_correspondence(
    source: &PointCloud,
    target: &PointCloud,
    corres: &[(usize, usize)],
    max_correspondence_distance: f64,
    estimation: &dyn TransformationEstimation,
    ransac_n: usize,
    criteria: &RansacConvergenceCriteria,
) -> Result<RegistrationResult, RegistrationError> {
    if ransac_n < 3 || corres.len() < ransac_n || max_correspondence_distance <= 0.0 {
        return Ok(RegistrationResult::default());
    }

    let mut rng = make_rng(criteria.seed, 0);
    let mut sample = vec![(0usize, 0usize); ransac_n];
    let mut result = RegistrationResult::default();
    for _ in 0..criteria.max_iteration.min(criteria.max_validation) {
        for slot in sample.iter_mut() {
            *slot = corres[rng.gen_range(0..corres.len())];
        }
        let transformation = estimation.compute_transformation(source, target, &sample)?;
        let mut pcd = source.clone();
        pcd.transform(&transformation);
        let this_result = evaluate_ransac_based_on_correspondence(
            &pcd,
            target,
            corres,
            max_correspondence_distance,
            transformation,
        );
        if this_result.is_better_than(&result) {
            result = this_result;
        }
    }
    log::debug!(
        "RANSAC on correspondences: fitness {:.4}, inlier rmse {:.4}",
        result.fitness,
        result.inlier_rmse
    );
    Ok(result)
}

/// Robust global alignment from per-point feature descriptors.
///
/// Workers draw `ransac_n` source indices, match each to its feature-space
/// nearest target point, and run the sample through two checker phases:
/// checkers not requiring alignment fire before the estimator (with a
/// placeholder transform), the rest fire after it. Surviving trials are
/// scored against the target KD-tree and counted towards a global
/// validation budget; once `max_validation` trials have been scored, a
/// latch stops all remaining work. Each worker keeps a private incumbent;
/// the final result is reduced across workers with the lexicographic
/// `(fitness, -rmse)` comparator.
///
/// A sampled descriptor with no feature-space neighbour falls back to
/// target index 0 (logged at debug level); that degenerate pairing is a
/// deliberate bias, and callers who care should pair this driver with a
/// distance checker.
///
/// `ransac_n < 3`, a non-positive `max_correspondence_distance`, or an
/// empty source yield the default result. The conventional sample size
/// is 4. With `criteria.seed` set, the outcome is reproducible for a
/// fixed worker count (pin the rayon pool to one thread for run-to-run
/// determinism).
pub fn registration_ransac_based_on_feature_matching<const D: usize>(
    source: &PointCloud,
    target: &PointCloud,
    source_feature: &Feature<D>,
    target_feature: &Feature<D>,
    max_correspondence_distance: f64,
    estimation: &dyn TransformationEstimation,
    ransac_n: usize,
    checkers: &[&dyn CorrespondenceChecker],
    criteria: &RansacConvergenceCriteria,
) -> Result<RegistrationResult, RegistrationError> {
    if ransac_n < 3 || max_correspondence_distance <= 0.0 || source.is_empty() {
        return Ok(RegistrationResult::default());
    }

    let kdtree = KdTree::from_points(target.points());
    let kdtree_feature = KdTree::from_points(target_feature.data());

    let total_validation = AtomicUsize::new(0);
    let finished = AtomicBool::new(false);
    let num_workers = rayon::current_num_threads().max(1);
    let placeholder = identity_transform();

    let worker_results = (0..num_workers)
        .into_par_iter()
        .map(|worker| {
            let mut rng = make_rng(criteria.seed, worker);
            let mut sample = vec![(0usize, 0usize); ransac_n];
            let mut result_private = RegistrationResult::default();

            'trials: for _ in (worker..criteria.max_iteration).step_by(num_workers) {
                if finished.load(Ordering::SeqCst) {
                    continue;
                }

                for slot in sample.iter_mut() {
                    let i = rng.gen_range(0..source.len());
                    let j = match kdtree_feature.search_knn(source_feature.col(i), 1).first() {
                        Some(&(index, _)) => index,
                        None => {
                            log::debug!("found a feature without neighbours, using target index 0");
                            0
                        }
                    };
                    *slot = (i, j);
                }

                for checker in checkers {
                    if !checker.requires_pointcloud_alignment()
                        && !checker.check(source, target, &sample, &placeholder)
                    {
                        continue 'trials;
                    }
                }
                let transformation = estimation.compute_transformation(source, target, &sample)?;
                for checker in checkers {
                    if checker.requires_pointcloud_alignment()
                        && !checker.check(source, target, &sample, &transformation)
                    {
                        continue 'trials;
                    }
                }

                let mut pcd = source.clone();
                pcd.transform(&transformation);
                let this_result = get_registration_result_and_correspondences(
                    &pcd,
                    target,
                    &kdtree,
                    max_correspondence_distance,
                    transformation,
                );
                if this_result.is_better_than(&result_private) {
                    result_private = this_result;
                }

                let validated = total_validation.fetch_add(1, Ordering::SeqCst) + 1;
                if validated >= criteria.max_validation {
                    finished.store(true, Ordering::SeqCst);
                }
            }
            Ok(result_private)
        })
        .collect::<Result<Vec<_>, RegistrationError>>()?;

    let mut result = RegistrationResult::default();
    for candidate in worker_results {
        if candidate.is_better_than(&result) {
            result = candidate;
        }
    }
    log::debug!(
        "RANSAC on feature matching: fitness {:.4}, inlier rmse {:.4}",
        result.fitness,
        result.inlier_rmse
    );
    Ok(result)
}
