use thiserror::Error;

/// Error type for linear algebra operations on point buffers.
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Source and destination buffers must have the same length.
    #[error("mismatched point buffer lengths: source {source_len}, destination {dst_len}")]
    MismatchedLengths {
        /// Length of the source buffer.
        source_len: usize,
        /// Length of the destination buffer.
        dst_len: usize,
    },
}

/// Transform a set of points by a rotation and translation, out of place.
///
/// `dst_points` must be pre-allocated with the same length as `src_points`.
/// The rotation is applied through faer matrix views over the raw point
/// buffers, so no per-point allocation happens.
///
/// Example:
///
/// ```
/// use cloudreg_3d::linalg::transform_points3d;
///
/// let src = vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let mut dst = vec![[0.0; 3]; src.len()];
/// transform_points3d(&src, &rotation, &[0.0, 0.0, 1.0], &mut dst).unwrap();
/// assert_eq!(dst[0], [1.0, 0.0, 1.0]);
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), LinalgError> {
    if src_points.len() != dst_points.len() {
        return Err(LinalgError::MismatchedLengths {
            source_len: src_points.len(),
            dst_len: dst_points.len(),
        });
    }
    if src_points.is_empty() {
        return Ok(());
    }

    let rotation_mat = {
        let slice =
            unsafe { std::slice::from_raw_parts(rotation.as_ptr() as *const f64, 9) };
        faer::mat::from_row_major_slice(slice, 3, 3)
    };

    // each point is one row of an N x 3 view over the contiguous buffer
    let src_mat = {
        let slice = unsafe {
            std::slice::from_raw_parts(src_points.as_ptr() as *const f64, src_points.len() * 3)
        };
        faer::mat::from_row_major_slice(slice, src_points.len(), 3)
    };
    let mut dst_mat = {
        let slice = unsafe {
            std::slice::from_raw_parts_mut(
                dst_points.as_mut_ptr() as *mut f64,
                dst_points.len() * 3,
            )
        };
        faer::mat::from_row_major_slice_mut(slice, dst_points.len(), 3)
    };

    // dst = src * R^T, then the translation is folded in row by row
    faer::linalg::matmul::matmul(
        &mut dst_mat,
        src_mat,
        rotation_mat.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    for point in dst_points.iter_mut() {
        point[0] += translation[0];
        point[1] += translation[1];
        point[2] += translation[2];
    }
    Ok(())
}
