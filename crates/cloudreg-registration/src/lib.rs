#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Cloudreg Registration
//!
//! Aligns a *source* point cloud to a *target* point cloud by computing a
//! rigid (or similarity) 4×4 homogeneous transform. Three drivers share
//! one supporting machinery:
//!
//! 1. [`registration_icp`] — local refinement from an initial guess.
//! 2. [`registration_ransac_based_on_correspondence`] — robust fit from a
//!    known putative correspondence set.
//! 3. [`registration_ransac_based_on_feature_matching`] — robust global
//!    alignment from per-point feature descriptors.
//!
//! [`evaluate_registration`] scores an alignment without changing it, and
//! [`information_matrix_from_registration_result`] summarises the
//! geometric sensitivity of a finished alignment for pose-graph backends.
//!
//! Transformation estimators ([`TransformationEstimation`]) and trial
//! filters ([`CorrespondenceChecker`]) are injectable strategies; the
//! drivers never inspect concrete types.
//!
//! # Example
//!
//! ```
//! use cloudreg_3d::pointcloud::PointCloud;
//! use cloudreg_3d::transforms::identity_transform;
//! use cloudreg_registration::evaluate_registration;
//!
//! let cloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], None, None);
//! let result = evaluate_registration(&cloud, &cloud, 0.01, &identity_transform());
//! assert_eq!(result.fitness, 1.0);
//! ```

mod checker;
pub use checker::*;

mod error;
pub use error::*;

mod estimation;
pub use estimation::*;

mod information;
pub use information::*;

mod ransac;
pub use ransac::*;

mod registration;
pub use registration::*;

mod result;
pub use result::*;
