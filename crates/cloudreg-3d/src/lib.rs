#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Cloudreg 3D
//!
//! Geometry primitives shared by the cloudreg registration crates:
//!
//! - **Point clouds** with optional colors and normals, transformable in place
//! - **Feature matrices** holding one fixed-size descriptor per point
//! - **KD-tree search** over points or descriptors (k-NN and radius-capped k-NN)
//! - **Rigid transforms**: rotation builders and 4×4 homogeneous helpers
//!
//! ## Example: transforming a point cloud
//!
//! ```
//! use cloudreg_3d::pointcloud::PointCloud;
//! use cloudreg_3d::transforms::rt_to_transform;
//!
//! let mut cloud = PointCloud::new(vec![[1.0, 0.0, 0.0]], None, None);
//! let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
//! let transform = rt_to_transform(&rotation, &[0.0, 0.0, 1.0]);
//! cloud.transform(&transform);
//! assert_eq!(cloud.points()[0], [1.0, 0.0, 1.0]);
//! ```

/// Per-point descriptor matrices with a compile-time dimension.
pub mod feature;

/// KD-tree façade over points and descriptors.
///
/// Provides k-NN and hybrid (radius-capped k-NN) searches returning
/// `(index, squared_distance)` pairs.
pub mod kdtree;

/// Linear algebra utilities specialized for 3D geometry.
pub mod linalg;

/// Distance helpers for 3D points.
pub mod ops;

/// Point cloud container and in-place transformation.
pub mod pointcloud;

/// Rotation builders and 4×4 homogeneous transform helpers.
pub mod transforms;
