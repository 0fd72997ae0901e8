/// A matrix of per-point descriptors with compile-time dimension `D`.
///
/// Column `i` describes point `i` of the cloud the feature was computed
/// from. Columns are stored contiguously, so the whole matrix can be
/// handed to [`crate::kdtree::KdTree::from_points`] for descriptor-space
/// searches. The const dimension makes mixing descriptors of different
/// sizes a compile-time error.
#[derive(Debug, Clone)]
pub struct Feature<const D: usize> {
    data: Vec<[f64; D]>,
}

impl<const D: usize> Feature<D> {
    /// Create a feature matrix from its columns.
    pub fn new(data: Vec<[f64; D]>) -> Self {
        Self { data }
    }

    /// The descriptor dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        D
    }

    /// The number of descriptors (one per point).
    #[inline]
    pub fn num(&self) -> usize {
        self.data.len()
    }

    /// Check if the feature matrix holds no descriptors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The descriptor of point `i`.
    #[inline]
    pub fn col(&self, i: usize) -> &[f64; D] {
        &self.data[i]
    }

    /// All descriptors, column-contiguous.
    pub fn data(&self) -> &[[f64; D]] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_accessors() {
        let feature = Feature::new(vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(feature.dimension(), 2);
        assert_eq!(feature.num(), 3);
        assert!(!feature.is_empty());
        assert_eq!(feature.col(1), &[3.0, 4.0]);
        assert_eq!(feature.data().len(), 3);
    }
}
