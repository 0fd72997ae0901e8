use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over `D`-dimensional points.
///
/// One façade serves both 3D point queries (`D = 3`) and descriptor-space
/// queries of any fixed dimension. Search results are `(index,
/// squared_distance)` pairs where the index refers to the slice the tree
/// was built from.
pub struct KdTree<const D: usize> {
    // None when built from an empty slice; every search then comes back empty.
    tree: Option<ImmutableKdTree<f64, u32, D, 32>>,
    len: usize,
}

impl<const D: usize> KdTree<D> {
    /// Build a tree over the given points.
    pub fn from_points(points: &[[f64; D]]) -> Self {
        let tree = if points.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(points))
        };
        Self {
            tree,
            len: points.len(),
        }
    }

    /// The number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree indexes no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `k` nearest neighbours of `query`, closest first.
    ///
    /// Returns fewer than `k` entries when the tree holds fewer points,
    /// and none at all on an empty tree.
    pub fn search_knn(&self, query: &[f64; D], k: usize) -> Vec<(usize, f64)> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        tree.nearest_n::<SquaredEuclidean>(query, k)
            .into_iter()
            .map(|neighbour| (neighbour.item as usize, neighbour.distance))
            .collect()
    }

    /// The `k` nearest neighbours of `query` within `radius`, closest first.
    ///
    /// A non-positive radius yields no neighbours.
    pub fn search_hybrid(&self, query: &[f64; D], radius: f64, k: usize) -> Vec<(usize, f64)> {
        if radius <= 0.0 {
            return Vec::new();
        }
        let radius2 = radius * radius;
        let mut neighbours = self.search_knn(query, k);
        neighbours.retain(|&(_, distance2)| distance2 <= radius2);
        neighbours
    }
}
