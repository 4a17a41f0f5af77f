//! Size binning over a sorted sequence of bin edges.
//!
//! Edges `[e0, e1, ..., en]` describe `n` half-open bins `[e0, e1), [e1, e2), ...`.
//! The final edge is an exclusive upper bound and never a bin of its own.

use super::math::logrange_u64;

/// Binary search for the index of the largest value in `xs` that is not greater than `x`.
///
/// `xs` must be sorted ascending. Returns [`None`] if every value is greater than `x`
/// (or `xs` is empty).
pub fn find_next_lowest<T: PartialOrd>(xs: &[T], x: &T) -> Option<usize> {
    if xs.is_empty() {
        return None;
    }

    let mut left: isize = 0;
    let mut right: isize = xs.len() as isize - 1;
    loop {
        let mid = (left + right) / 2;
        let value = &xs[mid as usize];
        if x == value {
            return Some(mid as usize);
        } else if x > value {
            left = mid + 1;
            if left > right {
                return Some(mid as usize);
            }
        } else {
            right = mid - 1;
            if left > right {
                return usize::try_from(mid - 1).ok();
            }
        }
    }
}

/// Finds the bin containing `x`, or [`None`] if `x` is outside `[edges[0], edges[last])`.
pub fn bin_to<T: PartialOrd>(edges: &[T], x: &T) -> Option<usize> {
    match find_next_lowest(edges, x) {
        Some(i) if i + 1 < edges.len() => Some(i),
        _ => None,
    }
}

/// A fixed, logarithmically spaced partition of the container size domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBins {
    edges: Vec<u64>,
}

impl SizeBins {
    /// Creates bins from `num_points` log-spaced edges between `size_min` and `size_max`.
    ///
    /// Edges are truncated to integers; duplicates produced by truncation at the low end
    /// are merged, so the number of bins may be smaller than `num_points - 1`.
    pub fn log_spaced(size_min: u64, size_max: u64, num_points: usize) -> Self {
        let mut edges = logrange_u64(size_min as f64, size_max as f64, num_points);
        edges.sort_unstable();
        edges.dedup();
        Self { edges }
    }

    /// Creates bins from explicit edges. Edges are sorted and de-duplicated.
    pub fn from_edges(mut edges: Vec<u64>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        Self { edges }
    }

    pub fn edges(&self) -> &[u64] {
        &self.edges
    }

    /// Number of bins (one less than the number of edges).
    pub fn len(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the bin containing `size`.
    pub fn bin_of(&self, size: u64) -> Option<usize> {
        bin_to(&self.edges, &size)
    }

    /// `[lower, upper)` bounds of bin `index`.
    pub fn bounds(&self, index: usize) -> (u64, u64) {
        (self.edges[index], self.edges[index + 1])
    }

    /// Representative size of bin `index`, used to label its aggregate records.
    pub fn midpoint(&self, index: usize) -> u64 {
        let (lower, upper) = self.bounds(index);
        (lower + upper) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(x, expected,
        case(0, None),     // below the first edge
        case(1, Some(0)),
        case(2, Some(0)),
        case(3, Some(1)),
        case(4, Some(1)),
        case(7, Some(2)),
        case(9, Some(3)),
        case(100, Some(3)) // past the end
    )]
    fn finds_next_lowest(x: i32, expected: Option<usize>) {
        let xs = [1, 3, 5, 9];
        assert_eq!(find_next_lowest(&xs, &x), expected);
    }

    #[test]
    fn next_lowest_of_empty_is_none() {
        let xs: [u64; 0] = [];
        assert_eq!(find_next_lowest(&xs, &5), None);
    }

    #[test]
    fn values_below_first_edge_are_out_of_range() {
        let edges = [10u64, 20, 40, 80];
        for x in 0..10 {
            assert_eq!(bin_to(&edges, &x), None);
        }
    }

    #[test]
    fn final_edge_is_never_a_bin() {
        let edges = [10u64, 20, 40, 80];
        for x in 40..200 {
            assert_ne!(bin_to(&edges, &x), Some(edges.len() - 1));
        }
        assert_eq!(bin_to(&edges, &79), Some(2));
        assert_eq!(bin_to(&edges, &80), None);
        assert_eq!(bin_to(&edges, &81), None);
    }

    #[test]
    fn first_bin_is_valid() {
        let edges = [10u64, 20, 40];
        assert_eq!(bin_to(&edges, &10), Some(0));
        assert_eq!(bin_to(&edges, &19), Some(0));
    }

    #[test]
    fn bin_agrees_with_linear_scan() {
        let bins = SizeBins::log_spaced(8, 500_000, 100);
        let edges = bins.edges();
        for size in (0..600_000u64).step_by(97) {
            let expected = (0..bins.len()).find(|&i| edges[i] <= size && size < edges[i + 1]);
            assert_eq!(bins.bin_of(size), expected, "size {}", size);
        }
    }

    #[test]
    fn log_spaced_edges_are_strictly_increasing() {
        let bins = SizeBins::log_spaced(8, 500_000, 100);
        assert!(bins.edges().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(bins.edges()[0], 8);
        assert!(bins.len() < 100);
    }

    #[test]
    fn midpoint_uses_integer_division() {
        let bins = SizeBins::from_edges(vec![8, 9, 13]);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.midpoint(0), 8);
        assert_eq!(bins.midpoint(1), 11);
    }
}
