//! Hierarchical clustering over the document-term matrix: pairwise
//! Euclidean distances and Ward-linkage agglomeration.
//!
//! Merges follow the usual convention: leaves are 0..n-1, the cluster
//! created by merge `t` gets id `n + t`.

use ndarray::Array2;

/// One agglomeration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub size: usize,
}

fn euclidean(m: &Array2<f64>, i: usize, j: usize) -> f64 {
    let mut sum = 0.0;
    for c in 0..m.ncols() {
        let d = m[[i, c]] - m[[j, c]];
        sum += d * d;
    }
    sum.sqrt()
}

/// Condensed pairwise Euclidean distance (upper triangle, row-major).
pub fn pdist_euclidean(m: &Array2<f64>) -> Vec<f64> {
    let n = m.nrows();
    let mut out = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            out.push(euclidean(m, i, j));
        }
    }
    out
}

/// Ward-linkage agglomerative clustering. Returns `n - 1` merges.
///
/// Distances between merged clusters follow the Lance–Williams update on
/// squared Euclidean distances, reported unsquared.
pub fn ward_linkage(m: &Array2<f64>) -> Vec<Merge> {
    let n = m.nrows();
    if n < 2 {
        return Vec::new();
    }

    // full symmetric distance matrix between active slots
    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(m, i, j);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut active: Vec<bool> = vec![true; n];
    let mut ids: Vec<usize> = (0..n).collect();
    let mut sizes: Vec<f64> = vec![1.0; n];
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        // closest active pair
        let mut best = (0usize, 0usize, f64::INFINITY);
        for i in 0..n {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..n {
                if active[j] && dist[i][j] < best.2 {
                    best = (i, j, dist[i][j]);
                }
            }
        }
        let (i, j, d_ij) = best;

        let (lo, hi) = if ids[i] <= ids[j] { (ids[i], ids[j]) } else { (ids[j], ids[i]) };
        let merged_size = sizes[i] + sizes[j];
        merges.push(Merge { a: lo, b: hi, distance: d_ij, size: merged_size as usize });

        // Lance-Williams Ward update against every other active cluster
        for k in 0..n {
            if !active[k] || k == i || k == j {
                continue;
            }
            let (ni, nj, nk) = (sizes[i], sizes[j], sizes[k]);
            let d2 = ((ni + nk) * dist[i][k] * dist[i][k]
                + (nj + nk) * dist[j][k] * dist[j][k]
                - nk * d_ij * d_ij)
                / (ni + nj + nk);
            let d = d2.max(0.0).sqrt();
            dist[i][k] = d;
            dist[k][i] = d;
        }

        active[j] = false;
        sizes[i] = merged_size;
        ids[i] = n + step;
    }

    merges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condensed_distance_length_and_values() {
        let m = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 3.0, 4.0, 0.0, 0.0]).unwrap();
        let d = pdist_euclidean(&m);
        assert_eq!(d.len(), 3);
        assert!((d[0] - 5.0).abs() < 1e-12); // (0,1)
        assert!((d[1] - 0.0).abs() < 1e-12); // (0,2)
        assert!((d[2] - 5.0).abs() < 1e-12); // (1,2)
    }

    #[test]
    fn ward_merges_tight_pairs_first() {
        // two well-separated pairs on a line
        let m = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 10.0, 11.0]).unwrap();
        let merges = ward_linkage(&m);
        assert_eq!(merges.len(), 3);

        assert_eq!((merges[0].a, merges[0].b), (0, 1));
        assert!((merges[0].distance - 1.0).abs() < 1e-12);
        assert_eq!((merges[1].a, merges[1].b), (2, 3));
        assert!((merges[1].distance - 1.0).abs() < 1e-12);

        // final merge joins the two size-2 clusters, far apart
        assert_eq!(merges[2].size, 4);
        assert!(merges[2].distance > 9.0);
    }

    #[test]
    fn singleton_input_has_no_merges() {
        let m = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        assert!(ward_linkage(&m).is_empty());
    }
}
