//! Agglomerative clustering with average linkage.

use log::{debug, info};
use ndarray::Array2;

use crate::clustering::{ClusterId, Clustering};
use crate::compare::labels_for;
use crate::dataset::DataSet;
use crate::distance::LinkageMetric;
use crate::error::{ClusterError, Result};

/// One step of the merge history.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub left: ClusterId,
    pub right: ClusterId,
    pub merged: ClusterId,
    /// Average linkage distance between `left` and `right` when merged.
    pub distance: f64,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct LinkageResult {
    pub clustering: Clustering,
    /// Merges in the order they happened.
    pub merges: Vec<Merge>,
    n_points: usize,
}

impl LinkageResult {
    /// Label vector in dataset order, clusters numbered by ascending id.
    pub fn labels(&self) -> Result<Vec<usize>> {
        labels_for(&self.clustering, self.n_points)
    }
}

/// Mean of `distance(i, j)` over every `i` in `a` and `j` in `b`.
/// Pairs with equal coordinates count like any other pair.
fn mean_over_pairs<F>(a: &[usize], b: &[usize], mut distance: F) -> Result<f64>
where
    F: FnMut(usize, usize) -> Result<f64>,
{
    let mut total = 0.0;
    for &i in a {
        for &j in b {
            total += distance(i, j)?;
        }
    }
    Ok(total / (a.len() * b.len()) as f64)
}

/// Average linkage distance between clusters `a` and `b`, computed from the
/// points directly. The engine uses the same mean over a cached distance matrix.
pub fn average_linkage_distance(
    dataset: &DataSet,
    a: &[usize],
    b: &[usize],
    metric: LinkageMetric,
) -> Result<f64> {
    mean_over_pairs(a, b, |i, j| metric.distance(dataset.point(i), dataset.point(j)))
}

fn pairwise_distances(dataset: &DataSet, metric: LinkageMetric) -> Result<Array2<f64>> {
    let n = dataset.n_points();
    let mut dist = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = metric.distance(dataset.point(i), dataset.point(j))?;
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    Ok(dist)
}

fn cached_average(a: &[usize], b: &[usize], dist: &Array2<f64>) -> Result<f64> {
    mean_over_pairs(a, b, |i, j| Ok(dist[[i, j]]))
}

/// Closest pair of clusters, scanned in ascending id order (left < right).
/// The first pair reaching the minimum wins.
fn closest_pair(
    clustering: &Clustering,
    dist: &Array2<f64>,
) -> Result<Option<(ClusterId, ClusterId, f64)>> {
    let clusters: Vec<(ClusterId, &[usize])> = clustering.clusters().collect();
    let mut best: Option<(ClusterId, ClusterId, f64)> = None;
    for (a, &(left, members_a)) in clusters.iter().enumerate() {
        for &(right, members_b) in &clusters[a + 1..] {
            let d = cached_average(members_a, members_b, dist)?;
            if best.map(|(_, _, best_d)| d < best_d).unwrap_or(true) {
                best = Some((left, right, d));
            }
        }
    }
    Ok(best)
}

/// Average-linkage engine: merge the two closest clusters until `k` remain.
#[derive(Debug, Clone)]
pub struct AverageLinkage {
    k: usize,
    metric: LinkageMetric,
}

impl AverageLinkage {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: LinkageMetric::default(),
        }
    }

    pub fn metric(mut self, metric: LinkageMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Singletons take ids `0..n` in dataset order; merged clusters get `n, n+1, ...`.
    pub fn fit(&self, dataset: &DataSet) -> Result<LinkageResult> {
        let n = dataset.n_points();
        if self.k == 0 || self.k > n {
            return Err(ClusterError::InvalidK { k: self.k, n });
        }

        let dist = pairwise_distances(dataset, self.metric)?;

        let mut clustering = Clustering::new();
        for i in 0..n {
            clustering.insert(ClusterId(i), vec![i]);
        }

        let mut next_id = n;
        let mut merges = Vec::with_capacity(n - self.k);

        while clustering.len() > self.k {
            let Some((left, right, distance)) = closest_pair(&clustering, &dist)? else {
                break;
            };
            let mut members = clustering.remove(left).unwrap_or_default();
            members.extend(clustering.remove(right).unwrap_or_default());

            let merged = ClusterId(next_id);
            next_id += 1;
            debug!(
                "merge {} + {} -> {} at distance {} ({} points)",
                left,
                right,
                merged,
                distance,
                members.len()
            );

            merges.push(Merge {
                left,
                right,
                merged,
                distance,
                size: members.len(),
            });
            clustering.insert(merged, members);
        }

        info!(
            "average linkage reduced {} points to {} clusters in {} merges",
            n,
            clustering.len(),
            merges.len()
        );

        Ok(LinkageResult {
            clustering,
            merges,
            n_points: n,
        })
    }
}

/// Average-linkage clustering with Euclidean point distance.
pub fn run_average_linkage(dataset: &DataSet, k: usize) -> Result<LinkageResult> {
    AverageLinkage::new(k).fit(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_data() -> DataSet {
        DataSet::from_rows(vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]]).unwrap()
    }

    #[test]
    fn test_two_groups_on_a_line() {
        let result = run_average_linkage(&line_data(), 2).unwrap();
        assert_eq!(result.clustering.len(), 2);
        assert!(result.clustering.is_partition_of(4));

        let labels = result.labels().unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_merge_count() {
        let ds = DataSet::from_rows(
            (0..9).map(|i| vec![(i * i) as f64, (i % 4) as f64]).collect(),
        )
        .unwrap();
        for k in 1..=9 {
            let result = AverageLinkage::new(k).fit(&ds).unwrap();
            assert_eq!(result.merges.len(), 9 - k);
            assert_eq!(result.clustering.len(), k);
            assert!(result.clustering.is_partition_of(9));
        }
    }

    #[test]
    fn test_merge_distances_non_decreasing() {
        let ds = DataSet::from_rows(vec![
            vec![0.0, 0.0],
            vec![0.5, 0.2],
            vec![4.0, 4.0],
            vec![4.2, 3.9],
            vec![9.0, 0.0],
            vec![2.0, 7.0],
        ])
        .unwrap();
        let result = run_average_linkage(&ds, 1).unwrap();
        for pair in result.merges.windows(2) {
            assert!(pair[1].distance + 1e-12 >= pair[0].distance);
        }
        assert_eq!(result.merges.last().unwrap().size, 6);
    }

    #[test]
    fn test_identical_points_count_in_average() {
        let ds = DataSet::from_rows(vec![vec![0.0], vec![5.0], vec![5.0]]).unwrap();
        let d = average_linkage_distance(&ds, &[0, 1], &[2], LinkageMetric::Euclidean).unwrap();
        assert_relative_eq!(d, 2.5);

        let dist = pairwise_distances(&ds, LinkageMetric::Euclidean).unwrap();
        assert_relative_eq!(cached_average(&[0, 1], &[2], &dist).unwrap(), d);
    }

    #[test]
    fn test_ties_take_lowest_ids() {
        let ds = DataSet::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let result = run_average_linkage(&ds, 2).unwrap();
        let merge = &result.merges[0];
        assert_eq!((merge.left, merge.right, merge.merged), (ClusterId(0), ClusterId(1), ClusterId(3)));
        assert_eq!(result.clustering.cluster(ClusterId(3)), Some(&[0, 1][..]));
        assert_eq!(result.labels().unwrap(), vec![1, 1, 0]);
    }

    #[test]
    fn test_metric_choice() {
        let ds = DataSet::from_rows(vec![vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let euclid = AverageLinkage::new(1).fit(&ds).unwrap();
        let manhattan = AverageLinkage::new(1).metric(LinkageMetric::Manhattan).fit(&ds).unwrap();
        assert_relative_eq!(euclid.merges[0].distance, 5.0);
        assert_relative_eq!(manhattan.merges[0].distance, 7.0);
    }

    #[test]
    fn test_k_equals_n_is_identity() {
        let result = run_average_linkage(&line_data(), 4).unwrap();
        assert!(result.merges.is_empty());
        assert_eq!(result.labels().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_invalid_k() {
        let ds = line_data();
        assert_eq!(
            run_average_linkage(&ds, 0).unwrap_err(),
            ClusterError::InvalidK { k: 0, n: 4 }
        );
        assert_eq!(
            run_average_linkage(&ds, 5).unwrap_err(),
            ClusterError::InvalidK { k: 5, n: 4 }
        );
    }
}
