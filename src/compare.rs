//! Label vectors and the pairwise disagreement between two partitions.

use log::info;

use crate::clustering::Clustering;
use crate::dataset::DataSet;
use crate::error::{ClusterError, Result};
use crate::kmeans::{KMeans, KMeansResult};
use crate::linkage::{AverageLinkage, LinkageResult};

/// Label of each index in `0..n`: the position of its cluster in ascending id order.
pub fn labels_for(clustering: &Clustering, n: usize) -> Result<Vec<usize>> {
    let mut labels: Vec<Option<usize>> = vec![None; n];
    for (label, (_, members)) in clustering.clusters().enumerate() {
        for &i in members {
            if let Some(slot) = labels.get_mut(i) {
                *slot = Some(label);
            }
        }
    }
    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| label.ok_or(ClusterError::PointNotFound { index }))
        .collect()
}

/// Cluster label of every point of `dataset`, in dataset order.
pub fn label_vector(dataset: &DataSet, clustering: &Clustering) -> Result<Vec<usize>> {
    labels_for(clustering, dataset.n_points())
}

/// Fraction of index pairs `i < j < n` that exactly one labelling puts in the same cluster.
pub fn pairwise_disagreement(labels_a: &[usize], labels_b: &[usize], n: usize) -> Result<f64> {
    if labels_a.len() < n || labels_b.len() < n {
        return Err(ClusterError::LabelLengthMismatch {
            expected: n,
            left: labels_a.len(),
            right: labels_b.len(),
        });
    }
    if n < 2 {
        return Ok(0.0);
    }

    let mut disagreements = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let same_a = labels_a[i] == labels_a[j];
            let same_b = labels_b[i] == labels_b[j];
            if same_a != same_b {
                disagreements += 1;
            }
        }
    }
    let pairs = n * (n - 1) / 2;
    Ok(disagreements as f64 / pairs as f64)
}

/// Both clusterings of one dataset and how much they disagree.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub kmeans: KMeansResult,
    pub linkage: LinkageResult,
    pub kmeans_labels: Vec<usize>,
    pub linkage_labels: Vec<usize>,
    pub disagreement: f64,
}

/// Run both engines on `dataset` and score their disagreement.
pub fn compare(dataset: &DataSet, kmeans: &KMeans, linkage: &AverageLinkage) -> Result<Comparison> {
    let km = kmeans.fit(dataset)?;
    let al = linkage.fit(dataset)?;
    let kmeans_labels = label_vector(dataset, &km.clustering)?;
    let linkage_labels = label_vector(dataset, &al.clustering)?;
    let disagreement = pairwise_disagreement(&kmeans_labels, &linkage_labels, dataset.n_points())?;
    info!("k-means and average linkage disagree on {:.4} of point pairs", disagreement);

    Ok(Comparison {
        kmeans: km,
        linkage: al,
        kmeans_labels,
        linkage_labels,
        disagreement,
    })
}
