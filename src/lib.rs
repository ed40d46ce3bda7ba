//! Lloyd's k-means and average-linkage clustering of numeric points,
//! plus a pairwise-disagreement score between two partitions.

pub mod clustering;
pub mod compare;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod kmeans;
pub mod linkage;

pub use clustering::{ClusterId, Clustering};
pub use compare::{compare, label_vector, pairwise_disagreement, Comparison};
pub use dataset::{DataSet, Delimiter};
pub use distance::{euclidean, manhattan, squared_euclidean, LinkageMetric};
pub use error::{ClusterError, Result};
pub use kmeans::{lloyd, run_kmeans, KMeans, KMeansResult, LloydRun};
pub use linkage::{average_linkage_distance, run_average_linkage, AverageLinkage, LinkageResult, Merge};
