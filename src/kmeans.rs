//! Lloyd's method with random restarts.
//!
//! Each restart samples `k` distinct points as initial centers and alternates
//! assignment and update steps until the center matrix stops changing
//! exactly. The restart with the lowest cost wins.

use log::{debug, info, warn};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::index::sample;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::clustering::Clustering;
use crate::compare::labels_for;
use crate::dataset::DataSet;
use crate::distance::{euclidean, squared_euclidean};
use crate::error::{ClusterError, Result};

pub const DEFAULT_RESTARTS: usize = 100;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Outcome of one Lloyd run from a fixed set of initial centers.
#[derive(Debug, Clone)]
pub struct LloydRun {
    /// Cluster `ClusterId(c)` holds the points assigned to center row `c`.
    pub clustering: Clustering,
    pub centers: Array2<f64>,
    pub assignments: Vec<usize>,
    pub cost: f64,
    pub iterations: usize,
    pub converged: bool,
    /// Cost after each assignment + update step.
    pub cost_history: Vec<f64>,
}

/// Best run over all restarts.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub cost: f64,
    pub clustering: Clustering,
    pub centers: Array2<f64>,
    pub assignments: Vec<usize>,
    /// Index of the restart that produced this result.
    pub restart: usize,
    pub iterations: usize,
}

impl KMeansResult {
    /// Label vector in dataset order, clusters numbered by ascending id.
    pub fn labels(&self) -> Result<Vec<usize>> {
        labels_for(&self.clustering, self.assignments.len())
    }
}

/// Index of the nearest center. Ties go to the lowest index.
fn nearest_center(point: ArrayView1<'_, f64>, centers: ArrayView2<'_, f64>) -> Result<usize> {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;
    for (ci, center) in centers.outer_iter().enumerate() {
        let dist = euclidean(point, center)?;
        if dist < best_dist {
            best_dist = dist;
            best_cluster = ci;
        }
    }
    Ok(best_cluster)
}

fn assign(dataset: &DataSet, centers: &Array2<f64>, assignments: &mut [usize]) -> Result<()> {
    for (i, point) in dataset.data().outer_iter().enumerate() {
        assignments[i] = nearest_center(point, centers.view())?;
    }
    Ok(())
}

/// Mean of each cluster. A center with no points keeps its previous value.
fn update_centers(dataset: &DataSet, previous: &Array2<f64>, assignments: &[usize]) -> Array2<f64> {
    let k = previous.nrows();
    let mut centers = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0usize; k];

    for (point, &c) in dataset.data().outer_iter().zip(assignments) {
        let mut row = centers.row_mut(c);
        row += &point;
        counts[c] += 1;
    }

    for (ci, &count) in counts.iter().enumerate() {
        if count == 0 {
            centers.row_mut(ci).assign(&previous.row(ci));
        } else {
            centers.row_mut(ci).mapv_inplace(|x| x / count as f64);
        }
    }
    centers
}

/// Sum of squared distances from every point to its assigned center.
pub fn kmeans_cost(dataset: &DataSet, centers: &Array2<f64>, assignments: &[usize]) -> Result<f64> {
    let mut cost = 0.0;
    for (point, &c) in dataset.data().outer_iter().zip(assignments) {
        cost += squared_euclidean(point, centers.row(c))?;
    }
    Ok(cost)
}

/// Sample `k` distinct points as initial centers.
fn random_centers<R: Rng + ?Sized>(dataset: &DataSet, k: usize, rng: &mut R) -> Array2<f64> {
    let indices = sample(rng, dataset.n_points(), k).into_vec();
    dataset.data().select(Axis(0), &indices)
}

/// Run Lloyd's method from `initial_centers` until the centers repeat exactly,
/// or `max_iterations` assignment/update steps have been made.
pub fn lloyd(dataset: &DataSet, initial_centers: Array2<f64>, max_iterations: usize) -> Result<LloydRun> {
    let n = dataset.n_points();
    let k = initial_centers.nrows();
    if k == 0 {
        return Err(ClusterError::InvalidK { k, n });
    }
    if initial_centers.ncols() != dataset.dim() {
        return Err(ClusterError::DimensionMismatch {
            left: dataset.dim(),
            right: initial_centers.ncols(),
        });
    }

    let mut centers = initial_centers;
    let mut assignments = vec![0usize; n];
    let mut cost_history = Vec::new();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations.max(1) {
        iterations += 1;
        assign(dataset, &centers, &mut assignments)?;
        let updated = update_centers(dataset, &centers, &assignments);
        cost_history.push(kmeans_cost(dataset, &updated, &assignments)?);

        let unchanged = updated == centers;
        centers = updated;
        if unchanged {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!("Lloyd's method stopped after {} iterations without converging", iterations);
    }

    let cost = match cost_history.last() {
        Some(&c) => c,
        None => kmeans_cost(dataset, &centers, &assignments)?,
    };

    Ok(LloydRun {
        clustering: Clustering::from_assignments(&assignments),
        centers,
        assignments,
        cost,
        iterations,
        converged,
        cost_history,
    })
}

/// K-means engine: Lloyd's method repeated from independent random starts.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    restarts: usize,
    seed: Option<u64>,
    max_iterations: usize,
    parallel: bool,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            restarts: DEFAULT_RESTARTS,
            seed: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parallel: true,
        }
    }

    /// Number of independent runs. Zero is treated as one.
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Dispatch restarts on the rayon pool. Results do not depend on this.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// One seed per restart, drawn up front so scheduling cannot change results.
    fn restart_seeds(&self) -> Vec<u64> {
        let mut master = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        (0..self.restarts.max(1)).map(|_| master.next_u64()).collect()
    }

    pub fn fit(&self, dataset: &DataSet) -> Result<KMeansResult> {
        let n = dataset.n_points();
        if self.k == 0 {
            return Err(ClusterError::InvalidK { k: self.k, n });
        }
        if self.k > n {
            return Err(ClusterError::InsufficientData { k: self.k, n });
        }

        let seeds = self.restart_seeds();
        let run_one = |(restart, seed): (usize, u64)| -> Result<(usize, LloydRun)> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centers = random_centers(dataset, self.k, &mut rng);
            let run = lloyd(dataset, centers, self.max_iterations)?;
            debug!(
                "restart {}: cost {} after {} iterations",
                restart, run.cost, run.iterations
            );
            Ok((restart, run))
        };

        let runs: Vec<Result<(usize, LloydRun)>> = if self.parallel {
            seeds.into_par_iter().enumerate().map(run_one).collect()
        } else {
            seeds.into_iter().enumerate().map(run_one).collect()
        };

        // Runs are in restart order; strict improvement keeps the earliest tie.
        let mut best: Option<(usize, LloydRun)> = None;
        for outcome in runs {
            let (restart, run) = outcome?;
            if best.as_ref().map(|(_, b)| run.cost < b.cost).unwrap_or(true) {
                best = Some((restart, run));
            }
        }
        let (restart, run) = best.ok_or(ClusterError::EmptyDataset)?;

        info!(
            "k-means (k={}) best cost {} from restart {} of {}",
            self.k,
            run.cost,
            restart,
            self.restarts.max(1)
        );

        Ok(KMeansResult {
            cost: run.cost,
            clustering: run.clustering,
            centers: run.centers,
            assignments: run.assignments,
            restart,
            iterations: run.iterations,
        })
    }
}

/// Lloyd's method over `restarts` random starts, keeping the cheapest result.
pub fn run_kmeans(dataset: &DataSet, k: usize, restarts: usize) -> Result<KMeansResult> {
    KMeans::new(k).restarts(restarts).fit(dataset)
}
