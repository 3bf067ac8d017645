//! Seeded k-means over dense rows
//!
//! k-means++ seeding followed by Lloyd iterations, repeated for a fixed
//! number of restarts; the run with the lowest inertia wins. A fixed seed
//! makes results reproducible for identical input.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::DependencyError;

/// K-means settings
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Independent seeded runs; the best is kept
    pub restarts: usize,
    /// Lloyd iterations per run
    pub max_iterations: usize,
    /// Stop when total squared centroid movement falls below this
    pub tolerance: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Outcome of a k-means fit
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster index per row
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeansFit {
    /// Rows assigned to each cluster
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.centroids.len()];
        for &c in &self.assignments {
            counts[c] += 1;
        }
        counts
    }
}

#[inline]
fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(j, c)| (j, distance_squared(row, c)))
        .fold((0, f64::MAX), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// Choose `k` initial centroids with probability proportional to D²
fn kmeans_plus_plus(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rows[rng.gen_range(0..n)].clone());

    let mut min_distances: Vec<f64> = rows
        .iter()
        .map(|r| distance_squared(r, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_distances.iter().sum();

        let next = if total <= 0.0 {
            // Every row sits on a centroid already
            rng.gen_range(0..n)
        } else {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            min_distances
                .iter()
                .position(|d| {
                    cumulative += d;
                    cumulative >= target
                })
                .unwrap_or(n - 1)
        };

        let centroid = rows[next].clone();
        for (i, row) in rows.iter().enumerate() {
            let d = distance_squared(row, &centroid);
            if d < min_distances[i] {
                min_distances[i] = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Mean of assigned rows; an empty cluster keeps its previous centroid
fn update_centroids(rows: &[Vec<f64>], assignments: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (row, &c) in rows.iter().zip(assignments) {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(row) {
            *s += v;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), old)| {
            if count == 0 {
                return old.clone();
            }
            for s in sum.iter_mut() {
                *s /= count as f64;
            }
            sum
        })
        .collect()
}

fn lloyd(rows: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, config: &KMeansConfig) -> KMeansFit {
    let mut assignments = vec![0usize; rows.len()];
    let mut iterations = 0;

    for _ in 0..config.max_iterations.max(1) {
        iterations += 1;

        for (i, row) in rows.iter().enumerate() {
            assignments[i] = nearest(row, &centroids).0;
        }

        let updated = update_centroids(rows, &assignments, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| distance_squared(old, new))
            .sum();
        centroids = updated;

        if shift <= config.tolerance {
            break;
        }
    }

    // Final assignment against the converged centroids
    let mut inertia = 0.0;
    for (i, row) in rows.iter().enumerate() {
        let (c, d) = nearest(row, &centroids);
        assignments[i] = c;
        inertia += d;
    }

    KMeansFit {
        assignments,
        centroids,
        inertia,
        iterations,
    }
}

/// Partition `rows` into `k` clusters
///
/// Fails when there are fewer rows than clusters or `k` is zero.
pub fn kmeans(rows: &[Vec<f64>], k: usize, config: &KMeansConfig) -> Result<KMeansFit, DependencyError> {
    if k == 0 {
        return Err(DependencyError::call_failed("k must be positive"));
    }
    if rows.len() < k {
        return Err(DependencyError::call_failed(format!(
            "n_samples={} should be >= n_clusters={}",
            rows.len(),
            k
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;

    for _ in 0..config.restarts.max(1) {
        let seeds = kmeans_plus_plus(rows, k, &mut rng);
        let fit = lloyd(rows, seeds, config);
        if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    best.ok_or_else(|| DependencyError::call_failed("k-means produced no fit"))
}
