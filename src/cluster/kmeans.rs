//! K-means with k-means++ seeding and Lloyd iterations.
//!
//! Used by the spectral strategy to discretize the eigenvector embedding. Seeding is
//! always driven by a seeded [`StdRng`], so identical inputs give identical labels.
//!
//! ## References
//!
//! Arthur & Vassilvitskii (2007). "k-means++: The Advantages of Careful Seeding." SODA.

use rand::prelude::*;

use super::traits::Clustering;
use super::util::squared_euclidean;
use crate::error::{Error, Result};

/// K-means clusterer.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    tol: f32,
    seed: u64,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// One centroid per cluster.
    pub centroids: Vec<Vec<f32>>,
    /// Cluster label per input row.
    pub labels: Vec<usize>,
    /// Within-cluster sum of squared distances.
    pub inertia: f32,
    /// Lloyd iterations performed.
    pub iterations: usize,
}

impl Kmeans {
    /// Create a k-means clusterer for `k` clusters (seed 0, 100 iterations).
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-6,
            seed: 0,
        }
    }

    /// Set the maximum number of Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on total centroid movement.
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Set the RNG seed used for k-means++ seeding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit and return centroids, labels and inertia.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        let d = data[0].len();
        for point in data.iter().skip(1) {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = plus_plus_init(data, self.k, &mut rng);
        let mut labels = vec![0usize; n];
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            for (i, point) in data.iter().enumerate() {
                labels[i] = nearest(point, &centroids).0;
            }

            let mut sums = vec![vec![0.0f32; d]; self.k];
            let mut counts = vec![0usize; self.k];
            for (point, &l) in data.iter().zip(&labels) {
                counts[l] += 1;
                for (s, x) in sums[l].iter_mut().zip(point) {
                    *s += x;
                }
            }

            let mut shift = 0.0f32;
            for c in 0..self.k {
                // Empty clusters keep their previous centroid.
                if counts[c] == 0 {
                    continue;
                }
                let inv = 1.0 / counts[c] as f32;
                let updated: Vec<f32> = sums[c].iter().map(|s| s * inv).collect();
                shift += squared_euclidean(&updated, &centroids[c]);
                centroids[c] = updated;
            }

            if shift <= self.tol {
                break;
            }
        }

        let mut inertia = 0.0f32;
        for (i, point) in data.iter().enumerate() {
            let (l, dist) = nearest(point, &centroids);
            labels[i] = l;
            inertia += dist;
        }

        Ok(KmeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        })
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f32) {
    let mut best = (0usize, f32::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(point, centroid);
        if dist < best.1 {
            best = (c, dist);
        }
    }
    best
}

fn plus_plus_init(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = data.len();
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut min_dist: Vec<f32> = data
        .iter()
        .map(|p| squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f32 = min_dist.iter().sum();
        let next = if total <= f32::EPSILON {
            // All remaining points coincide with a centroid: take the first unused index.
            centroids.len().min(n - 1)
        } else {
            let mut target = rng.random::<f32>() * total;
            let mut chosen = n - 1;
            for (i, &dist) in min_dist.iter().enumerate() {
                if target < dist {
                    chosen = i;
                    break;
                }
                target -= dist;
            }
            chosen
        };
        centroids.push(data[next].clone());
        for (i, p) in data.iter().enumerate() {
            let dist = squared_euclidean(p, &data[next]);
            if dist < min_dist[i] {
                min_dist[i] = dist;
            }
        }
    }
    centroids
}
