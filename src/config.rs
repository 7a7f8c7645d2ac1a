//! Run configuration.
//!
//! A [`Config`] can be deserialized from YAML (every field optional) and then overridden
//! from the command line. [`Config::validate`] runs after overrides so bad values fail
//! before any word is processed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::{
    DistributionalBaseline, GraphFactorizationClustering, HgfcParams, Method, SemClustParams,
    SpectralLocalScaling, SpectralParams, Strategy,
};
use crate::error::{Error, Result};
use crate::eval::{BaselineGenerator, RAND_ITER};

/// Settings for one clustering and evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clustering strategy.
    pub method: Method,
    /// Restrict candidate sets to the gold vocabulary before clustering.
    pub filter_by_gold: bool,
    /// Score the baselines alongside each word.
    pub baselines: bool,
    /// Random-baseline iterations (and chunks per iteration).
    pub rand_iter: usize,
    /// Seed of the random baseline.
    pub seed: u64,
    /// Parameters of the distributional baseline.
    pub semclust: SemClustParams,
    /// Parameters of spectral clustering.
    pub spectral: SpectralParams,
    /// Parameters of graph-factorization clustering.
    pub hgfc: HgfcParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::default(),
            filter_by_gold: false,
            baselines: false,
            rand_iter: RAND_ITER,
            seed: 0,
            semclust: SemClustParams::default(),
            spectral: SpectralParams::default(),
            hgfc: HgfcParams::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Select the strategy.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable gold filtering.
    pub fn with_filter_by_gold(mut self, filter: bool) -> Self {
        self.filter_by_gold = filter;
        self
    }

    /// Enable or disable baselines.
    pub fn with_baselines(mut self, baselines: bool) -> Self {
        self.baselines = baselines;
        self
    }

    /// Set the random-baseline iteration count.
    pub fn with_rand_iter(mut self, rand_iter: usize) -> Self {
        self.rand_iter = rand_iter;
        self
    }

    /// Set the random-baseline seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every value. Invalid parameters become [`Error::Configuration`].
    pub fn validate(&self) -> Result<()> {
        if self.rand_iter == 0 {
            return Err(Error::Configuration(
                "rand_iter must be at least 1".to_string(),
            ));
        }
        let checks = [
            ("semclust", self.semclust.validate()),
            ("spectral", self.spectral.validate()),
            ("hgfc", self.hgfc.validate()),
        ];
        for (section, check) in checks {
            if let Err(e) = check {
                return Err(Error::Configuration(format!("{section}: {e}")));
            }
        }
        Ok(())
    }

    /// The configured strategy.
    pub fn strategy(&self) -> Result<Strategy> {
        self.validate()?;
        Ok(match self.method {
            Method::SemClust => {
                Strategy::SemClust(DistributionalBaseline::from_params(self.semclust.clone()))
            }
            Method::Spectral => {
                Strategy::Spectral(SpectralLocalScaling::from_params(self.spectral.clone()))
            }
            Method::Hgfc => {
                Strategy::Hgfc(GraphFactorizationClustering::from_params(self.hgfc.clone()))
            }
        })
    }

    /// Baseline generator for this run.
    pub fn baseline_generator(&self) -> BaselineGenerator {
        BaselineGenerator::new(self.seed).with_iterations(self.rand_iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_driver() {
        let c = Config::default();
        assert_eq!(c.method, Method::Hgfc);
        assert_eq!(c.rand_iter, 5);
        assert!(!c.baselines);
        assert!(!c.filter_by_gold);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = Config::from_yaml_str(
            "method: spectral\nbaselines: true\nspectral:\n  neighbors: 5\n",
        )
        .unwrap();
        assert_eq!(c.method, Method::Spectral);
        assert!(c.baselines);
        assert_eq!(c.spectral.neighbors, 5);
        assert!(c.hgfc.refine);
        assert_eq!(c.spectral.paraphrase_weight, 0.5);
        assert_eq!(c.rand_iter, 5);
    }

    #[test]
    fn unknown_method_in_yaml_fails() {
        assert!(Config::from_yaml_str("method: kmeans\n").is_err());
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        let c = Config::default().with_rand_iter(0);
        assert!(matches!(c.validate(), Err(Error::Configuration(_))));

        let mut c = Config::default();
        c.hgfc.shrink = 1.5;
        let err = c.strategy().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!err.is_per_word());
    }

    #[test]
    fn strategy_follows_method() {
        for m in Method::ALL {
            let s = Config::default().with_method(m).strategy().unwrap();
            assert_eq!(s.method(), m);
        }
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "method: semclust\nseed: 7\nrand_iter: 3\n").unwrap();
        let c = Config::from_yaml_file(&path).unwrap();
        assert_eq!(c.method, Method::SemClust);
        assert_eq!(c.baseline_generator().iterations(), 3);
    }
}
