use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::hgfc::GraphFactorizationClustering;
use super::semclust::DistributionalBaseline;
use super::spectral::SpectralLocalScaling;
use super::traits::SenseClusterer;
use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::sense::SenseClustering;
use crate::signals::Signals;

/// Name of a clustering strategy, as given on the command line or in a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// [`DistributionalBaseline`].
    SemClust,
    /// [`SpectralLocalScaling`].
    Spectral,
    /// [`GraphFactorizationClustering`].
    #[default]
    Hgfc,
}

impl Method {
    /// Every selectable method.
    pub const ALL: [Method; 3] = [Method::SemClust, Method::Spectral, Method::Hgfc];

    /// Run-time name.
    pub fn name(self) -> &'static str {
        match self {
            Method::SemClust => "semclust",
            Method::Spectral => "spectral",
            Method::Hgfc => "hgfc",
        }
    }

    /// Whether the method needs the distributional vector table.
    pub fn requires_vectors(self) -> bool {
        matches!(self, Method::SemClust)
    }

    /// Whether the method needs the entailment table.
    pub fn requires_entailment(self) -> bool {
        !matches!(self, Method::SemClust)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown clustering method '{s}'; choose 'spectral', 'semclust', or 'hgfc'"
                ))
            })
    }
}

/// A configured strategy. Closed set of variants behind [`SenseClusterer`].
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Distributional baseline.
    SemClust(DistributionalBaseline),
    /// Spectral clustering with local scaling.
    Spectral(SpectralLocalScaling),
    /// Hierarchical graph factorization clustering.
    Hgfc(GraphFactorizationClustering),
}

impl Strategy {
    /// The method this strategy implements.
    pub fn method(&self) -> Method {
        match self {
            Strategy::SemClust(_) => Method::SemClust,
            Strategy::Spectral(_) => Method::Spectral,
            Strategy::Hgfc(_) => Method::Hgfc,
        }
    }

    fn inner(&self) -> &dyn SenseClusterer {
        match self {
            Strategy::SemClust(s) => s,
            Strategy::Spectral(s) => s,
            Strategy::Hgfc(s) => s,
        }
    }
}

impl From<Method> for Strategy {
    /// The strategy with default parameters.
    fn from(method: Method) -> Self {
        match method {
            Method::SemClust => Strategy::SemClust(DistributionalBaseline::new()),
            Method::Spectral => Strategy::Spectral(SpectralLocalScaling::new()),
            Method::Hgfc => Strategy::Hgfc(GraphFactorizationClustering::new()),
        }
    }
}

impl SenseClusterer for Strategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn cluster(&self, set: &CandidateSet, signals: Signals<'_>) -> Result<SenseClustering> {
        self.inner().cluster(set, signals)
    }
}
