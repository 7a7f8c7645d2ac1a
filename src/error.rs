use thiserror::Error;

/// Errors returned by the clustering strategies, the evaluation harness and the loaders.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// No candidate in the set has a distributional vector.
    #[error("empty candidate set: no candidate of {target} has a vector")]
    EmptyCandidateSet {
        /// Target word, rendered as `word.pos`.
        target: String,
    },

    /// A clustering strategy lacks the signal it needs for this target word.
    #[error("insufficient data for {target}: {reason}")]
    InsufficientData {
        /// Target word, rendered as `word.pos`.
        target: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The scorer could not produce metrics for a target word.
    #[error("scoring error for {target}: {reason}")]
    Scoring {
        /// Target word, rendered as `word.pos`.
        target: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// Invalid run setup (unknown strategy, missing table, bad value). Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Vectors attached to one candidate set have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Malformed input line or document.
    #[error("parse error in {source_name} at line {line}: {message}")]
    Parse {
        /// File or stream the input came from.
        source_name: String,
        /// 1-based line number (0 when not line oriented).
        line: usize,
        /// Human-readable explanation.
        message: String,
    },

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML configuration failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// CSV report failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether this error is confined to one target word (the batch may continue).
    pub fn is_per_word(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput
                | Error::InvalidClusterCount { .. }
                | Error::EmptyCandidateSet { .. }
                | Error::InsufficientData { .. }
                | Error::Scoring { .. }
                | Error::DimensionMismatch { .. }
        )
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
