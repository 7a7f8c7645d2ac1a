//! Word-sense clustering of paraphrase candidates, and the harness that evaluates it.
//!
//! `sensecluster` groups the candidate paraphrases of an ambiguous target word into sense
//! clusters and scores the result against gold annotations.
//!
//! - [`cluster`]: the strategies (distributional baseline, spectral clustering with local
//!   scaling, hierarchical graph factorization), selectable by name at run time.
//! - [`eval`]: reconciliation of predicted and gold clusterings, scoring, baselines and
//!   corpus-level aggregation.
//! - [`pipeline`]: the batch driver with per-word failure isolation.
//! - [`io`] and [`config`]: loaders, report writers and run configuration.

#![forbid(unsafe_code)]

pub mod candidates;
pub mod cluster;
pub mod config;
pub mod error;
pub mod eval;
pub mod io;
pub mod pipeline;
pub mod sense;
pub mod signals;

pub use candidates::CandidateSet;
pub use cluster::{Method, SenseClusterer, Strategy};
pub use config::Config;
pub use error::{Error, Result};
pub use eval::{
    reconcile, weighted_average, BaselineGenerator, BaselineScores, ClusterScores, Failure,
    PairedScorer, ReconciledPair, ScoreRecord, Scorer, Stage, Summary,
};
pub use pipeline::{run, Inputs, Report};
pub use sense::{SenseClustering, TargetWord};
pub use signals::{ScoreTable, Signals, VectorTable};
