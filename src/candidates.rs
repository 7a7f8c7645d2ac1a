//! One target word's candidate paraphrases and the signals attached to them.

use std::collections::{BTreeSet, HashMap};

use crate::cluster::SenseClusterer;
use crate::error::{Error, Result};
use crate::sense::{SenseClustering, TargetWord};
use crate::signals::{Signals, VectorTable};

/// Candidate paraphrases of one target word.
///
/// Every key of the vector map is a member of `candidates`. Built by a loader, enriched
/// with [`attach_vectors`](Self::attach_vectors), then read by the clustering strategies.
/// Directed paraphrase and entailment scores are not copied in: strategies look them up
/// in the shared tables through [`Signals`].
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    target: TargetWord,
    candidates: BTreeSet<String>,
    vectors: HashMap<String, Vec<f32>>,
}

impl CandidateSet {
    /// Create a candidate set without signals. Duplicate candidates collapse.
    pub fn new<I, S>(target: TargetWord, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            candidates: candidates.into_iter().map(Into::into).collect(),
            vectors: HashMap::new(),
        }
    }

    /// The target word.
    pub fn target(&self) -> &TargetWord {
        &self.target
    }

    /// Candidates in lexicographic order.
    pub fn candidates(&self) -> &BTreeSet<String> {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Whether `candidate` is a member.
    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.contains(candidate)
    }

    /// Store vectors for candidates present in `table`; others are left without one.
    ///
    /// Returns the number of candidates that received a vector.
    pub fn attach_vectors(&mut self, table: &VectorTable) -> usize {
        let mut attached = 0;
        for c in &self.candidates {
            if let Some(v) = table.get(c) {
                self.vectors.insert(c.clone(), v.to_vec());
                attached += 1;
            }
        }
        attached
    }

    /// Vector of `candidate`, if attached.
    pub fn vector(&self, candidate: &str) -> Option<&[f32]> {
        self.vectors.get(candidate).map(Vec::as_slice)
    }

    /// Number of candidates carrying a vector.
    pub fn num_vectors(&self) -> usize {
        self.vectors.len()
    }

    /// Candidates that have a vector, and their stacked vectors in the same order.
    pub fn vector_matrix(&self) -> Result<(Vec<String>, Vec<Vec<f32>>)> {
        let mut words = Vec::with_capacity(self.vectors.len());
        let mut rows: Vec<Vec<f32>> = Vec::with_capacity(self.vectors.len());
        for c in &self.candidates {
            if let Some(v) = self.vectors.get(c) {
                if let Some(first) = rows.first() {
                    if first.len() != v.len() {
                        return Err(Error::DimensionMismatch {
                            expected: first.len(),
                            found: v.len(),
                        });
                    }
                }
                words.push(c.clone());
                rows.push(v.clone());
            }
        }
        if rows.is_empty() {
            return Err(Error::EmptyCandidateSet {
                target: self.target.to_string(),
            });
        }
        Ok((words, rows))
    }

    /// Drop candidates (with their vectors) not in `vocabulary`.
    ///
    /// Returns the number of candidates removed.
    pub fn restrict_to_vocabulary(&mut self, vocabulary: &BTreeSet<String>) -> usize {
        let before = self.candidates.len();
        self.candidates.retain(|c| vocabulary.contains(c));
        let kept = &self.candidates;
        self.vectors.retain(|c, _| kept.contains(c));
        before - self.candidates.len()
    }

    /// Run `strategy` on this set.
    pub fn cluster(
        &self,
        strategy: &dyn SenseClusterer,
        signals: Signals<'_>,
    ) -> Result<SenseClustering> {
        strategy.cluster(self, signals)
    }
}
