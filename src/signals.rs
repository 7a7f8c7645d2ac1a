//! Read-only similarity signal tables shared by all target words.
//!
//! Three tables are loaded once per run and then handed to the pipeline by reference:
//!
//! - [`VectorTable`]: word → distributional vector (one dimensionality per corpus)
//! - a paraphrase-probability [`ScoreTable`]: directed `p(paraphrase | word)`-like scores
//! - an entailment [`ScoreTable`]: directed non-entailment probability ("independent")

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directed pairwise scores: `from → to → score`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    scores: HashMap<String, HashMap<String, f32>>,
}

impl ScoreTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directed score `from → to`.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, score: f32) {
        self.scores
            .entry(from.into())
            .or_default()
            .insert(to.into(), score);
    }

    /// Directed score `from → to`, if recorded.
    pub fn get(&self, from: &str, to: &str) -> Option<f32> {
        self.scores.get(from).and_then(|row| row.get(to)).copied()
    }

    /// Mean of the two directed scores; a missing direction counts as absent, not zero.
    pub fn symmetric(&self, a: &str, b: &str) -> Option<f32> {
        match (self.get(a, b), self.get(b, a)) {
            (Some(x), Some(y)) => Some(0.5 * (x + y)),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        }
    }

    /// Number of source words.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Word → dense distributional vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorTable {
    vectors: HashMap<String, Vec<f32>>,
}

impl VectorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the vector of `word`.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(word.into(), vector);
    }

    /// Vector of `word`, if present.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    /// Number of words with a vector.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared dimensionality; errors if two vectors disagree.
    pub fn dimension(&self) -> Result<Option<usize>> {
        let mut dim: Option<usize> = None;
        for v in self.vectors.values() {
            match dim {
                None => dim = Some(v.len()),
                Some(d) if d != v.len() => {
                    return Err(Error::DimensionMismatch {
                        expected: d,
                        found: v.len(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(dim)
    }
}

/// The directed score tables a strategy consults, passed by reference.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    /// Paraphrase-probability table.
    pub paraphrase: &'a ScoreTable,
    /// Non-entailment probability table.
    pub entailment: &'a ScoreTable,
}

impl<'a> Signals<'a> {
    /// Bundle the two tables.
    pub fn new(paraphrase: &'a ScoreTable, entailment: &'a ScoreTable) -> Self {
        Self {
            paraphrase,
            entailment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_score_averages_both_directions() {
        let mut t = ScoreTable::new();
        t.insert("a", "b", 0.2);
        t.insert("b", "a", 0.6);
        t.insert("a", "c", 0.5);
        assert!((t.symmetric("a", "b").unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(t.symmetric("c", "a"), Some(0.5));
        assert_eq!(t.symmetric("b", "c"), None);
    }

    #[test]
    fn vector_table_dimension_mismatch() {
        let mut v = VectorTable::new();
        v.insert("a", vec![1.0, 0.0]);
        v.insert("b", vec![1.0, 0.0, 0.0]);
        assert!(matches!(v.dimension(), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn score_table_deserializes_nested_json() {
        let t: ScoreTable = serde_json::from_str(r#"{"bug": {"insect": 3.5}}"#).unwrap();
        assert_eq!(t.get("bug", "insect"), Some(3.5));
        assert_eq!(t.len(), 1);
    }
}
