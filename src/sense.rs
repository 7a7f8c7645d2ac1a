//! Target words and sense clusterings.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ambiguous (surface form, part-of-speech) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetWord {
    word: String,
    pos: String,
}

impl TargetWord {
    /// Create a target word.
    pub fn new(word: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
        }
    }

    /// Surface form.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Part-of-speech tag.
    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// Name handed to the scorer (`word_pos`).
    pub fn scoring_name(&self) -> String {
        format!("{}_{}", self.word, self.pos)
    }
}

impl fmt::Display for TargetWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.word, self.pos)
    }
}

/// A grouping of candidate paraphrases into sense clusters.
///
/// Cluster ids are opaque and carry no meaning across runs. Clusterings produced by
/// the strategies are partitions; gold annotations may place one candidate in more
/// than one cluster, which the scorer tolerates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenseClustering {
    clusters: BTreeMap<usize, BTreeSet<String>>,
}

impl SenseClustering {
    /// Create an empty clustering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(cluster_id, members)` pairs. Members of a repeated id are merged.
    pub fn from_clusters<I, S>(clusters: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut out = Self::new();
        for (id, members) in clusters {
            out.clusters
                .entry(id)
                .or_default()
                .extend(members.into_iter().map(Into::into));
        }
        out
    }

    /// Build a partition from one label per item.
    ///
    /// `items` and `labels` must have the same length; extra entries of the longer
    /// slice are ignored.
    pub fn from_labels(items: &[String], labels: &[usize]) -> Self {
        let mut out = Self::new();
        for (item, &label) in items.iter().zip(labels) {
            out.clusters.entry(label).or_default().insert(item.clone());
        }
        out
    }

    /// Add `member` to cluster `id`, creating the cluster if needed.
    pub fn insert(&mut self, id: usize, member: impl Into<String>) {
        self.clusters.entry(id).or_default().insert(member.into());
    }

    /// Insert a whole cluster, replacing any cluster with the same id.
    pub fn insert_cluster(&mut self, id: usize, members: BTreeSet<String>) {
        self.clusters.insert(id, members);
    }

    /// Members of cluster `id`.
    pub fn get(&self, id: usize) -> Option<&BTreeSet<String>> {
        self.clusters.get(&id)
    }

    /// Iterate `(id, members)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<String>)> {
        self.clusters.iter().map(|(id, members)| (*id, members))
    }

    /// Iterate cluster member sets in id order.
    pub fn member_sets(&self) -> impl Iterator<Item = &BTreeSet<String>> {
        self.clusters.values()
    }

    /// Number of clusters (empty ones included).
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether there are no clusters at all.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Union of all cluster members.
    pub fn universe(&self) -> BTreeSet<String> {
        self.clusters.values().flatten().cloned().collect()
    }

    /// Whether no candidate appears in two clusters.
    pub fn is_partition(&self) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        self.clusters
            .values()
            .flatten()
            .all(|member| seen.insert(member.as_str()))
    }

    /// Copy without empty clusters.
    pub fn without_empty(&self) -> Self {
        Self {
            clusters: self
                .clusters
                .iter()
                .filter(|(_, members)| !members.is_empty())
                .map(|(id, members)| (*id, members.clone()))
                .collect(),
        }
    }

    /// Copy with every cluster intersected with `universe`; clusters left empty are dropped.
    pub fn restricted_to(&self, universe: &BTreeSet<String>) -> Self {
        Self {
            clusters: self
                .clusters
                .iter()
                .filter_map(|(id, members)| {
                    let kept: BTreeSet<String> = members.intersection(universe).cloned().collect();
                    (!kept.is_empty()).then_some((*id, kept))
                })
                .collect(),
        }
    }

    /// Copy keeping the lowest-id representative of each distinct member set.
    pub fn deduplicated(&self) -> Self {
        let mut seen: HashSet<&BTreeSet<String>> = HashSet::with_capacity(self.clusters.len());
        Self {
            clusters: self
                .clusters
                .iter()
                .filter(|(_, members)| seen.insert(*members))
                .map(|(id, members)| (*id, members.clone()))
                .collect(),
        }
    }

    /// Number of distinct member sets.
    pub fn distinct_member_sets(&self) -> usize {
        self.clusters.values().collect::<HashSet<_>>().len()
    }

    /// Cluster ids each member belongs to.
    pub(crate) fn memberships(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut out: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (id, members) in &self.clusters {
            for m in members {
                out.entry(m.as_str()).or_default().push(*id);
            }
        }
        out
    }
}

impl FromIterator<(usize, BTreeSet<String>)> for SenseClustering {
    fn from_iter<T: IntoIterator<Item = (usize, BTreeSet<String>)>>(iter: T) -> Self {
        Self {
            clusters: iter.into_iter().collect(),
        }
    }
}
