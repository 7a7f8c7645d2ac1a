//! Batch driver: prepare candidate sets, cluster every target word, score against gold
//! and aggregate.
//!
//! Words are processed one at a time. A per-word error ([`Error::is_per_word`]) is logged
//! with the word's identity, recorded as a [`Failure`] and the loop moves on; any other
//! error aborts the run. Missing input tables are detected in [`run`] before the first
//! word is touched.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::candidates::CandidateSet;
use crate::cluster::{Method, SenseClusterer};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::eval::{
    gold_length, reconcile, BaselineGenerator, BaselineScores, Failure, ScoreRecord, Scorer,
    Stage, Summary,
};
use crate::sense::{SenseClustering, TargetWord};
use crate::signals::{ScoreTable, Signals, VectorTable};

/// Everything a run reads, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// One candidate set per target word.
    pub candidate_sets: Vec<CandidateSet>,
    /// Gold clusterings keyed by target word.
    pub gold: BTreeMap<TargetWord, SenseClustering>,
    /// Distributional vectors (needed by `semclust`).
    pub vectors: Option<VectorTable>,
    /// Paraphrase-probability scores.
    pub paraphrase: Option<ScoreTable>,
    /// Non-entailment scores (needed by `spectral` and `hgfc`).
    pub entailment: Option<ScoreTable>,
}

impl Inputs {
    /// Fail with [`Error::Configuration`] when a table `method` depends on is absent.
    pub fn check(&self, method: Method) -> Result<()> {
        let missing = |what: &str| {
            Error::Configuration(format!("method '{method}' requires the {what} table"))
        };
        if self.paraphrase.is_none() {
            return Err(missing("paraphrase"));
        }
        if method.requires_vectors() && self.vectors.is_none() {
            return Err(missing("vector"));
        }
        if method.requires_entailment() && self.entailment.is_none() {
            return Err(missing("entailment"));
        }
        if self.gold.is_empty() {
            return Err(Error::Configuration(
                "gold annotations are empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Attach vectors to every set and, when `filter_by_gold` holds, drop candidates outside
/// the target word's gold vocabulary.
pub fn prepare(
    sets: &mut [CandidateSet],
    vectors: Option<&VectorTable>,
    gold: &BTreeMap<TargetWord, SenseClustering>,
    filter_by_gold: bool,
) {
    let empty = BTreeSet::new();
    for set in sets.iter_mut() {
        if filter_by_gold {
            let vocabulary = gold.get(set.target()).map(SenseClustering::universe);
            let removed = set.restrict_to_vocabulary(vocabulary.as_ref().unwrap_or(&empty));
            debug!(target_word = %set.target(), removed, "filtered to gold vocabulary");
        }
        if let Some(table) = vectors {
            let attached = set.attach_vectors(table);
            debug!(target_word = %set.target(), attached, "attached vectors");
        }
    }
}

/// Clusterings of every word that succeeded, plus the words that did not.
#[derive(Debug, Clone, Default)]
pub struct Clustered {
    /// Successful clusterings.
    pub clusterings: BTreeMap<TargetWord, SenseClustering>,
    /// Words whose strategy failed.
    pub failures: Vec<Failure>,
}

/// Run `strategy` on every set, isolating per-word failures.
pub fn cluster_all(
    strategy: &dyn SenseClusterer,
    sets: &[CandidateSet],
    signals: Signals<'_>,
) -> Result<Clustered> {
    let mut out = Clustered::default();
    for set in sets {
        match set.cluster(strategy, signals) {
            Ok(c) => {
                debug!(target_word = %set.target(), clusters = c.len(), "clustered");
                out.clusterings.insert(set.target().clone(), c);
            }
            Err(e) if e.is_per_word() => {
                warn!(target_word = %set.target(), error = %e, "clustering failed; skipping word");
                out.failures.push(Failure {
                    target: set.target().clone(),
                    stage: Stage::Clustering,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        strategy = strategy.name(),
        clustered = out.clusterings.len(),
        failed = out.failures.len(),
        "clustering finished"
    );
    Ok(out)
}

/// Scores predicted clusterings against gold through a [`Scorer`].
pub struct Evaluator<'a, S: Scorer + ?Sized> {
    scorer: &'a S,
    baselines: Option<BaselineGenerator>,
}

impl<'a, S: Scorer + ?Sized> Evaluator<'a, S> {
    /// Evaluator without baselines.
    pub fn new(scorer: &'a S) -> Self {
        Self {
            scorer,
            baselines: None,
        }
    }

    /// Also score the baselines of every word.
    pub fn with_baselines(mut self, generator: BaselineGenerator) -> Self {
        self.baselines = Some(generator);
        self
    }

    /// Reconcile and score one word.
    pub fn score_word(
        &self,
        target: &TargetWord,
        predicted: &SenseClustering,
        gold: &SenseClustering,
    ) -> Result<ScoreRecord> {
        let name = target.scoring_name();
        let gold_len = gold_length(gold, &predicted.universe());
        let pair = reconcile(predicted, gold);
        let scores = self.scorer.score(&name, &pair.predicted, &pair.gold)?;
        let baselines = match &self.baselines {
            Some(generator) => generator.score(self.scorer, &name, &pair.universe(), &pair.gold)?,
            None => BaselineScores::default(),
        };
        Ok(ScoreRecord {
            target: target.clone(),
            scores,
            gold_length: gold_len,
            gold_solution: pair.gold,
            actual_solution: pair.predicted,
            baselines,
        })
    }

    /// Score every clustering. Words without gold, or whose scoring fails, become
    /// [`Stage::Scoring`] failures.
    pub fn score_all(
        &self,
        clusterings: &BTreeMap<TargetWord, SenseClustering>,
        gold: &BTreeMap<TargetWord, SenseClustering>,
    ) -> Result<(Vec<ScoreRecord>, Vec<Failure>)> {
        let mut records = Vec::with_capacity(clusterings.len());
        let mut failures = Vec::new();
        for (target, predicted) in clusterings {
            let result = match gold.get(target) {
                Some(g) => self.score_word(target, predicted, g),
                None => Err(Error::Scoring {
                    target: target.to_string(),
                    reason: "no gold annotation".to_string(),
                }),
            };
            match result {
                Ok(r) => records.push(r),
                Err(e) if e.is_per_word() => {
                    warn!(target_word = %target, error = %e, "scoring failed; skipping word");
                    failures.push(Failure {
                        target: target.clone(),
                        stage: Stage::Scoring,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok((records, failures))
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Per-word scores, in target-word order.
    pub records: Vec<ScoreRecord>,
    /// Every predicted clustering, scored or not.
    pub clusterings: BTreeMap<TargetWord, SenseClustering>,
    /// Corpus-level summary, including all failures.
    pub summary: Summary,
}

/// Cluster and evaluate every target word in `inputs`.
pub fn run<S: Scorer + ?Sized>(config: &Config, inputs: Inputs, scorer: &S) -> Result<Report> {
    let strategy = config.strategy()?;
    inputs.check(config.method)?;

    let Inputs {
        mut candidate_sets,
        gold,
        vectors,
        paraphrase,
        entailment,
    } = inputs;
    let paraphrase = paraphrase.unwrap_or_default();
    let entailment = entailment.unwrap_or_default();
    let signals = Signals::new(&paraphrase, &entailment);

    info!(
        method = %config.method,
        words = candidate_sets.len(),
        baselines = config.baselines,
        filter_by_gold = config.filter_by_gold,
        "starting run"
    );
    prepare(
        &mut candidate_sets,
        vectors.as_ref(),
        &gold,
        config.filter_by_gold,
    );

    let clustered = cluster_all(&strategy, &candidate_sets, signals)?;

    let mut evaluator = Evaluator::new(scorer);
    if config.baselines {
        evaluator = evaluator.with_baselines(config.baseline_generator());
    }
    let (records, scoring_failures) = evaluator.score_all(&clustered.clusterings, &gold)?;

    let mut failures = clustered.failures;
    failures.extend(scoring_failures);
    let summary = Summary::from_records(&records, failures);
    info!(
        scored = summary.words,
        failed = summary.failures.len(),
        f_score = summary.f_score,
        v_measure = summary.v_measure,
        "run finished"
    );

    Ok(Report {
        records,
        clusterings: clustered.clusterings,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::PairedScorer;

    fn gold() -> BTreeMap<TargetWord, SenseClustering> {
        let mut g = BTreeMap::new();
        g.insert(
            TargetWord::new("bug", "n"),
            SenseClustering::from_clusters([
                (0, vec!["insect", "beetle"]),
                (1, vec!["glitch", "error"]),
            ]),
        );
        g
    }

    fn inputs() -> Inputs {
        let mut vectors = VectorTable::new();
        vectors.insert("insect", vec![1.0, 0.0]);
        vectors.insert("beetle", vec![0.95, 0.05]);
        vectors.insert("glitch", vec![0.0, 1.0]);
        vectors.insert("error", vec![0.05, 0.95]);
        Inputs {
            candidate_sets: vec![
                CandidateSet::new(
                    TargetWord::new("bug", "n"),
                    ["insect", "beetle", "glitch", "error", "wiretap"],
                ),
                CandidateSet::new(TargetWord::new("bank", "n"), ["shore", "lender"]),
            ],
            gold: gold(),
            vectors: Some(vectors),
            paraphrase: Some(ScoreTable::new()),
            entailment: None,
        }
    }

    #[test]
    fn missing_tables_are_fatal() {
        let mut i = inputs();
        i.paraphrase = None;
        assert!(matches!(
            i.check(Method::SemClust),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            inputs().check(Method::Hgfc),
            Err(Error::Configuration(_))
        ));
        assert!(inputs().check(Method::SemClust).is_ok());
    }

    #[test]
    fn run_fails_fast_without_entailment() {
        let config = Config::default().with_method(Method::Spectral);
        let err = run(&config, inputs(), &PairedScorer).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn failed_words_do_not_stop_the_batch() {
        let config = Config::default().with_method(Method::SemClust);
        let report = run(&config, inputs(), &PairedScorer).unwrap();

        // "bank" has no vectors: clustering fails, the run continues.
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.summary.words, 1);
        assert_eq!(report.summary.failures.len(), 1);
        assert_eq!(report.summary.failures[0].target, TargetWord::new("bank", "n"));
        assert_eq!(report.summary.failures[0].stage, Stage::Clustering);

        let bug = &report.records[0];
        assert_eq!(bug.gold_length, 2);
        assert!((bug.scores.f_score - 1.0).abs() < 1e-12);
        assert!(!bug.actual_solution.universe().contains("wiretap"));
    }

    #[test]
    fn words_without_gold_are_scoring_failures() {
        let mut i = inputs();
        i.vectors
            .as_mut()
            .unwrap()
            .insert("shore", vec![1.0, 1.0]);
        let config = Config::default().with_method(Method::SemClust);
        let report = run(&config, i, &PairedScorer).unwrap();
        let bank = report
            .summary
            .failures
            .iter()
            .find(|f| f.target.word() == "bank")
            .unwrap();
        assert_eq!(bank.stage, Stage::Scoring);
        assert!(report.clusterings.contains_key(&TargetWord::new("bank", "n")));
    }

    #[test]
    fn gold_filter_restricts_candidates() {
        let mut sets = inputs().candidate_sets;
        prepare(&mut sets, None, &gold(), true);
        assert_eq!(sets[0].len(), 4);
        assert!(!sets[0].contains("wiretap"));
        // No gold for "bank": nothing survives.
        assert!(sets[1].is_empty());
    }

    #[test]
    fn baselines_are_scored_when_enabled() {
        let config = Config::default()
            .with_method(Method::SemClust)
            .with_baselines(true);
        let report = run(&config, inputs(), &PairedScorer).unwrap();
        let b = report.records[0].baselines;
        assert_eq!(b.mfs_v_measure, 0.0);
        assert_eq!(b.one_per_item_f_score, 0.0);
        assert!(report.records[0].scores.v_measure > b.mfs_v_measure);
    }
}
