//! Per-word score records, corpus-level aggregation and report output.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use super::baseline::BaselineScores;
use super::score::ClusterScores;
use crate::error::Result;
use crate::sense::{SenseClustering, TargetWord};

/// Scores of one target word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// The target word.
    pub target: TargetWord,
    /// Quality of the predicted clustering.
    pub scores: ClusterScores,
    /// Gold clusters overlapping the predicted candidates.
    pub gold_length: usize,
    /// Gold clustering as scored.
    pub gold_solution: SenseClustering,
    /// Predicted clustering as scored.
    pub actual_solution: SenseClustering,
    /// Baseline scores (all zero when baselines are disabled).
    pub baselines: BaselineScores,
}

/// A numeric column of [`ScoreRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Paired F-score.
    FScore,
    /// Paired precision.
    Precision,
    /// Paired recall.
    Recall,
    /// V-measure.
    VMeasure,
    /// Homogeneity.
    Homogeneity,
    /// Completeness.
    Completeness,
    /// Gold cluster count.
    GoldLength,
}

impl ScoreRecord {
    /// Value of `field`.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::FScore => self.scores.f_score,
            Field::Precision => self.scores.precision,
            Field::Recall => self.scores.recall,
            Field::VMeasure => self.scores.v_measure,
            Field::Homogeneity => self.scores.homogeneity,
            Field::Completeness => self.scores.completeness,
            Field::GoldLength => self.gold_length as f64,
        }
    }
}

/// `Σ value·weight / Σ weight` over `records`; `None` when the weights sum to zero.
pub fn weighted_average(records: &[ScoreRecord], weight: Field, value: Field) -> Option<f64> {
    let (num, den) = records.iter().fold((0.0, 0.0), |(num, den), r| {
        let w = r.get(weight);
        (num + r.get(value) * w, den + w)
    });
    (den > 0.0).then(|| num / den)
}

/// Processing stage at which a target word failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The clustering strategy failed.
    Clustering,
    /// Scoring failed or no gold annotation exists.
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Clustering => f.write_str("clustering"),
            Stage::Scoring => f.write_str("scoring"),
        }
    }
}

/// A target word excluded from the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// The target word.
    pub target: TargetWord,
    /// Where it failed.
    pub stage: Stage,
    /// Error message.
    pub reason: String,
}

/// Corpus-level summary, weighted by gold length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of scored words.
    pub words: usize,
    /// Weighted F-score.
    pub f_score: f64,
    /// Weighted V-measure.
    pub v_measure: f64,
    /// Weighted precision.
    pub precision: f64,
    /// Weighted recall.
    pub recall: f64,
    /// Weighted homogeneity.
    pub homogeneity: f64,
    /// Weighted completeness.
    pub completeness: f64,
    /// Mean gold length (unweighted).
    pub gold_length: f64,
    /// Words that failed clustering or scoring.
    pub failures: Vec<Failure>,
}

impl Summary {
    /// Aggregate `records`; `failures` are carried through for reporting.
    pub fn from_records(records: &[ScoreRecord], failures: Vec<Failure>) -> Self {
        let avg = |f: Field| weighted_average(records, Field::GoldLength, f).unwrap_or(0.0);
        let gold_length = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.gold_length as f64).sum::<f64>() / records.len() as f64
        };
        Self {
            words: records.len(),
            f_score: avg(Field::FScore),
            v_measure: avg(Field::VMeasure),
            precision: avg(Field::Precision),
            recall: avg(Field::Recall),
            homogeneity: avg(Field::Homogeneity),
            completeness: avg(Field::Completeness),
            gold_length,
            failures,
        }
    }

    /// `(label, value)` pairs in report order.
    pub fn lines(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Number of Words", self.words as f64),
            ("F Score", self.f_score),
            ("V Measure", self.v_measure),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("Homogeneity", self.homogeneity),
            ("Completeness", self.completeness),
            ("Gold Length", self.gold_length),
        ]
    }
}

/// Report columns, in order.
pub const CSV_HEADERS: [&str; 17] = [
    "Word",
    "POS",
    "F Score",
    "Precision",
    "Recall",
    "V Measure",
    "Homogeneity",
    "Completeness",
    "Gold Length",
    "Gold Solution",
    "Actual Solution",
    "Rand_VMeas",
    "Rand_FScore",
    "MFS_VMeas",
    "MFS_FScore",
    "1c1par_VMeas",
    "1c1par_FScore",
];

/// One CSV row, fields in [`CSV_HEADERS`] order.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    word: &'a str,
    pos: &'a str,
    f_score: f64,
    precision: f64,
    recall: f64,
    v_measure: f64,
    homogeneity: f64,
    completeness: f64,
    gold_length: usize,
    gold_solution: String,
    actual_solution: String,
    rand_vmeas: f64,
    rand_fscore: f64,
    mfs_vmeas: f64,
    mfs_fscore: f64,
    one_per_item_vmeas: f64,
    one_per_item_fscore: f64,
}

impl<'a> CsvRow<'a> {
    fn from_record(r: &'a ScoreRecord) -> Result<Self> {
        Ok(Self {
            word: r.target.word(),
            pos: r.target.pos(),
            f_score: r.scores.f_score,
            precision: r.scores.precision,
            recall: r.scores.recall,
            v_measure: r.scores.v_measure,
            homogeneity: r.scores.homogeneity,
            completeness: r.scores.completeness,
            gold_length: r.gold_length,
            gold_solution: serde_json::to_string(&r.gold_solution)?,
            actual_solution: serde_json::to_string(&r.actual_solution)?,
            rand_vmeas: r.baselines.random_v_measure,
            rand_fscore: r.baselines.random_f_score,
            mfs_vmeas: r.baselines.mfs_v_measure,
            mfs_fscore: r.baselines.mfs_f_score,
            one_per_item_vmeas: r.baselines.one_per_item_v_measure,
            one_per_item_fscore: r.baselines.one_per_item_f_score,
        })
    }
}

/// Write one CSV row per record after a header row. The header is written even when
/// there are no records.
pub fn write_csv<W: Write>(records: &[ScoreRecord], writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(CSV_HEADERS)?;
    for r in records {
        out.serialize(CsvRow::from_record(r)?)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the summary as pretty JSON.
pub fn write_summary_json<W: Write>(summary: &Summary, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
