//! Loaders for candidate sets, gold annotations and signal tables, and a writer for
//! clustering results.
//!
//! Text formats are tab separated, one record per line; blank lines and lines starting
//! with `#` are ignored.
//!
//! | input | line format |
//! |-------|-------------|
//! | candidate sets | `word  pos  cand  cand …` |
//! | gold senses | `word  pos  sense_id  member  member …` (one line per sense) |
//!
//! Vector and score tables are JSON objects (`{word: [f32]}` and `{word: {word: f32}}`).

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::sense::{SenseClustering, TargetWord};
use crate::signals::{ScoreTable, VectorTable};

/// Non-empty, non-comment lines with their 1-based numbers.
fn records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(l) => {
                let trimmed = l.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok((i + 1, trimmed.to_string())))
                }
            }
            Err(e) => Some(Err(Error::Io(e))),
        })
}

fn parse_error(source_name: &str, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        source_name: source_name.to_string(),
        line,
        message: message.into(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Parse candidate sets. Repeated targets merge their candidates.
pub fn parse_candidate_sets<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<CandidateSet>> {
    let mut merged: BTreeMap<TargetWord, Vec<String>> = BTreeMap::new();
    for rec in records(reader) {
        let (line, text) = rec?;
        let mut fields = text.split('\t').map(str::trim).filter(|f| !f.is_empty());
        let (Some(word), Some(pos)) = (fields.next(), fields.next()) else {
            return Err(parse_error(source_name, line, "expected word and POS"));
        };
        merged
            .entry(TargetWord::new(word, pos))
            .or_default()
            .extend(fields.map(str::to_string));
    }
    Ok(merged
        .into_iter()
        .map(|(target, cands)| CandidateSet::new(target, cands))
        .collect())
}

/// Read candidate sets from a file.
pub fn read_candidate_sets(path: impl AsRef<Path>) -> Result<Vec<CandidateSet>> {
    let path = path.as_ref();
    parse_candidate_sets(open(path)?, &path.display().to_string())
}

/// Parse gold clusterings.
///
/// Sense labels are numbered per target word in order of first appearance; lines sharing
/// a label add to the same cluster.
pub fn parse_gold<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<BTreeMap<TargetWord, SenseClustering>> {
    let mut gold: BTreeMap<TargetWord, SenseClustering> = BTreeMap::new();
    let mut labels: HashMap<TargetWord, HashMap<String, usize>> = HashMap::new();
    for rec in records(reader) {
        let (line, text) = rec?;
        let mut fields = text.split('\t').map(str::trim).filter(|f| !f.is_empty());
        let (Some(word), Some(pos), Some(sense)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(parse_error(source_name, line, "expected word, POS and sense id"));
        };
        let target = TargetWord::new(word, pos);
        let ids = labels.entry(target.clone()).or_default();
        let next = ids.len();
        let id = *ids.entry(sense.to_string()).or_insert(next);

        let clustering = gold.entry(target).or_default();
        let mut any = false;
        for member in fields {
            clustering.insert(id, member);
            any = true;
        }
        if !any {
            return Err(parse_error(
                source_name,
                line,
                format!("sense '{sense}' has no members"),
            ));
        }
    }
    Ok(gold)
}

/// Read gold clusterings from a file.
pub fn read_gold(path: impl AsRef<Path>) -> Result<BTreeMap<TargetWord, SenseClustering>> {
    let path = path.as_ref();
    parse_gold(open(path)?, &path.display().to_string())
}

/// Read a JSON vector table. All vectors must share one dimension.
pub fn read_vectors(path: impl AsRef<Path>) -> Result<VectorTable> {
    let table: VectorTable = serde_json::from_reader(open(path.as_ref())?)?;
    table.dimension()?;
    Ok(table)
}

/// Read a JSON score table (paraphrase or entailment).
pub fn read_scores(path: impl AsRef<Path>) -> Result<ScoreTable> {
    Ok(serde_json::from_reader(open(path.as_ref())?)?)
}

/// Write clusterings as a JSON object keyed by `word.pos`.
pub fn write_clusterings_json<W: Write>(
    clusterings: &BTreeMap<TargetWord, SenseClustering>,
    writer: W,
) -> Result<()> {
    let keyed: BTreeMap<String, &SenseClustering> = clusterings
        .iter()
        .map(|(t, c)| (t.to_string(), c))
        .collect();
    serde_json::to_writer_pretty(writer, &keyed)?;
    Ok(())
}
