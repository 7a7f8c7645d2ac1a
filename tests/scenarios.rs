use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use sensecluster::eval::{gold_length, reconcile};
use sensecluster::io::{read_candidate_sets, read_gold, read_scores};
use sensecluster::{
    run, BaselineGenerator, CandidateSet, Config, Inputs, Method, PairedScorer, ScoreTable,
    Scorer, SenseClusterer, SenseClustering, Signals, Stage, Strategy, TargetWord, VectorTable,
};

fn clustering(clusters: &[(usize, &[&str])]) -> SenseClustering {
    SenseClustering::from_clusters(
        clusters
            .iter()
            .map(|(id, members)| (*id, members.iter().copied())),
    )
}

const INSECTS: [&str; 3] = ["beetle", "insect", "pest"];
const FAULTS: [&str; 3] = ["error", "fault", "glitch"];

/// Mutual paraphrases within each sense; cross-sense pairs are independent.
fn two_sense_tables() -> (ScoreTable, ScoreTable) {
    let mut pp = ScoreTable::new();
    let mut ent = ScoreTable::new();
    let groups = [INSECTS, FAULTS];
    for (gi, g) in groups.iter().enumerate() {
        for a in g {
            for (hi, h) in groups.iter().enumerate() {
                for b in h {
                    if a == b {
                        continue;
                    }
                    if gi == hi {
                        pp.insert(*a, *b, 3.0);
                        ent.insert(*a, *b, 0.1);
                    } else {
                        ent.insert(*a, *b, 0.9);
                    }
                }
            }
        }
    }
    (pp, ent)
}

#[test]
fn partial_agreement_scores_strictly_inside_bounds() {
    let gold = clustering(&[(1, &["a", "b"]), (2, &["c", "d"])]);
    let predicted = clustering(&[(10, &["a", "b", "c"]), (11, &["d"])]);

    let pair = reconcile(&predicted, &gold);
    assert_eq!(pair.predicted, predicted);
    assert_eq!(pair.gold, gold);

    let s = PairedScorer.score("x_n", &pair.predicted, &pair.gold).unwrap();
    for v in [s.precision, s.recall, s.v_measure] {
        assert!(v > 0.0 && v < 1.0);
    }
}

#[test]
fn extra_gold_item_is_dropped_with_emptied_cluster() {
    let gold = clustering(&[(1, &["a", "b", "e"]), (2, &["e"])]);
    let predicted = clustering(&[(0, &["a", "b"])]);
    let pair = reconcile(&predicted, &gold);
    assert_eq!(pair.gold, clustering(&[(1, &["a", "b"])]));
    assert_eq!(gold_length(&gold, &predicted.universe()), 1);
}

#[test]
fn most_frequent_sense_is_below_a_recovered_clustering() {
    let (pp, ent) = two_sense_tables();
    let set = CandidateSet::new(
        TargetWord::new("bug", "n"),
        INSECTS.iter().chain(FAULTS.iter()).copied(),
    );
    let gold = clustering(&[(0, &INSECTS), (1, &FAULTS)]);

    let strategy = Config::default()
        .with_method(Method::Spectral)
        .strategy()
        .unwrap();
    let predicted = strategy.cluster(&set, Signals::new(&pp, &ent)).unwrap();
    let pair = reconcile(&predicted, &gold);
    let scores = PairedScorer.score("bug_n", &pair.predicted, &pair.gold).unwrap();

    let baselines = BaselineGenerator::new(0)
        .score(&PairedScorer, "bug_n", &pair.universe(), &pair.gold)
        .unwrap();
    assert!((scores.v_measure - 1.0).abs() < 1e-9);
    assert!(baselines.mfs_v_measure < scores.v_measure);
}

/// Planted senses of the given sizes: paraphrases and entailment within a sense, plus one
/// vector direction per sense. Returns the set, both tables and the gold clustering.
fn planted(sizes: &[usize]) -> (CandidateSet, ScoreTable, ScoreTable, SenseClustering) {
    let groups: Vec<Vec<String>> = sizes
        .iter()
        .enumerate()
        .map(|(g, &size)| (0..size).map(|i| format!("s{g}m{i}")).collect())
        .collect();
    let mut set = CandidateSet::new(TargetWord::new("bank", "n"), groups.concat());
    let mut pp = ScoreTable::new();
    let mut ent = ScoreTable::new();
    let mut vectors = VectorTable::new();
    for (gi, g) in groups.iter().enumerate() {
        for a in g {
            let mut v = vec![0.0f32; sizes.len() + 1];
            v[gi] = 1.0;
            v[sizes.len()] = 0.1;
            vectors.insert(a.as_str(), v);
            for (hi, h) in groups.iter().enumerate() {
                for b in h.iter().filter(|b| *b != a) {
                    if gi == hi {
                        pp.insert(a.as_str(), b.as_str(), 3.0);
                        ent.insert(a.as_str(), b.as_str(), 0.1);
                    } else {
                        ent.insert(a.as_str(), b.as_str(), 0.9);
                    }
                }
            }
        }
    }
    set.attach_vectors(&vectors);
    let gold = SenseClustering::from_clusters(
        groups
            .iter()
            .enumerate()
            .map(|(g, members)| (g, members.iter().cloned())),
    );
    (set, pp, ent, gold)
}

#[test]
fn every_method_recovers_planted_senses_with_defaults() {
    for sizes in [&[3, 3][..], &[4, 4, 4], &[5, 5, 5, 5], &[2, 3, 5]] {
        let (set, pp, ent, gold) = planted(sizes);
        for method in Method::ALL {
            let out = Strategy::from(method)
                .cluster(&set, Signals::new(&pp, &ent))
                .unwrap();
            assert!(out.is_partition());
            let pair = reconcile(&out, &gold);
            let s = PairedScorer.score("bank_n", &pair.predicted, &pair.gold).unwrap();
            assert_eq!(out.len(), sizes.len(), "{method} on {sizes:?}");
            assert!((s.f_score - 1.0).abs() < 1e-9, "{method} on {sizes:?}");
            assert!((s.v_measure - 1.0).abs() < 1e-9, "{method} on {sizes:?}");
        }
    }
}

#[test]
fn unrelated_candidates_stay_apart() {
    let set = CandidateSet::new(TargetWord::new("bug", "n"), ["insect", "glitch"]);
    let pp = ScoreTable::new();
    let mut ent = ScoreTable::new();
    ent.insert("insect", "glitch", 1.0);
    ent.insert("glitch", "insect", 1.0);
    for method in [Method::Spectral, Method::Hgfc] {
        let out = Strategy::from(method)
            .cluster(&set, Signals::new(&pp, &ent))
            .unwrap();
        assert_eq!(out.len(), 2, "{method}");
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn end_to_end_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let (pp, ent) = two_sense_tables();

    let candidates = write(
        dir.path(),
        "candidates.tsv",
        "# word\tpos\tcandidates\n\
         bug\tn\tbeetle\tinsect\tpest\terror\tfault\tglitch\twiretap\n\
         bank\tn\tshore\tlender\n",
    );
    let gold_path = write(
        dir.path(),
        "gold.tsv",
        "bug\tn\tanimal\tbeetle\tinsect\tpest\n\
         bug\tn\tdefect\terror\tfault\tglitch\n\
         bug\tn\tdevice\tmicrophone\n",
    );
    let pp_path = write(dir.path(), "ppdb.json", &serde_json::to_string(&pp).unwrap());
    let ent_path = write(dir.path(), "ent.json", &serde_json::to_string(&ent).unwrap());
    let config_path = write(
        dir.path(),
        "run.yaml",
        "method: spectral\nbaselines: true\nfilter_by_gold: true\n",
    );

    let config = Config::from_yaml_file(&config_path).unwrap();
    let inputs = Inputs {
        candidate_sets: read_candidate_sets(&candidates).unwrap(),
        gold: read_gold(&gold_path).unwrap(),
        vectors: None,
        paraphrase: Some(read_scores(&pp_path).unwrap()),
        entailment: Some(read_scores(&ent_path).unwrap()),
    };
    let report = run(&config, inputs, &PairedScorer).unwrap();

    // "bank" has no gold: filtered to nothing, then fails clustering.
    assert_eq!(report.summary.words, 1);
    assert_eq!(report.summary.failures.len(), 1);
    assert_eq!(report.summary.failures[0].stage, Stage::Clustering);

    let bug = &report.records[0];
    assert_eq!(bug.target, TargetWord::new("bug", "n"));
    // "device" shares nothing with the filtered candidates.
    assert_eq!(bug.gold_length, 2);
    assert!((bug.scores.f_score - 1.0).abs() < 1e-9);
    assert!(bug.baselines.mfs_v_measure < bug.scores.v_measure);

    let expected: BTreeSet<String> = INSECTS
        .iter()
        .chain(FAULTS.iter())
        .map(|s| s.to_string())
        .collect();
    assert_eq!(bug.actual_solution.universe(), expected);

    let mut csv = Vec::new();
    sensecluster::eval::write_csv(&report.records, &mut csv).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 2);
}

#[test]
fn configuration_errors_abort_before_any_word() {
    let inputs = Inputs {
        candidate_sets: vec![CandidateSet::new(TargetWord::new("bug", "n"), ["insect"])],
        gold: BTreeMap::from([(
            TargetWord::new("bug", "n"),
            clustering(&[(0, &["insect"])]),
        )]),
        vectors: None,
        paraphrase: Some(ScoreTable::new()),
        entailment: None,
    };
    let err = run(&Config::default(), inputs, &PairedScorer).unwrap_err();
    assert!(!err.is_per_word());
    assert!("louvain".parse::<Method>().is_err());
}
