use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use sensecluster::cluster::{Clustering, Kmeans, Method, SenseClusterer, Strategy};
use sensecluster::eval::reconcile;
use sensecluster::{
    BaselineGenerator, CandidateSet, PairedScorer, ScoreTable, SenseClustering, Signals,
    TargetWord, VectorTable,
};

/// `n` candidates in `senses` planted groups with noisy signals.
fn planted(n: usize, senses: usize, rng: &mut StdRng) -> (CandidateSet, ScoreTable, ScoreTable) {
    let words: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
    let mut set = CandidateSet::new(TargetWord::new("bank", "n"), words.clone());
    let mut pp = ScoreTable::new();
    let mut ent = ScoreTable::new();
    let mut vectors = VectorTable::new();
    for i in 0..n {
        let mut v: Vec<f32> = (0..16).map(|_| rng.random::<f32>() * 0.2).collect();
        v[i % senses] += 1.0;
        vectors.insert(words[i].as_str(), v);
        for j in 0..n {
            if i == j {
                continue;
            }
            let same = i % senses == j % senses;
            let noise = rng.random::<f32>() * 0.2;
            if same {
                pp.insert(words[i].as_str(), words[j].as_str(), 2.0 + noise);
            }
            let indep = if same { 0.1 } else { 0.8 };
            ent.insert(words[i].as_str(), words[j].as_str(), indep + noise);
        }
    }
    set.attach_vectors(&vectors);
    (set, pp, ent)
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    let mut rng = StdRng::seed_from_u64(42);
    let (set, pp, ent) = planted(40, 4, &mut rng);

    for method in Method::ALL {
        let strategy = Strategy::from(method);
        group.bench_function(format!("{}_n40_k4", method), |b| {
            b.iter(|| {
                strategy
                    .cluster(black_box(&set), Signals::new(&pp, &ent))
                    .unwrap()
            })
        });
    }
    group.finish();
}

/// The discretization step of spectral clustering, on embedding-sized rows.
fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<Vec<f32>> = (0..200)
        .map(|i| {
            let mut row: Vec<f32> = (0..4).map(|_| rng.random::<f32>() * 0.1).collect();
            row[i % 4] += 1.0;
            row
        })
        .collect();

    group.bench_function("fit_predict_n200_d4_k4", |b| {
        b.iter(|| {
            let model = Kmeans::new(4).with_max_iter(10).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });
    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    let items: Vec<String> = (0..60).map(|i| format!("c{i}")).collect();
    let gold_labels: Vec<usize> = (0..60).map(|i| i % 5).collect();
    let predicted_labels: Vec<usize> = (0..60).map(|i| i % 7).collect();
    let gold = SenseClustering::from_labels(&items, &gold_labels);
    let predicted = SenseClustering::from_labels(&items, &predicted_labels);

    group.bench_function("reconcile_and_baselines_n60", |b| {
        b.iter(|| {
            let pair = reconcile(black_box(&predicted), black_box(&gold));
            BaselineGenerator::new(0)
                .score(&PairedScorer, "bank_n", &pair.universe(), &pair.gold)
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_kmeans, bench_evaluation);
criterion_main!(benches);
