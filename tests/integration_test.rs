// Integration tests for bagdist
use bagdist::divergence::{entropy, jensen_shannon, mixture};
use bagdist::prelude::*;
use bagdist::StepOutcome;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn test_concrete_vectorization() {
    let bags = strings(&["aa", "ab", "bbb"]);
    let metric = Metric::builder(bags.iter())
        .item_weights(HashMap::from([('a', 1.0), ('b', 2.0)]))
        .bag_weights(HashMap::from([
            ("aa".to_string(), 1.0),
            ("ab".to_string(), 2.0),
            ("bbb".to_string(), 3.0),
        ]))
        .build()
        .unwrap();

    let ab = metric.vectorize(&bags[1..2]).unwrap();
    let bbb = metric.vectorize(&bags[2..3]).unwrap();
    let both = metric.vectorize(&bags[1..3]).unwrap();

    // Items are indexed in first-seen order: 'a' then 'b'.
    assert!(ab.cosine_distance(&Vector::new(vec![2.0, 4.0])).abs() < 1e-12);
    assert!(bbb.cosine_distance(&Vector::new(vec![0.0, 18.0])).abs() < 1e-12);
    assert!((&both - &(&ab + &bbb)).norm() < 1e-12);
}

#[test]
fn test_tfidf_defaults() {
    let bags = strings(&["ab", "a", "aa", "aaa", "bb"]);
    let metric = Metric::new(bags.iter()).unwrap();
    assert_eq!(metric.space().count_bags_containing_item(&'a'), 4);
    assert_eq!(metric.space().count_bags_containing_item(&'z'), 0);

    let raw_a = (5.0f64 / 4.0).ln();
    let raw_b = (5.0f64 / 2.0).ln();
    let weights = metric.item_weights().unwrap();
    assert!((weights[&'a'] - raw_a / (raw_a + raw_b)).abs() < 1e-12);
    assert!((weights[&'b'] - raw_b / (raw_a + raw_b)).abs() < 1e-12);
}

#[test]
fn test_learning_from_json_claims() {
    init_tracing();
    let bags = strings(&["abb", "aa", "baa", "bbb"]);
    let mut metric = Metric::new(bags.iter()).unwrap();

    let claims: Vec<OracleClaim<String>> = serde_json::from_str(
        r#"[
            {"first": ["abb"], "second": ["aa"], "interval": [0.0, 0.2]},
            {"first": ["aa"], "second": ["baa"], "interval": [0.0, 0.05]}
        ]"#,
    )
    .unwrap();
    let config: LearnConfig = serde_json::from_str(r#"{"seed": 5, "epochs": 8}"#).unwrap();

    let before: Vec<f64> = claims
        .iter()
        .map(|claim| metric.distance(&claim.first, &claim.second).unwrap())
        .collect();
    let report = metric.learn(&claims, &config).unwrap();
    assert_eq!(report.epochs, 8);
    assert!(report.applied > 0);

    for (claim, before) in claims.iter().zip(before) {
        let after = metric.distance(&claim.first, &claim.second).unwrap();
        assert!(after < before);
    }
    assert!(metric.item_weights_vector().iter().all(|w| *w > 0.0));
    assert!(metric.bag_weights_vector().iter().all(|w| *w > 0.0));
}

#[test]
fn test_seeded_learning_is_reproducible() {
    let bags = strings(&["aa", "ab", "bbb", "ba"]);
    let claims = vec![
        OracleClaim::new(strings(&["ab"]), strings(&["bbb"]), Interval::new(0.5, 0.6).unwrap()),
        OracleClaim::new(strings(&["aa"]), strings(&["ba", "ab"]), Interval::new(0.0, 0.1).unwrap()),
        OracleClaim::new(strings(&["ba"]), strings(&["bbb"]), Interval::new(0.3, 0.4).unwrap()),
    ];
    let config = LearnConfig {
        seed: Some(99),
        ..LearnConfig::default()
    };

    let mut first = Metric::new(bags.iter()).unwrap();
    let mut second = Metric::new(bags.iter()).unwrap();
    first.learn(&claims, &config).unwrap();
    second.learn(&claims, &config).unwrap();
    assert_eq!(first.item_weights_vector(), second.item_weights_vector());
    assert_eq!(first.bag_weights_vector(), second.bag_weights_vector());
}

#[test]
fn test_single_step_reports_target() {
    let bags = vec![vec![1u32, 1], vec![1, 2], vec![2, 2, 2]];
    let mut metric = Metric::new(bags.iter()).unwrap();
    let claim = OracleClaim::new(
        vec![bags[1].clone()],
        vec![bags[2].clone()],
        Interval::new(0.9, 1.0).unwrap(),
    );
    let current = metric.distance(&claim.first, &claim.second).unwrap();

    let learner = Learner::new(LearnConfig::default()).unwrap();
    match learner.step(&mut metric, &claim).unwrap() {
        StepOutcome::Applied { from, target } => {
            assert_eq!(from, current);
            assert!((target - (current + 0.5 * (0.9 - current))).abs() < 1e-12);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let moved = metric.distance(&claim.first, &claim.second).unwrap();
    assert!(moved > current);
}

#[test]
fn test_fit_custom_form() {
    init_tracing();
    let bags = strings(&["aa", "ab", "bbb"]);
    let mut metric = Metric::new(bags.iter()).unwrap();

    // Squared norm of a single vectorization
    let form: Arc<dyn Form> = Arc::new(FnForm::new(
        1,
        |v: &[Vector]| v[0].dot(&v[0]),
        |v: &[Vector]| vec![&v[0] * 2.0],
    ));
    let arguments = vec![strings(&["ab", "bbb"])];
    let start = metric.vectorize(&arguments[0]).unwrap().dot(&metric.vectorize(&arguments[0]).unwrap());

    let fitter = Fitter::new(FitConfig {
        speed: 1.0,
        gradient_steps: 50,
        ..FitConfig::default()
    })
    .unwrap();
    let report = fitter
        .fit_target(&mut metric, form, arguments.clone(), 2.0 * start)
        .unwrap();
    assert!(report.converged);

    let reached = metric.vectorize(&arguments[0]).unwrap();
    assert!((reached.dot(&reached) - 2.0 * start).abs() < 1e-6);
}

#[test]
fn test_unknown_keys_from_config() {
    let bags = strings(&["aa", "ab"]);
    let strict = Metric::new(bags.iter()).unwrap();
    let unknown = strings(&["zz"]);
    assert!(matches!(
        strict.distance(&bags[..1], &unknown),
        Err(Error::UnknownBag(_))
    ));

    let config: MetricConfig = serde_json::from_str(r#"{"unknown_keys": "ignore"}"#).unwrap();
    assert_eq!(config.unknown_keys, UnknownKeyPolicy::Ignore);
    let lenient = Metric::builder(bags.iter()).config(config).build().unwrap();
    let mixed = strings(&["ab", "zz"]);
    assert!(lenient.distance(&bags[1..2], &mixed).unwrap().abs() < 1e-12);
}

#[test]
fn test_jensen_shannon_matches_entropy_identity() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let mut draw = || {
            let raw: Vec<f64> = (0..6).map(|_| rng.random_range(0.01..1.0)).collect();
            let total: f64 = raw.iter().sum();
            raw.into_iter().map(|x| x / total).collect::<Vec<f64>>()
        };
        let p0 = draw();
        let p1 = draw();

        let m = mixture(&p0, &p1).unwrap();
        let expected = (entropy(&m) - 0.5 * (entropy(&p0) + entropy(&p1))).sqrt();
        let result = jensen_shannon(&p0, &p1).unwrap();
        assert!((result.distance - expected).abs() < 1e-9);
        assert!(result.distance > 0.0);
        assert!(result.distance <= 1.0);
        assert!(jensen_shannon(&p0, &p0).unwrap().distance.abs() < 1e-7);
    }

    assert!(matches!(
        jensen_shannon(&[0.5, 0.5], &[1.0]),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_shared_metric() {
    let bags = strings(&["abb", "aa", "baa", "bbb"]);
    let shared = SharedMetric::new(Metric::new(bags.iter()).unwrap());
    let snapshot = shared.snapshot();

    let claims = vec![OracleClaim::new(
        strings(&["abb"]),
        strings(&["aa"]),
        Interval::new(0.0, 0.2).unwrap(),
    )];
    shared.learn(&claims, &LearnConfig::default()).unwrap();

    let learned = shared.distance(&claims[0].first, &claims[0].second).unwrap();
    let original = snapshot.distance(&claims[0].first, &claims[0].second).unwrap();
    assert!(learned < original);
}
