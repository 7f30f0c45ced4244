//! Integration test: Full pipeline (series → features → models → ensembles)

use ndarray::{array, s, Array1, Array2, Axis};
use wager_models::ensemble::{
    AveragingRegressor, BaggingConfig, BaggingRegressor, StackingClassifier, StackingConfig,
    VotingClassifier,
};
use wager_models::evaluation::{accuracy, cross_validate_regressor};
use wager_models::feature_engineering::{
    lag_matrix, polynomial_features, rolling, FeatureFrame, OneHotEncoder, RollingStat,
    TargetEncoder,
};
use wager_models::preprocessing::{min_max, z_score};
use wager_models::timeseries::{
    arima_forecast, difference, linear_trend, simple_moving_average, ArimaConfig,
};
use wager_models::training::{
    Classifier, DecisionTreeClassifier, GaussianNaiveBayes, KnnClassifier, LinearRegression,
    ProbabilisticClassifier, Regressor,
};

/// Points per game rising by 1.5 every game
fn scoring_series() -> Array1<f64> {
    (0..20).map(|t| 100.0 + 1.5 * t as f64).collect()
}

fn interleaved_games(n: usize) -> (Array2<f64>, Vec<&'static str>) {
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        let home = i % 2 == 0;
        let spread = (i % 5) as f64 * 0.5;
        match (j, home) {
            (0, true) => 10.0 + spread,
            (0, false) => -10.0 - spread,
            _ => ((i * 3) % 5) as f64 * 0.5 - 1.0,
        }
    });
    let y = (0..n).map(|i| if i % 2 == 0 { "home" } else { "away" }).collect();
    (x, y)
}

#[test]
fn test_forecasters_agree_on_a_linear_series() {
    let series = scoring_series();

    // Autoregression on the previous game
    let (x, y) = lag_matrix(&series, &[1]).unwrap();
    assert_eq!(x.nrows(), 19);
    let mut ar = LinearRegression::new();
    Regressor::fit(&mut ar, &x, &y).unwrap();
    let next_from_lag = Regressor::predict(&ar, array![series[19]].view()).unwrap();

    let next_from_trend = linear_trend(&series).unwrap().forecast(1)[0];
    let next_from_arima = arima_forecast(&series, &ArimaConfig::default(), 1).unwrap()[0];

    for next in [next_from_lag, next_from_trend, next_from_arima] {
        assert!((next - 130.0).abs() < 1e-9, "forecast {}", next);
    }
}

#[test]
fn test_smoothing_and_rolling_features_line_up() {
    let series = scoring_series();
    let sma = simple_moving_average(&series, 4).unwrap();
    let rolling_mean = rolling(&series, 4, RollingStat::Mean).unwrap();

    assert_eq!(sma.len(), series.len() - 3);
    assert!(rolling_mean[..3].iter().all(Option::is_none));
    for (i, value) in sma.iter().enumerate() {
        let aligned = rolling_mean[i + 3].unwrap();
        assert!((aligned - value).abs() < 1e-9);
    }

    let diffs = difference(&series, 1).unwrap();
    assert!(diffs.iter().all(|d| (d - 1.5).abs() < 1e-9));
}

#[test]
fn test_normalized_features_feed_a_classifier() {
    let (raw, y) = interleaved_games(20);

    // Normalize each column independently, then train on the result
    let mut x = Array2::<f64>::zeros(raw.raw_dim());
    for (j, column) in raw.axis_iter(Axis(1)).enumerate() {
        x.column_mut(j).assign(&z_score(column).unwrap());
    }
    for column in x.axis_iter(Axis(1)) {
        let mean = column.sum() / column.len() as f64;
        assert!(mean.abs() < 1e-9);
    }

    let mut knn = KnnClassifier::with_k(3).unwrap();
    knn.fit(&x, &y).unwrap();
    let predicted = knn.predict_batch(&x).unwrap();
    assert!((accuracy(&y, &predicted).unwrap() - 1.0).abs() < 1e-12);

    let scaled = min_max(raw.column(0)).unwrap();
    assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_team_encodings_and_interactions() {
    let teams = ["BOS", "NYK", "BOS", "LAL", "NYK", "LAL"];
    let margins = array![7.0, -3.0, 5.0, 2.0, -1.0, 4.0];

    let mut target = TargetEncoder::new();
    target.fit(&teams, &margins).unwrap();
    let encoded = target.transform(&["BOS", "NYK", "LAL", "MIA"]).unwrap();
    assert_eq!(encoded.slice(s![..3]), array![6.0, -2.0, 3.0]);
    // Unseen team falls back to the league-wide mean
    assert!((encoded[3] - 14.0 / 6.0).abs() < 1e-12);

    let mut one_hot = OneHotEncoder::new();
    let indicators = one_hot.fit_transform(&teams).unwrap();
    assert_eq!(indicators.dim(), (6, 3));
    assert!(indicators.rows().into_iter().all(|row| row.sum() == 1.0));

    let frame = FeatureFrame::new(
        vec!["rating", "rest"],
        array![[1.0, 2.0], [3.0, 0.0], [-1.0, 1.0]],
    )
    .unwrap();
    let expanded = polynomial_features(&frame);
    assert_eq!(expanded.data().ncols(), 5);
    assert_eq!(expanded.column("rating").unwrap(), array![1.0, 3.0, -1.0]);
}

#[test]
fn test_voting_ensemble_of_mixed_models() {
    let (x, y) = interleaved_games(20);
    let members: Vec<Box<dyn Classifier<&'static str>>> = vec![
        Box::new(DecisionTreeClassifier::<&str>::default()),
        Box::new(GaussianNaiveBayes::<&str>::default()),
        Box::new(KnnClassifier::<&str>::with_k(3).unwrap()),
    ];
    let mut ensemble = VotingClassifier::new(members).unwrap();
    ensemble.fit(&x, &y).unwrap();

    assert_eq!(ensemble.predict(array![11.0, 0.5].view()).unwrap(), "home");
    assert_eq!(ensemble.predict(array![-11.0, 0.5].view()).unwrap(), "away");
}

#[test]
fn test_stacking_on_base_probabilities() {
    let (x, y) = interleaved_games(30);

    let mut stack = StackingClassifier::<
        Box<dyn ProbabilisticClassifier<&'static str>>,
        DecisionTreeClassifier<&'static str>,
        &'static str,
    >::new(StackingConfig::default(), DecisionTreeClassifier::default)
    .unwrap()
    .add_base_model(|| {
        Box::new(GaussianNaiveBayes::<&str>::default())
            as Box<dyn ProbabilisticClassifier<&'static str>>
    })
    .add_base_model(|| {
        Box::new(KnnClassifier::<&str>::with_k(3).unwrap_or_default())
            as Box<dyn ProbabilisticClassifier<&'static str>>
    });
    stack.fit(&x, &y).unwrap();

    assert_eq!(stack.classes(), &["home", "away"]);
    assert_eq!(stack.base_models().len(), 2);
    assert_eq!(stack.predict(array![10.5, 0.0].view()).unwrap(), "home");
    assert_eq!(stack.predict(array![-10.5, 0.0].view()).unwrap(), "away");
}

#[test]
fn test_cross_validated_regression_ensembles() {
    let x = Array2::from_shape_fn((15, 1), |(i, _)| i as f64);
    let y: Array1<f64> = x.column(0).mapv(|v| -0.5 * v + 48.0);

    let bagged = cross_validate_regressor(
        || {
            let config = BaggingConfig {
                n_estimators: 5,
                seed: Some(17),
            };
            BaggingRegressor::new(config, LinearRegression::new)
                .unwrap_or_else(|e| panic!("valid config rejected: {}", e))
        },
        &x,
        &y,
        3,
    )
    .unwrap();
    for score in &bagged.fold_scores {
        assert!((score - 1.0).abs() < 1e-9);
    }

    let averaged = cross_validate_regressor(
        || {
            AveragingRegressor::new(vec![LinearRegression::new(), LinearRegression::new()])
                .and_then(|ensemble| ensemble.with_weights(vec![2.0, 1.0]))
                .unwrap_or_else(|e| panic!("valid weights rejected: {}", e))
        },
        &x,
        &y,
        5,
    )
    .unwrap();
    assert!((averaged.mean - 1.0).abs() < 1e-9);
}
