//! Three-way interactions: `y ~ x * m * w`.

mod common;

use anofox_interactions::prelude::*;
use approx::assert_relative_eq;
use common::{fit_ols, product, three_way_data, three_way_model, uniform};

fn raw_value(point: &ModeratorPoint, plan: &CenteringPlan) -> f64 {
    match point.value {
        ModeratorValue::Continuous(v) => plan.to_raw(&point.variable, v),
        ModeratorValue::Level(_) => panic!("expected a continuous moderator"),
    }
}

#[test]
fn test_cartesian_grid_second_moderator_slowest() {
    let (summary, frame) = three_way_model(80);
    let options = ProbeOptions::builder("x", "m").mod2("w").build().unwrap();
    let result = SimpleSlopesEngine::new(options)
        .analyze(&summary, &frame)
        .unwrap();

    assert_eq!(result.mod2.as_deref(), Some("w"));
    assert_eq!(result.slopes.len(), 9);
    let labels: Vec<(String, String)> = result
        .slopes
        .iter()
        .map(|s| (s.mod2.as_ref().unwrap().label.clone(), s.modx.label.clone()))
        .collect();
    assert_eq!(labels[0], ("- 1 SD".to_string(), "- 1 SD".to_string()));
    assert_eq!(labels[1], ("- 1 SD".to_string(), "Mean".to_string()));
    assert_eq!(labels[3], ("Mean".to_string(), "- 1 SD".to_string()));
    assert_eq!(labels[8], ("+ 1 SD".to_string(), "+ 1 SD".to_string()));
    assert_eq!(result.slopes_at_mod2("Mean").len(), 3);
}

#[test]
fn test_slopes_match_manual_combination() {
    let (summary, frame) = three_way_model(80);
    let options = ProbeOptions::builder("x", "m").mod2("w").build().unwrap();
    let result = SimpleSlopesEngine::new(options)
        .analyze(&summary, &frame)
        .unwrap();

    let b = |name: &str| summary.estimate(name).unwrap();
    let cov = |a: &str, c: &str| summary.covariance_of(a, c).unwrap();
    let names = ["x", "x:m", "x:w", "x:m:w"];

    for row in &result.slopes {
        let mv = raw_value(&row.modx, &result.centering);
        let wv = raw_value(row.mod2.as_ref().unwrap(), &result.centering);
        let weights = [1.0, mv, wv, mv * wv];

        let estimate: f64 = names.iter().zip(&weights).map(|(n, w)| w * b(n)).sum();
        let mut variance = 0.0;
        for (a, wa) in names.iter().zip(&weights) {
            for (c, wc) in names.iter().zip(&weights) {
                variance += wa * wc * cov(a, c);
            }
        }
        assert_relative_eq!(row.slope.estimate, estimate, max_relative = 1e-9);
        assert_relative_eq!(row.slope.std_error, variance.sqrt(), max_relative = 1e-7);
    }
}

#[test]
fn test_interval_per_second_moderator_value() {
    let (summary, frame) = three_way_model(80);
    let options = ProbeOptions::builder("x", "m").mod2("w").build().unwrap();
    let result = SimpleSlopesEngine::new(options)
        .with_johnson_neyman(JohnsonNeymanOptions::default())
        .analyze(&summary, &frame)
        .unwrap();

    assert_eq!(result.johnson_neyman.len(), 3);
    let labels: Vec<&str> = result
        .johnson_neyman
        .iter()
        .map(|jn| jn.mod2.as_ref().unwrap().label.as_str())
        .collect();
    assert_eq!(labels, vec!["- 1 SD", "Mean", "+ 1 SD"]);

    // every slope row agrees with the interval for its second-moderator value
    for row in &result.slopes {
        let jn = result
            .johnson_neyman
            .iter()
            .find(|jn| jn.mod2 == row.mod2)
            .unwrap();
        if let ModeratorValue::Continuous(v) = row.modx.value {
            let near_bound = jn.bound_values().iter().any(|b| (b - v).abs() < 1e-6);
            if !near_bound {
                assert_eq!(row.slope.is_significant(0.05), jn.is_significant_at(v));
            }
        }
    }
}

#[test]
fn test_fdr_adjusted_per_second_moderator_value() {
    let (summary, frame) = three_way_model(80);
    let options = ProbeOptions::builder("x", "m").mod2("w").build().unwrap();
    let intervals = JohnsonNeymanSolver::new(
        JohnsonNeymanOptions::builder()
            .control_fdr(true)
            .build()
            .unwrap(),
    )
    .solve(&summary, &frame, &options)
    .unwrap();

    let nominal = ReferenceDistribution::StudentT(72.0)
        .critical_value(0.05)
        .unwrap();
    assert_eq!(intervals.len(), 3);
    for jn in &intervals {
        assert!(jn.fdr_adjusted);
        assert!(jn.critical_value >= nominal - 1e-12);
    }
}

#[test]
fn test_missing_three_way_term() {
    let (x, m, w, y) = three_way_data(60);
    let summary = fit_ols(
        &y,
        &[
            ("x", x.clone()),
            ("m", m.clone()),
            ("w", w.clone()),
            ("x:m", product(&[&x[..], &m[..]])),
            ("x:w", product(&[&x[..], &w[..]])),
        ],
    );
    let frame = ModelFrame::builder()
        .continuous("x", x)
        .continuous("m", m)
        .continuous("w", w)
        .build()
        .unwrap();
    let options = ProbeOptions::builder("x", "m").mod2("w").build().unwrap();
    let err = SimpleSlopesEngine::new(options)
        .analyze(&summary, &frame)
        .unwrap_err();
    match &err {
        ProbeError::MissingTerm { term } => assert_eq!(term, "x:m:w"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_factor_second_moderator() {
    // y ~ x * m * g with g in {a, b, c}
    let n = 90;
    let x: Vec<f64> = uniform(n, 5).iter().map(|u| 3.0 * u).collect();
    let m: Vec<f64> = uniform(n, 97).iter().map(|u| 2.0 * u).collect();
    let noise = uniform(n, 101);
    let labels: Vec<&str> = (0..n).map(|i| ["a", "b", "c"][i % 3]).collect();
    let gb: Vec<f64> = labels.iter().map(|&l| if l == "b" { 1.0 } else { 0.0 }).collect();
    let gc: Vec<f64> = labels.iter().map(|&l| if l == "c" { 1.0 } else { 0.0 }).collect();
    let y: Vec<f64> = (0..n)
        .map(|i| x[i] + 0.5 * x[i] * m[i] + x[i] * m[i] * gb[i] + 0.3 * noise[i])
        .collect();

    let summary = fit_ols(
        &y,
        &[
            ("x", x.clone()),
            ("m", m.clone()),
            ("gb", gb.clone()),
            ("gc", gc.clone()),
            ("x:m", product(&[&x[..], &m[..]])),
            ("x:gb", product(&[&x[..], &gb[..]])),
            ("x:gc", product(&[&x[..], &gc[..]])),
            ("m:gb", product(&[&m[..], &gb[..]])),
            ("m:gc", product(&[&m[..], &gc[..]])),
            ("x:m:gb", product(&[&x[..], &m[..], &gb[..]])),
            ("x:m:gc", product(&[&x[..], &m[..], &gc[..]])),
        ],
    );
    let frame = ModelFrame::builder()
        .continuous("x", x)
        .continuous("m", m)
        .factor("g", FactorColumn::from_labels(&labels[..]).unwrap())
        .build()
        .unwrap();

    let options = ProbeOptions::builder("x", "m")
        .mod2("g")
        .modx_values(ModeratorValues::Explicit(vec![1.0]))
        .centering(CenteringPolicy::None)
        .build()
        .unwrap();
    let result = SimpleSlopesEngine::new(options)
        .with_johnson_neyman(JohnsonNeymanOptions::default())
        .analyze(&summary, &frame)
        .unwrap();

    assert_eq!(result.slopes.len(), 3);
    let b = |name: &str| summary.estimate(name).unwrap();
    let expected = [
        b("x") + b("x:m"),
        b("x") + b("x:m") + b("x:gb") + b("x:m:gb"),
        b("x") + b("x:m") + b("x:gc") + b("x:m:gc"),
    ];
    for (row, &e) in result.slopes.iter().zip(&expected) {
        assert_relative_eq!(row.slope.estimate, e, max_relative = 1e-9);
    }
    assert_eq!(
        result.slopes[1].mod2.as_ref().unwrap().value,
        ModeratorValue::Level("b".to_string())
    );
    assert_eq!(result.johnson_neyman.len(), 3);
}
