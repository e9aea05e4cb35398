//! Common test utilities and data generators.

use anofox_interactions::core::{DegreesOfFreedom, FactorColumn, FittedModelSummary, ModelFrame};
use faer::linalg::solvers::{Llt, Solve};
use faer::{Mat, Side};

/// Install a test logger once; repeated calls are ignored.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `state.x77` rows: (Income, Illiteracy, Murder, HS Grad).
#[allow(dead_code)]
pub const STATES: [(f64, f64, f64, f64); 50] = [
    (3624.0, 2.1, 15.1, 41.3), // Alabama
    (6315.0, 1.5, 11.3, 66.7),
    (4530.0, 1.8, 7.8, 58.1),
    (3378.0, 1.9, 10.1, 39.9),
    (5114.0, 1.1, 10.3, 62.6),
    (4884.0, 0.7, 6.8, 63.9),
    (5348.0, 1.1, 3.1, 56.0),
    (4809.0, 0.9, 6.2, 54.6),
    (4815.0, 1.3, 10.7, 52.6),
    (4091.0, 2.0, 13.9, 40.6),
    (4963.0, 1.9, 6.2, 61.9), // Hawaii
    (4119.0, 0.6, 5.3, 59.5),
    (5107.0, 0.9, 10.3, 52.6),
    (4458.0, 0.7, 7.1, 52.9),
    (4628.0, 0.5, 2.3, 59.0),
    (4669.0, 0.6, 4.5, 59.9),
    (3712.0, 1.6, 10.6, 38.5),
    (3545.0, 2.8, 13.2, 42.2),
    (3694.0, 0.7, 2.7, 54.7),
    (5299.0, 0.9, 8.5, 52.3),
    (4755.0, 1.1, 3.3, 58.5), // Massachusetts
    (4751.0, 0.9, 11.1, 52.8),
    (4675.0, 0.6, 2.3, 57.6),
    (3098.0, 2.4, 12.5, 41.0),
    (4254.0, 0.8, 9.3, 48.8),
    (4347.0, 0.6, 5.0, 59.2),
    (4508.0, 0.6, 2.9, 59.3),
    (5149.0, 0.5, 11.5, 65.2),
    (4281.0, 0.7, 3.3, 57.6),
    (5237.0, 1.1, 5.2, 52.5),
    (3601.0, 2.2, 9.7, 55.2), // New Mexico
    (4903.0, 1.4, 10.9, 52.7),
    (3875.0, 1.8, 11.1, 38.5),
    (5087.0, 0.8, 1.4, 50.3),
    (4561.0, 0.8, 7.4, 53.2),
    (3983.0, 1.1, 6.4, 51.6),
    (4660.0, 0.6, 4.2, 60.0),
    (4449.0, 1.0, 6.1, 50.2),
    (4558.0, 1.3, 2.4, 46.4),
    (3635.0, 2.3, 11.6, 37.8),
    (4167.0, 0.5, 1.7, 53.3), // South Dakota
    (3821.0, 1.7, 11.0, 41.8),
    (4188.0, 2.2, 12.2, 47.4),
    (4022.0, 0.6, 4.5, 67.3),
    (3907.0, 0.6, 5.5, 57.1),
    (4701.0, 1.4, 9.5, 47.8),
    (4864.0, 0.6, 4.3, 63.5),
    (3617.0, 1.4, 6.7, 41.6),
    (4468.0, 0.7, 3.0, 54.5),
    (4566.0, 0.6, 6.9, 62.9), // Wyoming
];

/// One column of the states data.
#[allow(dead_code)]
pub fn states_column(pick: fn(&(f64, f64, f64, f64)) -> f64) -> Vec<f64> {
    STATES.iter().map(pick).collect()
}

/// Frame with Illiteracy, Murder and HS Grad.
#[allow(dead_code)]
pub fn states_frame() -> ModelFrame {
    ModelFrame::builder()
        .continuous("Illiteracy", states_column(|r| r.1))
        .continuous("Murder", states_column(|r| r.2))
        .continuous("HS Grad", states_column(|r| r.3))
        .build()
        .unwrap()
}

/// `Income ~ Illiteracy * Murder` fitted by OLS.
#[allow(dead_code)]
pub fn states_model() -> FittedModelSummary {
    let ill = states_column(|r| r.1);
    let mur = states_column(|r| r.2);
    let inter: Vec<f64> = ill.iter().zip(&mur).map(|(a, b)| a * b).collect();
    fit_ols(
        &states_column(|r| r.0),
        &[
            ("Illiteracy", ill),
            ("Murder", mur),
            ("Illiteracy:Murder", inter),
        ],
    )
}

/// Ordinary least squares with an intercept, returning the model summary.
///
/// The covariance is `s² (X'X)⁻¹`, with `(X'X)⁻¹` from faer's Cholesky factor.
#[allow(dead_code)]
pub fn fit_ols(y: &[f64], columns: &[(&str, Vec<f64>)]) -> FittedModelSummary {
    let n = y.len();
    let p = columns.len() + 1;
    let x = Mat::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { columns[j - 1].1[i] });

    let xtx = x.transpose() * x.as_ref();
    let llt = Llt::new(xtx.as_ref(), Side::Lower).expect("X'X is positive definite");
    let inv = llt.solve(Mat::<f64>::identity(p, p).as_ref());

    let xty: Vec<f64> = (0..p)
        .map(|a| (0..n).map(|i| x[(i, a)] * y[i]).sum())
        .collect();
    let beta: Vec<f64> = (0..p)
        .map(|a| (0..p).map(|b| inv[(a, b)] * xty[b]).sum())
        .collect();
    let rss: f64 = (0..n)
        .map(|i| {
            let fitted: f64 = (0..p).map(|j| x[(i, j)] * beta[j]).sum();
            (y[i] - fitted).powi(2)
        })
        .sum();
    let df = n - p;
    let sigma2 = rss / df as f64;
    // symmetrize to remove solve round-off
    let vcov = Mat::from_fn(p, p, |a, b| sigma2 * 0.5 * (inv[(a, b)] + inv[(b, a)]));

    let mut names = vec!["(Intercept)".to_string()];
    names.extend(columns.iter().map(|(name, _)| name.to_string()));
    FittedModelSummary::builder()
        .coefficients(names, beta)
        .covariance(vcov)
        .degrees_of_freedom(DegreesOfFreedom::Finite(df))
        .build()
        .unwrap()
}

/// Deterministic uniform values in [-1, 1).
#[allow(dead_code)]
pub fn uniform(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            2.0 * ((state >> 33) as f64) / ((1u64 << 31) as f64) - 1.0
        })
        .collect()
}

/// Elementwise product of columns.
#[allow(dead_code)]
pub fn product(columns: &[&[f64]]) -> Vec<f64> {
    (0..columns[0].len())
        .map(|i| columns.iter().map(|c| c[i]).product())
        .collect()
}

/// Synthetic three-way data: continuous `x`, `m`, `w` and response `y`.
#[allow(dead_code)]
pub fn three_way_data(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = uniform(n, 11).iter().map(|u| 5.0 + 2.0 * u).collect();
    let m: Vec<f64> = uniform(n, 23).iter().map(|u| 10.0 + 4.0 * u).collect();
    let w: Vec<f64> = uniform(n, 37).iter().map(|u| 1.0 + u).collect();
    let noise = uniform(n, 41);
    let y = (0..n)
        .map(|i| {
            1.0 + 0.5 * x[i] + 0.3 * m[i] + 0.2 * w[i] + 0.4 * x[i] * m[i]
                - 0.1 * x[i] * w[i]
                + 0.05 * m[i] * w[i]
                + 0.2 * x[i] * m[i] * w[i]
                + noise[i]
        })
        .collect();
    (x, m, w, y)
}

/// Fit `y ~ x * m * w` on [`three_way_data`].
#[allow(dead_code)]
pub fn three_way_model(n: usize) -> (FittedModelSummary, ModelFrame) {
    let (x, m, w, y) = three_way_data(n);
    let model = fit_ols(
        &y,
        &[
            ("x", x.clone()),
            ("m", m.clone()),
            ("w", w.clone()),
            ("x:m", product(&[&x[..], &m[..]])),
            ("x:w", product(&[&x[..], &w[..]])),
            ("m:w", product(&[&m[..], &w[..]])),
            ("x:m:w", product(&[&x[..], &m[..], &w[..]])),
        ],
    );
    let frame = ModelFrame::builder()
        .continuous("x", x)
        .continuous("m", m)
        .continuous("w", w)
        .build()
        .unwrap();
    (model, frame)
}

/// Synthetic data with a three-level factor moderator `g` (levels a, b, c).
#[allow(dead_code)]
pub fn factor_model(n: usize) -> (FittedModelSummary, ModelFrame) {
    let x: Vec<f64> = uniform(n, 5).iter().map(|u| 3.0 * u).collect();
    let noise = uniform(n, 7);
    let labels: Vec<&str> = (0..n).map(|i| ["a", "b", "c"][i % 3]).collect();
    let gb: Vec<f64> = labels.iter().map(|&l| if l == "b" { 1.0 } else { 0.0 }).collect();
    let gc: Vec<f64> = labels.iter().map(|&l| if l == "c" { 1.0 } else { 0.0 }).collect();
    let y: Vec<f64> = (0..n)
        .map(|i| 2.0 + 1.0 * x[i] + 0.5 * gb[i] - 0.5 * gc[i] + 1.5 * x[i] * gb[i] - 1.0 * x[i] * gc[i] + 0.5 * noise[i])
        .collect();
    let model = fit_ols(
        &y,
        &[
            ("x", x.clone()),
            ("gb", gb.clone()),
            ("gc", gc.clone()),
            ("x:gb", product(&[&x[..], &gb[..]])),
            ("x:gc", product(&[&x[..], &gc[..]])),
        ],
    );
    let frame = ModelFrame::builder()
        .continuous("x", x)
        .factor("g", FactorColumn::from_labels(&labels[..]).unwrap())
        .build()
        .unwrap();
    (model, frame)
}
