//! Descriptive statistics over observed columns.

/// Mean of `x`, weighted when `weights` is given.
pub fn weighted_mean(x: &[f64], weights: Option<&[f64]>) -> f64 {
    match weights {
        None => x.iter().sum::<f64>() / x.len() as f64,
        Some(w) => {
            let total: f64 = w.iter().sum();
            x.iter().zip(w).map(|(xi, wi)| xi * wi).sum::<f64>() / total
        }
    }
}

/// Sample standard deviation of `x`.
///
/// Unweighted: denominator n - 1. Weighted: `sqrt(Σw(x-m)² / Σw · n'/(n'-1))`
/// where n' counts the non-zero weights. Returns NaN with fewer than two
/// contributing observations.
pub fn weighted_sd(x: &[f64], weights: Option<&[f64]>) -> f64 {
    let m = weighted_mean(x, weights);
    match weights {
        None => {
            let n = x.len();
            if n < 2 {
                return f64::NAN;
            }
            let ss: f64 = x.iter().map(|xi| (xi - m) * (xi - m)).sum();
            (ss / (n - 1) as f64).sqrt()
        }
        Some(w) => {
            let n_eff = w.iter().filter(|&&wi| wi > 0.0).count();
            if n_eff < 2 {
                return f64::NAN;
            }
            let total: f64 = w.iter().sum();
            let ss: f64 = x
                .iter()
                .zip(w)
                .map(|(xi, wi)| wi * (xi - m) * (xi - m))
                .sum();
            let n_eff = n_eff as f64;
            (ss / total * n_eff / (n_eff - 1.0)).sqrt()
        }
    }
}

/// Number of distinct values in `x`.
pub fn distinct_count(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Minimum and maximum of `x`.
pub fn min_max(x: &[f64]) -> (f64, f64) {
    x.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Median of already sorted values (linear interpolation for even lengths).
pub fn sorted_median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// `n` evenly spaced values from `low` to `high` inclusive.
pub fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_sd() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(weighted_mean(&x, None), 5.0);
        // R: sd(c(2,4,4,4,5,5,7,9)) = 2.13809
        assert_relative_eq!(weighted_sd(&x, None), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_unit_weights_match_unweighted() {
        let x = [1.0, 3.0, 6.0, 10.0];
        let w = [1.0; 4];
        assert_relative_eq!(weighted_mean(&x, Some(&w)), weighted_mean(&x, None));
        assert_relative_eq!(
            weighted_sd(&x, Some(&w)),
            weighted_sd(&x, None),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_weighted_mean() {
        let x = [1.0, 3.0];
        let w = [3.0, 1.0];
        assert_relative_eq!(weighted_mean(&x, Some(&w)), 1.5);
    }

    #[test]
    fn test_sd_needs_two_values() {
        assert!(weighted_sd(&[1.0], None).is_nan());
        assert!(weighted_sd(&[1.0, 2.0], Some(&[1.0, 0.0])).is_nan());
    }

    #[test]
    fn test_distinct_and_range() {
        let x = [3.0, 1.0, 3.0, 2.0];
        assert_eq!(distinct_count(&x), 3);
        assert_eq!(min_max(&x), (1.0, 3.0));
    }

    #[test]
    fn test_median() {
        assert_eq!(sorted_median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(sorted_median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_linspace() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    }
}
