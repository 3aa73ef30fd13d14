//! Paired significance testing for per-query evaluation scores.
//!
//! The paired t-test compares two systems measured on the same queries: it tests whether
//! the mean of the per-query differences is zero. The two-tailed p-value comes from the
//! Student t distribution via the regularized incomplete beta function:
//!
//! ```text
//! p = I_{df / (df + t²)}(df / 2, 1 / 2)
//! ```
//!
//! References:
//! - Smucker, Allan & Carterette (2007). "A comparison of statistical significance tests
//!   for information retrieval evaluation"
//! - Press et al. "Numerical Recipes", §6.1 and §6.4

use crate::Error;
use std::fmt;

/// Result of a paired t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestResult {
    /// t-statistic (positive if the first system scores higher on average).
    pub t_statistic: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Degrees of freedom (`n - 1`).
    pub df: usize,
    /// Mean of `a[i] - b[i]`.
    pub mean_difference: f64,
}

impl TTestResult {
    /// Returns true if the difference is significant at the given alpha level.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for TTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_significant(0.05) { "*" } else { "" };
        write!(
            f,
            "t({})={:.3}, p={:.4}{}",
            self.df, self.t_statistic, self.p_value, marker
        )
    }
}

/// Paired two-tailed t-test of `a` against `b`.
///
/// Edge cases:
/// - unequal lengths are an error (the pairing is broken);
/// - fewer than two pairs, or all differences zero: `t = 0`, `p = 1`;
/// - identical non-zero differences (zero variance): `t = ±∞`, `p = 0`.
pub fn paired_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult, Error> {
    if a.len() != b.len() {
        return Err(Error::SampleLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let n = a.len();
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let mean_difference = if n == 0 {
        0.0
    } else {
        diffs.iter().sum::<f64>() / n as f64
    };

    if n < 2 {
        return Ok(TTestResult {
            t_statistic: 0.0,
            p_value: 1.0,
            df: 0,
            mean_difference,
        });
    }

    let df = n - 1;
    let var = diffs
        .iter()
        .map(|d| (d - mean_difference).powi(2))
        .sum::<f64>()
        / df as f64;
    let se = (var / n as f64).sqrt();

    let (t_statistic, p_value) = if se > 0.0 {
        let t = mean_difference / se;
        (t, t_two_tailed_p(t, df))
    } else if mean_difference == 0.0 {
        (0.0, 1.0)
    } else {
        (f64::INFINITY.copysign(mean_difference), 0.0)
    };

    Ok(TTestResult {
        t_statistic,
        p_value,
        df,
        mean_difference,
    })
}

/// Two-tailed p-value of `t` under Student's t with `df` degrees of freedom.
pub fn t_two_tailed_p(t: f64, df: usize) -> f64 {
    if df == 0 || t.is_nan() {
        return 1.0;
    }
    let df = df as f64;
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Regularized incomplete beta `I_x(a, b)`.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    // The continued fraction converges fastest on this side of the mode.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_cf(a, b, x) / a
    } else {
        1.0 - front * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        // even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        // odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// `ln Γ(x)` for `x > 0` (Lanczos approximation).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for (i, c) in COEFFS.iter().enumerate() {
        ser += c / (x + 1.0 + i as f64);
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}
