// src/analytics/extremes.rs
//! Extreme Value Statistics for Storm Return Periods
//!
//! # Block Maxima (GEV)
//!
//! Annual maxima follow a generalized extreme value law. The return period of
//! a level Z is the reciprocal of the annual exceedance probability:
//! ```text
//! P(Z) = 1 − exp(−(1 + ξ(Z−μ)/σ)^(−1/ξ))      ξ ≠ 0
//! P(Z) = 1 − exp(−exp(−(Z−μ)/σ))              ξ = 0 (Gumbel)
//! T(Z) = 1 / P(Z)
//! ```
//!
//! # Peaks Over Threshold (GPD)
//!
//! Declustered exceedances of a threshold u follow a generalized Pareto law,
//! arriving at rate λ = n / years:
//! ```text
//! S(Z) = (1 + ξ(Z−u)/σ)^(−1/ξ)                ξ ≠ 0
//! S(Z) = exp(−(Z−u)/σ)                        ξ = 0
//! T(Z) = 1 / (λ · S(Z))
//! ```
//!
//! # Combining Estimates
//!
//! Independent return-period estimates, each with a 95% interval (l, u) and a
//! record length in years, are pooled with
//! ```text
//! var_i = ((u_i − l_i) / 3.92)²
//! w_i   = ½ · (1/var_i) / Σ(1/var) + ½ · years_i / Σ years
//! T     = Σ w_i T_i,    sd = √(Σ w_i² var_i)
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime};
use rand_distr::{Distribution, Gumbel};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{validation::*, DrawError, DrawResult};
use crate::math_utils::{mean, sorted_quantile};
use crate::rng;

const DAYS_PER_YEAR: f64 = 365.2425;

/// Published (value, lower, upper, years) estimates of the May 2024 storm's
/// return period across indices and methods.
pub const PUBLISHED_ESTIMATES: [(f64, f64, f64, f64); 11] = [
    (17.2, 14.2, 20.2, 23.0),
    (5.4, 3.1, 13.6, 44.0),
    (14.6, 5.8, 23.4, 64.0),
    (22.0, 6.0, 38.0, 40.0),
    (16.0, 5.6, 26.5, 40.0),
    (9.3, 4.3, 14.3, 49.0),
    (10.5, 4.0, 16.1, 49.0),
    (9.8, 5.6, 29.4, 150.0),
    (11.3, 8.1, 16.8, 92.0),
    (16.3, 10.4, 29.7, 39.0),
    (11.1, 7.3, 18.9, 39.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub value: f64,
}

pub fn gev_return_period(xi: f64, mu: f64, sigma: f64, z: f64) -> DrawResult<f64> {
    validate_finite("xi", xi)?;
    validate_finite("mu", mu)?;
    validate_positive("sigma", sigma)?;
    validate_finite("z", z)?;

    let p = if xi != 0.0 {
        let base = 1.0 + xi * (z - mu) / sigma;
        if base <= 0.0 {
            // Below the lower endpoint (ξ > 0) every year exceeds; beyond the
            // upper endpoint (ξ < 0) none does.
            return Ok(if xi > 0.0 { 1.0 } else { f64::INFINITY });
        }
        1.0 - (-base.powf(-1.0 / xi)).exp()
    } else {
        1.0 - (-(-(z - mu) / sigma).exp()).exp()
    };
    Ok(1.0 / p)
}

pub fn gpd_return_period(
    xi: f64,
    sigma: f64,
    u: f64,
    n_events: usize,
    years: f64,
    z: f64,
) -> DrawResult<f64> {
    validate_finite("xi", xi)?;
    validate_positive("sigma", sigma)?;
    validate_finite("u", u)?;
    validate_positive("years", years)?;
    validate_finite("z", z)?;
    validate_len(1, n_events)?;

    let survival = if xi != 0.0 {
        let base = 1.0 + xi * (z - u) / sigma;
        if base <= 0.0 {
            return Ok(f64::INFINITY);
        }
        base.powf(-1.0 / xi)
    } else {
        (-(z - u) / sigma).exp()
    };
    let rate = n_events as f64 / years;
    Ok(1.0 / (rate * survival))
}

/// Largest value of each calendar year, in year order.
pub fn annual_maxima(observations: &[Observation]) -> Vec<f64> {
    let mut maxima: BTreeMap<i32, f64> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        maxima
            .entry(obs.time.year())
            .and_modify(|m| *m = m.max(obs.value))
            .or_insert(obs.value);
    }
    maxima.into_values().collect()
}

/// Gumbel (ξ = 0 GEV) fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GumbelFit {
    pub loc: f64,
    pub scale: f64,
    pub n: usize,
}

impl GumbelFit {
    pub fn return_period(&self, z: f64) -> DrawResult<f64> {
        gev_return_period(0.0, self.loc, self.scale, z)
    }

    /// Level exceeded on average once every `period` years
    pub fn return_level(&self, period: f64) -> DrawResult<f64> {
        if period <= 1.0 {
            return Err(DrawError::InvalidParameters {
                parameter: "period".to_string(),
                value: period,
                constraint: "must exceed 1 year".to_string(),
            });
        }
        Ok(self.loc - self.scale * (-(1.0 - 1.0 / period).ln()).ln())
    }
}

/// Maximum-likelihood Gumbel fit by Newton iteration on the scale.
///
/// The scale solves
/// ```text
/// β = x̄ − Σ xᵢ e^(−xᵢ/β) / Σ e^(−xᵢ/β)
/// ```
/// and the location follows as μ = −β ln( (1/n) Σ e^(−xᵢ/β) ). Values are
/// shifted by their minimum before exponentiation.
pub fn fit_gumbel(maxima: &[f64]) -> DrawResult<GumbelFit> {
    validate_len(2, maxima.len())?;
    for &x in maxima {
        validate_finite("maxima", x)?;
    }
    let n = maxima.len() as f64;
    let x_bar = mean(maxima);
    let var = maxima.iter().map(|x| (x - x_bar).powi(2)).sum::<f64>() / (n - 1.0);
    validate_positive("maxima variance", var)?;

    let x_min = maxima.iter().cloned().fold(f64::INFINITY, f64::min);
    let shifted: Vec<f64> = maxima.iter().map(|x| x - x_min).collect();
    let s_bar = x_bar - x_min;

    let weighted = |beta: f64| {
        let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
        for &x in &shifted {
            let w = (-x / beta).exp();
            s0 += w;
            s1 += x * w;
            s2 += x * x * w;
        }
        (s0, s1 / s0, s2 / s0)
    };

    // Method-of-moments start: β = √6 s / π
    let mut beta = (6.0 * var).sqrt() / std::f64::consts::PI;
    let mut converged = false;
    for _ in 0..100 {
        let (_, m1, m2) = weighted(beta);
        let f = beta - s_bar + m1;
        let df = 1.0 + (m2 - m1 * m1) / (beta * beta);
        let step = f / df;
        let next = beta - step;
        beta = if next > 0.0 { next } else { beta / 2.0 };
        if step.abs() < 1e-10 * beta {
            converged = true;
            break;
        }
    }
    if !converged {
        warn!(scale = beta, "Gumbel fit did not converge in 100 iterations");
    }

    let (s0, _, _) = weighted(beta);
    let loc = x_min - beta * (s0 / n).ln();
    debug!(loc, scale = beta, n = maxima.len(), "Gumbel fit");
    Ok(GumbelFit {
        loc,
        scale: beta,
        n: maxima.len(),
    })
}

/// Cluster maxima of exceedances above `threshold`.
///
/// Exceedances closer than `run` to the previous exceedance join its
/// cluster; each cluster contributes its largest observation.
pub fn decluster_peaks(
    observations: &[Observation],
    threshold: f64,
    run: Duration,
) -> Vec<Observation> {
    let mut peaks: Vec<Observation> = Vec::new();
    let mut last_time: Option<NaiveDateTime> = None;

    for obs in observations.iter().filter(|o| o.value > threshold) {
        let joins = last_time.map_or(false, |t| obs.time - t <= run);
        match peaks.last_mut() {
            Some(peak) if joins => {
                if obs.value > peak.value {
                    *peak = *obs;
                }
            }
            _ => peaks.push(*obs),
        }
        last_time = Some(obs.time);
    }
    peaks
}

/// Generalized Pareto fit of threshold excesses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpdFit {
    /// Shape ξ (positive = heavy tail)
    pub xi: f64,
    pub sigma: f64,
    pub threshold: f64,
    pub n_events: usize,
    pub years: f64,
}

impl GpdFit {
    pub fn return_period(&self, z: f64) -> DrawResult<f64> {
        gpd_return_period(
            self.xi,
            self.sigma,
            self.threshold,
            self.n_events,
            self.years,
            z,
        )
    }
}

/// Probability-weighted-moment estimates `(ξ, σ)` for GPD excesses.
///
/// With plotting positions pⱼ = (j − 0.35)/n on the sorted sample,
/// ```text
/// a₀ = x̄,  a₁ = (1/n) Σ (1 − pⱼ) x₍ⱼ₎
/// k  = a₀/(a₀ − 2a₁) − 2,   σ = 2a₀a₁/(a₀ − 2a₁),   ξ = −k
/// ```
pub fn fit_gpd_pwm(excesses: &[f64]) -> DrawResult<(f64, f64)> {
    validate_len(3, excesses.len())?;
    let mut sorted = excesses.to_vec();
    for &x in &sorted {
        validate_finite("excess", x)?;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let a0 = mean(&sorted);
    let a1 = sorted
        .iter()
        .enumerate()
        .map(|(j, x)| (1.0 - (j as f64 + 1.0 - 0.35) / n) * x)
        .sum::<f64>()
        / n;
    let denom = a0 - 2.0 * a1;
    validate_positive("a0 - 2a1", denom)?;

    let k = a0 / denom - 2.0;
    let sigma = 2.0 * a0 * a1 / denom;
    validate_positive("sigma", sigma)?;
    Ok((-k, sigma))
}

/// Decluster, fit a GPD to the excesses and attach the event rate.
pub fn fit_gpd_pot(observations: &[Observation], threshold: f64, run: Duration) -> DrawResult<GpdFit> {
    validate_len(2, observations.len())?;
    let peaks = decluster_peaks(observations, threshold, run);
    let excesses: Vec<f64> = peaks.iter().map(|p| p.value - threshold).collect();
    let (xi, sigma) = fit_gpd_pwm(&excesses)?;

    let first = observations.iter().map(|o| o.time).min();
    let last = observations.iter().map(|o| o.time).max();
    let years = match (first, last) {
        (Some(a), Some(b)) => (b - a).num_seconds() as f64 / 86_400.0 / DAYS_PER_YEAR,
        _ => 0.0,
    };
    validate_positive("years", years)?;

    debug!(xi, sigma, events = peaks.len(), years, "GPD fit");
    Ok(GpdFit {
        xi,
        sigma,
        threshold,
        n_events: peaks.len(),
        years,
    })
}

/// A return period with its 95% interval and the record length behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnEstimate {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub years: f64,
}

impl From<(f64, f64, f64, f64)> for ReturnEstimate {
    fn from((value, lower, upper, years): (f64, f64, f64, f64)) -> Self {
        ReturnEstimate {
            value,
            lower,
            upper,
            years,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedEstimate {
    pub value: f64,
    pub std_dev: f64,
}

impl CombinedEstimate {
    pub fn lower(&self) -> f64 {
        self.value - self.std_dev
    }

    pub fn upper(&self) -> f64 {
        self.value + self.std_dev
    }
}

pub fn combine_estimates(estimates: &[ReturnEstimate]) -> DrawResult<CombinedEstimate> {
    validate_len(1, estimates.len())?;
    let mut variances = Vec::with_capacity(estimates.len());
    for e in estimates {
        validate_interval("interval", e.lower, e.upper)?;
        validate_positive("years", e.years)?;
        variances.push(((e.upper - e.lower) / 3.92).powi(2));
    }

    let total_inv: f64 = variances.iter().map(|v| 1.0 / v).sum();
    let total_years: f64 = estimates.iter().map(|e| e.years).sum();
    let weights: Vec<f64> = variances
        .iter()
        .zip(estimates)
        .map(|(v, e)| 0.5 * (1.0 / v) / total_inv + 0.5 * e.years / total_years)
        .collect();

    let value = weights
        .iter()
        .zip(estimates)
        .map(|(w, e)| w * e.value)
        .sum();
    let var_w: f64 = weights
        .iter()
        .zip(&variances)
        .map(|(w, v)| w * w * v)
        .sum();

    Ok(CombinedEstimate {
        value,
        std_dev: var_w.sqrt(),
    })
}

/// Parametric bootstrap of a Gumbel return period.
///
/// Draws `samples` synthetic records of `fit.n` maxima from the fitted law,
/// refits each and returns the central estimate with the 2.5% and 97.5%
/// quantiles of the refitted return periods. `years` is the fit's `n`.
pub fn bootstrap_gumbel_return_period(
    fit: &GumbelFit,
    z: f64,
    samples: usize,
    seed: u64,
) -> DrawResult<ReturnEstimate> {
    validate_len(10, samples)?;
    let law = Gumbel::new(fit.loc, fit.scale).map_err(|e| DrawError::InvalidParameters {
        parameter: "scale".to_string(),
        value: fit.scale,
        constraint: format!("{:?}", e),
    })?;
    let mut rng = rng::seed_rng_from_u64(seed);

    let mut periods = Vec::with_capacity(samples);
    let mut record = vec![0.0; fit.n];
    for _ in 0..samples {
        for x in record.iter_mut() {
            *x = law.sample(&mut rng);
        }
        if let Ok(refit) = fit_gumbel(&record) {
            let period = refit.return_period(z)?;
            if period.is_finite() {
                periods.push(period);
            }
        }
    }
    validate_len(samples / 2, periods.len())?;
    periods.sort_by(|a, b| a.total_cmp(b));

    Ok(ReturnEstimate {
        value: fit.return_period(z)?,
        lower: sorted_quantile(&periods, 0.025),
        upper: sorted_quantile(&periods, 0.975),
        years: fit.n as f64,
    })
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok())
}

/// Parse `timestamp,value` lines; a non-numeric first line is a header.
///
/// `negate` flips the sign, for indices such as Dst or SYM-H whose storms
/// are negative excursions.
pub fn parse_index_csv(text: &str, negate: bool) -> DrawResult<Vec<Observation>> {
    let sign = if negate { -1.0 } else { 1.0 };
    let mut out = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let (Some(stamp), Some(raw)) = (fields.next(), fields.next()) else {
            return Err(DrawError::Parse {
                line: i + 1,
                reason: "expected 'timestamp,value'".to_string(),
            });
        };
        let Some(time) = parse_timestamp(stamp) else {
            if i == 0 {
                continue;
            }
            return Err(DrawError::Parse {
                line: i + 1,
                reason: format!("unrecognised timestamp '{}'", stamp),
            });
        };
        let value: f64 = raw.parse().map_err(|_| DrawError::Parse {
            line: i + 1,
            reason: format!("'{}' is not a number", raw),
        })?;
        out.push(Observation {
            time,
            value: sign * value,
        });
    }
    out.sort_by_key(|o| o.time);
    Ok(out)
}

pub fn read_index_csv<P: AsRef<Path>>(path: P, negate: bool) -> DrawResult<Vec<Observation>> {
    let text = fs::read_to_string(path)?;
    parse_index_csv(&text, negate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::Rng;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_gev_gumbel_case() {
        let t = gev_return_period(0.0, 100.0, 40.0, 301.0).unwrap();
        assert!((t - 152.6708).abs() < 1e-3, "T = {}", t);

        // Tiny ξ approaches the Gumbel limit.
        let near = gev_return_period(1e-9, 100.0, 40.0, 301.0).unwrap();
        assert!((near - t).abs() / t < 1e-4);
    }

    #[test]
    fn test_gev_endpoints() {
        assert_eq!(gev_return_period(0.5, 100.0, 10.0, 0.0).unwrap(), 1.0);
        assert!(gev_return_period(-0.5, 100.0, 10.0, 200.0)
            .unwrap()
            .is_infinite());
        assert!(gev_return_period(0.0, 100.0, -1.0, 200.0).is_err());
    }

    #[test]
    fn test_gpd_matches_hand_computation() {
        // λ = 40 / 20 = 2 per year, S = (1 + 0.1·100/50)^(−10) = 1.2^−10
        let t = gpd_return_period(0.1, 50.0, 250.0, 40, 20.0, 350.0).unwrap();
        let expected = 1.0 / (2.0 * 1.2f64.powf(-10.0));
        assert!((t - expected).abs() < 1e-9);

        let exp_case = gpd_return_period(0.0, 50.0, 250.0, 40, 20.0, 350.0).unwrap();
        assert!((exp_case - 1.0 / (2.0 * (-2.0f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn test_combine_published_estimates() {
        let estimates: Vec<ReturnEstimate> =
            PUBLISHED_ESTIMATES.iter().map(|&t| t.into()).collect();
        let combined = combine_estimates(&estimates).unwrap();
        assert!((combined.value - 12.4592).abs() < 1e-3, "{}", combined.value);
        assert!((combined.std_dev - 1.1562).abs() < 1e-3);
        assert!((combined.lower() - 11.303).abs() < 1e-2);
        assert!((combined.upper() - 13.615).abs() < 1e-2);
    }

    #[test]
    fn test_combine_rejects_bad_interval() {
        let bad = [ReturnEstimate::from((10.0, 12.0, 8.0, 30.0))];
        assert!(combine_estimates(&bad).is_err());
        assert!(combine_estimates(&[]).is_err());
    }

    #[test]
    fn test_gumbel_fit_recovers_parameters() {
        let law = Gumbel::new(100.0, 25.0).unwrap();
        let mut rng = rng::seed_rng_from_u64(2024);
        let sample: Vec<f64> = (0..5_000).map(|_| law.sample(&mut rng)).collect();

        let fit = fit_gumbel(&sample).unwrap();
        assert!((fit.loc - 100.0).abs() < 2.0, "loc = {}", fit.loc);
        assert!((fit.scale - 25.0).abs() < 1.5, "scale = {}", fit.scale);

        let level = fit.return_level(100.0).unwrap();
        let back = fit.return_period(level).unwrap();
        assert!((back - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_gpd_pwm_recovers_exponential() {
        let mut rng = rng::seed_rng_from_u64(5);
        let sample: Vec<f64> = (0..20_000)
            .map(|_| -30.0 * (1.0 - rng.gen::<f64>()).ln())
            .collect();
        let (xi, sigma) = fit_gpd_pwm(&sample).unwrap();
        assert!(xi.abs() < 0.05, "xi = {}", xi);
        assert!((sigma - 30.0).abs() < 1.5, "sigma = {}", sigma);
    }

    #[test]
    fn test_annual_maxima() {
        let obs = [
            Observation { time: at(2001, 1, 1, 0), value: 5.0 },
            Observation { time: at(2001, 6, 1, 0), value: 9.0 },
            Observation { time: at(2002, 3, 1, 0), value: 2.0 },
            Observation { time: at(2002, 3, 2, 0), value: f64::NAN },
        ];
        assert_eq!(annual_maxima(&obs), vec![9.0, 2.0]);
    }

    #[test]
    fn test_decluster_keeps_cluster_maximum() {
        let obs = [
            Observation { time: at(2003, 10, 29, 0), value: 260.0 },
            Observation { time: at(2003, 10, 29, 12), value: 380.0 },
            Observation { time: at(2003, 10, 30, 6), value: 300.0 },
            Observation { time: at(2003, 11, 5, 0), value: 100.0 },
            Observation { time: at(2003, 11, 20, 0), value: 420.0 },
        ];
        let peaks = decluster_peaks(&obs, 250.0, Duration::hours(48));
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].value, 380.0);
        assert_eq!(peaks[1].value, 420.0);
    }

    #[test]
    fn test_bootstrap_interval_brackets_estimate() {
        let fit = GumbelFit {
            loc: 100.0,
            scale: 30.0,
            n: 60,
        };
        let est = bootstrap_gumbel_return_period(&fit, 250.0, 200, 7).unwrap();
        assert!(est.lower < est.value && est.value < est.upper, "{:?}", est);
        assert_eq!(est.years, 60.0);

        let again = bootstrap_gumbel_return_period(&fit, 250.0, 200, 7).unwrap();
        assert_eq!(est, again);
    }

    #[test]
    fn test_parse_index_csv() {
        let text = "time,dst\n2024-05-10 00:00:00,-20\n2024-05-11T02:00:00Z,-412\n\n2024-05-09 23:00:00,-5\n";
        let obs = parse_index_csv(text, true).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].value, 5.0);
        assert_eq!(obs[2].value, 412.0);

        let err = parse_index_csv("2024-05-10 00:00:00,abc\n", false).unwrap_err();
        assert!(matches!(err, DrawError::Parse { line: 1, .. }));

        let err = parse_index_csv("time,v\nyesterday,4\n", false).unwrap_err();
        assert!(matches!(err, DrawError::Parse { line: 2, .. }));
    }
}
