// src/analytics/correlation.rs
//! Pearson correlation and least-squares regression
//!
//! ```text
//! r      = Sxy / √(Sxx · Syy)
//! slope  = Sxy / Sxx,   intercept = ȳ − slope · x̄
//! t      = r √((n−2) / (1−r²))          ~ Student-t(n−2) under H₀: r = 0
//! se     = √((1−r²) Syy / (n−2)) / √Sxx
//! ```

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{validation::validate_len, DrawError, DrawResult};
use crate::math_utils::mean;

/// Apollo mission flown by each moonwalking/orbiting astronaut, astronauts
/// sorted alphabetically (Aldrin, Armstrong, Bean, ...).
pub const APOLLO_MISSIONS: [f64; 21] = [
    11.0, 11.0, 12.0, 17.0, 11.0, 12.0, 16.0, 17.0, 12.0, 13.0, 15.0, 13.0, 16.0, 14.0, 14.0,
    17.0, 15.0, 14.0, 13.0, 15.0, 16.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    /// Two-sided p-value for zero slope
    pub p_value: f64,
    /// Standard error of the slope
    pub std_err: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

struct Moments {
    n: f64,
    x_bar: f64,
    y_bar: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

fn moments(x: &[f64], y: &[f64]) -> DrawResult<Moments> {
    if x.len() != y.len() {
        return Err(DrawError::InvalidConfiguration {
            field: "y".to_string(),
            reason: format!("length {} differs from x length {}", y.len(), x.len()),
        });
    }
    validate_len(3, x.len())?;

    let x_bar = mean(x);
    let y_bar = mean(y);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_bar;
        let dy = yi - y_bar;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(DrawError::InvalidParameters {
            parameter: if sxx == 0.0 { "x" } else { "y" }.to_string(),
            value: 0.0,
            constraint: "variance must be non-zero".to_string(),
        });
    }
    Ok(Moments {
        n: x.len() as f64,
        x_bar,
        y_bar,
        sxx,
        syy,
        sxy,
    })
}

pub fn pearson(x: &[f64], y: &[f64]) -> DrawResult<f64> {
    let m = moments(x, y)?;
    Ok(m.sxy / (m.sxx * m.syy).sqrt())
}

pub fn linear_regression(x: &[f64], y: &[f64]) -> DrawResult<Regression> {
    let m = moments(x, y)?;
    let r = (m.sxy / (m.sxx * m.syy).sqrt()).clamp(-1.0, 1.0);
    let slope = m.sxy / m.sxx;
    let intercept = m.y_bar - slope * m.x_bar;
    let df = m.n - 2.0;
    let one_minus_r2 = (1.0 - r * r).max(0.0);

    let std_err = (one_minus_r2 * m.syy / df).sqrt() / m.sxx.sqrt();
    let p_value = if one_minus_r2 == 0.0 {
        0.0
    } else {
        let t = r * (df / one_minus_r2).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| DrawError::InvalidParameters {
            parameter: "degrees_of_freedom".to_string(),
            value: df,
            constraint: e.to_string(),
        })?;
        2.0 * (1.0 - dist.cdf(t.abs()))
    };

    Ok(Regression {
        slope,
        intercept,
        r_value: r,
        p_value,
        std_err,
    })
}

/// Mission number against alphabetical position 1..=21.
pub fn apollo_correlation() -> DrawResult<Regression> {
    let order: Vec<f64> = (1..=APOLLO_MISSIONS.len()).map(|i| i as f64).collect();
    linear_regression(&order, &APOLLO_MISSIONS)
}
