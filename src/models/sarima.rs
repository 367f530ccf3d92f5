//! Seasonal ARIMA model for monthly count series
//!
//! The model is the multiplicative SARIMA(p,d,q)(P,D,Q)[s] family: regular
//! and seasonal differencing to remove trend and annual cycle, then an ARMA
//! recursion on the differenced scale whose coefficients are estimated by
//! minimizing the conditional sum of squares with a deterministic
//! Nelder-Mead iteration. Fitting either converges within its iteration
//! budget or fails; there is no fallback to a simpler model.

use crate::data::CountSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastOutput, TrainedForecastModel};
use statrs::distribution::{ContinuousCDF, Normal};

/// Iteration budget for the coefficient optimizer
const MAX_ITERATIONS: usize = 1000;
/// Relative spread of the simplex objective values at which the fit is accepted
const CONVERGENCE_TOLERANCE: f64 = 1e-8;
/// Coordinate step used to seed the initial simplex
const SIMPLEX_STEP: f64 = 0.2;
/// Coefficients are kept inside the open unit interval for stability
const COEFFICIENT_BOUND: f64 = 0.98;
/// Objective value assigned to out-of-bounds or non-finite candidates
const CSS_PENALTY: f64 = 1e12;

/// Unfitted seasonal ARIMA model specification
#[derive(Debug, Clone)]
pub struct SarimaModel {
    /// Name of the model
    name: String,
    /// Non-seasonal AR order (p)
    p: usize,
    /// Non-seasonal differencing order (d)
    d: usize,
    /// Non-seasonal MA order (q)
    q: usize,
    /// Seasonal AR order (P)
    seasonal_p: usize,
    /// Seasonal differencing order (D)
    seasonal_d: usize,
    /// Seasonal MA order (Q)
    seasonal_q: usize,
    /// Seasonal period (s), e.g. 12 for monthly data with an annual cycle
    seasonal_period: usize,
}

/// Fitted seasonal ARIMA model
///
/// Holds the estimated coefficients plus the differencing levels and
/// residuals needed to project forward without re-fitting. Forecasting is
/// read-only and repeatable; the model is meant to be dropped by the caller
/// once its forecasts have been taken.
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    name: String,
    d: usize,
    seasonal_d: usize,
    seasonal_period: usize,
    /// Non-seasonal AR coefficients
    phi: Vec<f64>,
    /// Non-seasonal MA coefficients
    theta: Vec<f64>,
    /// Seasonal AR coefficients
    seasonal_phi: Vec<f64>,
    /// Seasonal MA coefficients
    seasonal_theta: Vec<f64>,
    /// Every differencing level, original series first, fully differenced last
    levels: Vec<Vec<f64>>,
    /// Residuals on the differenced scale
    residuals: Vec<f64>,
    residual_variance: f64,
    log_likelihood: f64,
    iterations: usize,
}

impl SarimaModel {
    /// Create a new seasonal ARIMA model with order `(p, d, q)` and seasonal
    /// order `(P, D, Q, s)`
    pub fn new(
        order: (usize, usize, usize),
        seasonal_order: (usize, usize, usize, usize),
    ) -> Result<Self> {
        let (p, d, q) = order;
        let (seasonal_p, seasonal_d, seasonal_q, seasonal_period) = seasonal_order;

        if seasonal_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        if seasonal_period == 1 && (seasonal_p > 0 || seasonal_d > 0 || seasonal_q > 0) {
            return Err(ForecastError::InvalidParameter(
                "seasonal terms require a seasonal period of at least 2".to_string(),
            ));
        }
        if p + d + q + seasonal_p + seasonal_d + seasonal_q == 0 {
            return Err(ForecastError::InvalidParameter(
                "model must include at least one autoregressive, differencing or moving-average term"
                    .to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                p, d, q, seasonal_p, seasonal_d, seasonal_q, seasonal_period
            ),
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            seasonal_period,
        })
    }

    /// Minimum number of observations the model will accept.
    ///
    /// Seasonal structures need two full cycles plus one point before the
    /// combined differencing is identifiable; shorter input is rejected even
    /// where the numerical routine would grind through it.
    pub fn required_observations(&self) -> usize {
        if self.seasonal_period > 1 {
            2 * self.seasonal_period + 1
        } else {
            self.p + self.d + self.q + 1
        }
    }

    /// Split a packed parameter vector into the four coefficient groups
    fn unpack(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut cursor = params.iter().copied();
        let phi: Vec<f64> = cursor.by_ref().take(self.p).collect();
        let theta: Vec<f64> = cursor.by_ref().take(self.q).collect();
        let seasonal_phi: Vec<f64> = cursor.by_ref().take(self.seasonal_p).collect();
        let seasonal_theta: Vec<f64> = cursor.collect();
        (phi, theta, seasonal_phi, seasonal_theta)
    }

    /// Residuals of the ARMA recursion on the differenced series, with
    /// pre-sample values taken as zero (conditional sum of squares).
    fn filter_residuals(&self, params: &[f64], differenced: &[f64]) -> (Vec<f64>, f64) {
        let (phi, theta, seasonal_phi, seasonal_theta) = self.unpack(params);
        let ar = expand_ar(&phi, &seasonal_phi, self.seasonal_period);
        let ma = expand_ma(&theta, &seasonal_theta, self.seasonal_period);

        let mut residuals = vec![0.0; differenced.len()];
        let mut sse = 0.0;
        for t in 0..differenced.len() {
            let mut prediction = 0.0;
            for &(lag, coefficient) in &ar {
                if t >= lag {
                    prediction += coefficient * differenced[t - lag];
                }
            }
            for &(lag, coefficient) in &ma {
                if t >= lag {
                    prediction += coefficient * residuals[t - lag];
                }
            }
            let error = differenced[t] - prediction;
            residuals[t] = error;
            sse += error * error;
        }
        (residuals, sse)
    }

    /// Conditional-sum-of-squares objective over the packed parameter vector
    fn css_objective(&self, params: &[f64], differenced: &[f64]) -> f64 {
        if params.iter().any(|c| !c.is_finite()) {
            return CSS_PENALTY;
        }
        let excess: f64 = params
            .iter()
            .map(|c| (c.abs() - COEFFICIENT_BOUND).max(0.0))
            .sum();
        if excess > 0.0 {
            return CSS_PENALTY * (1.0 + excess);
        }

        let (_, sse) = self.filter_residuals(params, differenced);
        if sse.is_finite() {
            sse
        } else {
            CSS_PENALTY
        }
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, series: &CountSeries) -> Result<TrainedSarimaModel> {
        let values = series.counts();
        let required = self.required_observations();
        if values.len() < required {
            return Err(ForecastError::InsufficientData {
                len: values.len(),
                required,
            });
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        if variance <= f64::EPSILON {
            return Err(ForecastError::DegenerateSeries { len: values.len() });
        }

        // Retain every differencing level; forecasting integrates back
        // through them in reverse.
        let mut levels: Vec<Vec<f64>> = vec![values];
        for _ in 0..self.d {
            let next = difference(levels[levels.len() - 1].as_slice());
            levels.push(next);
        }
        for _ in 0..self.seasonal_d {
            let next =
                seasonal_difference(levels[levels.len() - 1].as_slice(), self.seasonal_period);
            levels.push(next);
        }
        let differenced = levels[levels.len() - 1].clone();

        let n_coefficients = self.p + self.q + self.seasonal_p + self.seasonal_q;
        if differenced.len() < n_coefficients + 1 {
            return Err(ForecastError::InsufficientData {
                len: series.len(),
                required: self.d + self.seasonal_d * self.seasonal_period + n_coefficients + 1,
            });
        }

        let (params, sse, iterations) = if n_coefficients == 0 {
            let (_, sse) = self.filter_residuals(&[], &differenced);
            (Vec::new(), sse, 0)
        } else {
            let start = vec![0.1; n_coefficients];
            let outcome = nelder_mead(
                |candidate| self.css_objective(candidate, &differenced),
                &start,
                MAX_ITERATIONS,
                CONVERGENCE_TOLERANCE,
            );

            let unusable = !outcome.converged
                || !outcome.objective.is_finite()
                || outcome.objective >= CSS_PENALTY
                || outcome.params.iter().any(|c| !c.is_finite());
            if unusable {
                return Err(ForecastError::ModelConvergence {
                    iterations: outcome.iterations,
                });
            }
            (outcome.params, outcome.objective, outcome.iterations)
        };

        let (residuals, _) = self.filter_residuals(&params, &differenced);
        let n = differenced.len() as f64;
        let residual_variance = sse / n;
        let log_likelihood = gaussian_log_likelihood(&residuals, residual_variance);

        let (phi, theta, seasonal_phi, seasonal_theta) = self.unpack(&params);
        Ok(TrainedSarimaModel {
            name: self.name.clone(),
            d: self.d,
            seasonal_d: self.seasonal_d,
            seasonal_period: self.seasonal_period,
            phi,
            theta,
            seasonal_phi,
            seasonal_theta,
            levels,
            residuals,
            residual_variance,
            log_likelihood,
            iterations,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastOutput> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(0));
        }

        let ar = expand_ar(&self.phi, &self.seasonal_phi, self.seasonal_period);
        let ma = expand_ma(&self.theta, &self.seasonal_theta, self.seasonal_period);

        let mut levels = self.levels.clone();
        let mut residuals = self.residuals.clone();
        let depth = self.d + self.seasonal_d;

        let mut forecasts = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let differenced = &levels[depth];
            let n = differenced.len();
            let mut next = 0.0;
            for &(lag, coefficient) in &ar {
                if n >= lag {
                    next += coefficient * differenced[n - lag];
                }
            }
            for &(lag, coefficient) in &ma {
                if n >= lag {
                    next += coefficient * residuals[n - lag];
                }
            }
            levels[depth].push(next);
            // Future shocks enter at their expectation of zero.
            residuals.push(0.0);

            // Integrate back up: seasonal levels first, then regular ones.
            let mut value = next;
            for level in (1..=depth).rev() {
                let base = {
                    let lower = &levels[level - 1];
                    if level > self.d {
                        lower[lower.len() - self.seasonal_period]
                    } else {
                        lower[lower.len() - 1]
                    }
                };
                value += base;
                levels[level - 1].push(value);
            }
            forecasts.push(value);
        }

        ForecastOutput::new(forecasts, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaModel {
    /// Point forecasts plus normal-theory confidence intervals that widen
    /// with the forecast horizon.
    pub fn forecast_with_intervals(
        &self,
        horizon: usize,
        confidence_level: f64,
    ) -> Result<ForecastOutput> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "confidence level must be strictly between 0 and 1".to_string(),
            ));
        }

        let output = self.forecast(horizon)?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);
        let sigma = self.residual_variance.sqrt();

        let intervals = output
            .values()
            .iter()
            .enumerate()
            .map(|(step, &value)| {
                let margin = z * sigma * ((step + 1) as f64).sqrt();
                (value - margin, value + margin)
            })
            .collect();

        ForecastOutput::new_with_intervals(output.values, horizon, intervals)
    }

    /// Non-seasonal AR coefficients
    pub fn ar(&self) -> &[f64] {
        &self.phi
    }

    /// Non-seasonal MA coefficients
    pub fn ma(&self) -> &[f64] {
        &self.theta
    }

    /// Seasonal AR coefficients
    pub fn seasonal_ar(&self) -> &[f64] {
        &self.seasonal_phi
    }

    /// Seasonal MA coefficients
    pub fn seasonal_ma(&self) -> &[f64] {
        &self.seasonal_theta
    }

    /// Variance of the fit residuals on the differenced scale
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Gaussian log-likelihood of the fit
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion of the fit
    pub fn aic(&self) -> f64 {
        let k = (self.phi.len()
            + self.theta.len()
            + self.seasonal_phi.len()
            + self.seasonal_theta.len()
            + 1) as f64;
        -2.0 * self.log_likelihood + 2.0 * k
    }

    /// Optimizer iterations spent reaching convergence
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// First differences of a series
fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Seasonal differences of a series at the given period
fn seasonal_difference(values: &[f64], period: usize) -> Vec<f64> {
    values
        .iter()
        .skip(period)
        .zip(values.iter())
        .map(|(current, previous)| current - previous)
        .collect()
}

/// Expand `(1 - Σ φ_i B^i)(1 - Σ Φ_j B^{j·s})` into the lag/coefficient
/// pairs of the autoregressive recursion `w_t = Σ c_lag · w_{t-lag} + ...`.
fn expand_ar(phi: &[f64], seasonal_phi: &[f64], period: usize) -> Vec<(usize, f64)> {
    let mut terms = Vec::with_capacity(phi.len() + seasonal_phi.len() * (phi.len() + 1));
    for (i, &coefficient) in phi.iter().enumerate() {
        terms.push((i + 1, coefficient));
    }
    for (j, &seasonal) in seasonal_phi.iter().enumerate() {
        let seasonal_lag = (j + 1) * period;
        terms.push((seasonal_lag, seasonal));
        for (i, &coefficient) in phi.iter().enumerate() {
            terms.push((seasonal_lag + i + 1, -coefficient * seasonal));
        }
    }
    terms
}

/// Expand `(1 + Σ θ_i B^i)(1 + Σ Θ_j B^{j·s})` into the lag/coefficient
/// pairs of the moving-average recursion `... + Σ c_lag · e_{t-lag}`.
fn expand_ma(theta: &[f64], seasonal_theta: &[f64], period: usize) -> Vec<(usize, f64)> {
    let mut terms = Vec::with_capacity(theta.len() + seasonal_theta.len() * (theta.len() + 1));
    for (i, &coefficient) in theta.iter().enumerate() {
        terms.push((i + 1, coefficient));
    }
    for (j, &seasonal) in seasonal_theta.iter().enumerate() {
        let seasonal_lag = (j + 1) * period;
        terms.push((seasonal_lag, seasonal));
        for (i, &coefficient) in theta.iter().enumerate() {
            terms.push((seasonal_lag + i + 1, coefficient * seasonal));
        }
    }
    terms
}

/// Gaussian log-likelihood of residuals with the given variance
fn gaussian_log_likelihood(residuals: &[f64], variance: f64) -> f64 {
    let n = residuals.len() as f64;
    let variance = variance.max(1e-12);
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    -0.5 * n * (2.0 * std::f64::consts::PI).ln() - 0.5 * n * variance.ln()
        - sum_sq / (2.0 * variance)
}

#[derive(Debug, Clone)]
struct OptimOutcome {
    params: Vec<f64>,
    objective: f64,
    iterations: usize,
    converged: bool,
}

/// Deterministic Nelder-Mead minimization with a fixed starting simplex.
///
/// Converges when the spread of objective values across the simplex falls
/// below the relative tolerance; otherwise reports the best vertex with
/// `converged = false` once the iteration budget is spent.
fn nelder_mead<F>(objective: F, start: &[f64], max_iterations: usize, tolerance: f64) -> OptimOutcome
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += SIMPLEX_STEP;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|vertex| objective(vertex)).collect();

    for iteration in 0..max_iterations {
        // Order vertices best to worst; ties keep their original order so
        // the search stays deterministic.
        let mut order: Vec<usize> = (0..simplex.len()).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[dim];
        if (worst - best).abs() <= tolerance * (1.0 + best.abs()) {
            return OptimOutcome {
                params: simplex[0].clone(),
                objective: best,
                iterations: iteration,
                converged: true,
            };
        }

        // Centroid of every vertex except the worst.
        let mut centroid = vec![0.0; dim];
        for vertex in &simplex[..dim] {
            for (c, x) in centroid.iter_mut().zip(vertex.iter()) {
                *c += x;
            }
        }
        for c in centroid.iter_mut() {
            *c /= dim as f64;
        }

        let reflected = affine(&centroid, &simplex[dim], 2.0, -1.0);
        let f_reflected = objective(&reflected);

        if f_reflected < values[0] {
            let expanded = affine(&reflected, &centroid, 2.0, -1.0);
            let f_expanded = objective(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
        } else if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
        } else {
            let contracted = affine(&centroid, &simplex[dim], 0.5, 0.5);
            let f_contracted = objective(&contracted);
            if f_contracted < values[dim] {
                simplex[dim] = contracted;
                values[dim] = f_contracted;
            } else {
                // Shrink the whole simplex toward the best vertex.
                for i in 1..=dim {
                    simplex[i] = affine(&simplex[0], &simplex[i], 0.5, 0.5);
                    values[i] = objective(&simplex[i]);
                }
            }
        }
    }

    let mut best_index = 0;
    for i in 1..values.len() {
        if values[i] < values[best_index] {
            best_index = i;
        }
    }
    OptimOutcome {
        params: simplex[best_index].clone(),
        objective: values[best_index],
        iterations: max_iterations,
        converged: false,
    }
}

/// Componentwise `ca * a + cb * b`
fn affine(a: &[f64], b: &[f64], ca: f64, cb: f64) -> Vec<f64> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ca * x + cb * y)
        .collect()
}
