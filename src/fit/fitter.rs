//! 4PL fitting.
//!
//! Given concentrations `x_i` and readings `y_i`, we minimize
//! `sum((y_i - model(x_i))^2)` over the four parameters (A, B, C, D).
//!
//! Two-stage strategy:
//!
//! 1. **Grid seed.** The model is linear in the asymptote pair (A, D) once
//!    the slope B and EC50 C are fixed: with `g = 1/(1 + (x/C)^B)`,
//!    `y = A*g + D*(1 - g)`. For each candidate (B, C) on a deterministic
//!    grid we solve (A, D) by least squares and keep the minimum-SSE tuple.
//! 2. **Levenberg-Marquardt polish.** Refine all four parameters from the
//!    seed with an analytic Jacobian, damped so steps that make C
//!    non-positive or the SSE non-finite are rejected.
//!
//! On non-convergence the seed is perturbed with a seeded RNG and LM is rerun
//! (up to `max_attempts` total). If every attempt fails the whole fit fails;
//! partial parameters never escape.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::domain::{FitParams, FitResult};
use crate::error::AppError;
use crate::fit::quality::fit_quality;
use crate::fit::seed_grid::{ec50_grid, slope_grid};
use crate::math::solve_least_squares;
use crate::models::curve;

/// Minimum number of standards for a 4-parameter fit to be well-determined.
pub const MIN_STANDARDS: usize = 5;

/// Relative SSE improvement below which LM is considered converged.
const SSE_REL_TOL: f64 = 1e-10;

/// Slope magnitude range covered by the seed grid.
const SLOPE_MIN_ABS: f64 = 0.1;
const SLOPE_MAX_ABS: f64 = 8.0;

/// Options that affect how the curve is calibrated.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Maximum LM iterations per attempt.
    pub max_iterations: usize,
    /// Total fit attempts (first from the grid seed, the rest from perturbed
    /// seeds).
    pub max_attempts: usize,
    /// Slope grid steps per sign.
    pub slope_steps: usize,
    /// EC50 grid steps.
    pub ec50_steps: usize,
    /// RNG seed for perturbed retries (reproducible runs).
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_attempts: 3,
            slope_steps: 12,
            ec50_steps: 25,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: FitParams,
    sse: f64,
}

/// Fit the 4PL model to paired concentration/reading data.
pub fn fit_standard_curve(x: &[f64], y: &[f64], opts: &FitOptions) -> Result<FitResult, AppError> {
    validate_data(x, y)?;
    if opts.max_iterations == 0 {
        return Err(AppError::invalid_argument("max_iterations must be >= 1."));
    }
    if opts.max_attempts == 0 {
        return Err(AppError::invalid_argument("max_attempts must be >= 1."));
    }

    let seed = grid_seed(x, y, opts)?;

    let mut rng = StdRng::seed_from_u64(opts.seed);

    for attempt in 0..opts.max_attempts {
        let start = if attempt == 0 {
            seed.params
        } else {
            perturb(&seed.params, &mut rng)
        };
        if let Some(refined) = levenberg_marquardt(x, y, &start, opts.max_iterations) {
            let quality = fit_quality(x, y, &refined)?;
            return Ok(FitResult {
                params: refined,
                quality,
            });
        }
    }

    Err(AppError::convergence(format!(
        "4PL model cannot fit this data: optimizer did not converge in {} attempt(s).",
        opts.max_attempts
    )))
}

fn validate_data(x: &[f64], y: &[f64]) -> Result<(), AppError> {
    if x.len() != y.len() {
        return Err(AppError::invalid_argument(format!(
            "Concentrations and readings differ in length ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_STANDARDS {
        return Err(AppError::invalid_argument(format!(
            "At least {MIN_STANDARDS} reference standards are required (got {}).",
            x.len()
        )));
    }
    for &xi in x {
        if !(xi.is_finite() && xi > 0.0) {
            return Err(AppError::invalid_argument(format!(
                "Concentrations must be finite and > 0 (got {xi})."
            )));
        }
    }
    for &yi in y {
        if !yi.is_finite() {
            return Err(AppError::invalid_argument(format!(
                "Readings must be finite (got {yi})."
            )));
        }
    }
    Ok(())
}

/// Stage 1: deterministic grid seed.
fn grid_seed(x: &[f64], y: &[f64], opts: &FitOptions) -> Result<Candidate, AppError> {
    let conc_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let conc_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if conc_max <= conc_min {
        // A single distinct concentration cannot pin down a sigmoid.
        return Err(AppError::convergence(
            "4PL model cannot fit this data: all concentrations are identical.",
        ));
    }

    let slopes = slope_grid(SLOPE_MIN_ABS, SLOPE_MAX_ABS, opts.slope_steps)?;
    let ec50s = ec50_grid(conc_min, conc_max, opts.ec50_steps)?;

    let pairs: Vec<(usize, f64, f64)> = slopes
        .iter()
        .flat_map(|&b| ec50s.iter().map(move |&c| (b, c)))
        .enumerate()
        .map(|(idx, (b, c))| (idx, b, c))
        .collect();

    // Evaluate each (B, C) tuple independently (parallel).
    let candidates: Vec<Candidate> = pairs
        .par_iter()
        .filter_map(|&(idx, b, c)| {
            evaluate_candidate(x, y, b, c).map(|(params, sse)| Candidate { idx, params, sse })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::convergence(
            "4PL model cannot fit this data: no valid seed candidates.",
        ));
    }

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Ok(best.clone())
}

/// Solve (A, D) for a fixed (B, C) and return the resulting SSE.
fn evaluate_candidate(x: &[f64], y: &[f64], b: f64, c: f64) -> Option<(FitParams, f64)> {
    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    let obs = DVector::from_row_slice(y);

    for i in 0..n {
        let g = 1.0 / (1.0 + (x[i] / c).powf(b));
        if !g.is_finite() {
            return None;
        }
        design[(i, 0)] = g;
        design[(i, 1)] = 1.0 - g;
    }

    let beta = solve_least_squares(&design, &obs)?;
    let params = FitParams {
        a: beta[0],
        b,
        c,
        d: beta[1],
    };

    let sse: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - curve(xi, &params);
            r * r
        })
        .sum();

    if sse.is_finite() { Some((params, sse)) } else { None }
}

/// Stage 2: Levenberg-Marquardt refinement of all four parameters.
///
/// Returns `None` if the iteration cap is hit before the convergence
/// criteria are met.
fn levenberg_marquardt(
    x: &[f64],
    y: &[f64],
    start: &FitParams,
    max_iterations: usize,
) -> Option<FitParams> {
    let n = x.len();
    let mut p = *start;
    let mut sse = sse_of(x, y, &p);
    if !sse.is_finite() {
        return None;
    }
    let mut lambda = 1e-3;

    for _ in 0..max_iterations {
        let mut jac = DMatrix::<f64>::zeros(n, 4);
        let mut resid = DVector::<f64>::zeros(n);
        for i in 0..n {
            let t = (x[i] / p.c).powf(p.b);
            let g = 1.0 / (1.0 + t);
            let ad = p.a - p.d;
            // y = (A - D) g + D
            jac[(i, 0)] = g; // d/dA
            jac[(i, 1)] = -ad * g * g * t * (x[i] / p.c).ln(); // d/dB
            jac[(i, 2)] = ad * g * g * p.b * t / p.c; // d/dC
            jac[(i, 3)] = 1.0 - g; // d/dD
            resid[i] = y[i] - curve(x[i], &p);
        }

        let jtj = jac.transpose() * &jac;
        let grad = jac.transpose() * &resid;
        if grad.iter().all(|v| v.abs() < 1e-12) {
            return Some(p);
        }

        // Inner damping loop: grow lambda until a step is accepted.
        let mut accepted = false;
        for _ in 0..30 {
            let mut lhs = jtj.clone();
            for k in 0..4 {
                lhs[(k, k)] += lambda * jtj[(k, k)].max(1e-12);
            }
            let Some(delta) = lhs.lu().solve(&grad) else {
                lambda *= 10.0;
                continue;
            };

            let trial = FitParams {
                a: p.a + delta[0],
                b: p.b + delta[1],
                c: p.c + delta[2],
                d: p.d + delta[3],
            };
            // C must stay positive for the model to be evaluable on x > 0.
            if !(trial.c.is_finite() && trial.c > 0.0) || !trial.b.is_finite() {
                lambda *= 10.0;
                continue;
            }
            let trial_sse = sse_of(x, y, &trial);
            if trial_sse.is_finite() && trial_sse <= sse {
                let improvement = (sse - trial_sse) / sse.max(f64::MIN_POSITIVE);
                p = trial;
                sse = trial_sse;
                lambda = (lambda / 10.0).max(1e-12);
                accepted = true;
                if improvement < SSE_REL_TOL {
                    return Some(p);
                }
                break;
            }
            lambda *= 10.0;
        }

        if !accepted {
            // Fully damped and still no downhill step: the seed is at a local
            // minimum for this landscape.
            return Some(p);
        }
    }

    None
}

fn sse_of(x: &[f64], y: &[f64], p: &FitParams) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - curve(xi, p);
            r * r
        })
        .sum()
}

/// Multiplicative seed perturbation for retry attempts.
fn perturb(params: &FitParams, rng: &mut StdRng) -> FitParams {
    let mut jitter = |v: f64| v * (1.0 + rng.gen_range(-0.2..0.2));
    FitParams {
        a: jitter(params.a),
        b: jitter(params.b),
        c: jitter(params.c).abs().max(f64::MIN_POSITIVE),
        d: jitter(params.d),
    }
}
