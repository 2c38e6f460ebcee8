//! Root solvers driving the shooting objectives.
//!
//! Two narrow capabilities: a bracketed scalar solve (Brent) for the
//! symmetric quarter-domain objective and a damped Newton iteration on R²
//! for the full-domain matching objective. Both take fallible objectives so
//! integration failures inside an evaluation propagate untouched.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::HorizonError;

/// Settings for the bracketed Brent solve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BrentSettings {
    pub max_iters: usize,
    /// Absolute tolerance on the root abscissa.
    pub xtol: f64,
    /// Relative tolerance on the root abscissa.
    pub rtol: f64,
}

impl Default for BrentSettings {
    fn default() -> Self {
        Self {
            max_iters: 100,
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
        }
    }
}

/// Settings for the two-dimensional Newton iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewtonSettings {
    pub max_steps: usize,
    pub damping: f64,
    /// Convergence threshold on the residual norm.
    pub tolerance: f64,
    /// Forward-difference step for the Jacobian estimate, relative to the
    /// iterate's magnitude.
    pub fd_step: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 50,
            damping: 1.0,
            tolerance: 1e-10,
            fd_step: 1e-7,
        }
    }
}

/// Outcome of a converged Newton solve.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    pub root: Vector2<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Finds a root of `f` over `[lo, hi]` with Brent's method (bisection,
/// secant and inverse quadratic interpolation).
///
/// The bracket must straddle a sign change; otherwise
/// [`HorizonError::NoSignChangeInBracket`] is returned without iterating.
pub fn brentq<F>(
    f: &mut F,
    lo: f64,
    hi: f64,
    settings: &BrentSettings,
) -> Result<f64, HorizonError>
where
    F: FnMut(f64) -> Result<f64, HorizonError>,
{
    let mut a = lo;
    let mut b = hi;
    let mut fa = f(a)?;
    let mut fb = f(b)?;

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(HorizonError::NoSignChangeInBracket {
            lo,
            hi,
            f_lo: fa,
            f_hi: fb,
        });
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = b - a;

    for _ in 0..settings.max_iters {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 0.5 * (settings.xtol + settings.rtol * b.abs());
        let m = 0.5 * (c - b);
        if m.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() < tol || fa.abs() <= fb.abs() {
            // Interpolation is making no progress; bisect.
            d = m;
            e = m;
        } else {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant step.
                (2.0 * m * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation.
                let t = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * t * (t - r) - (b - a) * (r - 1.0)),
                    (t - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * m * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(m) };
        fb = f(b)?;
    }

    Err(HorizonError::ShootingDidNotConverge {
        residual: fb,
        guess: vec![b],
    })
}

/// Damped Newton iteration on R² with a forward-difference Jacobian.
pub fn solve_newton2<F>(
    objective: &mut F,
    initial_guess: Vector2<f64>,
    settings: &NewtonSettings,
) -> Result<NewtonResult, HorizonError>
where
    F: FnMut(Vector2<f64>) -> Result<Vector2<f64>, HorizonError>,
{
    let mut state = initial_guess;
    let mut residual = objective(state)?;
    let mut residual_norm = residual.norm();
    let mut iterations = 0usize;

    loop {
        if residual_norm <= settings.tolerance {
            return Ok(NewtonResult {
                root: state,
                residual_norm,
                iterations,
            });
        }
        if iterations >= settings.max_steps {
            return Err(HorizonError::ShootingDidNotConverge {
                residual: residual_norm,
                guess: vec![state[0], state[1]],
            });
        }

        let jacobian = estimate_jacobian(objective, state, residual, settings.fd_step)?;
        let delta = jacobian.lu().solve(&residual).ok_or_else(|| {
            // A singular Jacobian leaves no usable direction.
            HorizonError::ShootingDidNotConverge {
                residual: residual_norm,
                guess: vec![state[0], state[1]],
            }
        })?;

        state -= delta * settings.damping;
        iterations += 1;
        residual = objective(state)?;
        residual_norm = residual.norm();
    }
}

fn estimate_jacobian<F>(
    objective: &mut F,
    state: Vector2<f64>,
    residual: Vector2<f64>,
    fd_step: f64,
) -> Result<Matrix2<f64>, HorizonError>
where
    F: FnMut(Vector2<f64>) -> Result<Vector2<f64>, HorizonError>,
{
    let mut jacobian = Matrix2::zeros();
    for j in 0..2 {
        let step = fd_step * state[j].abs().max(1.0);
        let mut probe = state;
        probe[j] += step;
        let shifted = objective(probe)?;
        jacobian.set_column(j, &((shifted - residual) / step));
    }
    Ok(jacobian)
}
