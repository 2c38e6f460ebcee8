//! Adaptive integration of the angular ODE system.
//!
//! Implements the Dormand-Prince 5(4) embedded pair with step-size control
//! driven by a scaled error norm. Steps are signed, so the same driver
//! integrates away from either pole: increasing θ from 0, decreasing θ
//! from π.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::HorizonError;
use crate::traits::AngularOde;

/// Error-control and budget settings for the adaptive integrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegratorSettings {
    /// Absolute tolerance on the local error.
    pub atol: f64,
    /// Relative tolerance on the local error.
    pub rtol: f64,
    /// Maximum number of attempted steps per integration call.
    pub max_steps: usize,
    /// Smallest step magnitude before the integration is declared failed.
    pub min_step: f64,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-6,
            max_steps: 100_000,
            min_step: 1e-14,
        }
    }
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

enum StepResult {
    /// Fifth-order solution and the scaled norm of the embedded error.
    Step { y: Vector2<f64>, err: f64 },
    /// A trial stage left the solution domain or went non-finite; the step
    /// must be retried with a smaller size.
    Rejected,
}

/// Integrates the system from `from` to `to`, returning the terminal state.
///
/// The right-hand side is evaluated at the current accepted state once per
/// attempt; a domain error there is the caller's problem and propagates.
/// Domain excursions in trial stages are treated as step rejections instead:
/// the accepted state is valid, so the trial step was simply too large.
pub fn integrate(
    system: &impl AngularOde,
    from: f64,
    to: f64,
    y0: Vector2<f64>,
    settings: &IntegratorSettings,
) -> Result<Vector2<f64>, HorizonError> {
    let span = to - from;
    if span == 0.0 {
        return Ok(y0);
    }
    let dir = span.signum();
    let mut t = from;
    let mut y = y0;
    let mut h = span / 100.0;

    for _ in 0..settings.max_steps {
        let mut h_step = h;
        let mut last = false;
        if (t + h_step - to) * dir >= 0.0 {
            h_step = to - t;
            last = true;
        }

        let factor = match dopri5_step(system, t, y, h_step, settings)? {
            StepResult::Step { y: y_new, err } => {
                if err <= 1.0 {
                    if last {
                        return Ok(y_new);
                    }
                    t += h_step;
                    y = y_new;
                }
                if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                }
            }
            StepResult::Rejected => MIN_FACTOR,
        };

        h = h_step * factor;
        if h.abs() < settings.min_step {
            return Err(HorizonError::IntegrationFailure {
                theta: t,
                reason: format!("step size collapsed below {}", settings.min_step),
            });
        }
    }

    Err(HorizonError::IntegrationFailure {
        theta: t,
        reason: format!("step budget of {} exhausted", settings.max_steps),
    })
}

/// Integrates `from` → `to`, recording the state on a fixed grid of spacing
/// `dtheta`. Both endpoints are included. This is the dense-output driver
/// used to assemble solved surfaces.
pub fn integrate_sampled(
    system: &impl AngularOde,
    from: f64,
    to: f64,
    y0: Vector2<f64>,
    dtheta: f64,
    settings: &IntegratorSettings,
) -> Result<Vec<(f64, Vector2<f64>)>, HorizonError> {
    assert!(dtheta > 0.0, "sample spacing must be positive");

    let span = to - from;
    let step = dtheta.copysign(span);
    let whole = (span / step + 1e-9).floor() as usize;

    let mut samples = Vec::with_capacity(whole + 2);
    samples.push((from, y0));
    let mut t = from;
    let mut y = y0;
    for k in 1..=whole {
        let target = from + k as f64 * step;
        y = integrate(system, t, target, y, settings)?;
        t = target;
        samples.push((t, y));
    }
    if (to - t).abs() > 1e-9 * span.abs() {
        y = integrate(system, t, to, y, settings)?;
        samples.push((to, y));
    }
    Ok(samples)
}

/// One Dormand-Prince 5(4) trial step of signed size `h` from `(t, y)`.
fn dopri5_step(
    system: &impl AngularOde,
    t: f64,
    y: Vector2<f64>,
    h: f64,
    settings: &IntegratorSettings,
) -> Result<StepResult, HorizonError> {
    // Dormand-Prince coefficients.
    let c2 = 1.0 / 5.0;
    let c3 = 3.0 / 10.0;
    let c4 = 4.0 / 5.0;
    let c5 = 8.0 / 9.0;

    let a21 = 1.0 / 5.0;

    let a31 = 3.0 / 40.0;
    let a32 = 9.0 / 40.0;

    let a41 = 44.0 / 45.0;
    let a42 = -56.0 / 15.0;
    let a43 = 32.0 / 9.0;

    let a51 = 19372.0 / 6561.0;
    let a52 = -25360.0 / 2187.0;
    let a53 = 64448.0 / 6561.0;
    let a54 = -212.0 / 729.0;

    let a61 = 9017.0 / 3168.0;
    let a62 = -355.0 / 33.0;
    let a63 = 46732.0 / 5247.0;
    let a64 = 49.0 / 176.0;
    let a65 = -5103.0 / 18656.0;

    // b coefficients (5th order)
    let b1 = 35.0 / 384.0;
    let b3 = 500.0 / 1113.0;
    let b4 = 125.0 / 192.0;
    let b5 = -2187.0 / 6784.0;
    let b6 = 11.0 / 84.0;

    // b - b* against the embedded 4th-order solution
    let e1 = 71.0 / 57600.0;
    let e3 = -71.0 / 16695.0;
    let e4 = 71.0 / 1920.0;
    let e5 = -17253.0 / 339200.0;
    let e6 = 22.0 / 525.0;
    let e7 = -1.0 / 40.0;

    macro_rules! trial_stage {
        ($theta:expr, $state:expr) => {
            match system.eval($theta, $state) {
                Ok(k) if k[0].is_finite() && k[1].is_finite() => k,
                Ok(_) => return Ok(StepResult::Rejected),
                Err(HorizonError::Domain { .. }) => return Ok(StepResult::Rejected),
                Err(other) => return Err(other),
            }
        };
    }

    // k1 sits on the accepted state; its errors are genuine.
    let k1 = system.eval(t, y)?;
    let k2 = trial_stage!(t + c2 * h, y + k1 * (a21 * h));
    let k3 = trial_stage!(t + c3 * h, y + (k1 * a31 + k2 * a32) * h);
    let k4 = trial_stage!(t + c4 * h, y + (k1 * a41 + k2 * a42 + k3 * a43) * h);
    let k5 = trial_stage!(
        t + c5 * h,
        y + (k1 * a51 + k2 * a52 + k3 * a53 + k4 * a54) * h
    );
    let k6 = trial_stage!(
        t + h,
        y + (k1 * a61 + k2 * a62 + k3 * a63 + k4 * a64 + k5 * a65) * h
    );

    let y_new = y + (k1 * b1 + k3 * b3 + k4 * b4 + k5 * b5 + k6 * b6) * h;
    if !y_new[0].is_finite() || !y_new[1].is_finite() {
        return Ok(StepResult::Rejected);
    }
    let k7 = trial_stage!(t + h, y_new);

    let err_vec = (k1 * e1 + k3 * e3 + k4 * e4 + k5 * e5 + k6 * e6 + k7 * e7) * h;
    let mut sum = 0.0;
    for i in 0..2 {
        let scale = settings.atol + settings.rtol * y[i].abs().max(y_new[i].abs());
        sum += (err_vec[i] / scale).powi(2);
    }
    let err = (sum / 2.0).sqrt();
    if !err.is_finite() {
        return Ok(StepResult::Rejected);
    }

    Ok(StepResult::Step { y: y_new, err })
}
