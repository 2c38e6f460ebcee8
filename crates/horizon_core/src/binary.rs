//! Convenience search for the common horizon of an equal-mass binary.

use std::sync::Arc;

use crate::error::HorizonError;
use crate::expansion::ExpansionField;
use crate::shooting::ShootingSolver;
use crate::spacetime::Spacetime;
use crate::surface::TrappedSurface;

/// Number of candidate radii evaluated by the fallback scan.
const SCAN_POINTS: usize = 50;

/// Finds the common horizon of two equal masses at z = ±z.
///
/// The initial radius guess comes from a cubic fit of solved horizons for
/// the unit-mass case over 0 ≤ z ≤ 0.75; the radius scales with the mass.
/// Beyond that separation range a common horizon genuinely stops existing,
/// and the failure of the root solve is the reported answer.
///
/// If the first bracketed solve fails (no sign change across the ±1%
/// bracket, or no convergence), the objective is scanned across a ±5%
/// window and the solve retried once from the best candidate against the
/// window's far edge. Any further failure, and every failure kind other
/// than those two, propagates to the caller.
pub fn find_symmetric_binary_horizon(
    z: f64,
    mass: f64,
) -> Result<TrappedSurface, HorizonError> {
    let spacetime = Arc::new(Spacetime::binary(z, mass)?);
    let mut surface = TrappedSurface::new(Arc::clone(&spacetime), 0.0);

    let r0_empirical = mass * (1.0 - 0.0383 * z + 0.945 * z * z - 0.522 * z * z * z);

    match surface.find_r0([0.99 * r0_empirical, 1.01 * r0_empirical], false) {
        Ok(()) => {}
        Err(HorizonError::NoSignChangeInBracket { .. })
        | Err(HorizonError::ShootingDidNotConverge { .. }) => {
            let lo = 0.95 * r0_empirical;
            let hi = 1.05 * r0_empirical;
            let best = scan_symmetric_objective(&spacetime, lo, hi)?;
            surface.find_r0([best, hi], false)?;
        }
        Err(other) => return Err(other),
    }

    surface.solve_given_r0()?;
    Ok(surface)
}

/// Evaluates the symmetric shooting objective on an even grid over
/// `[lo, hi]` and returns the candidate with the smallest residual
/// magnitude.
fn scan_symmetric_objective(
    spacetime: &Spacetime,
    lo: f64,
    hi: f64,
) -> Result<f64, HorizonError> {
    let field = ExpansionField::new(spacetime, 0.0);
    let solver = ShootingSolver::new(&field);

    let mut best = lo;
    let mut best_magnitude = f64::INFINITY;
    for i in 0..SCAN_POINTS {
        let r0 = lo + (hi - lo) * i as f64 / (SCAN_POINTS - 1) as f64;
        let magnitude = solver.symmetric_residual(r0)?.abs();
        if magnitude < best_magnitude {
            best = r0;
            best_magnitude = magnitude;
        }
    }
    Ok(best)
}
