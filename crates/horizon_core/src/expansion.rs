use std::f64::consts::PI;

use nalgebra::Vector2;

use crate::error::HorizonError;
use crate::spacetime::Spacetime;
use crate::traits::AngularOde;

/// Angular distance from a pole below which the cot θ term is removed.
///
/// The coordinate singularity on the axis is removable (the regular solution
/// has h' = 0 there), and integration always starts exactly on the axis, so
/// the guard only needs to fire at θ = 0 and θ = π themselves.
const AXIS_TOL: f64 = 1e-16;

/// The expansion functional: right-hand side of the trapped-surface equation.
///
/// Evaluating the outgoing null expansion on a candidate surface h(θ) and
/// setting it to zero yields a second-order ODE for h; this type computes
/// that ODE's right-hand side. Singularity positions are rebased to the
/// centre of the polar coordinate system once, at construction.
#[derive(Debug, Clone)]
pub struct ExpansionField {
    z_rel: Vec<f64>,
    masses: Vec<f64>,
}

impl ExpansionField {
    pub fn new(spacetime: &Spacetime, z_centre: f64) -> Self {
        Self {
            z_rel: spacetime
                .z_positions()
                .iter()
                .map(|z| z - z_centre)
                .collect(),
            masses: spacetime.masses().to_vec(),
        }
    }
}

impl AngularOde for ExpansionField {
    fn eval(&self, theta: f64, state: Vector2<f64>) -> Result<Vector2<f64>, HorizonError> {
        let h = state[0];
        let dh = state[1];
        if !(h > 0.0) {
            return Err(HorizonError::Domain { theta, h });
        }

        let (sin_t, cos_t) = theta.sin_cos();

        // Conformal factor and its partials, accumulated over singularities.
        let mut psi = 1.0;
        let mut dpsi_dr = 0.0;
        let mut dpsi_dtheta = 0.0;
        for (&z, &m) in self.z_rel.iter().zip(&self.masses) {
            let dist = ((h * sin_t).powi(2) + (h * cos_t - z).powi(2)).sqrt();
            if dist == 0.0 {
                return Err(HorizonError::Domain { theta, h });
            }
            let dist3 = dist * dist * dist;
            psi += 0.5 * m / dist;
            dpsi_dr += 0.5 * m * (z * cos_t - h) / dist3;
            dpsi_dtheta += 0.5 * m * h * (-z * sin_t) / dist3;
        }

        // c2 = C² = 1 / (1 + (h'/h)²)
        let c2 = 1.0 / (1.0 + (dh / h).powi(2));

        let cot_term = if theta.abs() < AXIS_TOL || (theta - PI).abs() < AXIS_TOL {
            0.0
        } else {
            dh / (theta.tan() * c2)
        };

        let d2h = 2.0 * h - cot_term
            + 4.0 * h * h / (psi * c2) * (dpsi_dr - dpsi_dtheta * dh / (h * h))
            + 3.0 * dh * dh / h;

        Ok(Vector2::new(dh, d2h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schwarzschild_field() -> ExpansionField {
        let st = Spacetime::schwarzschild(1.0).expect("valid model");
        ExpansionField::new(&st, 0.0)
    }

    #[test]
    fn schwarzschild_sphere_is_stationary() {
        // In these coordinates the unit-mass horizon is the coordinate sphere
        // h = 1/2, so the right-hand side must vanish identically on it.
        let field = schwarzschild_field();
        for theta in [0.0, 0.3, PI / 2.0, 2.0, PI] {
            let rhs = field
                .eval(theta, Vector2::new(0.5, 0.0))
                .expect("in-domain state");
            assert!(rhs[0].abs() < 1e-14, "dh at theta = {theta}: {}", rhs[0]);
            assert!(rhs[1].abs() < 1e-12, "d2h at theta = {theta}: {}", rhs[1]);
        }
    }

    #[test]
    fn axis_guard_removes_cot_singularity() {
        // tan(0) = 0 would otherwise divide by zero when h' != 0.
        let field = schwarzschild_field();
        for theta in [0.0, PI] {
            let rhs = field
                .eval(theta, Vector2::new(0.5, 0.1))
                .expect("on-axis state");
            assert!(rhs[1].is_finite(), "d2h at theta = {theta}: {}", rhs[1]);
        }
    }

    #[test]
    fn non_positive_radius_is_domain_error() {
        let field = schwarzschild_field();
        for h in [0.0, -0.5, f64::NAN] {
            let result = field.eval(1.0, Vector2::new(h, 0.0));
            assert!(
                matches!(result, Err(HorizonError::Domain { .. })),
                "h = {h} should be out of domain"
            );
        }
    }

    #[test]
    fn surface_through_singularity_is_domain_error() {
        let st = Spacetime::new(vec![0.5], vec![1.0], false).expect("valid model");
        let field = ExpansionField::new(&st, 0.0);
        let result = field.eval(0.0, Vector2::new(0.5, 0.0));
        assert!(matches!(result, Err(HorizonError::Domain { .. })));
    }

    #[test]
    fn centre_offset_rebases_positions() {
        // A single singularity at z = 0.3 seen from a centre at 0.3 is the
        // Schwarzschild problem again.
        let st = Spacetime::new(vec![0.3], vec![1.0], false).expect("valid model");
        let field = ExpansionField::new(&st, 0.3);
        let rhs = field
            .eval(1.0, Vector2::new(0.5, 0.0))
            .expect("in-domain state");
        assert!(rhs[1].abs() < 1e-12);
    }
}
