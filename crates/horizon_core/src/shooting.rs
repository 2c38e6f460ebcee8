use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector2;

use crate::error::HorizonError;
use crate::expansion::ExpansionField;
use crate::solvers::{integrate, IntegratorSettings};

/// The angle at which half-domain solutions are matched.
pub const MATCHING_ANGLE: f64 = FRAC_PI_2;

/// Shooting objectives for the trapped-surface boundary value problem.
///
/// Both objectives integrate *away* from the poles, where the coordinate
/// singularity of the ODE is removable; integrating *to* a pole is unstable.
/// That is why the general objective matches the two half-solutions at π/2
/// instead of closing the loop on the axis.
#[derive(Debug, Clone)]
pub struct ShootingSolver<'a> {
    field: &'a ExpansionField,
    settings: IntegratorSettings,
}

impl<'a> ShootingSolver<'a> {
    pub fn new(field: &'a ExpansionField) -> Self {
        Self::with_settings(field, IntegratorSettings::default())
    }

    pub fn with_settings(field: &'a ExpansionField, settings: IntegratorSettings) -> Self {
        Self { field, settings }
    }

    /// Symmetric quarter-domain objective: h'(π/2) after shooting from the
    /// north pole with radius `r0`.
    ///
    /// A reflection-symmetric solution satisfies the Neumann condition
    /// h'(π/2) = 0, so this value is the boundary mismatch the root solve
    /// drives to zero.
    pub fn symmetric_residual(&self, r0: f64) -> Result<f64, HorizonError> {
        let end = integrate(
            self.field,
            0.0,
            MATCHING_ANGLE,
            Vector2::new(r0, 0.0),
            &self.settings,
        )?;
        Ok(end[1])
    }

    /// General full-domain objective: the state mismatch at π/2 between the
    /// solution shot from θ = 0 with radius `r0[0]` and the one shot from
    /// θ = π with radius `r0[1]`.
    ///
    /// Both components must vanish: value *and* derivative have to agree for
    /// the matched surface to be C¹.
    pub fn matching_residual(&self, r0: Vector2<f64>) -> Result<Vector2<f64>, HorizonError> {
        let north = integrate(
            self.field,
            0.0,
            MATCHING_ANGLE,
            Vector2::new(r0[0], 0.0),
            &self.settings,
        )?;
        let south = integrate(
            self.field,
            PI,
            MATCHING_ANGLE,
            Vector2::new(r0[1], 0.0),
            &self.settings,
        )?;
        Ok(north - south)
    }
}
