use nalgebra::Vector2;

use crate::error::HorizonError;

/// Right-hand side of the first-order angular ODE system for a surface
/// profile.
///
/// The state is the 2-vector (h, h') of surface radius and its angular
/// derivative; `eval` returns (dh/dθ, d²h/dθ²). Implementors report states
/// outside their domain as errors instead of letting non-finite values leak
/// into the integrator.
pub trait AngularOde {
    fn eval(&self, theta: f64, state: Vector2<f64>) -> Result<Vector2<f64>, HorizonError>;
}
