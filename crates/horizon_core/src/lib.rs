//! Trapped-surface finder for axisymmetric, time-symmetric, conformally flat
//! spacetimes with Brill-Lindquist singularities on the symmetry axis.
//!
//! In this restricted setting the surface condition reduces to a nonlinear
//! second-order boundary value problem for the surface radius h(θ), solved
//! here by shooting: repeated adaptive initial-value integrations away from
//! the poles, plus root finding on the boundary mismatch at θ = π/2.
//!
//! Key components:
//! - **`spacetime`**: the singularity data (axis positions, bare masses,
//!   reflection symmetry).
//! - **`expansion`**: the ODE right-hand side derived from the outgoing null
//!   expansion.
//! - **`solvers`**: the adaptive Dormand-Prince 5(4) integrator.
//! - **`rootfind`**: bracketed Brent and two-dimensional Newton solvers.
//! - **`shooting`** / **`surface`**: the shooting objectives and the surface
//!   lifecycle (`find_r0`, then `solve_given_r0`).
//! - **`binary`**: an empirical-guess search for equal-mass binary horizons.
//! - **`geometry`**: Cartesian conversion of solved surfaces for consumers.

pub mod binary;
pub mod error;
pub mod expansion;
pub mod geometry;
pub mod rootfind;
pub mod shooting;
pub mod solvers;
pub mod spacetime;
pub mod surface;
pub mod traits;
