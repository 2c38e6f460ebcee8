//! Cartesian conversion of solved surfaces.
//!
//! Consumers (plotting, meshing) work in Cartesian coordinates; this module
//! converts a solved meridian sweep into the x-z profile curve and into a
//! surface of revolution about the symmetry axis. It is purely a consumer of
//! [`TrappedSurface`] and has no influence on the solving core.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::error::HorizonError;
use crate::surface::{SurfaceStage, TrappedSurface};

/// Default azimuthal resolution of [`revolve`].
pub const DEFAULT_PHI_SAMPLES: usize = 20;

/// The meridian of a solved surface in the x-z plane, including the centre
/// offset on the axis.
#[derive(Debug, Clone)]
pub struct MeridianCurve {
    pub x: Vec<f64>,
    pub z: Vec<f64>,
}

/// A solved surface revolved about the symmetry axis.
///
/// Grids are indexed (θ sample, φ sample) and expressed in coordinates local
/// to the surface centre; `radius` is the per-vertex distance from that
/// centre, the quantity mesh consumers color by.
#[derive(Debug, Clone)]
pub struct RevolvedSurface {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub z: DMatrix<f64>,
    pub radius: DMatrix<f64>,
}

/// Projects the solved sweep into the x-z plane.
pub fn meridian_curve(surface: &TrappedSurface) -> Result<MeridianCurve, HorizonError> {
    require_solved(surface, "meridian_curve")?;

    let z_centre = surface.z_centre();
    let (x, z) = surface
        .samples()
        .iter()
        .map(|s| (s.h * s.theta.sin(), z_centre + s.h * s.theta.cos()))
        .unzip();
    Ok(MeridianCurve { x, z })
}

/// Sweeps the solved meridian through φ ∈ [0, 2π] (inclusive) at `n_phi`
/// azimuthal samples, producing the revolved mesh.
pub fn revolve(surface: &TrappedSurface, n_phi: usize) -> Result<RevolvedSurface, HorizonError> {
    assert!(n_phi >= 2, "a revolved mesh needs at least two phi samples");
    require_solved(surface, "revolve")?;

    let samples = surface.samples();
    let n_theta = samples.len();
    let mut x = DMatrix::zeros(n_theta, n_phi);
    let mut y = DMatrix::zeros(n_theta, n_phi);
    let mut z = DMatrix::zeros(n_theta, n_phi);
    let mut radius = DMatrix::zeros(n_theta, n_phi);

    for (t, s) in samples.iter().enumerate() {
        let (sin_t, cos_t) = s.theta.sin_cos();
        for p in 0..n_phi {
            let phi = 2.0 * PI * p as f64 / (n_phi - 1) as f64;
            let xv = s.h * sin_t * phi.cos();
            let yv = s.h * sin_t * phi.sin();
            let zv = s.h * cos_t;
            x[(t, p)] = xv;
            y[(t, p)] = yv;
            z[(t, p)] = zv;
            radius[(t, p)] = (xv * xv + yv * yv + zv * zv).sqrt();
        }
    }

    Ok(RevolvedSurface { x, y, z, radius })
}

fn require_solved(
    surface: &TrappedSurface,
    operation: &'static str,
) -> Result<(), HorizonError> {
    if surface.stage() != SurfaceStage::SurfaceSolved {
        return Err(HorizonError::Precondition {
            operation,
            requires: "solve_given_r0",
        });
    }
    Ok(())
}
