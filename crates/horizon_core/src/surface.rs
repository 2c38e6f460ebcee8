//! Trapped surfaces: radius resolution and dense assembly of the meridian.

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::HorizonError;
use crate::expansion::ExpansionField;
use crate::rootfind::{brentq, solve_newton2, BrentSettings, NewtonSettings};
use crate::shooting::{ShootingSolver, MATCHING_ANGLE};
use crate::solvers::{integrate_sampled, IntegratorSettings};
use crate::spacetime::Spacetime;

/// One point of the solved meridian: angle, radius, angular derivative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub theta: f64,
    pub h: f64,
    pub dh: f64,
}

/// The resolved initial radius, tagged with the algorithm that produced it.
///
/// The variant fixes how `solve_given_r0` assembles the surface; it is
/// chosen once in `find_r0` and never re-derived from flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InitialRadius {
    /// Quarter-domain solve: the radius at θ = 0.
    Symmetric(f64),
    /// Full-domain solve: the radii at θ = 0 and θ = π.
    General { north: f64, south: f64 },
}

/// Lifecycle stage of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceStage {
    Created,
    RadiusResolved,
    SurfaceSolved,
}

/// Solver configuration carried by a surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub integrator: IntegratorSettings,
    pub brent: BrentSettings,
    pub newton: NewtonSettings,
    /// Angular spacing of the dense output grid.
    pub dtheta: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorSettings::default(),
            brent: BrentSettings::default(),
            newton: NewtonSettings::default(),
            dtheta: PI / 100.0,
        }
    }
}

/// A trapped surface centred on a point of the symmetry axis.
///
/// The surface is described in polar coordinates about `z_centre`, with the
/// axis at θ = 0 and θ = π. Solving happens in two stages: `find_r0`
/// resolves the initial radius (or radii) by shooting, then `solve_given_r0`
/// re-integrates densely and mirrors the result into a full meridian sweep.
/// Re-invoking either stage overwrites its output.
#[derive(Debug, Clone)]
pub struct TrappedSurface {
    spacetime: Arc<Spacetime>,
    z_centre: f64,
    config: SurfaceConfig,
    r0: Option<InitialRadius>,
    samples: Vec<SurfaceSample>,
}

impl TrappedSurface {
    pub fn new(spacetime: Arc<Spacetime>, z_centre: f64) -> Self {
        Self::with_config(spacetime, z_centre, SurfaceConfig::default())
    }

    pub fn with_config(spacetime: Arc<Spacetime>, z_centre: f64, config: SurfaceConfig) -> Self {
        Self {
            spacetime,
            z_centre,
            config,
            r0: None,
            samples: Vec::new(),
        }
    }

    pub fn spacetime(&self) -> &Spacetime {
        &self.spacetime
    }

    pub fn z_centre(&self) -> f64 {
        self.z_centre
    }

    pub fn r0(&self) -> Option<InitialRadius> {
        self.r0
    }

    /// The solved meridian sweep; empty until `solve_given_r0` succeeds.
    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    pub fn stage(&self) -> SurfaceStage {
        match (&self.r0, self.samples.is_empty()) {
            (None, _) => SurfaceStage::Created,
            (Some(_), true) => SurfaceStage::RadiusResolved,
            (Some(_), false) => SurfaceStage::SurfaceSolved,
        }
    }

    /// Resolves the initial radius via shooting.
    ///
    /// In symmetric mode `input_guess` is a bracket that must straddle the
    /// unique root of the scalar objective; in general mode its entries are
    /// the initial guesses for the radii at θ = 0 and θ = π. The general
    /// algorithm is used when `full_horizon` is set or the spacetime is not
    /// reflection symmetric. The flag matters even on a symmetric spacetime:
    /// a surface around a single off-centre singularity of a binary has no
    /// equatorial symmetry and needs the full domain.
    ///
    /// A previously resolved radius and any stale samples are discarded on
    /// success.
    pub fn find_r0(
        &mut self,
        input_guess: [f64; 2],
        full_horizon: bool,
    ) -> Result<(), HorizonError> {
        let field = ExpansionField::new(&self.spacetime, self.z_centre);
        let solver = ShootingSolver::with_settings(&field, self.config.integrator);

        let resolved = if full_horizon || !self.spacetime.is_reflection_symmetric() {
            let result = solve_newton2(
                &mut |guess| solver.matching_residual(guess),
                Vector2::new(input_guess[0], input_guess[1]),
                &self.config.newton,
            )?;
            InitialRadius::General {
                north: result.root[0],
                south: result.root[1],
            }
        } else {
            let root = brentq(
                &mut |r0| solver.symmetric_residual(r0),
                input_guess[0],
                input_guess[1],
                &self.config.brent,
            )?;
            InitialRadius::Symmetric(root)
        };

        self.r0 = Some(resolved);
        self.samples.clear();
        Ok(())
    }

    /// Given the resolved radius, integrates the surface densely and fills
    /// a θ-monotonic sweep of the full meridian, covering [0, 2π) once.
    ///
    /// Only the pole-to-matching-angle spans are integrated; the rest of the
    /// sweep comes from reflecting them, so the θ = π/2 and θ = π samples
    /// are never duplicated. Fails with `Precondition` if no radius has been
    /// resolved yet; overwrites any previous samples.
    pub fn solve_given_r0(&mut self) -> Result<(), HorizonError> {
        let r0 = self.r0.ok_or(HorizonError::Precondition {
            operation: "solve_given_r0",
            requires: "find_r0",
        })?;

        let field = ExpansionField::new(&self.spacetime, self.z_centre);
        let dtheta = self.config.dtheta;
        let settings = &self.config.integrator;

        // Build the [0, π] half of the sweep.
        let mut half = match r0 {
            InitialRadius::Symmetric(r) => {
                let quarter = to_samples(integrate_sampled(
                    &field,
                    0.0,
                    MATCHING_ANGLE,
                    Vector2::new(r, 0.0),
                    dtheta,
                    settings,
                )?);
                let mut half = quarter.clone();
                for s in quarter.iter().rev().skip(1) {
                    half.push(mirrored(s, MATCHING_ANGLE));
                }
                half
            }
            InitialRadius::General { north, south } => {
                let first = to_samples(integrate_sampled(
                    &field,
                    0.0,
                    MATCHING_ANGLE,
                    Vector2::new(north, 0.0),
                    dtheta,
                    settings,
                )?);
                let second = to_samples(integrate_sampled(
                    &field,
                    PI,
                    MATCHING_ANGLE,
                    Vector2::new(south, 0.0),
                    dtheta,
                    settings,
                )?);
                let mut half = first;
                half.extend(second.into_iter().rev().skip(1));
                half
            }
        };

        // Reflect through the equatorial plane to cover (π, 2π), skipping
        // the θ = π sample itself and the θ = 0 image at 2π.
        let n = half.len();
        for i in (1..n - 1).rev() {
            let s = half[i];
            half.push(mirrored(&s, PI));
        }

        self.samples = half;
        Ok(())
    }
}

fn to_samples(raw: Vec<(f64, Vector2<f64>)>) -> Vec<SurfaceSample> {
    raw.into_iter()
        .map(|(theta, y)| SurfaceSample {
            theta,
            h: y[0],
            dh: y[1],
        })
        .collect()
}

/// Reflection of a sample through the plane θ = axis; the angular derivative
/// flips sign.
fn mirrored(s: &SurfaceSample, axis: f64) -> SurfaceSample {
    SurfaceSample {
        theta: 2.0 * axis - s.theta,
        h: s.h,
        dh: -s.dh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schwarzschild_surface() -> TrappedSurface {
        let st = Arc::new(Spacetime::schwarzschild(1.0).expect("valid model"));
        TrappedSurface::new(st, 0.0)
    }

    #[test]
    fn stages_progress_in_order() {
        let mut ts = schwarzschild_surface();
        assert_eq!(ts.stage(), SurfaceStage::Created);
        ts.find_r0([0.49, 0.51], false).expect("radius resolves");
        assert_eq!(ts.stage(), SurfaceStage::RadiusResolved);
        ts.solve_given_r0().expect("surface solves");
        assert_eq!(ts.stage(), SurfaceStage::SurfaceSolved);
    }

    #[test]
    fn solve_before_find_is_a_precondition_error() {
        let mut ts = schwarzschild_surface();
        let result = ts.solve_given_r0();
        assert!(matches!(result, Err(HorizonError::Precondition { .. })));
    }

    #[test]
    fn schwarzschild_horizon_is_a_coordinate_sphere() {
        let mut ts = schwarzschild_surface();
        ts.find_r0([0.49, 0.51], false).expect("radius resolves");
        match ts.r0() {
            Some(InitialRadius::Symmetric(r)) => {
                assert!((r - 0.5).abs() < 1e-8, "r0 = {r}");
            }
            other => panic!("expected symmetric radius, got {other:?}"),
        }
        ts.solve_given_r0().expect("surface solves");
        for s in ts.samples() {
            assert!(
                (s.h - 0.5).abs() < 1e-6,
                "h({}) = {} departs from the sphere",
                s.theta,
                s.h
            );
        }
    }

    #[test]
    fn resolved_radius_closes_the_shooting_objective() {
        let mut ts = schwarzschild_surface();
        ts.find_r0([0.49, 0.51], false).expect("radius resolves");
        let Some(InitialRadius::Symmetric(r)) = ts.r0() else {
            panic!("expected symmetric radius");
        };
        let field = ExpansionField::new(ts.spacetime(), ts.z_centre());
        let residual = ShootingSolver::new(&field)
            .symmetric_residual(r)
            .expect("integrable");
        assert!(residual.abs() <= 1e-10, "residual = {residual}");
    }

    #[test]
    fn symmetric_sweep_covers_the_full_meridian() {
        let mut ts = schwarzschild_surface();
        ts.find_r0([0.49, 0.51], false).expect("radius resolves");
        ts.solve_given_r0().expect("surface solves");

        let samples = ts.samples();
        // 4 quarter-domains of π/2 at spacing π/100.
        assert!((samples.len() as i64 - 200).abs() <= 1, "{}", samples.len());
        assert_eq!(samples[0].theta, 0.0);
        let last = samples.last().unwrap().theta;
        assert!(last < 2.0 * PI, "sweep wrapped past 2π: {last}");
        assert!(2.0 * PI - last < 2.0 * ts.config.dtheta);
        for pair in samples.windows(2) {
            assert!(
                pair[1].theta > pair[0].theta,
                "non-monotonic at θ = {}",
                pair[1].theta
            );
        }
    }

    #[test]
    fn general_mode_matches_symmetric_solution() {
        let mut ts = schwarzschild_surface();
        ts.find_r0([0.49, 0.51], true).expect("radius resolves");
        match ts.r0() {
            Some(InitialRadius::General { north, south }) => {
                assert!((north - 0.5).abs() < 1e-6, "north = {north}");
                assert!((south - 0.5).abs() < 1e-6, "south = {south}");
            }
            other => panic!("expected general radii, got {other:?}"),
        }

        ts.solve_given_r0().expect("surface solves");
        let samples = ts.samples();
        assert!((samples.len() as i64 - 200).abs() <= 1, "{}", samples.len());
        for s in samples {
            assert!((s.h - 0.5).abs() < 1e-6, "h({}) = {}", s.theta, s.h);
        }
        for pair in samples.windows(2) {
            assert!(pair[1].theta > pair[0].theta);
        }
    }

    #[test]
    fn symmetric_sweep_has_four_fold_symmetry() {
        let st = Arc::new(Spacetime::binary(0.1, 1.0).expect("valid model"));
        let mut ts = TrappedSurface::new(st, 0.0);
        let guess = 1.0051;
        ts.find_r0([0.99 * guess, 1.01 * guess], false)
            .expect("radius resolves");
        ts.solve_given_r0().expect("surface solves");

        let samples = ts.samples();
        let n = samples.len();
        assert_eq!(n, 200);
        // With the default grid, θ_j = j·π/100: the reflections of index j
        // land on indices 100-j, 100+j and 200-j.
        for j in [3, 25, 47] {
            let h = samples[j].h;
            for image in [100 - j, 100 + j, 200 - j] {
                assert!(
                    (samples[image].h - h).abs() < 1e-9,
                    "h asymmetry between indices {j} and {image}"
                );
            }
        }
    }

    #[test]
    fn misleading_bracket_reports_no_sign_change() {
        // Both endpoints sit far below the Schwarzschild radius 0.5, so the
        // objective has the same sign at both.
        let mut ts = schwarzschild_surface();
        let result = ts.find_r0([0.01, 0.02], false);
        assert!(
            matches!(result, Err(HorizonError::NoSignChangeInBracket { .. })),
            "got {result:?}"
        );
        assert_eq!(ts.stage(), SurfaceStage::Created);
    }

    #[test]
    fn refind_overwrites_previous_solution() {
        let mut ts = schwarzschild_surface();
        ts.find_r0([0.49, 0.51], false).expect("radius resolves");
        ts.solve_given_r0().expect("surface solves");
        assert_eq!(ts.stage(), SurfaceStage::SurfaceSolved);

        // Resolving again drops the stale sweep.
        ts.find_r0([0.45, 0.55], false).expect("radius resolves");
        assert_eq!(ts.stage(), SurfaceStage::RadiusResolved);
        assert!(ts.samples().is_empty());
    }
}
