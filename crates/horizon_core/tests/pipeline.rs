//! End-to-end solves: spacetime → resolved radius → dense sweep → Cartesian.

use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::Result;

use horizon_core::binary::find_symmetric_binary_horizon;
use horizon_core::error::HorizonError;
use horizon_core::geometry::{meridian_curve, revolve, DEFAULT_PHI_SAMPLES};
use horizon_core::spacetime::Spacetime;
use horizon_core::surface::{SurfaceStage, TrappedSurface};

#[test]
fn schwarzschild_end_to_end() -> Result<()> {
    let st = Arc::new(Spacetime::schwarzschild(1.0)?);
    let mut ts = TrappedSurface::new(st, 0.0);
    ts.find_r0([0.49, 0.51], false)?;
    ts.solve_given_r0()?;
    assert_eq!(ts.stage(), SurfaceStage::SurfaceSolved);

    // The horizon is the coordinate sphere h = M/2 at every sampled angle.
    for s in ts.samples() {
        assert!((s.h - 0.5).abs() < 1e-6, "h({}) = {}", s.theta, s.h);
    }

    let curve = meridian_curve(&ts)?;
    assert_eq!(curve.x.len(), ts.samples().len());

    let mesh = revolve(&ts, DEFAULT_PHI_SAMPLES)?;
    for r in mesh.radius.iter() {
        assert!((r - 0.5).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn binary_end_to_end() -> Result<()> {
    let surface = find_symmetric_binary_horizon(0.1, 1.0)?;
    let samples = surface.samples();
    assert_eq!(samples.len(), 200);

    // Full sweep, strictly increasing, inside [0, 2π).
    assert_eq!(samples[0].theta, 0.0);
    assert!(samples.last().unwrap().theta < 2.0 * PI);
    for pair in samples.windows(2) {
        assert!(pair[1].theta > pair[0].theta);
    }

    // Equatorial reflection symmetry of the solved surface.
    for j in [1, 10, 60, 99] {
        assert!((samples[j].h - samples[200 - j].h).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn too_wide_binary_reports_failure() {
    // Far-separated holes have no common horizon; the search must fail with
    // a typed error instead of producing a surface.
    let result = find_symmetric_binary_horizon(1.5, 1.0);
    assert!(
        matches!(
            result,
            Err(HorizonError::NoSignChangeInBracket { .. })
                | Err(HorizonError::ShootingDidNotConverge { .. })
                | Err(HorizonError::IntegrationFailure { .. })
                | Err(HorizonError::Domain { .. })
        ),
        "expected a solver failure, got {result:?}"
    );
}
