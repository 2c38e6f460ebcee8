use serde::{Deserialize, Serialize};

use crate::error::HorizonError;

/// An axisymmetric, time-symmetric, conformally flat vacuum spacetime with
/// Brill-Lindquist singularities on the z-axis.
///
/// For this class of data the only parameters that matter are the z-locations
/// of the singularities, their bare masses, and whether the data is
/// reflection symmetric about the equatorial plane. The model is immutable
/// once constructed and is shared read-only by every surface solved on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spacetime {
    z_positions: Vec<f64>,
    masses: Vec<f64>,
    reflection_symmetric: bool,
}

impl Spacetime {
    /// Builds a spacetime from singularity locations and bare masses.
    ///
    /// The two sequences must have equal, non-zero length and every mass must
    /// be strictly positive.
    pub fn new(
        z_positions: Vec<f64>,
        masses: Vec<f64>,
        reflection_symmetric: bool,
    ) -> Result<Self, HorizonError> {
        if z_positions.is_empty() {
            return Err(HorizonError::InvalidSpacetime {
                reason: "at least one singularity is required".into(),
            });
        }
        if z_positions.len() != masses.len() {
            return Err(HorizonError::InvalidSpacetime {
                reason: format!(
                    "{} singularity positions but {} masses",
                    z_positions.len(),
                    masses.len()
                ),
            });
        }
        if let Some(&m) = masses.iter().find(|&&m| !(m > 0.0)) {
            return Err(HorizonError::InvalidSpacetime {
                reason: format!("bare mass {m} is not strictly positive"),
            });
        }

        Ok(Self {
            z_positions,
            masses,
            reflection_symmetric,
        })
    }

    /// Standard Schwarzschild data: a single singularity at the origin.
    pub fn schwarzschild(mass: f64) -> Result<Self, HorizonError> {
        Self::new(vec![0.0], vec![mass], true)
    }

    /// Two equal masses at z = ±z, reflection symmetric.
    pub fn binary(z: f64, mass: f64) -> Result<Self, HorizonError> {
        Self::new(vec![-z, z], vec![mass, mass], true)
    }

    pub fn z_positions(&self) -> &[f64] {
        &self.z_positions
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn is_reflection_symmetric(&self) -> bool {
        self.reflection_symmetric
    }

    pub fn n_singularities(&self) -> usize {
        self.z_positions.len()
    }
}
