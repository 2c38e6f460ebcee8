use thiserror::Error;

/// Errors reported by the trapped-surface solver.
///
/// Every fallible operation in this crate returns one of these kinds; nothing
/// is caught or rewrapped between the point of failure and the caller of
/// `find_r0`/`solve_given_r0`. The payloads carry the diagnostic state (last
/// residual, last iterate, bracket endpoints) a caller needs to adjust its
/// guesses.
#[derive(Debug, Clone, Error)]
pub enum HorizonError {
    /// The expansion functional was evaluated outside its domain: a
    /// non-positive surface radius, or a surface point coincident with a
    /// singularity.
    #[error("expansion undefined at theta = {theta}: surface radius h = {h}")]
    Domain { theta: f64, h: f64 },

    /// The adaptive integrator gave up before reaching the target angle.
    #[error("integration failed at theta = {theta}: {reason}")]
    IntegrationFailure { theta: f64, reason: String },

    /// The symmetric-mode bracket does not straddle a root of the shooting
    /// objective.
    #[error("no sign change over bracket [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi}")]
    NoSignChangeInBracket {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    /// A root solve exhausted its iteration budget.
    #[error("shooting did not converge: residual {residual} at {guess:?}")]
    ShootingDidNotConverge { residual: f64, guess: Vec<f64> },

    /// An operation was invoked before the stage it depends on.
    #[error("{operation} requires a prior successful call to {requires}")]
    Precondition {
        operation: &'static str,
        requires: &'static str,
    },

    /// The spacetime description violates a model invariant.
    #[error("invalid spacetime: {reason}")]
    InvalidSpacetime { reason: String },
}
