//! # Approach planning module
//!
//! Approach planning smooths the trajectory of a connected vehicle towards a
//! signalized intersection. Once per control tick the module classifies the
//! vehicle into a transit state (unavailable, approaching, waiting or
//! departing) and, while approaching, computes the acceleration that lets
//! the vehicle arrive at the stop bar during a green interval, or stop
//! safely if it cannot.
//!
//! The approaching-state pipeline has four steps:
//!
//! 1. Compute the earliest time the vehicle could physically reach the stop
//!    bar using at most one acceleration leg, one cruise leg at free flow
//!    speed and one deceleration leg (`earliest_entry_time`).
//! 2. Push that time forward to the next instant compatible with the
//!    predicted signal phase (`nearest_green_entry_time`).
//! 3. Build the eight boundary trajectories bracketing the feasible range of
//!    entry times (`boundary_trajectories`).
//! 4. Select the bracket containing the scheduled entry time, solve the
//!    exact trajectory for that bracket's shape, and extract the one-step
//!    acceleration command for this tick (`select_case`).
//!
//! All solvers are closed-form. Inputs that land on a boundary the closed
//! forms cannot resolve (near-zero denominators) abort the tick with a hard
//! error rather than being approximated.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod boundary;
mod cases;
mod entry_time;
mod params;
mod schedule;
mod state;
mod traj;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use boundary::BoundaryDistances;
pub use params::Params;
pub use state::*;
pub use traj::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Band inside which a time or a solver denominator is treated as zero.
pub(crate) const EPSILON: f64 = 1e-3;

/// Band inside which a segment acceleration is treated as zero.
pub(crate) const ACCEL_EPSILON: f64 = 1e-4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during approach planning.
///
/// A degenerate denominator means the inputs fell inside the epsilon band of
/// a closed-form singularity. Both error kinds abort only the current tick's
/// plan for the affected vehicle; the vehicle record is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ApchPlanError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("{context}: denominator within epsilon of zero ({value})")]
    DegenerateDenominator { context: &'static str, value: f64 },

    #[error("Expected 8 boundary trajectories, got {0}")]
    WrongBoundaryCount(usize),
}
