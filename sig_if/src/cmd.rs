//! Drive command definitions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A longitudinal drive command.
///
/// Used both for the host controller's own fallback suggestion and for the
/// suggestion computed by the approach planner.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    /// Demanded acceleration (signed, negative for braking)
    pub accel_ms2: f64,

    /// Demanded speed at the end of the next timestep
    pub speed_ms: f64,
}
