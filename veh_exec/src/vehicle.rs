//! Vehicle record
//!
//! The [`Vehicle`] struct is the per-vehicle mutable state carried across
//! control ticks. It is owned by the caller (the simulation or the vehicle
//! control harness), which refreshes the kinematic and signal-prediction
//! fields before each planning call. The approach planner only reads the
//! record and, on success, writes the transit state and its suggested
//! command back into it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::apch_plan::TransitState;
use sig_if::{cmd::DriveCmd, phase::SignalPrediction};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-vehicle state shared between the host controller and the planner.
///
/// Invariants: `decel_max_ms2 < 0.0 < accel_max_ms2` and `speed_ms >= 0.0`.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    /// Vehicle identifier
    pub veh_id: u64,

    /// Length of one control tick
    pub timestep_s: f64,

    /// Absolute simulation time at the start of this tick
    pub sim_time_s: f64,

    /// Current speed
    pub speed_ms: f64,

    /// Free flow (maximum desired) speed
    pub speed_max_ms: f64,

    /// Desired speed when crossing the stop bar
    pub speed_departure_ms: f64,

    /// Current acceleration
    pub accel_ms2: f64,

    /// Maximum acceleration the vehicle can achieve
    pub accel_max_ms2: f64,

    /// Maximum deceleration the vehicle can achieve (signed, negative)
    pub decel_max_ms2: f64,

    /// Distance to the controlling signal's stop bar.
    ///
    /// Negative or beyond the activation distance means no applicable signal.
    pub distance_to_signal_m: f64,

    /// Predicted state of the controlling signal
    pub signal: SignalPrediction,

    /// Whether the vehicle is cleared to depart through the intersection
    pub can_depart: bool,

    /// Transit state computed on this tick
    pub transit_state: TransitState,

    /// Transit state computed on the previous tick
    pub transit_state_prev: TransitState,

    /// The host controller's own fallback command for this tick
    pub host_cmd: DriveCmd,

    /// The command suggested by the approach planner on this tick
    pub suggested_cmd: DriveCmd,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            veh_id: 0,
            timestep_s: 0.1,
            sim_time_s: 0.0,
            speed_ms: 0.0,
            speed_max_ms: 0.0,
            speed_departure_ms: 0.0,
            accel_ms2: 0.0,
            accel_max_ms2: 3.0,
            decel_max_ms2: -10.0,
            distance_to_signal_m: -1.0,
            signal: SignalPrediction::default(),
            can_depart: false,
            transit_state: TransitState::Unavailable,
            transit_state_prev: TransitState::Unavailable,
            host_cmd: DriveCmd::default(),
            suggested_cmd: DriveCmd::default(),
        }
    }
}
