//! Signal phase and phase-prediction types

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The phase of a traffic signal as reported by the phase predictor.
///
/// The wire representation uses the numeric phase codes of the upstream
/// phase-prediction message set (1 = red, 2 = yellow, 3 = green, 6 =
/// unknown), see [`SignalPhase::from_code`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalPhase {
    Red,
    Yellow,
    Green,
    Unknown,
}

/// Errors associated with decoding signal phases.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("Unrecognised signal phase code: {0}")]
    UnknownCode(i64),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The predicted state of the signal controlling the vehicle's approach lane.
///
/// Produced once per tick by the phase-prediction collaborator and consumed
/// by the approach planner. All times are in seconds of simulation time.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPrediction {
    /// Current phase of the controlling signal group
    pub phase: SignalPhase,

    /// Time remaining in the current phase
    pub remaining_time_s: f64,

    /// Length of a full signal cycle
    pub cycle_length_s: f64,

    /// Absolute time at which the current phase started
    pub phase_start_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SignalPhase {
    /// Decode a numeric phase code.
    pub fn from_code(code: i64) -> Result<Self, PhaseError> {
        match code {
            1 => Ok(SignalPhase::Red),
            2 => Ok(SignalPhase::Yellow),
            3 => Ok(SignalPhase::Green),
            6 => Ok(SignalPhase::Unknown),
            c => Err(PhaseError::UnknownCode(c)),
        }
    }

    /// Get the numeric phase code for this phase.
    pub fn to_code(&self) -> i64 {
        match self {
            SignalPhase::Red => 1,
            SignalPhase::Yellow => 2,
            SignalPhase::Green => 3,
            SignalPhase::Unknown => 6,
        }
    }

    /// True if the phase permits entry into the intersection.
    pub fn is_green(&self) -> bool {
        matches!(self, SignalPhase::Green)
    }
}

impl Default for SignalPhase {
    fn default() -> Self {
        SignalPhase::Unknown
    }
}

impl Default for SignalPrediction {
    fn default() -> Self {
        Self {
            phase: SignalPhase::Unknown,
            remaining_time_s: 0.0,
            cycle_length_s: 0.0,
            phase_start_time_s: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_phase_codes() {
        for &phase in &[
            SignalPhase::Red,
            SignalPhase::Yellow,
            SignalPhase::Green,
            SignalPhase::Unknown,
        ] {
            assert_eq!(SignalPhase::from_code(phase.to_code()).unwrap(), phase);
        }

        assert!(SignalPhase::from_code(0).is_err());
        assert!(SignalPhase::from_code(4).is_err());
        assert!(SignalPhase::from_code(5).is_err());
        assert!(SignalPhase::from_code(7).is_err());
    }

    #[test]
    fn test_is_green() {
        assert!(SignalPhase::Green.is_green());
        assert!(!SignalPhase::Red.is_green());
        assert!(!SignalPhase::Yellow.is_green());
        assert!(!SignalPhase::Unknown.is_green());
    }
}
