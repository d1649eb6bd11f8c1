//! Signal-compatible entry scheduling
//!
//! Pushes the earliest feasible entry time forward to the next time
//! compatible with the predicted signal phase. This is a single-phase-ahead
//! approximation, not a multi-cycle signal-timing search.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use sig_if::phase::{SignalPhase, SignalPrediction};

// Internal
use super::state::ApchPlan;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

// TODO: both scheduling margins below approximate the next cycle's green
// start from the current phase's start time. Replace with the phase
// predictor's per-phase schedule once it exposes one.

/// Clearance added past the start of the next cycle when the current green
/// cannot be met.
const NEXT_GREEN_CLEARANCE_S: f64 = 2.0;

/// Lead before the next cycle start used when scheduling through yellow.
const YELLOW_GREEN_LEAD_S: f64 = 5.0;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ApchPlan {
    /// Schedule the entry so that it falls inside a green interval.
    ///
    /// Returns a time no earlier than `earliest_entry_time_s`:
    ///
    /// - Green: keep the earliest time if it fits in the remaining green
    ///   (shortened by the green-light time buffer), otherwise push to the
    ///   next cycle's green.
    /// - Yellow: never schedulable, target the next cycle's green start.
    /// - Red: wait out the red if the vehicle could arrive sooner, otherwise
    ///   the earliest time already lands after the red clears.
    /// - Unknown: pass the earliest time through open-loop.
    pub(crate) fn nearest_green_entry_time(
        &self,
        current_time_s: f64,
        earliest_entry_time_s: f64,
        signal: &SignalPrediction,
    ) -> f64 {
        match signal.phase {
            SignalPhase::Green => {
                let usable_green_s =
                    signal.remaining_time_s - self.params.green_light_time_buffer_s;
                if earliest_entry_time_s - current_time_s < usable_green_s {
                    earliest_entry_time_s
                } else {
                    earliest_entry_time_s.max(
                        signal.phase_start_time_s + signal.cycle_length_s + NEXT_GREEN_CLEARANCE_S,
                    )
                }
            }
            SignalPhase::Yellow => earliest_entry_time_s
                .max(signal.phase_start_time_s + signal.cycle_length_s - YELLOW_GREEN_LEAD_S),
            SignalPhase::Red => {
                if earliest_entry_time_s - current_time_s < signal.remaining_time_s {
                    current_time_s + signal.remaining_time_s
                } else {
                    earliest_entry_time_s
                }
            }
            SignalPhase::Unknown => earliest_entry_time_s,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::Params;
    use super::*;

    fn planner() -> ApchPlan {
        ApchPlan::new(Params::default())
    }

    fn prediction(phase: SignalPhase) -> SignalPrediction {
        SignalPrediction {
            phase,
            remaining_time_s: 20.0,
            cycle_length_s: 60.0,
            phase_start_time_s: 95.0,
        }
    }

    #[test]
    fn test_green_within_remaining() {
        let p = planner();
        let et = p.nearest_green_entry_time(100.0, 110.0, &prediction(SignalPhase::Green));
        assert_eq!(et, 110.0);
    }

    #[test]
    fn test_green_overflow_to_next_cycle() {
        let p = planner();
        // 25 s out but only 20 s of green remain: pushed to the next
        // cycle's green start plus clearance.
        let et = p.nearest_green_entry_time(100.0, 125.0, &prediction(SignalPhase::Green));
        assert_eq!(et, 95.0 + 60.0 + 2.0);
    }

    #[test]
    fn test_green_buffer_shortens_usable_green() {
        let mut params = Params::default();
        params.green_light_time_buffer_s = 15.0;
        let p = ApchPlan::new(params);
        // 10 s out fits the raw remaining green but not the buffered green.
        let et = p.nearest_green_entry_time(100.0, 110.0, &prediction(SignalPhase::Green));
        assert_eq!(et, 95.0 + 60.0 + 2.0);
    }

    #[test]
    fn test_yellow_targets_next_cycle() {
        let p = planner();
        let et = p.nearest_green_entry_time(100.0, 110.0, &prediction(SignalPhase::Yellow));
        assert_eq!(et, 95.0 + 60.0 - 5.0);
    }

    #[test]
    fn test_red_waits_for_green() {
        let p = planner();
        // Could arrive in 10 s but red holds for 20 s: wait out the red.
        let et = p.nearest_green_entry_time(100.0, 110.0, &prediction(SignalPhase::Red));
        assert_eq!(et, 120.0);
    }

    #[test]
    fn test_red_already_cleared_by_arrival() {
        let p = planner();
        let et = p.nearest_green_entry_time(100.0, 125.0, &prediction(SignalPhase::Red));
        assert_eq!(et, 125.0);
    }

    #[test]
    fn test_unknown_passes_through() {
        let p = planner();
        let et = p.nearest_green_entry_time(100.0, 110.0, &prediction(SignalPhase::Unknown));
        assert_eq!(et, 110.0);
    }
}
