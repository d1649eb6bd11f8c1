//! Approach planning module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};

// Internal
use super::traj::TsCase;
use super::{boundary, cases, ApchPlanError, Params};
use crate::vehicle::Vehicle;
use sig_if::cmd::DriveCmd;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Approach planner
///
/// The planner holds no mutable state of its own, only the configuration and
/// the comfort limits derived from it. All per-vehicle state lives in the
/// caller-owned [`Vehicle`] record, so one planner instance can serve many
/// vehicles.
pub struct ApchPlan {
    pub(super) params: Params,

    /// Comfort-scaled acceleration limit
    max_comfort_accel_ms2: f64,

    /// Comfort-scaled deceleration limit (signed, negative)
    max_comfort_decel_ms2: f64,
}

/// The status report for one planning call.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Transit state the vehicle was classified into on this tick
    pub transit_state: TransitState,

    /// The trajectory case selected, `None` outside the approaching state
    pub ts_case: Option<TsCase>,

    /// False when the remaining distance is below the minimum achievable
    /// stopping distance (the emergency regime)
    pub is_algorithm_successful: bool,

    /// Earliest physically feasible stop bar entry time
    pub earliest_entry_time_s: Option<f64>,

    /// Entry time scheduled against the predicted signal phase
    pub scheduled_entry_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The vehicle's coarse phase with respect to the intersection approach.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitState {
    /// No applicable signal in range, the planner defers to the host
    Unavailable,
    /// Approaching the stop bar, trajectory smoothing is active
    Approaching,
    /// Stopped at the stop bar waiting for green
    Waiting,
    /// Cleared to traverse the intersection
    Departing,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TransitState {
    fn default() -> Self {
        TransitState::Unavailable
    }
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            transit_state: TransitState::Unavailable,
            ts_case: None,
            is_algorithm_successful: true,
            earliest_entry_time_s: None,
            scheduled_entry_time_s: None,
        }
    }
}

impl ApchPlan {
    /// Initialise the approach planner.
    ///
    /// Expected init data is a path to the parameter file.
    pub fn init(params_path: &str) -> Result<Self, ApchPlanError> {
        let params: Params = util::params::load(params_path)?;
        Ok(Self::new(params))
    }

    /// Build a planner from already-loaded parameters.
    pub fn new(params: Params) -> Self {
        let max_comfort_accel_ms2 = params.accel_limit_ms2 * params.accel_limit_mult;
        let max_comfort_decel_ms2 = -(params.decel_limit_ms2 * params.decel_limit_mult);

        Self {
            params,
            max_comfort_accel_ms2,
            max_comfort_decel_ms2,
        }
    }

    /// Process one control tick for one vehicle.
    ///
    /// Runs the transit-state transition and, in the approaching state, the
    /// full solver pipeline. On success the transit states and the suggested
    /// command are written back into the vehicle record. On error the record
    /// is left exactly as it was.
    pub fn proc(&self, veh: &mut Vehicle) -> Result<StatusReport, ApchPlanError> {
        let (prev, cur) = self.next_transit_state(veh);

        let mut report = StatusReport {
            transit_state: cur,
            ..StatusReport::default()
        };

        let cmd = match cur {
            // Outside the activation window, while stopped, and through the
            // intersection the host's own command passes through unchanged
            TransitState::Unavailable | TransitState::Waiting | TransitState::Departing => {
                veh.host_cmd
            }
            TransitState::Approaching => self.plan_approaching(veh, &mut report)?,
        };

        veh.transit_state_prev = prev;
        veh.transit_state = cur;
        veh.suggested_cmd = cmd;

        Ok(report)
    }

    /// Evaluate the transit-state transition table for this tick.
    ///
    /// Returns `(previous, next)` without mutating the vehicle record, so a
    /// later planning failure cannot leave a half-updated record.
    fn next_transit_state(&self, veh: &Vehicle) -> (TransitState, TransitState) {
        let prev = veh.transit_state;
        let dist = veh.distance_to_signal_m;

        if dist < 0.0 || dist > self.params.activation_distance_m {
            return (prev, TransitState::Unavailable);
        }

        let next = match prev {
            TransitState::Unavailable => TransitState::Approaching,
            TransitState::Approaching if dist <= self.params.desired_stop_buffer_m => {
                if veh.speed_ms <= self.params.algo_stopping_speed_ms {
                    TransitState::Waiting
                } else if veh.signal.phase.is_green() && veh.can_depart {
                    TransitState::Departing
                } else {
                    prev
                }
            }
            TransitState::Waiting if veh.signal.phase.is_green() => TransitState::Departing,
            _ => prev,
        };

        (prev, next)
    }

    /// The full solver pipeline for the approaching state.
    fn plan_approaching(
        &self,
        veh: &Vehicle,
        report: &mut StatusReport,
    ) -> Result<DriveCmd, ApchPlanError> {
        // A vehicle already at crawl speed is handed back to the host, the
        // closed forms assume the vehicle is moving
        if veh.speed_ms <= self.params.algo_stopping_speed_ms {
            return Ok(veh.host_cmd);
        }

        let max_accel = veh.accel_max_ms2.min(self.max_comfort_accel_ms2);
        let max_decel = veh.decel_max_ms2.max(self.max_comfort_decel_ms2);

        let downtrack_vehicle = 0.0;
        let downtrack_intersection = downtrack_vehicle + veh.distance_to_signal_m;
        let dx = veh.distance_to_signal_m;

        // Floor used by the trajectory constructors, never above the current
        // speed so decelerate-first shapes remain solvable
        let min_speed = self
            .params
            .algo_stopping_speed_ms
            .max(veh.speed_ms.min(self.params.algo_minimum_speed_ms));

        let earliest_entry_time = veh.sim_time_s
            + self.earliest_entry_time(
                dx,
                veh.speed_max_ms,
                veh.speed_ms,
                veh.speed_departure_ms,
                max_accel,
                max_decel,
            );

        let scheduled_entry_time =
            self.nearest_green_entry_time(veh.sim_time_s, earliest_entry_time, &veh.signal);

        let bounds = boundary::delta_x(
            veh.speed_ms,
            veh.speed_departure_ms,
            veh.speed_max_ms,
            self.params.algo_minimum_speed_ms,
            max_accel,
            max_decel,
        );

        let trajs = boundary::boundary_trajectories(
            veh.sim_time_s,
            veh.speed_ms,
            veh.speed_departure_ms,
            veh.speed_max_ms,
            min_speed,
            max_accel,
            max_decel,
            downtrack_vehicle,
            downtrack_intersection,
            dx,
            &bounds,
        )?;

        let ts_params = cases::select_case(
            veh.timestep_s,
            veh.sim_time_s,
            scheduled_entry_time,
            veh.speed_ms,
            veh.speed_departure_ms,
            veh.speed_max_ms,
            min_speed,
            max_accel,
            max_decel,
            downtrack_vehicle,
            downtrack_intersection,
            dx,
            &bounds,
            &trajs,
        )?;

        debug!(
            "veh {}: eet {:.3} set {:.3} case {:?} ok {}",
            veh.veh_id,
            earliest_entry_time,
            scheduled_entry_time,
            ts_params.case,
            ts_params.is_algorithm_successful
        );

        report.ts_case = ts_params.case;
        report.is_algorithm_successful = ts_params.is_algorithm_successful;
        report.earliest_entry_time_s = Some(earliest_entry_time);
        report.scheduled_entry_time_s = Some(scheduled_entry_time);

        // Clamp to the vehicle's hard limits, then never exceed the host's
        // own suggestion
        let mut accel = clamp(
            &ts_params.accel_next_ms2,
            &veh.decel_max_ms2,
            &veh.accel_max_ms2,
        );
        accel = accel.min(veh.host_cmd.accel_ms2);

        Ok(DriveCmd {
            accel_ms2: accel,
            speed_ms: veh.speed_ms + (accel * veh.timestep_s),
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use sig_if::phase::{SignalPhase, SignalPrediction};

    fn planner() -> ApchPlan {
        ApchPlan::new(Params::default())
    }

    /// A vehicle 150 m out at 12 m/s with a fresh green.
    fn approaching_vehicle() -> Vehicle {
        Vehicle {
            veh_id: 42,
            timestep_s: 0.1,
            sim_time_s: 0.0,
            speed_ms: 12.0,
            speed_max_ms: 15.0,
            speed_departure_ms: 15.0,
            accel_max_ms2: 3.0,
            decel_max_ms2: -10.0,
            distance_to_signal_m: 150.0,
            signal: SignalPrediction {
                phase: SignalPhase::Green,
                remaining_time_s: 30.0,
                cycle_length_s: 60.0,
                phase_start_time_s: 0.0,
            },
            transit_state: TransitState::Unavailable,
            transit_state_prev: TransitState::Unavailable,
            host_cmd: DriveCmd {
                accel_ms2: 2.0,
                speed_ms: 12.2,
            },
            ..Vehicle::default()
        }
    }

    #[test]
    fn test_out_of_range_passes_host_command_through() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.distance_to_signal_m = 250.0;

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Unavailable);
        assert_eq!(report.ts_case, None);
        assert_eq!(veh.transit_state, TransitState::Unavailable);
        assert_eq!(veh.suggested_cmd, veh.host_cmd);
    }

    #[test]
    fn test_negative_distance_is_unavailable() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Approaching;
        veh.distance_to_signal_m = -1.0;

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Unavailable);
        assert_eq!(veh.transit_state_prev, TransitState::Approaching);
    }

    #[test]
    fn test_green_approach_accelerates_to_free_flow() {
        let p = planner();
        let mut veh = approaching_vehicle();

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Approaching);
        assert_eq!(veh.transit_state, TransitState::Approaching);
        assert_eq!(veh.transit_state_prev, TransitState::Unavailable);

        // The green is long enough for the earliest feasible entry, so the
        // schedule keeps it and the cruise-capable case 1 applies
        let eet = report.earliest_entry_time_s.unwrap();
        let set = report.scheduled_entry_time_s.unwrap();
        assert!((eet - 10.2).abs() < 1e-9);
        assert!(eet <= set);
        assert_eq!(report.ts_case, Some(TsCase::Case1));
        assert!(report.is_algorithm_successful);

        // Comfort acceleration towards free flow speed
        assert!((veh.suggested_cmd.accel_ms2 - 1.5).abs() < 1e-9);
        assert!((veh.suggested_cmd.speed_ms - 12.15).abs() < 1e-9);
    }

    #[test]
    fn test_stopped_at_bar_is_waiting() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Approaching;
        veh.distance_to_signal_m = 8.0;
        veh.speed_ms = 0.05;
        veh.signal.phase = SignalPhase::Red;

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Waiting);
        assert_eq!(report.ts_case, None);
        assert_eq!(veh.suggested_cmd, veh.host_cmd);
    }

    #[test]
    fn test_waiting_to_departing_on_green() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Waiting;
        veh.distance_to_signal_m = 8.0;
        veh.speed_ms = 0.0;
        veh.signal.phase = SignalPhase::Green;

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Departing);
        assert_eq!(veh.suggested_cmd, veh.host_cmd);
    }

    #[test]
    fn test_cleared_approach_departs_directly() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Approaching;
        veh.distance_to_signal_m = 8.0;
        veh.speed_ms = 4.0;
        veh.can_depart = true;

        let report = p.proc(&mut veh).unwrap();

        assert_eq!(report.transit_state, TransitState::Departing);
    }

    #[test]
    fn test_unsafe_stopping_distance_flags_failure() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Approaching;
        veh.distance_to_signal_m = 5.0;
        veh.signal = SignalPrediction {
            phase: SignalPhase::Red,
            remaining_time_s: 20.0,
            cycle_length_s: 60.0,
            phase_start_time_s: 0.0,
        };

        let report = p.proc(&mut veh).unwrap();

        // Still approaching (above stopping speed), but the red pushes the
        // schedule far beyond what 5 m allows
        assert_eq!(report.transit_state, TransitState::Approaching);
        assert_eq!(report.ts_case, Some(TsCase::Case8));
        assert!(!report.is_algorithm_successful);

        // Comfort braking, within the vehicle's hard limits
        assert!((veh.suggested_cmd.accel_ms2 - (-1.5)).abs() < 1e-9);
        assert!(veh.suggested_cmd.accel_ms2 >= veh.decel_max_ms2);
        assert!(veh.suggested_cmd.accel_ms2 <= veh.accel_max_ms2);
    }

    #[test]
    fn test_host_command_caps_suggestion() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.host_cmd.accel_ms2 = 1.0;

        p.proc(&mut veh).unwrap();

        // The planner wanted 1.5 but the host only allows 1.0
        assert!((veh.suggested_cmd.accel_ms2 - 1.0).abs() < 1e-9);
        assert!((veh.suggested_cmd.speed_ms - 12.1).abs() < 1e-9);
    }

    #[test]
    fn test_crawling_approach_passes_host_command_through() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.speed_ms = 0.05;

        let report = p.proc(&mut veh).unwrap();

        // Still approaching (well short of the stop buffer) but too slow for
        // the closed forms
        assert_eq!(report.transit_state, TransitState::Approaching);
        assert_eq!(report.ts_case, None);
        assert_eq!(veh.suggested_cmd, veh.host_cmd);
    }

    #[test]
    fn test_identical_inputs_give_identical_outputs() {
        let p = planner();
        let mut veh_a = approaching_vehicle();
        veh_a.transit_state = TransitState::Approaching;
        let mut veh_b = veh_a.clone();

        let report_a = p.proc(&mut veh_a).unwrap();
        let report_b = p.proc(&mut veh_b).unwrap();

        assert_eq!(veh_a.suggested_cmd, veh_b.suggested_cmd);
        assert_eq!(veh_a.transit_state, veh_b.transit_state);
        assert_eq!(report_a.ts_case, report_b.ts_case);
        assert_eq!(
            report_a.scheduled_entry_time_s,
            report_b.scheduled_entry_time_s
        );

        // A second call with unchanged inputs reproduces the same command
        let report_a2 = p.proc(&mut veh_a).unwrap();
        assert_eq!(veh_a.suggested_cmd, veh_b.suggested_cmd);
        assert_eq!(report_a2.ts_case, report_a.ts_case);
    }

    #[test]
    fn test_degenerate_inputs_leave_vehicle_untouched() {
        let p = planner();
        let mut veh = approaching_vehicle();
        veh.transit_state = TransitState::Approaching;
        // Exactly at free flow with departure at free flow: the no-cruise
        // bracket solver's denominator vanishes
        veh.speed_ms = 10.0;
        veh.speed_max_ms = 10.0;
        veh.speed_departure_ms = 10.0;

        let before = veh.clone();
        let result = p.proc(&mut veh);

        assert!(matches!(
            result,
            Err(ApchPlanError::DegenerateDenominator { .. })
        ));
        assert_eq!(veh.transit_state, before.transit_state);
        assert_eq!(veh.transit_state_prev, before.transit_state_prev);
        assert_eq!(veh.suggested_cmd, before.suggested_cmd);
    }
}
