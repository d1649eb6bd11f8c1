//! Scenario driver for the vehicle executable
//!
//! Stands in for the host control stack: a scripted fixed-cycle signal
//! provides the phase prediction, a simple speed-tracking driver model
//! provides the fallback command, and the suggested command is integrated
//! forward with explicit Euler steps until the vehicle crosses the stop bar
//! or the scenario times out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

// Internal
use sig_if::{
    cmd::DriveCmd,
    phase::{SignalPhase, SignalPrediction},
};
use util::{maths::clamp, session::Session};
use veh_lib::{
    apch_plan::{ApchPlan, TransitState, TsCase},
    vehicle::Vehicle,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the demonstration scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioParams {
    /// Length of one control tick
    pub timestep_s: f64,

    /// Scenario timeout
    pub duration_s: f64,

    /// Distance from the vehicle to the stop bar at scenario start
    pub initial_distance_to_signal_m: f64,

    /// Vehicle speed at scenario start
    pub initial_speed_ms: f64,

    /// Free flow speed
    pub speed_max_ms: f64,

    /// Desired speed when crossing the stop bar
    pub speed_departure_ms: f64,

    /// Maximum vehicle acceleration
    pub accel_max_ms2: f64,

    /// Maximum vehicle deceleration (signed, negative)
    pub decel_max_ms2: f64,

    /// Red phase duration
    pub red_time_s: f64,

    /// Yellow phase duration
    pub yellow_time_s: f64,

    /// Green phase duration
    pub green_time_s: f64,

    /// Offset into the cycle at scenario start
    pub cycle_offset_s: f64,

    /// Proportional gain of the host driver model's speed tracking
    pub host_speed_gain: f64,
}

/// One tick of the scenario, recorded for offline plotting
#[derive(Serialize, Debug, Clone)]
pub struct TickRecord {
    pub time_s: f64,
    pub distance_to_signal_m: f64,
    pub speed_ms: f64,
    pub accel_ms2: f64,
    pub signal_phase: SignalPhase,
    pub transit_state: TransitState,
    pub ts_case: Option<TsCase>,
    pub is_algorithm_successful: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the scenario to completion and dump the tick records.
pub fn run(planner: &ApchPlan, params: &ScenarioParams, session: &Session) -> Result<(), Report> {
    let mut veh = Vehicle {
        veh_id: 1,
        timestep_s: params.timestep_s,
        speed_ms: params.initial_speed_ms,
        speed_max_ms: params.speed_max_ms,
        speed_departure_ms: params.speed_departure_ms,
        accel_max_ms2: params.accel_max_ms2,
        decel_max_ms2: params.decel_max_ms2,
        distance_to_signal_m: params.initial_distance_to_signal_m,
        ..Vehicle::default()
    };

    let num_ticks = (params.duration_s / params.timestep_s) as usize;
    let mut records: Vec<TickRecord> = Vec::with_capacity(num_ticks);

    info!(
        "Scenario start: {:.1} m to the stop bar at {:.1} m/s",
        veh.distance_to_signal_m, veh.speed_ms
    );

    let mut crossed = false;

    for tick in 0..num_ticks {
        let time_s = tick as f64 * params.timestep_s;

        // ---- INPUT ACQUISITION ----

        veh.sim_time_s = time_s;
        veh.signal = signal_prediction(time_s, params);
        veh.can_depart = veh.signal.phase.is_green();
        veh.host_cmd = host_cmd(&veh, params);

        // ---- APPROACH PLANNING ----

        let report = match planner.proc(&mut veh) {
            Ok(report) => Some(report),
            Err(e) => {
                // Tick-local failure: fall back to the host's own command
                warn!("Planning failed on tick {}: {}", tick, e);
                veh.suggested_cmd = veh.host_cmd;
                None
            }
        };

        // ---- INTEGRATION ----

        veh.accel_ms2 = veh.suggested_cmd.accel_ms2;
        veh.speed_ms = (veh.speed_ms + veh.accel_ms2 * params.timestep_s).max(0.0);
        veh.distance_to_signal_m -= veh.speed_ms * params.timestep_s;

        debug!(
            "t {:7.2}: dist {:7.2} m, speed {:5.2} m/s, accel {:5.2} m/s^2, {:?}",
            time_s, veh.distance_to_signal_m, veh.speed_ms, veh.accel_ms2, veh.transit_state
        );

        records.push(TickRecord {
            time_s,
            distance_to_signal_m: veh.distance_to_signal_m,
            speed_ms: veh.speed_ms,
            accel_ms2: veh.accel_ms2,
            signal_phase: veh.signal.phase,
            transit_state: veh.transit_state,
            ts_case: report.as_ref().and_then(|r| r.ts_case),
            is_algorithm_successful: report.map(|r| r.is_algorithm_successful).unwrap_or(false),
        });

        if veh.distance_to_signal_m <= 0.0 {
            info!(
                "Crossed the stop bar at t {:.2} s doing {:.2} m/s during {:?}",
                time_s, veh.speed_ms, veh.signal.phase
            );
            crossed = true;
            break;
        }
    }

    if !crossed {
        warn!(
            "Scenario timed out after {:.1} s with {:.2} m remaining",
            params.duration_s, veh.distance_to_signal_m
        );
    }

    // ---- DIAGNOSTIC DUMP ----

    let records_path = session.session_root.join("tick_records.json");
    let records_json =
        serde_json::to_string_pretty(&records).wrap_err("Could not serialise tick records")?;
    std::fs::write(&records_path, records_json).wrap_err("Could not write tick records")?;

    info!("Wrote {} tick records to {:?}", records.len(), records_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Phase prediction for the scripted fixed cycle.
///
/// The cycle runs red, then green, then yellow.
fn signal_prediction(time_s: f64, params: &ScenarioParams) -> SignalPrediction {
    let cycle_length_s = params.red_time_s + params.green_time_s + params.yellow_time_s;
    let cycle_pos_s = (time_s + params.cycle_offset_s).rem_euclid(cycle_length_s);

    let (phase, phase_begin_s, phase_end_s) = if cycle_pos_s < params.red_time_s {
        (SignalPhase::Red, 0.0, params.red_time_s)
    } else if cycle_pos_s < params.red_time_s + params.green_time_s {
        (
            SignalPhase::Green,
            params.red_time_s,
            params.red_time_s + params.green_time_s,
        )
    } else {
        (
            SignalPhase::Yellow,
            params.red_time_s + params.green_time_s,
            cycle_length_s,
        )
    };

    SignalPrediction {
        phase,
        remaining_time_s: phase_end_s - cycle_pos_s,
        cycle_length_s,
        phase_start_time_s: time_s - (cycle_pos_s - phase_begin_s),
    }
}

/// Host driver model: proportional speed tracking towards free flow speed.
fn host_cmd(veh: &Vehicle, params: &ScenarioParams) -> DriveCmd {
    let accel_ms2 = clamp(
        &(params.host_speed_gain * (veh.speed_max_ms - veh.speed_ms)),
        &veh.decel_max_ms2,
        &veh.accel_max_ms2,
    );

    DriveCmd {
        accel_ms2,
        speed_ms: veh.speed_ms + accel_ms2 * params.timestep_s,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> ScenarioParams {
        ScenarioParams {
            timestep_s: 0.1,
            duration_s: 120.0,
            initial_distance_to_signal_m: 250.0,
            initial_speed_ms: 12.0,
            speed_max_ms: 15.0,
            speed_departure_ms: 15.0,
            accel_max_ms2: 3.0,
            decel_max_ms2: -10.0,
            red_time_s: 25.0,
            yellow_time_s: 5.0,
            green_time_s: 30.0,
            cycle_offset_s: 0.0,
            host_speed_gain: 0.5,
        }
    }

    #[test]
    fn test_signal_cycle_phases() {
        let p = params();

        let red = signal_prediction(10.0, &p);
        assert_eq!(red.phase, SignalPhase::Red);
        assert!((red.remaining_time_s - 15.0).abs() < 1e-9);
        assert!((red.phase_start_time_s - 0.0).abs() < 1e-9);
        assert!((red.cycle_length_s - 60.0).abs() < 1e-9);

        let green = signal_prediction(30.0, &p);
        assert_eq!(green.phase, SignalPhase::Green);
        assert!((green.remaining_time_s - 25.0).abs() < 1e-9);
        assert!((green.phase_start_time_s - 25.0).abs() < 1e-9);

        let yellow = signal_prediction(57.0, &p);
        assert_eq!(yellow.phase, SignalPhase::Yellow);
        assert!((yellow.remaining_time_s - 3.0).abs() < 1e-9);

        // Next cycle wraps back to red
        let red2 = signal_prediction(61.0, &p);
        assert_eq!(red2.phase, SignalPhase::Red);
        assert!((red2.phase_start_time_s - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_host_cmd_tracks_free_flow_speed() {
        let p = params();
        let mut veh = Vehicle {
            speed_ms: 12.0,
            speed_max_ms: 15.0,
            ..Vehicle::default()
        };

        let cmd = host_cmd(&veh, &p);
        assert!((cmd.accel_ms2 - 1.5).abs() < 1e-9);

        // At free flow speed the host holds
        veh.speed_ms = 15.0;
        let cmd = host_cmd(&veh, &p);
        assert!(cmd.accel_ms2.abs() < 1e-9);
    }
}
