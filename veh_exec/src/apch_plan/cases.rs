//! Case selection and exact trajectory re-derivation
//!
//! Given the scheduled entry time, the bracket whose final times enclose it
//! determines the structural pattern of the solution (accelerate first or
//! decelerate first, with or without a cruise leg). Each case solves the
//! exact trajectory achieving the scheduled entry time within that pattern
//! and the one-step acceleration command is extracted from it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::boundary::BoundaryDistances;
use super::traj::{TrajectoryParams, TsCase};
use super::{ApchPlanError, ACCEL_EPSILON, EPSILON};
use util::maths::within_band;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the bracket containing the scheduled entry time `et`, solve the
/// exact trajectory for it, and extract the acceleration command for the
/// current timestep `delta_t`.
///
/// `trajs` must be the eight bracket trajectories in order; anything else is
/// an internal invariant breach.
pub(crate) fn select_case(
    delta_t: f64,
    t: f64,
    et: f64,
    v0: f64,
    v1: f64,
    v_max: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
    bounds: &BoundaryDistances,
    trajs: &[TrajectoryParams],
) -> Result<TrajectoryParams, ApchPlanError> {
    if trajs.len() != 8 {
        return Err(ApchPlanError::WrongBoundaryCount(trajs.len()));
    }

    let mut veh_traj = if et < trajs[0].t3_s {
        // Scheduled earlier than physically possible: plan for the earliest
        // achievable entry instead
        let mut traj = ts_case1(t, trajs[0].t3_s, v0, v1, v_max, a_max, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case1);
        traj
    } else if et < trajs[1].t3_s {
        let mut traj = ts_case1(t, et, v0, v1, v_max, a_max, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case1);
        traj
    } else if et < trajs[2].t3_s {
        let mut traj = ts_case2(t, et, v0, v1, a_max, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case2);
        traj
    } else if et < trajs[3].t3_s {
        let mut traj = ts_case3(t, et, v0, v1, a_max, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case3);
        traj
    } else if et < trajs[4].t3_s {
        let mut traj = ts_case4(t, et, v0, v1, v_min, a_max, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case4);
        traj
    } else if et < trajs[5].t3_s {
        let mut traj = ts_case5(t, et, v0, a_max, a_min, x0, x_end, dx);
        traj.case = Some(TsCase::Case5);
        traj
    } else if et < trajs[6].t3_s {
        let mut traj = ts_case6(t, et, v0, v_min, a_min, x0, x_end, dx, bounds.dx3_m, &trajs[5])?;
        traj.case = Some(TsCase::Case6);
        traj
    } else if et <= trajs[7].t3_s {
        let mut traj = ts_case7(t, et, v0, v_min, a_min, x0, x_end, dx)?;
        traj.case = Some(TsCase::Case7);
        traj
    } else {
        let mut traj = ts_case8(dx, bounds.dx5_m, &trajs[7]);
        traj.case = Some(TsCase::Case8);
        traj
    };

    veh_traj.accel_next_ms2 = veh_traj.accel_for_timestep(delta_t);

    Ok(veh_traj)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Accelerate to free flow speed, cruise there, decelerate to the departure
/// speed, with the cruise duration solved so the bar is crossed at `et`.
fn ts_case1(
    t: f64,
    et: f64,
    v0: f64,
    v1: f64,
    v_max: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;
    let ratio = a_max / a_min;

    let nom1 = 2.0 * dx * (((1.0 - ratio) * v_max) + (ratio * v1) - v0);
    let nom2 = dt * (((1.0 - ratio) * v_max.powi(2)) + (ratio * v1.powi(2)) - v0.powi(2));
    let den = (v_max - v0).powi(2) - (ratio * (v_max - v1).powi(2));

    if within_band(den, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case1: den",
            value: den,
        });
    }

    let tc = (nom1 - nom2) / den;

    traj.v1_ms = v_max;

    if within_band(dt - tc, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case1: dt - tc",
            value: dt - tc,
        });
    }

    traj.a1_ms2 = (((1.0 - ratio) * v_max) + (ratio * v1) - v0) / (dt - tc);

    if within_band(traj.a1_ms2, ACCEL_EPSILON) {
        // Near-flat first leg: already at free flow, split the non-cruise
        // time on the constant-speed line
        traj.t1_s = traj.t0_s + ((dt - tc) * (a_max / (a_max - a_min)));
        traj.x1_m = traj.x0_m + (v_max * (traj.t1_s - traj.t0_s));
    } else {
        traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
        traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));
    }

    traj.a2_ms2 = 0.0;
    traj.v2_ms = v_max;
    traj.t2_s = traj.t1_s + tc;
    traj.x2_m = traj.x1_m + (v_max * tc);

    traj.t3_s = et;
    traj.a3_ms2 = traj.a1_ms2 * (a_min / a_max);
    traj.v3_ms = v1;
    traj.x3_m = x_end;

    Ok(traj)
}

/// Accelerate to an inflection speed below free flow then decelerate to the
/// departure speed, no cruise, crossing the bar at `et`.
fn ts_case2(
    t: f64,
    et: f64,
    v0: f64,
    v1: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;

    if within_band(dt, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case2: dt",
            value: dt,
        });
    }

    let ratio = a_max / a_min;
    let sqr1 = (1.0 - ratio).powi(2) * (dx / dt).powi(2);
    let sqr2 = (1.0 - ratio)
        * ((ratio * v1 * (v1 - (2.0 * dx / dt))) + (v0 * ((2.0 * dx / dt) - v0)));
    let v_hat = (dx / dt) + ((sqr1 - sqr2).sqrt() / (1.0 - ratio));

    traj.v1_ms = v_hat;
    traj.a1_ms2 = (((1.0 - ratio) * v_hat) + (ratio * v1) - v0) / dt;

    if within_band(traj.a1_ms2, ACCEL_EPSILON) {
        traj.t1_s = traj.t0_s + (dt * (a_max / (a_max - a_min)));
        traj.x1_m = traj.x0_m + (v_hat * (traj.t1_s - traj.t0_s));
    } else {
        traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
        traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));
    }

    traj.v2_ms = v1;
    traj.a2_ms2 = traj.a1_ms2 * a_min / a_max;

    if within_band(traj.a2_ms2, ACCEL_EPSILON) {
        traj.t2_s = traj.t1_s + (dt * (-a_min / (a_max - a_min)));
        traj.x2_m = traj.x1_m + (v_hat * (traj.t2_s - traj.t1_s));
    } else {
        traj.t2_s = traj.t1_s + ((traj.v2_ms - traj.v1_ms) / traj.a2_ms2);
        traj.x2_m = x_end;
    }

    Ok(traj.two_leg())
}

/// Decelerate to an inflection speed then accelerate to the departure
/// speed, no cruise, crossing the bar at `et`.
fn ts_case3(
    t: f64,
    et: f64,
    v0: f64,
    v1: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;

    if within_band(dt, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case3: dt",
            value: dt,
        });
    }

    let ratio = a_max / a_min;
    let sqr1 = (ratio - 1.0).powi(2) * (dx / dt).powi(2);
    let sqr2 = (ratio - 1.0)
        * ((v1 * (v1 - (2.0 * dx / dt))) + (ratio * v0 * ((2.0 * dx / dt) - v0)));
    let v_hat = (dx / dt) + ((sqr1 - sqr2).sqrt() / (ratio - 1.0));

    traj.v1_ms = v_hat;
    traj.a1_ms2 = (((1.0 - (a_min / a_max)) * v_hat) + ((a_min / a_max) * v1) - v0) / dt;

    if within_band(traj.a1_ms2, ACCEL_EPSILON) {
        traj.t1_s = traj.t0_s + (dt * (-a_min / (a_max - a_min)));
        traj.x1_m = traj.x0_m + (v_hat * (traj.t1_s - traj.t0_s));
    } else {
        traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
        traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));
    }

    traj.v2_ms = v1;
    traj.a2_ms2 = traj.a1_ms2 * a_max / a_min;

    if within_band(traj.a2_ms2, ACCEL_EPSILON) {
        traj.t2_s = traj.t1_s + (dt * (a_max / (a_max - a_min)));
        traj.x2_m = traj.x1_m + (v_hat * (traj.t2_s - traj.t1_s));
    } else {
        traj.t2_s = traj.t1_s + ((traj.v2_ms - traj.v1_ms) / traj.a2_ms2);
        traj.x2_m = x_end;
    }

    Ok(traj.two_leg())
}

/// Decelerate to the minimum speed, cruise there, accelerate to the
/// departure speed, with the cruise duration solved for `et`.
fn ts_case4(
    t: f64,
    et: f64,
    v0: f64,
    v1: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;
    let ratio = a_max / a_min;

    let nom1 = 2.0 * dx * (((ratio - 1.0) * v_min) + v1 - (ratio * v0));
    let nom2 = dt * (((ratio - 1.0) * v_min.powi(2)) + v1.powi(2) - (ratio * v0.powi(2)));
    let den = (ratio * (v_min - v0).powi(2)) - (v_min - v1).powi(2);

    if within_band(den, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case4: den",
            value: den,
        });
    }

    let tc = (nom1 - nom2) / den;

    traj.v1_ms = v_min;

    if within_band(dt - tc, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case4: dt - tc",
            value: dt - tc,
        });
    }

    traj.a1_ms2 = (((1.0 - (a_min / a_max)) * v_min) + ((a_min / a_max) * v1) - v0) / (dt - tc);

    if within_band(traj.a1_ms2, ACCEL_EPSILON) {
        // Near-flat first leg: already at the minimum speed
        traj.t1_s = traj.t0_s + ((dt - tc) * (-a_min / (a_max - a_min)));
        traj.x1_m = traj.x0_m + (v_min * (traj.t1_s - traj.t0_s));
    } else {
        traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
        traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));
    }

    traj.v2_ms = v_min;
    traj.a2_ms2 = 0.0;
    traj.t2_s = traj.t1_s + tc;
    traj.x2_m = traj.x1_m + (v_min * tc);

    traj.t3_s = et;
    traj.a3_ms2 = traj.a1_ms2 * a_max / a_min;
    traj.v3_ms = v1;
    traj.x3_m = x_end;

    Ok(traj)
}

/// Decelerate below the single-leg line then accelerate, both legs at
/// reduced rates, ending wherever the speed lands at `et`.
fn ts_case5(
    t: f64,
    et: f64,
    v0: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;
    let ratio = a_max / a_min;

    let sqr = (ratio - 1.0) * ((2.0 * a_min * (dx - (v0 * dt))) - (a_min * dt).powi(2));
    let v_hat = (v0 + (a_min * dt)) - (sqr.sqrt() / (ratio - 1.0));
    let v_peak = ((1.0 - ratio) * v_hat) + (ratio * v0) + (a_max * dt);

    traj.v1_ms = v_hat;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.v2_ms = v_peak;
    traj.a2_ms2 = a_max;
    traj.t2_s = traj.t1_s + ((traj.v2_ms - traj.v1_ms) / traj.a2_ms2);
    traj.x2_m = x_end;

    traj.two_leg()
}

/// Decelerate to the minimum speed, cruise (duration carried over from the
/// sixth bracket trajectory), then a final partial leg to cross at `et`.
fn ts_case6(
    t: f64,
    et: f64,
    v0: f64,
    v_min: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
    dx3: f64,
    traj6: &TrajectoryParams,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = et - t;

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    let tc = if dx <= dx3 {
        0.0
    } else {
        traj6.t2_s - traj6.t1_s
    };

    traj.v2_ms = v_min;
    traj.a2_ms2 = 0.0;
    traj.t2_s = traj.t1_s + tc;
    traj.x2_m = traj.x1_m + (v_min * tc);

    let dt_p = dt - (traj.t1_s - traj.t0_s) - tc;

    if within_band(dt_p, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case6: dt_p",
            value: dt_p,
        });
    }

    let v_p = ((2.0 * a_min * (dx - (v_min * tc)))
        - (v_min.powi(2) - v0.powi(2))
        - (v_min * dt_p * a_min))
        / (dt_p * a_min);

    traj.v3_ms = v_p;
    traj.a3_ms2 = (v_p - v_min) / dt_p;
    traj.t3_s = et;
    traj.x3_m = x_end;

    Ok(traj)
}

/// Decelerate to the minimum speed, cruise, then continue decelerating so
/// the bar is crossed at `et` below the minimum speed.
fn ts_case7(
    t: f64,
    et: f64,
    v0: f64,
    v_min: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    let dt = et - t;
    let v_p = v_min - ((v_min - v0).powi(2) - (2.0 * a_min * ((v_min * dt) - dx))).sqrt();
    let dt_p = (v_p - v_min) / a_min;

    if within_band(dt_p, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "ts_case7: dt_p",
            value: dt_p,
        });
    }

    let tc = dt - ((v_p - v0) / a_min);

    traj.v2_ms = v_min;
    traj.a2_ms2 = 0.0;
    traj.t2_s = traj.t1_s + tc;
    traj.x2_m = traj.x1_m + (v_min * tc);

    traj.v3_ms = v_p;
    traj.a3_ms2 = (v_p - v_min) / dt_p;
    traj.t3_s = et;
    traj.x3_m = x_end;

    Ok(traj)
}

/// No feasible non-emergency trajectory: reuse the slowest bracket
/// trajectory and flag failure when the distance is below the hard stopping
/// bound.
fn ts_case8(dx: f64, dx5: f64, traj8: &TrajectoryParams) -> TrajectoryParams {
    let mut traj = *traj8;
    if dx < dx5 {
        traj.is_algorithm_successful = false;
    }
    traj
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::boundary::{boundary_trajectories, delta_x};
    use super::*;

    const V_MIN: f64 = 2.2352;

    /// Check the kinematic identities of a solved trajectory: segment
    /// endpoints consistent with their accelerations, monotonic times, and
    /// displacement closure at the stop bar.
    fn assert_trajectory_consistent(traj: &TrajectoryParams, x_end: f64) {
        let segments = [
            (
                traj.t0_s, traj.v0_ms, traj.x0_m, traj.a1_ms2, traj.t1_s, traj.v1_ms, traj.x1_m,
            ),
            (
                traj.t1_s, traj.v1_ms, traj.x1_m, traj.a2_ms2, traj.t2_s, traj.v2_ms, traj.x2_m,
            ),
            (
                traj.t2_s, traj.v2_ms, traj.x2_m, traj.a3_ms2, traj.t3_s, traj.v3_ms, traj.x3_m,
            ),
        ];

        for (i, &(ts, vs, xs, a, te, ve, xe)) in segments.iter().enumerate() {
            let dt = te - ts;
            assert!(dt >= -1e-9, "segment {} has negative duration {}", i, dt);

            let v_pred = vs + a * dt;
            assert!(
                (v_pred - ve).abs() < 1e-6 * ve.abs().max(1.0),
                "segment {} speed discontinuity: predicted {}, breakpoint {}",
                i,
                v_pred,
                ve
            );

            let x_pred = xs + vs * dt + 0.5 * a * dt.powi(2);
            assert!(
                (x_pred - xe).abs() < 1e-6 * xe.abs().max(1.0),
                "segment {} position discontinuity: predicted {}, breakpoint {}",
                i,
                x_pred,
                xe
            );
        }

        assert!(
            (traj.x3_m - x_end).abs() < 1e-6 * x_end.abs().max(1.0),
            "displacement not closed: x3 = {}, target {}",
            traj.x3_m,
            x_end
        );
    }

    /// Sweep the midpoint of every non-empty bracket and check the solved
    /// trajectory's case tag, closure and continuity.
    fn sweep_brackets(v0: f64, v1: f64, v_max: f64, a_max: f64, a_min: f64, dx: f64) {
        let bounds = delta_x(v0, v1, v_max, V_MIN, a_max, a_min);
        let trajs =
            boundary_trajectories(0.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds)
                .unwrap();

        let expected = [
            TsCase::Case1,
            TsCase::Case2,
            TsCase::Case3,
            TsCase::Case4,
            TsCase::Case5,
            TsCase::Case6,
            TsCase::Case7,
        ];

        for k in 1..trajs.len() {
            let lo = trajs[k - 1].t3_s;
            let hi = trajs[k].t3_s;
            if hi - lo < 1e-6 {
                // Empty bracket for this distance regime
                continue;
            }
            let et = (lo + hi) / 2.0;

            let solved = select_case(
                0.1, 0.0, et, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds, &trajs,
            )
            .unwrap();

            assert_eq!(
                solved.case,
                Some(expected[k - 1]),
                "bracket {} for (v0={}, v1={}, dx={})",
                k,
                v0,
                v1,
                dx
            );
            assert!(solved.is_algorithm_successful);
            assert_trajectory_consistent(&solved, dx);
            assert!(
                (solved.t3_s - et).abs() < 1e-6,
                "entry time not met: t3 = {}, et = {}",
                solved.t3_s,
                et
            );
        }
    }

    #[test]
    fn test_cruise_regime_bracket_sweep() {
        sweep_brackets(12.0, 10.0, 15.0, 1.5, -1.5, 150.0);
    }

    #[test]
    fn test_mid_regime_bracket_sweep() {
        sweep_brackets(12.0, 10.0, 15.0, 1.5, -1.5, 60.0);
    }

    #[test]
    fn test_asymmetric_limits_bracket_sweep() {
        sweep_brackets(8.0, 10.0, 15.0, 2.0, -1.0, 100.0);
    }

    #[test]
    fn test_entry_before_first_bracket_plans_earliest() {
        let (v0, v1, v_max, a_max, a_min, dx) = (12.0, 15.0, 15.0, 1.5, -1.5, 150.0);
        let bounds = delta_x(v0, v1, v_max, V_MIN, a_max, a_min);
        let trajs =
            boundary_trajectories(0.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds)
                .unwrap();

        // An entry time faster than the fastest bracket is replanned to the
        // fastest bracket's own entry time
        let solved = select_case(
            0.1, 0.0, 5.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds, &trajs,
        )
        .unwrap();

        assert_eq!(solved.case, Some(TsCase::Case1));
        assert!((solved.t3_s - trajs[0].t3_s).abs() < 1e-9);
        assert_trajectory_consistent(&solved, dx);
        // Full comfort acceleration up to free flow speed
        assert!((solved.accel_next_ms2 - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_case8_flags_unsafe_stopping_distance() {
        let (v0, v1, v_max, a_max, a_min, dx) = (12.0, 15.0, 15.0, 1.5, -1.5, 5.0);
        let bounds = delta_x(v0, v1, v_max, V_MIN, a_max, a_min);
        let trajs =
            boundary_trajectories(0.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds)
                .unwrap();

        // Far-future entry time with only 5 m of road: no feasible
        // non-emergency trajectory
        let solved = select_case(
            0.1, 0.0, 20.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds, &trajs,
        )
        .unwrap();

        assert_eq!(solved.case, Some(TsCase::Case8));
        assert!(!solved.is_algorithm_successful);
        // The command is the slowest bracket's braking leg
        assert!((solved.accel_next_ms2 - a_min).abs() < 1e-9);
    }

    #[test]
    fn test_case8_within_stopping_distance_is_successful() {
        let (v0, v1, v_max, a_max, a_min, dx) = (12.0, 10.0, 15.0, 1.5, -1.5, 150.0);
        let bounds = delta_x(v0, v1, v_max, V_MIN, a_max, a_min);
        let trajs =
            boundary_trajectories(0.0, v0, v1, v_max, V_MIN, a_max, a_min, 0.0, dx, dx, &bounds)
                .unwrap();

        // Beyond the slowest bracket but with room to stop: the slowest
        // trajectory is reused without the failure flag
        let solved = select_case(
            0.1,
            0.0,
            trajs[7].t3_s + 10.0,
            v0,
            v1,
            v_max,
            V_MIN,
            a_max,
            a_min,
            0.0,
            dx,
            dx,
            &bounds,
            &trajs,
        )
        .unwrap();

        assert_eq!(solved.case, Some(TsCase::Case8));
        assert!(solved.is_algorithm_successful);
    }

    #[test]
    fn test_wrong_boundary_count_is_rejected() {
        let bounds = delta_x(12.0, 10.0, 15.0, V_MIN, 1.5, -1.5);
        let trajs = [TrajectoryParams::start(0.0, 12.0, 0.0); 7];

        let result = select_case(
            0.1, 0.0, 10.0, 12.0, 10.0, 15.0, V_MIN, 1.5, -1.5, 0.0, 150.0, 150.0, &bounds, &trajs,
        );

        assert!(matches!(
            result,
            Err(ApchPlanError::WrongBoundaryCount(7))
        ));
    }

    #[test]
    fn test_degenerate_entry_time_is_rejected() {
        let (v0, v1, v_max, a_max, a_min, dx) = (12.0, 10.0, 15.0, 1.5, -1.5, 60.0);
        let bounds = delta_x(v0, v1, v_max, V_MIN, a_max, a_min);

        // dt within the epsilon band of zero cannot be solved
        let result = ts_case2(0.0, 5e-4, v0, v1, a_max, a_min, 0.0, dx, dx);
        assert!(matches!(
            result,
            Err(ApchPlanError::DegenerateDenominator { .. })
        ));
    }
}
