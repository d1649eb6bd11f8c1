//! Boundary trajectory generation
//!
//! The feasible scheduled entry times are bracketed by eight canonical
//! trajectories, each the exact solution of one accel/cruise/decel pattern
//! over the remaining distance. Which constructor applies at each bracket
//! position depends on where the remaining distance falls relative to the
//! five boundary distances `dx1..dx5`:
//!
//! - `dx1`: accelerate to free flow speed, then decelerate to the departure
//!   speed (cruise possible above this distance)
//! - `dx2`: a single accel-or-decel leg between current and departure speed
//! - `dx3`: decelerate to the minimum speed, then accelerate to the
//!   departure speed
//! - `dx4`: decelerate to the minimum speed only
//! - `dx5`: decelerate to a complete stop
//!
//! The bracket final times `t3` are non-decreasing from the first to the
//! eighth trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::traj::TrajectoryParams;
use super::{ApchPlanError, ACCEL_EPSILON, EPSILON};
use util::maths::within_band;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The five distances partitioning the approach-distance axis.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct BoundaryDistances {
    pub dx1_m: f64,
    pub dx2_m: f64,
    pub dx3_m: f64,
    pub dx4_m: f64,
    pub dx5_m: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Travel distances of the five canonical bounding maneuvers.
pub(crate) fn delta_x(
    v0: f64,
    v1: f64,
    v_max: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
) -> BoundaryDistances {
    let dx1_m = ((v_max.powi(2) - v0.powi(2)) / (2.0 * a_max))
        + ((v1.powi(2) - v_max.powi(2)) / (2.0 * a_min));

    let dx2_m = if v1 > v0 {
        (v1.powi(2) - v0.powi(2)) / (2.0 * a_max)
    } else {
        (v1.powi(2) - v0.powi(2)) / (2.0 * a_min)
    };

    let dx3_m = ((v_min.powi(2) - v0.powi(2)) / (2.0 * a_min))
        + ((v1.powi(2) - v_min.powi(2)) / (2.0 * a_max));

    let dx4_m = (v_min.powi(2) - v0.powi(2)) / (2.0 * a_min);
    let dx5_m = -v0.powi(2) / (2.0 * a_min);

    BoundaryDistances {
        dx1_m,
        dx2_m,
        dx3_m,
        dx4_m,
        dx5_m,
    }
}

/// Build the eight bracket trajectories for the current state.
///
/// The remaining distance `dx` selects which constructor realizes each
/// bracket; adjacent brackets may share a trajectory, in which case that
/// bracket's entry-time interval is empty.
pub(crate) fn boundary_trajectories(
    t: f64,
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
) -> Result<[TrajectoryParams; 8], ApchPlanError> {
    // Brackets 1 to 3: accelerate-first shapes
    let (traj1, traj2, traj3) = if dx < bounds.dx2_m {
        let traj1 = accel_or_decel_incomplete_upper(t, v0, v1, a_max, a_min, x0, x_end, dx);
        (traj1, traj1, traj1)
    } else if dx < bounds.dx1_m {
        let traj1 = accel_nocruise_notmaxspeed_decel(t, v0, v1, a_max, a_min, x0, x_end, dx);
        let traj3 = accel_or_decel_complete_upper(t, v0, v1, x0, x_end, dx)?;
        (traj1, traj1, traj3)
    } else {
        (
            accel_cruise_maxspeed_decel(t, v0, v1, v_max, a_max, a_min, x0, x_end, dx),
            accel_nocruise_maxspeed_decel(t, v0, v1, v_max, a_max, a_min, x0, x_end, dx)?,
            accel_or_decel_complete_upper(t, v0, v1, x0, x_end, dx)?,
        )
    };

    // Brackets 4 to 7: decelerate-first shapes
    let (traj4, traj5, traj6, traj7) = if dx < bounds.dx4_m {
        let traj6 = decel_incomplete_lower(t, v0, a_min, x0, x_end, dx);
        (traj1, traj1, traj6, traj6)
    } else if dx < bounds.dx3_m {
        let traj4 = if dx < bounds.dx2_m {
            traj1
        } else {
            decel_nocruise_notminspeed_accel(t, v0, v1, v_min, a_max, a_min, x0, x_end, dx)
        };
        let traj6 =
            decel_nocruise_minspeed_accel_incomplete(t, v0, v_min, a_max, a_min, x0, x_end, dx);
        let traj7 = decel_cruise_minspeed(t, v0, v_min, a_min, x0, x_end, dx);
        (traj4, traj4, traj6, traj7)
    } else {
        let traj4 =
            decel_nocruise_minspeed_accel_complete(t, v0, v1, v_min, a_max, a_min, x0, x_end, dx)?;
        let traj5 = decel_cruise_minspeed_accel(t, v0, v1, v_min, a_max, a_min, x0, x_end, dx);
        let traj7 = decel_cruise_minspeed(t, v0, v_min, a_min, x0, x_end, dx);
        (traj4, traj5, traj5, traj7)
    };

    // Bracket 8: stopping shapes
    let traj8 = if dx < bounds.dx4_m {
        traj6
    } else if dx < bounds.dx5_m {
        decel_incomplete_lower(t, v0, a_min, x0, x_end, dx)
    } else {
        decel_cruise_minspeed_decel(t, v0, v_min, a_min, x0, x_end, dx)
    };

    Ok([traj1, traj2, traj3, traj4, traj5, traj6, traj7, traj8])
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Single accel-or-decel leg which cannot reach the departure speed within
/// `dx`. Bounds the brackets from above when the distance is very short.
fn accel_or_decel_incomplete_upper(
    t: f64,
    v0: f64,
    v1: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let mut traj = TrajectoryParams::start(t, v0, x0);

    let a1 = if v0 <= v1 + EPSILON { a_max } else { a_min };
    let v_end = (v0.powi(2) + (2.0 * a1 * dx)).sqrt();

    traj.a1_ms2 = a1;
    traj.v1_ms = v_end;
    traj.t1_s = t + (v_end - v0) / a1;
    traj.x1_m = x_end;

    traj.single_leg()
}

/// Accelerate to an inflection speed below free flow, then decelerate to the
/// departure speed, with no cruise.
fn accel_nocruise_notmaxspeed_decel(
    t: f64,
    v0: f64,
    v1: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let v_hat = (((2.0 * dx * a_max * a_min) + (a_min * v0.powi(2)) - (a_max * v1.powi(2)))
        / (a_min - a_max))
        .sqrt();
    let t_end = t + ((v_hat * (a_min - a_max)) - (v0 * a_min) + (v1 * a_max)) / (a_max * a_min);

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_hat;
    traj.a1_ms2 = a_max;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.t2_s = t_end;
    traj.a2_ms2 = a_min;
    traj.v2_ms = v1;
    traj.x2_m = x_end;

    traj.two_leg()
}

/// Accelerate to free flow speed, cruise, then decelerate to the departure
/// speed. The fastest trajectory through `dx`.
fn accel_cruise_maxspeed_decel(
    t: f64,
    v0: f64,
    v1: f64,
    v_max: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let t_end = t + (dx / v_max) + ((v_max - v0).powi(2) / (2.0 * a_max * v_max))
        - ((v1 - v_max).powi(2) / (2.0 * a_min * v_max));

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_max;
    traj.a1_ms2 = a_max;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.v2_ms = v_max;
    traj.a2_ms2 = 0.0;
    traj.t2_s = t_end - ((v1 - v_max) / a_min);
    traj.x2_m = x_end - ((v1.powi(2) - v_max.powi(2)) / (2.0 * a_min));

    traj.t3_s = t_end;
    traj.a3_ms2 = a_min;
    traj.v3_ms = v1;
    traj.x3_m = x_end;

    traj
}

/// Accelerate to free flow speed then immediately decelerate to the
/// departure speed, with reduced leg accelerations and no cruise.
fn accel_nocruise_maxspeed_decel(
    t: f64,
    v0: f64,
    v1: f64,
    v_max: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let nom = (v_max - v0) + ((a_max / a_min) * (v1 - v_max));
    let den = (v_max.powi(2) - v0.powi(2)) + ((a_max / a_min) * (v1.powi(2) - v_max.powi(2)));

    if within_band(den, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "accel_nocruise_maxspeed_decel: den",
            value: den,
        });
    }

    let t_end = t + (2.0 * dx * nom / den);

    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = t_end - t;

    if within_band(dt, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "accel_nocruise_maxspeed_decel: dt",
            value: dt,
        });
    }

    traj.v1_ms = v_max;
    traj.a1_ms2 = (((1.0 - (a_max / a_min)) * v_max) + ((a_max / a_min) * v1) - v0) / dt;

    if within_band(traj.a1_ms2, ACCEL_EPSILON) {
        // Near-flat first leg: v0 is already at free flow, place the
        // breakpoint on the constant-speed line
        traj.t1_s = traj.t0_s + (dt * (a_max / (a_max - a_min)));
        traj.x1_m = traj.x0_m + (v_max * (traj.t1_s - traj.t0_s));
    } else {
        traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
        traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));
    }

    traj.t2_s = t_end;
    traj.a2_ms2 = ((((a_min / a_max) - 1.0) * v_max) + v1 - ((a_min / a_max) * v0)) / dt;
    traj.v2_ms = v1;
    traj.x2_m = x_end;

    Ok(traj.two_leg())
}

/// A single complete accel-or-decel leg from the current to the departure
/// speed spread over exactly `dx`.
fn accel_or_decel_complete_upper(
    t: f64,
    v0: f64,
    v1: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let v_sum = v0 + v1;
    if within_band(v_sum, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "accel_or_decel_complete_upper: v0 + v1",
            value: v_sum,
        });
    }

    if within_band(dx, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "accel_or_decel_complete_upper: dx",
            value: dx,
        });
    }

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.t1_s = t + ((2.0 * dx) / v_sum);
    traj.a1_ms2 = (v1.powi(2) - v0.powi(2)) / (2.0 * dx);
    traj.v1_ms = v1;
    traj.x1_m = x_end;

    Ok(traj.single_leg())
}

/// Decelerate to an inflection speed above the minimum, then accelerate to
/// the departure speed, with no cruise.
fn decel_nocruise_notminspeed_accel(
    t: f64,
    v0: f64,
    v1: f64,
    _v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let v_hat = (((2.0 * dx * a_max * a_min) + (a_max * v0.powi(2)) - (a_min * v1.powi(2)))
        / (a_max - a_min))
        .sqrt();
    let t_end = t + ((v_hat * (a_max - a_min)) - (v0 * a_max) + (v1 * a_min)) / (a_max * a_min);

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_hat;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.t2_s = t_end;
    traj.a2_ms2 = a_max;
    traj.v2_ms = v1;
    traj.x2_m = x_end;

    traj.two_leg()
}

/// Decelerate to the minimum speed then accelerate, where the acceleration
/// leg cannot reach the departure speed within `dx`.
fn decel_nocruise_minspeed_accel_incomplete(
    t: f64,
    v0: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let sqr = ((2.0 * a_max * dx) - ((v_min.powi(2) - v0.powi(2)) * (a_max / a_min))
        + v_min.powi(2))
    .sqrt();
    let t_end = t + ((sqr - v_min) / a_max) + ((v_min - v0) / a_min);

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + (traj.v1_ms - traj.v0_ms) / a_min;
    traj.x1_m = traj.x0_m + (traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * a_min);

    traj.t2_s = t_end;
    traj.a2_ms2 = a_max;
    traj.v2_ms = (traj.a2_ms2 * (traj.t2_s - traj.t1_s)) + traj.v1_ms;
    traj.x2_m = x_end;

    traj.two_leg()
}

/// Decelerate to the minimum speed then accelerate to the departure speed,
/// with reduced leg accelerations and no cruise.
fn decel_nocruise_minspeed_accel_complete(
    t: f64,
    v0: f64,
    v1: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> Result<TrajectoryParams, ApchPlanError> {
    let nom = (v1 - v_min) + ((a_max / a_min) * (v_min - v0));
    let den = (v1.powi(2) - v_min.powi(2)) + ((a_max / a_min) * (v_min.powi(2) - v0.powi(2)));

    if within_band(den, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "decel_nocruise_minspeed_accel_complete: den",
            value: den,
        });
    }

    let t_end = t + (2.0 * dx * nom / den);

    let mut traj = TrajectoryParams::start(t, v0, x0);

    let dt = t_end - t;

    if within_band(dt, EPSILON) {
        return Err(ApchPlanError::DegenerateDenominator {
            context: "decel_nocruise_minspeed_accel_complete: dt",
            value: dt,
        });
    }

    traj.v1_ms = v_min;
    traj.a1_ms2 = (((1.0 - (a_min / a_max)) * v_min) + ((a_min / a_max) * v1) - v0) / dt;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.t2_s = t_end;
    traj.a2_ms2 = ((((a_max / a_min) - 1.0) * v_min) + v1 - ((a_max / a_min) * v0)) / dt;
    traj.v2_ms = v1;
    traj.x2_m = x_end;

    Ok(traj.two_leg())
}

/// Decelerate to the minimum speed, cruise there, then accelerate to the
/// departure speed.
fn decel_cruise_minspeed_accel(
    t: f64,
    v0: f64,
    v1: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let t_end = t + (dx / v_min) + ((v_min - v0).powi(2) / (2.0 * a_min * v_min))
        - ((v1 - v_min).powi(2) / (2.0 * a_max * v_min));

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.v2_ms = v_min;
    traj.a2_ms2 = 0.0;
    traj.t2_s = t_end - ((v1 - v_min) / a_max);
    traj.x2_m = x_end - ((v1.powi(2) - v_min.powi(2)) / (2.0 * a_max));

    traj.t3_s = t_end;
    traj.a3_ms2 = a_max;
    traj.v3_ms = v1;
    traj.x3_m = x_end;

    traj
}

/// Decelerate to the minimum speed and cruise there up to the stop bar.
fn decel_cruise_minspeed(
    t: f64,
    v0: f64,
    v_min: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let t_end = t + (dx / v_min) + ((v_min - v0).powi(2) / (2.0 * a_min * v_min));

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.v2_ms = v_min;
    traj.a2_ms2 = 0.0;
    traj.t2_s = t_end;
    traj.x2_m = x_end;

    traj.two_leg()
}

/// A single deceleration leg which has not yet reached the minimum speed at
/// the stop bar. Bounds the brackets from below for short distances.
fn decel_incomplete_lower(
    t: f64,
    v0: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let v_end = (v0.powi(2) + (2.0 * a_min * dx)).sqrt();

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.t1_s = t + (v_end - v0) / a_min;
    traj.v1_ms = v_end;
    traj.a1_ms2 = a_min;
    traj.x1_m = x_end;

    traj.single_leg()
}

/// Decelerate to the minimum speed, cruise, then brake to a stop exactly at
/// the stop bar. The slowest trajectory which still reaches the bar.
fn decel_cruise_minspeed_decel(
    t: f64,
    v0: f64,
    v_min: f64,
    a_min: f64,
    x0: f64,
    x_end: f64,
    dx: f64,
) -> TrajectoryParams {
    let t_end = t + (dx / v_min) + (v0 * (v0 - (2.0 * v_min)) / (2.0 * a_min * v_min));

    let mut traj = TrajectoryParams::start(t, v0, x0);

    traj.v1_ms = v_min;
    traj.a1_ms2 = a_min;
    traj.t1_s = traj.t0_s + ((traj.v1_ms - traj.v0_ms) / traj.a1_ms2);
    traj.x1_m = traj.x0_m + ((traj.v1_ms.powi(2) - traj.v0_ms.powi(2)) / (2.0 * traj.a1_ms2));

    traj.a2_ms2 = 0.0;
    traj.v2_ms = v_min;
    traj.t2_s = t_end - ((0.0 - traj.v2_ms) / a_min);
    traj.x2_m = x_end - ((0.0 - traj.v2_ms.powi(2)) / (2.0 * a_min));

    traj.t3_s = t_end;
    traj.a3_ms2 = a_min;
    traj.v3_ms = 0.0;
    traj.x3_m = x_end;

    traj
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
