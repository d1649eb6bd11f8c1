//! Piecewise trajectory representation
//!
//! A planned trajectory is at most three constant-acceleration segments
//! (accelerate or decelerate, cruise, accelerate or decelerate), described
//! by four breakpoints. Breakpoint 0 is always the vehicle's state at the
//! start of the tick; breakpoint 3 is the stop bar crossing when the solve
//! succeeds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The trajectory shape selected for the scheduled entry time.
///
/// Cases 1-3 are accelerate-first shapes, cases 4-7 decelerate-first shapes
/// and case 8 is the catch-all where no feasible non-emergency trajectory
/// exists within the bracketed entry times.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TsCase {
    Case1,
    Case2,
    Case3,
    Case4,
    Case5,
    Case6,
    Case7,
    Case8,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Breakpoints and segment accelerations of one planned trajectory.
///
/// Times, speeds and positions are monotonic non-decreasing across
/// breakpoints 0 to 3 in the absence of numerical failure.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct TrajectoryParams {
    pub t0_s: f64,
    pub v0_ms: f64,
    pub x0_m: f64,

    /// First segment acceleration
    pub a1_ms2: f64,
    pub t1_s: f64,
    pub v1_ms: f64,
    pub x1_m: f64,

    /// Second segment acceleration
    pub a2_ms2: f64,
    pub t2_s: f64,
    pub v2_ms: f64,
    pub x2_m: f64,

    /// Third segment acceleration
    pub a3_ms2: f64,
    pub t3_s: f64,
    pub v3_ms: f64,
    pub x3_m: f64,

    /// False when the remaining distance is below the minimum physically
    /// achievable stopping distance
    pub is_algorithm_successful: bool,

    /// The case selected for this trajectory, `None` for boundary
    /// trajectories which only bracket the solution space
    pub case: Option<TsCase>,

    /// The one-step acceleration command extracted for the current tick
    pub accel_next_ms2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryParams {
    /// A trajectory rooted at the current tick's state, with all later
    /// breakpoints still to be filled in.
    pub(crate) fn start(t_s: f64, v0_ms: f64, x0_m: f64) -> Self {
        Self {
            t0_s: t_s,
            v0_ms,
            x0_m,
            a1_ms2: 0.0,
            t1_s: t_s,
            v1_ms: v0_ms,
            x1_m: x0_m,
            a2_ms2: 0.0,
            t2_s: t_s,
            v2_ms: v0_ms,
            x2_m: x0_m,
            a3_ms2: 0.0,
            t3_s: t_s,
            v3_ms: v0_ms,
            x3_m: x0_m,
            is_algorithm_successful: true,
            case: None,
            accel_next_ms2: 0.0,
        }
    }

    /// Collapse breakpoints 2 and 3 onto breakpoint 1 for single-leg shapes.
    pub(crate) fn single_leg(mut self) -> Self {
        self.a2_ms2 = 0.0;
        self.t2_s = self.t1_s;
        self.v2_ms = self.v1_ms;
        self.x2_m = self.x1_m;
        self.a3_ms2 = 0.0;
        self.t3_s = self.t1_s;
        self.v3_ms = self.v1_ms;
        self.x3_m = self.x1_m;
        self
    }

    /// Collapse breakpoint 3 onto breakpoint 2 for two-leg shapes.
    pub(crate) fn two_leg(mut self) -> Self {
        self.a3_ms2 = 0.0;
        self.t3_s = self.t2_s;
        self.v3_ms = self.v2_ms;
        self.x3_m = self.x2_m;
        self
    }

    /// Average acceleration needed over the next timestep to track this
    /// trajectory.
    ///
    /// Locates the segment containing `t0 + delta_t` and returns the
    /// one-step command reaching that segment's implied speed, rather than
    /// the instantaneous analytic acceleration, so that re-planning each
    /// tick converges even under model mismatch.
    pub(crate) fn accel_for_timestep(&self, delta_t_s: f64) -> f64 {
        if delta_t_s <= self.t1_s - self.t0_s {
            self.a1_ms2
        } else if delta_t_s <= self.t2_s - self.t0_s {
            let remaining_s = delta_t_s - (self.t1_s - self.t0_s);
            let next_speed_ms = self.v1_ms + (remaining_s * self.a2_ms2);
            (next_speed_ms - self.v0_ms) / delta_t_s
        } else if delta_t_s <= self.t3_s - self.t0_s {
            let remaining_s = delta_t_s - (self.t2_s - self.t0_s);
            let next_speed_ms = self.v2_ms + (remaining_s * self.a3_ms2);
            (next_speed_ms - self.v0_ms) / delta_t_s
        } else {
            (self.v3_ms - self.v0_ms) / (self.t3_s - self.t0_s)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A three segment trajectory: accelerate 2 s at 1.5, cruise 4 s, brake
    /// 2 s at -1.5.
    fn three_leg_traj() -> TrajectoryParams {
        let mut traj = TrajectoryParams::start(0.0, 12.0, 0.0);
        traj.a1_ms2 = 1.5;
        traj.t1_s = 2.0;
        traj.v1_ms = 15.0;
        traj.x1_m = 27.0;
        traj.a2_ms2 = 0.0;
        traj.t2_s = 6.0;
        traj.v2_ms = 15.0;
        traj.x2_m = 87.0;
        traj.a3_ms2 = -1.5;
        traj.t3_s = 8.0;
        traj.v3_ms = 12.0;
        traj.x3_m = 114.0;
        traj
    }

    #[test]
    fn test_accel_within_first_segment() {
        let traj = three_leg_traj();
        assert!((traj.accel_for_timestep(0.1) - 1.5).abs() < 1e-12);
        assert!((traj.accel_for_timestep(2.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_accel_spanning_cruise_segment() {
        let traj = three_leg_traj();
        // One second into the cruise the implied speed is still 15, so the
        // average command over 3 s is (15 - 12) / 3.
        assert!((traj.accel_for_timestep(3.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_accel_spanning_final_segment() {
        let traj = three_leg_traj();
        // One second into the braking leg the implied speed is 13.5, so the
        // average command over 7 s is (13.5 - 12) / 7.
        assert!((traj.accel_for_timestep(7.0) - 1.5 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_accel_beyond_trajectory_end() {
        let traj = three_leg_traj();
        // Past breakpoint 3 the command is the whole-trajectory average.
        assert!((traj.accel_for_timestep(10.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_leg_collapse() {
        let mut traj = TrajectoryParams::start(0.0, 10.0, 0.0);
        traj.a1_ms2 = 1.0;
        traj.t1_s = 2.0;
        traj.v1_ms = 12.0;
        traj.x1_m = 22.0;

        let single = traj.single_leg();
        assert_eq!(single.t3_s, single.t1_s);
        assert_eq!(single.v3_ms, single.v1_ms);
        assert_eq!(single.x3_m, single.x1_m);
        assert_eq!(single.a2_ms2, 0.0);
        assert_eq!(single.a3_ms2, 0.0);
    }
}
