//! Earliest feasible entry time calculations
//!
//! The feasibility solver is signal-agnostic: it computes the minimum time
//! to traverse the remaining distance to the stop bar using at most one
//! acceleration leg, one cruise leg at free flow speed and one deceleration
//! leg, honouring the minimum speed floor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::state::ApchPlan;
use super::EPSILON;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ApchPlan {
    /// Minimum time to traverse `remaining_distance_m`, relative to now.
    ///
    /// The inflection speed is the speed at which the trajectory switches
    /// from its acceleration leg to its deceleration leg. It is clamped to
    /// `[algo_minimum_speed_ms, free_flow_speed_ms]`, which keeps the
    /// returned time a lower bound even when the closed forms place the
    /// inflection outside the achievable band.
    pub(crate) fn earliest_entry_time(
        &self,
        remaining_distance_m: f64,
        free_flow_speed_ms: f64,
        current_speed_ms: f64,
        departure_speed_ms: f64,
        max_accel_ms2: f64,
        max_decel_ms2: f64,
    ) -> f64 {
        let x = remaining_distance_m;
        let x1 = self.distance_to_accel_or_decel_twice(
            free_flow_speed_ms,
            current_speed_ms,
            departure_speed_ms,
            max_accel_ms2,
            max_decel_ms2,
        );
        let x2 = self.distance_to_accel_or_decel_once(
            current_speed_ms,
            departure_speed_ms,
            max_accel_ms2,
            max_decel_ms2,
        );

        let mut v_hat = self.inflection_speed(
            x,
            x1,
            x2,
            free_flow_speed_ms,
            current_speed_ms,
            departure_speed_ms,
            max_accel_ms2,
            max_decel_ms2,
        );

        if v_hat <= self.params.algo_minimum_speed_ms - EPSILON || v_hat.is_nan() {
            v_hat = self.params.algo_minimum_speed_ms;
        }
        if v_hat >= free_flow_speed_ms + EPSILON {
            v_hat = free_flow_speed_ms;
        }

        let t_accel = if x < x2 && current_speed_ms > departure_speed_ms {
            0.0
        } else {
            ((v_hat - current_speed_ms) / max_accel_ms2).max(0.0)
        };

        let t_decel = if x < x2 && current_speed_ms < departure_speed_ms {
            0.0
        } else if x < x2 {
            ((v_hat - current_speed_ms) / max_decel_ms2).max(0.0)
        } else {
            ((departure_speed_ms - v_hat) / max_decel_ms2).max(0.0)
        };

        let t_cruise = if x1 <= x { ((x - x1) / v_hat).max(0.0) } else { 0.0 };

        t_accel + t_cruise + t_decel
    }

    /// Distance covered by a single accel-or-decel leg from the current to
    /// the departure speed.
    pub(crate) fn distance_to_accel_or_decel_once(
        &self,
        current_speed_ms: f64,
        departure_speed_ms: f64,
        max_accel_ms2: f64,
        max_decel_ms2: f64,
    ) -> f64 {
        if current_speed_ms <= departure_speed_ms + EPSILON {
            (departure_speed_ms.powi(2) - current_speed_ms.powi(2)) / (2.0 * max_accel_ms2)
        } else {
            (departure_speed_ms.powi(2) - current_speed_ms.powi(2)) / (2.0 * max_decel_ms2)
        }
    }

    /// Distance covered by accelerating to free flow speed then decelerating
    /// to the departure speed.
    pub(crate) fn distance_to_accel_or_decel_twice(
        &self,
        free_flow_speed_ms: f64,
        current_speed_ms: f64,
        departure_speed_ms: f64,
        max_accel_ms2: f64,
        max_decel_ms2: f64,
    ) -> f64 {
        (free_flow_speed_ms.powi(2) - current_speed_ms.powi(2)) / (2.0 * max_accel_ms2)
            + (departure_speed_ms.powi(2) - free_flow_speed_ms.powi(2)) / (2.0 * max_decel_ms2)
    }

    /// The speed at the accel-to-decel inflection for a trajectory covering
    /// exactly `x` metres.
    fn inflection_speed(
        &self,
        x: f64,
        x1: f64,
        x2: f64,
        free_flow_speed_ms: f64,
        current_speed_ms: f64,
        departure_speed_ms: f64,
        max_accel_ms2: f64,
        max_decel_ms2: f64,
    ) -> f64 {
        if x >= x1 {
            // Enough room to reach free flow speed, cruise takes up the rest
            free_flow_speed_ms
        } else if x > x2 {
            // One accel leg and one decel leg balanced over exactly x
            (((2.0 * x * max_accel_ms2 * max_decel_ms2)
                + (max_decel_ms2 * current_speed_ms.powi(2))
                - (max_accel_ms2 * departure_speed_ms.powi(2)))
                / (max_decel_ms2 - max_accel_ms2))
                .sqrt()
        } else if current_speed_ms <= departure_speed_ms {
            // Single accel leg cut short at x
            (2.0 * x * max_accel_ms2 + current_speed_ms.powi(2)).sqrt()
        } else {
            // Single decel leg cut short at x
            (2.0 * x * max_decel_ms2 + current_speed_ms.powi(2)).sqrt()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::{Params, state::ApchPlan};

    fn planner() -> ApchPlan {
        ApchPlan::new(Params::default())
    }

    #[test]
    fn test_distance_helpers() {
        let p = planner();

        // Accelerating 12 -> 15 at 1.5 covers (225 - 144) / 3 = 27 m
        assert!((p.distance_to_accel_or_decel_once(12.0, 15.0, 1.5, -1.5) - 27.0).abs() < 1e-9);

        // Decelerating 15 -> 12 at -1.5 also covers 27 m
        assert!((p.distance_to_accel_or_decel_once(15.0, 12.0, 1.5, -1.5) - 27.0).abs() < 1e-9);

        // Accel 12 -> 15 then decel 15 -> 10: 27 + (100 - 225) / -3
        let twice = p.distance_to_accel_or_decel_twice(15.0, 12.0, 10.0, 1.5, -1.5);
        assert!((twice - (27.0 + 125.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_cruise_regime_entry_time() {
        let p = planner();

        // 150 m at 12 m/s with free flow and departure at 15 m/s: 2 s accel
        // to 15 over 27 m, then 123 m of cruise at 15.
        let t = p.earliest_entry_time(150.0, 15.0, 12.0, 15.0, 1.5, -1.5);
        assert!((t - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_short_distance_entry_time() {
        let p = planner();

        // 5 m at 12 m/s towards a 15 m/s departure: the single accel leg is
        // cut short, v_hat = sqrt(144 + 15) and no cruise or decel time.
        let t = p.earliest_entry_time(5.0, 15.0, 12.0, 15.0, 1.5, -1.5);
        let v_hat = (2.0f64 * 5.0 * 1.5 + 144.0).sqrt();
        assert!((t - (v_hat - 12.0) / 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_speed_floor() {
        let p = planner();

        // Crawling start over a short distance: the inflection clamps to the
        // minimum speed rather than dipping below it.
        let t = p.earliest_entry_time(1.0, 15.0, 1.0, 15.0, 1.5, -1.5);
        assert!(t.is_finite());
        assert!(t > 0.0);
    }
}
