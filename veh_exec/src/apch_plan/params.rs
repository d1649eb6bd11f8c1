//! Approach planning parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for approach planning
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The maximum allowable vehicle acceleration limit
    pub accel_limit_ms2: f64,

    /// A multiplier applied to the acceleration limit so we plan under the
    /// vehicle's capabilities
    pub accel_limit_mult: f64,

    /// The maximum allowable vehicle deceleration limit (magnitude)
    pub decel_limit_ms2: f64,

    /// A multiplier applied to the deceleration limit so we plan under the
    /// vehicle's capabilities
    pub decel_limit_mult: f64,

    /// The minimum distance at which an approach can still be planned
    pub min_approach_distance_m: f64,

    /// Distance to the stop bar below which approach planning activates
    pub activation_distance_m: f64,

    /// A buffer in front of the stopping location which is still considered
    /// a valid stop
    pub stopping_location_buffer_m: f64,

    /// A buffer around the green phase which shortens the usable green time
    pub green_light_time_buffer_s: f64,

    /// Minimum speed the planned trajectories are allowed to dip to
    pub algo_minimum_speed_ms: f64,

    /// Speed below which the vehicle is considered stopped
    pub algo_stopping_speed_ms: f64,

    /// Safety multiplier on the planned deceleration used when stopping,
    /// making the vehicle begin braking earlier
    pub decel_fraction: f64,

    /// Desired distance-to-stop buffer
    pub desired_stop_buffer_m: f64,

    /// Vehicle reaction time to a received schedule
    pub reaction_time_s: f64,

    /// Minimum inter-vehicle gap
    pub min_gap_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            accel_limit_ms2: 2.0,
            accel_limit_mult: 0.75,
            decel_limit_ms2: 2.0,
            decel_limit_mult: 0.75,
            min_approach_distance_m: 30.0,
            activation_distance_m: 200.0,
            stopping_location_buffer_m: 3.0,
            green_light_time_buffer_s: 0.0,
            algo_minimum_speed_ms: 2.2352,
            algo_stopping_speed_ms: 0.1,
            decel_fraction: 0.8,
            desired_stop_buffer_m: 10.0,
            reaction_time_s: 2.0,
            min_gap_m: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// The shipped parameter file must parse and match the documented
    /// defaults.
    #[test]
    fn test_shipped_params_match_defaults() {
        let loaded: Params = toml::from_str(include_str!("../../../params/apch_plan.toml"))
            .expect("params/apch_plan.toml does not parse");
        let defaults = Params::default();

        assert_eq!(loaded.accel_limit_ms2, defaults.accel_limit_ms2);
        assert_eq!(loaded.accel_limit_mult, defaults.accel_limit_mult);
        assert_eq!(loaded.decel_limit_ms2, defaults.decel_limit_ms2);
        assert_eq!(loaded.decel_limit_mult, defaults.decel_limit_mult);
        assert_eq!(loaded.min_approach_distance_m, defaults.min_approach_distance_m);
        assert_eq!(loaded.activation_distance_m, defaults.activation_distance_m);
        assert_eq!(
            loaded.stopping_location_buffer_m,
            defaults.stopping_location_buffer_m
        );
        assert_eq!(
            loaded.green_light_time_buffer_s,
            defaults.green_light_time_buffer_s
        );
        assert_eq!(loaded.algo_minimum_speed_ms, defaults.algo_minimum_speed_ms);
        assert_eq!(loaded.algo_stopping_speed_ms, defaults.algo_stopping_speed_ms);
        assert_eq!(loaded.decel_fraction, defaults.decel_fraction);
        assert_eq!(loaded.desired_stop_buffer_m, defaults.desired_stop_buffer_m);
        assert_eq!(loaded.reaction_time_s, defaults.reaction_time_s);
        assert_eq!(loaded.min_gap_m, defaults.min_gap_m);
    }
}
