//! Main vehicle-side executable entry point.
//!
//! # Architecture
//!
//! The executable closes the loop around the approach planner with a
//! self-contained demonstration scenario:
//!
//!     - Initialise the session, logger and parameters
//!     - Main loop:
//!         - Signal phase prediction from the scripted fixed cycle
//!         - Host driver model fallback command
//!         - Approach planning
//!         - Euler integration of the suggested command
//!     - Dump the per-tick records into the session directory
//!
//! In a deployment the scenario loop is replaced by the host control stack,
//! which owns the vehicle record and calls the planner once per tick.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod scenario;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::info;

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};
use veh_lib::apch_plan::ApchPlan;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("veh_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution
    info!("Glidepath Vehicle Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let scenario_params: scenario::ScenarioParams =
        util::params::load("scenario.toml").wrap_err("Could not load scenario params")?;

    let planner =
        ApchPlan::init("apch_plan.toml").wrap_err("Failed to initialise the approach planner")?;

    info!("Parameters loaded");

    // ---- RUN SCENARIO ----

    scenario::run(&planner, &scenario_params, &session)
}
