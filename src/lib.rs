//! Driftoff - On-device bedtime estimation engine for sleep-planning apps
//!
//! Driftoff answers one question: given when you want to wake up, how much
//! sleep you want, and how much coffee you drank, when should you go to bed?
//! A fitted regression model predicts the actual sleep need, and the engine
//! subtracts it from the wake-up time on a 24-hour clock.
//!
//! ## Modules
//!
//! - **Engine**: one-shot `estimate_bedtime` and the stateful `BedtimeEngine`
//! - **Session**: form-bound state for a host UI (inputs, steppers, outcome)
//! - **Report**: display formatting and the JSON payload for FFI/CLI hosts

pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod request;
pub mod session;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use engine::{compute_ideal_bedtime, estimate_bedtime, BedtimeEngine};
pub use error::EstimateError;
pub use model::{LinearModelParams, LinearSleepModel, SleepPredictor};
pub use report::{format_short_time, BedtimeReport, ReportEncoder};
pub use request::EstimateRequest;
pub use session::{BedtimeSession, Notice, Outcome};
pub use types::{
    BedtimeEstimate, CoffeeIntake, PredictedSleep, SleepFeatures, SleepGoal, SleepInputs,
    WakeTime,
};

/// Driftoff version embedded in all report payloads
pub const DRIFTOFF_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "driftoff";
