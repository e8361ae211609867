//! Session state
//!
//! Form-bound state for a host UI: the three inputs plus the outcome of
//! the most recent calculation. Any edit drops the outcome, so a stale
//! bedtime or notice is never observable next to changed inputs.

use crate::engine::BedtimeEngine;
use crate::types::{BedtimeEstimate, CoffeeIntake, SleepGoal, SleepInputs, WakeTime};
use log::warn;
use serde::{Deserialize, Serialize};

/// Headline shown above a successful estimate
pub const RESULT_HEADLINE: &str = "Your ideal bedtime is:";

/// Title of the failure notice
pub const FAILURE_TITLE: &str = "Something went wrong";

/// Body of the failure notice
pub const FAILURE_MESSAGE: &str = "There was a problem calculating your bedtime";

/// User-facing notice describing a failed calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    /// The generic calculation-failure notice. Error details stay in the
    /// log; the user always sees the same text.
    pub fn calculation_failed() -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            message: FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result of the most recent calculation, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Inputs have changed since the last calculation (or none was run)
    Editing,
    /// The last calculation produced a bedtime
    Estimate(BedtimeEstimate),
    /// The last calculation failed
    Failed(Notice),
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Editing
    }
}

/// One user's editing session: inputs, engine, and last outcome.
///
/// Single-threaded and synchronous; every `calculate` completes before
/// the outcome is observable.
#[derive(Debug)]
pub struct BedtimeSession {
    inputs: SleepInputs,
    outcome: Outcome,
    engine: BedtimeEngine,
}

impl Default for BedtimeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BedtimeSession {
    /// Create a session with the initial-screen inputs and default model
    pub fn new() -> Self {
        Self::with_engine(BedtimeEngine::new())
    }

    /// Create a session around a configured engine
    pub fn with_engine(engine: BedtimeEngine) -> Self {
        Self {
            inputs: SleepInputs::default(),
            outcome: Outcome::Editing,
            engine,
        }
    }

    /// Current inputs
    pub fn inputs(&self) -> SleepInputs {
        self.inputs
    }

    /// Outcome of the most recent calculation
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Short identifier of the active model
    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    pub fn set_wake_time(&mut self, wake_time: WakeTime) {
        self.inputs.wake_time = wake_time;
        self.outcome = Outcome::Editing;
    }

    pub fn set_sleep_goal(&mut self, sleep_goal: SleepGoal) {
        self.inputs.sleep_goal = sleep_goal;
        self.outcome = Outcome::Editing;
    }

    pub fn set_coffee(&mut self, coffee: CoffeeIntake) {
        self.inputs.coffee = coffee;
        self.outcome = Outcome::Editing;
    }

    /// Stepper increment on the sleep goal, saturating at 12 hours
    pub fn step_sleep_goal_up(&mut self) {
        self.set_sleep_goal(self.inputs.sleep_goal.step_up());
    }

    /// Stepper decrement on the sleep goal, saturating at 4 hours
    pub fn step_sleep_goal_down(&mut self) {
        self.set_sleep_goal(self.inputs.sleep_goal.step_down());
    }

    /// Stepper increment on the coffee count, saturating at 20 cups
    pub fn step_coffee_up(&mut self) {
        self.set_coffee(self.inputs.coffee.step_up());
    }

    /// Stepper decrement on the coffee count, saturating at 1 cup
    pub fn step_coffee_down(&mut self) {
        self.set_coffee(self.inputs.coffee.step_down());
    }

    /// Run one calculation and store the outcome.
    ///
    /// A failure is converted to the fixed notice here; the error itself
    /// never crosses this boundary.
    pub fn calculate(&mut self) -> &Outcome {
        self.outcome = match self.engine.estimate(&self.inputs) {
            Ok(estimate) => Outcome::Estimate(estimate),
            Err(err) => {
                warn!("bedtime calculation failed: {err}");
                Outcome::Failed(Notice::calculation_failed())
            }
        };
        &self.outcome
    }

    /// Return to the initial-screen inputs, dropping any outcome
    pub fn reset(&mut self) {
        self.inputs = SleepInputs::default();
        self.outcome = Outcome::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimateError;
    use crate::model::SleepPredictor;
    use crate::types::{PredictedSleep, SleepFeatures};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct FailingPredictor;

    impl SleepPredictor for FailingPredictor {
        fn predict(&self, _features: SleepFeatures) -> Result<PredictedSleep, EstimateError> {
            Err(EstimateError::Prediction("stub failure".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn failing_session() -> BedtimeSession {
        BedtimeSession::with_engine(BedtimeEngine::with_model(Box::new(FailingPredictor)))
    }

    #[test]
    fn test_new_session_defaults() {
        let session = BedtimeSession::new();

        assert_eq!(*session.outcome(), Outcome::Editing);
        assert_eq!(session.inputs().wake_time.hour(), 8);
        assert_eq!(session.inputs().sleep_goal.hours(), 8.0);
        assert_eq!(session.inputs().coffee.cups(), 1);
    }

    #[test]
    fn test_calculate_stores_estimate() {
        let mut session = BedtimeSession::new();

        let outcome = session.calculate();

        assert!(matches!(outcome, Outcome::Estimate(_)));
        assert_eq!(RESULT_HEADLINE, "Your ideal bedtime is:");
    }

    #[test]
    fn test_failure_notice_text() {
        let mut session = failing_session();

        let outcome = session.calculate().clone();

        let Outcome::Failed(notice) = outcome else {
            panic!("expected a failure outcome");
        };
        assert_eq!(notice.title, "Something went wrong");
        assert_eq!(notice.message, "There was a problem calculating your bedtime");
    }

    #[test]
    fn test_edit_drops_estimate() {
        let mut session = BedtimeSession::new();
        session.calculate();
        assert!(matches!(session.outcome(), Outcome::Estimate(_)));

        session.step_coffee_up();

        assert_eq!(*session.outcome(), Outcome::Editing);
        assert_eq!(session.inputs().coffee.cups(), 2);
    }

    #[test]
    fn test_edit_drops_failure() {
        let mut session = failing_session();
        session.calculate();
        assert!(matches!(session.outcome(), Outcome::Failed(_)));

        session.step_sleep_goal_up();

        assert_eq!(*session.outcome(), Outcome::Editing);
        assert_eq!(session.inputs().sleep_goal.hours(), 8.25);
    }

    #[test]
    fn test_unchanged_edit_resets_outcome() {
        let mut session = BedtimeSession::new();
        session.calculate();

        let unchanged = session.inputs().wake_time;
        session.set_wake_time(unchanged);

        assert_eq!(*session.outcome(), Outcome::Editing);
    }

    #[test]
    fn test_repeated_calculation_stable() {
        let mut session = BedtimeSession::new();

        let first = session.calculate().clone();
        let second = session.calculate().clone();

        assert_eq!(first, second);
    }

    #[test]
    fn test_steppers_saturate() {
        let mut session = BedtimeSession::new();

        for _ in 0..40 {
            session.step_sleep_goal_up();
            session.step_coffee_down();
        }

        assert_eq!(session.inputs().sleep_goal.hours(), 12.0);
        assert_eq!(session.inputs().coffee.cups(), 1);
    }

    #[test]
    fn test_reset() {
        let mut session = BedtimeSession::new();
        session.step_coffee_up();
        session.calculate();

        session.reset();

        assert_eq!(*session.outcome(), Outcome::Editing);
        assert_eq!(session.inputs(), SleepInputs::default());
    }
}
