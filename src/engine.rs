//! Bedtime calculation
//!
//! This module provides the public API for Driftoff. It runs the input
//! features through a sleep predictor and subtracts the predicted sleep
//! need from the wake-up time, wrapping across midnight when needed.

use crate::error::EstimateError;
use crate::model::{LinearModelParams, LinearSleepModel, SleepPredictor};
use crate::types::{BedtimeEstimate, SleepInputs};
use log::debug;

/// Compute the ideal bedtime for the given inputs using the bundled
/// default model.
///
/// # Example
/// ```ignore
/// let estimate = estimate_bedtime(&SleepInputs::default())?;
/// println!("go to bed at {}", estimate.display());
/// ```
pub fn estimate_bedtime(inputs: &SleepInputs) -> Result<BedtimeEstimate, EstimateError> {
    let model = LinearSleepModel::with_defaults();
    compute_ideal_bedtime(&model, inputs)
}

/// Compute the ideal bedtime for the given inputs using a specific
/// predictor.
///
/// Stages:
/// 1. Derive the feature vector from the inputs
/// 2. Predict actual sleep need
/// 3. Subtract the prediction from the wake-up time on a 24-hour clock
///
/// Returns an error whenever the predictor fails; there is no partial
/// estimate.
pub fn compute_ideal_bedtime(
    model: &dyn SleepPredictor,
    inputs: &SleepInputs,
) -> Result<BedtimeEstimate, EstimateError> {
    let features = inputs.features();
    let predicted = model.predict(features)?;

    // Bedtime arithmetic only makes sense for a prediction inside one day.
    // The bundled model guarantees this, external predictors may not.
    let seconds = predicted.seconds();
    if !seconds.is_finite() || seconds <= 0.0 || seconds >= 86_400.0 {
        return Err(EstimateError::Prediction(format!(
            "predicted sleep of {seconds:.0} seconds does not fit in one day"
        )));
    }

    // overflowing_sub_signed reports 86_400 leftover seconds when the
    // subtraction wrapped past midnight into the previous day.
    let (bedtime, wrapped) = inputs
        .wake_time
        .time()
        .overflowing_sub_signed(predicted.duration());
    let previous_day = wrapped != 0;

    debug!(
        "model {} predicted {:.0}s sleep for wake {}, bedtime {}",
        model.name(),
        seconds,
        inputs.wake_time,
        bedtime.format("%H:%M:%S"),
    );

    Ok(BedtimeEstimate {
        inputs: *inputs,
        predicted_sleep: predicted,
        bedtime,
        previous_day,
    })
}

/// Stateful engine that owns a predictor.
///
/// Use this when the model is configured once (for example loaded from a
/// parameter file) and then queried repeatedly.
#[derive(Debug)]
pub struct BedtimeEngine {
    model: Box<dyn SleepPredictor>,
}

impl Default for BedtimeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BedtimeEngine {
    /// Create an engine with the bundled default model
    pub fn new() -> Self {
        Self {
            model: Box::new(LinearSleepModel::with_defaults()),
        }
    }

    /// Create an engine with specific linear model parameters
    pub fn with_params(params: LinearModelParams) -> Self {
        Self {
            model: Box::new(LinearSleepModel::new(params)),
        }
    }

    /// Create an engine around any predictor
    pub fn with_model(model: Box<dyn SleepPredictor>) -> Self {
        Self { model }
    }

    /// Replace the model with linear parameters loaded from JSON
    pub fn load_params(&mut self, json: &str) -> Result<(), EstimateError> {
        let params = LinearModelParams::from_json(json)?;
        self.model = Box::new(LinearSleepModel::new(params));
        Ok(())
    }

    /// Short identifier of the active model
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Compute the ideal bedtime with the engine's model
    pub fn estimate(&self, inputs: &SleepInputs) -> Result<BedtimeEstimate, EstimateError> {
        compute_ideal_bedtime(self.model.as_ref(), inputs)
    }
}
