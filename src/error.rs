//! Error types for driftoff

use thiserror::Error;

/// Errors that can occur while producing a bedtime estimate
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The regression model could not produce a prediction for the given
    /// inputs. This is the only error the core calculation surfaces;
    /// callers convert it to a generic user-facing notice.
    #[error("Model could not produce a prediction: {0}")]
    Prediction(String),

    #[error("Invalid model parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid wake time: {0}")]
    InvalidWakeTime(String),

    #[error("Failed to parse estimate request: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
