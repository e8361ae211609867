//! Sleep-need prediction models
//!
//! Formula: predicted_seconds = intercept + wake_coef * wake_seconds
//!   + goal_coef * sleep_goal_hours + coffee_coef * coffee_cups

use crate::error::EstimateError;
use crate::types::{PredictedSleep, SleepFeatures};
use serde::{Deserialize, Serialize};

/// Upper bound on a plausible prediction. A model that asks for a full
/// day of sleep (or more) is broken, not ambitious.
const MAX_PREDICTION_SECONDS: f64 = 86_400.0;

/// Trait for models that predict actual sleep need from the input features.
///
/// Implement this trait to swap in a different estimator. The engine only
/// sees this interface, so a replacement model changes no calling code.
pub trait SleepPredictor: Send + Sync + std::fmt::Debug {
    /// Predict actual sleep need for one feature vector.
    fn predict(&self, features: SleepFeatures) -> Result<PredictedSleep, EstimateError>;

    /// Short identifier for logs and reports.
    fn name(&self) -> &str;
}

/// Linear model coefficients.
///
/// Units: `intercept` and the output are seconds of sleep; `wake_coef` is
/// per second-since-midnight, `goal_coef` per desired hour, `coffee_coef`
/// per cup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelParams {
    pub intercept: f64,
    pub wake_coef: f64,
    pub goal_coef: f64,
    pub coffee_coef: f64,
    pub min_sleep_seconds: Option<f64>,
    pub max_sleep_seconds: Option<f64>,
}

impl Default for LinearModelParams {
    fn default() -> Self {
        // Fitted offline on a small sleep-diary dataset.
        Self {
            intercept: 1200.0,
            wake_coef: -0.006,
            goal_coef: 3312.0, // ~0.92 h of actual sleep per desired hour
            coffee_coef: 270.0,
            min_sleep_seconds: None,
            max_sleep_seconds: None,
        }
    }
}

impl LinearModelParams {
    /// Load parameters from JSON, rejecting non-finite or inverted values.
    pub fn from_json(json: &str) -> Result<Self, EstimateError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize parameters to pretty JSON, the format `from_json` accepts.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every coefficient is finite and the bounds are ordered.
    pub fn validate(&self) -> Result<(), EstimateError> {
        let coefficients = [
            ("intercept", self.intercept),
            ("wake_coef", self.wake_coef),
            ("goal_coef", self.goal_coef),
            ("coffee_coef", self.coffee_coef),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() {
                return Err(EstimateError::InvalidParams(format!(
                    "{name} is not a finite number"
                )));
            }
        }
        for (name, bound) in [
            ("min_sleep_seconds", self.min_sleep_seconds),
            ("max_sleep_seconds", self.max_sleep_seconds),
        ] {
            if let Some(value) = bound {
                if !value.is_finite() {
                    return Err(EstimateError::InvalidParams(format!(
                        "{name} is not a finite number"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_sleep_seconds, self.max_sleep_seconds) {
            if min > max {
                return Err(EstimateError::InvalidParams(format!(
                    "min_sleep_seconds ({min}) exceeds max_sleep_seconds ({max})"
                )));
            }
        }
        Ok(())
    }
}

/// Linear regression over the three input features.
#[derive(Debug, Clone)]
pub struct LinearSleepModel {
    pub params: LinearModelParams,
}

impl LinearSleepModel {
    pub fn new(params: LinearModelParams) -> Self {
        Self { params }
    }

    /// Model with the bundled default coefficients.
    pub fn with_defaults() -> Self {
        Self::new(LinearModelParams::default())
    }
}

impl Default for LinearSleepModel {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SleepPredictor for LinearSleepModel {
    fn predict(&self, features: SleepFeatures) -> Result<PredictedSleep, EstimateError> {
        if !features.is_finite() {
            return Err(EstimateError::Prediction(
                "input features contain a non-finite value".to_string(),
            ));
        }

        let p = &self.params;
        let mut seconds = p.intercept
            + p.wake_coef * features.wake_seconds
            + p.goal_coef * features.sleep_goal_hours
            + p.coffee_coef * features.coffee_cups;

        // Apply bounds
        if let Some(min) = p.min_sleep_seconds {
            seconds = seconds.max(min);
        }
        if let Some(max) = p.max_sleep_seconds {
            seconds = seconds.min(max);
        }

        if !seconds.is_finite() {
            return Err(EstimateError::Prediction(
                "model output is not a finite number".to_string(),
            ));
        }
        if seconds <= 0.0 || seconds >= MAX_PREDICTION_SECONDS {
            return Err(EstimateError::Prediction(format!(
                "predicted sleep of {seconds:.0} seconds does not fit in one day"
            )));
        }

        Ok(PredictedSleep::from_seconds(seconds))
    }

    fn name(&self) -> &str {
        "linear-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features(wake_seconds: f64, sleep_goal_hours: f64, coffee_cups: f64) -> SleepFeatures {
        SleepFeatures {
            wake_seconds,
            sleep_goal_hours,
            coffee_cups,
        }
    }

    #[test]
    fn test_prediction_uses_coefficients() {
        let model = LinearSleepModel::new(LinearModelParams {
            intercept: 100.0,
            wake_coef: 0.5,
            goal_coef: 1000.0,
            coffee_coef: 30.0,
            min_sleep_seconds: None,
            max_sleep_seconds: None,
        });

        let predicted = model.predict(features(200.0, 8.0, 2.0)).unwrap();

        // 100 + 0.5*200 + 1000*8 + 30*2 = 8260
        assert!((predicted.seconds() - 8260.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_params_prediction() {
        let model = LinearSleepModel::with_defaults();

        // 08:00 wake, 8 hour goal, 1 cup
        let predicted = model.predict(features(28_800.0, 8.0, 1.0)).unwrap();

        // 1200 - 0.006*28800 + 3312*8 + 270 = 27793.2
        assert!((predicted.seconds() - 27_793.2).abs() < 1e-6);
        assert!(predicted.hours() > 7.0 && predicted.hours() < 8.0);
    }

    #[test]
    fn test_prediction_clamped_to_bounds() {
        let params = LinearModelParams {
            min_sleep_seconds: Some(21_600.0),
            max_sleep_seconds: Some(28_800.0),
            ..LinearModelParams::default()
        };
        let model = LinearSleepModel::new(params);

        let low = model.predict(features(28_800.0, 4.0, 1.0)).unwrap();
        let high = model.predict(features(28_800.0, 12.0, 20.0)).unwrap();

        assert_eq!(low.seconds(), 21_600.0);
        assert_eq!(high.seconds(), 28_800.0);
    }

    #[test]
    fn test_non_finite_features_rejected() {
        let model = LinearSleepModel::with_defaults();

        let result = model.predict(features(f64::NAN, 8.0, 1.0));

        assert!(matches!(result, Err(EstimateError::Prediction(_))));
    }

    #[test]
    fn test_out_of_day_prediction_rejected() {
        let too_long = LinearSleepModel::new(LinearModelParams {
            intercept: 100_000.0,
            ..LinearModelParams::default()
        });
        let negative = LinearSleepModel::new(LinearModelParams {
            intercept: -100_000.0,
            ..LinearModelParams::default()
        });

        let input = features(28_800.0, 8.0, 1.0);
        assert!(matches!(
            too_long.predict(input),
            Err(EstimateError::Prediction(_))
        ));
        assert!(matches!(
            negative.predict(input),
            Err(EstimateError::Prediction(_))
        ));
    }

    #[test]
    fn test_params_json_round_trip() {
        let params = LinearModelParams {
            intercept: 900.0,
            wake_coef: -0.004,
            goal_coef: 3400.0,
            coffee_coef: 180.0,
            min_sleep_seconds: Some(14_400.0),
            max_sleep_seconds: None,
        };

        let json = params.to_json().unwrap();
        let loaded = LinearModelParams::from_json(&json).unwrap();

        assert_eq!(loaded.intercept, 900.0);
        assert_eq!(loaded.min_sleep_seconds, Some(14_400.0));
        assert_eq!(loaded.max_sleep_seconds, None);
    }

    #[test]
    fn test_from_json_missing_coefficients() {
        let result = LinearModelParams::from_json(r#"{"intercept": 1200.0}"#);

        assert!(matches!(result, Err(EstimateError::JsonError(_))));
    }

    #[test]
    fn test_validate_non_finite() {
        let params = LinearModelParams {
            goal_coef: f64::INFINITY,
            ..LinearModelParams::default()
        };

        let result = params.validate();

        assert!(matches!(result, Err(EstimateError::InvalidParams(_))));
    }

    #[test]
    fn test_validate_inverted_bounds() {
        let params = LinearModelParams {
            min_sleep_seconds: Some(30_000.0),
            max_sleep_seconds: Some(20_000.0),
            ..LinearModelParams::default()
        };

        let result = params.validate();

        assert!(matches!(result, Err(EstimateError::InvalidParams(_))));
    }

    #[test]
    fn test_model_name() {
        let model = LinearSleepModel::with_defaults();
        assert_eq!(model.name(), "linear-v1");
    }
}
