//! Estimate request schema
//!
//! JSON input surface shared by the FFI and CLI: one request per estimate,
//! with the wake time as an "HH:MM" string and plain numeric fields.
//! Requests validate into the typed inputs the engine consumes.

use crate::error::EstimateError;
use crate::types::{CoffeeIntake, SleepGoal, SleepInputs, WakeTime};
use serde::{Deserialize, Serialize};

/// One bedtime estimate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Wake-up time as "HH:MM" on a 24-hour clock
    pub wake_time: String,
    /// Desired amount of sleep in hours
    pub sleep_goal_hours: f64,
    /// Cups of coffee for the day
    pub coffee_cups: u32,
}

impl EstimateRequest {
    /// Validate into typed inputs.
    ///
    /// The wake time must parse as "HH:MM"; sleep goal and coffee count
    /// are clamped to their ranges the way the UI steppers would.
    pub fn to_inputs(&self) -> Result<SleepInputs, EstimateError> {
        let wake_time: WakeTime = self.wake_time.parse()?;
        Ok(SleepInputs {
            wake_time,
            sleep_goal: SleepGoal::new(self.sleep_goal_hours),
            coffee: CoffeeIntake::new(self.coffee_cups),
        })
    }

    /// Echo typed inputs back into request form
    pub fn from_inputs(inputs: &SleepInputs) -> Self {
        Self {
            wake_time: inputs.wake_time.to_string(),
            sleep_goal_hours: inputs.sleep_goal.hours(),
            coffee_cups: inputs.coffee.cups(),
        }
    }

    /// Parse a JSON array of requests
    pub fn parse_array(json: &str) -> Result<Vec<EstimateRequest>, EstimateError> {
        let requests: Vec<EstimateRequest> = serde_json::from_str(json)?;
        Ok(requests)
    }

    /// Parse NDJSON (newline-delimited JSON) requests, skipping blank lines
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<EstimateRequest>, EstimateError> {
        let mut requests = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<EstimateRequest>(trimmed) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    return Err(EstimateError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(requests)
    }
}
