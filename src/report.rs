//! Report encoding
//!
//! This module formats bedtimes for display and encodes estimates into the
//! JSON payload handed across the FFI and CLI boundaries.

use crate::error::EstimateError;
use crate::types::BedtimeEstimate;
use crate::{DRIFTOFF_VERSION, PRODUCER_NAME};
use chrono::{NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Render a time of day in the short 12-hour style shown to the user.
///
/// Hours are unpadded, minutes zero-padded: "12:00 AM", "1:30 AM",
/// "10:45 PM".
pub fn format_short_time(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{}:{:02} {}", hour, time.minute(), suffix)
}

/// Producer metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Echo of the inputs an estimate was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInputs {
    pub wake_time: String,
    pub sleep_goal_hours: f64,
    pub coffee_cups: u32,
}

/// The model's side of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPrediction {
    pub model: String,
    pub predicted_sleep_minutes: f64,
}

/// The derived bedtime in both machine and display forms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBedtime {
    /// 24-hour clock value, "HH:MM"
    pub time: String,
    /// Short 12-hour style, e.g. "11:15 PM"
    pub display: String,
    /// True when the bedtime falls on the evening before the wake-up day
    pub previous_day: bool,
}

/// JSON payload describing one bedtime estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedtimeReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub inputs: ReportInputs,
    pub prediction: ReportPrediction,
    pub bedtime: ReportBedtime,
}

/// Report encoder for producing estimate payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an estimate into a report payload
    pub fn encode(&self, estimate: &BedtimeEstimate, model_name: &str) -> BedtimeReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: DRIFTOFF_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let inputs = ReportInputs {
            wake_time: estimate.inputs.wake_time.to_string(),
            sleep_goal_hours: estimate.inputs.sleep_goal.hours(),
            coffee_cups: estimate.inputs.coffee.cups(),
        };

        let prediction = ReportPrediction {
            model: model_name.to_string(),
            predicted_sleep_minutes: estimate.predicted_sleep.minutes(),
        };

        let bedtime = ReportBedtime {
            time: estimate.bedtime.format("%H:%M").to_string(),
            display: format_short_time(estimate.bedtime),
            previous_day: estimate.previous_day,
        };

        BedtimeReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            inputs,
            prediction,
            bedtime,
        }
    }

    /// Encode an estimate to a JSON string
    pub fn encode_to_json(
        &self,
        estimate: &BedtimeEstimate,
        model_name: &str,
    ) -> Result<String, EstimateError> {
        let report = self.encode(estimate, model_name);
        serde_json::to_string_pretty(&report).map_err(EstimateError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PredictedSleep, SleepInputs};
    use pretty_assertions::assert_eq;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn make_estimate() -> BedtimeEstimate {
        BedtimeEstimate {
            inputs: SleepInputs::default(),
            predicted_sleep: PredictedSleep::from_seconds(27_000.0),
            bedtime: time(0, 30),
            previous_day: false,
        }
    }

    #[test]
    fn test_short_time_style() {
        assert_eq!(format_short_time(time(0, 0)), "12:00 AM");
        assert_eq!(format_short_time(time(1, 30)), "1:30 AM");
        assert_eq!(format_short_time(time(9, 5)), "9:05 AM");
        assert_eq!(format_short_time(time(12, 0)), "12:00 PM");
        assert_eq!(format_short_time(time(22, 45)), "10:45 PM");
        assert_eq!(format_short_time(time(23, 59)), "11:59 PM");
    }

    #[test]
    fn test_encode_report_fields() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&make_estimate(), "linear-v1");

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, DRIFTOFF_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");

        assert_eq!(report.inputs.wake_time, "08:00");
        assert_eq!(report.inputs.sleep_goal_hours, 8.0);
        assert_eq!(report.inputs.coffee_cups, 1);

        assert_eq!(report.prediction.model, "linear-v1");
        assert_eq!(report.prediction.predicted_sleep_minutes, 450.0);

        assert_eq!(report.bedtime.time, "00:30");
        assert_eq!(report.bedtime.display, "12:30 AM");
        assert!(!report.bedtime.previous_day);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(&make_estimate(), "linear-v1").unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("computed_at_utc").is_some());
        assert_eq!(parsed["inputs"]["wake_time"], "08:00");
        assert_eq!(parsed["bedtime"]["display"], "12:30 AM");
    }

    #[test]
    fn test_previous_day_round_trip() {
        let estimate = BedtimeEstimate {
            bedtime: time(22, 0),
            previous_day: true,
            ..make_estimate()
        };
        let encoder = ReportEncoder::new();

        let json = encoder.encode_to_json(&estimate, "linear-v1").unwrap();
        let report: BedtimeReport = serde_json::from_str(&json).unwrap();

        assert_eq!(report.bedtime.display, "10:00 PM");
        assert!(report.bedtime.previous_day);
    }
}
