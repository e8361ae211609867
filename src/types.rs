//! Core types for the driftoff calculator
//!
//! This module defines the values that flow through a calculation: the three
//! form inputs, the numeric feature vector handed to the regression model,
//! the model's predicted sleep duration, and the derived bedtime estimate.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimateError;

/// Time-of-day the user wants to wake up, at minute resolution.
///
/// The default is 08:00, the form's initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeTime(NaiveTime);

impl WakeTime {
    /// Hour component of the default wake-up time
    pub const DEFAULT_HOUR: u32 = 8;

    /// Create a wake time from an hour (0-23) and minute (0-59)
    pub fn new(hour: u32, minute: u32) -> Result<Self, EstimateError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| {
                EstimateError::InvalidWakeTime(format!(
                    "{hour:02}:{minute:02} is not a valid time of day"
                ))
            })
    }

    /// Create a wake time from a clock value, truncating below the minute
    pub fn from_time(time: NaiveTime) -> Self {
        let minutes = i64::from(time.hour() * 60 + time.minute());
        Self(NaiveTime::MIN + Duration::minutes(minutes))
    }

    /// The underlying clock value
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Seconds elapsed since midnight, the model's wake feature
    pub fn seconds_since_midnight(&self) -> u32 {
        self.0.hour() * 3600 + self.0.minute() * 60
    }
}

impl Default for WakeTime {
    fn default() -> Self {
        // NaiveTime addition wraps at midnight, so this is total.
        Self(NaiveTime::MIN + Duration::hours(i64::from(Self::DEFAULT_HOUR)))
    }
}

impl FromStr for WakeTime {
    type Err = EstimateError;

    /// Parse a wake time from "HH:MM" (24-hour clock)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|e| EstimateError::InvalidWakeTime(format!("{s:?}: {e} (expected HH:MM)")))
    }
}

impl fmt::Display for WakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Desired hours of sleep, clamped to the form's stepper range.
///
/// The range is 4.0 to 12.0 hours in steps of a quarter hour; out-of-range
/// values are clamped on construction, and steps saturate at the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct SleepGoal(f64);

impl SleepGoal {
    pub const MIN_HOURS: f64 = 4.0;
    pub const MAX_HOURS: f64 = 12.0;
    pub const STEP_HOURS: f64 = 0.25;

    /// Create a sleep goal, clamping to the stepper range
    pub fn new(hours: f64) -> Self {
        Self(hours.clamp(Self::MIN_HOURS, Self::MAX_HOURS))
    }

    pub fn hours(&self) -> f64 {
        self.0
    }

    pub fn seconds(&self) -> f64 {
        self.0 * 3600.0
    }

    /// One stepper increment up, saturating at the maximum
    #[must_use]
    pub fn step_up(self) -> Self {
        Self::new(self.0 + Self::STEP_HOURS)
    }

    /// One stepper increment down, saturating at the minimum
    #[must_use]
    pub fn step_down(self) -> Self {
        Self::new(self.0 - Self::STEP_HOURS)
    }
}

impl Default for SleepGoal {
    fn default() -> Self {
        Self(8.0)
    }
}

impl From<f64> for SleepGoal {
    fn from(hours: f64) -> Self {
        Self::new(hours)
    }
}

impl From<SleepGoal> for f64 {
    fn from(goal: SleepGoal) -> f64 {
        goal.0
    }
}

impl fmt::Display for SleepGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0} hours", self.0)
        } else {
            write!(f, "{} hours", self.0)
        }
    }
}

/// Daily coffee intake in cups, clamped to the form's stepper range (1-20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct CoffeeIntake(u32);

impl CoffeeIntake {
    pub const MIN_CUPS: u32 = 1;
    pub const MAX_CUPS: u32 = 20;

    /// Create a coffee intake, clamping to the stepper range
    pub fn new(cups: u32) -> Self {
        Self(cups.clamp(Self::MIN_CUPS, Self::MAX_CUPS))
    }

    pub fn cups(&self) -> u32 {
        self.0
    }

    /// One cup more, saturating at the maximum
    #[must_use]
    pub fn step_up(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One cup fewer, saturating at the minimum
    #[must_use]
    pub fn step_down(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for CoffeeIntake {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u32> for CoffeeIntake {
    fn from(cups: u32) -> Self {
        Self::new(cups)
    }
}

impl From<CoffeeIntake> for u32 {
    fn from(intake: CoffeeIntake) -> u32 {
        intake.0
    }
}

impl fmt::Display for CoffeeIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 cup")
        } else {
            write!(f, "{} cups", self.0)
        }
    }
}

/// The three form inputs of a calculation.
///
/// `Default` is the screen's initial state: wake at 08:00, 8 hours of
/// sleep, 1 cup of coffee.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SleepInputs {
    pub wake_time: WakeTime,
    pub sleep_goal: SleepGoal,
    pub coffee: CoffeeIntake,
}

impl SleepInputs {
    pub fn new(wake_time: WakeTime, sleep_goal: SleepGoal, coffee: CoffeeIntake) -> Self {
        Self {
            wake_time,
            sleep_goal,
            coffee,
        }
    }

    /// The numeric feature vector handed to the predictor
    pub fn features(&self) -> SleepFeatures {
        SleepFeatures {
            wake_seconds: f64::from(self.wake_time.seconds_since_midnight()),
            sleep_goal_hours: self.sleep_goal.hours(),
            coffee_cups: f64::from(self.coffee.cups()),
        }
    }
}

/// Feature vector of the predictor contract:
/// (seconds since midnight, desired sleep hours, coffee cups).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepFeatures {
    pub wake_seconds: f64,
    pub sleep_goal_hours: f64,
    pub coffee_cups: f64,
}

impl SleepFeatures {
    /// Whether every feature is a finite number
    pub fn is_finite(&self) -> bool {
        self.wake_seconds.is_finite()
            && self.sleep_goal_hours.is_finite()
            && self.coffee_cups.is_finite()
    }
}

/// Predicted actual-sleep duration returned by the model, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedSleep(f64);

impl PredictedSleep {
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn minutes(&self) -> f64 {
        self.0 / 60.0
    }

    pub fn hours(&self) -> f64 {
        self.0 / 3600.0
    }

    /// The prediction as a clock duration, rounded to whole seconds
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.0.round() as i64)
    }
}

/// A derived bedtime: wake-up time minus the predicted sleep duration.
///
/// Estimates are recomputed per calculation and never cached; the inputs
/// they were derived from travel with them so a result can always be
/// traced back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BedtimeEstimate {
    /// Inputs this estimate was derived from
    pub inputs: SleepInputs,
    /// The model's predicted actual-sleep duration
    pub predicted_sleep: PredictedSleep,
    /// Ideal bedtime as a clock value
    pub bedtime: NaiveTime,
    /// True when the bedtime falls strictly before midnight of the wake-up
    /// day (the subtraction borrowed a day)
    pub previous_day: bool,
}

impl BedtimeEstimate {
    /// The bedtime in the short 12-hour style shown to the user
    pub fn display(&self) -> String {
        crate::report::format_short_time(self.bedtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_inputs_match_initial_screen() {
        let inputs = SleepInputs::default();

        assert_eq!(inputs.wake_time.hour(), 8);
        assert_eq!(inputs.wake_time.minute(), 0);
        assert_eq!(inputs.sleep_goal.hours(), 8.0);
        assert_eq!(inputs.coffee.cups(), 1);
    }

    #[test]
    fn test_wake_time_validation() {
        assert!(WakeTime::new(7, 30).is_ok());
        assert!(WakeTime::new(0, 0).is_ok());
        assert!(WakeTime::new(23, 59).is_ok());
        assert!(WakeTime::new(24, 0).is_err());
        assert!(WakeTime::new(8, 60).is_err());
    }

    #[test]
    fn test_wake_time_parse() {
        let wake: WakeTime = "07:30".parse().unwrap();
        assert_eq!(wake.hour(), 7);
        assert_eq!(wake.minute(), 30);

        assert!("24:00".parse::<WakeTime>().is_err());
        assert!("bedtime".parse::<WakeTime>().is_err());
        assert!("".parse::<WakeTime>().is_err());
    }

    #[test]
    fn test_wake_time_display_roundtrip() {
        let wake = WakeTime::new(6, 5).unwrap();
        assert_eq!(wake.to_string(), "06:05");
        assert_eq!(wake.to_string().parse::<WakeTime>().unwrap(), wake);
    }

    #[test]
    fn test_seconds_since_midnight() {
        assert_eq!(WakeTime::default().seconds_since_midnight(), 8 * 3600);
        assert_eq!(
            WakeTime::new(7, 30).unwrap().seconds_since_midnight(),
            7 * 3600 + 30 * 60
        );
        assert_eq!(WakeTime::new(0, 0).unwrap().seconds_since_midnight(), 0);
    }

    #[test]
    fn test_from_time_truncates_seconds() {
        let time = NaiveTime::from_hms_opt(7, 30, 42).unwrap();
        let wake = WakeTime::from_time(time);

        assert_eq!(wake.hour(), 7);
        assert_eq!(wake.minute(), 30);
        assert_eq!(wake.time().second(), 0);
    }

    #[test]
    fn test_sleep_goal_clamps_to_range() {
        assert_eq!(SleepGoal::new(3.0).hours(), 4.0);
        assert_eq!(SleepGoal::new(13.0).hours(), 12.0);
        assert_eq!(SleepGoal::new(7.75).hours(), 7.75);
    }

    #[test]
    fn test_sleep_goal_steps_saturate() {
        let goal = SleepGoal::new(8.0);
        assert_eq!(goal.step_up().hours(), 8.25);
        assert_eq!(goal.step_down().hours(), 7.75);

        assert_eq!(SleepGoal::new(12.0).step_up().hours(), 12.0);
        assert_eq!(SleepGoal::new(4.0).step_down().hours(), 4.0);
    }

    #[test]
    fn test_sleep_goal_display() {
        assert_eq!(SleepGoal::new(8.0).to_string(), "8 hours");
        assert_eq!(SleepGoal::new(7.75).to_string(), "7.75 hours");
        assert_eq!(SleepGoal::new(8.5).to_string(), "8.5 hours");
    }

    #[test]
    fn test_coffee_clamps_and_saturates() {
        assert_eq!(CoffeeIntake::new(0).cups(), 1);
        assert_eq!(CoffeeIntake::new(25).cups(), 20);

        assert_eq!(CoffeeIntake::new(1).step_down().cups(), 1);
        assert_eq!(CoffeeIntake::new(20).step_up().cups(), 20);
        assert_eq!(CoffeeIntake::new(3).step_up().cups(), 4);
    }

    #[test]
    fn test_coffee_display_pluralizes() {
        assert_eq!(CoffeeIntake::new(1).to_string(), "1 cup");
        assert_eq!(CoffeeIntake::new(2).to_string(), "2 cups");
    }

    #[test]
    fn test_serde_clamps_out_of_range_values() {
        let goal: SleepGoal = serde_json::from_str("2.0").unwrap();
        assert_eq!(goal.hours(), 4.0);

        let coffee: CoffeeIntake = serde_json::from_str("99").unwrap();
        assert_eq!(coffee.cups(), 20);
    }

    #[test]
    fn test_features_vector() {
        let inputs = SleepInputs::new(
            WakeTime::new(7, 30).unwrap(),
            SleepGoal::new(8.0),
            CoffeeIntake::new(2),
        );
        let features = inputs.features();

        assert_eq!(features.wake_seconds, 27_000.0);
        assert_eq!(features.sleep_goal_hours, 8.0);
        assert_eq!(features.coffee_cups, 2.0);
        assert!(features.is_finite());
    }

    #[test]
    fn test_predicted_sleep_conversions() {
        let predicted = PredictedSleep::from_seconds(19_800.0);

        assert_eq!(predicted.minutes(), 330.0);
        assert_eq!(predicted.hours(), 5.5);
        assert_eq!(predicted.duration(), Duration::seconds(19_800));
    }
}
