//! Generate a bedtime report for validation testing

use driftoff::{BedtimeEngine, EstimateRequest, ReportEncoder};

fn main() {
    let json = r#"{
        "wake_time": "06:45",
        "sleep_goal_hours": 7.5,
        "coffee_cups": 2
    }"#;

    let request: EstimateRequest = match serde_json::from_str(json) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {e:?}");
            return;
        }
    };

    let engine = BedtimeEngine::new();
    let report = request
        .to_inputs()
        .and_then(|inputs| engine.estimate(&inputs))
        .and_then(|estimate| ReportEncoder::new().encode_to_json(&estimate, engine.model_name()));

    match report {
        Ok(json) => print!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
