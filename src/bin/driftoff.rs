//! Driftoff CLI - Command-line interface for Driftoff
//!
//! Commands:
//! - estimate: Compute one ideal bedtime (one-shot mode)
//! - run: Process streaming estimate requests from stdin (streaming mode)
//! - model: Print the active model parameters
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use driftoff::engine::BedtimeEngine;
use driftoff::model::{LinearModelParams, LinearSleepModel};
use driftoff::report::{BedtimeReport, ReportEncoder};
use driftoff::request::EstimateRequest;
use driftoff::session::RESULT_HEADLINE;
use driftoff::types::SleepInputs;
use driftoff::{EstimateError, SleepPredictor, DRIFTOFF_VERSION, PRODUCER_NAME};

/// Driftoff - On-device bedtime estimation engine
#[derive(Parser)]
#[command(name = "driftoff")]
#[command(author = "Driftoff Labs")]
#[command(version = DRIFTOFF_VERSION)]
#[command(about = "Estimate ideal bedtimes from wake time, sleep goal, and coffee", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one ideal bedtime (one-shot mode)
    Estimate {
        /// Wake-up time as HH:MM (24-hour clock)
        #[arg(long, default_value = "08:00")]
        wake: String,

        /// Desired amount of sleep in hours (clamped to 4-12)
        #[arg(long, default_value = "8.0")]
        sleep_goal: f64,

        /// Cups of coffee for the day (clamped to 1-20)
        #[arg(long, default_value = "1")]
        coffee: u32,

        /// Load linear model parameters from a JSON file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process streaming estimate requests from stdin (streaming mode)
    Run {
        /// Load linear model parameters from a JSON file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Print the active model parameters
    Model {
        /// Load linear model parameters from a JSON file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check a model parameters file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DriftoffCliError> {
    match cli.command {
        Commands::Estimate {
            wake,
            sleep_goal,
            coffee,
            model,
            json,
        } => cmd_estimate(&wake, sleep_goal, coffee, model.as_deref(), json),

        Commands::Run {
            model,
            output_format,
            flush,
        } => cmd_run(model.as_deref(), output_format, flush),

        Commands::Model { model, json } => cmd_model(model.as_deref(), json),

        Commands::Doctor { model, json } => cmd_doctor(model.as_deref(), json),
    }
}

fn cmd_estimate(
    wake: &str,
    sleep_goal: f64,
    coffee: u32,
    model_path: Option<&Path>,
    json: bool,
) -> Result<(), DriftoffCliError> {
    let request = EstimateRequest {
        wake_time: wake.to_string(),
        sleep_goal_hours: sleep_goal,
        coffee_cups: coffee,
    };
    let inputs = request.to_inputs()?;

    let engine = build_engine(model_path)?;
    let estimate = engine.estimate(&inputs)?;

    if json {
        let encoder = ReportEncoder::new();
        println!("{}", encoder.encode_to_json(&estimate, engine.model_name())?);
    } else {
        println!("{} {}", RESULT_HEADLINE, estimate.display());
        if estimate.previous_day {
            println!("(the evening before your wake-up day)");
        }
    }

    Ok(())
}

fn cmd_run(
    model_path: Option<&Path>,
    output_format: OutputFormat,
    flush: bool,
) -> Result<(), DriftoffCliError> {
    let engine = build_engine(model_path)?;
    let encoder = ReportEncoder::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut records: Vec<serde_json::Value> = Vec::new();

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        // A failed request becomes an error record; processing continues.
        let record = match estimate_line(&engine, &encoder, trimmed) {
            Ok(report) => serde_json::to_value(&report)?,
            Err(e) => serde_json::json!({
                "line": line_num + 1,
                "error": serde_json::to_value(&CliError::from(e))?,
            }),
        };

        match output_format {
            OutputFormat::Ndjson => {
                writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
                if flush {
                    stdout.flush()?;
                }
            }
            _ => records.push(record),
        }
    }

    match output_format {
        OutputFormat::Ndjson => {}
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string(&records)?)?,
        OutputFormat::JsonPretty => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&records)?)?
        }
    }

    Ok(())
}

fn estimate_line(
    engine: &BedtimeEngine,
    encoder: &ReportEncoder,
    line: &str,
) -> Result<BedtimeReport, DriftoffCliError> {
    let request: EstimateRequest = serde_json::from_str(line)
        .map_err(|e| DriftoffCliError::ParseError(format!("Failed to parse request: {}", e)))?;
    let inputs = request.to_inputs()?;
    let estimate = engine.estimate(&inputs)?;
    Ok(encoder.encode(&estimate, engine.model_name()))
}

fn cmd_model(model_path: Option<&Path>, json: bool) -> Result<(), DriftoffCliError> {
    let params = load_params(model_path)?;

    if json {
        println!("{}", params.to_json()?);
        return Ok(());
    }

    let model = LinearSleepModel::new(params);
    println!("Model: {}", model.name());
    println!();
    println!("predicted_seconds = intercept");
    println!("                  + wake_coef   * wake_seconds");
    println!("                  + goal_coef   * sleep_goal_hours");
    println!("                  + coffee_coef * coffee_cups");
    println!();
    println!("intercept:   {:>12.3}", model.params.intercept);
    println!("wake_coef:   {:>12.3}", model.params.wake_coef);
    println!("goal_coef:   {:>12.3}", model.params.goal_coef);
    println!("coffee_coef: {:>12.3}", model.params.coffee_coef);

    match model.params.min_sleep_seconds {
        Some(min) => println!("min_sleep_seconds: {}", min),
        None => println!("min_sleep_seconds: (none)"),
    }
    match model.params.max_sleep_seconds {
        Some(max) => println!("max_sleep_seconds: {}", max),
        None => println!("max_sleep_seconds: (none)"),
    }

    Ok(())
}

fn cmd_doctor(model_path: Option<&Path>, json: bool) -> Result<(), DriftoffCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check Driftoff version
    checks.push(DoctorCheck {
        name: "driftoff_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Driftoff version {}", DRIFTOFF_VERSION),
    });

    // Check model parameters
    let params = match model_path {
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "model_params".to_string(),
                status: CheckStatus::Warning,
                message: "Model file does not exist, falling back to defaults".to_string(),
            });
            Some(LinearModelParams::default())
        }
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match LinearModelParams::from_json(&content) {
                Ok(params) => {
                    checks.push(DoctorCheck {
                        name: "model_params".to_string(),
                        status: CheckStatus::Ok,
                        message: format!("Model file valid ({})", path.display()),
                    });
                    Some(params)
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "model_params".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid model file: {}", e),
                    });
                    None
                }
            },
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "model_params".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read model file: {}", e),
                });
                None
            }
        },
        None => {
            checks.push(DoctorCheck {
                name: "model_params".to_string(),
                status: CheckStatus::Ok,
                message: "Using bundled default parameters".to_string(),
            });
            Some(LinearModelParams::default())
        }
    };

    // Golden evaluation: the initial-screen inputs must produce a bedtime
    if let Some(params) = params {
        let engine = BedtimeEngine::with_params(params);
        match engine.estimate(&SleepInputs::default()) {
            Ok(estimate) => {
                checks.push(DoctorCheck {
                    name: "golden_estimate".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Default inputs produce a {} bedtime", estimate.display()),
                });
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "golden_estimate".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Default inputs fail: {}", e),
                });
            }
        }
    }

    // Check stdin state (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: DRIFTOFF_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Driftoff Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(DriftoffCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn load_params(model_path: Option<&Path>) -> Result<LinearModelParams, DriftoffCliError> {
    match model_path {
        Some(path) => {
            let params_json = fs::read_to_string(path)?;
            let params = LinearModelParams::from_json(&params_json)?;
            info!("loaded model parameters from {}", path.display());
            Ok(params)
        }
        None => Ok(LinearModelParams::default()),
    }
}

fn build_engine(model_path: Option<&Path>) -> Result<BedtimeEngine, DriftoffCliError> {
    Ok(BedtimeEngine::with_params(load_params(model_path)?))
}

// Error types

#[derive(Debug)]
enum DriftoffCliError {
    Io(io::Error),
    Estimate(EstimateError),
    Json(serde_json::Error),
    ParseError(String),
    DoctorFailed,
}

impl From<io::Error> for DriftoffCliError {
    fn from(e: io::Error) -> Self {
        DriftoffCliError::Io(e)
    }
}

impl From<EstimateError> for DriftoffCliError {
    fn from(e: EstimateError) -> Self {
        DriftoffCliError::Estimate(e)
    }
}

impl From<serde_json::Error> for DriftoffCliError {
    fn from(e: serde_json::Error) -> Self {
        DriftoffCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DriftoffCliError> for CliError {
    fn from(e: DriftoffCliError) -> Self {
        match e {
            DriftoffCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            DriftoffCliError::Estimate(e) => {
                let (code, hint) = match &e {
                    EstimateError::Prediction(_) => (
                        "PREDICTION_ERROR",
                        "The model could not produce a bedtime for these inputs",
                    ),
                    EstimateError::InvalidParams(_) => {
                        ("MODEL_ERROR", "Check the model parameters file")
                    }
                    EstimateError::InvalidWakeTime(_) => {
                        ("INVALID_WAKE_TIME", "Use HH:MM on a 24-hour clock")
                    }
                    EstimateError::ParseError(_) => ("PARSE_ERROR", "Check input format"),
                    EstimateError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            DriftoffCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            DriftoffCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
            DriftoffCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
