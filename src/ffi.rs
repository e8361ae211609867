//! FFI bindings for Driftoff
//!
//! This module provides C-compatible functions for calling Driftoff from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `driftoff_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde_json::json;

use crate::engine::BedtimeEngine;
use crate::report::ReportEncoder;
use crate::request::EstimateRequest;
use crate::session::{BedtimeSession, Outcome};
use crate::types::{CoffeeIntake, SleepGoal, SleepInputs, WakeTime};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Build typed inputs from raw C scalars, or record an error.
fn inputs_from_raw(
    wake_hour: i32,
    wake_minute: i32,
    sleep_goal_hours: f64,
    coffee_cups: i32,
) -> Option<SleepInputs> {
    if wake_hour < 0 || wake_minute < 0 {
        set_last_error(&format!(
            "Invalid wake time: {wake_hour}:{wake_minute} is not a valid time of day"
        ));
        return None;
    }
    let wake_time = match WakeTime::new(wake_hour as u32, wake_minute as u32) {
        Ok(wake_time) => wake_time,
        Err(e) => {
            set_last_error(&e.to_string());
            return None;
        }
    };
    if !sleep_goal_hours.is_finite() {
        set_last_error("sleep_goal_hours must be a finite number");
        return None;
    }
    if coffee_cups < 0 {
        set_last_error("coffee_cups must not be negative");
        return None;
    }

    Some(SleepInputs {
        wake_time,
        sleep_goal: SleepGoal::new(sleep_goal_hours),
        coffee: CoffeeIntake::new(coffee_cups as u32),
    })
}

fn outcome_status(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Editing => "editing",
        Outcome::Estimate(_) => "estimate",
        Outcome::Failed(_) => "failed",
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute an ideal bedtime and return the report JSON.
///
/// Sleep goal and coffee count are clamped to their valid ranges.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `driftoff_free_string`.
/// - Returns NULL on error; call `driftoff_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn driftoff_estimate(
    wake_hour: i32,
    wake_minute: i32,
    sleep_goal_hours: f64,
    coffee_cups: i32,
) -> *mut c_char {
    clear_last_error();

    let inputs = match inputs_from_raw(wake_hour, wake_minute, sleep_goal_hours, coffee_cups) {
        Some(inputs) => inputs,
        None => return ptr::null_mut(),
    };

    let engine = BedtimeEngine::new();
    match engine.estimate(&inputs) {
        Ok(estimate) => {
            let encoder = ReportEncoder::new();
            match encoder.encode_to_json(&estimate, engine.model_name()) {
                Ok(report_json) => string_to_cstr(&report_json),
                Err(e) => {
                    set_last_error(&e.to_string());
                    ptr::null_mut()
                }
            }
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compute an ideal bedtime from an `EstimateRequest` JSON object and return
/// the report JSON.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `driftoff_free_string`.
/// - Returns NULL on error; call `driftoff_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn driftoff_estimate_json(request_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    let request: EstimateRequest = match serde_json::from_str(&json_str) {
        Ok(request) => request,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let inputs = match request.to_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let engine = BedtimeEngine::new();
    match engine.estimate(&inputs) {
        Ok(estimate) => {
            let encoder = ReportEncoder::new();
            match encoder.encode_to_json(&estimate, engine.model_name()) {
                Ok(report_json) => string_to_cstr(&report_json),
                Err(e) => {
                    set_last_error(&e.to_string());
                    ptr::null_mut()
                }
            }
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Session API
// ============================================================================

/// Opaque handle to a BedtimeSession
pub struct BedtimeSessionHandle {
    session: BedtimeSession,
    encoder: ReportEncoder,
}

/// Create a new session with the initial-screen inputs and default model.
///
/// # Safety
/// - Returns a pointer to a newly allocated session.
/// - Must be freed with `driftoff_session_free`.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_new() -> *mut BedtimeSessionHandle {
    clear_last_error();

    let handle = Box::new(BedtimeSessionHandle {
        session: BedtimeSession::new(),
        encoder: ReportEncoder::new(),
    });
    Box::into_raw(handle)
}

/// Free a session.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_free(session: *mut BedtimeSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Set the session's wake-up time.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `driftoff_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_set_wake(
    session: *mut BedtimeSessionHandle,
    wake_hour: i32,
    wake_minute: i32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    if wake_hour < 0 || wake_minute < 0 {
        set_last_error(&format!(
            "Invalid wake time: {wake_hour}:{wake_minute} is not a valid time of day"
        ));
        return -1;
    }
    match WakeTime::new(wake_hour as u32, wake_minute as u32) {
        Ok(wake_time) => {
            handle.session.set_wake_time(wake_time);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Set the session's sleep goal in hours (clamped to [4, 12]).
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_set_sleep_goal(
    session: *mut BedtimeSessionHandle,
    hours: f64,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    if !hours.is_finite() {
        set_last_error("hours must be a finite number");
        return -1;
    }
    handle.session.set_sleep_goal(SleepGoal::new(hours));
    0
}

/// Set the session's coffee count (clamped to [1, 20]).
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_set_coffee(
    session: *mut BedtimeSessionHandle,
    cups: i32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    if cups < 0 {
        set_last_error("cups must not be negative");
        return -1;
    }
    handle.session.set_coffee(CoffeeIntake::new(cups as u32));
    0
}

/// Step the sleep goal by 0.25 hours, saturating at the bounds.
///
/// `direction > 0` steps up, `direction < 0` steps down, `0` is a no-op.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_step_sleep_goal(
    session: *mut BedtimeSessionHandle,
    direction: i32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    if direction > 0 {
        handle.session.step_sleep_goal_up();
    } else if direction < 0 {
        handle.session.step_sleep_goal_down();
    }
    0
}

/// Step the coffee count by one cup, saturating at the bounds.
///
/// `direction > 0` steps up, `direction < 0` steps down, `0` is a no-op.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_step_coffee(
    session: *mut BedtimeSessionHandle,
    direction: i32,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }
    let handle = &mut *session;

    if direction > 0 {
        handle.session.step_coffee_up();
    } else if direction < 0 {
        handle.session.step_coffee_down();
    }
    0
}

/// Run one calculation and return the outcome JSON.
///
/// On success the payload is `{"status":"estimate","report":{...}}`; on a
/// failed calculation it is `{"status":"failed","notice":{...}}` with the
/// fixed user-facing notice.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns a newly allocated string that must be freed with `driftoff_free_string`.
/// - Returns NULL on error; call `driftoff_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_calculate(
    session: *mut BedtimeSessionHandle,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &mut *session;

    let model_name = handle.session.model_name().to_string();
    let outcome = handle.session.calculate().clone();
    let payload = match &outcome {
        Outcome::Estimate(estimate) => {
            let report = handle.encoder.encode(estimate, &model_name);
            json!({ "status": "estimate", "report": report })
        }
        Outcome::Failed(notice) => json!({ "status": "failed", "notice": notice }),
        Outcome::Editing => json!({ "status": "editing" }),
    };

    match serde_json::to_string_pretty(&payload) {
        Ok(json_str) => string_to_cstr(&json_str),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the session's current inputs and outcome status as JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `driftoff_session_new`.
/// - Returns a newly allocated string that must be freed with `driftoff_free_string`.
/// - Returns NULL on error; call `driftoff_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn driftoff_session_state(
    session: *mut BedtimeSessionHandle,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &*session;

    let payload = json!({
        "status": outcome_status(handle.session.outcome()),
        "inputs": EstimateRequest::from_inputs(&handle.session.inputs()),
    });

    match serde_json::to_string_pretty(&payload) {
        Ok(json_str) => string_to_cstr(&json_str),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Driftoff functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Driftoff function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn driftoff_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Driftoff function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn driftoff_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        match &*e.borrow() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Driftoff library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn driftoff_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
