//! FFI bindings for TherapEase
//!
//! C-compatible entry points so a host UI can embed the suggestion pipeline.
//! All strings are null-terminated; returned strings are heap allocated and
//! must be released with `therapease_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{suggest_activity, ActivityAdvisor};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Suggest an activity from a model artifact and one submission, both JSON.
///
/// # Safety
/// - `model_json` and `input_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `therapease_free_string`.
/// - Returns NULL on error; call `therapease_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn therapease_suggest_activity(
    model_json: *const c_char,
    input_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model string pointer");
            return ptr::null_mut();
        }
    };

    let input_str = match cstr_to_string(input_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid input string pointer");
            return ptr::null_mut();
        }
    };

    match suggest_activity(model_str, input_str) {
        Ok(record) => string_to_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Advisor API
// ============================================================================

/// Opaque handle to a loaded ActivityAdvisor
pub struct AdvisorHandle {
    advisor: ActivityAdvisor,
}

/// Load the model at `model_path` and create an advisor.
///
/// # Safety
/// - `model_path` must be a valid null-terminated C string.
/// - Must be freed with `therapease_advisor_free`.
/// - Returns NULL on error; call `therapease_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn therapease_advisor_new(model_path: *const c_char) -> *mut AdvisorHandle {
    clear_last_error();

    let path = match cstr_to_string(model_path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model path pointer");
            return ptr::null_mut();
        }
    };

    match ActivityAdvisor::from_model_path(&path) {
        Ok(advisor) => Box::into_raw(Box::new(AdvisorHandle { advisor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an advisor.
///
/// # Safety
/// - `advisor` must be a valid pointer returned by `therapease_advisor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn therapease_advisor_free(advisor: *mut AdvisorHandle) {
    if !advisor.is_null() {
        drop(Box::from_raw(advisor));
    }
}

/// Run one JSON submission through a loaded advisor.
///
/// # Safety
/// - `advisor` must be a valid pointer returned by `therapease_advisor_new`.
/// - `input_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `therapease_free_string`.
/// - Returns NULL on error; call `therapease_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn therapease_advisor_suggest(
    advisor: *const AdvisorHandle,
    input_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if advisor.is_null() {
        set_last_error("Null advisor pointer");
        return ptr::null_mut();
    }

    let handle = &*advisor;

    let input_str = match cstr_to_string(input_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid input string pointer");
            return ptr::null_mut();
        }
    };

    match handle.advisor.suggest_json(&input_str) {
        Ok(record) => string_to_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by TherapEase functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a TherapEase function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn therapease_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next TherapEase call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn therapease_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free it.
#[no_mangle]
pub unsafe extern "C" fn therapease_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FOREST_FORMAT;
    use crate::types::FEATURE_NAMES;

    fn model_json() -> String {
        serde_json::json!({
            "format": FOREST_FORMAT,
            "feature_names": FEATURE_NAMES,
            "classes": [2, 4],
            "trees": [{ "nodes": [
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [0.0, 3.0] },
                { "value": [5.0, 1.0] }
            ]}]
        })
        .to_string()
    }

    fn input(energy: &str) -> CString {
        CString::new(format!(
            r#"{{"mood":"Happy","energy":"{energy}","stress":"Low","sleep_hours":6,"time_available":15}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_ffi_suggest_activity() {
        let model = CString::new(model_json()).unwrap();
        let input = input("High");

        unsafe {
            let result = therapease_suggest_activity(model.as_ptr(), input.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let record: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(record["activity"], "Deep Breathing");

            therapease_free_string(result);
        }
    }

    #[test]
    fn test_ffi_advisor_lifecycle() {
        let path = std::env::temp_dir().join(format!("therapease-ffi-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, model_json()).unwrap();
        let c_path = CString::new(path.to_string_lossy().into_owned()).unwrap();

        unsafe {
            let advisor = therapease_advisor_new(c_path.as_ptr());
            assert!(!advisor.is_null());

            let low = input("Low");
            let result = therapease_advisor_suggest(advisor, low.as_ptr());
            assert!(!result.is_null());
            let record: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(record["activity"], "Walk");
            therapease_free_string(result);

            therapease_advisor_free(advisor);
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_ffi_error_handling() {
        let model = CString::new(model_json()).unwrap();
        let input = input("Sky-high");

        unsafe {
            let result = therapease_suggest_activity(model.as_ptr(), input.as_ptr());
            assert!(result.is_null());

            let error = therapease_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("Energy"));
        }
    }

    #[test]
    fn test_ffi_missing_model_file() {
        let path = CString::new("/nonexistent/model.json").unwrap();

        unsafe {
            let advisor = therapease_advisor_new(path.as_ptr());
            assert!(advisor.is_null());
            assert!(!therapease_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = therapease_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
