//! FFI bindings for Echo Metrics
//!
//! This module provides C-compatible functions for calling the analytics
//! engines from other languages. All functions use C strings (null-terminated)
//! and return allocated memory that must be freed by the caller using
//! `echo_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::conversation::ConversationAnalyzer;
use crate::graph::FollowGraphDiffer;

// Thread-local storage for the last error message
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

/// Analyze a conversation JSON payload and return summary JSON.
///
/// Uses the built-in lexicon scorer.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `echo_free_string`.
/// - Returns NULL on error; call `echo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn echo_analyze_conversation(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match ConversationAnalyzer::new().analyze_json(&json_str) {
        Ok(summary) => string_to_cstr(&summary),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compare a followers export with a following export and return diff JSON.
///
/// `max_depth <= 0` selects the default nesting limit.
///
/// # Safety
/// - `followers_json` and `following_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `echo_free_string`.
/// - Returns NULL on error; call `echo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn echo_diff_follow_graph(
    followers_json: *const c_char,
    following_json: *const c_char,
    max_depth: i32,
) -> *mut c_char {
    clear_last_error();

    let followers = match cstr_to_string(followers_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid followers string pointer");
            return ptr::null_mut();
        }
    };

    let following = match cstr_to_string(following_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid following string pointer");
            return ptr::null_mut();
        }
    };

    let differ = if max_depth <= 0 {
        FollowGraphDiffer::default()
    } else {
        FollowGraphDiffer::with_max_depth(max_depth as usize)
    };

    match differ.diff_json(&followers, &following) {
        Ok(diff) => string_to_cstr(&diff),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a static string that is valid until the next Echo call.
/// - Do NOT free this pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn echo_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by Echo functions.
///
/// # Safety
/// - `s` must be a pointer returned by an Echo function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn echo_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { echo_free_string(ptr) };
        s
    }

    fn last_error() -> Option<String> {
        let ptr = unsafe { echo_last_error() };
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string())
    }

    #[test]
    fn test_ffi_analyze_conversation() {
        let json = CString::new(
            r#"{
                "participants": [{ "name": "A" }, { "name": "B" }],
                "messages": [
                    { "sender_name": "A", "timestamp_ms": 0, "content": "hello" },
                    { "sender_name": "B", "timestamp_ms": 120000, "content": "hi" }
                ]
            }"#,
        )
        .unwrap();

        let result = take_string(unsafe { echo_analyze_conversation(json.as_ptr()) });
        let payload: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(payload["metrics"]["averageResponseMinutes"]["B"], 2.0);
        assert!(last_error().is_none());
    }

    #[test]
    fn test_ffi_analyze_reports_precondition_error() {
        let json = CString::new(r#"{ "participants": [{ "name": "A" }] }"#).unwrap();

        let result = unsafe { echo_analyze_conversation(json.as_ptr()) };
        assert!(result.is_null());
        assert!(last_error().unwrap().contains("at least two participants"));
    }

    #[test]
    fn test_ffi_diff_follow_graph() {
        let followers = CString::new(r#"[{ "string_list_data": [{ "value": "a" }] }]"#).unwrap();
        let following = CString::new(r#"[{ "string_list_data": [{ "value": "b" }] }]"#).unwrap();

        let result = take_string(unsafe {
            echo_diff_follow_graph(followers.as_ptr(), following.as_ptr(), 0)
        });
        let payload: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(payload["notFollowingBack"], serde_json::json!(["b"]));
        assert_eq!(payload["youDontFollowBack"], serde_json::json!(["a"]));
    }

    #[test]
    fn test_ffi_diff_honours_max_depth() {
        let followers =
            CString::new(r#"{ "wrap": [{ "string_list_data": [{ "value": "a" }] }] }"#).unwrap();
        let following = CString::new(r#"[]"#).unwrap();

        let result = unsafe { echo_diff_follow_graph(followers.as_ptr(), following.as_ptr(), 1) };
        assert!(result.is_null());
        assert!(last_error().unwrap().contains("maximum nesting depth of 1"));

        let result = take_string(unsafe {
            echo_diff_follow_graph(followers.as_ptr(), following.as_ptr(), -5)
        });
        let payload: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(payload["youDontFollowBack"], serde_json::json!(["a"]));
    }

    #[test]
    fn test_ffi_null_pointers() {
        let result = unsafe { echo_diff_follow_graph(ptr::null(), ptr::null(), 0) };
        assert!(result.is_null());
        assert_eq!(last_error().as_deref(), Some("Invalid followers string pointer"));

        unsafe { echo_free_string(ptr::null_mut()) };
    }
}
