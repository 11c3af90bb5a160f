//! C FFI layer for cross-language interoperability.

use crate::config::Config;
use crate::converter::ConverterOptions;
use crate::normalize::normalize_indentation;
use crate::{render_markdown, render_page};
use libc::{c_char, size_t};
use std::ffi::{CStr, CString};
use std::ptr;

/// Result type for FFI operations.
#[repr(C)]
pub struct DataMdResult {
    /// Pointer to result string (caller must free with datamd_free_string)
    pub data: *mut c_char,
    /// Error message if data is null (caller must free with datamd_free_string)
    pub error: *mut c_char,
    /// Marked elements left unrendered (page rendering only)
    pub failed: size_t,
}

impl DataMdResult {
    fn ok(data: String, failed: usize) -> Self {
        Self {
            data: into_c_string(data),
            error: ptr::null_mut(),
            failed,
        }
    }

    fn err(error: String) -> Self {
        Self {
            data: ptr::null_mut(),
            error: into_c_string(error),
            failed: 0,
        }
    }
}

// Interior NUL bytes cannot cross the boundary; they are dropped.
fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

unsafe fn read_str<'a>(s: *const c_char, what: &str) -> Result<&'a str, DataMdResult> {
    if s.is_null() {
        return Err(DataMdResult::err(format!("Null {what} pointer")));
    }
    CStr::from_ptr(s)
        .to_str()
        .map_err(|_| DataMdResult::err(format!("Invalid UTF-8 {what}")))
}

/// Render every marked element of an HTML page.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - `config_toml` must be a valid null-terminated UTF-8 string, or null for
///   the default configuration.
/// - The returned result must be freed with `datamd_free_result`.
#[no_mangle]
pub unsafe extern "C" fn datamd_render_page(
    input: *const c_char,
    config_toml: *const c_char,
) -> DataMdResult {
    let input = match read_str(input, "input") {
        Ok(s) => s,
        Err(e) => return e,
    };

    let config = if config_toml.is_null() {
        Config::default()
    } else {
        let source = match read_str(config_toml, "config") {
            Ok(s) => s,
            Err(e) => return e,
        };
        match Config::from_toml_str(source) {
            Ok(c) => c,
            Err(e) => return DataMdResult::err(e.to_string()),
        }
    };

    match render_page(input, &config) {
        Ok(page) => {
            let failed = page.report.len() - page.report.rendered();
            DataMdResult::ok(page.html, failed)
        }
        Err(e) => DataMdResult::err(e.to_string()),
    }
}

/// De-indent and render a single Markdown snippet with default options.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - The returned result must be freed with `datamd_free_result`.
#[no_mangle]
pub unsafe extern "C" fn datamd_render_markdown(input: *const c_char) -> DataMdResult {
    let input = match read_str(input, "input") {
        Ok(s) => s,
        Err(e) => return e,
    };

    match render_markdown(input, &ConverterOptions::default()) {
        Ok(html) => DataMdResult::ok(html, 0),
        Err(e) => DataMdResult::err(e.to_string()),
    }
}

/// De-indent a Markdown snippet without converting it.
///
/// # Safety
///
/// - `input` must be a valid null-terminated UTF-8 string.
/// - The returned result must be freed with `datamd_free_result`.
#[no_mangle]
pub unsafe extern "C" fn datamd_normalize(input: *const c_char) -> DataMdResult {
    match read_str(input, "input") {
        Ok(s) => DataMdResult::ok(normalize_indentation(s), 0),
        Err(e) => e,
    }
}

/// Free a string returned by datamd functions.
///
/// # Safety
///
/// - `s` must be a pointer returned by a datamd function, or null.
#[no_mangle]
pub unsafe extern "C" fn datamd_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Free a result struct.
///
/// # Safety
///
/// - `result` must be a valid DataMdResult.
#[no_mangle]
pub unsafe extern "C" fn datamd_free_result(result: DataMdResult) {
    datamd_free_string(result.data);
    datamd_free_string(result.error);
}

/// Get the library version.
///
/// The returned string is static and must not be freed.
#[no_mangle]
pub extern "C" fn datamd_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

// Generate C header content for documentation
/// ```c
/// // data_markdown.h
/// #ifndef DATA_MARKDOWN_H
/// #define DATA_MARKDOWN_H
///
/// #include <stddef.h>
///
/// typedef struct {
///     char* data;
///     char* error;
///     size_t failed;
/// } DataMdResult;
///
/// DataMdResult datamd_render_page(const char* input, const char* config_toml);
/// DataMdResult datamd_render_markdown(const char* input);
/// DataMdResult datamd_normalize(const char* input);
/// void datamd_free_string(char* s);
/// void datamd_free_result(DataMdResult result);
/// const char* datamd_version(void);
///
/// #endif
/// ```
const _: () = ();
