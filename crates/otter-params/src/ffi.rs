//! C ABI exports for an in-process consumer.
//!
//! The bridge queries are exported under their fixed names over one
//! process-wide context with the default [`BridgeConfig`](crate::BridgeConfig):
//! UTF-16 units, `-1` for an out-of-range index. On `wasm32` the same names
//! are imports supplied by the JS plugin instead, see [`crate::guest`].

use std::sync::LazyLock;

use crate::context::ParamsContext;
use crate::error::{ParamsError, ParamsResult};
use crate::registry;

static PARAMS: LazyLock<ParamsContext> = LazyLock::new(ParamsContext::default);

/// The process-wide context behind the exports.
pub fn global() -> &'static ParamsContext {
    &PARAMS
}

#[unsafe(no_mangle)]
pub extern "C" fn param_count() -> i32 {
    registry::param_count(global(), &[])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_key_length(i: i32) -> i32 {
    registry::param_key_length(global(), &[i])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_key_letter(i: i32, j: i32) -> i32 {
    registry::param_key_letter(global(), &[i, j])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_value_length(i: i32) -> i32 {
    registry::param_value_length(global(), &[i])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_value_letter(i: i32, j: i32) -> i32 {
    registry::param_value_letter(global(), &[i, j])
}

/// `full` non-zero measures the whole URL instead of the part before the query.
#[unsafe(no_mangle)]
pub extern "C" fn param_path_length(full: i32) -> i32 {
    registry::param_path_length(global(), &[full])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_path_letter(full: i32, j: i32) -> i32 {
    registry::param_path_letter(global(), &[full, j])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_hash_length() -> i32 {
    registry::param_hash_length(global(), &[])
}

#[unsafe(no_mangle)]
pub extern "C" fn param_hash_letter(j: i32) -> i32 {
    registry::param_hash_letter(global(), &[j])
}

/// Initialize the global snapshot from a UTF-8 query string.
///
/// Returns 0 on success and -1 if the bytes are not UTF-8.
///
/// # Safety
/// `ptr` must point to `len` readable bytes, or be null with `len == 0`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn params_init_query(ptr: *const u8, len: usize) -> i32 {
    // SAFETY: forwarded from the caller's contract
    match unsafe { read_utf8(ptr, len) } {
        Ok(query) => {
            global().initialize_query(query);
            0
        }
        Err(_) => -1,
    }
}

/// Initialize the global snapshot from a full UTF-8 URL.
///
/// Returns 0 once the snapshot is replaced, even for an unparsable URL
/// (see [`ParamsContext::initialize_url`]). Returns -1 only if the bytes are
/// not UTF-8, in which case the previous snapshot is kept.
///
/// # Safety
/// `ptr` must point to `len` readable bytes, or be null with `len == 0`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn params_init_url(ptr: *const u8, len: usize) -> i32 {
    // SAFETY: forwarded from the caller's contract
    match unsafe { read_utf8(ptr, len) } {
        Ok(url) => {
            global().initialize_url(url);
            0
        }
        Err(err) => {
            tracing::warn!(error = %err, "params_init_url rejected input");
            -1
        }
    }
}

/// Packed crate version, see [`crate::crate_version`].
#[unsafe(no_mangle)]
pub extern "C" fn params_crate_version() -> u32 {
    crate::crate_version()
}

unsafe fn read_utf8<'a>(ptr: *const u8, len: usize) -> ParamsResult<&'a str> {
    if ptr.is_null() {
        return if len == 0 {
            Ok("")
        } else {
            Err(ParamsError::InvalidUtf8)
        };
    }
    // SAFETY: caller guarantees `len` readable bytes at `ptr`
    let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
    std::str::from_utf8(bytes).map_err(|_| ParamsError::InvalidUtf8)
}
