//! Query parameters as command-line arguments.
//!
//! `https://.../index.html?k=1&begin&something=spa%20ce` reads like running
//! `prog -k=1 --begin --something=spa ce`, so an argument parser written
//! for the native build works unchanged in the browser.

/// Convert pairs into argument form, program path first.
///
/// Single-character keys get one dash, longer keys two. An empty value
/// drops the `=`.
pub fn to_program_args(program: &str, pairs: &[(String, String)]) -> Vec<String> {
    let mut args = Vec::with_capacity(pairs.len() + 1);
    args.push(program.to_string());
    for (key, value) in pairs {
        let dash = if key.chars().count() == 1 { "-" } else { "--" };
        if value.is_empty() {
            args.push(format!("{dash}{key}"));
        } else {
            args.push(format!("{dash}{key}={value}"));
        }
    }
    args
}

/// Arguments for the current program.
///
/// On `wasm32` these come from the page query, with the page path as the
/// program path. Natively they come from the process-wide context once it has been
/// initialized, and from `std::env::args` otherwise.
pub fn program_parameters() -> Vec<String> {
    #[cfg(target_arch = "wasm32")]
    {
        to_program_args(&path(false), &crate::guest::host_pairs())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let ctx = crate::ffi::global();
        if !ctx.is_initialized() {
            return std::env::args().collect();
        }
        let program = match ctx.location() {
            Some(location) => location.path(false).to_string(),
            None => std::env::args().next().unwrap_or_default(),
        };
        to_program_args(&program, &crate::guest::host_pairs())
    }
}

/// Page URL up to the end of its path, or the whole URL with `full`.
///
/// Empty when the host has no page URL: natively, before the process-wide
/// context is initialized from a full URL.
pub fn path(full: bool) -> String {
    crate::guest::host_path(full)
}

/// Hash of the page URL without the leading "#", empty if there is none.
pub fn hash() -> String {
    crate::guest::host_hash()
}

/// Split an argument produced by [`to_program_args`] into `(name, value)`.
///
/// Returns `None` when the argument does not start with a dash.
pub fn easy_parse(param: &str) -> Option<(&str, Option<&str>)> {
    let rest = param
        .strip_prefix("--")
        .or_else(|| param.strip_prefix('-'))?;

    match rest.split_once('=') {
        Some((name, "")) => Some((name, None)),
        Some((name, value)) => Some((name, Some(value))),
        None => Some((rest, None)),
    }
}
