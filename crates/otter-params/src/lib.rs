//! Otter Params - URL query parameters over an integer-only bridge
//!
//! Takes a snapshot of the page URL's query pairs and exposes it to a
//! module that can only exchange integers. The module asks for a count,
//! then for each key and value asks a length and polls every position.
//!
//! # Usage
//!
//! ```rust
//! use otter_params::{CodeUnit, ParamsContext, read_hash, read_pairs};
//!
//! let ctx = ParamsContext::default();
//! ctx.initialize_url("https://example.com/app/?a=1&b=hello#top");
//!
//! let bridge = ctx.bridge();
//! assert_eq!(bridge.pair_count(), 2);
//! assert_eq!(bridge.value_length(1).unwrap(), 5);
//! assert_eq!(bridge.value_char(1, 0).unwrap(), 'h' as u32);
//!
//! let pairs = read_pairs(&ctx, CodeUnit::Utf16);
//! assert_eq!(pairs[1], ("b".to_string(), "hello".to_string()));
//! assert_eq!(read_hash(&ctx, CodeUnit::Utf16), "top");
//! ```
//!
//! # Fixed names
//!
//! | Name | Arguments | Result |
//! |---|---|---|
//! | `param_count` | - | pairs |
//! | `param_key_length` | `i` | units in key `i` |
//! | `param_key_letter` | `i`, `j` | unit `j` of key `i` |
//! | `param_value_length` | `i` | units in value `i` |
//! | `param_value_letter` | `i`, `j` | unit `j` of value `i` |
//! | `param_path_length` | `full` | units in the page path, or the whole URL |
//! | `param_path_letter` | `full`, `j` | unit `j` of the path |
//! | `param_hash_length` | - | units in the hash |
//! | `param_hash_letter` | `j` | unit `j` of the hash |
//!
//! Natively these are `extern "C"` exports ([`ffi`]). In the browser the
//! JS plugin ([`PARAMS_JS`]) provides them as wasm imports.

mod args;
mod bridge;
mod config;
mod context;
mod error;
mod guest;
mod registry;
mod snapshot;
mod source;

#[cfg(not(target_arch = "wasm32"))]
pub mod ffi;

pub use args::{easy_parse, hash, path, program_parameters, to_program_args};
pub use bridge::CharBridge;
pub use config::{BridgeConfig, CodeUnit};
pub use context::ParamsContext;
pub use error::{ParamsError, ParamsResult};
#[cfg(target_arch = "wasm32")]
pub use guest::HostImports;
pub use guest::{
    LocationSource, NamedSource, ParamSource, host_hash, host_pairs, host_path, read_hash,
    read_pairs, read_path,
};
pub use registry::{
    BoundOp, BridgeExtension, BridgeRegistry, OP_HASH_LENGTH, OP_HASH_LETTER, OP_KEY_LENGTH,
    OP_KEY_LETTER, OP_PARAM_COUNT, OP_PATH_LENGTH, OP_PATH_LETTER, OP_VALUE_LENGTH,
    OP_VALUE_LETTER, OpDecl, OpHandler, PARAMS_JS, op_int, params_extension,
};
pub use snapshot::{PageLocation, ParameterList, Snapshot};
pub use source::{HostUrl, NoQuery, PageUrl, QuerySource, QueryString};

/// Crate version packed as `(major << 24) + (minor << 16) + patch`.
pub fn crate_version() -> u32 {
    let major = env!("CARGO_PKG_VERSION_MAJOR").parse::<u32>().unwrap_or(0);
    let minor = env!("CARGO_PKG_VERSION_MINOR").parse::<u32>().unwrap_or(0);
    let patch = env!("CARGO_PKG_VERSION_PATCH").parse::<u32>().unwrap_or(0);

    (major << 24) + (minor << 16) + patch
}
