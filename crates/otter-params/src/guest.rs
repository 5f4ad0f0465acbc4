//! Consumer side of the bridge.
//!
//! A consumer only sees integer calls. [`read_pairs`] runs the
//! length-then-poll protocol against any [`ParamSource`] and rebuilds the
//! pairs as native strings; [`read_path`] and [`read_hash`] do the same for
//! a [`LocationSource`].

use crate::config::CodeUnit;
use crate::context::ParamsContext;
use crate::error::ParamsResult;
use crate::registry::{
    self, BoundOp, BridgeRegistry, OP_HASH_LENGTH, OP_HASH_LETTER, OP_KEY_LENGTH, OP_KEY_LETTER,
    OP_PARAM_COUNT, OP_PATH_LENGTH, OP_PATH_LETTER, OP_VALUE_LENGTH, OP_VALUE_LETTER,
};

/// The five integer calls. Negative results mean "out of range".
pub trait ParamSource {
    fn param_count(&self) -> i32;
    fn key_length(&self, i: i32) -> i32;
    fn key_letter(&self, i: i32, j: i32) -> i32;
    fn value_length(&self, i: i32) -> i32;
    fn value_letter(&self, i: i32, j: i32) -> i32;
}

/// Rebuild every pair from `source`.
///
/// `unit` must match what the host exposes. Negative lengths read as empty
/// text; negative units decode to U+FFFD.
pub fn read_pairs(source: &impl ParamSource, unit: CodeUnit) -> Vec<(String, String)> {
    let count = source.param_count().max(0);
    (0..count)
        .map(|i| {
            let key = read_text(unit, source.key_length(i), |j| source.key_letter(i, j));
            let value = read_text(unit, source.value_length(i), |j| source.value_letter(i, j));
            (key, value)
        })
        .collect()
}

/// Page URL and hash calls. `full` selects the whole URL over the part
/// before the query.
pub trait LocationSource {
    fn path_length(&self, full: bool) -> i32;
    fn path_letter(&self, full: bool, j: i32) -> i32;
    fn hash_length(&self) -> i32;
    fn hash_letter(&self, j: i32) -> i32;
}

/// Rebuild the page path, or the whole URL with `full`.
pub fn read_path(source: &impl LocationSource, full: bool, unit: CodeUnit) -> String {
    read_text(unit, source.path_length(full), |j| source.path_letter(full, j))
}

/// Rebuild the hash, without the leading "#".
pub fn read_hash(source: &impl LocationSource, unit: CodeUnit) -> String {
    read_text(unit, source.hash_length(), |j| source.hash_letter(j))
}

fn read_text(unit: CodeUnit, len: i32, letter: impl Fn(i32) -> i32) -> String {
    let units: Vec<u32> = (0..len.max(0))
        .map(|j| u32::try_from(letter(j)).unwrap_or(0xFFFD))
        .collect();
    unit.decode(&units)
}

/// Reads a context in the same process, through the same integer ops the
/// boundary exports.
impl ParamSource for ParamsContext {
    fn param_count(&self) -> i32 {
        registry::param_count(self, &[])
    }

    fn key_length(&self, i: i32) -> i32 {
        registry::param_key_length(self, &[i])
    }

    fn key_letter(&self, i: i32, j: i32) -> i32 {
        registry::param_key_letter(self, &[i, j])
    }

    fn value_length(&self, i: i32) -> i32 {
        registry::param_value_length(self, &[i])
    }

    fn value_letter(&self, i: i32, j: i32) -> i32 {
        registry::param_value_letter(self, &[i, j])
    }
}

impl LocationSource for ParamsContext {
    fn path_length(&self, full: bool) -> i32 {
        registry::param_path_length(self, &[i32::from(full)])
    }

    fn path_letter(&self, full: bool, j: i32) -> i32 {
        registry::param_path_letter(self, &[i32::from(full), j])
    }

    fn hash_length(&self) -> i32 {
        registry::param_hash_length(self, &[])
    }

    fn hash_letter(&self, j: i32) -> i32 {
        registry::param_hash_letter(self, &[j])
    }
}

/// The bridge ops resolved by name from a registry, the way a module binds
/// its imports at load time.
pub struct NamedSource {
    count: BoundOp,
    key_length: BoundOp,
    key_letter: BoundOp,
    value_length: BoundOp,
    value_letter: BoundOp,
    path_length: BoundOp,
    path_letter: BoundOp,
    hash_length: BoundOp,
    hash_letter: BoundOp,
}

impl NamedSource {
    pub fn bind(registry: &BridgeRegistry) -> ParamsResult<Self> {
        Ok(Self {
            count: registry.bind(OP_PARAM_COUNT)?,
            key_length: registry.bind(OP_KEY_LENGTH)?,
            key_letter: registry.bind(OP_KEY_LETTER)?,
            value_length: registry.bind(OP_VALUE_LENGTH)?,
            value_letter: registry.bind(OP_VALUE_LETTER)?,
            path_length: registry.bind(OP_PATH_LENGTH)?,
            path_letter: registry.bind(OP_PATH_LETTER)?,
            hash_length: registry.bind(OP_HASH_LENGTH)?,
            hash_letter: registry.bind(OP_HASH_LETTER)?,
        })
    }
}

// Arity is fixed by `bind`, so a failed call only happens on a mismatched
// registry; it reads as out of range.
impl ParamSource for NamedSource {
    fn param_count(&self) -> i32 {
        self.count.call_or_sentinel(&[])
    }

    fn key_length(&self, i: i32) -> i32 {
        self.key_length.call_or_sentinel(&[i])
    }

    fn key_letter(&self, i: i32, j: i32) -> i32 {
        self.key_letter.call_or_sentinel(&[i, j])
    }

    fn value_length(&self, i: i32) -> i32 {
        self.value_length.call_or_sentinel(&[i])
    }

    fn value_letter(&self, i: i32, j: i32) -> i32 {
        self.value_letter.call_or_sentinel(&[i, j])
    }
}

impl LocationSource for NamedSource {
    fn path_length(&self, full: bool) -> i32 {
        self.path_length.call_or_sentinel(&[i32::from(full)])
    }

    fn path_letter(&self, full: bool, j: i32) -> i32 {
        self.path_letter.call_or_sentinel(&[i32::from(full), j])
    }

    fn hash_length(&self) -> i32 {
        self.hash_length.call_or_sentinel(&[])
    }

    fn hash_letter(&self, j: i32) -> i32 {
        self.hash_letter.call_or_sentinel(&[j])
    }
}

#[cfg(target_arch = "wasm32")]
unsafe extern "C" {
    fn param_count() -> i32;
    fn param_key_length(i: i32) -> i32;
    fn param_key_letter(i: i32, j: i32) -> i32;
    fn param_value_length(i: i32) -> i32;
    fn param_value_letter(i: i32, j: i32) -> i32;
    fn param_path_length(full: i32) -> i32;
    fn param_path_letter(full: i32, j: i32) -> i32;
    fn param_hash_length() -> i32;
    fn param_hash_letter(j: i32) -> i32;
}

/// Imports provided by the browser plugin (`js/params_plugin.js`).
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HostImports;

#[cfg(target_arch = "wasm32")]
impl ParamSource for HostImports {
    fn param_count(&self) -> i32 {
        // SAFETY: plain integer import, no memory is shared
        unsafe { param_count() }
    }

    fn key_length(&self, i: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_key_length(i) }
    }

    fn key_letter(&self, i: i32, j: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_key_letter(i, j) }
    }

    fn value_length(&self, i: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_value_length(i) }
    }

    fn value_letter(&self, i: i32, j: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_value_letter(i, j) }
    }
}

#[cfg(target_arch = "wasm32")]
impl LocationSource for HostImports {
    fn path_length(&self, full: bool) -> i32 {
        // SAFETY: plain integer import, no memory is shared
        unsafe { param_path_length(i32::from(full)) }
    }

    fn path_letter(&self, full: bool, j: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_path_letter(i32::from(full), j) }
    }

    fn hash_length(&self) -> i32 {
        // SAFETY: see above
        unsafe { param_hash_length() }
    }

    fn hash_letter(&self, j: i32) -> i32 {
        // SAFETY: see above
        unsafe { param_hash_letter(j) }
    }
}

/// Pairs of the host this code runs in: the browser plugin on `wasm32`,
/// the process-wide context elsewhere.
pub fn host_pairs() -> Vec<(String, String)> {
    #[cfg(target_arch = "wasm32")]
    {
        read_pairs(&HostImports, CodeUnit::Utf16)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let ctx = crate::ffi::global();
        read_pairs(ctx, ctx.config().code_unit)
    }
}

/// Page path of the host, or its whole URL with `full`. Empty when the host
/// has no page URL.
pub fn host_path(full: bool) -> String {
    #[cfg(target_arch = "wasm32")]
    {
        read_path(&HostImports, full, CodeUnit::Utf16)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let ctx = crate::ffi::global();
        read_path(ctx, full, ctx.config().code_unit)
    }
}

/// Hash of the host's page URL, without the "#".
pub fn host_hash() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        read_hash(&HostImports, CodeUnit::Utf16)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let ctx = crate::ffi::global();
        read_hash(ctx, ctx.config().code_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use std::sync::Arc;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_read_pairs_from_context() {
        let ctx = ParamsContext::default();
        ctx.initialize_query("?a=1&b=hello&k=1&k=2");
        assert_eq!(
            read_pairs(&ctx, CodeUnit::Utf16),
            pairs(&[("a", "1"), ("b", "hello"), ("k", "1"), ("k", "2")])
        );
    }

    #[test]
    fn test_read_pairs_uninitialized() {
        let ctx = ParamsContext::default();
        assert!(read_pairs(&ctx, CodeUnit::Utf16).is_empty());
    }

    #[test]
    fn test_read_pairs_non_bmp() {
        let ctx = ParamsContext::default();
        ctx.initialize_query("emoji=%F0%9F%98%80&name=%D0%BF%D1%80");
        assert_eq!(
            read_pairs(&ctx, CodeUnit::Utf16),
            pairs(&[("emoji", "😀"), ("name", "пр")])
        );

        let scalar = ParamsContext::new(BridgeConfig::new().code_unit(CodeUnit::Scalar));
        scalar.initialize_query("emoji=%F0%9F%98%80");
        assert_eq!(
            read_pairs(&scalar, CodeUnit::Scalar),
            pairs(&[("emoji", "😀")])
        );
    }

    #[test]
    fn test_named_source() {
        let ctx = Arc::new(ParamsContext::default());
        ctx.initialize_query("x=&cd=e+f");
        let registry = BridgeRegistry::with_params(ctx).unwrap();
        let source = NamedSource::bind(&registry).unwrap();
        assert_eq!(source.param_count(), 2);
        assert_eq!(source.value_length(0), 0);
        assert_eq!(
            read_pairs(&source, CodeUnit::Utf16),
            pairs(&[("x", ""), ("cd", "e f")])
        );
    }

    #[test]
    fn test_named_source_location() {
        let ctx = Arc::new(ParamsContext::default());
        ctx.initialize_url("https://example.com/app/index.html?k=1#top");
        let registry = BridgeRegistry::with_params(ctx.clone()).unwrap();
        let source = NamedSource::bind(&registry).unwrap();
        assert_eq!(
            read_path(&source, false, CodeUnit::Utf16),
            "https://example.com/app/index.html"
        );
        assert_eq!(
            read_path(&source, true, CodeUnit::Utf16),
            "https://example.com/app/index.html?k=1#top"
        );
        assert_eq!(read_hash(&source, CodeUnit::Utf16), "top");
        assert_eq!(source.hash_letter(3), -1);

        ctx.initialize_query("k=1");
        assert_eq!(source.path_length(true), 0);
        assert_eq!(read_hash(&source, CodeUnit::Utf16), "");
    }

    #[test]
    fn test_location_from_context() {
        let ctx = ParamsContext::default();
        ctx.initialize_url("https://example.com/%D0%BF?x=1#%D1%84");
        assert_eq!(read_path(&ctx, false, CodeUnit::Utf16), "https://example.com/%D0%BF");
        assert_eq!(read_hash(&ctx, CodeUnit::Utf16), "%D1%84");
    }

    #[test]
    fn test_named_source_custom_sentinel() {
        let ctx = Arc::new(ParamsContext::new(
            BridgeConfig::new().out_of_range_sentinel(-7),
        ));
        ctx.initialize_query("a=1");
        let source = NamedSource::bind(&BridgeRegistry::with_params(ctx).unwrap()).unwrap();
        assert_eq!(source.key_length(4), -7);
        assert_eq!(source.hash_letter(0), -7);
    }

    #[test]
    fn test_named_source_needs_all_ops() {
        let registry = BridgeRegistry::new(Arc::new(ParamsContext::default()));
        assert!(NamedSource::bind(&registry).is_err());
    }

    struct Broken;

    impl ParamSource for Broken {
        fn param_count(&self) -> i32 {
            1
        }
        fn key_length(&self, _i: i32) -> i32 {
            -1
        }
        fn key_letter(&self, _i: i32, _j: i32) -> i32 {
            -1
        }
        fn value_length(&self, _i: i32) -> i32 {
            1
        }
        fn value_letter(&self, _i: i32, _j: i32) -> i32 {
            -1
        }
    }

    #[test]
    fn test_sentinels_degrade() {
        assert_eq!(
            read_pairs(&Broken, CodeUnit::Utf16),
            pairs(&[("", "\u{FFFD}")])
        );
    }
}
