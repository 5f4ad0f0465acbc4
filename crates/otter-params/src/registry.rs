//! Name-bound registration of the bridge ops.
//!
//! A consumer binds the pair queries, and the path and hash queries next to
//! them, by their fixed names at load time.
//! Every op takes and returns plain `i32`s; an out-of-range index answers
//! with the configured sentinel instead of failing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::ParamsContext;
use crate::error::{ParamsError, ParamsResult};

pub const OP_PARAM_COUNT: &str = "param_count";
pub const OP_KEY_LENGTH: &str = "param_key_length";
pub const OP_KEY_LETTER: &str = "param_key_letter";
pub const OP_VALUE_LENGTH: &str = "param_value_length";
pub const OP_VALUE_LETTER: &str = "param_value_letter";
pub const OP_PATH_LENGTH: &str = "param_path_length";
pub const OP_PATH_LETTER: &str = "param_path_letter";
pub const OP_HASH_LENGTH: &str = "param_hash_length";
pub const OP_HASH_LETTER: &str = "param_hash_letter";

/// Browser-side plugin that installs the same imports for a wasm module.
pub const PARAMS_JS: &str = include_str!("../js/params_plugin.js");

pub type OpHandler = fn(&ParamsContext, &[i32]) -> i32;

#[derive(Clone)]
pub struct OpDecl {
    name: String,
    arity: usize,
    handler: OpHandler,
}

impl OpDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

pub fn op_int(name: &str, arity: usize, handler: OpHandler) -> OpDecl {
    OpDecl {
        name: name.to_string(),
        arity,
        handler,
    }
}

#[derive(Clone)]
pub struct BridgeExtension {
    name: String,
    ops: Vec<OpDecl>,
    js_code: Option<String>,
}

impl BridgeExtension {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ops: Vec::new(),
            js_code: None,
        }
    }

    /// Get the name of this extension
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_ops(mut self, ops: Vec<OpDecl>) -> Self {
        self.ops = ops;
        self
    }

    /// Attach the JS plugin a browser host loads next to the wasm module.
    pub fn with_js(mut self, js_code: &str) -> Self {
        self.js_code = Some(js_code.to_string());
        self
    }

    pub fn js_code(&self) -> Option<&str> {
        self.js_code.as_deref()
    }

    pub fn ops(&self) -> &[OpDecl] {
        &self.ops
    }
}

/// Create the params extension: five pair ops, then the location ops.
///
/// `param_path_*` take a `full` flag first (non-zero for the whole URL).
pub fn params_extension() -> BridgeExtension {
    BridgeExtension::new("params")
        .with_ops(vec![
            op_int(OP_PARAM_COUNT, 0, param_count),
            op_int(OP_KEY_LENGTH, 1, param_key_length),
            op_int(OP_KEY_LETTER, 2, param_key_letter),
            op_int(OP_VALUE_LENGTH, 1, param_value_length),
            op_int(OP_VALUE_LETTER, 2, param_value_letter),
            op_int(OP_PATH_LENGTH, 1, param_path_length),
            op_int(OP_PATH_LETTER, 2, param_path_letter),
            op_int(OP_HASH_LENGTH, 0, param_hash_length),
            op_int(OP_HASH_LETTER, 1, param_hash_letter),
        ])
        .with_js(PARAMS_JS)
}

/// Ops bound to one context, looked up by name.
pub struct BridgeRegistry {
    ctx: Arc<ParamsContext>,
    ops: HashMap<String, OpDecl>,
}

impl BridgeRegistry {
    pub fn new(ctx: Arc<ParamsContext>) -> Self {
        Self {
            ctx,
            ops: HashMap::new(),
        }
    }

    /// Registry with the params extension already registered.
    pub fn with_params(ctx: Arc<ParamsContext>) -> ParamsResult<Self> {
        let mut registry = Self::new(ctx);
        registry.register_extension(params_extension())?;
        Ok(registry)
    }

    pub fn context(&self) -> &Arc<ParamsContext> {
        &self.ctx
    }

    pub fn register_extension(&mut self, extension: BridgeExtension) -> ParamsResult<()> {
        debug!(
            extension = extension.name(),
            ops_count = extension.ops.len(),
            "Registering extension"
        );

        // Reject the whole extension before inserting anything
        let mut seen = HashSet::new();
        for op in &extension.ops {
            if self.ops.contains_key(op.name()) || !seen.insert(op.name()) {
                return Err(ParamsError::DuplicateOp(op.name().to_string()));
            }
        }

        for op in extension.ops {
            self.ops.insert(op.name().to_string(), op);
        }
        Ok(())
    }

    pub fn has_op(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn op_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve an op once; the returned handle calls it without further lookup.
    pub fn bind(&self, name: &str) -> ParamsResult<BoundOp> {
        let op = self
            .ops
            .get(name)
            .ok_or_else(|| ParamsError::UnknownOp(name.to_string()))?;
        Ok(BoundOp {
            ctx: self.ctx.clone(),
            op: op.clone(),
        })
    }

    pub fn call(&self, name: &str, args: &[i32]) -> ParamsResult<i32> {
        self.bind(name)?.call(args)
    }
}

/// An op resolved by name against a context.
#[derive(Clone)]
pub struct BoundOp {
    ctx: Arc<ParamsContext>,
    op: OpDecl,
}

impl BoundOp {
    pub fn name(&self) -> &str {
        self.op.name()
    }

    pub fn call(&self, args: &[i32]) -> ParamsResult<i32> {
        if args.len() != self.op.arity {
            return Err(ParamsError::ArityMismatch {
                name: self.op.name.clone(),
                expected: self.op.arity,
                got: args.len(),
            });
        }
        Ok((self.op.handler)(&self.ctx, args))
    }

    /// Call, answering a failed call with the context's sentinel.
    pub fn call_or_sentinel(&self, args: &[i32]) -> i32 {
        self.call(args)
            .unwrap_or(self.ctx.config().out_of_range_sentinel)
    }
}

pub(crate) fn param_count(ctx: &ParamsContext, _args: &[i32]) -> i32 {
    i32::try_from(ctx.bridge().pair_count()).unwrap_or(i32::MAX)
}

pub(crate) fn param_key_length(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[i] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    answer(ctx, OP_KEY_LENGTH, index(i).and_then(|i| bridge.key_length(i)))
}

pub(crate) fn param_key_letter(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[i, j] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    let unit = index(i).and_then(|i| bridge.key_char(i, index(j)?));
    answer(ctx, OP_KEY_LETTER, unit)
}

pub(crate) fn param_value_length(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[i] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    answer(ctx, OP_VALUE_LENGTH, index(i).and_then(|i| bridge.value_length(i)))
}

pub(crate) fn param_value_letter(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[i, j] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    let unit = index(i).and_then(|i| bridge.value_char(i, index(j)?));
    answer(ctx, OP_VALUE_LETTER, unit)
}

pub(crate) fn param_path_length(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[full] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    answer(ctx, OP_PATH_LENGTH, Ok(ctx.bridge().path_length(full != 0)))
}

pub(crate) fn param_path_letter(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[full, j] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    let unit = index(j).and_then(|j| bridge.path_char(full != 0, j));
    answer(ctx, OP_PATH_LETTER, unit)
}

pub(crate) fn param_hash_length(ctx: &ParamsContext, _args: &[i32]) -> i32 {
    answer(ctx, OP_HASH_LENGTH, Ok(ctx.bridge().hash_length()))
}

pub(crate) fn param_hash_letter(ctx: &ParamsContext, args: &[i32]) -> i32 {
    let &[j] = args else {
        return ctx.config().out_of_range_sentinel;
    };
    let bridge = ctx.bridge();
    answer(ctx, OP_HASH_LETTER, index(j).and_then(|j| bridge.hash_char(j)))
}

fn index(raw: i32) -> ParamsResult<usize> {
    usize::try_from(raw).map_err(|_| ParamsError::IndexOutOfRange {
        what: "negative",
        index: i64::from(raw),
        len: 0,
    })
}

fn answer(ctx: &ParamsContext, op: &str, result: ParamsResult<u32>) -> i32 {
    let sentinel = ctx.config().out_of_range_sentinel;
    match result {
        Ok(value) => i32::try_from(value).unwrap_or(sentinel),
        Err(err) => {
            warn!(op, error = %err, sentinel, "Bridge query out of range");
            sentinel
        }
    }
}
