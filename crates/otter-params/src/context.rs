//! Owned parameter context.
//!
//! Holds the current snapshot for one host. Initialization replaces the
//! snapshot wholesale; readers hold an `Arc` to whichever snapshot was
//! current when they asked, so a re-initialization never changes data
//! under a reader.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::bridge::CharBridge;
use crate::config::BridgeConfig;
use crate::error::{ParamsError, ParamsResult};
use crate::snapshot::{PageLocation, ParameterList, Snapshot};
use crate::source::{HostUrl, QuerySource};

pub struct ParamsContext {
    config: BridgeConfig,
    current: RwLock<Option<Arc<Snapshot>>>,
    empty: Arc<Snapshot>,
    generation: AtomicU64,
}

impl Default for ParamsContext {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl ParamsContext {
    pub fn new(config: BridgeConfig) -> Self {
        let empty = Arc::new(Snapshot::empty(config.code_unit));
        Self {
            config,
            current: RwLock::new(None),
            empty,
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Take a fresh snapshot from the host's current URL, replacing the
    /// previous one.
    ///
    /// Never fails. An absent or empty query yields an empty snapshot. A full
    /// URL that does not parse is logged and its raw text after "?" (up to
    /// "#") is parsed as the query instead, without a location.
    pub fn initialize(&self, source: &dyn QuerySource) {
        match source.current() {
            HostUrl::Full(url) => self.initialize_url(&url),
            HostUrl::Query(query) => self.initialize_query(&query),
            HostUrl::Absent => self.install(ParameterList::default(), None),
        }
    }

    /// Initialize from a raw query string.
    pub fn initialize_query(&self, query: &str) {
        let params = ParameterList::parse_with(query, self.config.semicolon_separator);
        self.install(params, None);
    }

    /// Initialize from a full URL, same fallback as [`initialize`](Self::initialize).
    pub fn initialize_url(&self, url: &str) {
        let semicolon = self.config.semicolon_separator;
        match PageLocation::parse(url) {
            Ok(location) => {
                let params = ParameterList::parse_with(location.query(), semicolon);
                self.install(params, Some(location));
            }
            Err(err) => {
                warn!(error = %err, "Unparsable page URL, reading its raw query");
                self.install(ParameterList::parse_with(raw_query(url), semicolon), None);
            }
        }
    }

    fn install(&self, params: ParameterList, location: Option<PageLocation>) {
        let pairs = params.len();
        let snapshot = Arc::new(Snapshot::new(params, location, self.config.code_unit));
        *self.current.write() = Some(snapshot);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(pairs, generation, "Parameter snapshot initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// Number of initializations so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Current snapshot, or an empty one before initialization.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.try_snapshot() {
            Ok(snapshot) => snapshot,
            Err(_) => {
                trace!("Parameter snapshot read before initialization");
                self.empty.clone()
            }
        }
    }

    /// Current snapshot, failing before initialization.
    pub fn try_snapshot(&self) -> ParamsResult<Arc<Snapshot>> {
        self.current.read().clone().ok_or(ParamsError::NotInitialized)
    }

    /// Location of the current snapshot, when it was taken from a full URL.
    pub fn location(&self) -> Option<PageLocation> {
        self.snapshot().location().cloned()
    }

    /// Character bridge over the current snapshot.
    pub fn bridge(&self) -> CharBridge {
        CharBridge::new(self.snapshot())
    }
}

/// Text between the first "?" and the "#", empty without a "?".
fn raw_query(url: &str) -> &str {
    let url = url.split_once('#').map_or(url, |(before, _)| before);
    url.split_once('?').map_or("", |(_, query)| query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NoQuery, PageUrl, QueryString};

    #[test]
    fn test_uninitialized_reads_empty() {
        let ctx = ParamsContext::default();
        assert!(!ctx.is_initialized());
        assert!(ctx.snapshot().params().is_empty());
        assert!(matches!(ctx.try_snapshot(), Err(ParamsError::NotInitialized)));
        assert_eq!(ctx.generation(), 0);
    }

    #[test]
    fn test_initialize_from_page_url() {
        let ctx = ParamsContext::default();
        ctx.initialize(&PageUrl("https://example.com/app?a=1&b=hello#h".into()));
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.params().len(), 2);
        assert_eq!(snapshot.params().get(1), Some(("b", "hello")));
        assert_eq!(ctx.location().unwrap().hash(), "h");
    }

    #[test]
    fn test_reinitialize_replaces() {
        let ctx = ParamsContext::default();
        ctx.initialize(&QueryString("a=1&b=2&c=3".into()));
        ctx.initialize(&QueryString("z=9".into()));
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.params().len(), 1);
        assert_eq!(snapshot.params().get(0), Some(("z", "9")));
        assert_eq!(ctx.generation(), 2);
    }

    #[test]
    fn test_reader_keeps_old_snapshot() {
        let ctx = ParamsContext::default();
        ctx.initialize_query("a=1");
        let held = ctx.snapshot();
        ctx.initialize_query("b=2&c=3");
        assert_eq!(held.params().len(), 1);
        assert_eq!(ctx.snapshot().params().len(), 2);
    }

    #[test]
    fn test_absent_query() {
        let ctx = ParamsContext::default();
        ctx.initialize(&NoQuery);
        assert!(ctx.is_initialized());
        assert!(ctx.snapshot().params().is_empty());
        assert!(ctx.location().is_none());
    }

    #[test]
    fn test_closure_source() {
        let ctx = ParamsContext::default();
        let source = || Some("https://example.com/?k=1&k=2".to_string());
        ctx.initialize(&source);
        assert_eq!(ctx.snapshot().params().all("k"), vec!["1", "2"]);
    }

    #[test]
    fn test_invalid_url_replaces_previous() {
        let ctx = ParamsContext::default();
        ctx.initialize_query("stale=1");
        ctx.initialize(&PageUrl("http://[::1".into()));
        assert!(ctx.snapshot().params().is_empty());
        assert!(ctx.location().is_none());
        assert_eq!(ctx.generation(), 2);
    }

    #[test]
    fn test_invalid_url_keeps_raw_query() {
        let ctx = ParamsContext::default();
        ctx.initialize_query("stale=1");
        ctx.initialize_url("http://[::1/app?k=1&k=2#frag");
        assert_eq!(ctx.snapshot().params().all("k"), vec!["1", "2"]);
        assert!(ctx.snapshot().params().first("stale").is_none());
    }

    #[test]
    fn test_raw_query() {
        assert_eq!(raw_query("bad?a=1#x"), "a=1");
        assert_eq!(raw_query("bad?a=1"), "a=1");
        assert_eq!(raw_query("bad#x?y"), "");
        assert_eq!(raw_query("bad"), "");
    }

    #[test]
    fn test_semicolon_config() {
        let ctx = ParamsContext::new(BridgeConfig::new().semicolon_separator(true));
        ctx.initialize_query("a=1;b=2");
        assert_eq!(ctx.snapshot().params().len(), 2);
    }
}
