//! Host-side view of "the current page URL".

/// What the host environment knows about the current URL.
pub enum HostUrl {
    /// A full URL; path and hash are captured along with the query.
    Full(String),
    /// Only the query string, with or without the leading "?".
    Query(String),
    /// No URL or no query at all.
    Absent,
}

/// Supplies the current URL when a context is initialized.
pub trait QuerySource {
    fn current(&self) -> HostUrl;
}

/// A fixed full URL.
#[derive(Debug, Clone)]
pub struct PageUrl(pub String);

impl QuerySource for PageUrl {
    fn current(&self) -> HostUrl {
        HostUrl::Full(self.0.clone())
    }
}

/// A fixed raw query string.
#[derive(Debug, Clone)]
pub struct QueryString(pub String);

impl QuerySource for QueryString {
    fn current(&self) -> HostUrl {
        HostUrl::Query(self.0.clone())
    }
}

/// A host with no URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuery;

impl QuerySource for NoQuery {
    fn current(&self) -> HostUrl {
        HostUrl::Absent
    }
}

/// Any closure returning the current full URL, if there is one.
impl<F> QuerySource for F
where
    F: Fn() -> Option<String>,
{
    fn current(&self) -> HostUrl {
        match self() {
            Some(url) => HostUrl::Full(url),
            None => HostUrl::Absent,
        }
    }
}
