//! The request surface the rewrite engine reads and mutates.

use std::borrow::Cow;

use axum::http::{HeaderMap, Request, Uri};

/// Read/write access to the parts of a request a rule touches.
///
/// Only `uri`, `set_uri` and `headers_mut` need implementing; the path
/// accessors are derived from the URI.
pub trait RewriteRequest {
    fn uri(&self) -> &Uri;

    fn set_uri(&mut self, uri: Uri);

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Escaped path exactly as received.
    fn raw_path(&self) -> &str {
        self.uri().path()
    }

    /// Percent-decoded path. Falls back to the raw path when the decoded
    /// bytes are not UTF-8.
    fn path(&self) -> Cow<'_, str> {
        let raw = self.raw_path();
        urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
    }

    /// Raw query string, without the leading `?`.
    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    /// Escaped path plus query, as it appeared on the request line.
    fn request_uri(&self) -> &str {
        self.uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/")
    }
}

impl<B> RewriteRequest for Request<B> {
    fn uri(&self) -> &Uri {
        Request::uri(self)
    }

    fn set_uri(&mut self, uri: Uri) {
        *self.uri_mut() = uri;
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        Request::headers_mut(self)
    }
}
