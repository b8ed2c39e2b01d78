//! The parsed request record.

/// Timeout applied to keep-alive connections unless the client overrides
/// it with a `Keep-Alive: timeout=N` header.
pub(crate) const DEFAULT_CONNECTION_TIMEOUT: u64 = 15;

/// An HTTP request method.
///
/// Lookup from the wire token is case-sensitive; a token that matches none
/// of the nine standard verbs is accepted as [`Method::Custom`] rather than
/// rejected. The raw token is always kept in [`Request::method_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `TRACE`
    Trace,
    /// `OPTIONS`
    Options,
    /// `CONNECT`
    Connect,
    /// `PATCH`
    Patch,
    /// Any other token.
    Custom,
}

impl Method {
    /// Looks up a raw method token. Case-sensitive: `get` is not `GET`.
    pub fn from_token(token: &str) -> Method {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "TRACE" => Method::Trace,
            "OPTIONS" => Method::Options,
            "CONNECT" => Method::Connect,
            "PATCH" => Method::Patch,
            _ => Method::Custom,
        }
    }
}

/// A fully or partially parsed HTTP request.
///
/// One `Request` is owned by the caller and reused across parses on a
/// keep-alive connection; the parser reinitializes every field each time it
/// starts a new request, so no state leaks from one request into the next.
///
/// All string fields hold the raw wire value: `url` is not
/// percent-decoded, header values are untrimmed past the leading spaces,
/// and `version_string` is the literal 3-byte token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The exact method token received, preserved even for recognized verbs.
    pub method_string: String,
    /// Raw path + query string, undecoded.
    pub url: String,
    /// Major version digit of the `HTTP/X.Y` token.
    pub version_major: u8,
    /// Minor version digit of the `HTTP/X.Y` token.
    pub version_minor: u8,
    /// The raw `X.Y` version token.
    pub version_string: String,
    /// Every header line in wire order, original case, duplicates allowed.
    pub headers: Vec<(String, String)>,
    /// Most recent `Host` header value.
    pub host: String,
    /// Most recent `Content-Type` header value.
    pub content_type: String,
    /// Parsed `Content-Length`; `-1` means not present. Any other value is
    /// a non-negative parsed integer.
    pub content_length: i64,
    /// True iff a `Connection` header value equals `keep-alive`
    /// (case-insensitively).
    pub keep_alive: bool,
    /// Connection timeout in seconds, overridden by `Keep-Alive: timeout=N`.
    pub connection_timeout: u64,
    /// Request body, populated on successful completion.
    pub data: Vec<u8>,
}

impl Request {
    /// Creates a request with all fields at their defaults.
    pub fn new() -> Request {
        Request::default()
    }
}

impl Default for Request {
    fn default() -> Request {
        Request {
            method: Method::Get,
            method_string: String::new(),
            url: String::new(),
            version_major: 0,
            version_minor: 0,
            version_string: String::new(),
            headers: Vec::new(),
            host: String::new(),
            content_type: String::new(),
            content_length: -1,
            keep_alive: false,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            data: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_lookup_is_case_sensitive() {
        assert_eq!(Method::from_token("GET"), Method::Get);
        assert_eq!(Method::from_token("PATCH"), Method::Patch);
        assert_eq!(Method::from_token("get"), Method::Custom);
        assert_eq!(Method::from_token("FROB"), Method::Custom);
        assert_eq!(Method::from_token(""), Method::Custom);
    }

    #[test]
    fn defaults() {
        let req = Request::new();
        assert_eq!(req.content_length, -1);
        assert_eq!(req.connection_timeout, 15);
        assert!(!req.keep_alive);
        assert!(req.headers.is_empty());
    }
}
