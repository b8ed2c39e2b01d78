//! Incremental request parsing.
//!
//! [`RequestParser`] is a finite-state machine fed one byte per call. It
//! mutates a caller-owned [`Request`] in place and reports per-byte
//! progress, so the I/O driver can hand it input in whatever fragments the
//! network produces. On completion the parser returns itself to its
//! initial state, ready for the next pipelined request on the same
//! connection without external bookkeeping.

use std::error::Error;
use std::fmt;
use std::mem;

use log::debug;

use crate::request::{Method, Request};

mod headers;

use headers::HeaderState;

/// Reserved capacity for the request-line/header token buffer.
const TOKEN_BUFFER_RESERVE: usize = 8192;

/// Upper bound on the up-front body reservation. Reservation only, not a
/// size limit; bodies grow past this normally.
const BODY_RESERVE_LIMIT: usize = 64 * 1024;

/// Per-byte progress report from [`RequestParser::consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// More bytes are needed.
    Processing,
    /// The request is complete; the parser has reset itself and the next
    /// byte fed begins a fresh request.
    Complete,
}

/// Terminal parse failure.
///
/// Any of these means the input stream is malformed. The connection must
/// be dropped (or answered with a 400) and the parser must not be fed
/// again until [`RequestParser::reset`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A byte other than an uppercase ASCII letter inside the method token.
    InvalidMethod,
    /// The request line did not carry the literal `HTTP/`.
    InvalidHttpLiteral,
    /// The version token was not exactly `<digit>.<digit>`.
    InvalidVersion,
    /// A CR without its LF, or a bare LF where CRLF is required.
    InvalidLineEnding,
    /// A space inside a header name.
    InvalidHeaderKey,
    /// A `Content-Length` value that is not a non-negative integer.
    InvalidContentLength,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidMethod => "invalid byte in request method",
            ParseError::InvalidHttpLiteral => "malformed HTTP literal in request line",
            ParseError::InvalidVersion => "HTTP version is not <digit>.<digit>",
            ParseError::InvalidLineEnding => "expected CRLF line ending",
            ParseError::InvalidHeaderKey => "malformed header name",
            ParseError::InvalidContentLength => "Content-Length is not a non-negative integer",
        };
        write!(f, "{}", msg)
    }
}

impl Error for ParseError {}

/// Primary parser states. `Headers` delegates to the sub-machine in
/// [`headers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Method,
    SpaceBeforeUrl,
    Url,
    SpaceBeforeVersion,
    Http,
    Version,
    RequestLineLf,
    Headers,
    BlankLineLf,
    Data,
}

/// Incremental HTTP/1.1 request parser.
///
/// One instance maps to one logical connection. Calls must be serialized
/// by the driver; the parser itself is synchronous and does no I/O.
#[derive(Debug)]
pub struct RequestParser {
    state: State,
    header_state: HeaderState,
    header_field: Option<headers::HeaderField>,
    header_key: String,
    buf: Vec<u8>,
    consumed_body: i64,
}

impl RequestParser {
    /// Creates a parser in its initial state.
    pub fn new() -> RequestParser {
        RequestParser {
            state: State::Start,
            header_state: HeaderState::Start,
            header_field: None,
            header_key: String::new(),
            buf: Vec::with_capacity(TOKEN_BUFFER_RESERVE),
            consumed_body: 0,
        }
    }

    /// Returns the parser to its initial state and reinitializes `request`
    /// to its default field values.
    ///
    /// The parser calls this itself on the first byte of every request;
    /// callers only need it to recover an instance after a [`ParseError`].
    pub fn reset(&mut self, request: &mut Request) {
        *request = Request::default();
        self.state = State::Start;
        self.header_state = HeaderState::Start;
        self.header_field = None;
        self.header_key.clear();
        self.consumed_body = 0;
        self.buf.clear();
        self.buf.reserve(TOKEN_BUFFER_RESERVE);
    }

    /// Feeds exactly one byte.
    ///
    /// Returns [`ParseStatus::Processing`] while the request is still
    /// incomplete and [`ParseStatus::Complete`] exactly once, on the byte
    /// that finishes it (the final body byte, or the LF closing the header
    /// block when `Content-Length` is `0`). Completion resets the parser,
    /// so the next byte fed starts a fresh request; the finished `Request`
    /// stays untouched until that next byte arrives.
    ///
    /// A request without a `Content-Length` header never completes on its
    /// own: every body byte accumulates until the driver observes
    /// connection close and calls [`finalize`](RequestParser::finalize).
    /// The parser enforces no size cap in that mode; bounding it is the
    /// driver's responsibility.
    pub fn consume(&mut self, request: &mut Request, byte: u8) -> Result<ParseStatus, ParseError> {
        // Transitions marked "reprocess" fall through to the next state by
        // looping with the same byte: the byte that triggers the
        // transition is also the first byte of the new token and must not
        // be dropped.
        loop {
            match self.state {
                State::Start => {
                    self.reset(request);
                    self.state = State::Method;
                    // reprocess: this byte is the first of the method
                }
                State::Method => {
                    if byte.is_ascii_uppercase() {
                        self.buf.push(byte);
                    } else if byte == b' ' {
                        let token = String::from_utf8_lossy(&self.buf).into_owned();
                        request.method = Method::from_token(&token);
                        request.method_string = token;
                        self.buf.clear();
                        self.state = State::SpaceBeforeUrl;
                    } else {
                        debug!("invalid method byte 0x{:02x}", byte);
                        return Err(ParseError::InvalidMethod);
                    }
                    return Ok(ParseStatus::Processing);
                }
                State::SpaceBeforeUrl => {
                    if byte == b' ' {
                        return Ok(ParseStatus::Processing);
                    }
                    self.state = State::Url;
                    // reprocess: first byte of the url
                }
                State::Url => {
                    if byte == b' ' {
                        request.url = String::from_utf8_lossy(&self.buf).into_owned();
                        self.buf.clear();
                        self.state = State::SpaceBeforeVersion;
                    } else {
                        self.buf.push(byte);
                    }
                    return Ok(ParseStatus::Processing);
                }
                State::SpaceBeforeVersion => {
                    if byte == b' ' {
                        return Ok(ParseStatus::Processing);
                    }
                    self.state = State::Http;
                    // reprocess: first byte of the HTTP literal
                }
                State::Http => {
                    if byte.is_ascii_uppercase() {
                        self.buf.push(byte);
                    } else if byte == b'/' {
                        if self.buf != b"HTTP" {
                            debug!(
                                "expected the literal HTTP, got {:?}",
                                String::from_utf8_lossy(&self.buf)
                            );
                            return Err(ParseError::InvalidHttpLiteral);
                        }
                        self.buf.clear();
                        self.state = State::Version;
                    } else {
                        debug!("expected '/' after HTTP, got 0x{:02x}", byte);
                        return Err(ParseError::InvalidHttpLiteral);
                    }
                    return Ok(ParseStatus::Processing);
                }
                State::Version => {
                    return match byte {
                        b'0'..=b'9' | b'.' => {
                            self.buf.push(byte);
                            Ok(ParseStatus::Processing)
                        }
                        b'\r' => {
                            if self.buf.len() != 3
                                || self.buf[1] != b'.'
                                || !self.buf[0].is_ascii_digit()
                                || !self.buf[2].is_ascii_digit()
                            {
                                debug!(
                                    "expected \\d.\\d for http version, got {:?}",
                                    String::from_utf8_lossy(&self.buf)
                                );
                                return Err(ParseError::InvalidVersion);
                            }
                            request.version_major = self.buf[0] - b'0';
                            request.version_minor = self.buf[2] - b'0';
                            request.version_string =
                                String::from_utf8_lossy(&self.buf).into_owned();
                            self.buf.clear();
                            self.state = State::RequestLineLf;
                            Ok(ParseStatus::Processing)
                        }
                        b'\n' => Err(ParseError::InvalidLineEnding),
                        _ => Err(ParseError::InvalidVersion),
                    };
                }
                State::RequestLineLf => {
                    if byte != b'\n' {
                        return Err(ParseError::InvalidLineEnding);
                    }
                    self.state = State::Headers;
                    self.header_state = HeaderState::Start;
                    return Ok(ParseStatus::Processing);
                }
                State::Headers => return self.consume_header_byte(request, byte),
                State::BlankLineLf => {
                    if byte != b'\n' {
                        return Err(ParseError::InvalidLineEnding);
                    }
                    if request.content_length == 0 {
                        request.data = Vec::new();
                        self.finish();
                        return Ok(ParseStatus::Complete);
                    }
                    if request.content_length > 0 {
                        self.buf
                            .reserve((request.content_length as usize).min(BODY_RESERVE_LIMIT));
                    }
                    self.state = State::Data;
                    return Ok(ParseStatus::Processing);
                }
                State::Data => {
                    self.buf.push(byte);
                    if request.content_length >= 0 {
                        self.consumed_body += 1;
                        if self.consumed_body >= request.content_length {
                            request.data = mem::take(&mut self.buf);
                            self.finish();
                            return Ok(ParseStatus::Complete);
                        }
                    }
                    return Ok(ParseStatus::Processing);
                }
            }
        }
    }

    /// Ends an unknown-length body on an out-of-band signal, typically
    /// connection close.
    ///
    /// If the parser is mid-body without a `Content-Length`, the bytes
    /// accumulated so far move into `request.data` and this returns
    /// `true`. In any other state the partial parse is discarded and this
    /// returns `false`; the `Request` holds no usable data then. Either
    /// way the parser is back in its initial state afterwards.
    pub fn finalize(&mut self, request: &mut Request) -> bool {
        let committed = self.state == State::Data && request.content_length == -1;
        if committed {
            request.data = mem::take(&mut self.buf);
        }
        self.finish();
        committed
    }

    fn finish(&mut self) {
        self.state = State::Start;
        self.header_state = HeaderState::Start;
        self.header_field = None;
        self.header_key.clear();
        self.consumed_body = 0;
        self.buf.clear();
    }
}

impl Default for RequestParser {
    fn default() -> RequestParser {
        RequestParser::new()
    }
}
