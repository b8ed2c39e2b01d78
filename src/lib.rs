//! Sans-I/O incremental HTTP 1.1 request parser.
//!
//! This crate is the wire-format layer of an embedded web server: it turns
//! a raw, possibly fragmented byte stream into a structured [`Request`],
//! one byte at a time, and separately encodes/decodes URL percent-escaping
//! and query-string data.
//!
//! ```txt
//!            consume(byte)                  url::decode
//!                 |                              |
//!   io driver -> bytes -> RequestParser -> Request -> handler
//!                 |                              |
//!          Processing/Complete             params / map
//! ```
//!
//! The parser never touches a socket. An external I/O driver feeds it one
//! byte per call and reacts to the returned [`ParseStatus`]; the [`url`]
//! module is a coequal protocol primitive invoked later by route handlers,
//! not by the parser.
//!
//! # Example
//!
//! ```
//! use sans_h1::{ParseStatus, Request, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let mut request = Request::new();
//!
//! let wire = b"GET /index.html HTTP/1.1\r\nHost: example.org\r\nContent-Length: 0\r\n\r\n";
//! let (head, last) = wire.split_at(wire.len() - 1);
//! for &byte in head {
//!     assert_eq!(parser.consume(&mut request, byte).unwrap(), ParseStatus::Processing);
//! }
//! assert_eq!(parser.consume(&mut request, last[0]).unwrap(), ParseStatus::Complete);
//! assert_eq!(request.url, "/index.html");
//! ```

#![forbid(unsafe_code, future_incompatible, rust_2018_idioms)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]
#![cfg_attr(test, deny(warnings))]

pub use parser::{ParseError, ParseStatus, RequestParser};
pub use request::{Method, Request};

mod request;

pub mod parser;
pub mod url;
