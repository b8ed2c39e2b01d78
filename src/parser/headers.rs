//! Header-block sub-machine, active while the parser sits in its
//! `Headers` state.

use log::{debug, trace};

use super::{ParseError, ParseStatus, RequestParser, State};
use crate::request::Request;

/// Sub-states for one header line. `Start` doubles as the blank-line
/// detector: a CR arriving there ends the whole header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeaderState {
    Start,
    Key,
    Space,
    Value,
    NewLine,
}

/// Headers the parser dispatches into dedicated [`Request`] fields.
/// Matching is on the lower-cased key; everything else is recorded but not
/// dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeaderField {
    Host,
    ContentLength,
    ContentType,
    Connection,
    KeepAlive,
    Max,
}

impl HeaderField {
    fn from_key(lowered: &str) -> Option<HeaderField> {
        match lowered {
            "host" => Some(HeaderField::Host),
            "content-length" => Some(HeaderField::ContentLength),
            "content-type" => Some(HeaderField::ContentType),
            "connection" => Some(HeaderField::Connection),
            "keep-alive" => Some(HeaderField::KeepAlive),
            "max" => Some(HeaderField::Max),
            _ => None,
        }
    }
}

impl RequestParser {
    pub(super) fn consume_header_byte(
        &mut self,
        request: &mut Request,
        byte: u8,
    ) -> Result<ParseStatus, ParseError> {
        loop {
            match self.header_state {
                HeaderState::Start => {
                    if byte == b'\r' {
                        self.state = State::BlankLineLf;
                        return Ok(ParseStatus::Processing);
                    }
                    if byte == b'\n' {
                        return Err(ParseError::InvalidLineEnding);
                    }
                    self.header_state = HeaderState::Key;
                    // reprocess: first byte of the key
                }
                HeaderState::Key => {
                    if byte == b':' {
                        let key = String::from_utf8_lossy(&self.buf).into_owned();
                        self.header_field = HeaderField::from_key(&key.to_ascii_lowercase());
                        self.header_key = key;
                        self.buf.clear();
                        self.header_state = HeaderState::Space;
                    } else if byte == b' ' {
                        debug!("unexpected space in header name");
                        return Err(ParseError::InvalidHeaderKey);
                    } else {
                        self.buf.push(byte);
                    }
                    return Ok(ParseStatus::Processing);
                }
                HeaderState::Space => {
                    if byte == b' ' {
                        return Ok(ParseStatus::Processing);
                    }
                    self.header_state = HeaderState::Value;
                    // reprocess: first byte of the value
                }
                HeaderState::Value => {
                    if byte == b'\r' || byte == b'\n' {
                        self.header_state = HeaderState::NewLine;
                    } else {
                        self.buf.push(byte);
                    }
                    return Ok(ParseStatus::Processing);
                }
                HeaderState::NewLine => {
                    if byte != b'\r' && byte != b'\n' {
                        return Err(ParseError::InvalidLineEnding);
                    }
                    let value = String::from_utf8_lossy(&self.buf).into_owned();
                    self.buf.clear();
                    self.dispatch_header(request, &value)?;
                    let key = std::mem::take(&mut self.header_key);
                    request.headers.push((key, value));
                    self.header_field = None;
                    self.header_state = HeaderState::Start;
                    return Ok(ParseStatus::Processing);
                }
            }
        }
    }

    fn dispatch_header(&mut self, request: &mut Request, value: &str) -> Result<(), ParseError> {
        match self.header_field {
            Some(HeaderField::Host) => request.host = value.to_owned(),
            Some(HeaderField::ContentType) => request.content_type = value.to_owned(),
            Some(HeaderField::ContentLength) => match value.parse::<i64>() {
                Ok(len) if len >= 0 => request.content_length = len,
                _ => {
                    debug!("bad Content-Length value {:?}", value);
                    return Err(ParseError::InvalidContentLength);
                }
            },
            Some(HeaderField::Connection) => {
                request.keep_alive = value.eq_ignore_ascii_case("keep-alive");
            }
            Some(HeaderField::KeepAlive) => {
                // advisory header: an unparseable timeout keeps the old value
                if let Some(eq) = value.find('=') {
                    match value[eq + 1..].parse::<u64>() {
                        Ok(timeout) => request.connection_timeout = timeout,
                        Err(_) => trace!("ignoring unparseable Keep-Alive value {:?}", value),
                    }
                }
            }
            // recognized so clients sending `Max: N` are tolerated; no field
            Some(HeaderField::Max) => {}
            None => {}
        }
        Ok(())
    }
}
