//! URL percent-encoding and query-string codec.
//!
//! Stateless pure functions shared by route handlers and body parsers.
//! The decoders are total: any input, however malformed, produces a
//! result. A `%` that is not followed by two hex digits passes through
//! literally and scanning resumes at the very next byte, so loosely-formed
//! input round-trips byte for byte.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// One query-string entry: `[key]` for a key with no value, or
/// `[key, value]`. Any other length is a caller contract violation that
/// [`encode`] rejects.
pub type ParamItem = Vec<String>;

/// An ordered query string: duplicates and bare keys allowed, wire order
/// preserved.
pub type Params = Vec<ParamItem>;

/// A deduplicated projection of [`Params`]: last occurrence of a key wins,
/// no ordering guarantee.
pub type ParamsMap = HashMap<String, String>;

/// A [`ParamItem`] handed to [`encode`] with zero or three-plus elements.
///
/// This is a programming error in constructing the params sequence, not a
/// data-quality issue; nothing is silently dropped or truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeError {
    /// Number of elements the offending item had.
    pub len: usize,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "query item must have one or two elements, got {}",
            self.len
        )
    }
}

impl Error for EncodeError {}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~' | b'/')
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte + 10 - b'a'),
        b'A'..=b'F' => Some(byte + 10 - b'A'),
        _ => None,
    }
}

fn quote_byte(out: &mut String, byte: u8) {
    if is_unreserved(byte) {
        out.push(byte as char);
    } else {
        out.push('%');
        out.push(HEX_UPPER[(byte >> 4) as usize] as char);
        out.push(HEX_UPPER[(byte & 0x0f) as usize] as char);
    }
}

/// Percent-encodes every byte except ASCII alphanumerics, `-_.~` and the
/// path separator `/`. Encoded bytes use uppercase hex digits.
pub fn quote(s: impl AsRef<[u8]>) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    for &byte in s {
        quote_byte(&mut out, byte);
    }
    out
}

/// Like [`quote`], except a literal space encodes as `+` instead of `%20`.
pub fn quote_plus(s: impl AsRef<[u8]>) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    for &byte in s {
        if byte == b' ' {
            out.push('+');
        } else {
            quote_byte(&mut out, byte);
        }
    }
    out
}

fn unquote_impl(s: &[u8], plus_as_space: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let byte = s[i];
        if byte == b'%' {
            if let (Some(hi), Some(lo)) = (
                s.get(i + 1).copied().and_then(hex_value),
                s.get(i + 2).copied().and_then(hex_value),
            ) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
            // malformed escape: emit the '%' literally and rescan from the
            // very next byte, never skip the escape as a unit
            out.push(b'%');
        } else if plus_as_space && byte == b'+' {
            out.push(b' ');
        } else {
            out.push(byte);
        }
        i += 1;
    }
    out
}

/// Inverse of [`quote`]. Returns raw bytes because a decoded escape need
/// not be valid UTF-8. Never fails; see the module docs for the
/// malformed-escape rule.
pub fn unquote(s: impl AsRef<[u8]>) -> Vec<u8> {
    unquote_impl(s.as_ref(), false)
}

/// Like [`unquote`], additionally decoding a literal `+` as a space.
pub fn unquote_plus(s: impl AsRef<[u8]>) -> Vec<u8> {
    unquote_impl(s.as_ref(), true)
}

fn unquote_plus_lossy(s: &str) -> String {
    String::from_utf8_lossy(&unquote_plus(s)).into_owned()
}

/// Decodes a query string into ordered entries.
///
/// Splits on `&`, then each item on its first `=`. An item with no `=`
/// becomes a one-element [`ParamItem`] holding just the key, which is
/// distinct from a present-but-empty value. Keys and values are
/// plus-decoded. Empty input yields no entries.
pub fn decode(s: &str) -> Params {
    if s.is_empty() {
        return Params::new();
    }
    s.split('&')
        .map(|item| match item.find('=') {
            Some(eq) => vec![
                unquote_plus_lossy(&item[..eq]),
                unquote_plus_lossy(&item[eq + 1..]),
            ],
            None => vec![unquote_plus_lossy(item)],
        })
        .collect()
}

/// Decodes a query string into a mapping.
///
/// Same splitting as [`decode`], collapsed into a map: a missing `=`
/// yields an empty value and the last occurrence of a duplicate key wins.
pub fn decode_map(s: &str) -> ParamsMap {
    let mut map = ParamsMap::new();
    if s.is_empty() {
        return map;
    }
    for item in s.split('&') {
        let (key, value) = match item.find('=') {
            Some(eq) => (&item[..eq], &item[eq + 1..]),
            None => (item, ""),
        };
        map.insert(unquote_plus_lossy(key), unquote_plus_lossy(value));
    }
    map
}

/// Serializes ordered params, inverse of [`decode`].
///
/// One-element items become the bare plus-quoted key (no `=`); two-element
/// items become `key=value`, both plus-quoted; anything else is an
/// [`EncodeError`]. Items join with `&` in input order. Empty input yields
/// an empty string.
pub fn encode(params: &[ParamItem]) -> Result<String, EncodeError> {
    let mut out = String::new();
    for item in params {
        if !out.is_empty() {
            out.push('&');
        }
        match item.as_slice() {
            [key] => out.push_str(&quote_plus(key)),
            [key, value] => {
                out.push_str(&quote_plus(key));
                out.push('=');
                out.push_str(&quote_plus(value));
            }
            _ => return Err(EncodeError { len: item.len() }),
        }
    }
    Ok(out)
}

/// Serializes a mapping, inverse of [`decode_map`].
///
/// Infallible since every entry is a key/value pair; entry order is
/// unspecified.
pub fn encode_map(map: &ParamsMap) -> String {
    let mut out = String::new();
    for (key, value) in map {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&quote_plus(key));
        out.push('=');
        out.push_str(&quote_plus(value));
    }
    out
}
