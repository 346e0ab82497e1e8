// ABOUTME: Stateless sigil dispatch for a single framed line of the RESP wire format
// ABOUTME: Classifies by leading byte; the multi-element accumulation lives in Connection::read_reply

use crate::error::RedisError;
use tracing::trace;

/// What a single line, once dispatched by its leading sigil, tells the
/// reply-assembly loop to do next.
///
/// This mirrors the distilled protocol spec's sigil table exactly. The
/// count carried by `ReadCount`/`HoldCount` is always `> 0`; the `-1` and
/// `0` cases get their own nil/empty variants so callers don't have to
/// special-case small integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// `+<rest>` where `<rest> != "OK"`.
    Status(String),
    /// `+OK`, folded into the distinguished `ok` atom.
    Ok,
    /// `:<n>`.
    Integer(i64),
    /// `-<rest>`: the header of an error reply. The *next* line is the
    /// error text, parsed by calling [`parse_line`] again with
    /// `awaiting_error_text: true`.
    ErrorHeader,
    /// The error text line following an `ErrorHeader` event.
    ErrorText(String),
    /// `$-1`.
    ReadNil,
    /// `$0` (an empty bulk body; no bytes follow on the wire besides the
    /// trailing CRLF, which the framer already strips).
    ReadEmpty,
    /// `$N` for `N > 0`: the framer must now be asked for `N` counted bytes.
    ReadCount(usize),
    /// `*-1`.
    HoldNil,
    /// `*0` (empty multi-bulk).
    HoldEmpty,
    /// `*N` for `N > 0`: `N` bulk elements follow.
    HoldCount(usize),
}

/// Dispatches one framed, CRLF-stripped line to a [`ParseEvent`].
///
/// When `awaiting_error_text` is set, the parser ignores the leading sigil
/// entirely and treats the whole line as the error message text — this is
/// the one piece of carry-state the parser needs, per the protocol spec.
#[tracing::instrument(level = "trace", skip(line), fields(len = line.len()))]
pub fn parse_line(awaiting_error_text: bool, line: &[u8]) -> Result<ParseEvent, RedisError> {
    if awaiting_error_text {
        return Ok(ParseEvent::ErrorText(lossy_string(line)));
    }

    let (&sigil, rest) = line
        .split_first()
        .ok_or_else(|| RedisError::Protocol("empty reply line".into()))?;
    trace!(sigil = %(sigil as char), "dispatching reply line");

    match sigil {
        b'+' => {
            let s = lossy_string(rest);
            if s == "OK" {
                Ok(ParseEvent::Ok)
            } else {
                Ok(ParseEvent::Status(s))
            }
        }
        b'-' => Ok(ParseEvent::ErrorHeader),
        b':' => parse_int(rest).map(ParseEvent::Integer),
        b'$' => match parse_int(rest)? {
            -1 => Ok(ParseEvent::ReadNil),
            0 => Ok(ParseEvent::ReadEmpty),
            n if n > 0 => Ok(ParseEvent::ReadCount(n as usize)),
            n => Err(RedisError::Protocol(format!("negative bulk length {n}"))),
        },
        b'*' => match parse_int(rest)? {
            -1 => Ok(ParseEvent::HoldNil),
            0 => Ok(ParseEvent::HoldEmpty),
            n if n > 0 => Ok(ParseEvent::HoldCount(n as usize)),
            n => Err(RedisError::Protocol(format!(
                "negative multi-bulk count {n}"
            ))),
        },
        other => Err(RedisError::Protocol(format!(
            "unexpected reply sigil {:?}",
            other as char
        ))),
    }
}

fn parse_int(bytes: &[u8]) -> Result<i64, RedisError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| RedisError::Protocol(format!("invalid integer {:?}", lossy_string(bytes))))
}

fn lossy_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
