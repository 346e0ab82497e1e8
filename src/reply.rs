// ABOUTME: The decoded value shape every RESP reply collapses into
// ABOUTME: Status/Error/Integer/Bulk/Nil/MultiBulk, plus the `ok` convenience atom

use bytes::Bytes;
use std::fmt;

/// A single decoded reply from the server.
///
/// RESP3 push frames and nested multi-bulks are out of scope: a `MultiBulk`
/// here only ever contains `Bulk` or `Nil` elements, matching the protocol
/// version this client speaks.
#[derive(Clone, PartialEq, Eq)]
pub enum Reply {
    /// A `+...` status line. `+OK` is folded into [`Reply::Ok`] by the state
    /// machine before it reaches a caller; this variant carries every other
    /// status text verbatim.
    Status(String),
    /// The distinguished "OK" atom. Surfaced instead of `Status("OK".into())`
    /// so callers can match on it directly rather than compare strings.
    Ok,
    /// A `-...` error reply. This is data, not a `RedisError`: server errors
    /// flow through the normal reply path (see `RedisError`'s doc comment).
    Error(String),
    /// A `:...` integer reply.
    Integer(i64),
    /// A `$N\r\n...` bulk reply with a known length.
    Bulk(Bytes),
    /// A `$-1\r\n` (or `*-1\r\n`) nil reply.
    Nil,
    /// A `*N\r\n` multi-bulk reply of `Bulk`/`Nil` elements.
    MultiBulk(Vec<Reply>),
}

impl Reply {
    /// `true` for the `Ok` atom or a `Status("OK")` (the parser always
    /// produces the former, but this stays lenient for hand-built values).
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok) || matches!(self, Reply::Status(s) if s == "OK")
    }

    /// `true` for `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// `true` for `Error(_)`.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Unwraps a one-element multi-bulk into its single member.
    ///
    /// Per the single-row convenience wrapper described in the protocol
    /// spec: callers that know a command returns at most one row can use
    /// this to avoid matching on `MultiBulk(vec![x])` everywhere.
    pub fn into_single_row(self) -> Reply {
        match self {
            Reply::MultiBulk(mut items) if items.len() == 1 => items.pop().unwrap(),
            other => other,
        }
    }

    /// Borrows the bulk payload, if this is a `Bulk` reply.
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Reply::Bulk(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "Status({s:?})"),
            Reply::Ok => write!(f, "Ok"),
            Reply::Error(s) => write!(f, "Error({s:?})"),
            Reply::Integer(i) => write!(f, "Integer({i})"),
            Reply::Bulk(b) => write!(f, "Bulk({:?})", String::from_utf8_lossy(b)),
            Reply::Nil => write!(f, "Nil"),
            Reply::MultiBulk(items) => write!(f, "MultiBulk({items:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_single_row_unwraps_a_one_element_multi_bulk() {
        let reply = Reply::MultiBulk(vec![Reply::Bulk(Bytes::from_static(b"A"))]);
        assert_eq!(reply.into_single_row(), Reply::Bulk(Bytes::from_static(b"A")));
    }

    #[test]
    fn into_single_row_leaves_a_multi_element_multi_bulk_alone() {
        let reply = Reply::MultiBulk(vec![
            Reply::Bulk(Bytes::from_static(b"A")),
            Reply::Bulk(Bytes::from_static(b"B")),
        ]);
        let expected = reply.clone();
        assert_eq!(reply.into_single_row(), expected);
    }

    #[test]
    fn into_single_row_passes_non_multi_bulk_through_unchanged() {
        assert_eq!(Reply::Integer(7).into_single_row(), Reply::Integer(7));
        assert_eq!(Reply::Nil.into_single_row(), Reply::Nil);
    }
}
