// ABOUTME: Client error types across connection, protocol, and call-level failures
// ABOUTME: Provides structured error reporting with automatic conversion from underlying I/O errors

use std::io;
use thiserror::Error;

/// Comprehensive error type for client operations.
///
/// Server-side data errors (a `-ERR ...` reply) are *not* represented here —
/// they flow back as an `Ok(Reply::Error(_))`, same as any other reply,
/// because a call that reached the server and got an answer is not a
/// client-side failure. This type only covers failures that prevent a call
/// from completing at all.
#[derive(Debug, Error)]
pub enum RedisError {
    /// I/O error on the underlying socket (connect, read, write).
    #[error("connection error: {0}")]
    Io(#[from] io::Error),

    /// The byte stream didn't parse as a well-formed reply.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The caller-side deadline elapsed before a reply arrived.
    ///
    /// This does not cancel the call: its slot in the pending-calls queue
    /// is left in place, and the reply (when it eventually arrives) is
    /// still consumed from the wire and discarded. Retiring the slot early
    /// would desynchronize the FIFO for every call queued behind it.
    #[error("call timed out")]
    Timeout,

    /// The connection was closed (locally or by the peer) while this call
    /// was outstanding.
    #[error("connection closed")]
    Closed,
}

/// Result type alias for client operations.
pub type RedisResult<T> = Result<T, RedisError>;
