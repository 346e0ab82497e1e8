// ABOUTME: Core client traits using native async functions for modern Rust implementations
// ABOUTME: RedisConnection covers lifecycle; RedisClient layers the call/pipeline/select surface on top

use crate::client::types::ServerInfo;
use crate::error::RedisResult;
use crate::reply::Reply;
use std::future::Future;
use std::time::Duration;

/// Base connection lifecycle, independent of any protocol semantics.
///
/// Every client type in this crate needs exactly this and nothing more to
/// be considered "connected" — there's no role split (transmitter/receiver)
/// the way a bound SMPP session has, since Redis commands aren't gated by
/// how the connection was opened.
pub trait RedisConnection {
    /// Opens the TCP connection, starts the actor task that owns the
    /// socket, and replays `SELECT` for the configured database.
    fn connect(addr: &str, db: i64) -> impl Future<Output = RedisResult<Self>> + Send
    where
        Self: Sized;

    /// Drops the socket and fails every call still waiting in the
    /// pending-calls queue with [`crate::error::RedisError::Closed`].
    fn disconnect(&mut self) -> impl Future<Output = RedisResult<()>> + Send;

    /// `true` until `disconnect` is called or the actor observes the
    /// socket close out from under it.
    fn is_connected(&self) -> bool;
}

/// Core client operations: issuing calls, toggling pipelining, and the
/// small set of connection-scoped commands (`SELECT`, `INFO`) that don't
/// belong in a generic command-encoding helper.
pub trait RedisClient: RedisConnection {
    /// Sends an already-encoded command and awaits its reply, racing the
    /// wait against `timeout`. The call's FIFO slot is not retracted if
    /// the timeout elapses first — see [`crate::error::RedisError::Timeout`].
    fn send(
        &self,
        command: Vec<u8>,
        timeout: Duration,
    ) -> impl Future<Output = RedisResult<Reply>> + Send;

    /// Sends an already-encoded command without waiting for a reply. The
    /// reply is still read off the wire in FIFO order and discarded (or
    /// folded into a pending `collect_all`), it's simply not delivered
    /// back to this caller.
    fn send_async(&self, command: Vec<u8>) -> impl Future<Output = RedisResult<()>> + Send;

    /// Enables or disables pipelining: while enabled, [`RedisClient::send`]
    /// behaves like [`RedisClient::send_async`] (fire-and-forget) until
    /// [`RedisClient::collect_all`] is called to gather every reply that
    /// accumulated since.
    fn set_pipelining(&self, enabled: bool) -> impl Future<Output = RedisResult<()>> + Send;

    /// Whether pipelining is currently enabled.
    fn is_pipelining(&self) -> impl Future<Output = RedisResult<bool>> + Send;

    /// Waits for every reply still outstanding from pipelined calls and
    /// returns them in submission order. If all pending replies have
    /// already arrived, the result is ready immediately; otherwise this
    /// registers as the deferred handle the actor resolves once the last
    /// one lands.
    fn collect_all(&self) -> impl Future<Output = RedisResult<Vec<Reply>>> + Send;

    /// Issues `SELECT db` and awaits its reply.
    fn select(&self, db: i64) -> impl Future<Output = RedisResult<Reply>> + Send;

    /// Issues `INFO` and parses the well-known fields out of its bulk
    /// reply body.
    fn info(&self) -> impl Future<Output = RedisResult<ServerInfo>> + Send;
}
