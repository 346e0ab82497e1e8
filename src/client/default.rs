// ABOUTME: The one concrete client type this crate ships, backed by the connection actor
// ABOUTME: A cheap Clone handle around an mpsc sender; all socket access happens in the actor task

use crate::client::actor::{self, ActorCommand, ActorConfig};
use crate::client::traits::{RedisClient, RedisConnection};
use crate::client::types::{ClientOptions, ServerInfo};
use crate::encoder;
use crate::error::{RedisError, RedisResult};
use crate::reply::Reply;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A connection to a single Redis-speaking server.
///
/// `Client` is a thin, `Clone`-able handle: every call it exposes sends a
/// message to the actor task that actually owns the socket (see
/// [`crate::client::actor`]) and awaits the answer. Cloning a `Client` is
/// how multiple concurrent callers share one connection, matching the
/// "submissions from different concurrent callers are serialized by the
/// actor's message mailbox" rule from the concurrency spec.
#[derive(Clone)]
pub struct Client {
    cmd_tx: mpsc::UnboundedSender<ActorCommand>,
    connected: Arc<AtomicBool>,
}

impl Client {
    /// Connects to `addr` with the full set of [`ClientOptions`] applied,
    /// including the connect timeout — the one setting
    /// [`RedisConnection::connect`] can't carry, since its signature is
    /// fixed to `(addr, db)`.
    pub async fn connect_with_options(addr: &str, options: ClientOptions) -> RedisResult<Self> {
        let config = ActorConfig {
            addr: addr.to_string(),
            connect_timeout: options.timeout,
        };
        let db_bytes = options.db.to_string().into_bytes();
        let (cmd_tx, connected) = actor::connect(config, db_bytes).await?;
        Ok(Client { cmd_tx, connected })
    }
}

impl RedisConnection for Client {
    async fn connect(addr: &str, db: i64) -> RedisResult<Self> {
        Client::connect_with_options(addr, ClientOptions::default().with_db(db)).await
    }

    async fn disconnect(&mut self) -> RedisResult<()> {
        // `send` can only fail if the actor has already exited, which means
        // the connection is already as closed as `Disconnect` would make it.
        let _ = self.cmd_tx.send(ActorCommand::Disconnect);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl RedisClient for Client {
    async fn send(&self, command: Vec<u8>, timeout: Duration) -> RedisResult<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::Call {
                bytes: command,
                reply_tx,
            })
            .map_err(|_| RedisError::Closed)?;

        // The caller-side timeout races the oneshot, per §5: a timeout here
        // does not retract the slot from the actor's pending-calls FIFO —
        // the next reply to arrive on the wire still consumes it, and is
        // simply discarded since nothing is listening on `reply_rx` by then.
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RedisError::Closed),
            Err(_) => Err(RedisError::Timeout),
        }
    }

    async fn send_async(&self, command: Vec<u8>) -> RedisResult<()> {
        self.cmd_tx
            .send(ActorCommand::Cast { bytes: command })
            .map_err(|_| RedisError::Closed)
    }

    async fn set_pipelining(&self, enabled: bool) -> RedisResult<()> {
        self.cmd_tx
            .send(ActorCommand::SetPipelining(enabled))
            .map_err(|_| RedisError::Closed)
    }

    async fn is_pipelining(&self) -> RedisResult<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::IsPipelining(reply_tx))
            .map_err(|_| RedisError::Closed)?;
        reply_rx.await.map_err(|_| RedisError::Closed)
    }

    async fn collect_all(&self) -> RedisResult<Vec<Reply>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::CollectAll { reply_tx })
            .map_err(|_| RedisError::Closed)?;
        reply_rx.await.map_err(|_| RedisError::Closed)?
    }

    async fn select(&self, db: i64) -> RedisResult<Reply> {
        let bytes = encoder::scall("SELECT", &[&db.to_string()]);
        self.send(bytes, ClientOptions::default().timeout).await
    }

    async fn info(&self) -> RedisResult<ServerInfo> {
        let bytes = encoder::scall("INFO", &[]);
        let reply = self.send(bytes, ClientOptions::default().timeout).await?;
        match reply {
            Reply::Bulk(body) => Ok(ServerInfo::parse(&String::from_utf8_lossy(&body))),
            Reply::Nil => Ok(ServerInfo::default()),
            other => Err(RedisError::Protocol(format!(
                "INFO returned non-bulk reply: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_send_and_disconnect_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"PING\r\n");
            sock.write_all(b"+PONG\r\n").await.unwrap();
        });

        let mut client = Client::connect(&addr.to_string(), 0).await.unwrap();
        assert!(client.is_connected());

        let reply = client
            .send(encoder::scall("PING", &[]), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, Reply::Status("PONG".into()));

        client.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn send_times_out_without_retracting_the_fifo_slot() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = sock.read(&mut buf).await.unwrap();
            // Reply arrives well after the caller's timeout has elapsed.
            tokio::time::sleep(Duration::from_millis(30)).await;
            sock.write_all(b"+PONG\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        });

        let client = Client::connect(&addr.to_string(), 0).await.unwrap();
        let result = client
            .send(encoder::scall("PING", &[]), Duration::from_millis(5))
            .await;
        assert!(matches!(result, Err(RedisError::Timeout)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connect_replays_select_for_nonzero_db() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"SELECT 3\r\n");
            sock.write_all(b"+OK\r\n").await.unwrap();
        });

        let client = Client::connect(&addr.to_string(), 3).await.unwrap();
        assert!(client.is_connected());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn info_parses_the_bulk_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = sock.read(&mut buf).await.unwrap();
            sock.write_all(b"$27\r\nredis_version:7.2.0\r\nfoo:1\r\n")
                .await
                .unwrap();
        });

        let client = Client::connect(&addr.to_string(), 0).await.unwrap();
        let info = client.info().await.unwrap();
        assert_eq!(info.version.as_deref(), Some("7.2.0"));
        server.await.unwrap();
    }
}
