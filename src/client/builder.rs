// ABOUTME: Convenience factory for the common "just connect" case
// ABOUTME: ClientOptions (in client::types) is the full-control path this defers to

use crate::client::default::Client;
use crate::client::types::ClientOptions;
use crate::error::RedisResult;

/// Factory for quick client creation with minimal parameters.
///
/// Use this for the common case of "connect to this host and port with the
/// default database and timeout". Reach for [`ClientOptions`] directly when
/// you need to control the connect timeout or select a non-default
/// database.
pub struct ClientBuilder;

impl ClientBuilder {
    /// Connects to `host:port` with database 0 and the default 500ms
    /// connect timeout.
    pub async fn quick(host: impl Into<String>, port: u16) -> RedisResult<Client> {
        ClientOptions::new().with_host(host).with_port(port).connect().await
    }

    /// Connects to `host:port` and immediately selects `db`.
    pub async fn with_db(host: impl Into<String>, port: u16, db: i64) -> RedisResult<Client> {
        ClientOptions::new()
            .with_host(host)
            .with_port(port)
            .with_db(db)
            .connect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn quick_connects_to_the_given_host_and_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move { listener.accept().await.unwrap() });

        let client = ClientBuilder::quick(addr.ip().to_string(), addr.port())
            .await
            .unwrap();
        assert!(client.is_connected());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn with_db_replays_select_after_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"SELECT 5\r\n");
            sock.write_all(b"+OK\r\n").await.unwrap();
        });

        let client = ClientBuilder::with_db(addr.ip().to_string(), addr.port(), 5)
            .await
            .unwrap();
        assert!(client.is_connected());
        server.await.unwrap();
    }
}
