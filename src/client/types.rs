// ABOUTME: Configuration and small value types shared across the client surface
// ABOUTME: ClientOptions tunes connect/select behavior; ServerInfo is the parsed INFO reply

use crate::client::default::Client;
use crate::error::RedisResult;
use std::time::Duration;

/// Connection configuration, mirroring the teacher's `ClientOptions` shape:
/// a plain data struct with fluent `with_*` setters and a `Default` that
/// matches the documented defaults.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub host: String,
    pub port: u16,
    /// Connect timeout and per-call send/receive timeout.
    pub timeout: Duration,
    /// Logical database selected immediately after connect, and replayed
    /// on every reconnect.
    pub db: i64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            timeout: Duration::from_millis(500),
            db: 0,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds a client connected to `self.addr()`, carrying the connect
    /// timeout and initial database through to the actor — the one path
    /// that reaches the actor without going through the narrower
    /// `RedisConnection::connect(addr, db)` trait signature.
    pub async fn connect(self) -> RedisResult<Client> {
        let addr = self.addr();
        Client::connect_with_options(&addr, self).await
    }
}

/// The subset of an `INFO` reply this client understands, per the
/// recognized-key table. Unknown keys are dropped rather than erroring,
/// since the server's INFO payload grows across versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: Option<String>,
    pub uptime: Option<u64>,
    pub clients: Option<u64>,
    pub slaves: Option<u64>,
    pub memory: Option<u64>,
    pub changes: Option<u64>,
    pub last_save: Option<u64>,
    pub connections: Option<u64>,
    pub commands: Option<u64>,
}

impl ServerInfo {
    /// Parses the `\r\n`-separated `key:value` lines of an `INFO` bulk
    /// reply, keeping only the recognized keys.
    pub fn parse(text: &str) -> ServerInfo {
        let mut info = ServerInfo::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key {
                "redis_version" => info.version = Some(value.to_string()),
                "uptime_in_seconds" => info.uptime = value.parse().ok(),
                "connected_clients" => info.clients = value.parse().ok(),
                "connected_slaves" => info.slaves = value.parse().ok(),
                "used_memory" => info.memory = value.parse().ok(),
                "changes_since_last_save" => info.changes = value.parse().ok(),
                "last_save_time" => info.last_save = value.parse().ok(),
                "total_connections_received" => info.connections = value.parse().ok(),
                "total_commands_processed" => info.commands = value.parse().ok(),
                _ => {}
            }
        }
        info
    }
}
