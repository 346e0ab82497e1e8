// ABOUTME: Client module — the actor, its public trait surface, and the concrete Client handle
// ABOUTME: Exports ClientBuilder/ClientOptions for construction and RedisConnection/RedisClient for use

//! Connection-oriented client for a single Redis-speaking server.
//!
//! This module is a layered design in the same spirit as a role-split SMPP
//! client, minus the roles: Redis commands aren't gated by how the
//! connection was opened, so there's one concrete [`Client`] type rather
//! than a transmitter/receiver/transceiver split.
//!
//! * [`actor`] — the task that exclusively owns the socket and the
//!   pending-calls FIFO.
//! * [`traits::RedisConnection`] / [`traits::RedisClient`] — the public
//!   trait surface (lifecycle, then calls/pipelining/select/info).
//! * [`Client`] — the one type this crate ships that implements both.
//! * [`ClientBuilder`] / [`ClientOptions`] — convenience vs. full-control
//!   construction, mirroring the teacher's two-tier builder API.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use respline::client::{Client, ClientBuilder, RedisClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client: Client = ClientBuilder::quick("127.0.0.1", 6379).await?;
//! let reply = client.send(b"PING\r\n".to_vec(), Duration::from_secs(1)).await?;
//! println!("{reply:?}");
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod builder;
pub mod default;
pub mod traits;
pub mod types;

pub use builder::ClientBuilder;
pub use default::Client;
pub use traits::{RedisClient, RedisConnection};
pub use types::{ClientOptions, ServerInfo};
