//! A client for Redis's original inline RESP dialect: a single TCP
//! connection framed by sigil-prefixed lines and byte-counted bulk bodies,
//! with request/response calls and deferred pipelining sharing one
//! pending-calls queue.
//!
//! The moving parts:
//!
//! * [`parser`] and [`connection::ReplyReader`] assemble raw bytes into a
//!   [`Reply`], switching between line-mode and counted-byte reads as bulk
//!   headers demand.
//! * [`encoder`] formats outgoing commands into the inline dialect the
//!   server expects.
//! * [`client::actor`] is the task that owns the socket end-to-end: writing
//!   commands, matching replies back to callers in FIFO order, and
//!   reconnecting on demand when the socket drops.
//! * [`Client`] is the handle applications hold; [`ClientBuilder`] and
//!   [`client::types::ClientOptions`] construct one.
//!
//! # Examples
//!
//! ## Basic request/response
//!
//! ```rust,no_run
//! use respline::client::{ClientBuilder, RedisClient, RedisConnection};
//! use respline::encoder;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::quick("127.0.0.1", 6379).await?;
//!
//!     let reply = client
//!         .send(encoder::scall("PING", &[]), Duration::from_secs(1))
//!         .await?;
//!     println!("{reply:?}");
//!
//!     client.disconnect().await.ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Pipelining
//!
//! This example fires several commands without waiting on each one, then
//! collects every reply once they've all arrived:
//!
//! ```rust,no_run
//! use respline::client::{ClientBuilder, RedisClient};
//! use respline::encoder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::quick("127.0.0.1", 6379).await?;
//!     client.set_pipelining(true).await?;
//!
//!     for i in 0..3 {
//!         client
//!             .send_async(encoder::scall("INCR", &[&format!("counter:{i}")]))
//!             .await?;
//!     }
//!
//!     let replies = client.collect_all().await?;
//!     println!("{replies:?}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod connection;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod reply;

// Re-export the wire-level types for direct access.
pub use connection::Connection;
pub use error::{RedisError, RedisResult};
pub use reply::Reply;

// Re-export the main client API for easy access.
pub use client::{Client, ClientBuilder, ClientOptions, RedisClient, RedisConnection, ServerInfo};
