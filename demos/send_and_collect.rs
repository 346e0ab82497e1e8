// ABOUTME: Walks through a plain request/response session against a Redis server
// ABOUTME: Run with `cargo run --example send_and_collect -- 127.0.0.1:6379`

use respline::client::{ClientBuilder, RedisClient, RedisConnection};
use respline::encoder;
use std::env;
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let addr = env::args().nth(1).unwrap_or_else(|| "127.0.0.1:6379".to_string());
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or("address must be host:port")?;
    let mut client = ClientBuilder::quick(host, port.parse()?).await?;

    let pong = client
        .send(encoder::scall("PING", &[]), Duration::from_secs(1))
        .await?;
    println!("PING -> {pong:?}");

    client
        .send(
            encoder::set_call("SET", "greeting", b"hello from respline"),
            Duration::from_secs(1),
        )
        .await?;

    let value = client
        .send(encoder::scall("GET", &["greeting"]), Duration::from_secs(1))
        .await?;
    println!("GET greeting -> {value:?}");

    let info = client.info().await?;
    println!("server version: {:?}", info.version);

    client.disconnect().await?;
    Ok(())
}
