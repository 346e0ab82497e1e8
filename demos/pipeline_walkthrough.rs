// ABOUTME: Walks through pipelined submission and deferred collection
// ABOUTME: Run with `cargo run --example pipeline_walkthrough -- 127.0.0.1:6379`

use respline::client::{ClientBuilder, RedisClient, RedisConnection};
use respline::encoder;
use std::env;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let addr = env::args().nth(1).unwrap_or_else(|| "127.0.0.1:6379".to_string());
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or("address must be host:port")?;
    let mut client = ClientBuilder::quick(host, port.parse()?).await?;

    client.set_pipelining(true).await?;

    for i in 0..5 {
        let key = format!("pipeline-demo:{i}");
        client
            .send_async(encoder::scall("INCR", &[&key]))
            .await?;
    }

    // Every INCR above was fired without waiting; their replies have been
    // accumulating in submission order the whole time. collect_all drains
    // them in one shot rather than making five separate round trips.
    let replies = client.collect_all().await?;
    for (i, reply) in replies.iter().enumerate() {
        println!("pipeline-demo:{i} -> {reply:?}");
    }

    client.set_pipelining(false).await?;
    client.disconnect().await?;
    Ok(())
}
