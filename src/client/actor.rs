// ABOUTME: The single task that exclusively owns the socket and the pending-calls FIFO
// ABOUTME: All command dispatch, reconnect-on-use, and reply delivery happen here

use crate::connection::{CommandWriter, Connection, ReplyReader};
use crate::encoder;
use crate::error::{RedisError, RedisResult};
use crate::reply::Reply;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A message sent from a `Client` handle to its actor task.
pub enum ActorCommand {
    /// A synchronous call: deliver the reply to `reply_tx` unless
    /// pipelining is enabled, in which case it's treated like `Cast`.
    Call {
        bytes: Vec<u8>,
        reply_tx: oneshot::Sender<RedisResult<Reply>>,
    },
    /// A fire-and-forget call: the reply is still consumed off the wire
    /// in order, just not delivered back to any particular caller.
    Cast { bytes: Vec<u8> },
    SetPipelining(bool),
    IsPipelining(oneshot::Sender<bool>),
    CollectAll {
        reply_tx: oneshot::Sender<RedisResult<Vec<Reply>>>,
    },
    Disconnect,
}

/// One slot in the pending-calls FIFO: either a caller waiting on a real
/// reply, or the `async` sentinel for a pipelined cast. `select_db` is set
/// when the command behind this slot was a `SELECT`, so its new database
/// can be adopted once *this* reply (not some later one) is delivered.
enum PendingCall {
    Call(oneshot::Sender<RedisResult<Reply>>, Option<Vec<u8>>),
    Async(Option<Vec<u8>>),
}

/// What the actor needs to dial (or redial) the connection.
#[derive(Debug, Clone)]
pub(crate) struct ActorConfig {
    /// `host:port`, as accepted by `tokio::net::TcpStream::connect`.
    pub addr: String,
    pub connect_timeout: Duration,
}

/// Opens a TCP connection, splits it into its read/write halves, and spawns
/// the reader task that feeds assembled replies back over a fresh channel.
/// Used both for the initial `Connect` and for reconnect-on-use.
async fn dial(
    config: &ActorConfig,
) -> RedisResult<(
    CommandWriter,
    JoinHandle<()>,
    mpsc::UnboundedReceiver<RedisResult<Reply>>,
)> {
    let connect = tokio::net::TcpStream::connect(&config.addr);
    let socket = tokio::time::timeout(config.connect_timeout, connect)
        .await
        .map_err(|_| RedisError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut)))??;
    socket.set_nodelay(true)?;

    let (reader, writer) = Connection::new(socket).into_split();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let reader_task = tokio::spawn(run_reader(reader, reply_tx));
    Ok((writer, reader_task, reply_rx))
}

/// Opens the initial connection and replays `SELECT` for `db` (textual,
/// e.g. `b"0"`) before the actor task starts, so `Client::connect` only
/// returns once the connection is actually usable. Returns the spawned
/// mailbox sender and a shared "is this connection alive" flag.
pub(crate) async fn connect(
    config: ActorConfig,
    db: Vec<u8>,
) -> RedisResult<(mpsc::UnboundedSender<ActorCommand>, Arc<AtomicBool>)> {
    let (mut writer, reader_task, mut reply_rx) = dial(&config).await?;

    if db != b"0" {
        let db_str = String::from_utf8_lossy(&db).into_owned();
        writer.write_command(&select_command(&db_str)).await?;
        match reply_rx.recv().await {
            Some(Ok(reply)) if reply.is_ok() => {}
            Some(Ok(other)) => {
                return Err(RedisError::Protocol(format!(
                    "SELECT replay rejected: {other:?}"
                )));
            }
            Some(Err(e)) => return Err(e),
            None => return Err(RedisError::Closed),
        }
    }

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let connected = Arc::new(AtomicBool::new(true));
    let state = ActorState {
        config,
        db,
        writer: Some(writer),
        reader_task: Some(reader_task),
        reply_rx: Some(reply_rx),
        pending: VecDeque::new(),
        pipelining: false,
        results: Vec::new(),
        deferred: None,
    };
    tokio::spawn(run(state, cmd_rx, connected.clone()));
    Ok((cmd_tx, connected))
}

/// Actor-owned state, mutated exclusively inside the task `run` drives. No
/// other code ever touches `writer` or `reply_rx` — that's the Rust
/// expression of "only the actor may touch the socket" from the
/// concurrency spec.
struct ActorState {
    config: ActorConfig,
    /// The current database, as the exact bytes last sent on the wire —
    /// kept this way so reconnect doesn't need to reformat it.
    db: Vec<u8>,
    writer: Option<CommandWriter>,
    reader_task: Option<JoinHandle<()>>,
    reply_rx: Option<mpsc::UnboundedReceiver<RedisResult<Reply>>>,
    pending: VecDeque<PendingCall>,
    pipelining: bool,
    results: Vec<Reply>,
    deferred: Option<oneshot::Sender<RedisResult<Vec<Reply>>>>,
}

impl ActorState {
    /// Reconnect-on-use: if the socket is absent, reopen it and replay
    /// `SELECT` exactly as the initial `connect` did. A no-op when already
    /// connected.
    async fn ensure_started(&mut self) -> RedisResult<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let (mut writer, reader_task, mut reply_rx) = dial(&self.config).await?;
        if self.db != b"0" {
            let db_str = String::from_utf8_lossy(&self.db).into_owned();
            writer.write_command(&select_command(&db_str)).await?;
            match reply_rx.recv().await {
                Some(Ok(reply)) if reply.is_ok() => {}
                Some(Ok(other)) => {
                    return Err(RedisError::Protocol(format!(
                        "SELECT replay rejected: {other:?}"
                    )));
                }
                Some(Err(e)) => return Err(e),
                None => return Err(RedisError::Closed),
            }
        }
        self.writer = Some(writer);
        self.reader_task = Some(reader_task);
        self.reply_rx = Some(reply_rx);
        Ok(())
    }

    fn close_socket(&mut self) {
        self.writer = None;
        self.reply_rx = None;
        if let Some(handle) = self.reader_task.take() {
            handle.abort();
        }
    }
}

/// Replies flow from a dedicated reader task into the actor's main loop
/// over a channel, decoupling "waiting for a reply" from "accepting new
/// commands" — the actor can write a newly submitted command to the socket
/// while a previous reply is still in flight.
enum Inbound {
    Reply(RedisResult<Reply>),
    Command(ActorCommand),
}

async fn run(
    mut state: ActorState,
    mut cmd_rx: mpsc::UnboundedReceiver<ActorCommand>,
    connected: Arc<AtomicBool>,
) {
    loop {
        let inbound = tokio::select! {
            reply = recv_reply(&mut state.reply_rx) => match reply {
                Some(reply) => Inbound::Reply(reply),
                None => continue,
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => Inbound::Command(cmd),
                None => break,
            },
        };

        match inbound {
            Inbound::Reply(outcome) => {
                if outcome.is_err() {
                    // A fatal read surfaces as `Closed` to every pending
                    // caller, including the one at the head of the FIFO —
                    // not the raw I/O/protocol error, per the lifecycle
                    // invariant that every pending call gets `Closed`.
                    deliver(&mut state, Err(RedisError::Closed));
                    // tcp_closed: mark the socket absent but keep the actor
                    // alive. The next Call/Cast triggers reconnect.
                    state.close_socket();
                    fail_all(&mut state, RedisError::Closed);
                } else {
                    deliver(&mut state, outcome);
                }
            }
            Inbound::Command(ActorCommand::Call { bytes, reply_tx }) => {
                let select_db = select_db_from(&bytes);
                if let Err(e) = state.ensure_started().await {
                    let _ = reply_tx.send(Err(e));
                    continue;
                }
                if let Err(e) = write(&mut state, &bytes).await {
                    let _ = reply_tx.send(Err(e));
                    continue;
                }
                if state.pipelining {
                    state.pending.push_back(PendingCall::Async(select_db));
                    let _ = reply_tx.send(Ok(Reply::Ok));
                } else {
                    state.pending.push_back(PendingCall::Call(reply_tx, select_db));
                }
            }
            Inbound::Command(ActorCommand::Cast { bytes }) => {
                let select_db = select_db_from(&bytes);
                if let Err(e) = state.ensure_started().await {
                    warn!(error = %e, "dropping cast: connection unavailable");
                    continue;
                }
                if let Err(e) = write(&mut state, &bytes).await {
                    warn!(error = %e, "dropping cast: write failed");
                    continue;
                }
                state.pending.push_back(PendingCall::Async(select_db));
            }
            Inbound::Command(ActorCommand::SetPipelining(enabled)) => {
                debug!(enabled, "pipelining toggled");
                state.pipelining = enabled;
            }
            Inbound::Command(ActorCommand::IsPipelining(reply_tx)) => {
                let _ = reply_tx.send(state.pipelining);
            }
            Inbound::Command(ActorCommand::CollectAll { reply_tx }) => {
                if state.pending.is_empty() {
                    let _ = reply_tx.send(Ok(std::mem::take(&mut state.results)));
                } else {
                    state.deferred = Some(reply_tx);
                }
            }
            Inbound::Command(ActorCommand::Disconnect) => {
                break;
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    state.close_socket();
    fail_all(&mut state, RedisError::Closed);
    // Drain any remaining mailbox commands so their callers get `Closed`
    // rather than a silently dropped oneshot.
    while let Ok(cmd) = cmd_rx.try_recv() {
        match cmd {
            ActorCommand::Call { reply_tx, .. } => {
                let _ = reply_tx.send(Err(RedisError::Closed));
            }
            ActorCommand::CollectAll { reply_tx } => {
                let _ = reply_tx.send(Err(RedisError::Closed));
            }
            ActorCommand::IsPipelining(reply_tx) => {
                let _ = reply_tx.send(false);
            }
            _ => {}
        }
    }
}

async fn write(state: &mut ActorState, bytes: &[u8]) -> RedisResult<()> {
    state
        .writer
        .as_mut()
        .expect("ensure_started ran")
        .write_command(bytes)
        .await
}

async fn recv_reply(
    reply_rx: &mut Option<mpsc::UnboundedReceiver<RedisResult<Reply>>>,
) -> Option<RedisResult<Reply>> {
    match reply_rx {
        Some(rx) => rx.recv().await,
        // While disconnected there is nothing to wait on; never resolving
        // here just means `select!` only wakes on the command branch.
        None => std::future::pending().await,
    }
}

/// The core of the "Reply delivery" algorithm: pop the head of the
/// pending-calls FIFO and hand it the completed reply (or propagate the
/// fatal error to it, for the one slot that was waiting when the
/// connection died).
fn deliver(state: &mut ActorState, outcome: RedisResult<Reply>) {
    let Some(slot) = state.pending.pop_front() else {
        if let Ok(reply) = &outcome {
            warn!(?reply, "reply with no pending caller; discarding");
        }
        return;
    };

    let adopted_db = match &outcome {
        Ok(reply) if !reply.is_error() => true,
        _ => false,
    };

    match slot {
        PendingCall::Call(reply_tx, select_db) => {
            if adopted_db {
                if let Some(db) = select_db {
                    state.db = db;
                }
            }
            // A dropped receiver (the caller timed out) makes this a
            // no-op `Err` we deliberately ignore: the slot has already
            // been retired either way, per the documented timeout policy.
            let _ = reply_tx.send(outcome);
        }
        PendingCall::Async(select_db) => {
            if adopted_db {
                if let Some(db) = select_db {
                    state.db = db;
                }
            }
            match outcome {
                Ok(reply) => state.results.push(reply),
                Err(e) => warn!(error = %e, "pipelined call failed"),
            }
        }
    }

    if state.pending.is_empty() {
        if let Some(deferred_tx) = state.deferred.take() {
            let _ = deferred_tx.send(Ok(std::mem::take(&mut state.results)));
        }
    }
}

fn fail_all(state: &mut ActorState, reason: RedisError) {
    while let Some(slot) = state.pending.pop_front() {
        if let PendingCall::Call(reply_tx, _) = slot {
            let _ = reply_tx.send(Err(clone_error(&reason)));
        }
    }
    state.results.clear();
    if let Some(deferred_tx) = state.deferred.take() {
        let _ = deferred_tx.send(Err(clone_error(&reason)));
    }
}

fn clone_error(e: &RedisError) -> RedisError {
    match e {
        RedisError::Closed => RedisError::Closed,
        RedisError::Timeout => RedisError::Timeout,
        RedisError::Protocol(s) => RedisError::Protocol(s.clone()),
        RedisError::Io(io) => RedisError::Io(std::io::Error::new(io.kind(), io.to_string())),
    }
}

async fn run_reader(mut reader: ReplyReader, reply_tx: mpsc::UnboundedSender<RedisResult<Reply>>) {
    loop {
        let outcome = reader.read_reply().await;
        let is_fatal = outcome.is_err();
        if reply_tx.send(outcome).is_err() {
            return;
        }
        if is_fatal {
            return;
        }
    }
}

/// Builds the `SELECT <db>` inline command used both at connect time and
/// whenever a reconnect needs to replay the caller's chosen database.
fn select_command(db: &str) -> Vec<u8> {
    encoder::scall("SELECT", &[db])
}

/// Detects a `SELECT <db>` command in already-encoded bytes (case
/// insensitive on the verb, by protocol convention) and returns the db
/// argument to adopt once *this* reply is delivered. `None` for every
/// other command.
fn select_db_from(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut parts = text.split_whitespace();
    let cmd = parts.next()?;
    if !cmd.eq_ignore_ascii_case("select") {
        return None;
    }
    Some(parts.next()?.as_bytes().to_vec())
}
