// ABOUTME: Owns the TCP socket and assembles raw bytes into complete replies
// ABOUTME: Switches between line-mode and byte-counted reads as bulk headers demand

use crate::error::RedisError;
use crate::parser::{self, ParseEvent};
use crate::reply::Reply;
use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{instrument, trace};

/// Where the reply-assembly loop currently stands.
///
/// `Empty` and `Read` behave identically here — both simply mean "the next
/// line is dispatched by its sigil" — but are kept as distinct states to
/// mirror the state machine this connection implements: `Empty` is the
/// state before any reply has started, `Read` is mid multi-bulk
/// accumulation. `Error` is the one state that changes parsing behavior,
/// since it routes the next line straight to the error-text arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PState {
    Empty,
    Read,
    Error,
}

/// The read half of a connection: buffers bytes and assembles them into
/// complete [`Reply`] values.
///
/// Split out from [`Connection`] so the actor can own reading and writing
/// on two independent tasks — a reply can take arbitrarily long to arrive
/// without blocking new commands from being written in the meantime.
#[derive(Debug)]
pub struct ReplyReader {
    stream: OwnedReadHalf,
    buffer: BytesMut,
}

impl ReplyReader {
    fn new(stream: OwnedReadHalf) -> ReplyReader {
        ReplyReader {
            stream,
            // Most replies fit comfortably under this; a single bulk body
            // larger than it just drives more `fill_buf` round trips.
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    async fn fill_buf(&mut self) -> Result<(), RedisError> {
        if 0 == self.stream.read_buf(&mut self.buffer).await? {
            return Err(RedisError::Closed);
        }
        Ok(())
    }

    /// Reads one CRLF-terminated line, with the terminator stripped.
    async fn read_line(&mut self) -> Result<Vec<u8>, RedisError> {
        loop {
            if let Some(pos) = find_crlf(&self.buffer) {
                let line = self.buffer.split_to(pos).to_vec();
                self.buffer.advance(2);
                return Ok(line);
            }
            self.fill_buf().await?;
        }
    }

    /// Reads exactly `n` bytes of bulk body, followed by its trailing CRLF.
    async fn read_counted(&mut self, n: usize) -> Result<Bytes, RedisError> {
        while self.buffer.len() < n + 2 {
            self.fill_buf().await?;
        }
        let body = self.buffer.split_to(n).freeze();
        self.buffer.advance(2);
        Ok(body)
    }

    /// Reads and assembles exactly one complete reply from the stream.
    ///
    /// A multi-bulk header puts the loop into accumulation mode, collecting
    /// `Bulk`/`Nil` elements until the declared count is reached; every
    /// other header is itself the whole reply. Elements are appended to
    /// `elements` as they're read regardless of position, so a nil in the
    /// middle of a multi-bulk (e.g. one missing key in an `MGET`) doesn't
    /// truncate the reply early.
    #[instrument(level = "trace", skip(self))]
    pub async fn read_reply(&mut self) -> Result<Reply, RedisError> {
        let mut pstate = PState::Empty;
        let mut remaining: usize = 1;
        let mut elements: Vec<Reply> = Vec::new();
        let mut is_multi = false;

        loop {
            let line = self.read_line().await?;
            let event = parser::parse_line(pstate == PState::Error, &line)?;
            trace!(?pstate, remaining, ?event, "frame dispatched");

            let value = match event {
                ParseEvent::ErrorHeader => {
                    remaining = 1;
                    pstate = PState::Error;
                    continue;
                }
                ParseEvent::ErrorText(text) => Reply::Error(text),
                ParseEvent::HoldNil => return Ok(Reply::Nil),
                ParseEvent::HoldEmpty => return Ok(Reply::MultiBulk(Vec::new())),
                ParseEvent::HoldCount(n) => {
                    remaining = n;
                    pstate = PState::Read;
                    is_multi = true;
                    continue;
                }
                ParseEvent::ReadNil => Reply::Nil,
                ParseEvent::ReadEmpty => Reply::Bulk(Bytes::new()),
                ParseEvent::ReadCount(n) => Reply::Bulk(self.read_counted(n).await?),
                ParseEvent::Status(s) => Reply::Status(s),
                ParseEvent::Ok => Reply::Ok,
                ParseEvent::Integer(i) => Reply::Integer(i),
            };

            let left = remaining - 1;
            if left == 0 {
                if is_multi {
                    elements.push(value);
                    return Ok(Reply::MultiBulk(elements));
                }
                return Ok(value);
            }
            elements.push(value);
            remaining = left;
            pstate = PState::Read;
        }
    }
}

/// The write half of a connection: writes already-encoded commands.
#[derive(Debug)]
pub struct CommandWriter {
    stream: OwnedWriteHalf,
}

impl CommandWriter {
    fn new(stream: OwnedWriteHalf) -> CommandWriter {
        CommandWriter { stream }
    }

    /// Writes an already-encoded command to the socket and flushes it.
    pub async fn write_command(&mut self, bytes: &[u8]) -> Result<(), RedisError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Frame-based I/O over a single TCP connection.
///
/// A thin combination of [`ReplyReader`] and [`CommandWriter`], useful for
/// the connect-time handshake (replaying `SELECT`) where reading and
/// writing can stay sequential. Call [`Connection::into_split`] to hand
/// the two halves to the actor's independent read/write tasks.
#[derive(Debug)]
pub struct Connection {
    reader: ReplyReader,
    writer: CommandWriter,
}

impl Connection {
    pub fn new(socket: TcpStream) -> Connection {
        let (read_half, write_half) = socket.into_split();
        Connection {
            reader: ReplyReader::new(read_half),
            writer: CommandWriter::new(write_half),
        }
    }

    /// Opens a new TCP connection to `addr`.
    pub async fn connect(addr: &str) -> Result<Connection, RedisError> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        Ok(Connection::new(socket))
    }

    pub async fn write_command(&mut self, bytes: &[u8]) -> Result<(), RedisError> {
        self.writer.write_command(bytes).await
    }

    pub async fn read_reply(&mut self) -> Result<Reply, RedisError> {
        self.reader.read_reply().await
    }

    /// Splits into independent read and write halves for the actor's two
    /// concurrent loops.
    pub fn into_split(self) -> (ReplyReader, CommandWriter) {
        (self.reader, self.writer)
    }
}

fn find_crlf(buf: &BytesMut) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(TcpStream::connect(addr));
        let (server, _) = listener.accept().await.unwrap();
        let client = client.await.unwrap().unwrap();
        (Connection::new(client), server)
    }

    #[tokio::test]
    async fn reads_status_reply() {
        let (mut conn, mut server) = pair().await;
        server.write_all(b"+OK\r\n").await.unwrap();
        assert_eq!(conn.read_reply().await.unwrap(), Reply::Ok);
    }

    #[tokio::test]
    async fn reads_bulk_reply_split_across_socket_reads() {
        let (mut conn, mut server) = pair().await;
        server.write_all(b"$5\r\nhe").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        server.write_all(b"llo\r\n").await.unwrap();
        let reply = conn.read_reply().await.unwrap();
        assert_eq!(reply.as_bulk().unwrap().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn reads_error_reply() {
        let (mut conn, mut server) = pair().await;
        server
            .write_all(b"-ERR wrong number of arguments\r\n")
            .await
            .unwrap();
        let reply = conn.read_reply().await.unwrap();
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn reads_multi_bulk_with_nil_in_the_middle() {
        let (mut conn, mut server) = pair().await;
        server
            .write_all(b"*3\r\n$1\r\nA\r\n$-1\r\n$1\r\nC\r\n")
            .await
            .unwrap();
        let reply = conn.read_reply().await.unwrap();
        match reply {
            Reply::MultiBulk(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0].as_bulk().unwrap().as_ref(), b"A");
                assert!(items[1].is_nil());
                assert_eq!(items[2].as_bulk().unwrap().as_ref(), b"C");
            }
            other => panic!("expected multi-bulk, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reads_empty_multi_bulk() {
        let (mut conn, mut server) = pair().await;
        server.write_all(b"*0\r\n").await.unwrap();
        assert_eq!(conn.read_reply().await.unwrap(), Reply::MultiBulk(vec![]));
    }

    #[tokio::test]
    async fn reads_nil_multi_bulk() {
        let (mut conn, mut server) = pair().await;
        server.write_all(b"*-1\r\n").await.unwrap();
        assert_eq!(conn.read_reply().await.unwrap(), Reply::Nil);
    }

    #[tokio::test]
    async fn write_command_reaches_the_peer() {
        let (mut conn, mut server) = pair().await;
        conn.write_command(b"PING\r\n").await.unwrap();
        let mut buf = [0u8; 6];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"PING\r\n");
    }
}
