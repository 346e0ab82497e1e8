// ABOUTME: Builds the inline-dialect wire bytes for outbound commands
// ABOUTME: scall/call/set_call/bcall as specified; all share the CRLF-row helper

use std::time::Duration;

/// Default server-side and caller-side timeout, in seconds, used by
/// [`bcall`] when the command doesn't need to wait longer than usual.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Caller-side safety margin added on top of the server timeout so a
/// caller never times out before the server could have.
const TIMEOUT_SAFETY_MARGIN: Duration = Duration::from_millis(500);

/// Encodes a single inline command: `cmd` followed by a space-joined row
/// of `args`, terminated by CRLF.
///
/// ```text
/// scall("PING", &[]) -> "PING\r\n"
/// scall("GET", &["key"]) -> "GET key\r\n"
/// ```
pub fn scall(cmd: &str, args: &[&str]) -> Vec<u8> {
    let mut out = Vec::with_capacity(cmd.len() + 16);
    write_row(&mut out, cmd, args);
    out
}

/// Encodes `cmd` followed by one CRLF-separated, space-joined row per
/// element of `rows`.
pub fn call(cmd: &str, rows: &[&[&str]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(cmd.len() + 16 * rows.len().max(1));
    out.extend_from_slice(cmd.as_bytes());
    out.extend_from_slice(b"\r\n");
    for row in rows {
        write_row(&mut out, "", row);
    }
    out
}

/// Encodes `cmd key <size-of-value>\r\n<value>\r\n`, the shape every
/// command carrying a binary payload (`SET` foremost) uses.
pub fn set_call(cmd: &str, key: &str, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(cmd.len() + key.len() + value.len() + 16);
    out.extend_from_slice(cmd.as_bytes());
    out.push(b' ');
    out.extend_from_slice(key.as_bytes());
    out.push(b' ');
    out.extend_from_slice(value.len().to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
    out
}

/// Encodes a blocking command, appending `timeout_secs` as the last
/// inline argument, and returns the bytes alongside the caller-side
/// timeout to race the reply against.
///
/// `timeout_secs == 0.0` means "wait forever" on the server; the caller
/// timeout in that case is `None`, since there is no finite server-side
/// bound to outlive.
pub fn bcall(cmd: &str, args: &[&str], timeout_secs: f64) -> (Vec<u8>, Option<Duration>) {
    let timeout_arg = format_timeout(timeout_secs);
    let mut owned_args: Vec<&str> = Vec::with_capacity(args.len() + 1);
    owned_args.extend_from_slice(args);
    owned_args.push(&timeout_arg);
    let bytes = scall(cmd, &owned_args);

    let caller_timeout = if timeout_secs == 0.0 {
        None
    } else {
        Some(Duration::from_secs_f64(timeout_secs.max(DEFAULT_TIMEOUT_SECS)) + TIMEOUT_SAFETY_MARGIN)
    };
    (bytes, caller_timeout)
}

fn format_timeout(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as i64)
    } else {
        format!("{secs}")
    }
}

fn write_row(out: &mut Vec<u8>, cmd: &str, args: &[&str]) {
    if !cmd.is_empty() {
        out.extend_from_slice(cmd.as_bytes());
        if !args.is_empty() {
            out.push(b' ');
        }
    }
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(arg.as_bytes());
    }
    out.extend_from_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scall_with_no_args() {
        assert_eq!(scall("PING", &[]), b"PING\r\n");
    }

    #[test]
    fn scall_joins_args_with_spaces() {
        assert_eq!(scall("GET", &["key"]), b"GET key\r\n");
        assert_eq!(scall("MSET", &["a", "1", "b", "2"]), b"MSET a 1 b 2\r\n");
    }

    #[test]
    fn call_writes_one_row_per_element() {
        let rows: &[&[&str]] = &[&["a", "1"], &["b", "2"]];
        assert_eq!(call("MULTI-ROW", rows), b"MULTI-ROW\r\na 1\r\nb 2\r\n");
    }

    #[test]
    fn set_call_frames_the_value_by_length() {
        assert_eq!(
            set_call("SET", "greeting", b"hello"),
            b"SET greeting 5\r\nhello\r\n"
        );
    }

    #[test]
    fn bcall_appends_integer_timeout_and_derives_caller_timeout() {
        let (bytes, timeout) = bcall("BLPOP", &["queue"], 10.0);
        assert_eq!(bytes, b"BLPOP queue 10\r\n");
        assert_eq!(timeout, Some(Duration::from_millis(10_500)));
    }

    #[test]
    fn bcall_zero_timeout_waits_forever_with_no_caller_bound() {
        let (bytes, timeout) = bcall("BLPOP", &["queue"], 0.0);
        assert_eq!(bytes, b"BLPOP queue 0\r\n");
        assert_eq!(timeout, None);
    }

    #[test]
    fn bcall_short_server_timeout_still_gets_the_default_floor() {
        let (_, timeout) = bcall("BLPOP", &["queue"], 1.0);
        assert_eq!(timeout, Some(Duration::from_millis(5_500)));
    }
}
