//! Minimal line-oriented client helpers for driving a simulated robot
//! against a [`waypoint_server::connection::run_session`] instance under
//! turmoil.
//!
//! These are deliberately dumb: no framing reuse, no retries. Tests should
//! be able to tell at a glance what bytes went over the wire. Every
//! function returns `io::Result` rather than panicking directly — this is
//! library code, not a `#[test]` function, so it propagates failures with
//! `?` and lets the calling test's own assertions do the panicking.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use turmoil::net::TcpStream;

/// Send `body` followed by `terminator`.
pub async fn send(stream: &mut TcpStream, body: &[u8], terminator: &[u8]) -> io::Result<()> {
    stream.write_all(body).await?;
    stream.write_all(terminator).await
}

/// Read until `terminator` is seen, returning the payload with the
/// terminator stripped. Returns an error if the connection closes first —
/// tests that expect a close should use [`read_until_closed`] instead.
pub async fn recv(stream: &mut TcpStream, terminator: &[u8]) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        if let Some(pos) = find_terminator(&buf, terminator) {
            return Ok(buf[..pos].to_vec());
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before terminator arrived",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Read until EOF, returning everything the peer sent after the caller's
/// last [`recv`]. Tests typically assert this is empty (a silent close).
pub async fn read_until_closed(stream: &mut TcpStream) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

fn find_terminator(buf: &[u8], terminator: &[u8]) -> Option<usize> {
    buf.windows(terminator.len()).position(|window| window == terminator)
}
