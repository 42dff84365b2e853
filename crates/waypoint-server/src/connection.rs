//! Per-connection read loop: the only place in this crate that touches a
//! socket.
//!
//! Each accepted connection gets its own [`Session`] and carry-over buffer
//! (spec §5: no shared mutable state between sessions) and runs to
//! completion independently of every other connection.

use std::{net::SocketAddr, sync::Arc};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use waypoint_core::{Environment, ServerConfig, Session, SessionAction};
use waypoint_proto::{ProtocolError, classify, classify_recharge, max_len_for, max_len_for_recharge, next_frame, FrameOutcome};

const READ_CHUNK: usize = 4096;

/// The outcome of waiting for the next framed message.
enum ReadOutcome {
    /// A complete message body (terminator already stripped).
    Frame(Vec<u8>),
    /// The governing read deadline elapsed.
    Timeout,
    /// The peer closed the connection or a transport error occurred.
    Closed,
    /// Framing failed (oversize or terminator placed past the limit).
    Syntax,
}

/// Drive one accepted connection to completion.
///
/// Generic over the transport so the same loop runs against a real
/// `tokio::net::TcpStream` in production and a `turmoil::net::TcpStream` in
/// deterministic simulation tests.
pub async fn run_session<S: AsyncRead + AsyncWrite + Unpin, E: Environment>(
    mut stream: S,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    env: E,
) {
    tracing::info!(%peer, "session accepted");

    let mut session = Session::new(config.clone());
    let mut carry_over: Vec<u8> = Vec::new();

    loop {
        let Some(max_len) = current_max_len(&session) else { break };

        match next_event(&mut stream, &mut carry_over, &config.terminator, max_len, session.read_timeout(), &env)
            .await
        {
            ReadOutcome::Frame(payload) => {
                tracing::debug!(%peer, len = payload.len(), "frame received");
                let actions = dispatch(&mut session, &payload);
                if !execute(&mut stream, actions, &peer).await {
                    break;
                }
            },
            ReadOutcome::Timeout => {
                tracing::debug!(%peer, "read timeout");
                let actions = session.fail_timeout();
                execute(&mut stream, actions, &peer).await;
                break;
            },
            ReadOutcome::Closed => {
                tracing::debug!(%peer, "connection closed by peer");
                break;
            },
            ReadOutcome::Syntax => {
                tracing::warn!(%peer, "syntax error");
                let actions = session.fail_syntax_error();
                execute(&mut stream, actions, &peer).await;
                break;
            },
        }

        if session.is_terminated() {
            break;
        }
    }

    log_termination(&session, &peer);
}

fn current_max_len(session: &Session) -> Option<usize> {
    if session.is_recharging() {
        return Some(max_len_for_recharge());
    }
    session.expected().map(max_len_for)
}

fn dispatch(session: &mut Session, payload: &[u8]) -> Vec<SessionAction> {
    if session.is_recharging() {
        return session.handle_recharge_event(classify_recharge(payload));
    }

    let Some(expected) = session.expected() else {
        return session.fail_syntax_error();
    };

    match classify(payload, expected) {
        Ok(message) => session.receive(message),
        Err(ProtocolError::Syntax { .. } | ProtocolError::KeyOutOfRange { .. }) => {
            session.fail_syntax_error()
        },
    }
}

/// Write every `Send` action to the socket in order; returns `false` if the
/// session should stop (a `Close` action was seen, or a write failed).
async fn execute<S: AsyncWrite + Unpin>(
    stream: &mut S,
    actions: Vec<SessionAction>,
    peer: &SocketAddr,
) -> bool {
    for action in actions {
        match action {
            SessionAction::Send(bytes) => {
                if let Err(err) = stream.write_all(&bytes).await {
                    tracing::debug!(%peer, %err, "write failed");
                    return false;
                }
            },
            SessionAction::Close => return false,
        }
    }
    true
}

/// Pull the next complete frame from the stream, reading more bytes into
/// `carry_over` as needed. The read deadline applies per read, per spec §5
/// ("timeout clock resets on every successfully received byte").
async fn next_event<S: AsyncRead + Unpin, E: Environment>(
    stream: &mut S,
    carry_over: &mut Vec<u8>,
    terminator: &[u8],
    max_len: usize,
    read_timeout: std::time::Duration,
    env: &E,
) -> ReadOutcome {
    loop {
        match next_frame(carry_over, terminator, max_len) {
            Ok(FrameOutcome::Frame(payload)) => return ReadOutcome::Frame(payload),
            Ok(FrameOutcome::Incomplete) => {},
            Err(ProtocolError::Syntax { .. } | ProtocolError::KeyOutOfRange { .. }) => {
                return ReadOutcome::Syntax;
            },
        }

        let mut chunk = [0u8; READ_CHUNK];
        tokio::select! {
            result = stream.read(&mut chunk) => {
                match result {
                    Ok(0) => return ReadOutcome::Closed,
                    Ok(n) => carry_over.extend_from_slice(&chunk[..n]),
                    Err(_) => return ReadOutcome::Closed,
                }
            }
            () = env.sleep(read_timeout) => return ReadOutcome::Timeout,
        }
    }
}

fn log_termination(session: &Session, peer: &SocketAddr) {
    match session.termination_reason() {
        None => tracing::info!(%peer, "session completed"),
        Some(reason) if reason.has_response() => tracing::warn!(%peer, %reason, "session terminated"),
        Some(reason) => tracing::debug!(%peer, %reason, "session terminated silently"),
    }
}
