//! Production runtime for the waypoint robot protocol: TCP accept loop,
//! per-connection tasks, configuration loading, and logging.
//!
//! The protocol core lives in `waypoint-core` and `waypoint-proto`; this
//! crate only adds I/O around it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config_file;
pub mod connection;
pub mod error;
pub mod system_env;

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use waypoint_core::{Environment, ServerConfig};

pub use error::ServerError;
pub use system_env::SystemEnv;

/// Grace period the accept loop waits for in-flight sessions to finish
/// sending before they are abandoned at shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Bind a listener and serve connections until `shutdown` resolves.
///
/// Each accepted connection is spawned onto its own task
/// ([`connection::run_session`]); sessions share nothing but the read-only
/// `config` (spec §5).
pub async fn serve(
    bind: &str,
    config: Arc<ServerConfig>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind { addr: bind.to_string(), source })?;

    tracing::info!(addr = %bind, "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let Ok((stream, peer)) = accepted else { continue };
                let config = Arc::clone(&config);
                let env = SystemEnv::new();
                tokio::spawn(async move {
                    connection::run_session(stream, peer, config, env).await;
                });
            }
            _ = shutdown.changed() => {
                tracing::info!("shutdown requested, draining sessions");
                SystemEnv::new().sleep(SHUTDOWN_GRACE).await;
                break;
            }
        }
    }

    Ok(())
}
