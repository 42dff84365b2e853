//! The two read-timeout regimes, exercised with turmoil's virtual clock so
//! the test runs instantly regardless of the configured durations.

use std::{sync::Arc, time::Duration};

use turmoil::{Builder, net::TcpStream};
use waypoint_core::{ServerConfig, auth::KeyPair};
use waypoint_harness::{SimEnv, robot};
use waypoint_proto::DEFAULT_TERMINATOR;

fn config() -> Arc<ServerConfig> {
    let mut config = ServerConfig::default();
    config.keys = std::iter::once(KeyPair { server: 0, client: 0 }).collect();
    config.timeout = Duration::from_secs(1);
    config.timeout_recharging = Duration::from_secs(5);
    Arc::new(config)
}

#[test]
fn idle_connection_is_closed_silently_after_the_ordinary_timeout() {
    let mut sim = Builder::new().build();
    let cfg = config();

    sim.host("server", move || {
        let cfg = Arc::clone(&cfg);
        async move {
            let listener = turmoil::net::TcpListener::bind("0.0.0.0:9999").await?;
            let (stream, peer) = listener.accept().await?;
            waypoint_server::connection::run_session(stream, peer, cfg, SimEnv::new()).await;
            Ok(())
        }
    });

    sim.client("robot", async {
        let mut stream = TcpStream::connect("server:9999").await?;
        robot::send(&mut stream, b"robot", DEFAULT_TERMINATOR).await?;
        assert_eq!(robot::recv(&mut stream, DEFAULT_TERMINATOR).await?, b"107 KEY REQUEST");

        // Go idle well past the 1s read timeout without sending a key id.
        tokio::time::sleep(Duration::from_secs(3)).await;

        // No response: a timeout is a silent close, not a protocol error.
        assert_eq!(robot::read_until_closed(&mut stream).await?, b"");

        Ok(())
    });

    sim.run().unwrap();
}

#[test]
fn recharge_wait_exceeding_its_own_timeout_also_closes_silently() {
    let mut sim = Builder::new().build();
    let cfg = config();

    sim.host("server", move || {
        let cfg = Arc::clone(&cfg);
        async move {
            let listener = turmoil::net::TcpListener::bind("0.0.0.0:9999").await?;
            let (stream, peer) = listener.accept().await?;
            waypoint_server::connection::run_session(stream, peer, cfg, SimEnv::new()).await;
            Ok(())
        }
    });

    sim.client("robot", async {
        let mut stream = TcpStream::connect("server:9999").await?;
        robot::send(&mut stream, b"robot", DEFAULT_TERMINATOR).await?;
        robot::recv(&mut stream, DEFAULT_TERMINATOR).await?;
        robot::send(&mut stream, b"0", DEFAULT_TERMINATOR).await?;
        robot::recv(&mut stream, DEFAULT_TERMINATOR).await?;
        let hash = waypoint_core::auth::username_hash(b"robot");
        robot::send(&mut stream, hash.to_string().as_bytes(), DEFAULT_TERMINATOR).await?;
        robot::recv(&mut stream, DEFAULT_TERMINATOR).await?; // 200 OK
        robot::recv(&mut stream, DEFAULT_TERMINATOR).await?; // 102 MOVE

        robot::send(&mut stream, b"RECHARGING", DEFAULT_TERMINATOR).await?;

        // Exceed the 5s recharge timeout without sending FULL POWER.
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(robot::read_until_closed(&mut stream).await?, b"");

        Ok(())
    });

    sim.run().unwrap();
}
