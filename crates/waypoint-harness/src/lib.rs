//! Deterministic simulation harness for the waypoint server, built on
//! turmoil.
//!
//! Tests in this crate drive the exact production connection loop
//! (`waypoint_server::connection::run_session`) against turmoil's virtual
//! network and virtual clock, so timing-sensitive behavior (the two
//! timeout regimes, recharge pauses, split/coalesced reads) is exercised
//! without real wall-clock delay and without flakiness.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod robot;
pub mod sim_env;

pub use sim_env::SimEnv;
