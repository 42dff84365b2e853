//! Authentication, navigation, and per-session state for the waypoint robot
//! protocol.
//!
//! This crate is transport- and time-agnostic: [`session::Session`] and
//! [`navigator::Navigator`] are pure action-returning state machines, and
//! [`env::Environment`] is the seam through which a driver supplies real or
//! simulated time. `waypoint-server` is the only crate that owns a socket.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod env;
pub mod error;
pub mod navigator;
pub mod session;

pub use auth::{KeyPair, KeyTable};
pub use config::ServerConfig;
pub use env::Environment;
pub use error::SessionError;
pub use navigator::{Heading, Navigator, NavigatorStep};
pub use session::{Phase, Session, SessionAction};
