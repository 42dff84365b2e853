//! Per-connection state machine (spec §4.5, §4.6).
//!
//! Like the navigator, this is a pure action-returning machine: methods take
//! an already-framed, already-classified client message and return the
//! actions a driver must perform (send bytes, close the socket). It never
//! touches a socket or a clock itself — the governing read timeout for the
//! *next* read is exposed via [`Session::read_timeout`] so the driver can
//! apply it with its own `Environment`.

use std::sync::Arc;

use waypoint_proto::{ClientMessage, Expected, RechargeEvent, ServerMessage, validate_key_id};

use crate::{
    auth,
    config::ServerConfig,
    error::SessionError,
    navigator::{Navigator, NavigatorStep},
};

/// Tagged session state (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the robot's username.
    AwaitingUsername,
    /// Waiting for a Key ID selection.
    AwaitingKeyId,
    /// Waiting for the client's confirmation number.
    AwaitingClientConfirm,
    /// Authenticated; driving the robot toward the origin.
    Navigating,
    /// At the origin; waiting for the secret payload.
    AwaitingSecret,
    /// Session over; no further messages are expected.
    Terminated,
}

/// An action a driver must perform on behalf of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write these bytes (terminator already appended) to the socket.
    Send(Vec<u8>),
    /// Close the socket; no further actions follow in this batch.
    Close,
}

/// A single robot's connection state.
pub struct Session {
    config: Arc<ServerConfig>,
    phase: Phase,
    username_hash: Option<u16>,
    key_id: Option<usize>,
    navigator: Navigator,
    recharging: bool,
    resume_phase: Option<Phase>,
    termination_reason: Option<SessionError>,
}

impl Session {
    /// Start a new session in [`Phase::AwaitingUsername`].
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let navigator = Navigator::new(config.max_steps, config.max_obstacle_hits);
        Self {
            config,
            phase: Phase::AwaitingUsername,
            username_hash: None,
            key_id: None,
            navigator,
            recharging: false,
            resume_phase: None,
            termination_reason: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a session-ending condition has been reached.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Why the session ended, once it has.
    #[must_use]
    pub fn termination_reason(&self) -> Option<SessionError> {
        self.termination_reason
    }

    /// Whether a recharge is currently in progress.
    #[must_use]
    pub fn is_recharging(&self) -> bool {
        self.recharging
    }

    /// The message kind the caller should validate the next payload
    /// against, given the current phase. `None` once terminated.
    #[must_use]
    pub fn expected(&self) -> Option<Expected> {
        match self.phase {
            Phase::AwaitingUsername => Some(Expected::Username),
            Phase::AwaitingKeyId => Some(Expected::KeyId),
            Phase::AwaitingClientConfirm => Some(Expected::Confirmation),
            Phase::Navigating => Some(Expected::Ok),
            Phase::AwaitingSecret => Some(Expected::Secret),
            Phase::Terminated => None,
        }
    }

    /// The inactivity bound that governs the next read.
    #[must_use]
    pub fn read_timeout(&self) -> std::time::Duration {
        if self.recharging { self.config.timeout_recharging } else { self.config.timeout }
    }

    /// Feed a successfully classified client message in to the state
    /// machine. `message` must have been classified against
    /// [`Session::expected`]; a [`ClientMessage::Recharging`] or
    /// [`ClientMessage::FullPower`] is handled regardless of phase, per the
    /// recharge overlay.
    ///
    /// Must not be called while [`Session::is_recharging`] is true — use
    /// [`Session::handle_recharge_event`] instead.
    pub fn receive(&mut self, message: ClientMessage) -> Vec<SessionAction> {
        debug_assert!(!self.recharging);

        match message {
            ClientMessage::Recharging => self.enter_recharge(),
            ClientMessage::FullPower => self.terminate(SessionError::LogicError, ServerMessage::LogicError),
            _ => self.receive_phase_message(message),
        }
    }

    /// Handle a payload received while recharging, already classified by
    /// [`waypoint_proto::classify_recharge`].
    pub fn handle_recharge_event(&mut self, event: RechargeEvent) -> Vec<SessionAction> {
        debug_assert!(self.recharging);
        match event {
            RechargeEvent::FullPower => self.resume_from_recharge(),
            RechargeEvent::Other => {
                self.terminate(SessionError::LogicError, ServerMessage::LogicError)
            },
        }
    }

    /// Handle a framing or validation failure for the current read.
    pub fn fail_syntax_error(&mut self) -> Vec<SessionAction> {
        self.terminate(SessionError::SyntaxError, ServerMessage::SyntaxError)
    }

    /// Handle a read timeout: close silently, no response.
    pub fn fail_timeout(&mut self) -> Vec<SessionAction> {
        self.phase = Phase::Terminated;
        self.termination_reason = Some(SessionError::Exhausted);
        vec![SessionAction::Close]
    }

    fn enter_recharge(&mut self) -> Vec<SessionAction> {
        self.recharging = true;
        self.resume_phase = Some(self.phase);
        Vec::new()
    }

    fn resume_from_recharge(&mut self) -> Vec<SessionAction> {
        self.recharging = false;
        self.phase = self.resume_phase.take().unwrap_or(self.phase);
        Vec::new()
    }

    fn receive_phase_message(&mut self, message: ClientMessage) -> Vec<SessionAction> {
        match (self.phase, message) {
            (Phase::AwaitingUsername, ClientMessage::Username(username)) => {
                self.username_hash = Some(auth::username_hash(&username));
                self.phase = Phase::AwaitingKeyId;
                self.send(ServerMessage::KeyRequest)
            },
            (Phase::AwaitingKeyId, ClientMessage::KeyId(key_id)) => self.handle_key_id(key_id),
            (Phase::AwaitingClientConfirm, ClientMessage::Confirmation(confirmation)) => {
                self.handle_confirmation(confirmation)
            },
            (Phase::Navigating, ClientMessage::Ok { x, y }) => self.handle_navigation_ok(x, y),
            (Phase::AwaitingSecret, ClientMessage::Secret(_)) => {
                self.phase = Phase::Terminated;
                self.termination_reason = None;
                let mut actions = self.send(ServerMessage::Logout);
                actions.push(SessionAction::Close);
                actions
            },
            // The validator only ever hands back a message shaped for the
            // phase it was asked to validate against, so this is
            // unreachable in practice; treat it as a syntax violation
            // defensively rather than panicking.
            _ => self.fail_syntax_error(),
        }
    }

    fn handle_key_id(&mut self, key_id: i64) -> Vec<SessionAction> {
        let Ok(index) = validate_key_id(key_id, self.config.keys.len()) else {
            return self.terminate(SessionError::KeyOutOfRange, ServerMessage::KeyOutOfRange);
        };
        let Some(key) = self.config.keys.get(index) else {
            return self.terminate(SessionError::KeyOutOfRange, ServerMessage::KeyOutOfRange);
        };
        let hash = self.username_hash.unwrap_or(0);
        let confirmation = auth::server_confirmation(hash, key);
        self.key_id = Some(index);
        self.phase = Phase::AwaitingClientConfirm;
        self.send(ServerMessage::ServerConfirmation(confirmation))
    }

    fn handle_confirmation(&mut self, confirmation: i64) -> Vec<SessionAction> {
        let Some(index) = self.key_id else {
            return self.fail_syntax_error();
        };
        let Some(key) = self.config.keys.get(index) else {
            return self.fail_syntax_error();
        };
        let hash = self.username_hash.unwrap_or(0);

        if auth::client_confirmation_matches(hash, key, confirmation) {
            self.phase = Phase::Navigating;
            let mut actions = self.send(ServerMessage::Ok);
            let first_command = self.navigator.start();
            actions.extend(self.send(first_command));
            actions
        } else {
            self.terminate(SessionError::LoginFailed, ServerMessage::LoginFailed)
        }
    }

    fn handle_navigation_ok(&mut self, x: i64, y: i64) -> Vec<SessionAction> {
        match self.navigator.handle_ok(clamp_to_i32(x), clamp_to_i32(y)) {
            NavigatorStep::Command(command) => self.send(command),
            NavigatorStep::Arrived => {
                self.phase = Phase::AwaitingSecret;
                self.send(ServerMessage::GetMessage)
            },
            NavigatorStep::Exhausted => {
                self.phase = Phase::Terminated;
                self.termination_reason = Some(SessionError::Exhausted);
                vec![SessionAction::Close]
            },
        }
    }

    fn terminate(&mut self, reason: SessionError, response: ServerMessage) -> Vec<SessionAction> {
        self.phase = Phase::Terminated;
        self.termination_reason = Some(reason);
        let mut actions = self.send(response);
        actions.push(SessionAction::Close);
        actions
    }

    fn send(&self, message: ServerMessage) -> Vec<SessionAction> {
        vec![SessionAction::Send(message.encode_with_terminator(&self.config.terminator))]
    }
}

/// The protocol's coordinates are parsed as `i64` (any decimal a client can
/// send), but the grid the navigator reasons over is bounded; saturate
/// rather than panic on a value outside `i32`.
fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
