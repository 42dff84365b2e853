//! Hidden-state navigation controller (spec §4.4).
//!
//! The navigator starts knowing neither its position nor its heading. It
//! infers both purely from movement acknowledgements, then drives toward the
//! origin with a fixed axis order (x first, then y), sidestepping obstacles
//! with a canonical bypass. This is deliberately not the repository's
//! shortest-path code — correctness and the bypass shape are what matter,
//! not optimality.

use std::collections::VecDeque;

use waypoint_proto::ServerMessage;

/// One of the four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// Increasing y.
    North,
    /// Increasing x.
    East,
    /// Decreasing y.
    South,
    /// Decreasing x.
    West,
}

impl Heading {
    fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    fn turn_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    fn turn_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Coordinate delta produced by one successful move in this heading.
    fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Infer the heading implied by a coordinate delta of exactly one cell
    /// along a single axis. Falls back to `North` for a delta the protocol
    /// guarantees cannot occur (anything but a unit step on one axis).
    fn from_delta(dx: i32, dy: i32) -> Self {
        match (dx, dy) {
            (0, 1) => Self::North,
            (1, 0) => Self::East,
            (0, -1) => Self::South,
            (-1, 0) => Self::West,
            _ => Self::North,
        }
    }
}

/// What the navigator is currently waiting to interpret an acknowledgement
/// as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// The very first move: its ack only establishes a starting coordinate,
    /// it has no success/failure meaning (there is no prior position to
    /// compare against).
    Bootstrap,
    /// A forward move issued while heading is still unknown.
    ProbeMove,
    /// A `TURN RIGHT` issued after a blocked probe move; its ack carries no
    /// position information worth checking.
    ProbeTurn,
    /// A queued forward move (normal cruise or bypass leg).
    PlannedMove,
    /// A queued turn; `resulting` is the heading it puts us in.
    PlannedTurn { resulting: Heading },
}

/// A single queued step plus how its ack should be interpreted.
struct QueuedStep {
    command: ServerMessage,
    pending: Pending,
}

/// Outcome of feeding the navigator a movement acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorStep {
    /// Issue this command next.
    Command(ServerMessage),
    /// The origin has been reached; the caller should issue `GET MESSAGE`.
    Arrived,
    /// The step or obstacle budget has been exhausted without reaching the
    /// origin; the caller should close the connection without sending
    /// anything further.
    Exhausted,
}

/// Robot-navigation controller.
pub struct Navigator {
    position: Option<(i32, i32)>,
    heading: Option<Heading>,
    steps_remaining: u32,
    obstacle_hits: u32,
    max_obstacle_hits: u32,
    queue: VecDeque<QueuedStep>,
    pending: Pending,
}

impl Navigator {
    /// Create a new navigator with the given step and obstacle budgets.
    #[must_use]
    pub fn new(max_steps: u32, max_obstacle_hits: u32) -> Self {
        Self {
            position: None,
            heading: None,
            steps_remaining: max_steps,
            obstacle_hits: 0,
            max_obstacle_hits,
            queue: VecDeque::new(),
            pending: Pending::Bootstrap,
        }
    }

    /// The first command to issue, before any acknowledgement has been
    /// received.
    #[must_use]
    pub fn start(&mut self) -> ServerMessage {
        debug_assert!(self.position.is_none());
        self.pending = Pending::Bootstrap;
        ServerMessage::Move
    }

    /// Known position, once at least one ack has been parsed.
    #[must_use]
    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    /// Inferred heading, once established.
    #[must_use]
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Remaining forward-move budget.
    #[must_use]
    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    /// Count of failed forward moves so far.
    #[must_use]
    pub fn obstacle_hits(&self) -> u32 {
        self.obstacle_hits
    }

    /// Feed a movement acknowledgement `(x, y)` and obtain the next step.
    pub fn handle_ok(&mut self, x: i32, y: i32) -> NavigatorStep {
        match self.pending {
            Pending::Bootstrap => self.handle_bootstrap(x, y),
            Pending::ProbeMove => self.handle_probe_move(x, y),
            Pending::ProbeTurn => self.handle_probe_turn(),
            Pending::PlannedMove => self.handle_planned_move(x, y),
            Pending::PlannedTurn { resulting } => self.handle_planned_turn(resulting),
        }
    }

    fn handle_bootstrap(&mut self, x: i32, y: i32) -> NavigatorStep {
        self.position = Some((x, y));
        self.pending = Pending::ProbeMove;
        NavigatorStep::Command(ServerMessage::Move)
    }

    fn handle_probe_move(&mut self, x: i32, y: i32) -> NavigatorStep {
        let prev = self.position.unwrap_or((x, y));

        if (x, y) == prev {
            return self.register_obstacle_during_probe();
        }

        if let Some(step) = self.apply_successful_move(prev, (x, y)) {
            return step;
        }

        self.heading = Some(Heading::from_delta(x - prev.0, y - prev.1));
        self.begin_cruise_cycle()
    }

    fn handle_probe_turn(&mut self) -> NavigatorStep {
        self.pending = Pending::ProbeMove;
        NavigatorStep::Command(ServerMessage::Move)
    }

    fn handle_planned_move(&mut self, x: i32, y: i32) -> NavigatorStep {
        let prev = self.position.unwrap_or((x, y));

        if (x, y) == prev {
            return self.register_obstacle_during_cruise();
        }

        if let Some(step) = self.apply_successful_move(prev, (x, y)) {
            return step;
        }

        self.advance_queue()
    }

    fn handle_planned_turn(&mut self, resulting: Heading) -> NavigatorStep {
        self.heading = Some(resulting);
        self.advance_queue()
    }

    /// Register a failed move while heading is still unknown: turn right
    /// and try again.
    fn register_obstacle_during_probe(&mut self) -> NavigatorStep {
        self.obstacle_hits += 1;
        if self.obstacle_hits > self.max_obstacle_hits {
            return NavigatorStep::Exhausted;
        }
        self.pending = Pending::ProbeTurn;
        NavigatorStep::Command(ServerMessage::TurnRight)
    }

    /// Register a failed move once cruising: run the canonical bypass.
    fn register_obstacle_during_cruise(&mut self) -> NavigatorStep {
        self.obstacle_hits += 1;
        if self.obstacle_hits > self.max_obstacle_hits {
            return NavigatorStep::Exhausted;
        }
        self.queue = self.bypass_queue();
        self.advance_queue()
    }

    /// Apply a successful move's position/step-budget bookkeeping, returning
    /// `Some` if navigation ends here (arrival or exhaustion), `None` if the
    /// caller should keep planning.
    fn apply_successful_move(
        &mut self,
        prev: (i32, i32),
        new_pos: (i32, i32),
    ) -> Option<NavigatorStep> {
        debug_assert_ne!(prev, new_pos);
        self.position = Some(new_pos);
        self.steps_remaining = self.steps_remaining.saturating_sub(1);

        if new_pos == (0, 0) {
            return Some(NavigatorStep::Arrived);
        }
        if self.steps_remaining == 0 {
            return Some(NavigatorStep::Exhausted);
        }
        None
    }

    /// Heading is now known: plan and issue the first step of the first
    /// cruise cycle.
    fn begin_cruise_cycle(&mut self) -> NavigatorStep {
        self.queue = self.plan_cruise_cycle();
        self.advance_queue()
    }

    /// Pop and issue the next queued step, replanning a fresh cruise cycle
    /// if the queue is empty.
    fn advance_queue(&mut self) -> NavigatorStep {
        if self.queue.is_empty() {
            self.queue = self.plan_cruise_cycle();
        }

        let Some(step) = self.queue.pop_front() else {
            // plan_cruise_cycle only returns empty when already at the
            // origin, which apply_successful_move already reports as
            // Arrived before we get here.
            return NavigatorStep::Arrived;
        };

        self.pending = step.pending;
        NavigatorStep::Command(step.command)
    }

    /// Plan one orient-then-move cycle toward the origin using the fixed
    /// x-then-y axis order.
    fn plan_cruise_cycle(&self) -> VecDeque<QueuedStep> {
        let position = self.position.unwrap_or((0, 0));
        let heading = self.heading.unwrap_or(Heading::North);

        let Some(desired) = desired_heading(position) else {
            return VecDeque::new();
        };

        let mut queue = VecDeque::new();
        queue_orientation(&mut queue, heading, desired);
        queue.push_back(QueuedStep { command: ServerMessage::Move, pending: Pending::PlannedMove });
        queue
    }

    /// Build the seven-step canonical bypass: route one cell perpendicular,
    /// advance, rejoin — ending back in the original heading.
    fn bypass_queue(&self) -> VecDeque<QueuedStep> {
        let heading = self.heading.unwrap_or(Heading::North);
        let mut queue = VecDeque::new();

        let h1 = heading.turn_right();
        queue
            .push_back(QueuedStep { command: ServerMessage::TurnRight, pending: Pending::PlannedTurn { resulting: h1 } });
        queue.push_back(QueuedStep { command: ServerMessage::Move, pending: Pending::PlannedMove });

        let h2 = h1.turn_left();
        queue
            .push_back(QueuedStep { command: ServerMessage::TurnLeft, pending: Pending::PlannedTurn { resulting: h2 } });
        queue.push_back(QueuedStep { command: ServerMessage::Move, pending: Pending::PlannedMove });

        let h3 = h2.turn_left();
        queue
            .push_back(QueuedStep { command: ServerMessage::TurnLeft, pending: Pending::PlannedTurn { resulting: h3 } });
        queue.push_back(QueuedStep { command: ServerMessage::Move, pending: Pending::PlannedMove });

        let h4 = h3.turn_right();
        debug_assert_eq!(h4.index(), heading.index());
        queue
            .push_back(QueuedStep { command: ServerMessage::TurnRight, pending: Pending::PlannedTurn { resulting: h4 } });

        queue
    }
}

/// The cardinal direction to face to make progress toward the origin under
/// the x-then-y axis order, or `None` if already at the origin.
fn desired_heading(position: (i32, i32)) -> Option<Heading> {
    let (x, y) = position;
    if x > 0 {
        Some(Heading::West)
    } else if x < 0 {
        Some(Heading::East)
    } else if y > 0 {
        Some(Heading::South)
    } else if y < 0 {
        Some(Heading::North)
    } else {
        None
    }
}

/// Enqueue the minimum-turn sequence from `current` to `desired`: zero
/// turns, one turn, or two `TURN RIGHT`s for a full reversal.
fn queue_orientation(queue: &mut VecDeque<QueuedStep>, current: Heading, desired: Heading) {
    let diff = (desired.index() + 4 - current.index()) % 4;
    match diff {
        0 => {},
        1 => queue.push_back(QueuedStep {
            command: ServerMessage::TurnRight,
            pending: Pending::PlannedTurn { resulting: current.turn_right() },
        }),
        3 => queue.push_back(QueuedStep {
            command: ServerMessage::TurnLeft,
            pending: Pending::PlannedTurn { resulting: current.turn_left() },
        }),
        _ => {
            let once = current.turn_right();
            let twice = once.turn_right();
            queue.push_back(QueuedStep {
                command: ServerMessage::TurnRight,
                pending: Pending::PlannedTurn { resulting: once },
            });
            queue.push_back(QueuedStep {
                command: ServerMessage::TurnRight,
                pending: Pending::PlannedTurn { resulting: twice },
            });
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_straight_path(mut nav: Navigator, path: &[(i32, i32)]) -> NavigatorStep {
        assert_eq!(nav.start(), ServerMessage::Move);
        let mut last = NavigatorStep::Command(ServerMessage::Move);
        for &(x, y) in path {
            last = nav.handle_ok(x, y);
        }
        last
    }

    #[test]
    fn establishes_heading_from_second_move() {
        let mut nav = Navigator::new(100, 20);
        assert_eq!(nav.start(), ServerMessage::Move);
        assert_eq!(nav.handle_ok(5, 5), NavigatorStep::Command(ServerMessage::Move));
        assert_eq!(nav.handle_ok(6, 5), NavigatorStep::Command(ServerMessage::Move));
        assert_eq!(nav.heading(), Some(Heading::East));
        assert_eq!(nav.position(), Some((6, 5)));
        assert_eq!(nav.steps_remaining(), 99);
    }

    #[test]
    fn obstacle_on_first_probe_move_turns_right_and_retries() {
        let mut nav = Navigator::new(100, 20);
        nav.start();
        nav.handle_ok(5, 5); // p0
        assert_eq!(nav.handle_ok(5, 5), NavigatorStep::Command(ServerMessage::TurnRight));
        assert_eq!(nav.obstacle_hits(), 1);
        assert_eq!(nav.handle_ok(5, 5), NavigatorStep::Command(ServerMessage::Move));
        assert_eq!(nav.handle_ok(5, 4), NavigatorStep::Command(ServerMessage::Move));
        assert_eq!(nav.heading(), Some(Heading::South));
    }

    #[test]
    fn reaches_origin_along_x_then_y() {
        let nav = Navigator::new(100, 20);
        // p0 = (2, 3); probe move establishes heading East at (3, 3).
        let outcome = drive_straight_path(
            nav,
            &[(2, 3), (3, 3), (2, 3), (1, 3), (0, 3), (0, 2), (0, 1), (0, 0)],
        );
        assert_eq!(outcome, NavigatorStep::Arrived);
    }

    #[test]
    fn exhausts_when_step_budget_runs_out_before_origin() {
        let mut nav = Navigator::new(2, 20);
        nav.start();
        nav.handle_ok(10, 0); // p0, uncounted
        let after_probe = nav.handle_ok(9, 0); // heading West, steps_remaining -> 1
        assert_eq!(after_probe, NavigatorStep::Command(ServerMessage::Move));
        let exhausted = nav.handle_ok(8, 0); // steps_remaining -> 0, not at origin
        assert_eq!(exhausted, NavigatorStep::Exhausted);
    }

    #[test]
    fn arrival_takes_priority_over_exhaustion_at_zero_steps() {
        let mut nav = Navigator::new(2, 20);
        nav.start();
        nav.handle_ok(1, 0); // p0, uncounted
        nav.handle_ok(0, 0); // heading West, steps_remaining -> 1, arrives immediately
        // The second handle_ok already lands on the origin.
        let mut nav = Navigator::new(1, 20);
        nav.start();
        nav.handle_ok(1, 0);
        let outcome = nav.handle_ok(0, 0);
        assert_eq!(outcome, NavigatorStep::Arrived);
    }

    #[test]
    fn exhausts_when_obstacle_budget_exceeded() {
        let mut nav = Navigator::new(100, 2);
        nav.start();
        nav.handle_ok(5, 5);
        assert_eq!(nav.handle_ok(5, 5), NavigatorStep::Command(ServerMessage::TurnRight));
        nav.handle_ok(5, 5); // retry move
        assert_eq!(nav.handle_ok(5, 5), NavigatorStep::Command(ServerMessage::TurnRight));
        nav.handle_ok(5, 5); // retry move
        let outcome = nav.handle_ok(5, 5);
        assert_eq!(outcome, NavigatorStep::Exhausted);
    }

    #[test]
    fn bypass_returns_to_original_heading() {
        let mut nav = Navigator::new(100, 20);
        nav.start();
        nav.handle_ok(5, 5);
        nav.handle_ok(6, 5); // heading East at (6,5)
        assert_eq!(nav.heading(), Some(Heading::East));

        // Next planned move hits an obstacle straight ahead at (7,5).
        let step = nav.handle_ok(6, 5);
        assert_eq!(step, NavigatorStep::Command(ServerMessage::TurnRight));

        // Drive through the rest of the bypass sequence.
        let mut last = step;
        let acks = [(6, 4), (6, 4), (5, 4), (5, 4), (5, 5), (5, 5)];
        for (x, y) in acks {
            last = nav.handle_ok(x, y);
        }
        assert!(matches!(last, NavigatorStep::Command(_)));
        assert_eq!(nav.heading(), Some(Heading::East));
    }

    #[test]
    fn turning_right_four_times_returns_to_original_heading() {
        let h = Heading::North;
        assert_eq!(h.turn_right().turn_right().turn_right().turn_right(), h);
        assert_eq!(h.turn_left().turn_left().turn_left().turn_left(), h);
    }
}
