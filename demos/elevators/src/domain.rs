//! The elevator game expressed as a tickwork [`Domain`].

use std::collections::BTreeMap;
use std::fmt;

use tw_behavior::{BehaviorKind, Domain, Snapshot};
use tw_core::{AgentId, EntityId, Tick};

// ── Game constants ────────────────────────────────────────────────────────────

/// Floors are numbered `1..=FLOORS`.
pub const FLOORS:                 u32   = 9;
pub const ELEVATORS_PER_PLAYER:   u32   = 4;
pub const PASSENGERS_MAX:         usize = 20;

pub const TICKS_PER_FLOOR:        u32 = 50;
pub const DOORS_OPEN_TICKS:       u32 = 100;
pub const DOORS_CLOSE_TICKS:      u32 = 100;
pub const WALK_TICKS:             u32 = 20;
pub const EXIT_TICKS:             u32 = 20;
/// A passenger left waiting this long takes the stairs.
pub const PATIENCE_TICKS:         u32 = 500;

/// Filling ticks before foreign passengers may be invited.
pub const DELAY_ENEMY_INVITATION: u64 = 40;
/// Filling ticks before an elevator may be sent anywhere.
pub const DELAY_OPERATION:        u64 = 40;

pub const SPAWN_EVERY:            u64 = 20;
pub const SPAWN_DURATION:         u64 = 2_000;

pub const FLOOR_COST:             u32 = 10;
pub const ENEMY_MULT:             u32 = 2;

// ── Values ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Floor(pub u32);

impl Floor {
    pub fn distance(self, other: Floor) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    First,
    Second,
}

impl Player {
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ElevatorState {
    Moving,
    Opening,
    Filling,
    Closing,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PassengerState {
    WaitingForElevator,
    MovingToElevator,
    Returning,
    MovingToFloor,
    UsingElevator,
    Exiting,
}

impl PassengerState {
    pub fn may_be_invited(self) -> bool {
        matches!(self, PassengerState::WaitingForElevator | PassengerState::Returning)
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Elevator {
    pub id:     AgentId,
    pub owner:  Player,
    pub floor:  Floor,
    pub state:  ElevatorState,
    pub riders: Vec<EntityId>,
}

impl Elevator {
    pub fn is_filling(&self) -> bool {
        self.state == ElevatorState::Filling
    }

    pub fn is_full(&self) -> bool {
        self.riders.len() >= PASSENGERS_MAX
    }
}

impl Snapshot for Elevator {
    type Id = AgentId;
    type State = ElevatorState;

    fn id(&self) -> AgentId {
        self.id
    }

    fn state(&self) -> ElevatorState {
        self.state
    }
}

#[derive(Clone, Debug)]
pub struct Passenger {
    pub id:       EntityId,
    pub owner:    Player,
    pub floor:    Floor,
    pub from:     Floor,
    pub dest:     Floor,
    pub state:    PassengerState,
    pub elevator: Option<AgentId>,
}

impl Passenger {
    pub fn travel_distance(&self) -> u32 {
        self.from.distance(self.dest)
    }

    /// `true` when heading up.
    pub fn goes_up(&self) -> bool {
        self.dest > self.from
    }

    pub fn is_moving_to(&self, elevator: AgentId) -> bool {
        self.state == PassengerState::MovingToElevator && self.elevator == Some(elevator)
    }

    /// Points `player` earns for delivering this passenger.
    pub fn score_for(&self, player: Player) -> u32 {
        let base = self.travel_distance() * FLOOR_COST;
        if self.owner == player { base } else { base * ENEMY_MULT }
    }
}

impl Snapshot for Passenger {
    type Id = EntityId;
    type State = PassengerState;

    fn id(&self) -> EntityId {
        self.id
    }

    fn state(&self) -> PassengerState {
        self.state
    }
}

// ── Behaviors ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Strategy {
    Ranking,
    Loading,
    Idle,
    Baseline,
}

impl BehaviorKind for Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::Ranking => "ranking",
            Strategy::Loading => "loading",
            Strategy::Idle => "idle",
            Strategy::Baseline => "baseline",
        }
    }
}

// ── Blackboard ────────────────────────────────────────────────────────────────

/// State shared by one player's controllers.
#[derive(Default, Debug)]
pub struct Board {
    /// Passenger → tick it was last invited.  Host snapshots only catch up
    /// a tick later, so two elevators must not invite the same passenger
    /// within one tick.
    reserved: BTreeMap<EntityId, Tick>,
    pub invitations: u32,
    pub departures:  u32,
}

impl Board {
    /// Claim `passenger` for this tick.  Returns `false` if another elevator
    /// already did.
    pub fn reserve(&mut self, passenger: EntityId, now: Tick) -> bool {
        if self.reserved.get(&passenger) == Some(&now) {
            return false;
        }
        self.reserved.insert(passenger, now);
        self.invitations += 1;
        true
    }

    pub fn is_reserved(&self, passenger: EntityId, now: Tick) -> bool {
        self.reserved.get(&passenger) == Some(&now)
    }
}

pub struct Game;

impl Domain for Game {
    type Agent = Elevator;
    type Entity = Passenger;
    type Position = Floor;
    type Behavior = Strategy;
    type Shared = Board;
}
