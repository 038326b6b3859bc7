//! A small deterministic stand-in for the game server.
//!
//! Two players own four elevators each.  Passengers spawn in mirrored pairs
//! (one per player) on random floors, walk to the elevator that invites
//! them, ride, and leave.  Commands are checked the way the real server
//! would and silently dropped when invalid.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;
use tw_behavior::{Command, Frame};
use tw_core::{AgentId, EntityId};

use crate::domain::{
    DELAY_ENEMY_INVITATION, DELAY_OPERATION, DOORS_CLOSE_TICKS, DOORS_OPEN_TICKS, ELEVATORS_PER_PLAYER,
    EXIT_TICKS, Elevator, ElevatorState, FLOORS, Floor, Game, PATIENCE_TICKS, PASSENGERS_MAX, Passenger,
    PassengerState, Player, SPAWN_DURATION, SPAWN_EVERY, TICKS_PER_FLOOR, WALK_TICKS,
};

struct Car {
    snapshot:      Elevator,
    target:        Floor,
    countdown:     u32,
    filling_since: u64,
}

struct Walker {
    snapshot:  Passenger,
    countdown: u32,
    waited:    u32,
}

pub struct Building {
    tick:        u64,
    cars:        Vec<Car>,
    walkers:     BTreeMap<EntityId, Walker>,
    next_id:     u32,
    rng:         SmallRng,
    scores:      [u32; 2],
    delivered:   [u32; 2],
    transitions: Vec<(PassengerState, PassengerState)>,
}

impl Building {
    pub fn new(seed: u64) -> Self {
        let cars = [Player::First, Player::Second]
            .into_iter()
            .flat_map(|owner| (0..ELEVATORS_PER_PLAYER).map(move |i| (owner, i)))
            .enumerate()
            .map(|(n, (owner, _))| Car {
                snapshot: Elevator {
                    id:     AgentId(n as u32 + 1),
                    owner,
                    floor:  Floor(1),
                    state:  ElevatorState::Filling,
                    riders: Vec::new(),
                },
                target:        Floor(1),
                countdown:     0,
                filling_since: 0,
            })
            .collect();
        Self {
            tick: 1,
            cars,
            walkers: BTreeMap::new(),
            next_id: 1,
            rng: SmallRng::seed_from_u64(seed),
            scores: [0; 2],
            delivered: [0; 2],
            transitions: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The tick the next frame belongs to.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn delivered(&self, player: Player) -> u32 {
        self.delivered[player.index()]
    }

    /// Every passenger state change so far, in order.
    pub fn transitions(&self) -> &[(PassengerState, PassengerState)] {
        &self.transitions
    }

    pub fn elevators(&self) -> impl Iterator<Item = &Elevator> + '_ {
        self.cars.iter().map(|c| &c.snapshot)
    }

    /// Snapshots as seen by `player`.
    pub fn frame(&self, player: Player) -> Frame<Game> {
        let mut frame = Frame::default();
        for car in &self.cars {
            if car.snapshot.owner == player {
                frame.own_agents.push(car.snapshot.clone());
            } else {
                frame.foreign_agents.push(car.snapshot.clone());
            }
        }
        for walker in self.walkers.values() {
            if walker.snapshot.owner == player {
                frame.own_entities.push(walker.snapshot.clone());
            } else {
                frame.foreign_entities.push(walker.snapshot.clone());
            }
        }
        frame
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Apply `player`'s commands for the current tick.
    pub fn apply(&mut self, player: Player, commands: Vec<Command<Floor>>) {
        for command in commands {
            match command {
                Command::MoveTo { agent, position } => self.go_to_floor(player, agent, position),
                Command::Assign { entity, agent } => self.invite(player, entity, agent),
            }
        }
    }

    fn go_to_floor(&mut self, player: Player, agent: AgentId, floor: Floor) {
        let tick = self.tick;
        let Some(car) = self.cars.iter_mut().find(|c| c.snapshot.id == agent) else {
            return;
        };
        let valid = car.snapshot.owner == player
            && car.snapshot.is_filling()
            && tick - car.filling_since >= DELAY_OPERATION
            && (1..=FLOORS).contains(&floor.0)
            && floor != car.snapshot.floor;
        if !valid {
            trace!(%agent, %floor, "move rejected");
            return;
        }
        car.target = floor;
        car.snapshot.state = ElevatorState::Closing;
        car.countdown = DOORS_CLOSE_TICKS;
    }

    fn invite(&mut self, player: Player, entity: EntityId, agent: AgentId) {
        let tick = self.tick;
        let Some(car) = self.cars.iter().find(|c| c.snapshot.id == agent) else {
            return;
        };
        let Some(walker) = self.walkers.get_mut(&entity) else {
            return;
        };
        let p = &walker.snapshot;
        let valid = car.snapshot.owner == player
            && car.snapshot.is_filling()
            && !car.snapshot.is_full()
            && p.state.may_be_invited()
            && p.floor == car.snapshot.floor
            && (p.owner == player || tick - car.filling_since >= DELAY_ENEMY_INVITATION);
        if !valid {
            trace!(%entity, %agent, "invitation rejected");
            return;
        }
        walker.snapshot.elevator = Some(agent);
        walker.snapshot.state = PassengerState::MovingToElevator;
        walker.countdown = WALK_TICKS;
    }

    // ── Physics ───────────────────────────────────────────────────────────

    /// Advance the building by one tick.
    pub fn step(&mut self) {
        let tick = self.tick;
        let before: BTreeMap<EntityId, PassengerState> =
            self.walkers.iter().map(|(id, w)| (*id, w.snapshot.state)).collect();

        for car in &mut self.cars {
            step_car(car, tick, &mut self.walkers, &mut self.scores, &mut self.delivered);
        }

        let mut gone = Vec::new();
        for (id, walker) in &mut self.walkers {
            if step_walker(walker, &mut self.cars) {
                gone.push(*id);
            }
        }
        for id in gone {
            self.walkers.remove(&id);
        }

        for (id, walker) in &self.walkers {
            if let Some(&old) = before.get(id) {
                if old != walker.snapshot.state {
                    self.transitions.push((old, walker.snapshot.state));
                }
            }
        }

        if tick < SPAWN_DURATION && tick % SPAWN_EVERY == 0 {
            self.spawn_pair();
        }
        self.tick += 1;
    }

    fn spawn_pair(&mut self) {
        let from = self.rng.gen_range(1..=FLOORS);
        let mut dest = self.rng.gen_range(1..FLOORS);
        if dest >= from {
            dest += 1;
        }
        for owner in [Player::First, Player::Second] {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            let snapshot = Passenger {
                id,
                owner,
                floor: Floor(from),
                from: Floor(from),
                dest: Floor(dest),
                state: PassengerState::WaitingForElevator,
                elevator: None,
            };
            self.walkers.insert(id, Walker { snapshot, countdown: 0, waited: 0 });
        }
    }
}

fn step_car(
    car:       &mut Car,
    tick:      u64,
    walkers:   &mut BTreeMap<EntityId, Walker>,
    scores:    &mut [u32; 2],
    delivered: &mut [u32; 2],
) {
    let e = &mut car.snapshot;
    match e.state {
        ElevatorState::Closing => {
            car.countdown -= 1;
            if car.countdown == 0 {
                e.state = ElevatorState::Moving;
                car.countdown = TICKS_PER_FLOOR;
            }
        }
        ElevatorState::Moving => {
            car.countdown -= 1;
            if car.countdown == 0 {
                e.floor = if car.target > e.floor { Floor(e.floor.0 + 1) } else { Floor(e.floor.0 - 1) };
                for id in &e.riders {
                    if let Some(w) = walkers.get_mut(id) {
                        w.snapshot.floor = e.floor;
                    }
                }
                if e.floor == car.target {
                    e.state = ElevatorState::Opening;
                    car.countdown = DOORS_OPEN_TICKS;
                } else {
                    car.countdown = TICKS_PER_FLOOR;
                }
            }
        }
        ElevatorState::Opening => {
            car.countdown -= 1;
            if car.countdown == 0 {
                e.state = ElevatorState::Filling;
                car.filling_since = tick;
                let floor = e.floor;
                let owner = e.owner;
                e.riders.retain(|id| {
                    let Some(w) = walkers.get_mut(id) else {
                        return false;
                    };
                    if w.snapshot.dest != floor {
                        return true;
                    }
                    scores[owner.index()] += w.snapshot.score_for(owner);
                    delivered[owner.index()] += 1;
                    w.snapshot.state = PassengerState::Exiting;
                    w.snapshot.elevator = None;
                    w.countdown = EXIT_TICKS;
                    false
                });
            }
        }
        ElevatorState::Filling => {}
    }
}

/// Returns `true` once the passenger has left the building.
fn step_walker(walker: &mut Walker, cars: &mut [Car]) -> bool {
    let p = &mut walker.snapshot;
    match p.state {
        PassengerState::WaitingForElevator => {
            walker.waited += 1;
            if walker.waited >= PATIENCE_TICKS {
                p.state = PassengerState::MovingToFloor;
                walker.countdown = p.travel_distance() * TICKS_PER_FLOOR;
            }
        }
        PassengerState::MovingToElevator => {
            walker.countdown -= 1;
            if walker.countdown == 0 {
                let car = cars.iter_mut().find(|c| Some(c.snapshot.id) == p.elevator);
                match car {
                    Some(car)
                        if car.snapshot.is_filling()
                            && car.snapshot.floor == p.floor
                            && car.snapshot.riders.len() < PASSENGERS_MAX =>
                    {
                        car.snapshot.riders.push(p.id);
                        p.state = PassengerState::UsingElevator;
                    }
                    _ => {
                        p.state = PassengerState::Returning;
                        p.elevator = None;
                        walker.countdown = WALK_TICKS;
                    }
                }
            }
        }
        PassengerState::Returning => {
            walker.countdown -= 1;
            if walker.countdown == 0 {
                p.state = PassengerState::WaitingForElevator;
            }
        }
        PassengerState::MovingToFloor | PassengerState::Exiting => {
            walker.countdown = walker.countdown.saturating_sub(1);
            return walker.countdown == 0;
        }
        PassengerState::UsingElevator => {}
    }
    false
}
