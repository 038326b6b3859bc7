//! Elevator controllers.
//!
//! An elevator starts in [`Ranking`]: it claims one passenger and waits for
//! them to board, after which it takes a rank and moves on to [`Loading`].
//! A loading elevator invites passengers headed the same way and departs
//! when full or when its timeout, shortened for higher ranks, runs out.
//! While travelling it sits in `Idle` until its doors open again.

use std::cmp::Reverse;

use tracing::{debug, info};
use tw_behavior::{
    BehaviorResult, CallbackId, Controller, ControllerRegistry, Frame, NoopController, Rank, TickContext, World,
};
use tw_core::{AgentId, EntityId};

use crate::domain::{
    DELAY_ENEMY_INVITATION, DELAY_OPERATION, ELEVATORS_PER_PLAYER, Elevator, ElevatorState, Floor, Game,
    PASSENGERS_MAX, Passenger, PassengerState, Strategy,
};

pub const TIMEOUT_DEPARTURE: u32 = 150;

/// Every strategy the demo knows about.
pub fn registry() -> BehaviorResult<ControllerRegistry<Game>> {
    let mut registry = ControllerRegistry::new();
    registry
        .register_default::<Ranking>(Strategy::Ranking)?
        .register_default::<Loading>(Strategy::Loading)?
        .register_default::<NoopController>(Strategy::Idle)?
        .register_default::<Baseline>(Strategy::Baseline)?;
    Ok(registry)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Passengers on `elevator`'s floor it could talk to: its owner's, plus the
/// other player's once foreign invitations are allowed.
fn on_floor<'f>(
    frame:    &'f Frame<Game>,
    elevator: &Elevator,
    foreign:  bool,
) -> impl Iterator<Item = &'f Passenger> + 'f {
    let floor = elevator.floor;
    let foreign: &'f [Passenger] = if foreign { &frame.foreign_entities } else { &[] };
    frame.own_entities.iter().chain(foreign).filter(move |p| p.floor == floor)
}

fn may_invite_foreign(world: &World<Game>, elevator: &Elevator) -> BehaviorResult<bool> {
    Ok(elevator.is_filling() && world.agent_ticks(elevator.id)? >= DELAY_ENEMY_INVITATION)
}

/// The rank an elevator takes once every other elevator has one: the
/// smallest rank not in use.  `None` while any other elevator is unranked.
pub fn infer_rank(others: &[Option<Rank>]) -> Option<Rank> {
    let mut ranks: Vec<u32> = others.iter().map(|r| r.map(|r| r.0)).collect::<Option<_>>()?;
    ranks.sort_unstable();
    let mut rank = 1;
    for r in ranks {
        if r == rank {
            rank += 1;
        }
    }
    Some(Rank(rank))
}

/// Give `elevator` `rank` (or the smallest free one) and switch it to
/// loading once the tick ends.
fn take_rank(world: &mut World<Game>, elevator: AgentId, rank: Option<Rank>) -> BehaviorResult<()> {
    let rank = rank.unwrap_or_else(|| {
        let taken: Vec<Rank> = world.ranks().map(|(_, r)| r).collect();
        (1..).map(Rank).find(|r| !taken.contains(r)).unwrap_or_default()
    });
    world.set_rank(elevator, rank);
    info!(%elevator, rank = rank.0, "elevator ranked");
    world.rebind_next(elevator, Strategy::Loading)
}

/// Send the running elevator to `floor` and sleep until its doors open.
fn depart(ctx: &mut TickContext<'_, Game>, floor: Floor) -> BehaviorResult<()> {
    info!(elevator = %ctx.agent(), %floor, tick = ctx.now().0, "elevator departs");
    ctx.move_to(floor);
    ctx.world.shared.departures += 1;
    park(ctx)
}

/// Switch to `Idle`; back to `Loading` the next time the doors are open.
fn park(ctx: &mut TickContext<'_, Game>) -> BehaviorResult<()> {
    let me = ctx.agent();
    ctx.switch_to(Strategy::Idle)?;
    ctx.world.on_agent_enter(me, ElevatorState::Filling, move |world: &mut World<Game>, _| {
        world.rebind(me, Strategy::Loading).map(drop)
    });
    Ok(())
}

// ── Ranking ───────────────────────────────────────────────────────────────────

/// Claims one passenger on the current floor and takes a rank when that
/// passenger boards, or as soon as every other elevator is ranked.
#[derive(Default)]
pub struct Ranking {
    claimed: Option<(EntityId, CallbackId)>,
}

impl Controller<Game> for Ranking {
    fn run(&mut self, elevator: &Elevator, ctx: &mut TickContext<'_, Game>) -> BehaviorResult<()> {
        let frame = ctx.frame;
        let me = elevator.id;

        if let Some((claimed, _)) = self.claimed {
            if frame.entity(claimed).is_some_and(|p| p.elevator == Some(me)) {
                return Ok(());
            }
        }

        let others: Vec<Option<Rank>> = frame
            .own_agents
            .iter()
            .filter(|e| e.id != me)
            .map(|e| ctx.world.rank(e.id))
            .collect();
        if let Some(rank) = infer_rank(&others) {
            return take_rank(ctx.world, me, Some(rank));
        }

        let now = ctx.now();
        let foreign = may_invite_foreign(ctx.world, elevator)?;
        let own: Vec<AgentId> = frame.own_agents.iter().map(|e| e.id).collect();
        let candidate = on_floor(frame, elevator, foreign).find(|p| {
            p.state.may_be_invited()
                && !p.elevator.is_some_and(|id| own.contains(&id))
                && !ctx.world.shared.is_reserved(p.id, now)
        });
        let Some(passenger) = candidate else {
            return Ok(());
        };
        ctx.world.shared.reserve(passenger.id, now);

        // Only the latest claim may rank this elevator.
        if let Some((old, hook)) = self.claimed.take() {
            ctx.world.cancel_entity_enter(old, PassengerState::UsingElevator, Some(hook));
        }
        ctx.assign(passenger.id);
        let hook = ctx.world.on_entity_enter(
            passenger.id,
            PassengerState::UsingElevator,
            move |world: &mut World<Game>, _| {
                if world.rank(me).is_some() {
                    return Ok(());
                }
                take_rank(world, me, None)
            },
        );
        self.claimed = Some((passenger.id, hook));
        debug!(elevator = %me, passenger = %passenger.id, "passenger claimed");
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Invites passengers on the current floor and departs when full or when
/// the timeout runs out.  The timeout restarts whenever someone is still
/// on their way in or could be invited.
pub struct Loading {
    timeout: u32,
}

impl Default for Loading {
    fn default() -> Self {
        Self { timeout: TIMEOUT_DEPARTURE }
    }
}

impl Loading {
    /// Ticks left at which an elevator of `rank` gives up waiting.  Higher
    /// ranks leave sooner.
    fn deadline(rank: Option<Rank>) -> u32 {
        let rank = rank.map_or(0, |r| r.0);
        40 * ELEVATORS_PER_PLAYER.saturating_sub(rank)
    }
}

impl Controller<Game> for Loading {
    fn run(&mut self, elevator: &Elevator, ctx: &mut TickContext<'_, Game>) -> BehaviorResult<()> {
        if !elevator.is_filling() {
            return park(ctx);
        }
        let frame = ctx.frame;
        let me = elevator.id;
        let now = ctx.now();

        self.timeout = self.timeout.saturating_sub(1);
        let riders: Vec<&Passenger> = elevator.riders.iter().filter_map(|id| frame.entity(*id)).collect();
        let can_operate = ctx.world.agent_ticks(me)? >= DELAY_OPERATION;
        if can_operate && (self.timeout <= Self::deadline(ctx.world.rank(me)) || elevator.is_full()) {
            match riders.first() {
                Some(first) => return depart(ctx, first.dest),
                None => self.timeout = TIMEOUT_DEPARTURE,
            }
        }

        let foreign = may_invite_foreign(ctx.world, elevator)?;
        let nearby: Vec<&Passenger> = on_floor(frame, elevator, foreign).collect();
        if nearby.iter().any(|p| p.state.may_be_invited() || p.is_moving_to(me)) {
            self.timeout = TIMEOUT_DEPARTURE;
        }

        let going_up = riders.first().map(|p| p.goes_up());
        let mut queue: Vec<&Passenger> = nearby
            .into_iter()
            .filter(|p| p.state.may_be_invited())
            .filter(|p| going_up.is_none_or(|up| p.goes_up() == up))
            .filter(|p| !ctx.world.shared.is_reserved(p.id, now))
            .collect();
        queue.sort_by_key(|p| Reverse(p.score_for(elevator.owner)));
        let Some(dest) = queue.first().map(|p| p.dest) else {
            return Ok(());
        };

        let room = PASSENGERS_MAX.saturating_sub(elevator.riders.len());
        for passenger in queue.into_iter().filter(|p| p.dest == dest).take(room) {
            if !ctx.world.shared.reserve(passenger.id, now) {
                continue;
            }
            ctx.assign(passenger.id);
            ctx.world.on_entity_enter(passenger.id, PassengerState::Returning, move |_, t| {
                debug!(elevator = %me, tick = t.tick.0, "invited passenger turned back");
                Ok(())
            });
        }
        Ok(())
    }
}

// ── Baseline ──────────────────────────────────────────────────────────────────

/// Naive reference strategy: chase the player's own waiting passengers and
/// deliver whoever boarded first.
#[derive(Default)]
pub struct Baseline;

impl Controller<Game> for Baseline {
    fn run(&mut self, elevator: &Elevator, ctx: &mut TickContext<'_, Game>) -> BehaviorResult<()> {
        let frame = ctx.frame;
        let moving = elevator.state == ElevatorState::Moving;
        for p in frame.own_entities.iter().filter(|p| p.state.may_be_invited()) {
            if !moving {
                ctx.move_to(p.floor);
            }
            if elevator.floor == p.floor {
                ctx.assign(p.id);
            }
        }
        if let Some(first) = elevator.riders.first().and_then(|id| frame.entity(*id)) {
            if !moving {
                ctx.move_to(first.dest);
            }
        }
        Ok(())
    }
}
