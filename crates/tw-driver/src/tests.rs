//! Unit tests for tw-driver.

use tw_behavior::{
    BehaviorError, BehaviorKind, BehaviorResult, Command, Controller, ControllerRegistry, Domain,
    Frame, NoopController, Rank, Rebind, Snapshot, TickContext, World,
};
use tw_core::{AgentId, EngineConfig, EntityId, RunOrder, Tick};
use tw_schedule::SchedulerExt;

use crate::{Driver, DriverBuilder, DriverError, DriverObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
enum Door {
    Closed,
    Open,
}

#[derive(Clone, Debug)]
struct Lift {
    id:   AgentId,
    door: Door,
}

impl Snapshot for Lift {
    type Id = AgentId;
    type State = Door;

    fn id(&self) -> AgentId {
        self.id
    }

    fn state(&self) -> Door {
        self.door
    }
}

#[derive(Clone, Debug)]
struct Person {
    id:    EntityId,
    floor: u32,
}

impl Snapshot for Person {
    type Id = EntityId;
    type State = u32;

    fn id(&self) -> EntityId {
        self.id
    }

    fn state(&self) -> u32 {
        self.floor
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Kind {
    Hop,
    Tally,
    Fail,
    Idle,
    Spare,
}

impl BehaviorKind for Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Hop => "hop",
            Kind::Tally => "tally",
            Kind::Fail => "fail",
            Kind::Idle => "idle",
            Kind::Spare => "spare",
        }
    }
}

/// One controller run: `(tick, agent, behavior, run count)`.
type Entry = (u64, u32, &'static str, u64);

struct Test;

impl Domain for Test {
    type Agent = Lift;
    type Entity = Person;
    type Position = u32;
    type Behavior = Kind;
    type Shared = Vec<Entry>;
}

/// Records itself and switches to `Tally`.
#[derive(Default)]
struct Hop;

impl Controller<Test> for Hop {
    fn run(&mut self, agent: &Lift, ctx: &mut TickContext<'_, Test>) -> BehaviorResult<()> {
        let now = ctx.now().0;
        ctx.world.shared.push((now, agent.id.0, "hop", 0));
        ctx.switch_to(Kind::Tally)?;
        Ok(())
    }
}

/// Counts its runs and sends the agent to floor `runs`.
#[derive(Default)]
struct Tally {
    runs: u64,
}

impl Controller<Test> for Tally {
    fn run(&mut self, agent: &Lift, ctx: &mut TickContext<'_, Test>) -> BehaviorResult<()> {
        self.runs += 1;
        let now = ctx.now().0;
        ctx.world.shared.push((now, agent.id.0, "tally", self.runs));
        ctx.move_to(self.runs as u32);
        Ok(())
    }
}

#[derive(Default)]
struct Fail;

impl Controller<Test> for Fail {
    fn run(&mut self, _agent: &Lift, _ctx: &mut TickContext<'_, Test>) -> BehaviorResult<()> {
        Err(BehaviorError::Fault("stuck".into()))
    }
}

fn registry() -> ControllerRegistry<Test> {
    let mut registry = ControllerRegistry::new();
    registry
        .register_default::<Hop>(Kind::Hop)
        .unwrap()
        .register_default::<Tally>(Kind::Tally)
        .unwrap()
        .register_default::<Fail>(Kind::Fail)
        .unwrap()
        .register_default::<NoopController>(Kind::Idle)
        .unwrap();
    registry
}

fn driver(initial: Kind) -> Driver<Test> {
    DriverBuilder::new(registry(), initial).build().unwrap()
}

fn driver_ordered(order: RunOrder) -> Driver<Test> {
    DriverBuilder::new(registry(), Kind::Tally)
        .config(EngineConfig { run_order: order, ..Default::default() })
        .build()
        .unwrap()
}

fn lift(id: u32, door: Door) -> Lift {
    Lift { id: AgentId(id), door }
}

fn frame_of(ids: &[u32]) -> Frame<Test> {
    Frame::new(
        ids.iter().map(|&id| lift(id, Door::Closed)).collect(),
        vec![Person { id: EntityId(1), floor: 0 }],
        vec![lift(90, Door::Open)],
        vec![Person { id: EntityId(2), floor: 3 }],
    )
}

/// Agent ids in the order their controllers ran during `tick`.
fn ran_at(driver: &Driver<Test>, tick: u64) -> Vec<u32> {
    driver.world().shared.iter().filter(|e| e.0 == tick).map(|e| e.1).collect()
}

#[derive(Default)]
struct Recorder {
    starts:    Vec<Tick>,
    rebinds:   Vec<Rebind<Kind>>,
    summaries: Vec<TickSummary>,
}

impl DriverObserver<Test> for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.starts.push(tick);
    }

    fn on_rebind(&mut self, rebind: &Rebind<Kind>) {
        self.rebinds.push(*rebind);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summaries.push(*summary);
    }
}

const A1: AgentId = AgentId(1);

// ── Tick pass ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pass {
    use super::*;

    #[test]
    fn self_rebind_runs_fresh_instance_next_pass() {
        let mut driver = driver(Kind::Hop);
        let mut observer = Recorder::default();
        let frame = frame_of(&[1]);

        driver.on_tick_observed(&frame, &mut observer).unwrap();
        assert_eq!(driver.world().binding(A1), Some(Kind::Tally));
        driver.on_tick_observed(&frame, &mut observer).unwrap();
        driver.on_tick_observed(&frame, &mut observer).unwrap();

        assert_eq!(
            driver.world().shared,
            vec![(1, 1, "hop", 0), (2, 1, "tally", 1), (3, 1, "tally", 2)]
        );
        assert_eq!(observer.starts, vec![Tick(1), Tick(2), Tick(3)]);
        assert_eq!(
            observer.rebinds,
            vec![
                Rebind { agent: A1, from: None, to: Kind::Hop, tick: Tick(1) },
                Rebind { agent: A1, from: Some(Kind::Hop), to: Kind::Tally, tick: Tick(1) },
            ]
        );
        assert_eq!(observer.summaries[0].rebinds, 2);
        assert_eq!(observer.summaries[1].ran, 1);
    }

    #[test]
    fn commands_are_returned_per_tick() {
        let mut driver = driver(Kind::Tally);
        let frame = frame_of(&[1]);
        assert_eq!(driver.on_tick(&frame).unwrap(), vec![Command::MoveTo { agent: A1, position: 1 }]);
        assert_eq!(driver.on_tick(&frame).unwrap(), vec![Command::MoveTo { agent: A1, position: 2 }]);
        assert!(driver.world().commands().is_empty());
    }

    #[test]
    fn scheduled_action_sees_current_tick_then_clock_moves() {
        let mut driver = driver(Kind::Idle);
        driver.world_mut().schedule_next(|w: &mut World<Test>| {
            let now = w.now().0;
            w.shared.push((now, 0, "action", 0));
            Ok(())
        });
        driver.on_tick(&frame_of(&[1])).unwrap();
        assert_eq!(driver.world().shared, vec![(1, 0, "action", 0)]);
        assert_eq!(driver.now(), Tick(2));
    }

    #[test]
    fn late_agents_get_the_initial_behavior() {
        let mut driver = driver(Kind::Tally);
        driver.on_tick(&frame_of(&[1])).unwrap();
        assert!(!driver.world().is_bound(AgentId(4)));
        driver.on_tick(&frame_of(&[1, 4])).unwrap();
        assert_eq!(driver.world().binding(AgentId(4)), Some(Kind::Tally));
        assert_eq!(ran_at(&driver, 2), vec![1, 4]);
    }

    #[test]
    fn sentries_refresh_before_controllers_run() {
        let mut driver = driver(Kind::Idle);
        driver
            .world_mut()
            .on_agent_enter(A1, Door::Open, |w: &mut World<Test>, _| w.rebind(A1, Kind::Tally).map(drop));
        driver.on_tick(&frame_of(&[1])).unwrap();
        assert!(driver.world().shared.is_empty());

        let open = Frame::new(vec![lift(1, Door::Open)], vec![], vec![], vec![]);
        driver.on_tick(&open).unwrap();
        assert_eq!(driver.world().shared, vec![(2, 1, "tally", 1)]);
    }

    #[test]
    fn foreign_objects_are_tracked_too() {
        let mut driver = driver(Kind::Idle);
        driver.on_tick(&frame_of(&[1])).unwrap();
        driver.on_tick(&frame_of(&[1])).unwrap();
        let world = driver.world();
        assert_eq!(world.agent_state(AgentId(90)), Some(Door::Open));
        assert_eq!(world.agent_ticks(AgentId(90)).unwrap(), 2);
        assert_eq!(world.entity_state(EntityId(2)), Some(3));
        assert!(!world.is_bound(AgentId(90)));
    }
}

// ── Run order ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod order {
    use super::*;

    fn ranked(order: RunOrder) -> Vec<u32> {
        let mut driver = driver_ordered(order);
        driver.world_mut().set_rank(AgentId(1), Rank(1));
        driver.world_mut().set_rank(AgentId(2), Rank(5));
        driver.on_tick(&frame_of(&[1, 2, 3])).unwrap();
        ran_at(&driver, 1)
    }

    #[test]
    fn descending_runs_highest_rank_first_and_unranked_last() {
        assert_eq!(ranked(RunOrder::RankDescending), vec![2, 1, 3]);
    }

    #[test]
    fn ascending_runs_unranked_first() {
        assert_eq!(ranked(RunOrder::RankAscending), vec![3, 1, 2]);
    }

    #[test]
    fn host_order_ignores_ranks() {
        assert_eq!(ranked(RunOrder::HostOrder), vec![1, 2, 3]);
    }

    #[test]
    fn equal_ranks_keep_host_order() {
        let mut driver = driver_ordered(RunOrder::RankDescending);
        for id in [4, 2, 9] {
            driver.world_mut().set_rank(AgentId(id), Rank(7));
        }
        driver.on_tick(&frame_of(&[4, 2, 9])).unwrap();
        assert_eq!(ran_at(&driver, 1), vec![4, 2, 9]);
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use super::*;

    #[test]
    fn tick_zero_is_a_protocol_violation() {
        let mut driver = driver(Kind::Idle);
        let err = driver.on_tick_at(Tick(0), &frame_of(&[1])).unwrap_err();
        assert!(matches!(err, DriverError::Protocol { expected: Tick(1), got: Tick(0) }));
        assert!(driver.is_poisoned());
        assert!(matches!(driver.on_tick(&frame_of(&[1])), Err(DriverError::Poisoned)));
    }

    #[test]
    fn repeated_tick_is_a_protocol_violation() {
        let mut driver = driver(Kind::Idle);
        driver.on_tick_at(Tick(1), &frame_of(&[1])).unwrap();
        let err = driver.on_tick_at(Tick(1), &frame_of(&[1])).unwrap_err();
        assert!(matches!(err, DriverError::Protocol { expected: Tick(2), got: Tick(1) }));
    }

    #[test]
    fn skipped_tick_is_a_protocol_violation() {
        let mut driver = driver(Kind::Idle);
        driver.on_tick_at(Tick(1), &frame_of(&[1])).unwrap();
        let err = driver.on_tick_at(Tick(3), &frame_of(&[1])).unwrap_err();
        assert!(matches!(err, DriverError::Protocol { expected: Tick(2), got: Tick(3) }));
        assert!(matches!(driver.on_tick_at(Tick(2), &frame_of(&[1])), Err(DriverError::Poisoned)));
    }

    #[test]
    fn controller_fault_poisons_the_driver() {
        let mut driver = driver(Kind::Fail);
        let err = driver.on_tick(&frame_of(&[1])).unwrap_err();
        assert!(matches!(err, DriverError::Behavior(BehaviorError::Fault(msg)) if msg == "stuck"));
        assert!(matches!(driver.on_tick(&frame_of(&[1])), Err(DriverError::Poisoned)));
    }

    #[test]
    fn failing_action_poisons_the_driver() {
        let mut driver = driver(Kind::Idle);
        driver
            .world_mut()
            .schedule_next(|_: &mut World<Test>| Err(BehaviorError::Fault("late".into())));
        assert!(matches!(driver.on_tick(&frame_of(&[1])), Err(DriverError::Behavior(_))));
        assert!(driver.is_poisoned());
        assert_eq!(driver.now(), Tick(1));
    }

    #[test]
    fn unknown_initial_behavior_is_rejected() {
        let err = DriverBuilder::new(registry(), Kind::Spare).build().err();
        assert!(matches!(err, Some(DriverError::Behavior(BehaviorError::UnknownBehavior(n))) if n == "spare"));
    }
}
