//! The `Driver` struct and its per-tick pass.

use tracing::{debug, warn};
use tw_behavior::{BehaviorResult, Command, Domain, Frame, Rank, Snapshot, World};
use tw_core::{EngineConfig, RunOrder, Tick};
use tw_schedule::SchedulerExt;

use crate::{DriverError, DriverObserver, DriverResult, NoopObserver, TickSummary};

/// Drives one [`World`] from host tick notifications.
///
/// Each call to [`on_tick`][Self::on_tick] performs one full pass:
///
/// 1. **Bind**: owned agents without a controller are bound to the initial
///    behavior.
/// 2. **Refresh**: every sentry is fed its snapshot's state (own agents, own
///    entities, foreign agents, foreign entities) and on-enter callbacks
///    fire.  No controller has run yet.
/// 3. **Run**: each owned agent's controller runs exactly once, in
///    [`RunOrder`].
/// 4. **Advance**: actions due this tick execute and the clock moves on.
/// 5. **Flush**: the commands issued during the tick are returned.
///
/// Any error poisons the driver: the tick is abandoned part-way and every
/// later call fails with [`DriverError::Poisoned`].
///
/// Create via [`DriverBuilder`][crate::DriverBuilder].
pub struct Driver<D: Domain> {
    world:    World<D>,
    initial:  D::Behavior,
    config:   EngineConfig,
    poisoned: bool,
}

impl<D: Domain> Driver<D> {
    pub(crate) fn new(world: World<D>, initial: D::Behavior, config: EngineConfig) -> Self {
        Self { world, initial, config, poisoned: false }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The tick the next pass will run as.
    #[inline]
    pub fn now(&self) -> Tick {
        self.world.now()
    }

    pub fn world(&self) -> &World<D> {
        &self.world
    }

    /// Mutable access between ticks, e.g. to schedule host-side actions.
    pub fn world_mut(&mut self) -> &mut World<D> {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run one pass at the driver's own tick.
    pub fn on_tick(&mut self, frame: &Frame<D>) -> DriverResult<Vec<Command<D::Position>>> {
        self.on_tick_observed(frame, &mut NoopObserver)
    }

    /// Run one pass at `tick`, which must be exactly the driver's current
    /// tick.  Tick 0, a repeated tick or a skipped tick is a protocol
    /// violation and poisons the driver.
    pub fn on_tick_at(&mut self, tick: Tick, frame: &Frame<D>) -> DriverResult<Vec<Command<D::Position>>> {
        if self.poisoned {
            return Err(DriverError::Poisoned);
        }
        let expected = self.now();
        if tick != expected {
            warn!(expected = expected.0, got = tick.0, "tick out of sequence");
            self.poisoned = true;
            return Err(DriverError::Protocol { expected, got: tick });
        }
        self.on_tick(frame)
    }

    /// [`on_tick`][Self::on_tick], reporting progress to `observer`.
    pub fn on_tick_observed<O: DriverObserver<D>>(
        &mut self,
        frame:    &Frame<D>,
        observer: &mut O,
    ) -> DriverResult<Vec<Command<D::Position>>> {
        if self.poisoned {
            return Err(DriverError::Poisoned);
        }
        match self.pass(frame, observer) {
            Ok(commands) => Ok(commands),
            Err(e) => {
                warn!(tick = self.now().0, error = %e, "tick aborted; driver poisoned");
                self.poisoned = true;
                Err(e.into())
            }
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn pass<O: DriverObserver<D>>(
        &mut self,
        frame:    &Frame<D>,
        observer: &mut O,
    ) -> BehaviorResult<Vec<Command<D::Position>>> {
        let tick = self.now();
        observer.on_tick_start(tick);

        // ── Phase 1: bind newcomers ───────────────────────────────────────
        for agent in &frame.own_agents {
            if !self.world.is_bound(agent.id()) {
                self.world.bind(agent.id(), self.initial)?;
            }
        }

        // ── Phase 2: refresh sentries ─────────────────────────────────────
        for agent in frame.own_agents.iter().chain(&frame.foreign_agents) {
            self.world.synchronize_agent(agent.id(), agent.state())?;
        }
        for entity in frame.own_entities.iter().chain(&frame.foreign_entities) {
            self.world.synchronize_entity(entity.id(), entity.state())?;
        }

        // ── Phase 3: run controllers ──────────────────────────────────────
        //
        // Order is fixed from the ranks as they stand now; ranks assigned
        // during the pass take effect next tick.
        let order = self.run_order(frame);
        for &i in &order {
            self.world.run_agent(frame, &frame.own_agents[i])?;
        }

        // ── Phase 4: advance ──────────────────────────────────────────────
        let actions = self.world.advance()?;

        // ── Phase 5: flush ────────────────────────────────────────────────
        let rebinds = self.world.drain_rebinds();
        for rebind in &rebinds {
            observer.on_rebind(rebind);
        }
        let commands = self.world.drain_commands();

        let summary = TickSummary {
            tick,
            ran: order.len(),
            actions,
            rebinds: rebinds.len(),
            commands: commands.len(),
        };
        debug!(
            tick = tick.0,
            ran = summary.ran,
            actions,
            rebinds = summary.rebinds,
            commands = summary.commands,
            "tick complete"
        );
        observer.on_tick_end(&summary);
        Ok(commands)
    }

    /// Indices into `frame.own_agents` in run order.  Sorting is stable, so
    /// equal ranks keep the host's order.
    fn run_order(&self, frame: &Frame<D>) -> Vec<usize> {
        let ranks: Vec<Option<Rank>> =
            frame.own_agents.iter().map(|a| self.world.rank(a.id())).collect();
        let mut order: Vec<usize> = (0..frame.own_agents.len()).collect();
        match self.config.run_order {
            RunOrder::RankDescending => order.sort_by(|&a, &b| ranks[b].cmp(&ranks[a])),
            RunOrder::RankAscending => order.sort_by_key(|&i| ranks[i]),
            RunOrder::HostOrder => {}
        }
        order
    }
}
