//! `World` — everything a controller, a sentry callback or a scheduled
//! action may touch.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use tracing::debug;
use tw_core::{AgentId, DrainPolicy, EntityId, Tick};
use tw_schedule::{HasScheduler, SchedulerExt, TickScheduler};
use tw_sentry::{CallbackId, SentryTable, Transition};

use crate::{
    AgentState, BehaviorError, BehaviorKind, BehaviorResult, Command, Controller, ControllerRegistry,
    Domain, EntityState, Frame, Snapshot, TickContext,
};

// ── Side tables ───────────────────────────────────────────────────────────────

/// Run priority of an agent.  With the default
/// [`RunOrder`][tw_core::RunOrder] higher ranks run first; agents without a
/// rank run after every ranked one.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Rank(pub u32);

/// One change of binding, as reported to observers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Rebind<B> {
    pub agent: AgentId,
    /// `None` for the initial binding.
    pub from:  Option<B>,
    pub to:    B,
    pub tick:  Tick,
}

struct Binding<D: Domain> {
    kind:       D::Behavior,
    /// `None` while the controller is running.
    controller: Option<Box<dyn Controller<D>>>,
    /// Bumped on every rebind; a running controller is only put back if the
    /// generation it was taken at is still current.
    generation: u64,
}

type AgentSentries<D> = SentryTable<AgentId, AgentState<D>, World<D>, BehaviorError>;
type EntitySentries<D> = SentryTable<EntityId, EntityState<D>, World<D>, BehaviorError>;

// ── World ─────────────────────────────────────────────────────────────────────

pub struct World<D: Domain> {
    scheduler: TickScheduler<World<D>, BehaviorError>,
    registry:  ControllerRegistry<D>,
    bindings:  BTreeMap<AgentId, Binding<D>>,
    agents:    AgentSentries<D>,
    entities:  EntitySentries<D>,
    ranks:     BTreeMap<AgentId, Rank>,
    commands:  Vec<Command<D::Position>>,
    rebinds:   Vec<Rebind<D::Behavior>>,
    next_gen:  u64,

    /// Cross-controller state owned by the domain.
    pub shared: D::Shared,
}

impl<D: Domain> HasScheduler for World<D> {
    type Error = BehaviorError;

    #[inline]
    fn scheduler(&self) -> &TickScheduler<Self, BehaviorError> {
        &self.scheduler
    }

    #[inline]
    fn scheduler_mut(&mut self) -> &mut TickScheduler<Self, BehaviorError> {
        &mut self.scheduler
    }
}

impl<D: Domain> World<D> {
    pub fn new(registry: ControllerRegistry<D>, policy: DrainPolicy) -> Self {
        Self {
            scheduler: TickScheduler::with_policy(policy),
            registry,
            bindings: BTreeMap::new(),
            agents: SentryTable::new(),
            entities: SentryTable::new(),
            ranks: BTreeMap::new(),
            commands: Vec::new(),
            rebinds: Vec::new(),
            next_gen: 0,
            shared: D::Shared::default(),
        }
    }

    pub fn registry(&self) -> &ControllerRegistry<D> {
        &self.registry
    }

    // ── Bindings ──────────────────────────────────────────────────────────

    /// Bind `agent` to a fresh controller of `kind`, replacing whatever it
    /// was bound to, even a controller of the same kind.
    pub fn bind(&mut self, agent: AgentId, kind: D::Behavior) -> BehaviorResult<()> {
        let controller = self.registry.create(kind)?;
        let generation = self.next_gen;
        self.next_gen += 1;
        let previous = self.bindings.insert(
            agent,
            Binding { kind, controller: Some(controller), generation },
        );
        let from = previous.map(|b| b.kind);
        let tick = self.now();
        debug!(
            %agent,
            from = from.map(BehaviorKind::name),
            to = kind.name(),
            tick = tick.0,
            "agent rebound"
        );
        self.rebinds.push(Rebind { agent, from, to: kind, tick });
        Ok(())
    }

    /// Switch `agent` to `kind`.  Returns `false`, keeping the current
    /// controller and its state, if `agent` is already bound to `kind`.
    ///
    /// Called from the agent's own `run`, the new controller is first used on
    /// the next tick.  Called for an agent that has not run yet this tick,
    /// it is used right away.
    pub fn rebind(&mut self, agent: AgentId, kind: D::Behavior) -> BehaviorResult<bool> {
        if self.binding(agent) == Some(kind) {
            return Ok(false);
        }
        self.bind(agent, kind)?;
        Ok(true)
    }

    /// [`rebind`][Self::rebind] during this tick's advance, after every agent
    /// has run.  `kind` is checked against the registry now.
    pub fn rebind_next(&mut self, agent: AgentId, kind: D::Behavior) -> BehaviorResult<()> {
        if !self.registry.contains(kind) {
            return Err(BehaviorError::UnknownBehavior(kind.name().to_owned()));
        }
        self.schedule_next(move |world: &mut World<D>| world.rebind(agent, kind).map(drop));
        Ok(())
    }

    /// [`rebind`][Self::rebind] by configured behavior name.
    pub fn rebind_by_name(&mut self, agent: AgentId, name: &str) -> BehaviorResult<bool> {
        let kind = self.registry.kind_of(name)?;
        self.rebind(agent, kind)
    }

    /// Behavior kind `agent` is currently bound to.
    pub fn binding(&self, agent: AgentId) -> Option<D::Behavior> {
        self.bindings.get(&agent).map(|b| b.kind)
    }

    pub fn is_bound(&self, agent: AgentId) -> bool {
        self.bindings.contains_key(&agent)
    }

    /// Bound agents in ascending id order.
    pub fn bound_agents(&self) -> impl Iterator<Item = (AgentId, D::Behavior)> + '_ {
        self.bindings.iter().map(|(id, b)| (*id, b.kind))
    }

    /// Run the controller bound to `agent` once.
    ///
    /// The controller is detached from its binding while it runs, so it can
    /// be handed `&mut self`.  If the binding was replaced in the meantime
    /// the old controller is dropped here.
    pub fn run_agent(&mut self, frame: &Frame<D>, agent: &D::Agent) -> BehaviorResult<()> {
        let id = agent.id();
        let binding = self.bindings.get_mut(&id).ok_or(BehaviorError::Unbound(id))?;
        let generation = binding.generation;
        let mut controller = binding.controller.take().ok_or(BehaviorError::Unbound(id))?;

        let result = {
            let mut ctx = TickContext::new(frame, self, id);
            controller.run(agent, &mut ctx)
        };

        if let Some(binding) = self.bindings.get_mut(&id) {
            if binding.generation == generation {
                binding.controller = Some(controller);
            }
        }
        result
    }

    /// Bindings changed since the last call, oldest first.
    pub fn drain_rebinds(&mut self) -> Vec<Rebind<D::Behavior>> {
        mem::take(&mut self.rebinds)
    }

    // ── Commands ──────────────────────────────────────────────────────────

    pub fn move_to(&mut self, agent: AgentId, position: D::Position) {
        self.commands.push(Command::MoveTo { agent, position });
    }

    pub fn assign(&mut self, entity: EntityId, agent: AgentId) {
        self.commands.push(Command::Assign { entity, agent });
    }

    /// Commands issued so far this tick.
    pub fn commands(&self) -> &[Command<D::Position>] {
        &self.commands
    }

    pub fn drain_commands(&mut self) -> Vec<Command<D::Position>> {
        mem::take(&mut self.commands)
    }

    // ── Ranks ─────────────────────────────────────────────────────────────

    pub fn rank(&self, agent: AgentId) -> Option<Rank> {
        self.ranks.get(&agent).copied()
    }

    /// Returns the previous rank.
    pub fn set_rank(&mut self, agent: AgentId, rank: Rank) -> Option<Rank> {
        self.ranks.insert(agent, rank)
    }

    pub fn clear_rank(&mut self, agent: AgentId) -> Option<Rank> {
        self.ranks.remove(&agent)
    }

    /// Every assigned rank, by ascending agent id.
    pub fn ranks(&self) -> impl Iterator<Item = (AgentId, Rank)> + '_ {
        self.ranks.iter().map(|(id, rank)| (*id, *rank))
    }

    // ── Sentries ──────────────────────────────────────────────────────────

    /// Feed the latest state of `agent` to its sentry and fire any on-enter
    /// callbacks.  Returns whether the state changed.
    pub fn synchronize_agent(&mut self, agent: AgentId, state: AgentState<D>) -> BehaviorResult<bool> {
        let now = self.now();
        match self.agents.synchronize(agent, state, now) {
            Some(entered) => entered.fire(self).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn synchronize_entity(&mut self, entity: EntityId, state: EntityState<D>) -> BehaviorResult<bool> {
        let now = self.now();
        match self.entities.synchronize(entity, state, now) {
            Some(entered) => entered.fire(self).map(|_| true),
            None => Ok(false),
        }
    }

    /// Last state observed for `agent`.
    pub fn agent_state(&self, agent: AgentId) -> Option<AgentState<D>> {
        self.agents.state(agent)
    }

    pub fn entity_state(&self, entity: EntityId) -> Option<EntityState<D>> {
        self.entities.state(entity)
    }

    /// Ticks `agent` has spent in its current state.
    pub fn agent_ticks(&self, agent: AgentId) -> BehaviorResult<u64> {
        Ok(self.agents.ticks_passed(agent, self.now())?)
    }

    pub fn entity_ticks(&self, entity: EntityId) -> BehaviorResult<u64> {
        Ok(self.entities.ticks_passed(entity, self.now())?)
    }

    /// Run `callback` the next time `agent` enters `state`.
    pub fn on_agent_enter<F>(&mut self, agent: AgentId, state: AgentState<D>, callback: F) -> CallbackId
    where
        F: FnOnce(&mut World<D>, Transition<AgentState<D>>) -> BehaviorResult<()> + 'static,
    {
        self.agents.entry(agent).on_enter(state, callback)
    }

    pub fn on_entity_enter<F>(&mut self, entity: EntityId, state: EntityState<D>, callback: F) -> CallbackId
    where
        F: FnOnce(&mut World<D>, Transition<EntityState<D>>) -> BehaviorResult<()> + 'static,
    {
        self.entities.entry(entity).on_enter(state, callback)
    }

    /// Cancel one callback, or all of them for `state` when `id` is `None`.
    pub fn cancel_agent_enter(&mut self, agent: AgentId, state: AgentState<D>, id: Option<CallbackId>) -> usize {
        self.agents.get_mut(agent).map_or(0, |s| s.cancel_on_enter(state, id))
    }

    pub fn cancel_entity_enter(&mut self, entity: EntityId, state: EntityState<D>, id: Option<CallbackId>) -> usize {
        self.entities.get_mut(entity).map_or(0, |s| s.cancel_on_enter(state, id))
    }

    pub fn agent_sentries(&self) -> &AgentSentries<D> {
        &self.agents
    }

    pub fn entity_sentries(&self) -> &EntitySentries<D> {
        &self.entities
    }
}

impl<D: Domain> fmt::Debug for World<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("now", &self.now())
            .field("pending", &self.scheduler.len())
            .field("bound", &self.bindings.len())
            .field("ranks", &self.ranks)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
