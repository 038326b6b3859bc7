//! What a controller sees during its `run`.

use tw_core::{AgentId, EntityId, Tick};
use tw_schedule::SchedulerExt;

use crate::{BehaviorKind, BehaviorResult, Domain, Snapshot, World};

/// One tick's worth of host snapshots, in host order.
pub struct Frame<D: Domain> {
    pub own_agents:       Vec<D::Agent>,
    pub own_entities:     Vec<D::Entity>,
    pub foreign_agents:   Vec<D::Agent>,
    pub foreign_entities: Vec<D::Entity>,
}

impl<D: Domain> Default for Frame<D> {
    fn default() -> Self {
        Self {
            own_agents:       Vec::new(),
            own_entities:     Vec::new(),
            foreign_agents:   Vec::new(),
            foreign_entities: Vec::new(),
        }
    }
}

impl<D: Domain> Frame<D> {
    pub fn new(
        own_agents:       Vec<D::Agent>,
        own_entities:     Vec<D::Entity>,
        foreign_agents:   Vec<D::Agent>,
        foreign_entities: Vec<D::Entity>,
    ) -> Self {
        Self { own_agents, own_entities, foreign_agents, foreign_entities }
    }

    /// Own agents followed by foreign ones.
    pub fn agents(&self) -> impl Iterator<Item = &D::Agent> + '_ {
        self.own_agents.iter().chain(&self.foreign_agents)
    }

    /// Own entities followed by foreign ones.
    pub fn entities(&self) -> impl Iterator<Item = &D::Entity> + '_ {
        self.own_entities.iter().chain(&self.foreign_entities)
    }

    pub fn agent(&self, id: AgentId) -> Option<&D::Agent> {
        self.agents().find(|a| a.id() == id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&D::Entity> {
        self.entities().find(|e| e.id() == id)
    }

    pub fn is_own_agent(&self, id: AgentId) -> bool {
        self.own_agents.iter().any(|a| a.id() == id)
    }

    pub fn is_own_entity(&self, id: EntityId) -> bool {
        self.own_entities.iter().any(|e| e.id() == id)
    }
}

/// Passed to [`Controller::run`][crate::Controller::run].
///
/// `frame` is the full snapshot set of the current tick; `world` is where
/// every effect goes.
pub struct TickContext<'a, D: Domain> {
    pub frame: &'a Frame<D>,
    pub world: &'a mut World<D>,
    agent:     AgentId,
}

impl<'a, D: Domain> TickContext<'a, D> {
    pub fn new(frame: &'a Frame<D>, world: &'a mut World<D>, agent: AgentId) -> Self {
        Self { frame, world, agent }
    }

    /// The agent whose controller is running.
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.world.now()
    }

    /// Send the running agent to `position`.
    pub fn move_to(&mut self, position: D::Position) {
        self.world.move_to(self.agent, position);
    }

    /// Hand `entity` to the running agent.
    pub fn assign(&mut self, entity: EntityId) {
        self.world.assign(entity, self.agent);
    }

    /// Replace the running agent's controller.  Takes effect from the next
    /// tick; the current `run` keeps executing on the old instance.
    pub fn switch_to(&mut self, kind: D::Behavior) -> BehaviorResult<bool> {
        self.world.rebind(self.agent, kind)
    }

    /// Like [`switch_to`][Self::switch_to], applied while the current tick
    /// ends.
    pub fn switch_next(&mut self, kind: D::Behavior) -> BehaviorResult<()> {
        self.world.rebind_next(self.agent, kind)
    }

    /// Name of the running agent's current behavior.
    pub fn behavior_name(&self) -> Option<&'static str> {
        self.world.binding(self.agent).map(BehaviorKind::name)
    }
}
