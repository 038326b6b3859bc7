//! Fluent builder for constructing a [`Driver`].

use tw_behavior::{BehaviorError, BehaviorKind, ControllerRegistry, Domain, World};
use tw_core::EngineConfig;

use crate::{Driver, DriverResult};

/// Fluent builder for [`Driver<D>`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                     |
/// |---------------|-----------------------------|
/// | `.config(c)`  | `EngineConfig::default()`   |
/// | `.shared(s)`  | `D::Shared::default()`      |
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ControllerRegistry::new();
/// registry.register_default::<Ranking>(Strategy::Ranking)?;
/// let mut driver = DriverBuilder::new(registry, Strategy::Ranking)
///     .config(EngineConfig { run_order: RunOrder::HostOrder, ..Default::default() })
///     .build()?;
/// let commands = driver.on_tick(&frame)?;
/// ```
pub struct DriverBuilder<D: Domain> {
    registry: ControllerRegistry<D>,
    initial:  D::Behavior,
    config:   EngineConfig,
    shared:   Option<D::Shared>,
}

impl<D: Domain> DriverBuilder<D> {
    /// `initial` is the behavior every owned agent is bound to on first
    /// sight.
    pub fn new(registry: ControllerRegistry<D>, initial: D::Behavior) -> Self {
        Self { registry, initial, config: EngineConfig::default(), shared: None }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the world's shared blackboard.
    pub fn shared(mut self, shared: D::Shared) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Check that the initial behavior is registered and return a driver at
    /// tick 1.
    pub fn build(self) -> DriverResult<Driver<D>> {
        if !self.registry.contains(self.initial) {
            return Err(BehaviorError::UnknownBehavior(self.initial.name().to_owned()).into());
        }
        let mut world = World::new(self.registry, self.config.drain_policy);
        if let Some(shared) = self.shared {
            world.shared = shared;
        }
        Ok(Driver::new(world, self.initial, self.config))
    }
}
