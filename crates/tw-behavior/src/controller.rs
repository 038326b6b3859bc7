//! The `Controller` trait, the main extension point for user code.

use crate::{BehaviorResult, Domain, TickContext};

/// Pluggable behavior bound to a single agent.
///
/// A controller is created by the [`ControllerRegistry`][crate::ControllerRegistry]
/// when an agent is bound to its behavior kind, and dropped when the agent
/// is rebound to another kind.  Private fields (timers, the passenger it
/// is waiting for, …) therefore persist across ticks for exactly as long as
/// the binding lasts.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Patrol { leg: u32 }
///
/// impl Controller<Building> for Patrol {
///     fn run(&mut self, agent: &Car, ctx: &mut TickContext<'_, Building>) -> BehaviorResult<()> {
///         if ctx.world.agent_ticks(agent.id)? > 40 {
///             self.leg += 1;
///             ctx.move_to(Floor(self.leg % 5));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Controller<D: Domain> {
    /// Called exactly once per tick for the bound agent, after every sentry
    /// has been refreshed.
    ///
    /// An error is not caught: it aborts the tick and is returned to the
    /// host.
    fn run(&mut self, agent: &D::Agent, ctx: &mut TickContext<'_, D>) -> BehaviorResult<()>;
}
