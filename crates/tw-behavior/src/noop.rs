//! A controller that never acts.

use crate::{BehaviorResult, Controller, Domain, TickContext};

/// A [`Controller`] whose `run` does nothing.
///
/// Useful for agents that are travelling and should be left alone until a
/// sentry callback rebinds them, and as a placeholder in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopController;

impl<D: Domain> Controller<D> for NoopController {
    fn run(&mut self, _agent: &D::Agent, _ctx: &mut TickContext<'_, D>) -> BehaviorResult<()> {
        Ok(())
    }
}
