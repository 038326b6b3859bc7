//! Unit tests for tw-schedule.

use std::convert::Infallible;

use tw_core::{DrainPolicy, Tick};

use crate::{HasScheduler, SchedulerExt, TickScheduler};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Minimal context: a scheduler plus a log of `(label, tick-at-execution)`.
struct Log {
    sched: TickScheduler<Log, Infallible>,
    seen:  Vec<(&'static str, Tick)>,
}

impl Log {
    fn new(policy: DrainPolicy) -> Self {
        Self { sched: TickScheduler::with_policy(policy), seen: Vec::new() }
    }
}

impl HasScheduler for Log {
    type Error = Infallible;

    fn scheduler(&self) -> &TickScheduler<Self, Infallible> {
        &self.sched
    }

    fn scheduler_mut(&mut self) -> &mut TickScheduler<Self, Infallible> {
        &mut self.sched
    }
}

/// An action that records `label` with the tick it ran at.
fn mark(label: &'static str) -> impl FnOnce(&mut Log) -> Result<(), Infallible> + 'static {
    move |log: &mut Log| {
        let now = log.now();
        log.seen.push((label, now));
        Ok(())
    }
}

fn labels(log: &Log) -> Vec<&'static str> {
    log.seen.iter().map(|(l, _)| *l).collect()
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod registration {
    use super::*;

    #[test]
    fn starts_at_tick_one() {
        let log = Log::new(DrainPolicy::UntilEmpty);
        assert_eq!(log.now(), Tick(1));
        assert!(log.sched.is_empty());
    }

    #[test]
    fn past_tick_runs_synchronously_and_is_never_queued() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_at(Tick(0), mark("past")).unwrap();
        assert_eq!(labels(&log), vec!["past"]);
        assert!(log.sched.is_empty());
        assert_eq!(log.now(), Tick(1));
    }

    #[test]
    fn current_tick_is_not_the_past() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_at(Tick(1), mark("now")).unwrap();
        assert!(log.seen.is_empty());
        assert_eq!(log.sched.pending_at(Tick(1)), 1);
    }

    #[test]
    fn schedule_after_targets_now_plus_delta() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_after(3, mark("later"));
        assert_eq!(log.sched.next_tick(), Some(Tick(4)));
        assert_eq!(log.sched.len(), 1);
        assert_eq!(log.sched.tick_count(), 1);
    }

    #[test]
    fn past_ticks_keep_running_immediately_later_on() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.advance().unwrap();
        log.advance().unwrap();
        log.schedule_at(Tick(2), mark("late")).unwrap();
        assert_eq!(log.seen, vec![("late", Tick(3))]);
    }
}

// ── Advance ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod advance {
    use super::*;

    #[test]
    fn same_tick_actions_run_in_registration_order() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_at(log.now(), mark("a1")).unwrap();
        log.schedule_at(log.now(), mark("a2")).unwrap();
        let executed = log.advance().unwrap();
        assert_eq!(executed, 2);
        assert_eq!(labels(&log), vec!["a1", "a2"]);
        assert_eq!(log.now(), Tick(2));
    }

    #[test]
    fn schedule_next_runs_inside_the_current_tick() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_next(mark("next"));
        assert!(log.seen.is_empty(), "schedule_next must not run instantly");
        log.advance().unwrap();
        assert_eq!(log.seen, vec![("next", Tick(1))]);
        assert_eq!(log.now(), Tick(2));
    }

    #[test]
    fn delayed_action_waits_for_its_tick() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_after(2, mark("d"));
        log.advance().unwrap();
        log.advance().unwrap();
        assert!(log.seen.is_empty());
        log.advance().unwrap();
        assert_eq!(log.seen, vec![("d", Tick(3))]);
    }

    #[test]
    fn empty_advance_still_increments() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        assert_eq!(log.advance().unwrap(), 0);
        assert_eq!(log.now(), Tick(2));
    }

    #[test]
    fn actions_can_schedule_future_work() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        log.schedule_next(|log: &mut Log| {
            log.seen.push(("outer", log.now()));
            log.schedule_after(1, mark("inner"));
            Ok(())
        });
        log.advance().unwrap();
        log.advance().unwrap();
        assert_eq!(log.seen, vec![("outer", Tick(1)), ("inner", Tick(2))]);
    }

    #[test]
    fn failing_action_aborts_without_incrementing() {
        struct Faulty {
            sched: TickScheduler<Faulty, &'static str>,
            ran:   u32,
        }
        impl HasScheduler for Faulty {
            type Error = &'static str;
            fn scheduler(&self) -> &TickScheduler<Self, &'static str> {
                &self.sched
            }
            fn scheduler_mut(&mut self) -> &mut TickScheduler<Self, &'static str> {
                &mut self.sched
            }
        }

        let mut ctx = Faulty { sched: TickScheduler::new(), ran: 0 };
        ctx.schedule_next(|_: &mut Faulty| Err("boom"));
        ctx.schedule_next(|c: &mut Faulty| {
            c.ran += 1;
            Ok(())
        });
        assert_eq!(ctx.advance(), Err("boom"));
        assert_eq!(ctx.ran, 0);
        assert_eq!(ctx.now(), Tick(1));
        assert!(!ctx.sched.is_draining());
    }
}

// ── Drain policies ────────────────────────────────────────────────────────────

#[cfg(test)]
mod drain_policy {
    use super::*;

    fn requeue_during_drain(log: &mut Log) {
        log.schedule_next(|log: &mut Log| {
            log.seen.push(("first", log.now()));
            log.schedule_next(mark("requeued"));
            Ok(())
        });
    }

    #[test]
    fn until_empty_runs_same_tick_insertions_in_the_same_advance() {
        let mut log = Log::new(DrainPolicy::UntilEmpty);
        requeue_during_drain(&mut log);
        assert_eq!(log.advance().unwrap(), 2);
        assert_eq!(log.seen, vec![("first", Tick(1)), ("requeued", Tick(1))]);
        assert!(log.sched.is_empty());
    }

    #[test]
    fn defer_to_next_moves_same_tick_insertions_one_tick_later() {
        let mut log = Log::new(DrainPolicy::DeferToNext);
        requeue_during_drain(&mut log);
        assert_eq!(log.advance().unwrap(), 1);
        assert_eq!(log.sched.pending_at(Tick(2)), 1);
        log.advance().unwrap();
        assert_eq!(log.seen, vec![("first", Tick(1)), ("requeued", Tick(2))]);
    }

    #[test]
    fn defer_only_applies_while_draining() {
        let mut log = Log::new(DrainPolicy::DeferToNext);
        log.schedule_next(mark("plain"));
        assert_eq!(log.sched.pending_at(Tick(1)), 1);
    }

    #[test]
    fn past_tick_inside_drain_is_still_immediate() {
        let mut log = Log::new(DrainPolicy::DeferToNext);
        log.advance().unwrap();
        log.schedule_next(|log: &mut Log| {
            log.schedule_at(Tick(1), mark("past"))?;
            log.seen.push(("after", log.now()));
            Ok(())
        });
        log.advance().unwrap();
        assert_eq!(labels(&log), vec!["past", "after"]);
    }
}
