//! Tests for the elevator demo.

use tw_behavior::Rank;
use tw_core::{AgentId, Tick};

use crate::building::Building;
use crate::controllers::infer_rank;
use crate::domain::{Board, ElevatorState, PassengerState, Player, SPAWN_EVERY, Strategy};
use crate::states::{Step, classify, passenger_graph};

// ── Ranking ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ranking {
    use super::*;

    fn ranks(raw: &[Option<u32>]) -> Vec<Option<Rank>> {
        raw.iter().map(|r| r.map(Rank)).collect()
    }

    #[test]
    fn fills_the_gap() {
        assert_eq!(infer_rank(&ranks(&[Some(4), Some(2), Some(1)])), Some(Rank(3)));
        assert_eq!(infer_rank(&ranks(&[Some(2), Some(1), Some(4)])), Some(Rank(3)));
    }

    #[test]
    fn takes_the_next_rank_when_there_is_no_gap() {
        assert_eq!(infer_rank(&ranks(&[Some(3), Some(1), Some(2)])), Some(Rank(4)));
    }

    #[test]
    fn waits_while_others_are_unranked() {
        assert_eq!(infer_rank(&ranks(&[None, Some(3), None])), None);
        assert_eq!(infer_rank(&ranks(&[None, None, None])), None);
    }

    #[test]
    fn a_lone_elevator_is_first() {
        assert_eq!(infer_rank(&[]), Some(Rank(1)));
    }
}

// ── Passenger state tree ──────────────────────────────────────────────────────

#[cfg(test)]
mod states {
    use super::*;
    use PassengerState::*;

    #[test]
    fn graph_is_rooted_at_waiting() {
        let graph = passenger_graph().unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.root().state(), &WaitingForElevator);
        assert_eq!(graph.depth(&Exiting), Some(3));
    }

    #[test]
    fn transitions_are_classified_by_ancestry() {
        let graph = passenger_graph().unwrap();
        assert_eq!(classify(&graph, WaitingForElevator, MovingToElevator), Step::Advance);
        assert_eq!(classify(&graph, WaitingForElevator, UsingElevator), Step::Skip);
        assert_eq!(classify(&graph, Returning, WaitingForElevator), Step::Retry);
        assert_eq!(classify(&graph, Returning, MovingToFloor), Step::Sideways);
    }
}

// ── Host ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod host {
    use super::*;

    #[test]
    fn passengers_spawn_in_mirrored_pairs() {
        let mut building = Building::new(7);
        for _ in 0..SPAWN_EVERY {
            building.step();
        }
        let first = building.frame(Player::First);
        let second = building.frame(Player::Second);
        assert_eq!(first.own_entities.len(), 1);
        assert_eq!(first.foreign_entities.len(), 1);
        let (mine, theirs) = (&first.own_entities[0], &second.own_entities[0]);
        assert_eq!((mine.from, mine.dest), (theirs.from, theirs.dest));
        assert_ne!(mine.from, mine.dest);
        assert_eq!(mine.state, PassengerState::WaitingForElevator);
    }

    #[test]
    fn frames_split_elevators_by_owner() {
        let building = Building::new(7);
        let frame = building.frame(Player::Second);
        assert_eq!(frame.own_agents.len(), 4);
        assert_eq!(frame.foreign_agents.len(), 4);
        assert!(frame.own_agents.iter().all(|e| e.owner == Player::Second));
        assert!(frame.own_agents.iter().all(|e| e.state == ElevatorState::Filling));
    }

    #[test]
    fn board_reserves_once_per_tick() {
        let mut board = Board::default();
        let p = tw_core::EntityId(3);
        assert!(board.reserve(p, Tick(5)));
        assert!(!board.reserve(p, Tick(5)));
        assert!(board.is_reserved(p, Tick(5)));
        assert!(board.reserve(p, Tick(6)));
        assert_eq!(board.invitations, 2);
    }
}

// ── Full game ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod game {
    use tw_driver::DriverBuilder;

    use super::*;
    use crate::controllers::registry;

    #[test]
    fn both_strategies_play_without_faults() {
        let mut building = Building::new(42);
        let mut drivers = [
            (Player::First, DriverBuilder::new(registry().unwrap(), Strategy::Ranking).build().unwrap()),
            (Player::Second, DriverBuilder::new(registry().unwrap(), Strategy::Baseline).build().unwrap()),
        ];
        for _ in 0..1_500 {
            let tick = Tick(building.tick());
            for (player, driver) in &mut drivers {
                let commands = driver.on_tick_at(tick, &building.frame(*player)).unwrap();
                building.apply(*player, commands);
            }
            building.step();
        }
        for (_, driver) in &drivers {
            assert!(!driver.is_poisoned());
            assert_eq!(driver.now(), Tick(1_501));
        }
        let first = drivers[0].1.world();
        assert!(first.bound_agents().all(|(id, _)| id.0 <= 4));
        assert!(first.binding(AgentId(1)).is_some());
    }
}
