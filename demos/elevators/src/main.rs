//! elevators — two players' elevator strategies on the tickwork framework.
//!
//! A mock building (`building.rs`) plays the game server: every tick it
//! hands each player a snapshot frame, applies the commands the player's
//! driver returns, and moves everything one step.  The first player runs
//! the ranking/loading strategy, the second the naive baseline.
//!
//! `RUST_LOG=elevators=debug,tw_driver=debug` shows every rebind and tick.

mod building;
mod controllers;
mod domain;
mod states;

#[cfg(test)]
mod tests;

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tw_behavior::{BehaviorKind, Rebind};
use tw_core::{EngineConfig, RunOrder, Tick};
use tw_driver::{Driver, DriverBuilder, DriverObserver};

use building::Building;
use domain::{Game, PassengerState, Player, Strategy};
use states::{Step, classify, passenger_graph};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:        u64 = 42;
const TOTAL_TICKS: u64 = 7_200;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RebindCounter {
    rebinds: usize,
    ranked:  usize,
}

impl DriverObserver<Game> for RebindCounter {
    fn on_rebind(&mut self, rebind: &Rebind<Strategy>) {
        self.rebinds += 1;
        if rebind.from == Some(Strategy::Ranking) {
            self.ranked += 1;
            info!(agent = %rebind.agent, tick = rebind.tick.0, to = rebind.to.name(), "ranking finished");
        }
    }
}

fn driver(initial: Strategy) -> Result<Driver<Game>> {
    let config = EngineConfig { run_order: RunOrder::RankDescending, ..Default::default() };
    Ok(DriverBuilder::new(controllers::registry()?, initial).config(config).build()?)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,elevators=info")),
        )
        .init();

    println!("=== elevators — tickwork demo ===");
    println!("Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!();

    let mut building = Building::new(SEED);
    let mut players = [
        (Player::First, driver(Strategy::Ranking)?),
        (Player::Second, driver(Strategy::Baseline)?),
    ];
    let mut observer = RebindCounter::default();

    let t0 = Instant::now();
    for _ in 0..TOTAL_TICKS {
        let tick = Tick(building.tick());
        for (player, driver) in &mut players {
            let frame = building.frame(*player);
            let commands = if *player == Player::First {
                driver.on_tick_observed(&frame, &mut observer)?
            } else {
                driver.on_tick_at(tick, &frame)?
            };
            building.apply(*player, commands);
        }
        building.step();
    }
    let elapsed = t0.elapsed();

    // ── Summary ───────────────────────────────────────────────────────────
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  rebinds (first player) : {}", observer.rebinds);
    println!("  elevators ranked       : {}", observer.ranked);
    println!();

    println!("{:<8} {:<10} {:>10} {:>8}", "Player", "Strategy", "Delivered", "Score");
    println!("{}", "-".repeat(40));
    for (player, name) in [(Player::First, "ranking"), (Player::Second, "baseline")] {
        println!(
            "{:<8} {:<10} {:>10} {:>8}",
            format!("{player:?}"),
            name,
            building.delivered(player),
            building.score(player)
        );
    }
    println!();

    let board = &players[0].1.world().shared;
    println!("First player: {} invitations, {} departures", board.invitations, board.departures);
    println!();

    println!("{:<10} {:<8} {:<10} {:<10}", "Elevator", "Floor", "State", "Behavior");
    println!("{}", "-".repeat(40));
    for elevator in building.elevators() {
        let (_, driver) = &players[elevator.owner.index()];
        let behavior = driver.world().binding(elevator.id).map_or("-", BehaviorKind::name);
        println!(
            "{:<10} {:<8} {:<10} {:<10}",
            elevator.id.to_string(),
            elevator.floor.to_string(),
            format!("{:?}", elevator.state),
            behavior
        );
    }
    println!();

    // ── Passenger transitions against the state tree ──────────────────────
    let graph = passenger_graph()?;
    if let Some(path) = graph.find_path(&PassengerState::Exiting, None).nodes() {
        let story: Vec<&str> = path.iter().map(|n| *n.value()).collect();
        println!("A delivered passenger: {}", story.join(" -> "));
    }
    let mut counts = [0usize; 4];
    for &(from, to) in building.transitions() {
        let slot = match classify(&graph, from, to) {
            Step::Advance => 0,
            Step::Skip => 1,
            Step::Retry => 2,
            Step::Sideways => 3,
        };
        counts[slot] += 1;
    }
    println!(
        "Passenger transitions: {} advance, {} skip, {} retry, {} sideways",
        counts[0], counts[1], counts[2], counts[3]
    );

    Ok(())
}
