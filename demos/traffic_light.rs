//! Traffic Light State Machine
//!
//! This example demonstrates a cyclic state machine driven by a manual clock.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - Timers accumulated from `delta_time`
//! - Deterministic stepping with `ManualClock`
//! - Branching on the current state with `state_is`
//!
//! Run with: cargo run --example traffic_light

use chrono::Duration;
use tickstate::core::{ManualClock, State, StateType};
use tickstate::machine::{Context, StateMachine};
use tracing_subscriber::EnvFilter;

/// Seconds spent in the current light.
struct Timer {
    elapsed: f64,
}

struct Red;
struct Green;
struct Yellow;

fn hold(machine: &mut Context<Timer>, delta_time: f64, seconds: f64) -> bool {
    machine.data_mut().elapsed += delta_time;
    machine.data().elapsed < seconds
}

fn reset(machine: &mut Context<Timer>, previous: Option<StateType>, light: &str) {
    machine.data_mut().elapsed = 0.0;
    let from = previous.map_or("off", |state| state.name());
    println!("  {from:>6} -> {light}");
}

impl State<Timer> for Red {
    fn on_enter(&mut self, machine: &mut Context<Timer>, previous: Option<StateType>) {
        reset(machine, previous, "Red    (Stop)");
    }

    fn on_update(&mut self, machine: &mut Context<Timer>, delta_time: f64) {
        if !hold(machine, delta_time, 4.0) {
            machine.switch_to(Green);
        }
    }

    fn on_exit(&mut self, _: &mut Context<Timer>, _: Option<StateType>) {}
}

impl State<Timer> for Green {
    fn on_enter(&mut self, machine: &mut Context<Timer>, previous: Option<StateType>) {
        reset(machine, previous, "Green  (Go!)");
    }

    fn on_update(&mut self, machine: &mut Context<Timer>, delta_time: f64) {
        if !hold(machine, delta_time, 3.0) {
            machine.switch_to(Yellow);
        }
    }

    fn on_exit(&mut self, _: &mut Context<Timer>, _: Option<StateType>) {}
}

impl State<Timer> for Yellow {
    fn on_enter(&mut self, machine: &mut Context<Timer>, previous: Option<StateType>) {
        reset(machine, previous, "Yellow (Caution)");
    }

    fn on_update(&mut self, machine: &mut Context<Timer>, delta_time: f64) {
        if !hold(machine, delta_time, 1.0) {
            machine.switch_to(Red);
        }
    }

    fn on_exit(&mut self, _: &mut Context<Timer>, _: Option<StateType>) {}
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let clock = ManualClock::default();
    let mut machine = StateMachine::with_clock(
        Timer { elapsed: 0.0 },
        Some(Box::new(Red)),
        clock.clone(),
    );

    println!("\nStepping 20 simulated seconds, one second per tick:");
    for _ in 0..20 {
        clock.advance(Duration::seconds(1));
        machine.update();
    }

    println!("\nAfter 20 seconds:");
    println!("- Current light: {:?}", machine.state_type());
    println!("- Is green: {}", machine.state_is::<Green>());
    println!("- Seconds in light: {:.1}", machine.data().elapsed);

    println!("\n=== Example Complete ===");
}
