//! Run-to-Completion State Machine
//!
//! This example demonstrates a machine whose states terminate it on their own.
//!
//! Key concepts:
//! - Building a machine with `StateMachineBuilder`
//! - Requesting transitions from inside hooks
//! - Terminating by switching to no state
//! - Driving the machine with `run_to_completion`
//!
//! Run with: RUST_LOG=tickstate=debug cargo run --example countdown

use tickstate::builder::StateMachineBuilder;
use tickstate::core::{State, StateType};
use tickstate::machine::Context;
use tracing_subscriber::EnvFilter;

struct Launch {
    remaining: u32,
    log: Vec<String>,
}

struct Countdown;
struct Liftoff;

impl State<Launch> for Countdown {
    fn on_enter(&mut self, machine: &mut Context<Launch>, _: Option<StateType>) {
        machine.data_mut().log.push("countdown started".to_string());
    }

    fn on_update(&mut self, machine: &mut Context<Launch>, _: f64) {
        let launch = machine.data_mut();
        launch.log.push(format!("T-{}", launch.remaining));
        launch.remaining -= 1;
        if launch.remaining == 0 {
            machine.switch_to(Liftoff);
        }
    }

    fn on_exit(&mut self, machine: &mut Context<Launch>, next: Option<StateType>) {
        let next = next.map_or("nothing", |state| state.name());
        machine.data_mut().log.push(format!("countdown handing over to {next}"));
    }
}

impl State<Launch> for Liftoff {
    fn on_enter(&mut self, machine: &mut Context<Launch>, _: Option<StateType>) {
        machine.data_mut().log.push("liftoff!".to_string());
    }

    fn on_update(&mut self, machine: &mut Context<Launch>, _: f64) {
        machine.terminate();
    }

    fn on_exit(&mut self, machine: &mut Context<Launch>, _: Option<StateType>) {
        machine.data_mut().log.push("mission complete".to_string());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Run-to-Completion Example ===\n");

    let mut machine = StateMachineBuilder::new()
        .data(Launch {
            remaining: 5,
            log: Vec::new(),
        })
        .initial(Countdown)
        .build()
        .unwrap();

    let cycles = machine.run_to_completion();

    for line in &machine.data().log {
        println!("  {line}");
    }

    println!("\nUpdate cycles: {cycles}");
    println!("Terminal: {}", !machine.is_state_valid());

    println!("\n=== Example Complete ===");
}
