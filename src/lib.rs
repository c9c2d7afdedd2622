//! Tickstate: multicast events and lifecycle state machines
//!
//! Two small primitives for single-owner control loops such as a game
//! object's per-tick logic. Both are synchronous and single-threaded; every
//! call runs to completion on the calling thread.
//!
//! # Core Concepts
//!
//! - **Event**: ordered multicast dispatch with bind/unbind/invoke
//! - **State**: enter/update/exit hooks implemented by your own types
//! - **StateMachine**: owns data and one current state, drives transitions
//!   and measures the time between updates
//!
//! # Example
//!
//! ```rust
//! use tickstate::core::{State, StateType};
//! use tickstate::event::Event;
//! use tickstate::machine::{Context, StateMachine};
//!
//! struct Charging;
//! struct Firing;
//!
//! impl State<f64> for Charging {
//!     fn on_enter(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
//!
//!     fn on_update(&mut self, machine: &mut Context<f64>, delta_time: f64) {
//!         *machine.data_mut() += delta_time;
//!         if *machine.data() >= 1.0 {
//!             machine.switch_to(Firing);
//!         }
//!     }
//!
//!     fn on_exit(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
//! }
//!
//! impl State<f64> for Firing {
//!     fn on_enter(&mut self, machine: &mut Context<f64>, _: Option<StateType>) {
//!         machine.set_data(0.0);
//!     }
//!
//!     fn on_update(&mut self, machine: &mut Context<f64>, _: f64) {
//!         machine.terminate();
//!     }
//!
//!     fn on_exit(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
//! }
//!
//! let mut machine = StateMachine::with_state(1.0, Charging);
//! machine.update();
//! assert!(machine.state_is::<Firing>());
//!
//! let mut on_fire: Event<u32, u32> = Event::new();
//! on_fire.bind_with("damage", |power| power * 2);
//! assert_eq!(on_fire.invoke(5), Some(10));
//! ```

pub mod builder;
pub mod core;
pub mod event;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use self::core::{Clock, ManualClock, State, StateType, SystemClock, MIN_DELTA_TIME};
pub use event::{Event, Handler, Key};
pub use machine::{Context, StateMachine};
