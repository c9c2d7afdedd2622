//! Multicast Event Dispatch
//!
//! This example demonstrates binding, invoking and unbinding callbacks.
//!
//! Key concepts:
//! - Named bindings with `bind_with`
//! - Self-identifying `Handler` bindings with `+=` and `-=`
//! - Last-result-wins invocation
//! - Fail-fast delivery with `try_invoke`
//!
//! Run with: RUST_LOG=tickstate=trace cargo run --example event_dispatch

use std::cell::RefCell;
use std::rc::Rc;
use tickstate::event::{Event, Handler};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Event Dispatch Example ===\n");

    let mut on_damage: Event<u32, u32> = Event::new();
    on_damage.bind_with("armor", |amount| amount / 2);
    on_damage.bind_with("shield", |amount| amount.saturating_sub(10));

    println!("Bound: {on_damage:?}");
    println!("Damage 40 -> last result {:?}", on_damage.invoke(40));

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let audit = Handler::new(move |amount: u32| {
        sink.borrow_mut().push(amount);
        amount
    });

    on_damage += audit.clone();
    on_damage.invoke(12);
    on_damage.invoke(30);
    on_damage -= audit;

    println!("Audited amounts: {:?}", log.borrow());
    println!("Still bound: {} callbacks", on_damage.count());

    let mut on_save: Event<&str, Result<usize, String>> = Event::new();
    on_save.bind_with("validate", |name| {
        if name.is_empty() {
            Err("empty name".to_string())
        } else {
            Ok(name.len())
        }
    });
    on_save.bind_with("write", |name| Ok(name.len() * 2));

    println!("\nSave \"profile\": {:?}", on_save.try_invoke("profile"));
    println!("Save \"\": {:?}", on_save.try_invoke(""));

    println!("\n=== Example Complete ===");
}
