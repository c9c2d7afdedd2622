//! State machine that drives lifecycle hooks.

use crate::builder::StateMachineBuilder;
use crate::core::{seconds_between, Clock, State, StateType, SystemClock, MIN_DELTA_TIME};
use crate::machine::context::{Context, Request};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, trace};
use uuid::Uuid;

/// A machine that owns some data and a single current state.
///
/// Transitions always run in the same order: the outgoing state's
/// `on_exit(next)`, then the swap, then the incoming state's
/// `on_enter(previous)`. A machine without a state is terminal.
///
/// Dropping a machine does not call `on_exit` on its current state; call
/// [`terminate`](Self::terminate) first when the exit hook must run.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{State, StateType};
/// use tickstate::machine::{Context, StateMachine};
///
/// struct Countdown;
///
/// impl State<u32> for Countdown {
///     fn on_enter(&mut self, _: &mut Context<u32>, _: Option<StateType>) {}
///
///     fn on_update(&mut self, machine: &mut Context<u32>, _: f64) {
///         *machine.data_mut() -= 1;
///         if *machine.data() == 0 {
///             machine.terminate();
///         }
///     }
///
///     fn on_exit(&mut self, _: &mut Context<u32>, _: Option<StateType>) {}
/// }
///
/// let mut machine = StateMachine::with_state(3, Countdown);
/// assert_eq!(machine.run_to_completion(), 3);
/// assert!(!machine.is_state_valid());
/// ```
pub struct StateMachine<D: 'static, C: Clock = SystemClock> {
    id: Uuid,
    state: Option<Box<dyn State<D>>>,
    context: Context<D>,
    clock: C,
}

impl<D: 'static> StateMachine<D> {
    /// Create a machine on the system clock.
    ///
    /// When `initial` is given it is entered immediately with no previous
    /// state.
    pub fn new(data: D, initial: Option<Box<dyn State<D>>>) -> Self {
        Self::with_clock(data, initial, SystemClock)
    }

    /// Create a machine on the system clock and enter `initial`.
    pub fn with_state<S: State<D>>(data: D, initial: S) -> Self {
        Self::new(data, Some(Box::new(initial)))
    }

    pub fn builder() -> StateMachineBuilder<D> {
        StateMachineBuilder::new()
    }
}

impl<D: 'static, C: Clock> StateMachine<D, C> {
    /// Create a machine that reads time from `clock`.
    pub fn with_clock(data: D, initial: Option<Box<dyn State<D>>>, clock: C) -> Self {
        Self::assemble(Uuid::new_v4(), data, initial, clock)
    }

    pub(crate) fn assemble(
        id: Uuid,
        data: D,
        initial: Option<Box<dyn State<D>>>,
        clock: C,
    ) -> Self {
        let now = clock.now();
        let mut machine = Self {
            id,
            state: None,
            context: Context::new(data, now),
            clock,
        };
        debug!(machine = %id, "state machine created");
        machine.switch_state(initial);
        machine
    }

    /// Identifier used in log records.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &D {
        self.context.data()
    }

    pub fn data_mut(&mut self) -> &mut D {
        self.context.data_mut()
    }

    /// Replace the data. No validation is performed.
    pub fn set_data(&mut self, data: D) {
        self.context.set_data(data);
    }

    /// Current state, or `None` when terminal.
    pub fn state(&self) -> Option<&dyn State<D>> {
        self.state.as_deref()
    }

    pub fn state_mut(&mut self) -> Option<&mut (dyn State<D> + 'static)> {
        self.state.as_deref_mut()
    }

    /// Type of the current state, or `None` when terminal.
    pub fn state_type(&self) -> Option<StateType> {
        self.state.as_ref().map(|state| state.state_type())
    }

    /// Whether the machine holds a state.
    pub fn is_state_valid(&self) -> bool {
        self.state.is_some()
    }

    /// Whether the current state is a `T`.
    pub fn state_is<T: ?Sized + 'static>(&self) -> bool {
        self.state_type().is_some_and(|state_type| state_type.is::<T>())
    }

    /// Time of the last update (construction time before the first one).
    pub fn last_update(&self) -> DateTime<Utc> {
        self.context.last_update()
    }

    /// Seconds between the last two updates, never below [`MIN_DELTA_TIME`].
    pub fn delta_time(&self) -> f64 {
        self.context.delta_time()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Switch to `next`, or to terminal when `None`, and return the state
    /// installed afterwards.
    ///
    /// Switching to a fresh instance of the current state's type still exits
    /// the old instance and enters the new one. Any transition requested by
    /// the hooks involved is applied before this returns.
    pub fn switch_state(&mut self, next: Option<Box<dyn State<D>>>) -> Option<&dyn State<D>> {
        self.discard_stale_request();
        self.transition(next);
        self.settle();
        self.state()
    }

    /// Switch to `next`.
    pub fn switch_to<S: State<D>>(&mut self, next: S) -> Option<&dyn State<D>> {
        self.switch_state(Some(Box::new(next)))
    }

    /// Exit the current state and become terminal.
    pub fn terminate(&mut self) {
        self.switch_state(None);
    }

    /// Exit the current state and enter it again, resetting it in place.
    ///
    /// Both hooks see the state's own type as the other side of the
    /// transition. Does nothing on a terminal machine.
    pub fn reenter(&mut self) -> Option<&dyn State<D>> {
        self.discard_stale_request();
        self.restart();
        self.settle();
        self.state()
    }

    /// Advance the timing and update the current state.
    ///
    /// Returns the state installed afterwards, which differs from the one
    /// updated when the state requested a transition.
    pub fn update(&mut self) -> Option<&dyn State<D>> {
        self.discard_stale_request();
        let now = self.clock.now();
        let elapsed = seconds_between(self.context.last_update(), now);
        if elapsed < 0.0 {
            debug!(machine = %self.id, elapsed, "clock moved backwards, clamping delta time");
        }
        let delta_time = elapsed.max(MIN_DELTA_TIME);
        self.context.record_update(now, delta_time);

        if let Some(state) = self.state.as_mut() {
            trace!(machine = %self.id, state = state.name(), delta_time, "updating state");
            state.on_update(&mut self.context, delta_time);
        }

        self.settle();
        self.state()
    }

    /// Update until the machine becomes terminal.
    ///
    /// Returns the number of updates performed. There is no timeout and no
    /// way to cancel; the loop ends only when some state terminates the
    /// machine.
    pub fn run_to_completion(&mut self) -> usize {
        let mut cycles = 0;
        loop {
            cycles += 1;
            if self.update().is_none() {
                break;
            }
        }
        debug!(machine = %self.id, cycles, "state machine ran to completion");
        cycles
    }

    fn transition(&mut self, next: Option<Box<dyn State<D>>>) {
        let previous_type = self.state_type();
        let next_type = next.as_ref().map(|state| state.state_type());
        if previous_type.is_none() && next_type.is_none() {
            return;
        }

        debug!(
            machine = %self.id,
            from = label(previous_type),
            to = label(next_type),
            "switching state"
        );

        if let Some(current) = self.state.as_mut() {
            current.on_exit(&mut self.context, next_type);
        }
        let previous = std::mem::replace(&mut self.state, next);
        if let Some(current) = self.state.as_mut() {
            current.on_enter(&mut self.context, previous_type);
        }
        drop(previous);
    }

    fn restart(&mut self) {
        let Some(current) = self.state.as_mut() else {
            return;
        };
        let own = current.state_type();
        debug!(machine = %self.id, state = own.name(), "re-entering state");

        current.on_exit(&mut self.context, Some(own));
        current.on_enter(&mut self.context, Some(own));
    }

    /// Drop a request left behind by a hook that unwound before it could be
    /// applied.
    fn discard_stale_request(&mut self) {
        if self.context.take_request().is_some() {
            debug!(machine = %self.id, "discarding transition request from an interrupted hook");
        }
    }

    /// Apply transitions requested by hooks until none remain.
    fn settle(&mut self) {
        while let Some(request) = self.context.take_request() {
            match request {
                Request::Switch(next) => self.transition(next),
                Request::Reenter => self.restart(),
            }
        }
    }
}

fn label(state: Option<StateType>) -> &'static str {
    state.map_or("<terminal>", |state_type| state_type.name())
}

impl<D: fmt::Debug + 'static, C: Clock> fmt::Debug for StateMachine<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("state", &self.state_type())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use chrono::Duration;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// State that records every hook it receives.
    struct Probe {
        tag: &'static str,
        log: Log,
    }

    impl Probe {
        fn boxed(tag: &'static str, log: &Log) -> Box<dyn State<Vec<f64>>> {
            Box::new(Self {
                tag,
                log: Rc::clone(log),
            })
        }
    }

    impl State<Vec<f64>> for Probe {
        fn on_enter(&mut self, _: &mut Context<Vec<f64>>, previous: Option<StateType>) {
            self.log
                .borrow_mut()
                .push(format!("{}.enter({})", self.tag, label(previous)));
        }

        fn on_update(&mut self, machine: &mut Context<Vec<f64>>, delta_time: f64) {
            machine.data_mut().push(delta_time);
            self.log.borrow_mut().push(format!("{}.update", self.tag));
        }

        fn on_exit(&mut self, _: &mut Context<Vec<f64>>, next: Option<StateType>) {
            self.log
                .borrow_mut()
                .push(format!("{}.exit({})", self.tag, label(next)));
        }
    }

    struct Other;

    impl State<Vec<f64>> for Other {
        fn on_enter(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
        fn on_update(&mut self, _: &mut Context<Vec<f64>>, _: f64) {}
        fn on_exit(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
    }

    /// Terminates itself on the given update.
    struct StopAfter {
        remaining: usize,
    }

    impl State<usize> for StopAfter {
        fn on_enter(&mut self, _: &mut Context<usize>, _: Option<StateType>) {}

        fn on_update(&mut self, machine: &mut Context<usize>, _: f64) {
            *machine.data_mut() += 1;
            self.remaining -= 1;
            if self.remaining == 0 {
                machine.terminate();
            }
        }

        fn on_exit(&mut self, _: &mut Context<usize>, _: Option<StateType>) {}
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn construction_enters_initial_state() {
        let log = log();
        let machine = StateMachine::new(Vec::new(), Some(Probe::boxed("a", &log)));

        assert_eq!(entries(&log), vec!["a.enter(<terminal>)"]);
        assert!(machine.is_state_valid());
        assert!(machine.state_is::<Probe>());
        assert_eq!(machine.state().map(|s| s.name()), Some("Probe"));
    }

    #[test]
    fn construction_without_state_is_terminal() {
        let machine: StateMachine<Vec<f64>> = StateMachine::new(Vec::new(), None);

        assert!(!machine.is_state_valid());
        assert!(machine.state_type().is_none());
        assert!(!machine.state_is::<Probe>());
        assert_eq!(machine.delta_time(), MIN_DELTA_TIME);
    }

    #[test]
    fn switch_exits_before_entering() {
        let log = log();
        let mut machine = StateMachine::new(Vec::new(), Some(Probe::boxed("a", &log)));

        machine.switch_state(Some(Box::new(Other)));

        assert_eq!(entries(&log), vec!["a.enter(<terminal>)", "a.exit(Other)"]);
        assert!(machine.state_is::<Other>());
    }

    #[test]
    fn switch_reports_previous_to_incoming_state() {
        let log = log();
        let mut machine: StateMachine<Vec<f64>> =
            StateMachine::new(Vec::new(), Some(Box::new(Other)));

        let installed = machine.switch_state(Some(Probe::boxed("b", &log)));

        assert!(installed.is_some_and(|s| s.state_type().is::<Probe>()));
        assert_eq!(entries(&log), vec!["b.enter(Other)"]);
    }

    #[test]
    fn switch_to_absent_exits_and_becomes_terminal() {
        let log = log();
        let mut machine = StateMachine::new(Vec::new(), Some(Probe::boxed("b", &log)));

        let installed = machine.switch_state(None);

        assert!(installed.is_none());
        assert!(!machine.is_state_valid());
        assert_eq!(entries(&log), vec!["b.enter(<terminal>)", "b.exit(<terminal>)"]);
    }

    #[test]
    fn switch_to_same_type_cycles_hooks() {
        let log = log();
        let mut machine = StateMachine::new(Vec::new(), Some(Probe::boxed("a", &log)));

        machine.switch_state(Some(Probe::boxed("a2", &log)));

        assert_eq!(
            entries(&log),
            vec!["a.enter(<terminal>)", "a.exit(Probe)", "a2.enter(Probe)"]
        );
    }

    #[test]
    fn reenter_exits_and_enters_in_place() {
        let log = log();
        let mut machine = StateMachine::new(Vec::new(), Some(Probe::boxed("a", &log)));

        machine.reenter();

        assert_eq!(
            entries(&log),
            vec!["a.enter(<terminal>)", "a.exit(Probe)", "a.enter(Probe)"]
        );
        assert!(machine.state_is::<Probe>());
    }

    #[test]
    fn terminal_operations_are_noops() {
        let mut machine: StateMachine<Vec<f64>> = StateMachine::new(Vec::new(), None);

        assert!(machine.switch_state(None).is_none());
        assert!(machine.reenter().is_none());
        assert!(machine.update().is_none());
        assert!(machine.data().is_empty());
    }

    #[test]
    fn update_on_terminal_machine_still_advances_timing() {
        let clock = ManualClock::default();
        let mut machine: StateMachine<Vec<f64>, ManualClock> =
            StateMachine::with_clock(Vec::new(), None, clock.clone());

        clock.advance(Duration::milliseconds(500));
        assert!(machine.update().is_none());

        assert!((machine.delta_time() - 0.5).abs() < 1e-9);
        assert_eq!(machine.last_update(), clock.now());

        clock.advance(Duration::milliseconds(100));
        machine.update();

        assert!((machine.delta_time() - 0.1).abs() < 1e-9);
        assert_eq!(machine.last_update(), clock.now());
        assert!(machine.data().is_empty());
    }

    #[test]
    fn update_passes_delta_time_to_state() {
        let log = log();
        let clock = ManualClock::default();
        let mut machine =
            StateMachine::with_clock(Vec::new(), Some(Probe::boxed("a", &log)), clock.clone());

        clock.advance(Duration::milliseconds(250));
        machine.update();

        assert!((machine.delta_time() - 0.25).abs() < 1e-9);
        assert_eq!(machine.data().len(), 1);
        assert!((machine.data()[0] - 0.25).abs() < 1e-9);
        assert_eq!(machine.last_update(), clock.now());
    }

    #[test]
    fn delta_time_is_clamped_when_no_time_passes() {
        let clock = ManualClock::default();
        let mut machine: StateMachine<Vec<f64>, ManualClock> =
            StateMachine::with_clock(Vec::new(), Some(Box::new(Other)), clock);

        machine.update();
        machine.update();

        assert_eq!(machine.delta_time(), MIN_DELTA_TIME);
    }

    #[test]
    fn delta_time_is_clamped_when_clock_goes_backwards() {
        let clock = ManualClock::default();
        let mut machine: StateMachine<Vec<f64>, ManualClock> =
            StateMachine::with_clock(Vec::new(), Some(Box::new(Other)), clock.clone());

        clock.advance(Duration::seconds(-3));
        machine.update();

        assert_eq!(machine.delta_time(), MIN_DELTA_TIME);
        assert_eq!(machine.last_update(), clock.now());
    }

    #[test]
    fn run_to_completion_counts_cycles() {
        let mut machine = StateMachine::with_state(0usize, StopAfter { remaining: 3 });

        assert_eq!(machine.run_to_completion(), 3);
        assert_eq!(*machine.data(), 3);
        assert!(!machine.is_state_valid());
    }

    #[test]
    fn run_to_completion_on_terminal_machine_updates_once() {
        let mut machine: StateMachine<usize> = StateMachine::new(0, None);

        assert_eq!(machine.run_to_completion(), 1);
    }

    #[test]
    fn set_data_replaces_payload() {
        let mut machine: StateMachine<Vec<f64>> = StateMachine::new(vec![1.0], None);

        machine.set_data(vec![2.0, 3.0]);
        machine.data_mut().push(4.0);

        assert_eq!(machine.data(), &vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn drop_does_not_exit_current_state() {
        let log = log();
        let machine = StateMachine::new(Vec::new(), Some(Probe::boxed("a", &log)));

        drop(machine);

        assert_eq!(entries(&log), vec!["a.enter(<terminal>)"]);
    }

    #[test]
    fn panicking_exit_keeps_old_state_installed() {
        struct FailsOnExit;

        impl State<()> for FailsOnExit {
            fn on_enter(&mut self, _: &mut Context<()>, _: Option<StateType>) {}
            fn on_update(&mut self, _: &mut Context<()>, _: f64) {}
            fn on_exit(&mut self, _: &mut Context<()>, _: Option<StateType>) {
                panic!("exit failed");
            }
        }

        let mut machine = StateMachine::with_state((), FailsOnExit);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            machine.terminate();
        }));

        assert!(result.is_err());
        assert!(machine.state_is::<FailsOnExit>());
    }

    #[test]
    fn request_from_unwound_hook_is_not_applied_later() {
        struct Flaky;

        impl State<Vec<f64>> for Flaky {
            fn on_enter(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
            fn on_update(&mut self, machine: &mut Context<Vec<f64>>, _: f64) {
                machine.terminate();
                panic!("update failed");
            }
            fn on_exit(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
        }

        let mut machine = StateMachine::with_state(Vec::<f64>::new(), Flaky);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            machine.update();
        }));
        assert!(result.is_err());
        assert!(machine.state_is::<Flaky>());

        let installed = machine.switch_to(Other);

        assert!(installed.is_some_and(|s| s.state_type().is::<Other>()));
        assert!(machine.is_state_valid());
        assert!(machine.state_is::<Other>());
    }

    #[test]
    fn stale_request_does_not_follow_update_or_reenter() {
        struct Flaky;

        impl State<Vec<f64>> for Flaky {
            fn on_enter(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
            fn on_update(&mut self, machine: &mut Context<Vec<f64>>, _: f64) {
                if machine.data().is_empty() {
                    machine.data_mut().push(0.0);
                    machine.terminate();
                    panic!("first update failed");
                }
            }
            fn on_exit(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
        }

        let mut machine = StateMachine::with_state(Vec::<f64>::new(), Flaky);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            machine.update();
        }));
        assert!(result.is_err());

        assert!(machine.update().is_some());
        assert!(machine.reenter().is_some());
        assert!(machine.state_is::<Flaky>());
    }

    #[test]
    fn inherent_state_type_on_a_state_does_not_mislead_the_machine() {
        struct Impostor;

        impl Impostor {
            #[allow(dead_code)]
            fn state_type(&self) -> StateType {
                StateType::of::<Other>()
            }
        }

        impl State<Vec<f64>> for Impostor {
            fn on_enter(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
            fn on_update(&mut self, _: &mut Context<Vec<f64>>, _: f64) {}
            fn on_exit(&mut self, _: &mut Context<Vec<f64>>, _: Option<StateType>) {}
        }

        let machine = StateMachine::with_state(Vec::<f64>::new(), Impostor);

        assert!(machine.state_is::<Impostor>());
        assert!(!machine.state_is::<Other>());
        assert_eq!(machine.state_type(), Some(StateType::of::<Impostor>()));
    }

    #[test]
    fn debug_shows_state_and_data() {
        let machine = StateMachine::with_state(Vec::<f64>::new(), Other);
        let rendered = format!("{machine:?}");

        assert!(rendered.contains("StateType(\"Other\")"));
        assert!(rendered.contains("data: []"));
    }
}
