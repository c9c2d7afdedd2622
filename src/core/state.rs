//! Core State trait for state machine states.
//!
//! A state is a value with three lifecycle hooks. The machine that owns it
//! passes itself in (as a [`Context`]) on every call, so a state can read and
//! change the machine's data or request the next transition without holding
//! a reference to the machine.

use crate::machine::Context;
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Trait for state machine states.
///
/// The other side of a transition is described by a [`StateType`] rather
/// than a reference, which allows a state to be exited and re-entered in
/// place.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{State, StateType};
/// use tickstate::machine::Context;
///
/// struct Idle;
/// struct Walking;
///
/// impl State<f64> for Idle {
///     fn on_enter(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
///
///     fn on_update(&mut self, machine: &mut Context<f64>, _: f64) {
///         if *machine.data() > 0.0 {
///             machine.switch_to(Walking);
///         }
///     }
///
///     fn on_exit(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
/// }
///
/// impl State<f64> for Walking {
///     fn on_enter(&mut self, _: &mut Context<f64>, previous: Option<StateType>) {
///         assert!(previous.is_some_and(|p| p.is::<Idle>()));
///     }
///
///     fn on_update(&mut self, _: &mut Context<f64>, _: f64) {}
///
///     fn on_exit(&mut self, _: &mut Context<f64>, _: Option<StateType>) {}
/// }
/// ```
pub trait State<D>: sealed::Typed + 'static {
    /// Called when the machine installs this state.
    ///
    /// `previous` is `None` when the machine was terminal (including at
    /// construction).
    fn on_enter(&mut self, machine: &mut Context<D>, previous: Option<StateType>);

    /// Called on every machine update with the elapsed seconds.
    fn on_update(&mut self, machine: &mut Context<D>, delta_time: f64);

    /// Called when the machine switches away from this state.
    ///
    /// `next` is `None` when the machine is becoming terminal.
    fn on_exit(&mut self, machine: &mut Context<D>, next: Option<StateType>);

    /// Short name for display and logging.
    ///
    /// Default implementation returns the type name without its module path.
    fn name(&self) -> &str {
        short_name(type_name::<Self>())
    }
}

impl<D> dyn State<D> {
    /// Runtime type descriptor of the concrete state behind this object.
    pub fn state_type(&self) -> StateType {
        sealed::Typed::type_descriptor(self)
    }
}

mod sealed {
    use super::StateType;

    /// Implemented for every sized `'static` type, so states cannot supply
    /// their own descriptor.
    pub trait Typed {
        fn type_descriptor(&self) -> StateType;
    }

    impl<T: 'static> Typed for T {
        fn type_descriptor(&self) -> StateType {
            StateType::of::<T>()
        }
    }
}

/// Type identity of a state, used to branch on the machine's current state
/// without downcasting.
#[derive(Clone, Copy)]
pub struct StateType {
    id: TypeId,
    name: &'static str,
}

impl StateType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Whether this describes `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Type name without its module path.
    pub fn name(&self) -> &'static str {
        short_name(self.name)
    }

    /// Fully qualified type name.
    pub fn full_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for StateType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateType {}

impl Hash for StateType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateType").field(&self.name()).finish()
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn short_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Initial;
    struct Processing;

    impl State<()> for Initial {
        fn on_enter(&mut self, _: &mut Context<()>, _: Option<StateType>) {}
        fn on_update(&mut self, _: &mut Context<()>, _: f64) {}
        fn on_exit(&mut self, _: &mut Context<()>, _: Option<StateType>) {}
    }

    impl State<()> for Processing {
        fn on_enter(&mut self, _: &mut Context<()>, _: Option<StateType>) {}
        fn on_update(&mut self, _: &mut Context<()>, _: f64) {}
        fn on_exit(&mut self, _: &mut Context<()>, _: Option<StateType>) {}

        fn name(&self) -> &str {
            "processing"
        }
    }

    #[test]
    fn state_name_defaults_to_type_name() {
        assert_eq!(Initial.name(), "Initial");
    }

    fn type_of(state: &dyn State<()>) -> StateType {
        state.state_type()
    }

    #[test]
    fn state_name_can_be_overridden() {
        assert_eq!(Processing.name(), "processing");
        assert_eq!(type_of(&Processing).name(), "Processing");
    }

    #[test]
    fn state_type_identifies_implementor() {
        let boxed: Box<dyn State<()>> = Box::new(Initial);
        let state_type = boxed.state_type();

        assert!(state_type.is::<Initial>());
        assert!(!state_type.is::<Processing>());
        assert!(!state_type.is::<dyn State<()>>());
        assert_eq!(state_type, StateType::of::<Initial>());
    }

    #[test]
    fn state_types_compare_by_type() {
        assert_eq!(type_of(&Initial), type_of(&Initial));
        assert_ne!(type_of(&Initial), type_of(&Processing));

        let set: HashSet<_> = [type_of(&Initial), type_of(&Initial)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn full_name_keeps_module_path() {
        let state_type = StateType::of::<Initial>();

        assert!(state_type.full_name().ends_with("tests::Initial"));
        assert_eq!(state_type.to_string(), "Initial");
        assert_eq!(format!("{state_type:?}"), r#"StateType("Initial")"#);
    }

    #[test]
    fn short_name_strips_paths_and_generics() {
        assert_eq!(short_name("a::b::Idle"), "Idle");
        assert_eq!(short_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_name("Plain"), "Plain");
    }
}
