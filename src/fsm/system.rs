//! Generic labeled-transition state machine

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a state inside its [`FsmSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// One state of a machine driving a context `C`
pub trait FsmState<C> {
    fn name(&self) -> &'static str;

    /// Check exit conditions. A returned label is fired through
    /// [`FsmSystem::perform_transition`].
    fn reason(&mut self, _ctx: &mut C) -> Option<&'static str> {
        None
    }

    /// Behavior while current, run after `reason`
    fn act(&mut self, _ctx: &mut C) {}

    fn on_enter(&mut self, _ctx: &mut C) {}

    fn on_exit(&mut self, _ctx: &mut C) {}
}

struct Slot<C> {
    state: Box<dyn FsmState<C>>,
    transitions: AHashMap<&'static str, StateId>,
}

/// Deterministic FSM: every state maps each label to at most one target
pub struct FsmSystem<C> {
    slots: Vec<Slot<C>>,
    current: Option<StateId>,
}

impl<C> FsmSystem<C> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: None,
        }
    }

    /// Register a state. The first state added becomes current. A state
    /// whose name is already registered is not added again; the existing
    /// id is returned.
    pub fn add_state(&mut self, state: Box<dyn FsmState<C>>) -> StateId {
        if let Some(existing) = self.find(state.name()) {
            return existing;
        }

        let id = StateId(self.slots.len());
        self.slots.push(Slot {
            state,
            transitions: AHashMap::new(),
        });
        if self.current.is_none() {
            self.current = Some(id);
        }
        id
    }

    /// Add `label` from `from` to `to`. The first registration of a label
    /// wins; later ones (and unknown states) return false.
    pub fn add_transition(&mut self, from: StateId, label: &'static str, to: StateId) -> bool {
        if to.0 >= self.slots.len() {
            return false;
        }
        let Some(slot) = self.slots.get_mut(from.0) else {
            return false;
        };
        if slot.transitions.contains_key(label) {
            return false;
        }
        slot.transitions.insert(label, to);
        true
    }

    pub fn find(&self, name: &str) -> Option<StateId> {
        self.slots
            .iter()
            .position(|slot| slot.state.name() == name)
            .map(StateId)
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current.map(|id| self.slots[id.0].state.name())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Target of `label` from `state`, if registered
    pub fn transition(&self, state: StateId, label: &str) -> Option<StateId> {
        self.slots.get(state.0)?.transitions.get(label).copied()
    }

    /// Follow `label` from the current state. Unregistered labels change
    /// nothing and return false.
    pub fn perform_transition(&mut self, label: &str, ctx: &mut C) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(target) = self.transition(current, label) else {
            return false;
        };
        tracing::debug!(label, from = self.slots[current.0].state.name(), to = self.slots[target.0].state.name(), "FSM transition");
        self.swap(current, target, ctx);
        true
    }

    /// Switch to `target` without looking at any label. Only fails for a
    /// state that was never added.
    pub fn force_perform_transition(&mut self, target: StateId, ctx: &mut C) -> bool {
        if target.0 >= self.slots.len() {
            return false;
        }
        match self.current {
            Some(current) => {
                tracing::debug!(from = self.slots[current.0].state.name(), to = self.slots[target.0].state.name(), "FSM forced transition");
                self.swap(current, target, ctx);
            }
            None => {
                self.current = Some(target);
                self.slots[target.0].state.on_enter(ctx);
            }
        }
        true
    }

    fn swap(&mut self, from: StateId, to: StateId, ctx: &mut C) {
        self.slots[from.0].state.on_exit(ctx);
        self.current = Some(to);
        self.slots[to.0].state.on_enter(ctx);
    }

    /// One tick: reason on the current state, then act on whatever state is
    /// current afterwards
    pub fn update(&mut self, ctx: &mut C) {
        let Some(current) = self.current else {
            return;
        };
        if let Some(label) = self.slots[current.0].state.reason(ctx) {
            self.perform_transition(label, ctx);
        }
        if let Some(current) = self.current {
            self.slots[current.0].state.act(ctx);
        }
    }
}

impl<C> Default for FsmSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        entries: Vec<String>,
        go: bool,
    }

    struct Named(&'static str);

    impl FsmState<Log> for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn reason(&mut self, ctx: &mut Log) -> Option<&'static str> {
            ctx.go.then_some("Go")
        }

        fn act(&mut self, ctx: &mut Log) {
            ctx.entries.push(format!("act {}", self.0));
        }

        fn on_enter(&mut self, ctx: &mut Log) {
            ctx.entries.push(format!("enter {}", self.0));
        }

        fn on_exit(&mut self, ctx: &mut Log) {
            ctx.entries.push(format!("exit {}", self.0));
        }
    }

    fn machine() -> (FsmSystem<Log>, StateId, StateId, StateId) {
        let mut fsm = FsmSystem::new();
        let a = fsm.add_state(Box::new(Named("a")));
        let b = fsm.add_state(Box::new(Named("b")));
        let c = fsm.add_state(Box::new(Named("c")));
        fsm.add_transition(a, "Go", b);
        (fsm, a, b, c)
    }

    #[test]
    fn test_first_state_is_current() {
        let (fsm, a, _, _) = machine();
        assert_eq!(fsm.current(), Some(a));
        assert_eq!(fsm.current_name(), Some("a"));
    }

    #[test]
    fn test_duplicate_state_not_added() {
        let (mut fsm, a, _, _) = machine();
        assert_eq!(fsm.add_state(Box::new(Named("a"))), a);
        assert_eq!(fsm.len(), 3);
    }

    #[test]
    fn test_first_transition_registration_wins() {
        let (mut fsm, a, b, c) = machine();
        assert!(!fsm.add_transition(a, "Go", c));
        assert_eq!(fsm.transition(a, "Go"), Some(b));
    }

    #[test]
    fn test_perform_runs_exit_then_enter() {
        let (mut fsm, _, b, _) = machine();
        let mut log = Log::default();

        assert!(fsm.perform_transition("Go", &mut log));
        assert_eq!(fsm.current(), Some(b));
        assert_eq!(log.entries, vec!["exit a", "enter b"]);
    }

    #[test]
    fn test_unknown_label_is_noop() {
        let (mut fsm, a, _, _) = machine();
        let mut log = Log::default();

        assert!(!fsm.perform_transition("Nope", &mut log));
        assert_eq!(fsm.current(), Some(a));
        assert!(log.entries.is_empty());
    }

    #[test]
    fn test_force_ignores_labels() {
        let (mut fsm, _, _, c) = machine();
        let mut log = Log::default();

        assert!(fsm.force_perform_transition(c, &mut log));
        assert_eq!(fsm.current(), Some(c));
        assert!(!fsm.force_perform_transition(StateId(9), &mut log));
    }

    #[test]
    fn test_update_acts_on_new_state() {
        let (mut fsm, _, b, _) = machine();
        let mut log = Log {
            go: true,
            ..Log::default()
        };

        fsm.update(&mut log);

        assert_eq!(fsm.current(), Some(b));
        assert_eq!(log.entries, vec!["exit a", "enter b", "act b"]);
    }
}
