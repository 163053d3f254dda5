use std::rc::Rc;

use ahash::AHashMap;

use crate::value::Value;

/// Index of a frame in the environment arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EnvId(u32);

impl EnvId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One activation's slot array plus a link to its lexically enclosing frame.
#[derive(Debug)]
struct Frame {
    slots: Vec<Value>,
    enclosing: Option<EnvId>,
}

/// Central storage for every frame created during execution.
///
/// Frames are addressed by `EnvId` instead of being linked by pointers, so
/// closures capturing a frame and frames enclosing each other never form
/// ownership cycles — the arena owns everything and drops with the session.
/// Slot indices are assigned by the resolver in declaration order, which
/// matches the order `define` pushes values at runtime.
#[derive(Debug, Default)]
pub(crate) struct Environments {
    frames: Vec<Frame>,
}

impl Environments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame whose enclosing frame is `enclosing` (`None` for a
    /// frame hanging directly off the globals).
    pub fn push_frame(&mut self, enclosing: Option<EnvId>) -> EnvId {
        let id = EnvId(u32::try_from(self.frames.len()).expect("environment arena exceeds u32 ids"));
        self.frames.push(Frame {
            slots: Vec::new(),
            enclosing,
        });
        id
    }

    /// Pushes a value onto the frame and returns its slot index.
    pub fn define(&mut self, env: EnvId, value: Value) -> usize {
        let slots = &mut self.frames[env.index()].slots;
        slots.push(value);
        slots.len() - 1
    }

    /// Walks `depth` enclosing hops from `env`.
    pub fn ancestor(&self, env: EnvId, depth: u16) -> EnvId {
        let mut current = env;
        for _ in 0..depth {
            current = self.frames[current.index()]
                .enclosing
                .expect("resolver-recorded depth stays within the frame chain");
        }
        current
    }

    pub fn get_at(&self, env: EnvId, depth: u16, slot: u16) -> &Value {
        let frame = self.ancestor(env, depth);
        &self.frames[frame.index()].slots[slot as usize]
    }

    pub fn assign_at(&mut self, env: EnvId, depth: u16, slot: u16, value: Value) {
        let frame = self.ancestor(env, depth);
        self.frames[frame.index()].slots[slot as usize] = value;
    }
}

/// The global scope: name-keyed, not slot-addressed. Top-level declarations
/// land here, which is also what lets a REPL session accumulate definitions
/// across lines.
#[derive(Debug, Default)]
pub(crate) struct Globals {
    values: AHashMap<Rc<str>, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines a global. First definition creates the entry.
    pub fn define(&mut self, name: Rc<str>, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Assigns only if the name already exists; assignment never creates a
    /// global.
    pub fn assign_if_present(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_returns_slot_indices_in_push_order() {
        let mut envs = Environments::new();
        let env = envs.push_frame(None);
        assert_eq!(envs.define(env, Value::Number(1.0)), 0);
        assert_eq!(envs.define(env, Value::Number(2.0)), 1);
    }

    #[test]
    fn get_at_walks_exactly_depth_hops() {
        let mut envs = Environments::new();
        let outer = envs.push_frame(None);
        envs.define(outer, Value::Number(10.0));
        let inner = envs.push_frame(Some(outer));
        envs.define(inner, Value::Number(20.0));

        assert!(matches!(envs.get_at(inner, 0, 0), Value::Number(n) if *n == 20.0));
        assert!(matches!(envs.get_at(inner, 1, 0), Value::Number(n) if *n == 10.0));
    }

    #[test]
    fn assign_at_writes_through_the_chain() {
        let mut envs = Environments::new();
        let outer = envs.push_frame(None);
        envs.define(outer, Value::Nil);
        let inner = envs.push_frame(Some(outer));
        envs.assign_at(inner, 1, 0, Value::Bool(true));
        assert!(matches!(envs.get_at(outer, 0, 0), Value::Bool(true)));
    }

    #[test]
    fn globals_assign_if_present() {
        let mut globals = Globals::new();
        assert!(!globals.assign_if_present("x", Value::Nil));
        globals.define("x".into(), Value::Number(1.0));
        assert!(globals.assign_if_present("x", Value::Number(2.0)));
        assert!(matches!(globals.get("x"), Some(Value::Number(n)) if *n == 2.0));
    }
}
