//! Runtime storage for variables.
//!
//! Locals live in slot‑indexed [`Environment`] frames linked to their
//! enclosing frame; the resolver has already worked out `(distance, slot)`
//! for every local reference, so lookups never compare names.  Top‑level
//! bindings live in the name‑keyed [`Globals`] table instead.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::value::Value;

/// Shared handle to a frame.  Closures keep their defining frame alive.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    /// Append‑only; a slot index is never reused within a frame.
    slots: Vec<Value>,
    /// `None` when the enclosing frame is the global one.
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new(enclosing: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            slots: Vec::new(),
            enclosing,
        }))
    }

    /// Append a binding and return its slot.
    pub fn define(&mut self, value: Value) -> usize {
        self.slots.push(value);
        self.slots.len() - 1
    }

    /// The frame exactly `distance` links up from `env`.
    fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut frame: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next = frame.borrow().enclosing.clone()?;
            frame = next;
        }

        Some(frame)
    }

    pub fn get_at(env: &EnvRef, distance: usize, slot: usize) -> Option<Value> {
        let frame = Self::ancestor(env, distance)?;
        let value = frame.borrow().slots.get(slot).cloned();

        debug!(
            "get_at(distance={}, slot={}) -> {:?}",
            distance, slot, value
        );

        value
    }

    /// Overwrite an existing slot.  Returns `false` if it does not exist.
    pub fn assign_at(env: &EnvRef, distance: usize, slot: usize, value: Value) -> bool {
        let Some(frame) = Self::ancestor(env, distance) else {
            return false;
        };

        let mut frame = frame.borrow_mut();

        match frame.slots.get_mut(slot) {
            Some(existing) => {
                *existing = value;
                true
            }
            None => false,
        }
    }
}

/// Name‑addressed bindings of the global frame.
#[derive(Debug, Default)]
pub struct Globals {
    values: HashMap<String, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine; redefinition at the top level is allowed.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Assign to an existing global.  Returns `false` if `name` is undefined.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(existing) => {
                *existing = value;
                true
            }
            None => false,
        }
    }
}
