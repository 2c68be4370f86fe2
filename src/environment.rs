use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// One scope frame. Frames link outward to the global frame, which has no
/// enclosing link. Closures hold an `Rc` to the frame they were created in,
/// which keeps it alive and lets them see later writes to it.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh frame enclosed by `enclosing` for sharing.
    pub fn child_of(enclosing: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Bind `name` in this frame, replacing any earlier binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up here, then outward.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite an existing binding here or outward. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The frame exactly `distance` links out from `env`.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut frame: Rc<RefCell<Environment>> = Rc::clone(env);

        for _ in 0..distance {
            let next = frame.borrow().enclosing.clone()?;
            frame = next;
        }

        Some(frame)
    }

    /// Read `name` from the frame `distance` links out, without searching.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Value> {
        debug!("get_at '{}' distance {}", name.lexeme, distance);

        Self::ancestor(env, distance)
            .and_then(|frame| frame.borrow().values.get(&name.lexeme).cloned())
            .ok_or_else(|| undefined(name))
    }

    /// Write `name` in the frame `distance` links out, without searching.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<()> {
        debug!("assign_at '{}' distance {}", name.lexeme, distance);

        let frame = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

impl fmt::Debug for Environment {
    // Frames can reach themselves through closures, so only the names of
    // this frame are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}
