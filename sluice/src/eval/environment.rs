use crate::cell::Cell;
use crate::eval::Error;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Environment
///
/// A chain of frames binding symbols to values. The outermost frame
/// holds the global bindings (builtins, prelude and top level
/// definitions). Applying a closure or entering a `let` pushes a new
/// frame whose parent is the environment the closure captured.
///
/// Cloning an environment is cheap and yields a handle to the same
/// frames; bindings made through one handle are visible through the
/// other.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<Frame>,
}

/// A handle to an environment that does not keep its frames alive.
#[derive(Clone)]
pub struct WeakEnvironment {
    frame: Weak<Frame>,
}

struct Frame {
    bindings: RefCell<HashMap<String, Cell>>,
    parent: Option<Environment>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            frame: Rc::new(Frame {
                bindings: RefCell::new(HashMap::new()),
                parent: None,
            }),
        }
    }

    /// Extend
    ///
    /// Return a new, empty frame enclosed by this environment.
    pub fn extend(&self) -> Environment {
        self.extend_with(std::iter::empty())
    }

    /// Extend With
    ///
    /// Return a new frame enclosed by this environment, holding the
    /// given bindings.
    pub fn extend_with<T: IntoIterator<Item = (String, Cell)>>(&self, bindings: T) -> Environment {
        Environment {
            frame: Rc::new(Frame {
                bindings: RefCell::new(bindings.into_iter().collect()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Define
    ///
    /// Bind `symbol` in the innermost frame, replacing any existing
    /// binding in that frame.
    pub fn define(&self, symbol: &str, value: Cell) {
        let value = self.unlink(value);
        self.frame
            .bindings
            .borrow_mut()
            .insert(symbol.to_string(), value);
    }

    /// Set
    ///
    /// Rebind the nearest existing binding of `symbol`.
    pub fn set(&self, symbol: &str, value: Cell) -> Result<(), Error> {
        let mut env = Some(self);
        while let Some(it) = env {
            if let Some(slot) = it.frame.bindings.borrow_mut().get_mut(symbol) {
                *slot = it.unlink(value);
                return Ok(());
            }
            env = it.frame.parent.as_ref();
        }
        Err(Error::VariableNotBound(symbol.into()))
    }

    /// Lookup
    ///
    /// Return the value bound to `symbol` in the nearest frame that
    /// binds it.
    pub fn lookup(&self, symbol: &str) -> Option<Cell> {
        let mut env = Some(self);
        while let Some(it) = env {
            if let Some(value) = it.frame.bindings.borrow().get(symbol) {
                return Some(match value {
                    Cell::Procedure(procedure) => Cell::Procedure(procedure.upgrade()),
                    value => value.clone(),
                });
            }
            env = it.frame.parent.as_ref();
        }
        None
    }

    /// Unlink
    ///
    /// A closure bound in the very frame it captured (a recursive
    /// `define` or named `let`) is stored through a weak handle, so the
    /// frame and the closure do not keep each other alive. [`lookup`]
    /// hands out strong handles again.
    ///
    /// [`lookup`]: Environment::lookup
    fn unlink(&self, value: Cell) -> Cell {
        if let Cell::Procedure(procedure) = &value {
            if procedure.captures(self) {
                return Cell::Procedure(procedure.downgrade());
            }
        }
        value
    }

    /// Remove every binding in the innermost frame.
    pub fn clear(&self) {
        self.frame.bindings.borrow_mut().clear();
    }

    pub fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment {
            frame: Rc::downgrade(&self.frame),
        }
    }

    /// True if both handles refer to the same frame.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }

    pub fn is_bound(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_some()
    }

    /// Symbols bound in the innermost frame, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols = self
            .frame
            .bindings
            .borrow()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        symbols.sort();
        symbols
    }

    /// The enclosing environment, or `None` for the global frame.
    pub fn parent(&self) -> Option<&Environment> {
        self.frame.parent.as_ref()
    }

    /// Number of frames from this one out to the global frame.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut env = self;
        while let Some(parent) = env.frame.parent.as_ref() {
            depth += 1;
            env = parent;
        }
        depth
    }
}

impl WeakEnvironment {
    pub fn upgrade(&self) -> Option<Environment> {
        self.frame.upgrade().map(|frame| Environment { frame })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for WeakEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(env) => f.debug_tuple("WeakEnvironment").field(&env).finish(),
            None => write!(f, "WeakEnvironment(<dropped>)"),
        }
    }
}

// Frames are routinely captured by the closures they bind, so a
// derived Debug would recurse forever.
impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("bindings", &self.frame.bindings.borrow().len())
            .finish()
    }
}
