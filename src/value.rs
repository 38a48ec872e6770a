use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionExpr;
use crate::environment::Environment;

/// Signature of a host‑implemented function.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

/// A user function paired with the environment it was defined in.
#[derive(Clone)]
pub struct Callable {
    /// `None` for anonymous function literals.
    pub name: Option<String>,
    pub declaration: Rc<FunctionExpr>,
    /// Defining frame; `None` when defined at global scope.
    pub closure: Option<Rc<RefCell<Environment>>>,
}

impl Callable {
    pub fn arity(&self) -> usize {
        self.declaration.arity()
    }
}

// The closure frame usually holds this very value, so it is left out.
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Callable {
    /// Same declaration captured over the same frame.
    fn eq(&self, other: &Self) -> bool {
        let same_closure = match (&self.closure, &other.closure) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        Rc::ptr_eq(&self.declaration, &other.declaration) && same_closure
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Rc<Callable>),
    Native {
        name: &'static str,
        arity: usize,
        func: NativeFn,
    },
}

/// Same variant and same value; no coercion across types.  Natives are
/// told apart by name.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Native { name: a, .. }, Value::Native { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                // Fixed six‑decimal rendering with a whole‑number `.000000` stripped.
                let text = format!("{:.6}", n);
                match text.strip_suffix(".000000") {
                    Some(whole) => write!(f, "{}", whole),
                    None => write!(f, "{}", text),
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Function(callable) => match &callable.name {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },

            Value::Native { name, .. } => write!(f, "<native fn {}>", name),
        }
    }
}
