// src/registry.rs

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::ast::Node;
use crate::builtins::BUILTINS;
use crate::error::EvalError;
use crate::literal::Literal;

/// Inclusive range of accepted argument counts. `max: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub const fn at_least(n: usize) -> Self {
        Arity { min: n, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    pub fn check(&self, function: &str, actual: usize) -> Result<(), EvalError> {
        if self.accepts(actual) {
            Ok(())
        } else {
            Err(EvalError::Arity {
                function: function.to_string(),
                expected: *self,
                actual,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Rule for a function whose arguments are all evaluated first. The first
/// parameter is the name the function was called by.
pub type StrictFn = fn(&str, &[Literal]) -> Result<Literal, EvalError>;

/// Rule for a function that decides which of its arguments get evaluated. The
/// callback evaluates one argument node in the caller's context.
pub type LazyFn =
    fn(&str, &[Node], &mut dyn FnMut(&Node) -> Result<Literal, EvalError>) -> Result<Literal, EvalError>;

/// Host-supplied function over evaluated arguments.
pub type HostFn = dyn Fn(&[Literal]) -> Result<Literal, EvalError> + Send + Sync;

#[derive(Clone)]
pub enum Rule {
    Strict(StrictFn),
    Lazy(LazyFn),
    Host(Arc<HostFn>),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Strict(_) => f.write_str("Strict"),
            Rule::Lazy(_) => f.write_str("Lazy"),
            Rule::Host(_) => f.write_str("Host"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub name: Cow<'static, str>,
    pub arity: Arity,
    pub rule: Rule,
}

impl FunctionDescriptor {
    pub fn host<F>(name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[Literal]) -> Result<Literal, EvalError> + Send + Sync + 'static,
    {
        FunctionDescriptor {
            name: Cow::Owned(name.into()),
            arity,
            rule: Rule::Host(Arc::new(func)),
        }
    }
}

/// Name -> descriptor table consulted by the evaluator.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDescriptor>,
}

lazy_static! {
    static ref SHARED_BUILTINS: FunctionRegistry = FunctionRegistry::with_builtins();
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn new() -> Self {
        FunctionRegistry { functions: HashMap::new() }
    }

    /// A fresh registry holding the built-in set, ready for host extensions.
    pub fn with_builtins() -> Self {
        let functions = BUILTINS
            .entries()
            .map(|(name, descriptor)| (name.to_string(), descriptor.clone()))
            .collect();
        FunctionRegistry { functions }
    }

    /// The built-in set, shared and initialized on first use.
    pub fn builtins() -> &'static FunctionRegistry {
        &SHARED_BUILTINS
    }

    /// Adds or replaces a function, returning the one it displaced.
    pub fn register(&mut self, descriptor: FunctionDescriptor) -> Option<FunctionDescriptor> {
        tracing::debug!(function = %descriptor.name, arity = %descriptor.arity, "registering function");
        self.functions.insert(descriptor.name.to_string(), descriptor)
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, arity: Arity, func: F) -> Option<FunctionDescriptor>
    where
        F: Fn(&[Literal]) -> Result<Literal, EvalError> + Send + Sync + 'static,
    {
        self.register(FunctionDescriptor::host(name, arity, func))
    }

    pub fn remove(&mut self, name: &str) -> Option<FunctionDescriptor> {
        self.functions.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
