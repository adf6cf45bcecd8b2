// src/evaluator.rs

use std::collections::HashMap;

use crate::ast::Node;
use crate::error::{Error, EvalError};
use crate::literal::Literal;
use crate::parser::parse;
use crate::registry::{FunctionRegistry, Rule};

/// Variable bindings for one evaluation call.
pub type Context = HashMap<String, Literal>;

// --- The Evaluator ---
impl Node {
    /// Evaluates the tree bottom-up. A call is resolved in this order: the
    /// function is looked up, its arity is checked, then its arguments are
    /// evaluated left to right (or handed to a lazy rule unevaluated).
    pub fn eval(&self, context: &Context, registry: &FunctionRegistry) -> Result<Literal, EvalError> {
        match self {
            Node::Literal(lit) => Ok(lit.clone()),

            Node::Variable(name) => context
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),

            Node::Call(name, args) => {
                let descriptor = registry
                    .get(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                descriptor.arity.check(name, args.len())?;
                tracing::trace!(function = %name, argc = args.len(), rule = ?descriptor.rule, "calling function");

                match &descriptor.rule {
                    Rule::Strict(func) => {
                        let values = eval_args(args, context, registry)?;
                        func(name, &values)
                    }
                    Rule::Host(func) => {
                        let values = eval_args(args, context, registry)?;
                        func(&values)
                    }
                    Rule::Lazy(func) => {
                        let mut eval_arg = |node: &Node| node.eval(context, registry);
                        func(name, args, &mut eval_arg)
                    }
                }
            }
        }
    }
}

fn eval_args(args: &[Node], context: &Context, registry: &FunctionRegistry) -> Result<Vec<Literal>, EvalError> {
    args.iter().map(|arg| arg.eval(context, registry)).collect()
}

pub fn evaluate(root: &Node, context: &Context, registry: &FunctionRegistry) -> Result<Literal, EvalError> {
    let result = root.eval(context, registry);
    if let Err(e) = &result {
        tracing::debug!(error = %e, "evaluation failed");
    }
    result
}

/// Parses and evaluates `input` in one step.
pub fn eval_str(input: &str, context: &Context, registry: &FunctionRegistry) -> Result<Literal, Error> {
    let tree = parse(input)?;
    Ok(evaluate(&tree, context, registry)?)
}
