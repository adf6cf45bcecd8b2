// src/ast.rs

use std::collections::BTreeSet;
use std::fmt;

use crate::literal::Literal;

// AST Definition
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Literal),
    Variable(String),
    /// Function symbol and its ordered arguments.
    Call(String, Vec<Node>),
}

impl Node {
    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call(name.into(), args)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    /// Nesting depth; a lone literal or variable has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Literal(_) | Node::Variable(_) => 1,
            Node::Call(_, args) => 1 + args.iter().map(Node::depth).max().unwrap_or(0),
        }
    }

    /// Names of every variable referenced anywhere in the tree, including
    /// branches a conditional might skip.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Node::Literal(_) => {}
            Node::Variable(name) => {
                names.insert(name.as_str());
            }
            Node::Call(_, args) => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Node::Literal(lit)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(lit) => write!(f, "{}", lit.to_source()),
            Node::Variable(name) => write!(f, "{}", name),
            Node::Call(name, args) => {
                write!(f, "({}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
