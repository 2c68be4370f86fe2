//! Syntax tree shared by the parser, resolver and interpreter.
//!
//! Nodes are immutable once built. Expressions that the resolver annotates
//! (`Variable`, `Assign`, `This`, `Super`) carry an [`ExprId`] so resolution
//! facts can be keyed by node identity instead of by structure: two `a`
//! references in different scopes look identical but resolve differently.

use std::rc::Rc;

use crate::token::Token;

/// Stable identity of a resolvable expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A literal constant written directly in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Integral lexemes such as `3` are still stored as `3.0`.
    Number(f64),
    Str(String),
    True,
    False,
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// `!x` or `-x`.
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)`, kept for error locations.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get {
        object: Box<Expr>,
        name: Token,
    },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// A named function or method declaration.
///
/// Shared behind an `Rc` so closures created at runtime can keep their body
/// alive independently of the statement list that declared them.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),

    Print(Expr),

    /// `var name (= initializer)?;`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// Also the target of `for` desugaring.
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: Token,
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
