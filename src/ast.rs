//! Syntax tree shared by the parser, resolver and interpreter.
//!
//! Two node families: [`Expr`] and [`Stmt`].  Nodes that the resolver
//! annotates (`Variable`, `Assign`) carry an [`ExprId`]; the resolution table
//! is keyed on that id rather than on node addresses or structure.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of a resolvable expression node.
///
/// Ids are unique for the lifetime of the process, so nodes parsed from
/// different REPL lines never collide in an interpreter's resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token so the tree does not need
/// the token buffer afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Parameters and body of a function.  Shared between the `Function`
/// statement, the anonymous `Function` expression, and every callable value
/// created from them.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl FunctionExpr {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix `!` or `-`.
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

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
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Anonymous function literal: `fun (a, b) { ... }`.
    Function(Rc<FunctionExpr>),
}

/// Loop/call‑boundary control statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlowKind {
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        /// The `if` keyword, for condition errors.
        keyword: Token,
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop; `for` loops are desugared into this.
    While {
        /// `while`, or `for` when desugared.
        keyword: Token,
        condition: Expr,
        body: Box<Stmt>,
    },

    ControlFlow {
        keyword: Token,
        kind: ControlFlowKind,
    },

    /// Named function declaration wrapping an anonymous function.
    Function {
        name: Token,
        function: Rc<FunctionExpr>,
    },

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,
        /// Absent ⇒ the call yields `nil`.
        value: Option<Expr>,
    },
}
