//! Static resolver pass.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (a stack of name → `{defined, slot}` tables).
//! 2. Report static errors (redeclaration in the same scope, reading a local
//!    in its own initializer, `return` outside a function, `break` outside a
//!    loop).
//! 3. Tell the interpreter, for *each* local variable occurrence, how many
//!    frames up it lives and at which slot.  Anything not found in a scope is
//!    left unrecorded and looked up by name in the globals at runtime.
//!
//! The walk never stops early: every error is reported and the remaining
//! tree is still resolved.

use std::collections::HashMap;
use std::io::Write;

use crate::ast::{ControlFlowKind, Expr, ExprId, FunctionExpr, Stmt};
use crate::error::{Diagnostics, LoxError};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

#[derive(Copy, Clone, Debug)]
struct Binding {
    defined: bool,
    slot: usize,
}

/// One block or function body.
#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    /// Mirrors the runtime frame, which appends one slot per declaration.
    next_slot: usize,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// addresses by calling back into the interpreter.
pub struct Resolver<'i, W: Write> {
    interpreter: &'i mut Interpreter<W>,
    scopes: Vec<Scope>,
    current_function: FunctionType,
    loop_depth: usize,
    errors: Vec<LoxError>,
}

impl<'i, W: Write> Resolver<'i, W> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'i mut Interpreter<W>) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements, reporting into `diagnostics`.
    pub fn resolve(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        for e in self.errors.drain(..) {
            diagnostics.report(e);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function { name, function } => {
                // Defined before the body so the function can recurse.
                self.declare(name);
                self.define(name);
                self.resolve_function(function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While {
                condition, body, ..
            } => {
                self.resolve_expr(condition);

                self.loop_depth += 1;
                self.resolve_stmt(body);
                self.loop_depth -= 1;
            }

            Stmt::ControlFlow { keyword, kind } => match kind {
                ControlFlowKind::Break => {
                    if self.loop_depth == 0 {
                        self.error(keyword, "Can't use 'break' outside of a loop.");
                    }
                }
            },

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let uninitialized = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.bindings.get(&name.lexeme))
                    .is_some_and(|binding| !binding.defined);

                if uninitialized {
                    self.error(name, "Can't read local variable in its own initializer.");
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Function(function) => self.resolve_function(function),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.  The body
    /// shares the parameters' scope, matching the single frame a call creates.
    fn resolve_function(&mut self, function: &FunctionExpr) {
        let enclosing_function = self.current_function;
        let enclosing_loops = self.loop_depth;
        self.current_function = FunctionType::Function;
        self.loop_depth = 0;

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &function.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loops;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        let duplicate = scope.bindings.contains_key(&name.lexeme);

        let slot = scope.next_slot;
        scope.next_slot += 1;
        scope.bindings.insert(
            name.lexeme.clone(),
            Binding {
                defined: false,
                slot,
            },
        );

        if duplicate {
            self.error(name, "Already a variable with this name in this scope.");
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(binding) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.bindings.get_mut(&name.lexeme))
        {
            binding.defined = true;
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(LoxError::resolve_at(token, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑address helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at `(depth, slot)`, innermost scope
    /// first.  Not found in any scope ⇒ global, nothing recorded.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(binding) = scope.bindings.get(&name.lexeme) {
                debug!(
                    "Resolved '{}' {} at depth {} slot {}",
                    name.lexeme, id, depth, binding.slot
                );
                self.interpreter.note_local(id, depth, binding.slot);
                return;
            }
        }

        debug!("Resolved '{}' {} as global", name.lexeme, id);
    }
}
