//! Tree‑walking evaluator.
//!
//! Statements execute to a [`Flow`]: `Completed`, or one of the two control
//! signals (`Break`, `Return`) that travel up through ordinary return values
//! until the enclosing loop or call consumes them.  Genuine failures travel
//! separately as `Err(LoxError::Runtime { .. })`.

use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ControlFlowKind, Expr, ExprId, LiteralValue, Stmt};
use crate::environment::{EnvRef, Environment, Globals};
use crate::error::{Diagnostics, LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::{Callable, Value};

/// Where a resolved local lives: `depth` frames up, at `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub depth: usize,
    pub slot: usize,
}

/// Outcome of executing one statement.  Signals keep the keyword that
/// raised them.
#[derive(Debug)]
enum Flow<'a> {
    Completed,
    Break(&'a Token),
    Return { keyword: &'a Token, value: Value },
}

pub struct Interpreter<W: Write = Stdout> {
    globals: Globals,
    /// Innermost local frame; `None` while executing at global scope.
    environment: Option<EnvRef>,
    locals: HashMap<ExprId, Address>,
    out: W,
}

impl Interpreter {
    /// Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Interpreter printing into `out`; seeds the `clock` native.
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let mut globals = Globals::new();

        debug!("Defining native function 'clock'");

        globals.define(
            "clock",
            Value::Native {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let millis = chrono::Utc::now().timestamp_millis();
                    Ok(Value::Number(millis as f64))
                },
            },
        );

        Self {
            globals,
            environment: None,
            locals: HashMap::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Called by the resolver for every local reference.
    pub fn note_local(&mut self, id: ExprId, depth: usize, slot: usize) {
        self.locals.insert(id, Address { depth, slot });
    }

    /// Resolution recorded for `id`, if it is a local.
    pub fn resolved(&self, id: ExprId) -> Option<Address> {
        self.locals.get(&id).copied()
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    /// Executes a program.  The first runtime error is reported into
    /// `diagnostics` and stops execution.
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute_top_level(stmt) {
                debug!("Runtime error: {}", e);
                self.environment = None;
                diagnostics.report(e);
                break;
            }
        }

        // Output printed before a runtime error still has to reach the sink.
        if let Err(e) = self.out.flush() {
            diagnostics.report(e.into());
            return;
        }

        if !diagnostics.had_runtime_error() {
            info!("Interpretation completed successfully");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    /// A signal that escapes to the top level has nothing to stop it.  Only
    /// programs that skipped the resolver can get here.
    fn execute_top_level(&mut self, stmt: &Stmt) -> Result<()> {
        match self.execute(stmt)? {
            Flow::Completed => Ok(()),
            Flow::Break(keyword) => {
                Err(LoxError::runtime(keyword, "Can't use 'break' outside of a loop."))
            }
            Flow::Return { keyword, .. } => {
                Err(LoxError::runtime(keyword, "Can't return from top-level code."))
            }
        }
    }

    fn execute<'a>(&mut self, stmt: &'a Stmt) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Completed)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                Ok(Flow::Completed)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);

                self.define(name, value);
                Ok(Flow::Completed)
            }

            Stmt::Block(statements) => {
                let frame = Environment::new(self.environment.clone());
                self.execute_block(statements, frame)
            }

            Stmt::If {
                keyword,
                condition,
                then_branch,
                else_branch,
            } => {
                let value = self.evaluate(condition)?;

                if truthy(&value, keyword, "Condition must be a boolean.")? {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Completed)
                }
            }

            Stmt::While {
                keyword,
                condition,
                body,
            } => {
                debug!("Entering while loop");

                loop {
                    let value = self.evaluate(condition)?;

                    if !truthy(&value, keyword, "Condition must be a boolean.")? {
                        break;
                    }

                    match self.execute(body)? {
                        Flow::Completed => {}
                        Flow::Break(_) => break,
                        signal @ Flow::Return { .. } => return Ok(signal),
                    }
                }

                debug!("Exited while loop");

                Ok(Flow::Completed)
            }

            Stmt::ControlFlow { keyword, kind } => match kind {
                ControlFlowKind::Break => Ok(Flow::Break(keyword)),
            },

            Stmt::Function { name, function } => {
                let callable = Callable {
                    name: Some(name.lexeme.clone()),
                    declaration: Rc::clone(function),
                    closure: self.environment.clone(),
                };

                debug!("Defining function '{}'", name.lexeme);

                self.define(name, Value::Function(Rc::new(callable)));
                Ok(Flow::Completed)
            }

            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return { keyword, value })
            }
        }
    }

    /// Run `statements` inside `frame`, restoring the previous frame on
    /// every exit path.
    fn execute_block<'a>(&mut self, statements: &'a [Stmt], frame: EnvRef) -> Result<Flow<'a>> {
        let previous = self.environment.replace(frame);

        let result = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all<'a>(&mut self, statements: &'a [Stmt]) -> Result<Flow<'a>> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Completed => {}
                signal => return Ok(signal),
            }
        }

        Ok(Flow::Completed)
    }

    /// Bind in the current frame: a new slot locally, a name at global scope.
    fn define(&mut self, name: &Token, value: Value) {
        match &self.environment {
            Some(frame) => {
                frame.borrow_mut().define(value);
            }
            None => self.globals.define(&name.lexeme, value),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let truth = truthy(&left, operator, "Operands must be booleans.")?;

                let short_circuit = match operator.token_type {
                    TokenType::OR => truth,
                    _ => !truth,
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.lookup_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                self.assign_variable(*id, name, value.clone())?;
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(callee, paren, args)
            }

            Expr::Function(function) => Ok(Value::Function(Rc::new(Callable {
                name: None,
                declaration: Rc::clone(function),
                closure: self.environment.clone(),
            }))),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => {
                let truth = truthy(&value, operator, "Operand must be a boolean.")?;
                Ok(Value::Bool(!truth))
            }

            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    /// Right operand first, then left.
    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let right = self.evaluate(right)?;
        let left = self.evaluate(left)?;

        debug!("Binary '{}' on {:?} and {:?}", operator.lexeme, left, right);

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(operator, "Invalid values in + operator.")),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                if b == 0.0 {
                    return Err(LoxError::runtime(operator, "Can't divide by zero."));
                }
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        let found = match (self.locals.get(&id), &self.environment) {
            (Some(address), Some(frame)) => {
                Environment::get_at(frame, address.depth, address.slot)
            }
            (Some(_), None) => None,
            (None, _) => self.globals.get(&name.lexeme),
        };

        found.ok_or_else(|| undefined(name))
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Value) -> Result<()> {
        let assigned = match (self.locals.get(&id), &self.environment) {
            (Some(address), Some(frame)) => {
                Environment::assign_at(frame, address.depth, address.slot, value)
            }
            (Some(_), None) => false,
            (None, _) => self.globals.assign(&name.lexeme, value),
        };

        if assigned {
            Ok(())
        } else {
            Err(undefined(name))
        }
    }

    fn call_value(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Function(callable) => {
                check_arity(paren, callable.arity(), args.len())?;

                debug!("Calling function {:?}", callable.name);

                // Chained to the defining frame, not the caller's.
                let frame = Environment::new(callable.closure.clone());
                {
                    let mut frame = frame.borrow_mut();
                    for arg in args {
                        frame.define(arg);
                    }
                }

                match self.execute_block(&callable.declaration.body, frame)? {
                    Flow::Return { value, .. } => Ok(value),
                    Flow::Completed | Flow::Break(_) => Ok(Value::Nil),
                }
            }

            Value::Native { name, arity, func } => {
                check_arity(paren, arity, args.len())?;

                debug!("Calling native function '{}'", name);

                func(&args).map_err(|message| LoxError::runtime(paren, message))
            }

            _ => Err(LoxError::runtime(paren, "Can only call functions and classes.")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Only booleans have a truth value.
fn truthy(value: &Value, token: &Token, message: &str) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        _ => Err(LoxError::runtime(token, message)),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}

fn check_arity(paren: &Token, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }

    Ok(())
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
