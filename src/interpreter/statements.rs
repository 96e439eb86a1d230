//! Statement execution implementation
//!
//! This module handles the execution of all statement types, including:
//!
//! - Variable declarations (`let`, `const`, `var`)
//! - Control flow (`if`/`else`, loops via [`super::loops`])
//! - `return`, `break`, `continue`, `throw`
//! - Blocks and `try`/`catch`/`finally`
//!
//! # Implementation
//!
//! All statement execution methods are implemented as `pub(crate)` methods
//! on the [`Interpreter`] struct.
//!
//! # Control Flow
//!
//! - `break`, `continue` and `return` set `control_flow`; enclosing statement lists stop
//!   executing and loops or calls consume the signal
//! - Errors propagate as `Err`; `try` intercepts catchable ones and always runs `finally`
//!   before an error or a pending `return` leaves the statement

use crate::interpreter::engine::{ControlFlow, Interpreter, Tracer};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::rc::Rc;

impl<T: Tracer> Interpreter<T> {
    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.tick()?;

        match stmt {
            Stmt::VarDecl {
                kind, declarators, ..
            } => self.execute_var_decl(*kind, declarators),
            Stmt::FunctionDecl { func, .. } => {
                // Already bound when the enclosing list was hoisted; rebinding keeps
                // declarations in single-statement slots working
                if let Some(name) = &func.name {
                    let closure = self.make_closure(func);
                    self.scope.borrow_mut().declare(name, closure, true);
                }
                Ok(())
            }
            Stmt::Expression { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(())
            }
            Stmt::Return { value, .. } => {
                self.return_value = match value {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::Undefined,
                };
                self.control_flow = ControlFlow::Return;
                Ok(())
            }
            Stmt::If {
                condition,
                consequent,
                alternate,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_statement(consequent)
                } else if let Some(alternate) = alternate {
                    self.execute_statement(alternate)
                } else {
                    Ok(())
                }
            }
            Stmt::While {
                condition, body, ..
            } => self.execute_while(condition, body),
            Stmt::DoWhile {
                body, condition, ..
            } => self.execute_do_while(body, condition),
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.execute_for(init.as_ref(), condition.as_ref(), update.as_ref(), body),
            Stmt::ForOf {
                kind,
                name,
                iterable,
                body,
                ..
            } => self.execute_for_of(*kind, name, iterable, body),
            Stmt::Block { body, .. } => self.execute_block(body),
            Stmt::Break { .. } => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }
            Stmt::Continue { .. } => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }
            Stmt::Throw { value, .. } => {
                let value = self.evaluate_expr(value)?;
                Err(RuntimeError::Thrown { value })
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
                ..
            } => self.execute_try(block, handler.as_ref(), finalizer.as_deref()),
            Stmt::Empty { .. } => Ok(()),
        }
    }

    pub(crate) fn execute_var_decl(
        &mut self,
        kind: DeclKind,
        declarators: &[Declarator],
    ) -> Result<(), RuntimeError> {
        for declarator in declarators {
            let value = match &declarator.init {
                Some(init) => self.evaluate_expr(init)?,
                // `var x;` keeps a hoisted value; `let x;` is undefined
                None if kind == DeclKind::Var => match self.lookup_variable(&declarator.name) {
                    Ok(existing) => existing,
                    Err(_) => Value::Undefined,
                },
                None => Value::Undefined,
            };
            self.declare(kind, &declarator.name, value);
        }
        Ok(())
    }

    /// Execute a statement list in a fresh block scope
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<(), RuntimeError> {
        self.enter_scope();
        self.hoist_functions(body);
        let result = self.execute_statements(body);
        self.exit_scope();
        result
    }

    fn execute_try(
        &mut self,
        block: &[Stmt],
        handler: Option<&CatchClause>,
        finalizer: Option<&[Stmt]>,
    ) -> Result<(), RuntimeError> {
        let saved_scope = Rc::clone(&self.scope);
        let mut result = self.execute_block(block);

        if let (Err(err), Some(handler)) = (&result, handler) {
            if err.is_catchable() {
                let caught = err.clone().into_value();
                self.scope = Rc::clone(&saved_scope);
                self.control_flow = ControlFlow::Normal;

                self.enter_scope();
                if let Some(param) = &handler.param {
                    self.scope.borrow_mut().declare(param, caught, true);
                }
                self.hoist_functions(&handler.body);
                result = self.execute_statements(&handler.body);
                self.exit_scope();
            }
        }

        let Some(finalizer) = finalizer else {
            return result;
        };

        // Resource limits abort the run without running user code
        if matches!(&result, Err(err) if !err.is_catchable()) {
            return result;
        }

        self.scope = saved_scope;
        let pending_flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
        let pending_value = std::mem::take(&mut self.return_value);

        self.execute_block(finalizer)?;

        if self.control_flow != ControlFlow::Normal {
            // break/continue/return inside `finally` overrides the try outcome
            return Ok(());
        }
        self.control_flow = pending_flow;
        self.return_value = pending_value;
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::harness::context::TraceContext;
    use crate::interpreter::engine::{Interpreter, Limits};
    use crate::interpreter::errors::RuntimeError;
    use crate::memory::value::Value;
    use crate::parser::parse_program;

    fn run(source: &str) -> Result<Interpreter<TraceContext>, RuntimeError> {
        let program = parse_program(source).unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program)?;
        Ok(interp)
    }

    fn global_number(interp: &Interpreter<TraceContext>, name: &str) -> f64 {
        interp.global(name).and_then(|v| v.as_number()).unwrap()
    }

    #[test]
    fn test_declarations_and_blocks() {
        let interp = run("let a = 1; { let a = 2; var b = a; } const c = a + b;").unwrap();
        assert_eq!(global_number(&interp, "c"), 3.0);
    }

    #[test]
    fn test_function_hoisting() {
        let interp = run("const r = twice(4); function twice(x) { return x * 2; }").unwrap();
        assert_eq!(global_number(&interp, "r"), 8.0);
    }

    #[test]
    fn test_var_hoisting() {
        let interp = run("function f() { x = 5; var x; return x; } const r = f();").unwrap();
        assert_eq!(global_number(&interp, "r"), 5.0);
    }

    #[test]
    fn test_const_assignment_fails() {
        let err = run("const x = 1; x = 2;").err().unwrap();
        assert_eq!(err.to_string(), "TypeError: Assignment to constant variable.");
    }

    #[test]
    fn test_finally_runs_on_return() {
        let source = "
            let log = [];
            function f() {
                try {
                    return 1;
                } finally {
                    log.push('finally');
                }
            }
            const r = f();
            const n = log.length;
        ";
        let interp = run(source).unwrap();
        assert_eq!(global_number(&interp, "r"), 1.0);
        assert_eq!(global_number(&interp, "n"), 1.0);
    }

    #[test]
    fn test_finally_runs_on_error_and_error_propagates() {
        let source = "
            let count = 0;
            function f() {
                try {
                    throw new Error('boom');
                } finally {
                    count++;
                }
            }
            let message = '';
            try { f(); } catch (e) { message = e.message; }
        ";
        let interp = run(source).unwrap();
        assert_eq!(global_number(&interp, "count"), 1.0);
        assert!(matches!(interp.global("message"), Some(Value::Str(s)) if &*s == "boom"));
    }

    #[test]
    fn test_catch_runtime_error() {
        let source = "let kind = ''; try { missing(); } catch (e) { kind = e.name; }";
        let interp = run(source).unwrap();
        assert!(matches!(interp.global("kind"), Some(Value::Str(s)) if &*s == "ReferenceError"));
    }

    #[test]
    fn test_uncaught_throw() {
        let err = run("throw new Error('bad input');").err().unwrap();
        assert_eq!(err.to_string(), "Uncaught Error: bad input");
    }
}
