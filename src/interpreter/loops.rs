//! Loop statement execution (`while`, `do-while`, `for`, `for-of`).
//!
//! Adds `impl Interpreter` methods for the loop forms of the language subset.
//! `break` and `continue` are propagated via `LoopBodyResult` so the loop
//! driver can react without inspecting `control_flow` directly.
//!
//! Every iteration is counted against the step budget, so an empty infinite
//! loop still terminates with a step-limit error.

use crate::interpreter::engine::{ControlFlow, Interpreter, Tracer};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::Scope;
use crate::memory::value::Value;
use crate::parser::ast::{DeclKind, Expr, ForInit, Stmt};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was triggered; the loop driver should unwind and leave
    /// `self.control_flow` for the caller.
    Exit,
}

impl<T: Tracer> Interpreter<T> {
    /// Executes one iteration of a loop body.
    pub(crate) fn execute_loop_body(&mut self, body: &Stmt) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_statement(body)?;
        match self.control_flow {
            ControlFlow::Normal => Ok(LoopBodyResult::Continue),
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Continue)
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Break)
            }
            ControlFlow::Return => Ok(LoopBodyResult::Exit),
        }
    }

    /// Executes a `while (condition) body` loop.
    pub(crate) fn execute_while(&mut self, condition: &Expr, body: &Stmt) -> Result<(), RuntimeError> {
        loop {
            self.tick()?;
            if !self.evaluate_expr(condition)?.is_truthy() {
                return Ok(());
            }
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => return Ok(()),
            }
        }
    }

    /// Executes a `do body while (condition)` loop. The body runs at least once.
    pub(crate) fn execute_do_while(&mut self, body: &Stmt, condition: &Expr) -> Result<(), RuntimeError> {
        loop {
            self.tick()?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => return Ok(()),
            }
            if !self.evaluate_expr(condition)?.is_truthy() {
                return Ok(());
            }
        }
    }

    /// Executes a `for (init; condition; update) body` loop.
    ///
    /// The initializer's bindings live in a scope that wraps the whole loop.
    /// With `let`, that scope is copied before every iteration, so a closure
    /// created in the body sees the value from its own iteration.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), RuntimeError> {
        self.enter_scope();
        let result = self.run_for(init, condition, update, body);
        self.exit_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), RuntimeError> {
        let per_iteration = matches!(init, Some(ForInit::Decl { kind: DeclKind::Let, .. }));
        match init {
            Some(ForInit::Decl { kind, declarators }) => self.execute_var_decl(*kind, declarators)?,
            Some(ForInit::Expr(expr)) => {
                self.evaluate_expr(expr)?;
            }
            None => {}
        }
        if per_iteration {
            self.scope = Scope::renewed(&self.scope);
        }

        loop {
            self.tick()?;
            if let Some(condition) = condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    return Ok(());
                }
            }
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => return Ok(()),
            }
            if per_iteration {
                self.scope = Scope::renewed(&self.scope);
            }
            if let Some(update) = update {
                self.evaluate_expr(update)?;
            }
        }
    }

    /// Executes a `for (kind name of iterable) body` loop.
    ///
    /// Arrays are iterated live by index, so elements pushed during the loop are
    /// visited too (a queue drained with `for...of` sees its new entries).
    pub(crate) fn execute_for_of(
        &mut self,
        kind: DeclKind,
        name: &str,
        iterable: &Expr,
        body: &Stmt,
    ) -> Result<(), RuntimeError> {
        let collection = self.evaluate_expr(iterable)?;
        let mut index = 0;

        loop {
            self.tick()?;
            let item = match &collection {
                Value::Array(array) => {
                    let array = array.borrow();
                    if index >= array.len() {
                        return Ok(());
                    }
                    array.get(index)
                }
                Value::Str(s) => match s.chars().nth(index) {
                    Some(ch) => Value::string(&ch.to_string()),
                    None => return Ok(()),
                },
                other => {
                    return Err(RuntimeError::type_error(format!(
                        "{} is not iterable",
                        other.type_of()
                    )))
                }
            };
            index += 1;

            self.enter_scope();
            self.declare(kind, name, item);
            let result = self.execute_loop_body(body);
            self.exit_scope();

            match result? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::harness::context::TraceContext;
    use crate::interpreter::engine::{Interpreter, Limits};
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parse_program;

    fn run_with(source: &str, limits: Limits) -> Result<Interpreter<TraceContext>, RuntimeError> {
        let program = parse_program(source).unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), limits);
        interp.run_program(&program)?;
        Ok(interp)
    }

    fn number(interp: &Interpreter<TraceContext>, name: &str) -> f64 {
        interp.global(name).and_then(|v| v.as_number()).unwrap()
    }

    #[test]
    fn test_for_let_closures_capture_each_iteration() {
        let source = "
            const fs = [];
            for (let i = 0; i < 3; i++) fs.push(() => i);
            const r = fs[0]() * 100 + fs[1]() * 10 + fs[2]();

            const gs = [];
            for (var j = 0; j < 3; j++) gs.push(() => j);
            const s = gs[0]() + gs[1]() + gs[2]();

            const hs = [];
            for (let k = 0; k < 3; k++) { hs.push(() => k); k++; }
            const t = hs[0]() * 10 + hs[1]();
        ";
        let interp = run_with(source, Limits::default()).unwrap();
        assert_eq!(number(&interp, "r"), 12.0);
        assert_eq!(number(&interp, "s"), 9.0);
        assert_eq!(number(&interp, "t"), 13.0);
    }

    #[test]
    fn test_for_loop_with_break_and_continue() {
        let source = "
            let sum = 0;
            for (let i = 0; i < 10; i++) {
                if (i % 2 === 0) continue;
                if (i > 7) break;
                sum += i;
            }
        ";
        let interp = run_with(source, Limits::default()).unwrap();
        assert_eq!(number(&interp, "sum"), 1.0 + 3.0 + 5.0 + 7.0);
    }

    #[test]
    fn test_while_and_do_while() {
        let source = "
            let n = 0;
            while (n < 5) n++;
            let m = 10;
            do { m++; } while (false);
        ";
        let interp = run_with(source, Limits::default()).unwrap();
        assert_eq!(number(&interp, "n"), 5.0);
        assert_eq!(number(&interp, "m"), 11.0);
    }

    #[test]
    fn test_for_of_sees_pushed_elements() {
        let source = "
            const queue = [1];
            let visited = 0;
            for (const x of queue) {
                visited++;
                if (x < 4) queue.push(x + 1);
            }
        ";
        let interp = run_with(source, Limits::default()).unwrap();
        assert_eq!(number(&interp, "visited"), 4.0);
    }

    #[test]
    fn test_return_inside_loop() {
        let source = "
            function find(arr, target) {
                for (let i = 0; i < arr.length; i++) {
                    if (arr[i] === target) return i;
                }
                return -1;
            }
            const hit = find([4, 5, 6], 6);
            const miss = find([4, 5, 6], 9);
        ";
        let interp = run_with(source, Limits::default()).unwrap();
        assert_eq!(number(&interp, "hit"), 2.0);
        assert_eq!(number(&interp, "miss"), -1.0);
    }

    #[test]
    fn test_infinite_loop_hits_step_limit() {
        let limits = Limits {
            max_steps: 1_000,
            ..Limits::default()
        };
        let err = run_with("while (true) {}", limits).err().unwrap();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 1_000 }));
    }

    #[test]
    fn test_for_of_non_iterable() {
        let err = run_with("for (const x of 5) {}", Limits::default()).err().unwrap();
        assert_eq!(err.to_string(), "TypeError: number is not iterable");
    }
}
