// Execution engine for the algorithm interpreter

use crate::interpreter::builtins;
use crate::interpreter::constants::{
    DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS, MAX_ARRAY_LENGTH,
};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::{AssignError, Scope, ScopeRef};
use crate::memory::value::{Closure, Value};
use crate::parser::ast::*;
use std::rc::Rc;

/// Receiver of everything the trace cares about: hook calls, writes to observed
/// arrays, and comparisons that read observed arrays.
pub trait Tracer {
    /// `__line(n)`
    fn line(&mut self, line: usize);

    /// `__enter(name, args)`, with the frame already rendered as `name(a, b)`
    fn enter(&mut self, frame: String);

    /// `__exit()`
    fn exit(&mut self);

    /// An observed array element is about to be overwritten
    fn overwrite(&mut self, index: usize, value: f64);

    /// Two elements of one observed array are about to be exchanged
    fn swap(&mut self, first: usize, second: usize);

    /// A comparison read these elements of an observed array
    fn compare(&mut self, indices: Vec<usize>);

    /// Line reported by the most recent `__line` call
    fn current_line(&self) -> Option<usize>;
}

/// Resource limits for one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_steps: u64,
    pub max_call_depth: usize,
    pub max_array_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
        }
    }
}

/// Non-local control flow raised by the last executed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return,
}

/// Tree-walking interpreter for the algorithm language
pub struct Interpreter<T: Tracer> {
    /// Destination of trace-relevant activity
    pub(crate) tracer: T,

    /// Global scope (builtins, hooks, top-level declarations)
    globals: ScopeRef,

    /// Innermost scope of the code currently executing
    pub(crate) scope: ScopeRef,

    /// Pending break/continue/return
    pub(crate) control_flow: ControlFlow,

    /// Value of the last executed `return`
    pub(crate) return_value: Value,

    /// Active user function calls
    call_depth: usize,

    /// Statements and loop iterations executed so far
    steps: u64,

    limits: Limits,
}

impl<T: Tracer> Interpreter<T> {
    /// Create an interpreter with the standard globals installed
    pub fn new(tracer: T, limits: Limits) -> Self {
        let globals = Scope::global();
        builtins::install_globals(&mut globals.borrow_mut());

        Interpreter {
            tracer,
            scope: Rc::clone(&globals),
            globals,
            control_flow: ControlFlow::Normal,
            return_value: Value::Undefined,
            call_depth: 0,
            steps: 0,
            limits,
        }
    }

    /// Bind (or rebind) a global name
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().declare(name, value, true);
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        Scope::lookup(&self.globals, name)
    }

    /// Global bound to a user function, if any
    pub fn lookup_function(&self, name: &str) -> Option<Value> {
        self.global(name)
            .filter(|value| matches!(value, Value::Function(_)))
    }

    /// Run all top-level statements (function declarations are hoisted first)
    pub fn run_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.scope = Rc::clone(&self.globals);
        self.hoist_vars(&program.body);
        self.hoist_functions(&program.body);
        self.execute_statements(&program.body)?;
        self.control_flow = ControlFlow::Normal;
        Ok(())
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Count one unit of work against the step budget
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.limits.max_steps,
            });
        }
        Ok(())
    }

    /// Fail with `RangeError: Invalid array length` when an array would grow
    /// to `len` elements past the configured maximum
    pub(crate) fn check_array_length(&self, len: usize) -> Result<(), RuntimeError> {
        if len > self.limits.max_array_length.min(MAX_ARRAY_LENGTH) {
            return Err(RuntimeError::invalid_array_length());
        }
        Ok(())
    }

    pub(crate) fn enter_scope(&mut self) {
        self.scope = Scope::child(&self.scope, false);
    }

    pub(crate) fn exit_scope(&mut self) {
        let parent = self.scope.borrow().parent();
        if let Some(parent) = parent {
            self.scope = parent;
        }
    }

    /// Declare a variable according to its declaration keyword
    pub(crate) fn declare(&mut self, kind: DeclKind, name: &str, value: Value) {
        match kind {
            DeclKind::Var => Scope::function_scope(&self.scope)
                .borrow_mut()
                .declare(name, value, true),
            DeclKind::Let => self.scope.borrow_mut().declare(name, value, true),
            DeclKind::Const => self.scope.borrow_mut().declare(name, value, false),
        }
    }

    pub(crate) fn lookup_variable(&self, name: &str) -> Result<Value, RuntimeError> {
        Scope::lookup(&self.scope, name).ok_or_else(|| RuntimeError::ReferenceError {
            name: name.to_string(),
        })
    }

    /// Assign to an existing binding; an undeclared name becomes a global
    /// (sloppy-mode JavaScript)
    pub(crate) fn assign_variable(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if Scope::lookup(&self.scope, name).is_none() {
            self.globals.borrow_mut().declare(name, value, true);
            return Ok(());
        }
        Scope::assign(&self.scope, name, value).map_err(|err| match err {
            AssignError::Undeclared => RuntimeError::ReferenceError {
                name: name.to_string(),
            },
            AssignError::Constant => RuntimeError::type_error("Assignment to constant variable."),
        })
    }

    /// Execute statements in order until one raises control flow
    pub(crate) fn execute_statements(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(())
    }

    /// Bind every function declaration of a statement list before it runs
    pub(crate) fn hoist_functions(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::FunctionDecl { func, .. } = stmt {
                if let Some(name) = &func.name {
                    let closure = self.make_closure(func);
                    self.scope.borrow_mut().declare(name, closure, true);
                }
            }
        }
    }

    /// Pre-declare `var` names as `undefined` in the function scope
    pub(crate) fn hoist_vars(&mut self, stmts: &[Stmt]) {
        let mut names = Vec::new();
        collect_var_names(stmts, &mut names);
        if names.is_empty() {
            return;
        }

        let function_scope = Scope::function_scope(&self.scope);
        let mut scope = function_scope.borrow_mut();
        for name in names {
            if !scope.has_own(&name) {
                scope.declare(&name, Value::Undefined, true);
            }
        }
    }

    pub(crate) fn make_closure(&self, func: &Rc<Function>) -> Value {
        Value::Function(Rc::new(Closure {
            func: Rc::clone(func),
            env: Rc::clone(&self.scope),
        }))
    }

    /// Call any callable value
    pub fn call_function(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(closure) => self.call_closure(Rc::clone(closure), args),
            Value::Builtin(builtin) => self.call_builtin(*builtin, args),
            other => Err(RuntimeError::type_error(format!(
                "{} is not a function",
                other.type_of()
            ))),
        }
    }

    fn call_closure(&mut self, closure: Rc<Closure>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                depth: self.call_depth,
            });
        }

        let func = Rc::clone(&closure.func);
        let scope = Scope::child(&closure.env, true);
        if !func.is_arrow {
            scope
                .borrow_mut()
                .declare("arguments", Value::array(args.clone()), true);
        }

        let saved_scope = std::mem::replace(&mut self.scope, scope);
        self.call_depth += 1;
        let result = self.run_function_body(&func, args);
        self.call_depth -= 1;
        self.scope = saved_scope;
        result
    }

    fn run_function_body(&mut self, func: &Function, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut args = args.into_iter();
        for param in &func.params {
            let mut value = args.next().unwrap_or_default();
            if matches!(value, Value::Undefined) {
                if let Some(default) = &param.default {
                    value = self.evaluate_expr(default)?;
                }
            }
            self.scope.borrow_mut().declare(&param.name, value, true);
        }

        match &func.body {
            FunctionBody::Expr(expr) => self.evaluate_expr(expr),
            FunctionBody::Block(stmts) => {
                self.hoist_vars(stmts);
                self.hoist_functions(stmts);
                self.execute_statements(stmts)?;

                let flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
                let value = std::mem::take(&mut self.return_value);
                if flow == ControlFlow::Return {
                    Ok(value)
                } else {
                    Ok(Value::Undefined)
                }
            }
        }
    }
}

/// `var` names declared anywhere in a function body, nested functions excluded
fn collect_var_names(stmts: &[Stmt], names: &mut Vec<String>) {
    for stmt in stmts {
        collect_var_names_in(stmt, names);
    }
}

fn collect_var_names_in(stmt: &Stmt, names: &mut Vec<String>) {
    match stmt {
        Stmt::VarDecl {
            kind: DeclKind::Var,
            declarators,
            ..
        }
        | Stmt::For {
            init:
                Some(ForInit::Decl {
                    kind: DeclKind::Var,
                    declarators,
                }),
            ..
        } => {
            names.extend(declarators.iter().map(|d| d.name.clone()));
            if let Stmt::For { body, .. } = stmt {
                collect_var_names_in(body, names);
            }
        }
        Stmt::ForOf {
            kind, name, body, ..
        } => {
            if *kind == DeclKind::Var {
                names.push(name.clone());
            }
            collect_var_names_in(body, names);
        }
        Stmt::If {
            consequent,
            alternate,
            ..
        } => {
            collect_var_names_in(consequent, names);
            if let Some(alternate) = alternate {
                collect_var_names_in(alternate, names);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } | Stmt::For { body, .. } => {
            collect_var_names_in(body, names)
        }
        Stmt::Block { body, .. } => collect_var_names(body, names),
        Stmt::Try {
            block,
            handler,
            finalizer,
            ..
        } => {
            collect_var_names(block, names);
            if let Some(handler) = handler {
                collect_var_names(&handler.body, names);
            }
            if let Some(finalizer) = finalizer {
                collect_var_names(finalizer, names);
            }
        }
        _ => {}
    }
}
