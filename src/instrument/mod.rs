//! Source-to-source instrumentation
//!
//! [`instrument`] rewrites the first top-level function of a program so that
//! running it reports line positions and call-stack transitions:
//!
//! ```text
//! function f(a) {                 function f(a) {
//!   if (a) return 1;      ──►       __enter("f", arguments);
//!   return 0;                       try {
//! }                                   __line(2);
//!                                     if (a) {
//!                                       __line(2);
//!                                       return 1;
//!                                     }
//!                                     __line(3);
//!                                     return 0;
//!                                   } finally {
//!                                     __exit();
//!                                   }
//!                                 }
//! ```
//!
//! Every function reached inside the target is rewritten the same way. Arrow
//! functions are left untouched. The pass builds a new tree; the input tree is
//! never modified.
//!
//! Hooks injected by an earlier run are stripped before instrumenting, so
//! instrumenting already-instrumented text yields the same text again.

use crate::parser::ast::*;
use crate::parser::printer::print_program;
use crate::parser::parse_program;
use log::debug;
use std::rc::Rc;

/// Hook called with the source line before each statement runs
pub const LINE_HOOK: &str = "__line";
/// Hook called with the routine name and its arguments on function entry
pub const ENTER_HOOK: &str = "__enter";
/// Hook called exactly once whenever a function activation ends
pub const EXIT_HOOK: &str = "__exit";

const ARGUMENTS: &str = "arguments";
/// Name reported for functions with no name hint
pub const ANONYMOUS: &str = "anonymous";

/// Instrument source text.
///
/// Never fails: when the source does not parse, or contains no instrumentable
/// function, the original text is returned unchanged.
pub fn instrument(source: &str) -> String {
    let program = match parse_program(source) {
        Ok(program) => program,
        Err(err) => {
            debug!("instrumentation skipped, source does not parse: {}", err);
            return source.to_string();
        }
    };

    match instrument_program(&program) {
        Some(instrumented) => print_program(&instrumented),
        None => {
            debug!("instrumentation skipped, no top-level function found");
            source.to_string()
        }
    }
}

/// Instrument a parsed program. Returns `None` when there is no target function.
pub fn instrument_program(program: &Program) -> Option<Program> {
    let body = Strip.list(&program.body);
    let target = find_target(&body)?;

    let body = body
        .iter()
        .enumerate()
        .map(|(i, stmt)| {
            if i == target {
                Instrumenter.stmt(stmt)
            } else {
                stmt.clone()
            }
        })
        .collect();

    Some(Program { body })
}

/// Index of the first top-level function declaration, or of the first
/// declaration initialized with a function expression
fn find_target(body: &[Stmt]) -> Option<usize> {
    body.iter().position(|stmt| match stmt {
        Stmt::FunctionDecl { .. } => true,
        Stmt::VarDecl { declarators, .. } => declarators
            .iter()
            .any(|d| matches!(&d.init, Some(Expr::Function(f)) if !f.is_arrow)),
        _ => false,
    })
}

fn line_hook(line: usize) -> Stmt {
    Stmt::call(LINE_HOOK, vec![Expr::Number(line as f64)])
}

fn is_line_hook(stmt: &Stmt) -> Option<usize> {
    match stmt.as_call() {
        Some((LINE_HOOK, [Expr::Number(n)])) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
        _ => None,
    }
}

/// Structural tree rebuild. Implementors decide what happens to statement
/// lists, single-statement slots and functions; everything else is copied.
trait Rewrite {
    fn list(&self, stmts: &[Stmt]) -> Vec<Stmt>;

    fn slot(&self, stmt: &Stmt) -> Box<Stmt>;

    fn function(&self, func: &Rc<Function>, name_hint: Option<&str>) -> Rc<Function>;

    fn stmt(&self, stmt: &Stmt) -> Stmt {
        match stmt {
            Stmt::VarDecl {
                kind,
                declarators,
                location,
            } => Stmt::VarDecl {
                kind: *kind,
                declarators: self.declarators(declarators),
                location: *location,
            },
            Stmt::FunctionDecl { func, location } => Stmt::FunctionDecl {
                func: self.function(func, None),
                location: *location,
            },
            Stmt::Expression { expr, location } => Stmt::Expression {
                expr: self.expr(expr, None),
                location: *location,
            },
            Stmt::Return { value, location } => Stmt::Return {
                value: value.as_ref().map(|v| self.expr(v, None)),
                location: *location,
            },
            Stmt::If {
                condition,
                consequent,
                alternate,
                location,
            } => Stmt::If {
                condition: self.expr(condition, None),
                consequent: self.slot(consequent),
                alternate: alternate.as_ref().map(|a| self.slot(a)),
                location: *location,
            },
            Stmt::While {
                condition,
                body,
                location,
            } => Stmt::While {
                condition: self.expr(condition, None),
                body: self.slot(body),
                location: *location,
            },
            Stmt::DoWhile {
                body,
                condition,
                location,
            } => Stmt::DoWhile {
                body: self.slot(body),
                condition: self.expr(condition, None),
                location: *location,
            },
            Stmt::For {
                init,
                condition,
                update,
                body,
                location,
            } => Stmt::For {
                init: init.as_ref().map(|init| match init {
                    ForInit::Decl { kind, declarators } => ForInit::Decl {
                        kind: *kind,
                        declarators: self.declarators(declarators),
                    },
                    ForInit::Expr(expr) => ForInit::Expr(self.expr(expr, None)),
                }),
                condition: condition.as_ref().map(|c| self.expr(c, None)),
                update: update.as_ref().map(|u| self.expr(u, None)),
                body: self.slot(body),
                location: *location,
            },
            Stmt::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            } => Stmt::ForOf {
                kind: *kind,
                name: name.clone(),
                iterable: self.expr(iterable, None),
                body: self.slot(body),
                location: *location,
            },
            Stmt::Block { body, location } => Stmt::Block {
                body: self.list(body),
                location: *location,
            },
            Stmt::Throw { value, location } => Stmt::Throw {
                value: self.expr(value, None),
                location: *location,
            },
            Stmt::Try {
                block,
                handler,
                finalizer,
                location,
            } => Stmt::Try {
                block: self.list(block),
                handler: handler.as_ref().map(|h| CatchClause {
                    param: h.param.clone(),
                    body: self.list(&h.body),
                }),
                finalizer: finalizer.as_ref().map(|f| self.list(f)),
                location: *location,
            },
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => stmt.clone(),
        }
    }

    fn declarators(&self, declarators: &[Declarator]) -> Vec<Declarator> {
        declarators
            .iter()
            .map(|d| Declarator {
                name: d.name.clone(),
                init: d.init.as_ref().map(|init| self.expr(init, Some(&d.name))),
            })
            .collect()
    }

    /// `name_hint` is the variable a function expression is bound to, if any
    fn expr(&self, expr: &Expr, name_hint: Option<&str>) -> Expr {
        let boxed = |e: &Expr| Box::new(self.expr(e, None));
        let all = |items: &[Expr]| -> Vec<Expr> { items.iter().map(|e| self.expr(e, None)).collect() };

        match expr {
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Null | Expr::Ident(_) => {
                expr.clone()
            }
            Expr::Array(items) => Expr::Array(all(items)),
            Expr::Spread(inner) => Expr::Spread(boxed(inner)),
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: boxed(operand),
            },
            Expr::Update { op, prefix, target } => Expr::Update {
                op: *op,
                prefix: *prefix,
                target: boxed(target),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: boxed(left),
                right: boxed(right),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: boxed(test),
                consequent: boxed(consequent),
                alternate: boxed(alternate),
            },
            Expr::Assign { op, target, value } => {
                let hint = match target.as_ref() {
                    Expr::Ident(name) => Some(name.as_str()),
                    _ => None,
                };
                Expr::Assign {
                    op: *op,
                    target: boxed(target),
                    value: Box::new(self.expr(value, hint)),
                }
            }
            Expr::Index { object, index } => Expr::Index {
                object: boxed(object),
                index: boxed(index),
            },
            Expr::Member { object, property } => Expr::Member {
                object: boxed(object),
                property: property.clone(),
            },
            Expr::Call { callee, args } => Expr::Call {
                callee: boxed(callee),
                args: all(args),
            },
            Expr::New { callee, args } => Expr::New {
                callee: boxed(callee),
                args: all(args),
            },
            Expr::Function(func) => Expr::Function(self.function(func, name_hint)),
        }
    }
}

/// Injects line, enter and exit hooks
struct Instrumenter;

impl Rewrite for Instrumenter {
    fn list(&self, stmts: &[Stmt]) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len() * 2);
        for stmt in stmts {
            if let Some(location) = stmt.location() {
                out.push(line_hook(location.line));
            }
            out.push(self.stmt(stmt));
        }
        out
    }

    fn slot(&self, stmt: &Stmt) -> Box<Stmt> {
        if let Stmt::Block { body, location } = stmt {
            return Box::new(Stmt::Block {
                body: self.list(body),
                location: *location,
            });
        }

        let mut body = Vec::with_capacity(2);
        if let Some(location) = stmt.location() {
            body.push(line_hook(location.line));
        }
        body.push(self.stmt(stmt));
        Box::new(Stmt::Block {
            body,
            location: stmt.location(),
        })
    }

    fn function(&self, func: &Rc<Function>, name_hint: Option<&str>) -> Rc<Function> {
        let statements = match (&func.body, func.is_arrow) {
            (FunctionBody::Block(statements), false) => statements,
            _ => return Rc::clone(func),
        };

        let name = func.name.as_deref().or(name_hint).unwrap_or(ANONYMOUS);
        let enter = Stmt::call(
            ENTER_HOOK,
            vec![Expr::Str(name.to_string()), Expr::Ident(ARGUMENTS.to_string())],
        );
        let guarded = Stmt::Try {
            block: self.list(statements),
            handler: None,
            finalizer: Some(vec![Stmt::call(EXIT_HOOK, Vec::new())]),
            location: None,
        };

        Rc::new(Function {
            name: func.name.clone(),
            params: func.params.clone(),
            body: FunctionBody::Block(vec![enter, guarded]),
            is_arrow: false,
            location: func.location,
        })
    }
}

/// Removes hooks a previous instrumentation injected
struct Strip;

impl Strip {
    /// Original statements of a body with the injected enter/try/finally shape
    fn injected_body(body: &[Stmt]) -> Option<&[Stmt]> {
        let [enter, guarded] = body else {
            return None;
        };
        match enter.as_call() {
            Some((ENTER_HOOK, [Expr::Str(_), Expr::Ident(args)])) if args == ARGUMENTS => {}
            _ => return None,
        }
        match guarded {
            Stmt::Try {
                block,
                handler: None,
                finalizer: Some(finalizer),
                ..
            } if matches!(finalizer.as_slice(), [exit] if matches!(exit.as_call(), Some((EXIT_HOOK, [])))) => {
                Some(block)
            }
            _ => None,
        }
    }
}

impl Rewrite for Strip {
    fn list(&self, stmts: &[Stmt]) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        let mut pending_line = None;

        for stmt in stmts {
            if let Some(line) = is_line_hook(stmt) {
                pending_line = Some(line);
                continue;
            }
            let stripped = self.stmt(stmt);
            match pending_line.take() {
                Some(line) => {
                    let column = stmt.location().map_or(1, |l| l.column);
                    out.push(stripped.with_location(Some(SourceLocation::new(line, column))));
                }
                None => out.push(stripped),
            }
        }
        out
    }

    fn slot(&self, stmt: &Stmt) -> Box<Stmt> {
        Box::new(self.stmt(stmt))
    }

    fn function(&self, func: &Rc<Function>, _name_hint: Option<&str>) -> Rc<Function> {
        let statements = match (&func.body, func.is_arrow) {
            (FunctionBody::Block(statements), false) => statements,
            _ => return Rc::clone(func),
        };
        let original = Self::injected_body(statements).unwrap_or(statements);

        Rc::new(Function {
            name: func.name.clone(),
            params: func.params.clone(),
            body: FunctionBody::Block(self.list(original)),
            is_arrow: false,
            location: func.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_instrument_wraps_body_and_branches() {
        let source = "function f(a) {\n  if (a) return 1;\n  return 0;\n}";
        let expected = "\
function f(a) {
  __enter(\"f\", arguments);
  try {
    __line(2);
    if (a) {
      __line(2);
      return 1;
    }
    __line(3);
    return 0;
  } finally {
    __exit();
  }
}
";
        assert_eq!(instrument(source), expected);
    }

    #[test]
    fn test_else_branch_is_wrapped() {
        let source = "function f(a) {\n  if (a)\n    g();\n  else\n    h();\n}";
        let out = instrument(source);
        assert!(out.contains("if (a) {\n      __line(3);\n      g();\n    } else {\n      __line(5);\n      h();\n    }"));
    }

    #[test]
    fn test_only_first_function_is_target() {
        let source = "function first() {\n  return 1;\n}\nfunction second() {\n  return 2;\n}";
        let out = instrument(source);
        assert!(out.contains("__enter(\"first\", arguments);"));
        assert!(!out.contains("__enter(\"second\""));
        assert!(out.contains("function second() {\n  return 2;\n}"));
    }

    #[test]
    fn test_nested_functions_use_name_hints() {
        let source = "\
const sort = function(arr) {
  const helper = function(x) {
    return x;
  };
  function inner() {}
  return helper(arr);
};";
        let out = instrument(source);
        assert!(out.contains("__enter(\"sort\", arguments);"));
        assert!(out.contains("__enter(\"helper\", arguments);"));
        assert!(out.contains("__enter(\"inner\", arguments);"));
    }

    #[test]
    fn test_anonymous_function_expression() {
        let source = "function f() {\n  run(function() { return 1; });\n}";
        let out = instrument(source);
        assert!(out.contains("__enter(\"anonymous\", arguments);"));
    }

    #[test]
    fn test_arrow_functions_are_opaque() {
        let source = "function f(arr) {\n  const g = (x) => {\n    return x;\n  };\n  return g(arr);\n}";
        let out = instrument(source);
        assert_eq!(out.matches("__enter").count(), 1);
        assert!(out.contains("const g = (x) => {\n      return x;\n    };"));
    }

    #[test]
    fn test_fallbacks_return_source_unchanged() {
        let broken = "function f( {";
        assert_eq!(instrument(broken), broken);

        let no_function = "let x = 1;\nx = x + 1;";
        assert_eq!(instrument(no_function), no_function);

        let arrow_only = "const f = (a) => a;";
        assert_eq!(instrument(arrow_only), arrow_only);
    }

    #[test]
    fn test_instrument_is_idempotent() {
        let source = "\
function quickSort(arr, low = 0, high = arr.length - 1) {
  if (low < high) {
    const pi = partition(arr, low, high);
    quickSort(arr, low, pi - 1);
    quickSort(arr, pi + 1, high);
  }
}
function partition(arr, low, high) {
  let i = low - 1;
  for (let j = low; j < high; j++)
    if (arr[j] < arr[high]) i++;
  return i + 1;
}";
        let once = instrument(source);
        let twice = instrument(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("__enter").count(), 1);
    }

    #[test]
    fn test_instrument_program_does_not_mutate_input() {
        let program = parse_program("function f() {\n  return 1;\n}").unwrap();
        let before = program.clone();
        let instrumented = instrument_program(&program).unwrap();
        assert_eq!(program, before);
        assert_ne!(instrumented, before);
    }

    #[test]
    fn test_strip_restores_line_numbers() {
        let once = instrument("function f() {\n\n  g();\n}");
        let program = parse_program(&once).unwrap();
        let stripped = Strip.list(&program.body);
        let Stmt::FunctionDecl { func, .. } = &stripped[0] else {
            panic!("Expected function declaration");
        };
        let FunctionBody::Block(body) = &func.body else {
            panic!("Expected block body");
        };
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].location().map(|l| l.line), Some(3));
    }
}
