//! Expression evaluation
//!
//! Evaluates every expression form of the language subset with JavaScript
//! semantics (dynamic typing, short-circuit logic, shared arrays).
//!
//! Two forms are trace-aware:
//! - a comparison whose operand is a direct element read of an observed array
//!   reports a `compare` to the tracer
//! - `[a[i], a[j]] = [a[j], a[i]]` on one observed array reports a single `swap`
//!   instead of two overwrites
//!
//! All other writes to observed arrays go through [`ObservedArray::set`] and are
//! reported as overwrites.

use crate::harness::observed::ObservedArray;
use crate::interpreter::constants::MAX_STRING_LENGTH;
use crate::interpreter::engine::{Interpreter, Tracer};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::Scope;
use crate::memory::value::{ArrayRef, Closure, Value};
use crate::parser::ast::*;
use crate::parser::printer::print_expr;
use std::rc::Rc;

impl<T: Tracer> Interpreter<T> {
    /// Evaluate an expression to a value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::string(s)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Ident(name) => self.lookup_variable(name),
            Expr::Array(elements) => Ok(Value::array(self.evaluate_args(elements)?)),
            Expr::Spread(_) => Err(RuntimeError::Unsupported {
                feature: "spread outside array literals and calls".to_string(),
            }),
            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),
            Expr::Update { op, prefix, target } => self.evaluate_update(*op, *prefix, target),
            Expr::Binary { op, left, right } => self.evaluate_binary(*op, left, right),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate_expr(test)?.is_truthy() {
                    self.evaluate_expr(consequent)
                } else {
                    self.evaluate_expr(alternate)
                }
            }
            Expr::Assign { op, target, value } => self.evaluate_assign(*op, target, value),
            Expr::Index { object, index } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                self.read_index(&object, &index)
            }
            Expr::Member { object, property } => {
                let object = self.evaluate_expr(object)?;
                read_member(&object, property)
            }
            Expr::Call { callee, args } => self.evaluate_call(callee, args),
            Expr::New { callee, args } => {
                let constructor = self.evaluate_expr(callee)?;
                let args = self.evaluate_args(args)?;
                match constructor {
                    Value::Builtin(builtin) if builtin.is_constructor() => self.construct(builtin, args),
                    _ => Err(RuntimeError::type_error(format!(
                        "{} is not a constructor",
                        print_expr(callee)
                    ))),
                }
            }
            Expr::Function(func) => Ok(self.function_value(func)),
        }
    }

    /// Evaluate call arguments or array elements, expanding spreads
    pub(crate) fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Expr::Spread(inner) => match self.evaluate_expr(inner)? {
                    Value::Array(array) => {
                        let array = array.borrow();
                        self.check_array_length(values.len() + array.len())?;
                        values.extend(array.items.iter().cloned());
                    }
                    Value::Str(s) => values.extend(s.chars().map(|c| Value::string(&c.to_string()))),
                    other => {
                        return Err(RuntimeError::type_error(format!(
                            "{} is not iterable",
                            other.type_of()
                        )))
                    }
                },
                _ => values.push(self.evaluate_expr(arg)?),
            }
        }
        Ok(values)
    }

    /// Closure for a function expression. A named function expression can
    /// refer to itself by name.
    fn function_value(&self, func: &Rc<Function>) -> Value {
        match (&func.name, func.is_arrow) {
            (Some(name), false) => {
                let env = Scope::child(&self.scope, false);
                let closure = Value::Function(Rc::new(Closure {
                    func: Rc::clone(func),
                    env: Rc::clone(&env),
                }));
                env.borrow_mut().declare(name, closure.clone(), false);
                closure
            }
            _ => self.make_closure(func),
        }
    }

    fn evaluate_unary(&mut self, op: UnOp, operand: &Expr) -> Result<Value, RuntimeError> {
        if op == UnOp::Typeof {
            // typeof tolerates undeclared names
            if let Expr::Ident(name) = operand {
                return Ok(match Scope::lookup(&self.scope, name) {
                    Some(value) => Value::string(value.type_of()),
                    None => Value::string("undefined"),
                });
            }
        }

        let value = self.evaluate_expr(operand)?;
        Ok(match op {
            UnOp::Neg => Value::Number(-value.to_number()),
            UnOp::Plus => Value::Number(value.to_number()),
            UnOp::Not => Value::Bool(!value.is_truthy()),
            UnOp::BitNot => Value::Number(f64::from(!value.to_int32())),
            UnOp::Typeof => Value::string(value.type_of()),
        })
    }

    fn evaluate_update(&mut self, op: UpdateOp, prefix: bool, target: &Expr) -> Result<Value, RuntimeError> {
        let delta = match op {
            UpdateOp::Inc => 1.0,
            UpdateOp::Dec => -1.0,
        };

        let (old, new) = match target {
            Expr::Ident(name) => {
                let old = self.lookup_variable(name)?.to_number();
                let new = old + delta;
                self.assign_variable(name, Value::Number(new))?;
                (old, new)
            }
            Expr::Index { object, index } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                let old = self.read_index(&object, &index)?.to_number();
                let new = old + delta;
                self.write_index(&object, &index, Value::Number(new))?;
                (old, new)
            }
            Expr::Member { object, property } => {
                let object = self.evaluate_expr(object)?;
                let old = read_member(&object, property)?.to_number();
                let new = old + delta;
                self.write_member(&object, property, Value::Number(new))?;
                (old, new)
            }
            _ => {
                return Err(RuntimeError::Unsupported {
                    feature: "increment of this operand".to_string(),
                })
            }
        };

        Ok(Value::Number(if prefix { new } else { old }))
    }

    fn evaluate_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                let left = self.evaluate_expr(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expr(right)
            }
            BinOp::Or => {
                let left = self.evaluate_expr(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate_expr(right)
            }
            BinOp::Nullish => {
                let left = self.evaluate_expr(left)?;
                if !left.is_nullish() {
                    return Ok(left);
                }
                self.evaluate_expr(right)
            }
            _ if op.is_comparison() => {
                let (left, left_index) = self.evaluate_operand(left)?;
                let (right, right_index) = self.evaluate_operand(right)?;
                let indices: Vec<usize> = left_index.into_iter().chain(right_index).collect();
                if !indices.is_empty() {
                    self.tracer.compare(indices);
                }
                apply_binary(op, &left, &right)
            }
            _ => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                apply_binary(op, &left, &right)
            }
        }
    }

    /// Evaluate a comparison operand, also returning the element index when it
    /// is a direct in-bounds read of an observed array
    fn evaluate_operand(&mut self, expr: &Expr) -> Result<(Value, Option<usize>), RuntimeError> {
        let Expr::Index { object, index } = expr else {
            return Ok((self.evaluate_expr(expr)?, None));
        };

        let object = self.evaluate_expr(object)?;
        let index = self.evaluate_expr(index)?;
        let value = self.read_index(&object, &index)?;

        let tracked = match (&object, array_index(&index)) {
            (Value::Array(array), Some(i)) => {
                let array = array.borrow();
                (array.observed && i < array.len()).then_some(i)
            }
            _ => None,
        };
        Ok((value, tracked))
    }

    fn evaluate_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr) -> Result<Value, RuntimeError> {
        match target {
            Expr::Array(targets) => self.evaluate_destructuring(targets, value),
            Expr::Ident(name) => {
                let value = match op.binary_op() {
                    Some(bin) => {
                        let current = self.lookup_variable(name)?;
                        let rhs = self.evaluate_expr(value)?;
                        apply_binary(bin, &current, &rhs)?
                    }
                    None => self.evaluate_expr(value)?,
                };
                self.assign_variable(name, value.clone())?;
                Ok(value)
            }
            Expr::Index { object, index } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                let value = match op.binary_op() {
                    Some(bin) => {
                        let current = self.read_index(&object, &index)?;
                        let rhs = self.evaluate_expr(value)?;
                        apply_binary(bin, &current, &rhs)?
                    }
                    None => self.evaluate_expr(value)?,
                };
                self.write_index(&object, &index, value.clone())?;
                Ok(value)
            }
            Expr::Member { object, property } => {
                let object = self.evaluate_expr(object)?;
                let value = match op.binary_op() {
                    Some(bin) => {
                        let current = read_member(&object, property)?;
                        let rhs = self.evaluate_expr(value)?;
                        apply_binary(bin, &current, &rhs)?
                    }
                    None => self.evaluate_expr(value)?,
                };
                self.write_member(&object, property, value.clone())?;
                Ok(value)
            }
            _ => Err(RuntimeError::Unsupported {
                feature: "assignment to this target".to_string(),
            }),
        }
    }

    /// `[t1, t2, ...] = value`
    fn evaluate_destructuring(&mut self, targets: &[Expr], value: &Expr) -> Result<Value, RuntimeError> {
        let rhs = self.evaluate_expr(value)?;
        let items = match &rhs {
            Value::Array(array) => array.borrow().items.clone(),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "{} is not iterable",
                    other.type_of()
                )))
            }
        };

        if let [Expr::Index {
            object: first_object,
            index: first_index,
        }, Expr::Index {
            object: second_object,
            index: second_index,
        }] = targets
        {
            let first_object = self.evaluate_expr(first_object)?;
            let first_index = self.evaluate_expr(first_index)?;
            let second_object = self.evaluate_expr(second_object)?;
            let second_index = self.evaluate_expr(second_index)?;

            if self.try_observed_swap(&first_object, &first_index, &second_object, &second_index, &items) {
                return Ok(rhs);
            }

            let mut items = items.into_iter();
            self.write_index(&first_object, &first_index, items.next().unwrap_or_default())?;
            self.write_index(&second_object, &second_index, items.next().unwrap_or_default())?;
            return Ok(rhs);
        }

        let mut items = items.into_iter();
        for target in targets {
            let item = items.next().unwrap_or_default();
            self.assign_to(target, item)?;
        }
        Ok(rhs)
    }

    /// Exchange two elements of one observed array when the assigned values are
    /// exactly those elements in swapped order
    fn try_observed_swap(
        &mut self,
        first_object: &Value,
        first_index: &Value,
        second_object: &Value,
        second_index: &Value,
        items: &[Value],
    ) -> bool {
        let (Value::Array(first), Value::Array(second)) = (first_object, second_object) else {
            return false;
        };
        let (Some(i), Some(j)) = (array_index(first_index), array_index(second_index)) else {
            return false;
        };
        if !Rc::ptr_eq(first, second) || i == j {
            return false;
        }
        let Some(observed) = ObservedArray::new(first) else {
            return false;
        };
        if i >= observed.len() || j >= observed.len() {
            return false;
        }

        match items {
            [new_i, new_j, ..]
                if new_i.strict_equals(&observed.get(j)) && new_j.strict_equals(&observed.get(i)) =>
            {
                observed.swap(i, j, &mut self.tracer);
                true
            }
            _ => false,
        }
    }

    /// Assign to a single destructuring target
    fn assign_to(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        match target {
            Expr::Ident(name) => self.assign_variable(name, value),
            Expr::Index { object, index } => {
                let object = self.evaluate_expr(object)?;
                let index = self.evaluate_expr(index)?;
                self.write_index(&object, &index, value)
            }
            Expr::Member { object, property } => {
                let object = self.evaluate_expr(object)?;
                self.write_member(&object, property, value)
            }
            _ => Err(RuntimeError::Unsupported {
                feature: "assignment to this target".to_string(),
            }),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, RuntimeError> {
        let function = match callee {
            Expr::Member { object, property } => {
                let object = self.evaluate_expr(object)?;
                if let Value::Array(array) = &object {
                    let args = self.evaluate_args(args)?;
                    return match self.call_array_method(array, property, args)? {
                        Some(result) => Ok(result),
                        None => Err(RuntimeError::type_error(format!(
                            "{} is not a function",
                            print_expr(callee)
                        ))),
                    };
                }
                read_member(&object, property)?
            }
            _ => self.evaluate_expr(callee)?,
        };

        let args = self.evaluate_args(args)?;
        if !function.is_callable() {
            return Err(RuntimeError::type_error(format!(
                "{} is not a function",
                print_expr(callee)
            )));
        }
        self.call_function(&function, args)
    }

    pub(crate) fn read_index(&self, object: &Value, index: &Value) -> Result<Value, RuntimeError> {
        match object {
            Value::Array(array) => match array_index(index) {
                Some(i) => Ok(array.borrow().get(i)),
                None => read_member(object, &index.to_string()),
            },
            Value::Str(s) => match array_index(index) {
                Some(i) => Ok(s
                    .chars()
                    .nth(i)
                    .map(|c| Value::string(&c.to_string()))
                    .unwrap_or(Value::Undefined)),
                None => read_member(object, &index.to_string()),
            },
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                object, index
            ))),
            _ => read_member(object, &index.to_string()),
        }
    }

    pub(crate) fn write_index(&mut self, object: &Value, index: &Value, value: Value) -> Result<(), RuntimeError> {
        match (object, array_index(index)) {
            (Value::Array(array), Some(i)) => self.write_element(array, i, value),
            (Value::Undefined | Value::Null, _) => Err(RuntimeError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                object, index
            ))),
            _ => self.write_member(object, &index.to_string(), value),
        }
    }

    /// Write one element; observed arrays report the write first. Writes
    /// that would grow the array past the length limit fail.
    pub(crate) fn write_element(&mut self, array: &ArrayRef, index: usize, value: Value) -> Result<(), RuntimeError> {
        self.check_array_length(index + 1)?;
        match ObservedArray::new(array) {
            Some(observed) => observed.set(index, value, &mut self.tracer),
            None => array.borrow_mut().set(index, value),
        }
        Ok(())
    }

    /// Property write (`object.property = value`); only `array.length` is writable
    pub(crate) fn write_member(&self, object: &Value, property: &str, value: Value) -> Result<(), RuntimeError> {
        match (object, property) {
            (Value::Undefined | Value::Null, _) => Err(RuntimeError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                object, property
            ))),
            (Value::Array(array), "length") => {
                let length = value.to_number();
                if length < 0.0 || length.fract() != 0.0 || !length.is_finite() {
                    return Err(RuntimeError::invalid_array_length());
                }
                self.check_array_length(length as usize)?;
                array
                    .borrow_mut()
                    .items
                    .resize(length as usize, Value::Undefined);
                Ok(())
            }
            _ => Err(RuntimeError::Unsupported {
                feature: format!("setting property '{}'", property),
            }),
        }
    }
}

/// Integer index of a value usable as an array subscript
pub(crate) fn array_index(index: &Value) -> Option<usize> {
    match index {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < 4_294_967_295.0 => Some(*n as usize),
        Value::Str(s) => s.parse::<usize>().ok().filter(|i| i.to_string() == **s),
        _ => None,
    }
}

/// Property read (`object.property`)
pub(crate) fn read_member(object: &Value, property: &str) -> Result<Value, RuntimeError> {
    Ok(match (object, property) {
        (Value::Undefined | Value::Null, _) => {
            return Err(RuntimeError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                object, property
            )))
        }
        (Value::Array(array), "length") => Value::Number(array.borrow().len() as f64),
        (Value::Str(s), "length") => Value::Number(s.chars().count() as f64),
        (Value::Error(err), "message") => Value::string(&err.message),
        (Value::Error(err), "name") => Value::string(&err.name),
        (Value::Function(closure), "name") => Value::string(closure.name()),
        (Value::Function(closure), "length") => Value::Number(closure.func.params.len() as f64),
        (Value::Namespace(namespace), _) => namespace.member(property).unwrap_or_default(),
        (Value::Builtin(builtin), _) => builtin.static_member(property).unwrap_or_default(),
        _ => Value::Undefined,
    })
}

/// Apply a non-short-circuit binary operator. Fails only when a
/// concatenation exceeds [`MAX_STRING_LENGTH`].
pub(crate) fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    Ok(match op {
        BinOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (a, b) if is_string_like(a) || is_string_like(b) => {
                let joined = format!("{}{}", a, b);
                if joined.len() > MAX_STRING_LENGTH {
                    return Err(RuntimeError::invalid_string_length());
                }
                Value::string(&joined)
            }
            (a, b) => Value::Number(a.to_number() + b.to_number()),
        },
        BinOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinOp::Pow => Value::Number(left.to_number().powf(right.to_number())),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let result = match (left, right) {
                (Value::Str(a), Value::Str(b)) => match op {
                    BinOp::Lt => a < b,
                    BinOp::Le => a <= b,
                    BinOp::Gt => a > b,
                    _ => a >= b,
                },
                _ => {
                    let (a, b) = (left.to_number(), right.to_number());
                    match op {
                        BinOp::Lt => a < b,
                        BinOp::Le => a <= b,
                        BinOp::Gt => a > b,
                        _ => a >= b,
                    }
                }
            };
            Value::Bool(result)
        }
        BinOp::Eq => Value::Bool(left.loose_equals(right)),
        BinOp::Ne => Value::Bool(!left.loose_equals(right)),
        BinOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinOp::StrictNe => Value::Bool(!left.strict_equals(right)),
        BinOp::BitAnd => Value::Number(f64::from(left.to_int32() & right.to_int32())),
        BinOp::BitOr => Value::Number(f64::from(left.to_int32() | right.to_int32())),
        BinOp::BitXor => Value::Number(f64::from(left.to_int32() ^ right.to_int32())),
        BinOp::Shl => {
            let shift = (right.to_int32() as u32) & 31;
            Value::Number(f64::from(left.to_int32().wrapping_shl(shift)))
        }
        BinOp::Shr => {
            let shift = (right.to_int32() as u32) & 31;
            Value::Number(f64::from(left.to_int32() >> shift))
        }
        BinOp::And => {
            if left.is_truthy() {
                right.clone()
            } else {
                left.clone()
            }
        }
        BinOp::Or => {
            if left.is_truthy() {
                left.clone()
            } else {
                right.clone()
            }
        }
        BinOp::Nullish => {
            if left.is_nullish() {
                right.clone()
            } else {
                left.clone()
            }
        }
    })
}

/// Operands that turn `+` into concatenation
fn is_string_like(value: &Value) -> bool {
    !matches!(
        value,
        Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::context::TraceContext;
    use crate::interpreter::engine::Limits;
    use crate::parser::parse_program;

    fn eval(source: &str) -> Value {
        let program = parse_program(&format!("const result = {};", source)).unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program).unwrap();
        interp.global("result").unwrap()
    }

    fn eval_err(source: &str) -> RuntimeError {
        let program = parse_program(source).unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program).unwrap_err()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3").as_number(), Some(7.0));
        assert_eq!(eval("7 % 3").as_number(), Some(1.0));
        assert_eq!(eval("-7 % 3").as_number(), Some(-1.0));
        assert_eq!(eval("2 ** 10").as_number(), Some(1024.0));
        assert_eq!(eval("5 / 2").as_number(), Some(2.5));
        assert_eq!(eval("(5 / 2) | 0").as_number(), Some(2.0));
        assert_eq!(eval("1 << 4").as_number(), Some(16.0));
        assert_eq!(eval("-16 >> 2").as_number(), Some(-4.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("'a' + 1").to_string(), "a1");
        assert_eq!(eval("1 + 2 + 'x'").to_string(), "3x");
        assert_eq!(eval("[1, 2] + ''").to_string(), "1,2");
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert!(eval("3 > 2 && 2 >= 2").is_truthy());
        assert!(!eval("'10' < '9' === false").is_truthy());
        assert!(eval("null ?? 4").strict_equals(&Value::Number(4.0)));
        assert!(eval("0 || 'fallback'").strict_equals(&Value::string("fallback")));
        assert!(eval("undefined == null").is_truthy());
        assert!(!eval("NaN === NaN").is_truthy());
    }

    #[test]
    fn test_typeof() {
        assert_eq!(eval("typeof 1").to_string(), "number");
        assert_eq!(eval("typeof notDeclared").to_string(), "undefined");
        assert_eq!(eval("typeof []").to_string(), "object");
        assert_eq!(eval("typeof function() {}").to_string(), "function");
    }

    #[test]
    fn test_array_reads() {
        assert_eq!(eval("[4, 5, 6][1]").as_number(), Some(5.0));
        assert!(matches!(eval("[4, 5, 6][7]"), Value::Undefined));
        assert_eq!(eval("[4, 5, 6].length").as_number(), Some(3.0));
        assert_eq!(eval("[...[1, 2], 3].length").as_number(), Some(3.0));
    }

    #[test]
    fn test_destructuring_swap_on_plain_array() {
        let program = parse_program("const a = [1, 2, 3]; [a[0], a[2]] = [a[2], a[0]]; const r = a.join('');")
            .unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program).unwrap();
        assert_eq!(interp.global("r").unwrap().to_string(), "321");
        assert!(interp.into_tracer().into_events().is_empty());
    }

    #[test]
    fn test_closures_capture_scope() {
        let program = parse_program(
            "function counter() { let n = 0; return () => ++n; }
             const next = counter(); next(); next();
             const r = next();",
        )
        .unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program).unwrap();
        assert_eq!(interp.global("r").and_then(|v| v.as_number()), Some(3.0));
    }

    #[test]
    fn test_named_function_expression_recursion() {
        assert_eq!(
            eval("(function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); })(5)").as_number(),
            Some(120.0)
        );
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            eval_err("let x; x[0];").to_string(),
            "TypeError: Cannot read properties of undefined (reading '0')"
        );
        assert_eq!(eval_err("let f = 3; f();").to_string(), "TypeError: f is not a function");
        assert_eq!(
            eval_err("[1].nope();").to_string(),
            "TypeError: [1].nope is not a function"
        );
        assert_eq!(eval_err("y + 1;").to_string(), "ReferenceError: y is not defined");
    }

    #[test]
    fn test_array_index_conversion() {
        assert_eq!(array_index(&Value::Number(3.0)), Some(3));
        assert_eq!(array_index(&Value::Number(1.5)), None);
        assert_eq!(array_index(&Value::Number(-1.0)), None);
        assert_eq!(array_index(&Value::string("2")), Some(2));
        assert_eq!(array_index(&Value::string("02")), None);
    }
}
