//! Built-in function implementations
//!
//! Host functions and objects available to algorithm code without being
//! defined in it.
//!
//! # Supported Built-ins
//!
//! - `Math`: `floor`, `ceil`, `round`, `trunc`, `abs`, `sign`, `sqrt`, `pow`,
//!   `min`, `max`, plus the constants `PI` and `E`
//! - `console.log(...)`: forwarded to the `log` facade at debug level
//! - `Array(n)` / `new Array(n)`, `Array.from`, `Array.isArray`
//! - `Error(msg)` / `new Error(msg)`
//! - `Number.isInteger`, `Number.MAX_SAFE_INTEGER`, `Number.MIN_SAFE_INTEGER`
//! - Array methods: `push`, `pop`, `shift`, `unshift`, `includes`, `indexOf`,
//!   `slice`, `concat`, `fill`, `join`, `forEach`, `map`, `filter`, `reduce`
//! - The trace hooks `__line`, `__enter` and `__exit`, which the harness binds
//!   as globals and which report straight to the [`Tracer`]
//!
//! # Implementation Notes
//!
//! - Array methods that mutate an observed array go through
//!   [`ObservedArray`] so every moved element is reported as an overwrite
//! - Methods that build a new array (`slice`, `map`, ...) return plain arrays

use crate::harness::observed::ObservedArray;
use crate::instrument::ANONYMOUS;
use crate::interpreter::constants::MAX_STRING_LENGTH;
use crate::interpreter::engine::{Interpreter, Tracer};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::Scope;
use crate::memory::value::{join_array, ArrayRef, Value};
use log::debug;

/// Host functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    LineHook,
    EnterHook,
    ExitHook,
    ConsoleLog,
    MathFloor,
    MathCeil,
    MathRound,
    MathTrunc,
    MathAbs,
    MathSign,
    MathSqrt,
    MathPow,
    MathMin,
    MathMax,
    ArrayConstructor,
    ArrayFrom,
    ArrayIsArray,
    ErrorConstructor,
    NumberIsInteger,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::LineHook => "__line",
            Builtin::EnterHook => "__enter",
            Builtin::ExitHook => "__exit",
            Builtin::ConsoleLog => "log",
            Builtin::MathFloor => "floor",
            Builtin::MathCeil => "ceil",
            Builtin::MathRound => "round",
            Builtin::MathTrunc => "trunc",
            Builtin::MathAbs => "abs",
            Builtin::MathSign => "sign",
            Builtin::MathSqrt => "sqrt",
            Builtin::MathPow => "pow",
            Builtin::MathMin => "min",
            Builtin::MathMax => "max",
            Builtin::ArrayConstructor => "Array",
            Builtin::ArrayFrom => "from",
            Builtin::ArrayIsArray => "isArray",
            Builtin::ErrorConstructor => "Error",
            Builtin::NumberIsInteger => "isInteger",
        }
    }

    pub fn is_constructor(self) -> bool {
        matches!(self, Builtin::ArrayConstructor | Builtin::ErrorConstructor)
    }

    /// Static members of constructor functions (`Array.from`)
    pub fn static_member(self, property: &str) -> Option<Value> {
        match (self, property) {
            (Builtin::ArrayConstructor, "from") => Some(Value::Builtin(Builtin::ArrayFrom)),
            (Builtin::ArrayConstructor, "isArray") => Some(Value::Builtin(Builtin::ArrayIsArray)),
            (_, "name") => Some(Value::string(self.name())),
            _ => None,
        }
    }
}

/// Host objects that only group members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Math,
    Console,
    Number,
}

impl Namespace {
    pub fn name(self) -> &'static str {
        match self {
            Namespace::Math => "Math",
            Namespace::Console => "console",
            Namespace::Number => "Number",
        }
    }

    pub fn member(self, property: &str) -> Option<Value> {
        let value = match (self, property) {
            (Namespace::Math, "floor") => Value::Builtin(Builtin::MathFloor),
            (Namespace::Math, "ceil") => Value::Builtin(Builtin::MathCeil),
            (Namespace::Math, "round") => Value::Builtin(Builtin::MathRound),
            (Namespace::Math, "trunc") => Value::Builtin(Builtin::MathTrunc),
            (Namespace::Math, "abs") => Value::Builtin(Builtin::MathAbs),
            (Namespace::Math, "sign") => Value::Builtin(Builtin::MathSign),
            (Namespace::Math, "sqrt") => Value::Builtin(Builtin::MathSqrt),
            (Namespace::Math, "pow") => Value::Builtin(Builtin::MathPow),
            (Namespace::Math, "min") => Value::Builtin(Builtin::MathMin),
            (Namespace::Math, "max") => Value::Builtin(Builtin::MathMax),
            (Namespace::Math, "PI") => Value::Number(std::f64::consts::PI),
            (Namespace::Math, "E") => Value::Number(std::f64::consts::E),
            (Namespace::Console, "log") => Value::Builtin(Builtin::ConsoleLog),
            (Namespace::Number, "isInteger") => Value::Builtin(Builtin::NumberIsInteger),
            (Namespace::Number, "MAX_SAFE_INTEGER") => Value::Number(9_007_199_254_740_991.0),
            (Namespace::Number, "MIN_SAFE_INTEGER") => Value::Number(-9_007_199_254_740_991.0),
            (Namespace::Number, "POSITIVE_INFINITY") => Value::Number(f64::INFINITY),
            (Namespace::Number, "NEGATIVE_INFINITY") => Value::Number(f64::NEG_INFINITY),
            _ => return None,
        };
        Some(value)
    }
}

/// Bind the standard globals. The trace hooks are bound by the harness.
pub(crate) fn install_globals(scope: &mut Scope) {
    scope.declare("undefined", Value::Undefined, false);
    scope.declare("NaN", Value::Number(f64::NAN), false);
    scope.declare("Infinity", Value::Number(f64::INFINITY), false);
    scope.declare("Math", Value::Namespace(Namespace::Math), false);
    scope.declare("console", Value::Namespace(Namespace::Console), false);
    scope.declare("Number", Value::Namespace(Namespace::Number), false);
    scope.declare("Array", Value::Builtin(Builtin::ArrayConstructor), false);
    scope.declare("Error", Value::Builtin(Builtin::ErrorConstructor), false);
}

fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(f64::NAN, Value::to_number)
}

/// JavaScript `Math.round`: halves round towards +Infinity
fn js_round(n: f64) -> f64 {
    if !n.is_finite() || n.fract() == 0.0 {
        n
    } else {
        (n + 0.5).floor()
    }
}

/// Resolve a relative `start`/`end` argument against `len`
fn relative_index(arg: Option<&Value>, len: usize, default: usize) -> usize {
    match arg {
        None | Some(Value::Undefined) => default,
        Some(value) => {
            let n = value.to_number();
            let n = if n.is_nan() { 0.0 } else { n.trunc() };
            if n < 0.0 {
                (len as f64 + n).max(0.0) as usize
            } else {
                n.min(len as f64) as usize
            }
        }
    }
}

/// `SameValueZero`, used by `includes`
fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_equals(b),
    }
}

impl<T: Tracer> Interpreter<T> {
    pub(crate) fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let result = match builtin {
            Builtin::LineHook => {
                let line = number_arg(&args, 0);
                if line.is_finite() && line >= 0.0 {
                    self.tracer.line(line as usize);
                }
                Value::Undefined
            }
            Builtin::EnterHook => {
                let name = match args.first() {
                    Some(Value::Str(s)) => s.to_string(),
                    _ => ANONYMOUS.to_string(),
                };
                let rendered = match args.get(1) {
                    Some(Value::Array(array)) => array
                        .borrow()
                        .items
                        .iter()
                        .map(Value::frame_text)
                        .collect::<Vec<_>>()
                        .join(", "),
                    _ => String::new(),
                };
                self.tracer.enter(format!("{}({})", name, rendered));
                Value::Undefined
            }
            Builtin::ExitHook => {
                self.tracer.exit();
                Value::Undefined
            }
            Builtin::ConsoleLog => {
                let text = args
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                debug!("console.log: {}", text);
                Value::Undefined
            }
            Builtin::MathFloor => Value::Number(number_arg(&args, 0).floor()),
            Builtin::MathCeil => Value::Number(number_arg(&args, 0).ceil()),
            Builtin::MathRound => Value::Number(js_round(number_arg(&args, 0))),
            Builtin::MathTrunc => Value::Number(number_arg(&args, 0).trunc()),
            Builtin::MathAbs => Value::Number(number_arg(&args, 0).abs()),
            Builtin::MathSign => {
                let n = number_arg(&args, 0);
                Value::Number(if n.is_nan() || n == 0.0 { n } else { n.signum() })
            }
            Builtin::MathSqrt => Value::Number(number_arg(&args, 0).sqrt()),
            Builtin::MathPow => Value::Number(number_arg(&args, 0).powf(number_arg(&args, 1))),
            Builtin::MathMin => Value::Number(args.iter().map(Value::to_number).fold(
                f64::INFINITY,
                |acc, n| if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.min(n) },
            )),
            Builtin::MathMax => Value::Number(args.iter().map(Value::to_number).fold(
                f64::NEG_INFINITY,
                |acc, n| if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.max(n) },
            )),
            Builtin::ArrayConstructor | Builtin::ErrorConstructor => return self.construct(builtin, args),
            Builtin::ArrayFrom => {
                let items: Vec<Value> = match args.first() {
                    Some(Value::Array(array)) => array.borrow().items.clone(),
                    Some(Value::Str(s)) => s.chars().map(|c| Value::string(&c.to_string())).collect(),
                    _ => Vec::new(),
                };
                match args.get(1) {
                    Some(map) if map.is_callable() => {
                        let map = map.clone();
                        let mut mapped = Vec::with_capacity(items.len());
                        for (i, item) in items.into_iter().enumerate() {
                            mapped.push(self.call_function(&map, vec![item, Value::Number(i as f64)])?);
                        }
                        Value::array(mapped)
                    }
                    _ => Value::array(items),
                }
            }
            Builtin::ArrayIsArray => Value::Bool(matches!(args.first(), Some(Value::Array(_)))),
            Builtin::NumberIsInteger => Value::Bool(matches!(
                args.first(),
                Some(Value::Number(n)) if n.is_finite() && n.fract() == 0.0
            )),
        };
        Ok(result)
    }

    /// `new Array(..)` / `new Error(..)`
    pub(crate) fn construct(&mut self, builtin: Builtin, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::ArrayConstructor => match args.as_slice() {
                [Value::Number(n)] => {
                    if *n < 0.0 || n.fract() != 0.0 || *n >= 4_294_967_296.0 {
                        return Err(RuntimeError::invalid_array_length());
                    }
                    self.check_array_length(*n as usize)?;
                    Ok(Value::array(vec![Value::Undefined; *n as usize]))
                }
                _ => Ok(Value::array(args)),
            },
            Builtin::ErrorConstructor => {
                let message = match args.first() {
                    None | Some(Value::Undefined) => String::new(),
                    Some(value) => value.to_string(),
                };
                Ok(Value::error("Error", &message))
            }
            other => Err(RuntimeError::type_error(format!(
                "{} is not a constructor",
                other.name()
            ))),
        }
    }

    /// Call a method on an array receiver. `Ok(None)` means there is no such method.
    pub(crate) fn call_array_method(
        &mut self,
        array: &ArrayRef,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        let result = match method {
            "push" => {
                self.check_array_length(array.borrow().len() + args.len())?;
                let len = match ObservedArray::new(array) {
                    Some(observed) => observed.push(args, &mut self.tracer),
                    None => {
                        let mut array = array.borrow_mut();
                        array.items.extend(args);
                        array.len()
                    }
                };
                Value::Number(len as f64)
            }
            "pop" => array.borrow_mut().items.pop().unwrap_or_default(),
            "shift" => match ObservedArray::new(array) {
                Some(observed) => observed.shift(&mut self.tracer),
                None => {
                    let mut array = array.borrow_mut();
                    if array.is_empty() {
                        Value::Undefined
                    } else {
                        array.items.remove(0)
                    }
                }
            },
            "unshift" => {
                self.check_array_length(array.borrow().len() + args.len())?;
                let len = match ObservedArray::new(array) {
                    Some(observed) => observed.unshift(args, &mut self.tracer),
                    None => {
                        let mut array = array.borrow_mut();
                        array.items.splice(0..0, args);
                        array.len()
                    }
                };
                Value::Number(len as f64)
            }
            "includes" => {
                let target = args.first().cloned().unwrap_or_default();
                Value::Bool(array.borrow().items.iter().any(|item| same_value_zero(item, &target)))
            }
            "indexOf" => {
                let target = args.first().cloned().unwrap_or_default();
                let position = array
                    .borrow()
                    .items
                    .iter()
                    .position(|item| item.strict_equals(&target));
                Value::Number(position.map_or(-1.0, |i| i as f64))
            }
            "slice" => {
                let array = array.borrow();
                let start = relative_index(args.first(), array.len(), 0);
                let end = relative_index(args.get(1), array.len(), array.len());
                let items = if start < end {
                    array.items[start..end].to_vec()
                } else {
                    Vec::new()
                };
                Value::array(items)
            }
            "concat" => {
                let mut items = array.borrow().items.clone();
                for arg in args {
                    match arg {
                        Value::Array(other) => {
                            let other = other.borrow();
                            self.check_array_length(items.len() + other.len())?;
                            items.extend(other.items.iter().cloned());
                        }
                        other => {
                            self.check_array_length(items.len() + 1)?;
                            items.push(other);
                        }
                    }
                }
                Value::array(items)
            }
            "fill" => {
                let len = array.borrow().len();
                let value = args.first().cloned().unwrap_or_default();
                let start = relative_index(args.get(1), len, 0);
                let end = relative_index(args.get(2), len, len);
                match ObservedArray::new(array) {
                    Some(observed) => observed.fill(value, start, end, &mut self.tracer),
                    None => {
                        let mut array = array.borrow_mut();
                        for i in start..end {
                            array.set(i, value.clone());
                        }
                    }
                }
                Value::Array(array.clone())
            }
            "join" => {
                let separator = match args.first() {
                    None | Some(Value::Undefined) => ",".to_string(),
                    Some(value) => value.to_string(),
                };
                let joined = join_array(array, &separator);
                if joined.len() > MAX_STRING_LENGTH {
                    return Err(RuntimeError::invalid_string_length());
                }
                Value::string(&joined)
            }
            "forEach" | "map" | "filter" => {
                let callback = self.callback_arg(&args, method)?;
                let mut mapped = Vec::new();
                let mut index = 0;
                // Live length, like the JavaScript methods reading `length` per step
                while index < array.borrow().len() {
                    let item = array.borrow().get(index);
                    let result = self.call_function(
                        &callback,
                        vec![item.clone(), Value::Number(index as f64), Value::Array(array.clone())],
                    )?;
                    match method {
                        "map" => mapped.push(result),
                        "filter" if result.is_truthy() => mapped.push(item),
                        _ => {}
                    }
                    index += 1;
                }
                if method == "forEach" {
                    Value::Undefined
                } else {
                    Value::array(mapped)
                }
            }
            "reduce" => {
                let callback = self.callback_arg(&args, method)?;
                let items = array.borrow().items.clone();
                let mut items = items.into_iter().enumerate();
                let mut accumulator = match args.get(1) {
                    Some(initial) => initial.clone(),
                    None => match items.next() {
                        Some((_, first)) => first,
                        None => {
                            return Err(RuntimeError::type_error(
                                "Reduce of empty array with no initial value",
                            ))
                        }
                    },
                };
                for (i, item) in items {
                    accumulator = self.call_function(
                        &callback,
                        vec![accumulator, item, Value::Number(i as f64), Value::Array(array.clone())],
                    )?;
                }
                accumulator
            }
            _ => return Ok(None),
        };
        Ok(Some(result))
    }

    fn callback_arg(&self, args: &[Value], method: &str) -> Result<Value, RuntimeError> {
        match args.first() {
            Some(callback) if callback.is_callable() => Ok(callback.clone()),
            Some(other) => Err(RuntimeError::type_error(format!("{} is not a function", other))),
            None => Err(RuntimeError::type_error(format!(
                "undefined is not a function (in Array.prototype.{})",
                method
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::context::TraceContext;
    use crate::interpreter::engine::Limits;
    use crate::parser::parse_program;

    fn run(source: &str) -> Interpreter<TraceContext> {
        let program = parse_program(source).unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp.run_program(&program).unwrap();
        interp
    }

    fn text(interp: &Interpreter<TraceContext>, name: &str) -> String {
        interp.global(name).unwrap().to_string()
    }

    #[test]
    fn test_math() {
        let interp = run(
            "const r = [Math.floor(2.7), Math.ceil(2.1), Math.round(2.5), Math.round(-2.5),
                        Math.abs(-3), Math.min(4, 1, 9), Math.max(), Math.pow(2, 5)].join(' ');",
        );
        assert_eq!(text(&interp, "r"), "2 3 3 -2 3 1 -Infinity 32");
    }

    #[test]
    fn test_array_mutators() {
        let interp = run(
            "const a = [1, 2];
             a.push(3, 4);
             const first = a.shift();
             a.unshift(0);
             const last = a.pop();
             const r = [first, last, a.join('-')].join(' ');",
        );
        assert_eq!(text(&interp, "r"), "1 4 0-2-3");
    }

    #[test]
    fn test_array_queries() {
        let interp = run(
            "const a = [5, 6, 7, NaN];
             const r = [a.includes(6), a.includes(NaN), a.indexOf(7), a.indexOf(NaN),
                        a.slice(1, -1).join(''), a.slice(-2, 3).length].join(' ');",
        );
        assert_eq!(text(&interp, "r"), "true true 2 -1 67 1");
    }

    #[test]
    fn test_higher_order_methods() {
        let interp = run(
            "const a = [1, 2, 3, 4];
             let sum = 0;
             a.forEach(x => { sum += x; });
             const r = [sum, a.map(x => x * 2).join(','), a.filter(x => x % 2 === 0).join(','),
                        a.reduce((acc, x) => acc + x, 10)].join(' ');",
        );
        assert_eq!(text(&interp, "r"), "10 2,4,6,8 2,4 20");
    }

    #[test]
    fn test_constructors() {
        let interp = run(
            "const a = new Array(3).fill(0);
             const b = Array.from([1, 2], x => x + 1);
             const e = new Error('oops');
             const r = [a.join(','), b.join(','), Array.isArray(b), e.message, e.name].join(' ');",
        );
        assert_eq!(text(&interp, "r"), "0,0,0 2,3 true oops Error");
    }

    #[test]
    fn test_self_containing_array_stringifies() {
        let interp = run(
            "const b = [1];
             b.push(b);
             const s = '' + b;
             const j = b.join('-');
             const r = '' + [b, 2];",
        );
        assert_eq!(text(&interp, "s"), "1,");
        assert_eq!(text(&interp, "j"), "1-");
        assert_eq!(text(&interp, "r"), "1,,2");
    }

    #[test]
    fn test_invalid_array_length() {
        let program = parse_program("new Array(-1);").unwrap();
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        let err = interp.run_program(&program).unwrap_err();
        assert_eq!(err.to_string(), "RangeError: Invalid array length");
    }

    #[test]
    fn test_hooks_report_to_tracer() {
        let mut interp = Interpreter::new(TraceContext::new(), Limits::default());
        interp
            .call_builtin(Builtin::LineHook, vec![Value::Number(7.0)])
            .unwrap();
        interp
            .call_builtin(
                Builtin::EnterHook,
                vec![
                    Value::string("sort"),
                    Value::array(vec![Value::array(vec![Value::Null; 3]), Value::Number(2.0)]),
                ],
            )
            .unwrap();
        assert_eq!(interp.tracer().current_line(), Some(7));
        assert_eq!(interp.tracer().call_stack(), ["sort(Array(3), 2)"]);
        interp.call_builtin(Builtin::ExitHook, vec![]).unwrap();
        assert!(interp.tracer().call_stack().is_empty());
    }
}
