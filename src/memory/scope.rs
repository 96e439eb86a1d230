//! Lexical environments
//!
//! Every block, loop and function call gets a [`Scope`] chained to its parent.
//! `let`/`const` bind in the innermost scope; `var` binds in the nearest
//! function scope. Closures keep their defining scope alive through
//! [`ScopeRef`].

use super::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type ScopeRef = Rc<RefCell<Scope>>;

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
}

/// Why an assignment failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Undeclared,
    Constant,
}

#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<ScopeRef>,
    is_function: bool,
}

impl Scope {
    /// Root scope; acts as the function scope for top-level `var`
    pub fn global() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            parent: None,
            is_function: true,
        }))
    }

    pub fn child(parent: &ScopeRef, is_function: bool) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
            is_function,
        }))
    }

    /// A sibling of `scope` starting with copies of its bindings. `for (let ...)`
    /// moves to a fresh one each iteration so closures keep their own counter.
    pub fn renewed(scope: &ScopeRef) -> ScopeRef {
        let scope = scope.borrow();
        Rc::new(RefCell::new(Scope {
            bindings: scope.bindings.clone(),
            parent: scope.parent.clone(),
            is_function: scope.is_function,
        }))
    }

    /// Bind a name in this scope, replacing any binding it already has
    pub fn declare(&mut self, name: &str, value: Value, mutable: bool) {
        self.bindings
            .insert(name.to_string(), Binding { value, mutable });
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.clone()
    }

    /// Resolve a name through the scope chain
    pub fn lookup(scope: &ScopeRef, name: &str) -> Option<Value> {
        let mut current = Rc::clone(scope);
        loop {
            let parent = {
                let s = current.borrow();
                if let Some(binding) = s.bindings.get(name) {
                    return Some(binding.value.clone());
                }
                s.parent.clone()
            };
            current = parent?;
        }
    }

    /// Assign to the nearest existing binding of `name`
    pub fn assign(scope: &ScopeRef, name: &str, value: Value) -> Result<(), AssignError> {
        let mut current = Rc::clone(scope);
        loop {
            let parent = {
                let mut s = current.borrow_mut();
                if let Some(binding) = s.bindings.get_mut(name) {
                    if !binding.mutable {
                        return Err(AssignError::Constant);
                    }
                    binding.value = value;
                    return Ok(());
                }
                s.parent.clone()
            };
            current = parent.ok_or(AssignError::Undeclared)?;
        }
    }

    /// Nearest enclosing function scope (where `var` declarations live)
    pub fn function_scope(scope: &ScopeRef) -> ScopeRef {
        let mut current = Rc::clone(scope);
        loop {
            let parent = {
                let s = current.borrow();
                if s.is_function {
                    None
                } else {
                    s.parent.clone()
                }
            };
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_lookup() {
        let global = Scope::global();
        global.borrow_mut().declare("x", Value::Number(1.0), true);

        let inner = Scope::child(&global, false);
        inner.borrow_mut().declare("x", Value::Number(2.0), true);

        assert_eq!(Scope::lookup(&inner, "x").and_then(|v| v.as_number()), Some(2.0));
        assert_eq!(Scope::lookup(&global, "x").and_then(|v| v.as_number()), Some(1.0));
        assert!(Scope::lookup(&inner, "y").is_none());
    }

    #[test]
    fn test_assign_walks_chain() {
        let global = Scope::global();
        global.borrow_mut().declare("count", Value::Number(0.0), true);
        let inner = Scope::child(&global, true);

        Scope::assign(&inner, "count", Value::Number(5.0)).unwrap();
        assert_eq!(Scope::lookup(&global, "count").and_then(|v| v.as_number()), Some(5.0));
        assert_eq!(
            Scope::assign(&inner, "missing", Value::Null),
            Err(AssignError::Undeclared)
        );
    }

    #[test]
    fn test_renewed_scope_copies_bindings() {
        let global = Scope::global();
        let first = Scope::child(&global, false);
        first.borrow_mut().declare("i", Value::Number(0.0), true);

        let second = Scope::renewed(&first);
        Scope::assign(&second, "i", Value::Number(1.0)).unwrap();
        assert_eq!(Scope::lookup(&first, "i").and_then(|v| v.as_number()), Some(0.0));
        assert_eq!(Scope::lookup(&second, "i").and_then(|v| v.as_number()), Some(1.0));
        assert!(Rc::ptr_eq(&second.borrow().parent().unwrap(), &global));
    }

    #[test]
    fn test_const_binding_rejects_assignment() {
        let global = Scope::global();
        global.borrow_mut().declare("n", Value::Number(3.0), false);
        assert_eq!(
            Scope::assign(&global, "n", Value::Number(4.0)),
            Err(AssignError::Constant)
        );
    }

    #[test]
    fn test_function_scope() {
        let global = Scope::global();
        let function = Scope::child(&global, true);
        let block = Scope::child(&function, false);
        assert!(Rc::ptr_eq(&Scope::function_scope(&block), &function));
        assert!(Rc::ptr_eq(&Scope::function_scope(&global), &global));
    }
}
