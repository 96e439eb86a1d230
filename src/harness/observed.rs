//! Observed arrays
//!
//! Harness inputs are copied into arrays flagged `observed`. Every write to
//! such an array goes through [`ObservedArray`], which reports it to the
//! [`Tracer`] before performing it. Reads pass straight through.

use crate::interpreter::engine::Tracer;
use crate::memory::value::{ArrayRef, JsArray, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// New observed array value holding `items`
pub fn observed_array(items: Vec<Value>) -> Value {
    Value::Array(Rc::new(RefCell::new(JsArray::observed(items))))
}

/// Write-reporting view of an observed array
#[derive(Debug, Clone, Copy)]
pub struct ObservedArray<'a> {
    array: &'a ArrayRef,
}

impl<'a> ObservedArray<'a> {
    /// View of `array`, if it is observed
    pub fn new(array: &'a ArrayRef) -> Option<Self> {
        array.borrow().observed.then_some(ObservedArray { array })
    }

    pub fn len(&self) -> usize {
        self.array.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Value {
        self.array.borrow().get(index)
    }

    /// Report an overwrite of `index`, then write
    pub fn set<T: Tracer + ?Sized>(&self, index: usize, value: Value, tracer: &mut T) {
        tracer.overwrite(index, value.to_number());
        self.array.borrow_mut().set(index, value);
    }

    /// Report a swap, then exchange the two elements
    pub fn swap<T: Tracer + ?Sized>(&self, first: usize, second: usize, tracer: &mut T) {
        tracer.swap(first, second);
        let mut array = self.array.borrow_mut();
        let needed = first.max(second) + 1;
        if array.len() < needed {
            array.items.resize(needed, Value::Undefined);
        }
        array.items.swap(first, second);
    }

    /// `push(...values)`: one overwrite per appended slot; returns the new length
    pub fn push<T: Tracer + ?Sized>(&self, values: Vec<Value>, tracer: &mut T) -> usize {
        for value in values {
            let index = self.len();
            self.set(index, value, tracer);
        }
        self.len()
    }

    /// `shift()`: every remaining element moves down one slot, reported as
    /// overwrites; the final truncation is not an event
    pub fn shift<T: Tracer + ?Sized>(&self, tracer: &mut T) -> Value {
        let items = self.array.borrow().items.clone();
        let Some(first) = items.first().cloned() else {
            return Value::Undefined;
        };
        for (index, item) in items.iter().enumerate().skip(1) {
            self.set(index - 1, item.clone(), tracer);
        }
        self.array.borrow_mut().items.truncate(items.len() - 1);
        first
    }

    /// `unshift(...values)`: existing elements move up (highest slot first),
    /// then the new values are written at the front
    pub fn unshift<T: Tracer + ?Sized>(&self, values: Vec<Value>, tracer: &mut T) -> usize {
        let items = self.array.borrow().items.clone();
        let count = values.len();
        if count == 0 {
            return items.len();
        }
        for (index, item) in items.into_iter().enumerate().rev() {
            self.set(index + count, item, tracer);
        }
        for (index, value) in values.into_iter().enumerate() {
            self.set(index, value, tracer);
        }
        self.len()
    }

    /// `fill(value, start, end)`: one overwrite per slot in `start..end`
    pub fn fill<T: Tracer + ?Sized>(&self, value: Value, start: usize, end: usize, tracer: &mut T) {
        for index in start..end {
            self.set(index, value.clone(), tracer);
        }
    }
}
