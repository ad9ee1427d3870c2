//! Shared parameter vectors and change notification.
//!
//! A [`Parameter`] is owned by whoever builds the model and handed to
//! operators and likelihoods as a cheap clone of the same handle. Writes are
//! visible to every holder immediately. Dependents that cache derived values
//! register a [`DirtyFlag`] at construction time and the parameter marks it on
//! every write, so the dependent can recompute lazily on its next read.

use std::{
    cell::{Cell, Ref, RefCell},
    fmt::Debug,
    rc::Rc,
};

use crate::error::{ModelError, Result};

/// A shared "needs recomputation" marker.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Rc<Cell<bool>>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.0.set(true);
    }

    pub fn is_marked(&self) -> bool {
        self.0.get()
    }

    /// Clear the flag and return whether it was set.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub fn clear(&self) {
        self.0.set(false);
    }
}

/// Inclusive bounds shared by every coordinate of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Bounds { lower, upper }
    }

    pub fn non_negative() -> Self {
        Bounds::new(0., f64::INFINITY)
    }

    pub fn unit() -> Self {
        Bounds::new(0., 1.)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

struct ParameterInner {
    name: String,
    values: Vec<f64>,
    bounds: Vec<Bounds>,
    listeners: Vec<DirtyFlag>,
}

#[derive(Clone)]
pub struct Parameter {
    inner: Rc<RefCell<ParameterInner>>,
}

impl Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Parameter")
            .field("name", &inner.name)
            .field("values", &inner.values)
            .field("bounds", &inner.bounds)
            .finish()
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        Parameter {
            inner: Rc::new(RefCell::new(ParameterInner {
                name: name.into(),
                values: values.into(),
                bounds: Vec::new(),
                listeners: Vec::new(),
            })),
        }
    }

    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Parameter::new(name, vec![value])
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn dim(&self) -> usize {
        self.inner.borrow().values.len()
    }

    pub fn value(&self, index: usize) -> f64 {
        self.inner.borrow().values[index]
    }

    /// Borrow all values. The borrow must be released before the next write.
    pub fn values(&self) -> Ref<'_, [f64]> {
        Ref::map(self.inner.borrow(), |inner| inner.values.as_slice())
    }

    pub fn set_value(&self, index: usize, value: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.values[index] = value;
        inner.listeners.iter().for_each(DirtyFlag::mark);
    }

    /// Overwrite every coordinate with one notification.
    pub fn set_values(&self, values: impl IntoIterator<Item = f64>) {
        let mut inner = self.inner.borrow_mut();
        let dim = inner.values.len();
        let mut written = 0;
        for (slot, value) in inner.values.iter_mut().zip(values) {
            *slot = value;
            written += 1;
        }
        debug_assert_eq!(written, dim);
        inner.listeners.iter().for_each(DirtyFlag::mark);
    }

    /// Expand a one-dimensional parameter to `dim` copies of its value.
    ///
    /// Parameters that already have `dim` entries are left alone.
    pub fn broadcast(&self, what: &'static str, dim: usize) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        match inner.values.len() {
            n if n == dim => Ok(()),
            1 => {
                let value = inner.values[0];
                inner.values = vec![value; dim];
                inner.listeners.iter().for_each(DirtyFlag::mark);
                Ok(())
            }
            found => Err(ModelError::DimensionMismatch {
                what,
                expected: dim,
                found,
            }),
        }
    }

    pub fn add_bounds(&self, bounds: Bounds) {
        self.inner.borrow_mut().bounds.push(bounds);
    }

    /// True if every value satisfies every bound added so far.
    pub fn is_within_bounds(&self) -> bool {
        let inner = self.inner.borrow();
        inner
            .bounds
            .iter()
            .all(|bounds| inner.values.iter().all(|&value| bounds.contains(value)))
    }

    pub fn add_listener(&self, flag: &DirtyFlag) {
        self.inner.borrow_mut().listeners.push(flag.clone());
    }

    /// Mark all listeners dirty without changing any value.
    pub fn fire_changed(&self) {
        self.inner.borrow().listeners.iter().for_each(DirtyFlag::mark);
    }

    pub(crate) fn expect_dim(&self, what: &'static str, expected: usize) -> Result<()> {
        let found = self.dim();
        if found != expected {
            return Err(ModelError::DimensionMismatch {
                what,
                expected,
                found,
            });
        }
        Ok(())
    }
}
