//! Column-major typed cell storage.

use std::any::Any;
use std::fmt;

/// A type-erased cell value, as moved between structures of equal shape.
pub type RawValue = Box<dyn Any>;

/// Storage for one column of cells, erased over its internal type.
pub trait Cells: fmt::Debug {
    /// Number of cells.
    fn len(&self) -> usize;

    /// Returns true if there are no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cell at `index` holds a value.
    fn is_present(&self, index: usize) -> bool;

    /// Appends a freshly seeded cell.
    fn push_blank(&mut self);

    /// Inserts a freshly seeded cell at `index`.
    fn insert_blank(&mut self, index: usize);

    /// Removes the cell at `index`.
    fn remove(&mut self, index: usize);

    /// Marks the cell at `index` as missing.
    fn clear(&mut self, index: usize);

    /// Removes every cell.
    fn clear_all(&mut self);

    /// Clones the value at `index` out as a raw value.
    fn get_raw(&self, index: usize) -> Option<RawValue>;

    /// Stores a raw value at `index`; returns false if it has the wrong type.
    fn set_raw(&mut self, index: usize, value: Option<RawValue>) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Cells of internal type `I`. A `None` cell is a missing value.
#[derive(Clone, Debug)]
pub struct TypedCells<I> {
    values: Vec<Option<I>>,
    seed: Option<I>,
}

impl<I: Clone> TypedCells<I> {
    /// Creates `len` cells, each set to `seed`.
    pub fn new(seed: Option<I>, len: usize) -> Self {
        Self {
            values: vec![seed.clone(); len],
            seed,
        }
    }

    /// Gets the value at `index`, `None` if missing or out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&I> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Sets the value at `index`. Does nothing out of range.
    #[inline]
    pub fn set(&mut self, index: usize, value: Option<I>) {
        if let Some(cell) = self.values.get_mut(index) {
            *cell = value;
        }
    }

    /// Appends a value.
    pub fn push(&mut self, value: Option<I>) {
        self.values.push(value);
    }
}

impl<I: Clone + fmt::Debug + 'static> Cells for TypedCells<I> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn is_present(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    fn push_blank(&mut self) {
        self.values.push(self.seed.clone());
    }

    fn insert_blank(&mut self, index: usize) {
        self.values.insert(index, self.seed.clone());
    }

    fn remove(&mut self, index: usize) {
        if index < self.values.len() {
            self.values.remove(index);
        }
    }

    fn clear(&mut self, index: usize) {
        self.set(index, None);
    }

    fn clear_all(&mut self) {
        self.values.clear();
    }

    fn get_raw(&self, index: usize) -> Option<RawValue> {
        self.get(index).map(|value| Box::new(value.clone()) as RawValue)
    }

    fn set_raw(&mut self, index: usize, value: Option<RawValue>) -> bool {
        if index >= self.values.len() {
            return false;
        }
        match value {
            None => {
                self.values[index] = None;
                true
            }
            Some(raw) => match raw.downcast::<I>() {
                Ok(value) => {
                    self.values[index] = Some(*value);
                    true
                }
                Err(_) => false,
            },
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
