use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::reader::Transactional;

/// A scoped transaction over some `Transactional` value.
///
/// Begins on construction. Unless `commit` or `rollback` is called, the
/// transaction is rolled back when the guard is dropped, including when an
/// error is propagated out of the enclosing function with `?`.
///
/// The guard dereferences to the wrapped value so reads happen through it.
pub struct Transaction<'a, T: Transactional + ?Sized> {
    inner: &'a mut T,
    done: bool,
}

impl<'a, T: Transactional + ?Sized> Transaction<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        inner.begin();
        Transaction { inner, done: false }
    }

    pub fn commit(mut self) -> Result<()> {
        self.done = true;
        self.inner.commit()
    }

    pub fn rollback(mut self) -> Result<()> {
        self.done = true;
        self.inner.rollback()
    }
}

impl<'a, T: Transactional + ?Sized> Deref for Transaction<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<'a, T: Transactional + ?Sized> DerefMut for Transaction<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<'a, T: Transactional + ?Sized> Drop for Transaction<'a, T> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.inner.rollback();
        }
    }
}
