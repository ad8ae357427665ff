//! Shared pixel storage.
//!
//! [`SharedBytes`] is the aliasing handle behind every
//! [`PixelBuffer`](crate::PixelBuffer). Cloning the handle via
//! [`share`](SharedBytes::share) does not copy bytes; all handles observe each
//! other's writes.
//!
//! The handle is reference counted with `Rc`, so it is neither `Send` nor
//! `Sync`. Storage shared between buffers is confined to the thread that
//! created it; there is no internal locking. A parallel pass should give each
//! worker its own buffer (see [`to_vec`](SharedBytes::to_vec)).

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

/// Reference-counted, interior-mutable byte storage.
pub struct SharedBytes {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl SharedBytes {
    /// Take ownership of `bytes` as new, unaliased storage.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(RefCell::new(bytes)),
        }
    }

    /// Copy `bytes` into new, unaliased storage.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Another handle to the same bytes.
    #[inline]
    pub fn share(&self) -> Self {
        Self {
            bytes: Rc::clone(&self.bytes),
        }
    }

    /// Whether `a` and `b` refer to the same bytes.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.bytes, &b.bytes)
    }

    /// Number of live handles to these bytes.
    #[inline]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.bytes)
    }

    /// Byte length.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Whether the storage holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the live bytes.
    ///
    /// # Panics
    ///
    /// Panics if the bytes are currently mutably borrowed through any handle.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, [u8]> {
        Ref::map(self.bytes.borrow(), Vec::as_slice)
    }

    /// Mutably borrow the live bytes.
    ///
    /// The length cannot be changed through the returned guard.
    ///
    /// # Panics
    ///
    /// Panics if the bytes are currently borrowed through any handle.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.bytes.borrow_mut(), Vec::as_mut_slice)
    }

    /// Deep copy of the current bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.borrow().to_vec()
    }

    /// Recover the backing vec if this is the only handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if other handles still alias the bytes.
    pub fn try_unwrap(self) -> Result<Vec<u8>, Self> {
        Rc::try_unwrap(self.bytes)
            .map(RefCell::into_inner)
            .map_err(|bytes| Self { bytes })
    }
}

impl From<Vec<u8>> for SharedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SharedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SharedBytes({} bytes, {} handles)",
            self.len(),
            self.handle_count()
        )
    }
}
