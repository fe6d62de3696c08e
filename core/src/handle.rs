//! Borrowed value handles
//!
//! The foreign runtime owns every value. A [`Handle`] is only a view over the
//! raw pointer for the duration of one bridge call.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Opaque node type behind a `SEXP`
#[repr(C)]
pub struct SexpRec {
    _private: [u8; 0],
}

/// Raw value pointer as it crosses the C boundary
pub type Sexp = *mut SexpRec;

/// Non-null, non-owning reference to a foreign value
///
/// The lifetime ties the handle to the call that produced it. Handles for
/// children read out of a value inherit the parent's lifetime, since they are
/// only reachable while the parent is.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Handle<'a> {
    ptr: NonNull<SexpRec>,
    _borrow: PhantomData<&'a SexpRec>,
}

impl<'a> Handle<'a> {
    /// Wrap a raw pointer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must refer to a value that stays live for `'a`.
    pub(crate) unsafe fn new(ptr: Sexp) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            _borrow: PhantomData,
        })
    }

    /// Wrap a pointer read out of `self`, keeping `self`'s lifetime
    pub(crate) fn child(self, ptr: Sexp) -> Option<Handle<'a>> {
        // SAFETY: values reachable from a live handle are live for as long
        // as that handle.
        unsafe { Handle::new(ptr) }
    }

    /// The raw pointer, for runtime implementations to dereference
    pub fn as_ptr(self) -> Sexp {
        self.ptr.as_ptr()
    }

    /// Address used to identify the node in structural output
    pub fn address(self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.address())
    }
}
