//! Runtime capability
//!
//! The bridge never reads a value's memory layout itself. The host process
//! implements [`Runtime`] with the interpreter's own accessors (`TYPEOF`,
//! `LENGTH`, `CAR`, ...) and installs it once at startup.
//!
//! Accessors are only called on handles whose tag makes them meaningful:
//! element accessors on the matching vector kind, `car`/`cdr`/`tag` on
//! cons-cell kinds, and so on. Child accessors return raw pointers; a null
//! return is reported as malformed structure rather than dereferenced.

use crate::handle::{Handle, Sexp};

/// A complex vector element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

/// One environment binding
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// Binding symbol (`SYMSXP`)
    pub symbol: Sexp,
    /// Bound value; null for active bindings whose value cannot be read
    /// without evaluation
    pub value: Sexp,
}

/// Read-only access to foreign values
pub trait Runtime: Send + Sync {
    // =========================================================================
    // Header
    // =========================================================================

    /// Numeric type tag (`TYPEOF`)
    fn type_of(&self, x: Handle<'_>) -> u32;

    /// Whether the object bit is set (`OBJECT`)
    fn is_object(&self, x: Handle<'_>) -> bool;

    /// Attribute pairlist (`ATTRIB`), the nil value when there are none
    fn attrib(&self, x: Handle<'_>) -> Sexp;

    /// Length of a vector, string vector, or list (`XLENGTH`)
    fn length(&self, x: Handle<'_>) -> usize;

    // =========================================================================
    // Vector elements
    // =========================================================================

    fn logical_elt(&self, x: Handle<'_>, i: usize) -> i32;
    fn integer_elt(&self, x: Handle<'_>, i: usize) -> i32;
    fn real_elt(&self, x: Handle<'_>, i: usize) -> f64;
    fn complex_elt(&self, x: Handle<'_>, i: usize) -> Complex;
    fn raw_elt(&self, x: Handle<'_>, i: usize) -> u8;

    /// `STRING_ELT`, a `CHARSXP`
    fn string_elt(&self, x: Handle<'_>, i: usize) -> Sexp;

    /// `VECTOR_ELT` for lists and expression vectors
    fn vector_elt(&self, x: Handle<'_>, i: usize) -> Sexp;

    /// Bytes of a `CHARSXP`; `None` for `NA_STRING`
    fn char_bytes<'a>(&self, x: Handle<'a>) -> Option<&'a [u8]>;

    // =========================================================================
    // Cons cells, symbols, closures
    // =========================================================================

    fn car(&self, x: Handle<'_>) -> Sexp;
    fn cdr(&self, x: Handle<'_>) -> Sexp;
    fn tag(&self, x: Handle<'_>) -> Sexp;

    /// `PRINTNAME` of a symbol, a `CHARSXP`
    fn printname(&self, x: Handle<'_>) -> Sexp;

    fn formals(&self, x: Handle<'_>) -> Sexp;
    fn body(&self, x: Handle<'_>) -> Sexp;
    fn closure_env(&self, x: Handle<'_>) -> Sexp;

    // =========================================================================
    // Environments
    // =========================================================================

    /// Number of bindings in the frame (hashed or not)
    fn binding_count(&self, x: Handle<'_>) -> usize;

    /// The `i`-th binding in frame order
    fn binding(&self, x: Handle<'_>, i: usize) -> Option<Binding>;

    /// Enclosing environment (`ENCLOS`)
    fn enclosure(&self, x: Handle<'_>) -> Sexp;

    /// Well-known name (`R_GlobalEnv`, `package:stats`, `namespace:base`)
    fn environment_name(&self, x: Handle<'_>) -> Option<String>;

    // =========================================================================
    // Promises, primitives, compiled code
    // =========================================================================

    /// `PRCODE`
    fn promise_code(&self, x: Handle<'_>) -> Sexp;

    /// `PRVALUE`, `None` while the promise is unforced
    fn promise_value(&self, x: Handle<'_>) -> Option<Sexp>;

    /// `PRENV`, the nil value once forced
    fn promise_env(&self, x: Handle<'_>) -> Sexp;

    /// `PRIMNAME` of a special or builtin
    fn primitive_name(&self, x: Handle<'_>) -> Option<String>;

    /// Source expression a bytecode object was compiled from
    fn bytecode_expr(&self, x: Handle<'_>) -> Sexp;

    // =========================================================================
    // External pointers, weak references
    // =========================================================================

    fn extptr_addr(&self, x: Handle<'_>) -> usize;
    fn extptr_tag(&self, x: Handle<'_>) -> Sexp;
    fn extptr_prot(&self, x: Handle<'_>) -> Sexp;

    fn weakref_key(&self, x: Handle<'_>) -> Sexp;
    fn weakref_value(&self, x: Handle<'_>) -> Sexp;
}
