//! Value type tags
//!
//! The numbering is owned by the foreign runtime. Discriminants are assigned
//! by hand and must match it exactly, gaps included.

use std::fmt;

/// Raw `SEXPTYPE` numbers as the foreign runtime defines them.
///
/// This module is also the source for the `SEXPTYPE` enum in
/// `include/debug.h` (see `tools/header-gen`).
pub mod sexptype {
    /// nil = NULL
    pub const NILSXP: u32 = 0;
    /// symbols
    pub const SYMSXP: u32 = 1;
    /// lists of dotted pairs
    pub const LISTSXP: u32 = 2;
    /// closures
    pub const CLOSXP: u32 = 3;
    /// environments
    pub const ENVSXP: u32 = 4;
    /// promises: [un]evaluated closure arguments
    pub const PROMSXP: u32 = 5;
    /// language constructs (special lists)
    pub const LANGSXP: u32 = 6;
    /// special forms
    pub const SPECIALSXP: u32 = 7;
    /// builtin non-special forms
    pub const BUILTINSXP: u32 = 8;
    /// "scalar" string type (internal only)
    pub const CHARSXP: u32 = 9;
    /// logical vectors
    pub const LGLSXP: u32 = 10;
    /// integer vectors
    pub const INTSXP: u32 = 13;
    /// real variables
    pub const REALSXP: u32 = 14;
    /// complex variables
    pub const CPLXSXP: u32 = 15;
    /// string vectors
    pub const STRSXP: u32 = 16;
    /// dot-dot-dot object
    pub const DOTSXP: u32 = 17;
    /// make "any" args work
    pub const ANYSXP: u32 = 18;
    /// generic vectors
    pub const VECSXP: u32 = 19;
    /// expressions vectors
    pub const EXPRSXP: u32 = 20;
    /// byte code
    pub const BCODESXP: u32 = 21;
    /// external pointer
    pub const EXTPTRSXP: u32 = 22;
    /// weak reference
    pub const WEAKREFSXP: u32 = 23;
    /// raw bytes
    pub const RAWSXP: u32 = 24;
    /// S4 non-vector
    pub const OBJSXP: u32 = 25;
    /// fresh node created in new page
    pub const NEWSXP: u32 = 30;
    /// node released by GC
    pub const FREESXP: u32 = 31;
    /// Closure or Builtin
    pub const FUNSXP: u32 = 99;
}

use sexptype::*;

/// Type tag carried by every value handle
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexpType {
    Nil = NILSXP,
    Symbol = SYMSXP,
    Pairlist = LISTSXP,
    Closure = CLOSXP,
    Environment = ENVSXP,
    Promise = PROMSXP,
    Language = LANGSXP,
    Special = SPECIALSXP,
    Builtin = BUILTINSXP,
    Char = CHARSXP,
    Logical = LGLSXP,
    Integer = INTSXP,
    Real = REALSXP,
    Complex = CPLXSXP,
    String = STRSXP,
    Dots = DOTSXP,
    Any = ANYSXP,
    List = VECSXP,
    Expression = EXPRSXP,
    Bytecode = BCODESXP,
    ExternalPtr = EXTPTRSXP,
    WeakRef = WEAKREFSXP,
    Raw = RAWSXP,
    Object = OBJSXP,

    // GC bookkeeping, never value content
    New = NEWSXP,
    Free = FREESXP,

    // Classification only, never carried by a handle
    Function = FUNSXP,
}

impl SexpType {
    /// Every tag, in numeric order
    pub const ALL: [SexpType; 27] = [
        SexpType::Nil,
        SexpType::Symbol,
        SexpType::Pairlist,
        SexpType::Closure,
        SexpType::Environment,
        SexpType::Promise,
        SexpType::Language,
        SexpType::Special,
        SexpType::Builtin,
        SexpType::Char,
        SexpType::Logical,
        SexpType::Integer,
        SexpType::Real,
        SexpType::Complex,
        SexpType::String,
        SexpType::Dots,
        SexpType::Any,
        SexpType::List,
        SexpType::Expression,
        SexpType::Bytecode,
        SexpType::ExternalPtr,
        SexpType::WeakRef,
        SexpType::Raw,
        SexpType::Object,
        SexpType::New,
        SexpType::Free,
        SexpType::Function,
    ];

    /// Numeric tag value
    pub fn code(self) -> u32 {
        self as u32
    }

    /// The runtime's C identifier for this tag (e.g. `STRSXP`)
    pub fn c_name(self) -> &'static str {
        match self {
            SexpType::Nil => "NILSXP",
            SexpType::Symbol => "SYMSXP",
            SexpType::Pairlist => "LISTSXP",
            SexpType::Closure => "CLOSXP",
            SexpType::Environment => "ENVSXP",
            SexpType::Promise => "PROMSXP",
            SexpType::Language => "LANGSXP",
            SexpType::Special => "SPECIALSXP",
            SexpType::Builtin => "BUILTINSXP",
            SexpType::Char => "CHARSXP",
            SexpType::Logical => "LGLSXP",
            SexpType::Integer => "INTSXP",
            SexpType::Real => "REALSXP",
            SexpType::Complex => "CPLXSXP",
            SexpType::String => "STRSXP",
            SexpType::Dots => "DOTSXP",
            SexpType::Any => "ANYSXP",
            SexpType::List => "VECSXP",
            SexpType::Expression => "EXPRSXP",
            SexpType::Bytecode => "BCODESXP",
            SexpType::ExternalPtr => "EXTPTRSXP",
            SexpType::WeakRef => "WEAKREFSXP",
            SexpType::Raw => "RAWSXP",
            SexpType::Object => "OBJSXP",
            SexpType::New => "NEWSXP",
            SexpType::Free => "FREESXP",
            SexpType::Function => "FUNSXP",
        }
    }

    /// User-facing type name, as `typeof()` reports it
    pub fn type_name(self) -> &'static str {
        match self {
            SexpType::Nil => "NULL",
            SexpType::Symbol => "symbol",
            SexpType::Pairlist => "pairlist",
            SexpType::Closure => "closure",
            SexpType::Environment => "environment",
            SexpType::Promise => "promise",
            SexpType::Language => "language",
            SexpType::Special => "special",
            SexpType::Builtin => "builtin",
            SexpType::Char => "char",
            SexpType::Logical => "logical",
            SexpType::Integer => "integer",
            SexpType::Real => "double",
            SexpType::Complex => "complex",
            SexpType::String => "character",
            SexpType::Dots => "...",
            SexpType::Any => "any",
            SexpType::List => "list",
            SexpType::Expression => "expression",
            SexpType::Bytecode => "bytecode",
            SexpType::ExternalPtr => "externalptr",
            SexpType::WeakRef => "weakref",
            SexpType::Raw => "raw",
            SexpType::Object => "S4",
            SexpType::New => "new",
            SexpType::Free => "free",
            SexpType::Function => "function",
        }
    }

    /// Transient garbage collector states
    pub fn is_gc_marker(self) -> bool {
        matches!(self, SexpType::New | SexpType::Free)
    }

    /// Cons-cell kinds that share the CAR/CDR/TAG layout
    pub fn is_pairlist_like(self) -> bool {
        matches!(
            self,
            SexpType::Pairlist | SexpType::Language | SexpType::Dots
        )
    }
}

impl TryFrom<u32> for SexpType {
    type Error = u32;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        let ty = match code {
            NILSXP => SexpType::Nil,
            SYMSXP => SexpType::Symbol,
            LISTSXP => SexpType::Pairlist,
            CLOSXP => SexpType::Closure,
            ENVSXP => SexpType::Environment,
            PROMSXP => SexpType::Promise,
            LANGSXP => SexpType::Language,
            SPECIALSXP => SexpType::Special,
            BUILTINSXP => SexpType::Builtin,
            CHARSXP => SexpType::Char,
            LGLSXP => SexpType::Logical,
            INTSXP => SexpType::Integer,
            REALSXP => SexpType::Real,
            CPLXSXP => SexpType::Complex,
            STRSXP => SexpType::String,
            DOTSXP => SexpType::Dots,
            ANYSXP => SexpType::Any,
            VECSXP => SexpType::List,
            EXPRSXP => SexpType::Expression,
            BCODESXP => SexpType::Bytecode,
            EXTPTRSXP => SexpType::ExternalPtr,
            WEAKREFSXP => SexpType::WeakRef,
            RAWSXP => SexpType::Raw,
            OBJSXP => SexpType::Object,
            NEWSXP => SexpType::New,
            FREESXP => SexpType::Free,
            FUNSXP => SexpType::Function,
            other => return Err(other),
        };
        Ok(ty)
    }
}

impl fmt::Display for SexpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.c_name(), self.code())
    }
}

/// `NA` for logical and integer vectors
pub const NA_INTEGER: i32 = i32::MIN;

/// Low word of the `NA_real_` NaN payload
const NA_REAL_PAYLOAD: u32 = 1954;

/// Distinguish `NA_real_` from an ordinary NaN by its payload
pub fn is_na_real(value: f64) -> bool {
    value.is_nan() && (value.to_bits() as u32) == NA_REAL_PAYLOAD
}

/// Bit pattern of `NA_real_`
pub fn na_real() -> f64 {
    f64::from_bits(0x7FF0_0000_0000_0000 | NA_REAL_PAYLOAD as u64)
}
