//! Error types and designated diagnostic text
//!
//! Nothing here ever crosses the C boundary as anything but text: the bridge
//! renders every error through its `Display` implementation.

use crate::types::SexpType;

/// Text returned for a null handle
pub const INVALID_HANDLE: &str = "<invalid handle: NULL>";

/// Text returned when no runtime capability has been installed
pub const NO_RUNTIME: &str = "<no runtime installed>";

/// Failure while rendering a value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// Null handle at the top level
    #[error("<invalid handle: NULL>")]
    InvalidHandle,

    /// GC-lifecycle tag observed where a value was expected
    #[error("<unexpected transient GC node: {0}>")]
    TransientNode(SexpType),

    /// Tag outside the runtime's numbering
    #[error("<unknown SEXPTYPE {0}>")]
    UnknownType(u32),

    /// A child pointer the value's kind guarantees was null
    #[error("<malformed value: null {0}>")]
    NullChild(&'static str),

    /// A child whose tag is impossible in its position
    #[error("<malformed value: expected {expected}, found {found}>")]
    UnexpectedType {
        expected: &'static str,
        found: SexpType,
    },

    /// The per-call node budget ran out
    #[error("<truncated: node budget exhausted>")]
    BudgetExhausted,

    /// Panic caught at the bridge boundary
    #[error("<render failure: {0}>")]
    Panic(String),

    /// Writing into the output buffer failed
    #[error("<render failure: formatter error>")]
    Fmt(#[from] std::fmt::Error),
}

impl RenderError {
    /// Errors that abort the whole call instead of marking one child
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::BudgetExhausted | RenderError::Fmt(_))
    }
}

/// Failure during one-time host setup
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// `install` was already called in this process
    #[error("a runtime is already installed")]
    AlreadyInstalled,
}

/// Failure loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
