//! sexp-probe - debugger rendering bridge for interpreter values
//!
//! A native debugger attached to an interpreter process holds opaque value
//! handles (`SEXP`). This crate exports three C symbols it can call with such
//! a handle to get readable text back.
//!
//! # Architecture
//!
//! - [`ffi`] - the exported `print`, `inspect` and `display` symbols
//! - [`bridge`] - install-once host setup; turns panics and errors into text
//! - [`render`] - one dispatch over [`SexpType`] feeding three [`Mode`]s
//! - [`Runtime`] - read-only accessors the host implements for its interpreter
//! - [`ProbeConfig`] - per-mode limits loaded from `probe.toml`

pub mod bridge;
mod buffer;
pub mod config;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod render;
pub mod runtime;
#[cfg(test)]
pub mod test_utils;
pub mod types;

pub use bridge::{install, install_with_config_file};
pub use config::{ModeLimits, ProbeConfig};
pub use error::{ConfigError, InstallError, RenderError};
pub use handle::{Handle, Sexp, SexpRec};
pub use render::Mode;
pub use runtime::{Binding, Complex, Runtime};
pub use types::SexpType;
